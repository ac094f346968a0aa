//! crates/classroom_core/src/settings.rs
//!
//! Notification preferences, persisted next to the session in the same storage.

use crate::ports::{KeyValueStorage, PortError, PortResult};
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const SETTINGS_KEY: &str = "settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub course_updates: bool,
    pub discussion_replies: bool,
    pub grade_posted: bool,
    pub new_announcements: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            course_updates: true,
            discussion_replies: true,
            grade_posted: true,
            new_announcements: true,
        }
    }
}

impl NotificationSettings {
    /// Reads the saved settings. Missing or unreadable entries fall back to the defaults.
    pub async fn load(storage: &dyn KeyValueStorage) -> Self {
        match storage.get_item(SETTINGS_KEY).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring malformed notification settings: {}", e);
                Self::default()
            }),
            Ok(None) => Self::default(),
            Err(e) => {
                warn!("Could not read notification settings: {}", e);
                Self::default()
            }
        }
    }

    pub async fn save(&self, storage: &dyn KeyValueStorage) -> PortResult<()> {
        let encoded = serde_json::to_string(self)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        storage.set_item(SETTINGS_KEY, &encoded).await
    }
}
