//! crates/classroom_core/src/profile.rs
//!
//! The signed-in user's editable profile, persisted under its own storage key.

use crate::domain::User;
use crate::ports::{KeyValueStorage, PortError, PortResult};
use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use tracing::warn;
use uuid::Uuid;

pub const PROFILE_KEY: &str = "profile";

pub const MIN_PASSWORD_LEN: usize = 8;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("Invalid email regex"));
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("Invalid phone regex"));

/// Field name to message, for every field that failed validation.
pub type FieldErrors = BTreeMap<&'static str, &'static str>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The user this profile belongs to; a stored profile for anyone else is ignored.
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile: String,
    pub parent_name: String,
    pub parent_contact: String,
    pub address: String,
    pub bio: String,
    pub language: String,
}

impl Profile {
    /// A fresh profile seeded from the account: the display name is split on its
    /// first space.
    pub fn for_user(user: &User) -> Self {
        let (first_name, last_name) = match user.name.trim().split_once(' ') {
            Some((first, last)) => (first.to_string(), last.trim().to_string()),
            None => (user.name.trim().to_string(), String::new()),
        };

        Self {
            user_id: user.id,
            first_name,
            last_name,
            email: user.email.clone(),
            date_of_birth: None,
            mobile: String::new(),
            parent_name: String::new(),
            parent_contact: String::new(),
            address: String::new(),
            bio: String::new(),
            language: "english".to_string(),
        }
    }

    /// Reads the saved profile for `user`, falling back to `for_user` when the
    /// entry is missing, unreadable, or belongs to someone else.
    pub async fn load(storage: &dyn KeyValueStorage, user: &User) -> Self {
        let raw = match storage.get_item(PROFILE_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Self::for_user(user),
            Err(e) => {
                warn!("Could not read the profile: {}", e);
                return Self::for_user(user);
            }
        };

        match serde_json::from_str::<Self>(&raw) {
            Ok(profile) if profile.user_id == user.id => profile,
            Ok(_) => Self::for_user(user),
            Err(e) => {
                warn!("Ignoring malformed profile: {}", e);
                Self::for_user(user)
            }
        }
    }

    pub async fn save(&self, storage: &dyn KeyValueStorage) -> PortResult<()> {
        let encoded = serde_json::to_string(self)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        storage.set_item(PROFILE_KEY, &encoded).await
    }
}

/// A submitted profile form. Passwords are checked but never stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileUpdate {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub date_of_birth: Option<NaiveDate>,
    pub mobile: String,
    pub parent_name: String,
    pub parent_contact: String,
    pub address: String,
    pub bio: String,
    pub language: String,
}

impl ProfileUpdate {
    /// Checks every field and returns all failures at once; empty means valid.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if self.first_name.trim().is_empty() {
            errors.insert("first_name", "This field is required");
        }
        if self.last_name.trim().is_empty() {
            errors.insert("last_name", "This field is required");
        }
        if !EMAIL_RE.is_match(&self.email) {
            errors.insert("email", "Invalid email format");
        }
        if !self.password.is_empty() && self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.insert("password", "Minimum 8 characters");
        }
        if self.confirm_password != self.password {
            errors.insert("confirm_password", "Passwords do not match");
        }
        if !self.mobile.is_empty() && !PHONE_RE.is_match(&self.mobile) {
            errors.insert("mobile", "Must be 10 digits");
        }
        if !self.parent_contact.is_empty() && !PHONE_RE.is_match(&self.parent_contact) {
            errors.insert("parent_contact", "Must be 10 digits");
        }

        errors
    }

    /// Validates and builds the profile to store for `user_id`.
    pub fn into_profile(self, user_id: Uuid) -> Result<Profile, FieldErrors> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }

        let language = if self.language.trim().is_empty() {
            "english".to_string()
        } else {
            self.language
        };

        Ok(Profile {
            user_id,
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email,
            date_of_birth: self.date_of_birth,
            mobile: self.mobile,
            parent_name: self.parent_name,
            parent_contact: self.parent_contact,
            address: self.address,
            bio: self.bio,
            language,
        })
    }
}
