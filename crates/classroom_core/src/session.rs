//! crates/classroom_core/src/session.rs
//!
//! The session store: the single owner of "who is signed in, and as what".
//!
//! Every mutation writes through to the injected `KeyValueStorage` before the
//! in-memory snapshot changes, so a fresh `restore()` always observes the same
//! session the previous process last published.

use crate::domain::{Role, SessionSnapshot, User};
use crate::ports::{KeyValueStorage, PortError};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Storage key of the opaque credential.
pub const TOKEN_KEY: &str = "token";
/// Storage key of the JSON-encoded `User`.
pub const USER_KEY: &str = "user";

//=========================================================================================
// Errors
//=========================================================================================

/// Returned by `login`/`register` when the session could not be persisted.
/// The in-memory session is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Failed to sign in")]
    Persist(#[source] PortError),
    #[error("Failed to sign in")]
    Encode(#[from] serde_json::Error),
}

/// Why a persisted session was discarded. Never leaves this module.
#[derive(Debug, thiserror::Error)]
enum RestoreError {
    #[error("no persisted session")]
    Missing,
    #[error("persisted user record is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("persisted session could not be read: {0}")]
    Storage(#[from] PortError),
}

//=========================================================================================
// Registration
//=========================================================================================

/// Sign-up form data. No credential check happens; the account exists locally only.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
}

//=========================================================================================
// SessionStore
//=========================================================================================

pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
    state: watch::Sender<SessionSnapshot>,
    /// Serializes write-through + publish so the two are observed as one step.
    writes: Mutex<()>,
}

impl SessionStore {
    /// Creates a store in the `loading` state. Call `restore()` once at startup.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::restoring());
        Self {
            storage,
            state,
            writes: Mutex::new(()),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// Notified on every published change of the session.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    /// Waits until the startup restore has finished and returns the session at that point.
    pub async fn ready(&self) -> SessionSnapshot {
        let mut rx = self.state.subscribe();
        let outcome = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        // The sender lives in `self`, so the channel cannot close while we wait.
        outcome.unwrap_or_else(|_| self.snapshot())
    }

    /// Loads the persisted session, discarding it if either entry is missing or corrupt.
    ///
    /// Always leaves the store with `loading == false`.
    pub async fn restore(&self) -> SessionSnapshot {
        let _guard = self.writes.lock().await;

        let next = match self.read_persisted().await {
            Ok((user, token)) => {
                info!(user_id = %user.id, role = %user.role, "Restored persisted session");
                SessionSnapshot::authenticated(user, token)
            }
            Err(RestoreError::Missing) => {
                debug!("No persisted session found");
                self.clear_persisted().await;
                SessionSnapshot::anonymous()
            }
            Err(e) => {
                warn!("Discarding persisted session: {}", e);
                self.clear_persisted().await;
                SessionSnapshot::anonymous()
            }
        };

        self.state.send_replace(next.clone());
        next
    }

    /// Persists `user` and `token`, then makes them the current session.
    pub async fn login(&self, user: User, token: String) -> Result<SessionSnapshot, AuthError> {
        let _guard = self.writes.lock().await;

        let encoded = serde_json::to_string(&user)?;
        self.storage
            .set_item(USER_KEY, &encoded)
            .await
            .map_err(AuthError::Persist)?;

        if let Err(e) = self.storage.set_item(TOKEN_KEY, &token).await {
            self.roll_back_user_entry().await;
            return Err(AuthError::Persist(e));
        }

        info!(user_id = %user.id, role = %user.role, "User signed in");
        let next = SessionSnapshot::authenticated(user, token);
        self.state.send_replace(next.clone());
        Ok(next)
    }

    /// Creates a local account with a fabricated id and token and signs it in.
    pub async fn register(&self, request: RegistrationRequest) -> Result<SessionSnapshot, AuthError> {
        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            email: request.email,
            role: request.role,
        };
        let token = format!("mock-token-{}", Uuid::new_v4());
        self.login(user, token).await
    }

    /// Clears the persisted and in-memory session. Storage failures are logged, never returned.
    pub async fn logout(&self) {
        let _guard = self.writes.lock().await;
        self.clear_persisted().await;

        let previous = self.state.send_replace(SessionSnapshot::anonymous());
        if let Some(user) = previous.user {
            info!(user_id = %user.id, "User signed out");
        }
    }

    async fn read_persisted(&self) -> Result<(User, String), RestoreError> {
        let token = self
            .storage
            .get_item(TOKEN_KEY)
            .await?
            .filter(|t| !t.is_empty());
        let raw_user = self.storage.get_item(USER_KEY).await?;

        match (token, raw_user) {
            (Some(token), Some(raw_user)) => {
                let user: User = serde_json::from_str(&raw_user)?;
                Ok((user, token))
            }
            _ => Err(RestoreError::Missing),
        }
    }

    async fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key).await {
                warn!(key, "Failed to clear persisted session entry: {}", e);
            }
        }
    }

    /// Puts the `user` entry back to what the current in-memory session says.
    async fn roll_back_user_entry(&self) {
        let previous = self.state.borrow().user.clone();
        let result = match previous.map(|u| serde_json::to_string(&u)) {
            Some(Ok(encoded)) => self.storage.set_item(USER_KEY, &encoded).await,
            Some(Err(e)) => Err(PortError::Unexpected(e.to_string())),
            None => self.storage.remove_item(USER_KEY).await,
        };
        if let Err(e) = result {
            warn!("Failed to roll back persisted user after a failed sign-in: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PortResult;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    /// In-memory storage that can be told to reject writes to one key, or every read.
    #[derive(Default)]
    struct FakeStorage {
        items: std::sync::Mutex<HashMap<String, String>>,
        reject_writes_to: Option<&'static str>,
        reject_reads: bool,
    }

    impl FakeStorage {
        fn rejecting(key: &'static str) -> Self {
            Self {
                reject_writes_to: Some(key),
                ..Self::default()
            }
        }

        fn unreadable() -> Self {
            Self {
                reject_reads: true,
                ..Self::default()
            }
        }

        fn seed(&self, key: &str, value: &str) {
            self.items
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
        }

        fn get(&self, key: &str) -> Option<String> {
            self.items.lock().unwrap().get(key).cloned()
        }
    }

    #[async_trait]
    impl KeyValueStorage for FakeStorage {
        async fn get_item(&self, key: &str) -> PortResult<Option<String>> {
            if self.reject_reads {
                return Err(PortError::Unexpected("permission denied".to_string()));
            }
            Ok(self.get(key))
        }

        async fn set_item(&self, key: &str, value: &str) -> PortResult<()> {
            if self.reject_writes_to == Some(key) {
                return Err(PortError::Unexpected("disk full".to_string()));
            }
            self.seed(key, value);
            Ok(())
        }

        async fn remove_item(&self, key: &str) -> PortResult<()> {
            self.items.lock().unwrap().remove(key);
            Ok(())
        }
    }

    fn alice() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            role: Role::Student,
        }
    }

    #[tokio::test]
    async fn starts_loading_and_restores_to_anonymous_when_nothing_is_persisted() {
        let store = SessionStore::new(Arc::new(FakeStorage::default()));
        assert!(store.snapshot().loading);

        let restored = store.restore().await;
        assert_eq!(restored, SessionSnapshot::anonymous());
        assert!(!store.snapshot().loading);
    }

    #[tokio::test]
    async fn login_survives_a_reload() {
        let storage = Arc::new(FakeStorage::default());
        let store = SessionStore::new(storage.clone());
        store.restore().await;

        let user = alice();
        store.login(user.clone(), "tok-1".to_string()).await.unwrap();

        let reloaded = SessionStore::new(storage);
        let restored = reloaded.restore().await;
        assert_eq!(restored.user, Some(user));
        assert_eq!(restored.token.as_deref(), Some("tok-1"));
        assert!(restored.is_authenticated());
    }

    #[tokio::test]
    async fn corrupt_user_record_is_discarded() {
        let storage = Arc::new(FakeStorage::default());
        storage.seed(TOKEN_KEY, "tok");
        storage.seed(USER_KEY, "{not json");

        let store = SessionStore::new(storage.clone());
        let restored = store.restore().await;

        assert_eq!(restored, SessionSnapshot::anonymous());
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[tokio::test]
    async fn unknown_role_is_treated_as_corrupt() {
        let storage = Arc::new(FakeStorage::default());
        storage.seed(TOKEN_KEY, "tok");
        storage.seed(
            USER_KEY,
            r#"{"id":"8a6e0804-2bd0-4672-b79d-d97027f9071a","name":"Eve","email":"eve@example.com","role":"admin"}"#,
        );

        let store = SessionStore::new(storage);
        assert!(!store.restore().await.is_authenticated());
    }

    #[tokio::test]
    async fn capitalised_role_from_older_clients_restores() {
        let storage = Arc::new(FakeStorage::default());
        storage.seed(TOKEN_KEY, "mock-token");
        storage.seed(
            USER_KEY,
            r#"{"id":"8a6e0804-2bd0-4672-b79d-d97027f9071a","name":"Demo User","email":"teacher@example.com","role":"Teacher"}"#,
        );

        let store = SessionStore::new(storage);
        assert_eq!(store.restore().await.role(), Some(Role::Teacher));
    }

    #[tokio::test]
    async fn user_without_token_is_not_a_session() {
        let storage = Arc::new(FakeStorage::default());
        let user = alice();
        storage.seed(USER_KEY, &serde_json::to_string(&user).unwrap());

        let store = SessionStore::new(storage.clone());
        assert!(!store.restore().await.is_authenticated());
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[tokio::test]
    async fn restore_then_logout_is_always_anonymous() {
        let storage = Arc::new(FakeStorage::default());
        storage.seed(TOKEN_KEY, "tok");
        storage.seed(USER_KEY, &serde_json::to_string(&alice()).unwrap());

        let store = SessionStore::new(storage.clone());
        assert!(store.restore().await.is_authenticated());

        store.logout().await;
        assert_eq!(store.snapshot(), SessionSnapshot::anonymous());
        assert_eq!(storage.get(TOKEN_KEY), None);
    }

    #[tokio::test]
    async fn failed_token_write_leaves_session_unchanged() {
        let storage = Arc::new(FakeStorage::rejecting(TOKEN_KEY));
        let store = SessionStore::new(storage.clone());
        store.restore().await;

        let err = store.login(alice(), "tok".to_string()).await.unwrap_err();
        assert!(matches!(err, AuthError::Persist(_)));
        assert_eq!(err.to_string(), "Failed to sign in");

        assert_eq!(store.snapshot(), SessionSnapshot::anonymous());
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[tokio::test]
    async fn failed_token_write_restores_the_previous_user_entry() {
        let storage = Arc::new(FakeStorage::rejecting(TOKEN_KEY));
        let previous = alice();
        let previous_record = serde_json::to_string(&previous).unwrap();
        storage.seed(TOKEN_KEY, "old");
        storage.seed(USER_KEY, &previous_record);

        let store = SessionStore::new(storage.clone());
        assert!(store.restore().await.is_authenticated());

        let mut other = alice();
        other.name = "Bob".to_string();
        assert!(store.login(other, "new".to_string()).await.is_err());

        assert_eq!(storage.get(USER_KEY), Some(previous_record));
        assert_eq!(storage.get(TOKEN_KEY).as_deref(), Some("old"));
        assert_eq!(store.snapshot().user, Some(previous));
    }

    #[tokio::test]
    async fn unreadable_storage_restores_to_anonymous_and_clears_entries() {
        let storage = Arc::new(FakeStorage::unreadable());
        storage.seed(TOKEN_KEY, "tok");
        storage.seed(USER_KEY, &serde_json::to_string(&alice()).unwrap());

        let store = SessionStore::new(storage.clone());
        let restored = store.restore().await;

        assert_eq!(restored, SessionSnapshot::anonymous());
        assert!(!store.snapshot().loading);
        assert_eq!(storage.get(TOKEN_KEY), None);
        assert_eq!(storage.get(USER_KEY), None);
    }

    #[tokio::test]
    async fn failed_user_write_keeps_the_previous_user() {
        let storage = Arc::new(FakeStorage::rejecting(USER_KEY));
        storage.seed(TOKEN_KEY, "old");
        let previous = alice();
        storage.seed(USER_KEY, &serde_json::to_string(&previous).unwrap());

        let store = SessionStore::new(storage);
        store.restore().await;

        let mut other = alice();
        other.name = "Bob".to_string();
        assert!(store.login(other, "new".to_string()).await.is_err());
        assert_eq!(store.snapshot().user, Some(previous));
    }

    #[tokio::test]
    async fn register_fabricates_id_and_token() {
        let storage = Arc::new(FakeStorage::default());
        let store = SessionStore::new(storage.clone());
        store.restore().await;

        let session = store
            .register(RegistrationRequest {
                name: "Tess".to_string(),
                email: "tess@example.com".to_string(),
                role: Role::Teacher,
            })
            .await
            .unwrap();

        assert_eq!(session.role(), Some(Role::Teacher));
        let token = session.token.unwrap();
        assert!(token.starts_with("mock-token-"));
        assert_eq!(storage.get(TOKEN_KEY), Some(token));
    }

    #[tokio::test]
    async fn ready_waits_for_restore() {
        let store = Arc::new(SessionStore::new(Arc::new(FakeStorage::default())));
        let mut changes = store.subscribe();

        let restorer = store.clone();
        let handle = tokio::spawn(async move {
            tokio::task::yield_now().await;
            restorer.restore().await
        });

        let ready = store.ready().await;
        assert!(!ready.loading);
        assert!(!changes.borrow_and_update().loading);
        handle.await.unwrap();
    }
}
