//! services/portal/src/adapters/backend.rs
//!
//! The REST client for the classroom backend. It implements the
//! `ClassroomBackend` port from the core crate.
//!
//! Every request carries the current session token as a bearer credential. A
//! `401` from the backend ends the local session.

use async_trait::async_trait;
use classroom_core::ports::{ClassroomBackend, PortError, PortResult};
use classroom_core::session::SessionStore;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Clone)]
pub struct RestBackend {
    client: Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl RestBackend {
    /// Creates a new `RestBackend` rooted at `base_url` (no trailing slash).
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            session,
        }
    }

    async fn get(&self, path: &str) -> PortResult<Response> {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(&url);
        if let Some(token) = self.session.snapshot().token {
            request = request.bearer_auth(token);
        }

        debug!(%url, "Calling backend");
        let response = request
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Backend request failed: {}", e)))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            warn!(%url, "Backend rejected the session token; signing out");
            self.session.logout().await;
            return Err(PortError::Unauthorized);
        }

        response
            .error_for_status()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}

//=========================================================================================
// `ClassroomBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl ClassroomBackend for RestBackend {
    async fn hello(&self) -> PortResult<String> {
        self.get("/test/hello")
            .await?
            .text()
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }
}
