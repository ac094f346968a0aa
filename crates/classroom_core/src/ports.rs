//! crates/classroom_core/src/ports.rs
//!
//! Defines the service contracts (traits) the core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the
//! stores independent of where state is persisted and how the backend is reached.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., filesystem, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// String key-value persistence with the shape of browser local storage.
///
/// Each call is a single atomic operation: once it returns, the write is
/// visible to every later read, including one from a freshly started process.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Returns `None` when the key has never been written or was removed.
    async fn get_item(&self, key: &str) -> PortResult<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> PortResult<()>;

    /// Removing a missing key is not an error.
    async fn remove_item(&self, key: &str) -> PortResult<()>;
}

#[async_trait]
pub trait ClassroomBackend: Send + Sync {
    /// Connectivity check against the backend's hello endpoint.
    async fn hello(&self) -> PortResult<String>;
}
