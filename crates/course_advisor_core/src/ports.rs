//! crates/course_advisor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of the completion provider and of the storage backend.

use async_trait::async_trait;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Upstream service error: {0}")]
    Upstream(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends a single prompt to the text-completion model and returns its raw text.
    async fn complete(&self, model: &str, prompt: &str) -> PortResult<String>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the blob stored under `namespace`, if any.
    async fn get(&self, namespace: &str) -> PortResult<Option<String>>;

    /// Replaces the blob stored under `namespace`.
    async fn put(&self, namespace: &str, value: &str) -> PortResult<()>;
}
