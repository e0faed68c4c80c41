//! services/client/src/error.rs
//!
//! Defines the primary error type for the client service.

use crate::app::session::SessionError;
use crate::config::ConfigError;
use moviereview_core::ports::ResolveError;

/// The primary error type for the `client` service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents a classified failure from the link resolver.
    #[error("Request error: {0}")]
    Resolve(#[from] ResolveError),

    /// Represents a failure of the login or session-restore flow.
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// A draft could not be encoded as JSON.
    #[error("Could not encode the request: {0}")]
    Encode(#[from] serde_json::Error),

    /// A draft is missing fields the server's write schema requires.
    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A feature the server does not currently advertise.
    #[error("Not available: {0}")]
    Unavailable(String),
}
