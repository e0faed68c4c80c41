//! crates/moviereview_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client core depends on, plus the
//! error taxonomy every resource fetch is classified into. Concrete HTTP and
//! storage implementations live in the `client` service.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::domain::{Credentials, HypermediaDocument, Link, Token};

//=========================================================================================
// Error Taxonomy
//=========================================================================================

/// The classification applied to every resolver call except login.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// HTTP 401. The resolver evicts the session before returning this.
    #[error("Unauthenticated")]
    Unauthenticated,
    /// Any other non-2xx status, with the server's message if it sent one.
    #[error("Request failed with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    RequestFailed { status: u16, message: Option<String> },
    /// No response was received.
    #[error("The server could not be reached: {0}")]
    Unreachable(String),
    /// A 2xx response whose body could not be decoded.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl ResolveError {
    /// The server-provided message of a failed request.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::RequestFailed { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

/// The narrower classification of the login exchange. The server's own
/// message is deliberately not carried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Could not reach the authentication server")]
    Unreachable,
    #[error("Malformed login response: {0}")]
    MalformedResponse(String),
}

/// A convenience type alias for `Result<T, ResolveError>`.
pub type PortResult<T> = Result<T, ResolveError>;

//=========================================================================================
// Resolved Responses
//=========================================================================================

/// The successful outcome of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    /// A JSON body, already normalized to plain `controls`.
    Json(Value),
    /// A 201 carrying the new resource's `Location`.
    Created { location: String },
    /// A 2xx without a body.
    Empty,
}

impl Resolved {
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Created { location } => Some(location),
            _ => None,
        }
    }

    /// Decodes a JSON body into `T`; anything else is a malformed response.
    pub fn decode<T: DeserializeOwned>(self) -> PortResult<T> {
        match self {
            Self::Json(value) => {
                serde_json::from_value(value).map_err(|e| ResolveError::malformed(e.to_string()))
            }
            Self::Created { location } => Err(ResolveError::malformed(format!(
                "expected a JSON body, got a Location ({location})"
            ))),
            Self::Empty => Err(ResolveError::malformed("expected a JSON body, got none")),
        }
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Performs exactly one HTTP exchange per call and classifies the outcome.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    /// Unauthenticated GET of the well-known root document.
    async fn fetch_root(&self) -> PortResult<HypermediaDocument>;

    /// Follows `link` with its method, attaching the current credential.
    async fn fetch_resource(&self, link: &Link, body: Option<&Value>) -> PortResult<Resolved>;

    /// Unauthenticated POST of the credentials to the login link.
    async fn login(&self, login: &Link, credentials: &Credentials) -> Result<Token, LoginError>;
}

/// The key the credential is persisted under.
pub const CREDENTIAL_KEY: &str = "AUTHENTICATION_TOKEN_KEY";

/// Synchronous key/value persistence that survives restarts. Implementations
/// that cannot persist behave as a no-op store.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn delete(&self, key: &str);
}
