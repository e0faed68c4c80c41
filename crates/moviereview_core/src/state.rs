//! crates/moviereview_core/src/state.rs
//!
//! The application state snapshot and the pure reducer over it. Nothing here
//! performs I/O: the `client` service wraps this in a reactive container and
//! writes credentials through to the session store.

use std::collections::BTreeMap;

use crate::domain::{Endpoint, Link, User};

/// One immutable snapshot of the application state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    endpoints: BTreeMap<Endpoint, Link>,
    credential: Option<String>,
    current_user: Option<User>,
}

/// Every state transition the client can make.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Stores or overwrites one resolved endpoint; last write wins.
    SetLink { endpoint: Endpoint, link: Link },
    /// Drops an endpoint the latest root document no longer advertises.
    UnsetLink { endpoint: Endpoint },
    SetToken { token: String },
    /// Clears the credential and the current user in the same transition.
    ClearSession,
    SetCurrentUser { user: User },
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The initial state, seeded with a credential restored from storage.
    pub fn with_credential(credential: Option<String>) -> Self {
        Self {
            credential,
            ..Self::default()
        }
    }

    /// The resolved link for `endpoint`; `None` means the feature is unavailable.
    pub fn endpoint(&self, endpoint: Endpoint) -> Option<&Link> {
        self.endpoints.get(&endpoint)
    }

    pub fn endpoint_href(&self, endpoint: Endpoint) -> Option<&str> {
        self.endpoint(endpoint).map(|link| link.href.as_str())
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn current_user(&self) -> Option<&User> {
        self.current_user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }
}

/// `(previous state, action) -> next state`.
pub fn reduce(state: &AppState, action: &Action) -> AppState {
    let mut next = state.clone();
    match action {
        Action::SetLink { endpoint, link } => {
            next.endpoints.insert(*endpoint, link.clone());
        }
        Action::UnsetLink { endpoint } => {
            next.endpoints.remove(endpoint);
        }
        Action::SetToken { token } => {
            next.credential = Some(token.clone());
        }
        Action::ClearSession => {
            next.credential = None;
            next.current_user = None;
        }
        Action::SetCurrentUser { user } => {
            next.current_user = Some(user.clone());
        }
    }
    next
}
