//! services/client/src/app/store.rs
//!
//! The injectable, process-wide application state container. Created once at
//! startup and shared by `Arc` with everything that reads or changes state.
//! Dropping the last handle closes every subscriber channel.

use moviereview_core::domain::{Endpoint, Link, User};
use moviereview_core::ports::{SessionStore, CREDENTIAL_KEY};
use moviereview_core::state::{reduce, Action, AppState};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

const NAVIGATION_CAPACITY: usize = 16;

/// Requests the view layer should act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The session expired; show the login screen.
    Login,
}

/// Reactive holder of the current `AppState` snapshot.
pub struct Store {
    state: watch::Sender<AppState>,
    session_store: Arc<dyn SessionStore>,
    navigation: broadcast::Sender<Navigation>,
}

impl Store {
    /// Creates the store, seeding the credential from the session store so a
    /// restart restores an existing session before anything renders.
    pub fn new(session_store: Arc<dyn SessionStore>) -> Self {
        let credential = session_store.get(CREDENTIAL_KEY);
        if credential.is_some() {
            info!("Restored a persisted session credential");
        }
        let (state, _) = watch::channel(AppState::with_credential(credential));
        let (navigation, _) = broadcast::channel(NAVIGATION_CAPACITY);
        Self {
            state,
            session_store,
            navigation,
        }
    }

    /// Applies `action` and returns whether the state changed.
    ///
    /// `SetToken` and `ClearSession` are written through to the session store
    /// under the same lock as the state change. `SessionStore` is synchronous,
    /// so a file-backed store does a blocking write while the lock is held.
    pub fn dispatch(&self, action: Action) -> bool {
        debug!(action = action_name(&action), "dispatch");
        self.state.send_if_modified(|state| {
            match &action {
                Action::SetToken { token } => self.session_store.set(CREDENTIAL_KEY, token),
                Action::ClearSession => self.session_store.delete(CREDENTIAL_KEY),
                _ => {}
            }
            let next = reduce(state, &action);
            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        })
    }

    /// Clears the session after an authentication failure.
    ///
    /// Only a call that actually changed the state emits `Navigation::Login`,
    /// so concurrent 401s navigate once.
    pub fn evict_session(&self) -> bool {
        let evicted = self.dispatch(Action::ClearSession);
        if evicted {
            info!("Session evicted; requesting navigation to login");
            // No subscribers is fine: nobody is rendering.
            let _ = self.navigation.send(Navigation::Login);
        }
        evicted
    }

    /// A copy of the current snapshot.
    pub fn snapshot(&self) -> AppState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    pub fn subscribe_navigation(&self) -> broadcast::Receiver<Navigation> {
        self.navigation.subscribe()
    }

    pub fn endpoint(&self, endpoint: Endpoint) -> Option<Link> {
        self.state.borrow().endpoint(endpoint).cloned()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().current_user().cloned()
    }

    /// Reads the credential straight from the session store, bypassing the
    /// snapshot, so each request sees the freshest value.
    pub fn stored_credential(&self) -> Option<String> {
        self.session_store.get(CREDENTIAL_KEY)
    }
}

fn action_name(action: &Action) -> &'static str {
    match action {
        Action::SetLink { .. } => "set_link",
        Action::UnsetLink { .. } => "unset_link",
        Action::SetToken { .. } => "set_token",
        Action::ClearSession => "clear_session",
        Action::SetCurrentUser { .. } => "set_current_user",
    }
}
