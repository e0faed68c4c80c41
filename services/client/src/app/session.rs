//! services/client/src/app/session.rs
//!
//! Login, logout and session restore on top of the store and the resolver.

use moviereview_core::domain::{Credentials, Endpoint, User};
use moviereview_core::ports::{LinkResolver, LoginError, PortResult, ResolveError};
use moviereview_core::state::Action;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app::store::Store;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The root document does not advertise a login endpoint.
    #[error("Login is not available")]
    LoginUnavailable,

    #[error("{0}")]
    Login(#[from] LoginError),

    /// The token was issued but the profile could not be loaded.
    #[error("Something went wrong during the login")]
    ProfileUnavailable {
        #[source]
        cause: Option<ResolveError>,
    },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Drives the session lifecycle and keeps the store consistent with it.
#[derive(Clone)]
pub struct SessionService {
    store: Arc<Store>,
    resolver: Arc<dyn LinkResolver>,
}

impl SessionService {
    pub fn new(store: Arc<Store>, resolver: Arc<dyn LinkResolver>) -> Self {
        Self { store, resolver }
    }

    /// Logs in, stores the token and loads the current user.
    ///
    /// If the profile cannot be loaded afterwards the session is cleared again.
    pub async fn login(&self, credentials: &Credentials) -> Result<User, SessionError> {
        let login = self
            .store
            .endpoint(Endpoint::Login)
            .ok_or(SessionError::LoginUnavailable)?;

        let token = match self.resolver.login(&login, credentials).await {
            Ok(token) => token,
            Err(e) => {
                warn!("Login failed for {}: {}", credentials.username, e);
                self.store.dispatch(Action::ClearSession);
                return Err(e.into());
            }
        };
        self.store.dispatch(Action::SetToken { token: token.token });

        match self.fetch_current_user().await {
            Ok(Some(user)) => {
                info!("Logged in as {}", user.username);
                self.store.dispatch(Action::SetCurrentUser { user: user.clone() });
                Ok(user)
            }
            Ok(None) => {
                warn!("Current-user endpoint not advertised; dropping the new session");
                self.store.dispatch(Action::ClearSession);
                Err(SessionError::ProfileUnavailable { cause: None })
            }
            Err(e) => {
                warn!("Failed to load the current user after login: {}", e);
                self.store.dispatch(Action::ClearSession);
                Err(SessionError::ProfileUnavailable { cause: Some(e) })
            }
        }
    }

    /// Loads the profile for a credential restored from storage.
    ///
    /// Returns `Ok(None)` when there is nothing to restore. A 401 has already
    /// evicted the session by the time the error is returned; other failures
    /// keep the credential.
    pub async fn restore(&self) -> Result<Option<User>, SessionError> {
        if !self.store.snapshot().is_authenticated() {
            return Ok(None);
        }
        let Some(user) = self.fetch_current_user().await? else {
            return Ok(None);
        };
        info!("Restored session for {}", user.username);
        self.store.dispatch(Action::SetCurrentUser { user: user.clone() });
        Ok(Some(user))
    }

    pub fn logout(&self) {
        if self.store.dispatch(Action::ClearSession) {
            info!("Logged out");
        }
    }

    pub fn current_user(&self) -> Option<User> {
        self.store.current_user()
    }

    async fn fetch_current_user(&self) -> PortResult<Option<User>> {
        let Some(link) = self.store.endpoint(Endpoint::CurrentUser) else {
            return Ok(None);
        };
        let user = self.resolver.fetch_resource(&link, None).await?.decode::<User>()?;
        Ok(Some(user))
    }
}
