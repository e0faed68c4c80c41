//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP adapter, which is the concrete implementation
//! of the `LinkResolver` port from the `core` crate. It performs one exchange
//! per call with `reqwest` and classifies every response the same way.

use async_trait::async_trait;
use moviereview_core::domain::{
    error_message, normalize_document, Credentials, HttpMethod, HypermediaDocument, Link, Token,
};
use moviereview_core::ports::{LinkResolver, LoginError, PortResult, ResolveError, Resolved};
use reqwest::header::{ACCEPT, AUTHORIZATION, LOCATION};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

use crate::app::store::Store;
use crate::config::Config;

const JSON: &str = "application/json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A link resolver that talks to the movie review API over HTTP.
#[derive(Clone)]
pub struct HttpLinkResolver {
    client: Client,
    base_url: Url,
    root_path: String,
    store: Arc<Store>,
}

impl HttpLinkResolver {
    /// Creates a new `HttpLinkResolver`.
    pub fn new(base_url: Url, root_path: impl Into<String>, store: Arc<Store>) -> Self {
        Self {
            client: Client::new(),
            base_url,
            root_path: root_path.into(),
            store,
        }
    }

    pub fn from_config(config: &Config, store: Arc<Store>) -> Self {
        Self::new(config.api_base_url.clone(), config.root_path.clone(), store)
    }

    /// Joins an absolute or root-relative href onto the base URL.
    fn resolve_href(&self, href: &str) -> PortResult<Url> {
        self.base_url
            .join(href)
            .map_err(|e| ResolveError::malformed(format!("invalid href '{}': {}", href, e)))
    }

    async fn exchange(
        &self,
        method: HttpMethod,
        url: Url,
        body: Option<&Value>,
        authorize: bool,
    ) -> PortResult<Resolved> {
        let mut request = self.client.request(to_reqwest(&method)?, url.clone());
        if authorize {
            // Read per call; the header is sent even when there is no credential.
            let credential = self.store.stored_credential().unwrap_or_default();
            request = request.header(AUTHORIZATION, credential);
        }
        if matches!(method, HttpMethod::Get | HttpMethod::Post) {
            request = request.header(ACCEPT, JSON);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!("{} {}", method.as_str(), url);
        let response = request.send().await.map_err(|e| {
            warn!("{} {} failed before a response arrived: {}", method.as_str(), url, e);
            ResolveError::Unreachable(e.to_string())
        })?;

        self.classify(&url, response).await
    }

    async fn classify(&self, url: &Url, response: Response) -> PortResult<Resolved> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if self.store.evict_session() {
                info!("{} answered 401; session cleared", url);
            }
            return Err(ResolveError::Unauthenticated);
        }

        if !status.is_success() {
            let message = response
                .bytes()
                .await
                .ok()
                .and_then(|bytes| serde_json::from_slice::<Value>(&bytes).ok())
                .and_then(|payload| error_message(&payload));
            warn!("{} answered {}", url, status);
            return Err(ResolveError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        if status == StatusCode::CREATED {
            if let Some(location) = response.headers().get(LOCATION) {
                let location = location
                    .to_str()
                    .map_err(|e| ResolveError::malformed(format!("unreadable Location: {}", e)))?;
                return Ok(Resolved::Created {
                    location: location.to_string(),
                });
            }
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ResolveError::Unreachable(e.to_string()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Resolved::Empty);
        }
        let payload: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ResolveError::malformed(format!("{} returned invalid JSON: {}", url, e)))?;
        Ok(Resolved::Json(normalize_document(payload)))
    }
}

fn to_reqwest(method: &HttpMethod) -> PortResult<Method> {
    match method {
        HttpMethod::Get => Ok(Method::GET),
        HttpMethod::Post => Ok(Method::POST),
        HttpMethod::Put => Ok(Method::PUT),
        HttpMethod::Patch => Ok(Method::PATCH),
        HttpMethod::Delete => Ok(Method::DELETE),
        HttpMethod::Other(verb) => Err(ResolveError::malformed(format!(
            "link uses unsupported method '{}'",
            verb
        ))),
    }
}

//=========================================================================================
// `LinkResolver` Trait Implementation
//=========================================================================================

#[async_trait]
impl LinkResolver for HttpLinkResolver {
    async fn fetch_root(&self) -> PortResult<HypermediaDocument> {
        let url = self.resolve_href(&self.root_path)?;
        match self.exchange(HttpMethod::Get, url, None, false).await? {
            Resolved::Json(value) => serde_json::from_value(value)
                .map_err(|e| ResolveError::malformed(format!("root document: {}", e))),
            _ => Err(ResolveError::malformed("root document has no body")),
        }
    }

    async fn fetch_resource(&self, link: &Link, body: Option<&Value>) -> PortResult<Resolved> {
        let url = self.resolve_href(&link.href)?;
        self.exchange(link.method(), url, body, true).await
    }

    async fn login(&self, login: &Link, credentials: &Credentials) -> Result<Token, LoginError> {
        let url = self.resolve_href(&login.href).map_err(|e| {
            warn!("Login link is unusable: {}", e);
            LoginError::Unreachable
        })?;

        // No stored credential is attached: this call establishes a new one.
        let response = self
            .client
            .post(url)
            .header(ACCEPT, JSON)
            .json(credentials)
            .send()
            .await
            .map_err(|e| {
                warn!("Login request failed before a response arrived: {}", e);
                LoginError::Unreachable
            })?;

        if response.status() != StatusCode::OK {
            info!("Login rejected with status {}", response.status());
            return Err(LoginError::InvalidCredentials);
        }

        response
            .json::<Token>()
            .await
            .map_err(|e| LoginError::MalformedResponse(e.to_string()))
    }
}
