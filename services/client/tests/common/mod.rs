//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use client_lib::adapters::{HttpLinkResolver, MemorySessionStore};
use client_lib::app::Store;
use moviereview_core::ports::{SessionStore, CREDENTIAL_KEY};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use url::Url;
use wiremock::MockServer;

pub struct Harness {
    pub server: MockServer,
    pub session: Arc<MemorySessionStore>,
    pub store: Arc<Store>,
    pub resolver: Arc<HttpLinkResolver>,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with_credential(None).await
    }

    pub async fn start_with_credential(credential: Option<&str>) -> Self {
        let server = MockServer::start().await;
        let session = Arc::new(MemorySessionStore::new());
        if let Some(credential) = credential {
            session.set(CREDENTIAL_KEY, credential);
        }
        let store = Arc::new(Store::new(session.clone()));
        let base = Url::parse(&server.uri()).unwrap();
        let resolver = Arc::new(HttpLinkResolver::new(base, "/", store.clone()));
        Self {
            server,
            session,
            store,
            resolver,
        }
    }
}

/// A base URL on a local port with nothing listening on it.
pub fn closed_base_url() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{}", addr)).unwrap()
}

/// A resolver pointed at `closed_base_url`.
pub fn unreachable_resolver() -> HttpLinkResolver {
    let store = Arc::new(Store::new(Arc::new(MemorySessionStore::new())));
    HttpLinkResolver::new(closed_base_url(), "/", store)
}

/// A root document in the server's Mason form.
pub fn mason_root() -> Value {
    json!({
        "@namespaces": { "moviereviewmeta": { "name": "/moviereviewmeta/link-relations/" } },
        "@controls": {
            "moviereviewmeta:movies-all": { "title": "All movies", "href": "/movies" },
            "moviereviewmeta:categories-all": { "title": "All categories", "href": "/categories" },
            "moviereviewmeta:login": { "title": "Login", "href": "/login", "method": "POST" },
            "moviereviewmeta:current-user": { "title": "Current user", "href": "/users/current" }
        }
    })
}

pub fn alice_json() -> Value {
    json!({
        "username": "alice",
        "email_address": "alice@example.com",
        "role": "Basic User",
        "@controls": {
            "self": { "href": "/users/alice" },
            "moviereviewmeta:reviews-of-user": { "href": "/users/alice/reviews" }
        }
    })
}

pub fn movie_json(id: i64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "director": "Someone",
        "length": 7200,
        "release_date": "1999-03-31",
        "category_id": 1,
        "@controls": {
            "self": { "href": format!("/movies/{}", id) },
            "moviereviewmeta:reviews-for-movie": { "href": format!("/movies/{}/reviews", id) }
        }
    })
}

pub fn review_json(id: i64, movie_id: i64, author: &str) -> Value {
    json!({
        "id": id,
        "rating": 4,
        "comment": "Worth it",
        "date": "2022-04-01T12:00:00+00:00",
        "author": author,
        "movie_id": movie_id,
        "@controls": {
            "self": { "href": format!("/movies/{}/reviews/{}", movie_id, id) }
        }
    })
}
