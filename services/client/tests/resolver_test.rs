mod common;

use client_lib::app::{apply_root, Navigation};
use common::{alice_json, mason_root, unreachable_resolver, Harness};
use futures::future::join_all;
use moviereview_core::domain::{normalize_document, Credentials, Endpoint, HttpMethod, Hypermedia, Link, User};
use moviereview_core::ports::{LinkResolver, LoginError, ResolveError, Resolved, SessionStore, CREDENTIAL_KEY};
use moviereview_core::state::Action;
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_fetch_root_reads_plain_controls() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "controls": { "movies-all": { "title": "All movies", "href": "/movies" } }
        })))
        .mount(&h.server)
        .await;

    let root = h.resolver.fetch_root().await.unwrap();
    apply_root(&h.store, &root);

    assert_eq!(h.store.snapshot().endpoint_href(Endpoint::MoviesAll), Some("/movies"));
}

#[tokio::test]
async fn test_fetch_root_normalizes_mason() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(mason_root()))
        .mount(&h.server)
        .await;

    let root = h.resolver.fetch_root().await.unwrap();

    assert_eq!(root.control("login").unwrap().method(), HttpMethod::Post);
    assert_eq!(root.control("current-user").unwrap().href, "/users/current");
    assert!(root.control("add-movie").is_none());
}

#[tokio::test]
async fn test_unknown_method_only_disables_its_own_link() {
    let h = Harness::start().await;
    let mut root = mason_root();
    root["@controls"]["moviereviewmeta:x-head"] = json!({ "href": "/h", "method": "HEAD" });
    root["@controls"]["moviereviewmeta:login"]["method"] = json!("post");
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(root))
        .mount(&h.server)
        .await;

    let root = h.resolver.fetch_root().await.unwrap();
    apply_root(&h.store, &root);

    assert_eq!(h.store.snapshot().endpoint_href(Endpoint::MoviesAll), Some("/movies"));
    assert_eq!(root.control("login").unwrap().method(), HttpMethod::Post);

    let err = h
        .resolver
        .fetch_resource(root.control("x-head").unwrap(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MalformedResponse(_)));
    assert_eq!(h.server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_server_error_carries_message() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .mount(&h.server)
        .await;

    let err = h.resolver.fetch_resource(&Link::get("/movies"), None).await.unwrap_err();

    assert_eq!(
        err,
        ResolveError::RequestFailed { status: 500, message: Some("boom".to_string()) }
    );
}

#[tokio::test]
async fn test_not_found_without_body() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/movies/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&h.server)
        .await;

    let err = h.resolver.fetch_resource(&Link::get("/movies/99"), None).await.unwrap_err();

    assert_eq!(err, ResolveError::RequestFailed { status: 404, message: None });
}

#[tokio::test]
async fn test_network_failure_is_unreachable() {
    let resolver = unreachable_resolver();

    let err = resolver.fetch_resource(&Link::get("/movies"), None).await.unwrap_err();
    assert!(matches!(err, ResolveError::Unreachable(_)));

    let err = resolver.fetch_root().await.unwrap_err();
    assert!(matches!(err, ResolveError::Unreachable(_)));
}

#[tokio::test]
async fn test_created_returns_location() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/movies/7/reviews"))
        .respond_with(ResponseTemplate::new(201).insert_header("Location", "/reviews/42"))
        .mount(&h.server)
        .await;

    let link = Link::get("/movies/7/reviews").with_method(HttpMethod::Post);
    let resolved = h
        .resolver
        .fetch_resource(&link, Some(&json!({ "rating": 5 })))
        .await
        .unwrap();

    assert_eq!(resolved, Resolved::Created { location: "/reviews/42".to_string() });
}

#[tokio::test]
async fn test_empty_success_is_not_an_error() {
    let h = Harness::start().await;
    Mock::given(method("DELETE"))
        .and(path("/movies/7/reviews/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&h.server)
        .await;

    let link = Link::get("/movies/7/reviews/1").with_method(HttpMethod::Delete);
    let resolved = h.resolver.fetch_resource(&link, None).await.unwrap();

    assert_eq!(resolved, Resolved::Empty);
}

#[tokio::test]
async fn test_invalid_json_is_malformed() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&h.server)
        .await;

    let err = h.resolver.fetch_resource(&Link::get("/movies"), None).await.unwrap_err();
    assert!(matches!(err, ResolveError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_unauthorized_evicts_session_from_any_endpoint() {
    let h = Harness::start_with_credential(Some("stale-token")).await;
    let mut nav = h.store.subscribe_navigation();
    Mock::given(method("GET"))
        .and(path("/categories"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let alice: User = serde_json::from_value(normalize_document(alice_json())).unwrap();
    h.store.dispatch(Action::SetCurrentUser { user: alice });
    assert!(h.store.snapshot().is_authenticated());
    assert!(h.store.current_user().is_some());

    let err = h.resolver.fetch_resource(&Link::get("/categories"), None).await.unwrap_err();

    assert_eq!(err, ResolveError::Unauthenticated);
    let state = h.store.snapshot();
    assert_eq!(state.credential(), None);
    assert_eq!(state.current_user(), None);
    assert_eq!(h.session.get(CREDENTIAL_KEY), None);
    assert_eq!(nav.try_recv().unwrap(), Navigation::Login);
}

#[tokio::test]
async fn test_concurrent_unauthorized_navigates_once() {
    let h = Harness::start_with_credential(Some("stale-token")).await;
    let mut nav = h.store.subscribe_navigation();
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&h.server)
        .await;

    let links: Vec<Link> = ["/movies", "/categories", "/users/current"]
        .into_iter()
        .map(Link::get)
        .collect();
    let results = join_all(links.iter().map(|link| h.resolver.fetch_resource(link, None))).await;

    for result in results {
        assert_eq!(result.unwrap_err(), ResolveError::Unauthenticated);
    }
    assert_eq!(nav.try_recv().unwrap(), Navigation::Login);
    assert!(nav.try_recv().is_err());
    assert!(!h.store.snapshot().is_authenticated());
}

#[tokio::test]
async fn test_attaches_freshest_credential() {
    let h = Harness::start_with_credential(Some("first")).await;
    Mock::given(method("GET"))
        .and(path("/users/current"))
        .and(header("Authorization", "second"))
        .respond_with(ResponseTemplate::new(200).set_body_json(alice_json()))
        .expect(1)
        .mount(&h.server)
        .await;

    h.store.dispatch(Action::SetToken { token: "second".into() });
    let resolved = h
        .resolver
        .fetch_resource(&Link::get("/users/current"), None)
        .await
        .unwrap();

    assert!(matches!(resolved, Resolved::Json(_)));
}

#[tokio::test]
async fn test_sends_authorization_header_without_credential() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/movies"))
        .and(header_exists("Authorization"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&h.server)
        .await;

    h.resolver.fetch_resource(&Link::get("/movies"), None).await.unwrap();
}

#[tokio::test]
async fn test_login_returns_token() {
    let h = Harness::start_with_credential(Some("old-session")).await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "username": "alice", "password": "secret" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t-123" })))
        .expect(1)
        .mount(&h.server)
        .await;

    let credentials = Credentials { username: "alice".into(), password: "secret".into() };
    let token = h.resolver.login(&Link::get("/login"), &credentials).await.unwrap();

    assert_eq!(token.token, "t-123");
    let requests = h.server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_rejection_hides_server_message() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "message": "user alice does not exist" })),
        )
        .mount(&h.server)
        .await;

    let credentials = Credentials { username: "alice".into(), password: "wrong".into() };
    let err = h.resolver.login(&Link::get("/login"), &credentials).await.unwrap_err();

    assert_eq!(err, LoginError::InvalidCredentials);
    assert_eq!(err.to_string(), "Invalid credentials");
}

#[tokio::test]
async fn test_login_non_200_success_is_still_rejected() {
    let h = Harness::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "t" })))
        .mount(&h.server)
        .await;

    let credentials = Credentials { username: "alice".into(), password: "secret".into() };
    let err = h.resolver.login(&Link::get("/login"), &credentials).await.unwrap_err();
    assert_eq!(err, LoginError::InvalidCredentials);
}

#[tokio::test]
async fn test_login_unreachable() {
    let resolver = unreachable_resolver();

    let credentials = Credentials { username: "alice".into(), password: "secret".into() };
    let err = resolver.login(&Link::get("/login"), &credentials).await.unwrap_err();

    assert_eq!(err, LoginError::Unreachable);
    assert_eq!(err.to_string(), "Could not reach the authentication server");
}
