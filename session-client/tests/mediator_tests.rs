mod common;

use std::sync::atomic::Ordering;

use common::TestApp;
use common::PASSWORD;
use reqwest::StatusCode;
use session_client::outbound::http::MediatorSettings;
use session_client::outbound::http::RequestMediator;
use session_client::session::models::Credentials;
use session_client::session::ports::SessionPort;
use session_client::token::ports::TokenStore;

#[tokio::test]
async fn test_live_token_is_attached() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");
    let mediator = app.mediator(&session);

    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["username"], "alice");
    assert_eq!(app.resource_hits(), 1);
    assert_eq!(app.refresh_hits(), 0);
}

#[tokio::test]
async fn test_revoked_token_is_refreshed_and_request_replayed() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");
    let stale = session.access_token().expect("No access token");

    app.reject_next_resource_calls(1);
    let mediator = app.mediator(&session);
    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.resource_hits(), 2);
    assert_eq!(app.refresh_hits(), 1);
    assert!(session.is_authenticated());
    assert_ne!(session.access_token(), Some(stale));
}

#[tokio::test]
async fn test_failed_refresh_returns_original_401_and_ends_session() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("bob", PASSWORD))
        .await
        .expect("Login failed");

    app.reject_next_resource_calls(1);
    app.state.reject_refresh.store(true, Ordering::SeqCst);
    let mediator = app.mediator(&session);
    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.resource_hits(), 1);
    assert_eq!(app.refresh_hits(), 1);
    assert!(session.current_identity().is_none());
    assert!(!session.is_authenticated());
    assert!(app.store().get().is_none());
}

#[tokio::test]
async fn test_second_401_is_not_retried_again() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");

    app.reject_next_resource_calls(usize::MAX);
    let mediator = app.mediator(&session);
    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.resource_hits(), 2);
    assert_eq!(app.refresh_hits(), 1);
    // The refresh itself succeeded, so the session stays.
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_login_request_carries_no_token() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");
    let mediator = app.mediator(&session);

    let response = mediator
        .send(
            mediator
                .client()
                .post(app.url("/api/auth/login"))
                .json(&serde_json::json!({ "username": "alice", "password": "wrong" })),
        )
        .await
        .expect("Failed to execute request");

    // A rejected login is the caller's answer, not a reason to refresh.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.refresh_hits(), 0);
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn test_unlisted_origin_gets_no_token() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");

    let settings = MediatorSettings {
        protected_origins: vec!["https://api.example.com".to_string()],
        ..MediatorSettings::default()
    };
    let mediator = RequestMediator::new(reqwest::Client::new(), session, settings);

    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.resource_hits(), 1);
    assert_eq!(app.refresh_hits(), 0);
}

#[tokio::test]
async fn test_exempt_request_drops_caller_token() {
    let app = TestApp::spawn().await;
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");
    let mediator = app.mediator(&session);

    let response = mediator
        .send(
            mediator
                .client()
                .get(app.url("/api/echo/login"))
                .bearer_auth("caller-supplied"),
        )
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["authorization"].is_null());
}

#[tokio::test]
async fn test_expired_local_token_is_not_sent() {
    let app = TestApp::spawn().await;
    app.set_access_lifetime(-60);
    let session = app.session();
    session
        .login(&Credentials::new("alice", PASSWORD))
        .await
        .expect("Login failed");
    let mediator = app.mediator(&session);

    let response = mediator
        .send(mediator.client().get(app.url("/api/users/me")))
        .await
        .expect("Failed to execute request");

    // The expiry check ends the session, so neither a token nor a refresh goes out.
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(app.resource_hits(), 1);
    assert_eq!(app.refresh_hits(), 0);
    assert!(session.current_identity().is_none());
}
