//! Integration tests for the password reset protocol.

mod helpers;

use warden_cache::keys;
use warden_core::error::ErrorKind;
use warden_core::events::notification::ACTION_PASSWORD_RESET;
use warden_core::traits::CacheProvider;

#[tokio::test]
async fn test_reset_request_sends_link_once() {
    let app = helpers::TestApp::new();
    app.create_alice();

    let state = app.service.request_reset("alice@example.com").await.unwrap();
    assert_eq!(state.principal_handle, "alice");
    assert!(state.active);

    let err = app
        .service
        .request_reset("alice@example.com")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let sent = app.notifier.with_action(ACTION_PASSWORD_RESET).await;
    assert_eq!(sent.len(), 1);
    let link = sent[0].metadata.get("link").unwrap();
    assert!(link.ends_with(&format!("?token={}", state.token)));

    assert_eq!(
        app.cache.get(&keys::reset_active("alice")).await.unwrap(),
        Some(state.token.clone())
    );
}

#[tokio::test]
async fn test_reset_request_for_unknown_email() {
    let app = helpers::TestApp::new();
    assert_eq!(
        app.service
            .request_reset("nobody@example.com")
            .await
            .unwrap_err()
            .kind,
        ErrorKind::NotFound
    );
    assert_eq!(
        app.service.request_reset(" ").await.unwrap_err().kind,
        ErrorKind::Validation
    );
}

#[tokio::test]
async fn test_empty_secret_burns_the_only_retry() {
    let app = helpers::TestApp::new();
    app.create_alice();
    let state = app.service.request_reset("alice@example.com").await.unwrap();

    let err = app
        .service
        .reset_password(&state.token, "")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(
        app.cache.get(&keys::reset_invalid("alice")).await.unwrap().as_deref(),
        Some("1")
    );

    let err = app
        .service
        .reset_password(&state.token, "ValidPass1!")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Throttled);
}

#[tokio::test]
async fn test_successful_reset_clears_state_and_ends_session() {
    let app = helpers::TestApp::new();
    app.create_alice();
    let session = app.service.login("alice", "CorrectPass1!").await.unwrap();
    let header = format!("Bearer {}", session.tokens.access.token);
    assert!(app.service.authorize(Some(&header)).await.is_ok());

    let state = app.service.request_reset("alice@example.com").await.unwrap();
    app.service
        .reset_password(&state.token, "ValidPass1!")
        .await
        .unwrap();

    for key in [
        keys::reset_token(&state.token),
        keys::reset_active("alice"),
        keys::reset_invalid("alice"),
        keys::access_token("alice"),
    ] {
        assert!(!app.cache.exists(&key).await.unwrap(), "{key} survived");
    }

    assert_eq!(
        app.service.authorize(Some(&header)).await.unwrap_err().kind,
        ErrorKind::Authentication
    );
    assert_eq!(
        app.service.login("alice", "CorrectPass1!").await.unwrap_err().kind,
        ErrorKind::Authentication
    );
    assert!(app.service.login("alice", "ValidPass1!").await.is_ok());

    // a consumed token cannot be replayed
    assert_eq!(
        app.service
            .reset_password(&state.token, "AnotherPass2@")
            .await
            .unwrap_err()
            .kind,
        ErrorKind::Authentication
    );
}

#[tokio::test]
async fn test_failed_credential_update_counts_as_invalid() {
    let app = helpers::TestApp::new();
    app.create_alice();
    let state = app.service.request_reset("alice@example.com").await.unwrap();

    app.store.set_fail_updates(true);
    let err = app
        .service
        .reset_password(&state.token, "ValidPass1!")
        .await
        .unwrap_err();
    assert!(err.is_dependency());

    app.store.set_fail_updates(false);
    assert_eq!(
        app.service
            .reset_password(&state.token, "ValidPass1!")
            .await
            .unwrap_err()
            .kind,
        ErrorKind::Throttled
    );
}

#[tokio::test]
async fn test_publish_failure_leaves_no_reset_state() {
    let app = helpers::TestApp::new();
    app.create_alice();

    app.notifier.set_failing(true);
    let err = app
        .service
        .request_reset("alice@example.com")
        .await
        .unwrap_err();
    assert!(err.is_dependency());
    assert!(!app.cache.exists(&keys::reset_active("alice")).await.unwrap());

    app.notifier.set_failing(false);
    assert!(app.service.request_reset("alice@example.com").await.is_ok());
}
