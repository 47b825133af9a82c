//! Integration tests for API rate limiting, permission checks and handle existence.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use warden_auth::{BloomFilter, ExistenceIndex, MembershipFilter};
use warden_cache::keys;
use warden_core::error::ErrorKind;
use warden_core::traits::CacheProvider;

#[tokio::test]
async fn test_api_rate_limit_per_principal() {
    let app = helpers::TestApp::with_config(|c| c.rate_limit.api_max_requests = 3);
    let alice = app.create_alice();
    let outcome = app.service.login("alice", "CorrectPass1!").await.unwrap();
    let header = format!("Bearer {}", outcome.tokens.access.token);

    for _ in 0..3 {
        app.service.authorize(Some(&header)).await.unwrap();
    }
    let err = app.service.authorize(Some(&header)).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Throttled);

    let window = app
        .cache
        .ttl(&keys::api_calls(alice.id))
        .await
        .unwrap()
        .unwrap();
    assert!(window.as_secs() <= 120 && window.as_secs() > 100);
}

#[tokio::test]
async fn test_malformed_authorization_headers() {
    let app = helpers::TestApp::new();
    for header in ["", "Bearer", "Bearer ", "Basic abc", "Bearer not.a.jwt"] {
        let err = app.service.authorize(Some(header)).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication, "header {header:?}");
    }
}

#[tokio::test]
async fn test_permission_checks_are_cached() {
    let app = helpers::TestApp::new();
    let alice = app.create_alice();
    app.store.define_role("viewer", &["reports:read"]);
    app.store.assign_role(alice.id, "viewer");

    assert!(app.service.check_permission(alice.id, "reports:read").await.unwrap());
    assert_eq!(
        app.service
            .require_permission(alice.id, "reports:write")
            .await
            .unwrap_err()
            .kind,
        ErrorKind::Authorization
    );
    assert_eq!(
        app.store.counters().permission_queries.load(Ordering::SeqCst),
        1
    );

    app.store.define_role("viewer", &["reports:read", "reports:write"]);
    app.service.invalidate_permissions(alice.id).await.unwrap();
    assert!(app.service.require_permission(alice.id, "reports:write").await.is_ok());
}

#[tokio::test]
async fn test_ghost_handle_answers_without_store_query() {
    let app = helpers::TestApp::new();
    app.create_alice();
    assert_eq!(app.service.warm_up().await.unwrap(), 1);

    assert!(!app.service.handle_exists("ghost").await.unwrap());
    assert_eq!(
        app.store.counters().existence_queries.load(Ordering::SeqCst),
        0
    );

    assert!(app.service.handle_exists("alice").await.unwrap());
    assert!(app.cache.exists(&keys::handle_exists("alice")).await.unwrap());
}

#[tokio::test]
async fn test_repeated_lookups_do_not_change_filter() {
    let app = helpers::TestApp::new();
    app.create_alice();
    let filter = Arc::new(BloomFilter::new(1000, 0.01));
    let index = ExistenceIndex::with_filter(
        &app.config.existence,
        filter.clone(),
        app.cache.clone(),
        Arc::new(app.store.clone()),
    );
    index.warm_up().await.unwrap();
    let bits = filter.set_bits();

    for _ in 0..5 {
        assert!(index.maybe_exists("alice").await.unwrap());
    }
    assert_eq!(filter.set_bits(), bits);
    assert!(filter.contains("alice"));
    assert_eq!(
        app.store.counters().existence_queries.load(Ordering::SeqCst),
        1
    );
}

#[tokio::test]
async fn test_background_warm_up_and_new_handles() {
    let app = helpers::TestApp::new();
    app.create_alice();

    let scanned = app.service.spawn_warm_up().await.unwrap().unwrap();
    assert_eq!(scanned, 1);
    assert!(app.service.existence().is_warm());

    app.create_principal("bob", "bob@example.com", "CorrectPass1!");
    app.service.record_created_handle("bob").await.unwrap();
    assert!(app.service.handle_exists("bob").await.unwrap());
}

#[tokio::test]
async fn test_health() {
    let app = helpers::TestApp::new();
    assert!(app.service.health().await.is_healthy());
}
