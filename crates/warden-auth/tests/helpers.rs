//! Shared helpers for warden-auth integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use tracing::info_span;

use warden_auth::{AccessService, PasswordHasher};
use warden_cache::CacheManager;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::AppConfig;
use warden_core::types::Principal;
use warden_database::MemoryPrincipalStore;
use warden_notify::MemoryNotificationPublisher;

/// A fully wired service over in-process collaborators.
pub struct TestApp {
    /// The service under test
    pub service: AccessService,
    /// Shared cache, for asserting on keys and TTLs
    pub cache: Arc<CacheManager>,
    /// Principal store with lookup counters
    pub store: MemoryPrincipalStore,
    /// Publisher recording every event
    pub notifier: MemoryNotificationPublisher,
    /// Effective configuration
    pub config: AppConfig,
}

impl TestApp {
    /// Create a test application with default settings.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    /// Create a test application, adjusting the configuration first.
    pub fn with_config(adjust: impl FnOnce(&mut AppConfig)) -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.auth.hash_memory_kib = 1024;
        config.auth.hash_iterations = 1;
        adjust(&mut config);

        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&config.cache.memory),
        )));
        let store = MemoryPrincipalStore::new();
        let notifier = MemoryNotificationPublisher::default();

        let service = AccessService::new(
            &config,
            cache.clone(),
            Arc::new(store.clone()),
            Arc::new(notifier.clone()),
            info_span!("warden", service = %config.service.name),
        )
        .expect("Failed to build access service");

        Self {
            service,
            cache,
            store,
            notifier,
            config,
        }
    }

    /// Create a principal with an Argon2id credential.
    pub fn create_principal(&self, username: &str, email: &str, password: &str) -> Principal {
        let hasher = PasswordHasher::new(&self.config.auth).expect("Failed to build hasher");
        let hash = hasher
            .hash_password(password)
            .expect("Failed to hash password");
        self.store.insert(username, email, &hash)
    }

    /// The standard fixture principal.
    pub fn create_alice(&self) -> Principal {
        self.create_principal("alice", "alice@example.com", "CorrectPass1!")
    }
}
