//! Shared fixtures for unit tests.

use std::sync::Arc;

use warden_cache::CacheManager;
use warden_cache::memory::MemoryCacheProvider;
use warden_core::config::AppConfig;
use warden_core::traits::{NotificationPublisher, PrincipalStore};
use warden_core::types::Principal;
use warden_database::MemoryPrincipalStore;
use warden_notify::MemoryNotificationPublisher;

use crate::password::PasswordHasher;

pub(crate) struct Fixture {
    pub config: AppConfig,
    pub cache: Arc<CacheManager>,
    pub store: MemoryPrincipalStore,
    pub notifier: MemoryNotificationPublisher,
    pub hasher: PasswordHasher,
}

impl Fixture {
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "unit-test-secret".to_string();
        config.auth.hash_memory_kib = 1024;
        config.auth.hash_iterations = 1;

        let cache = Arc::new(CacheManager::from_provider(Arc::new(
            MemoryCacheProvider::new(&config.cache.memory),
        )));
        let hasher = PasswordHasher::new(&config.auth).unwrap();

        Self {
            config,
            cache,
            store: MemoryPrincipalStore::new(),
            notifier: MemoryNotificationPublisher::default(),
            hasher,
        }
    }

    pub fn store(&self) -> Arc<dyn PrincipalStore> {
        Arc::new(self.store.clone())
    }

    pub fn notifier(&self) -> Arc<dyn NotificationPublisher> {
        Arc::new(self.notifier.clone())
    }

    pub fn add_principal(&self, username: &str, email: &str, password: &str) -> Principal {
        let hash = self.hasher.hash_password(password).unwrap();
        self.store.insert(username, email, &hash)
    }
}
