//! The backend handle: data store, auth and change feed sharing one session.
//!
//! Constructed once at startup and passed down explicitly. `shutdown()`
//! stops every live subscription created through it.

use std::sync::Arc;

use epaket_core::{AppError, BackendConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    AuthProvider, ChangeFeed, DataStore, MemoryAuth, MemoryStore, PollingFeed, RestAuth, RestStore,
    SessionToken,
};

#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn DataStore>,
    pub auth: Arc<dyn AuthProvider>,
    pub feed: Arc<dyn ChangeFeed>,
    pub token: Arc<SessionToken>,
    pub config: BackendConfig,
    shutdown: CancellationToken,
}

impl Backend {
    /// Connect to the hosted service. Fails fast on a missing URL or key.
    pub fn remote(config: BackendConfig) -> Result<Self, AppError> {
        Self::remote_with_token(config, Arc::new(SessionToken::new()))
    }

    /// Like `remote`, resuming a saved session token.
    pub fn remote_with_token(config: BackendConfig, token: Arc<SessionToken>) -> Result<Self, AppError> {
        config.validate()?;
        let base = config.base_url().to_string();
        let shutdown = CancellationToken::new();

        let store: Arc<dyn DataStore> = Arc::new(RestStore::new(&base, &config.anon_key, token.clone()));
        let auth: Arc<dyn AuthProvider> = Arc::new(RestAuth::new(&base, &config.anon_key, token.clone()));
        let feed: Arc<dyn ChangeFeed> =
            Arc::new(PollingFeed::new(store.clone(), config.poll_interval, shutdown.clone()));

        info!(url = %base, "backend configured");
        Ok(Self {
            store,
            auth,
            feed,
            token,
            config,
            shutdown,
        })
    }

    /// Fully in-process backend over the given store and accounts.
    /// `shutdown()` ends the store's subscriptions.
    pub fn memory(config: BackendConfig, store: Arc<MemoryStore>, auth: Arc<MemoryAuth>, token: Arc<SessionToken>) -> Self {
        let shutdown = store.shutdown_token();
        Self {
            store: store.clone(),
            auth,
            feed: store,
            token,
            config,
            shutdown,
        }
    }

    /// Empty in-process backend with default settings.
    pub fn in_memory() -> (Self, Arc<MemoryStore>, Arc<MemoryAuth>) {
        let token = Arc::new(SessionToken::new());
        let store = Arc::new(MemoryStore::new());
        let auth = Arc::new(MemoryAuth::new(token.clone()));
        let config = BackendConfig::new("http://localhost", "local");
        let backend = Self::memory(config, store.clone(), auth.clone(), token);
        (backend, store, auth)
    }

    /// Token cancelled by `shutdown()`; long-running loops select on it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}
