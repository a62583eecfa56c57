//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::ServerConfig;
use crate::services::IdentityGuard;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; provides access to the connection pool and
/// the identity guard.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    guard: IdentityGuard,
}

impl AppState {
    /// Create a new application state. Only the token settings are taken
    /// from the configuration; binding details stay with the caller.
    #[must_use]
    pub fn new(config: &ServerConfig, pool: SqlitePool) -> Self {
        let guard = IdentityGuard::new(config.token_secret.clone(), config.token_ttl_days);
        Self {
            inner: Arc::new(AppStateInner { pool, guard }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Get a reference to the identity guard.
    #[must_use]
    pub fn guard(&self) -> &IdentityGuard {
        &self.inner.guard
    }
}
