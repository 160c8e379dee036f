use std::sync::Arc;

use sqlx::MySqlPool;

use crate::auth::TokenService;
use crate::config::AppConfig;

/// Shared application state: the connection pool, token service, and parsed
/// configuration. Built once in `main` (or by a test harness) and injected
/// through axum state rather than reached through globals.
#[derive(Clone)]
pub struct AppState {
    pub pool: MySqlPool,
    pub tokens: TokenService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, pool: MySqlPool) -> Self {
        Self {
            tokens: TokenService::new(&config.jwt),
            config: Arc::new(config),
            pool,
        }
    }
}
