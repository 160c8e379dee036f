use axum::Router;
use sqlx::mysql::MySqlPoolOptions;
use tower_http::normalize_path::NormalizePath;

use campus_api::config::{
    AppConfig, DatabaseConfig, Environment, JwtConfig, SecurityConfig,
};
use campus_api::routes;
use campus_api::state::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_config() -> AppConfig {
    AppConfig {
        environment: Environment::Development,
        database: DatabaseConfig {
            host: "localhost".to_string(),
            port: 3306,
            name: "campus_test".to_string(),
            user: "root".to_string(),
            password: String::new(),
            max_connections: 2,
            url: std::env::var("DATABASE_URL").ok(),
        },
        security: SecurityConfig {
            allowed_origins: vec![
                "https://app.campus.test".to_string(),
                "https://admin.campus.test".to_string(),
            ],
        },
        jwt: jwt_config(),
    }
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_SECRET.to_string(),
        issuer: "campus-api".to_string(),
        audience: "campus-app".to_string(),
        access_ttl: 3600,
        refresh_ttl: 604800,
    }
}

/// Application state backed by a lazy pool. Routing, auth, and CORS checks
/// never open a connection; only DB-gated tests need a real server.
pub fn test_state() -> AppState {
    let config = test_config();
    let dsn = config
        .database
        .connection_url()
        .expect("test database config produces a DSN");
    let pool = MySqlPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_lazy(&dsn)
        .expect("lazy pool construction cannot fail on a well-formed DSN");
    AppState::new(config, pool)
}

pub fn app() -> NormalizePath<Router> {
    routes::app(test_state())
}
