use axum::{extract::Request, ServiceExt};

use campus_api::config::AppConfig;
use campus_api::state::AppState;
use campus_api::{database, error, routes};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DB_* and JWT_* settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    error::set_error_detail_exposure(config.expose_error_detail());
    tracing::info!("starting campus-api in {:?} mode", config.environment);

    let pool = database::connect(&config.database).await?;
    let state = AppState::new(config, pool);
    let app = routes::app(state);

    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);
    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("campus-api listening on http://{}", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;
    Ok(())
}
