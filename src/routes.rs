use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;

use crate::api::envelope;
use crate::handlers;
use crate::middleware::{auth::require_auth, cors::apply_cors};
use crate::state::AppState;

/// Full application service: the router wrapped so trailing slashes are
/// stripped before matching.
pub fn app(state: AppState) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state))
}

pub fn router(state: AppState) -> Router {
    // Token acquisition endpoints stay public
    let public = Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/refresh", post(handlers::auth::refresh));

    // Everything else requires a validated access token. The layer only
    // authenticates; role checks live in the handlers.
    let protected = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .nest("/institutions", handlers::institutions::routes())
        .nest("/users", handlers::users::routes())
        .nest("/students", handlers::students::routes())
        .nest("/teachers", handlers::teachers::routes())
        .nest("/classes", handlers::classes::routes())
        .nest("/courses", handlers::courses::routes())
        .nest("/assignments", handlers::assignments::routes())
        .nest("/assessments", handlers::assessments::routes())
        .nest("/quizzes", handlers::quizzes::routes())
        .nest("/attendance", handlers::attendance::routes())
        .nest("/messages", handlers::messages::routes())
        .nest("/notifications", handlers::notifications::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        .nest("/api", public.merge(protected))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), apply_cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    envelope::error(
        "Route not found",
        axum::http::StatusCode::NOT_FOUND,
        serde_json::json!([]),
    )
}
