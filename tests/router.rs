mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use campus_api::auth::{AccessPayload, TokenService};
use campus_api::config::JwtConfig;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

fn tokens() -> TokenService {
    TokenService::new(&common::jwt_config())
}

fn access_token() -> String {
    tokens()
        .issue_access(&AccessPayload {
            user_id: 1,
            role: "admin".to_string(),
            email: "admin@campus.test".to_string(),
            institution_id: Some(1),
        })
        .expect("issue access token")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn unknown_route_returns_envelope_404() {
    let response = common::app().oneshot(get("/api/no-such-thing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let response = common::app().oneshot(get("/api/auth/me")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn malformed_token_is_401() {
    let response = common::app()
        .oneshot(authed_get("/api/auth/me", "not.a.jwt"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_bearer_authorization_is_401() {
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::empty())
        .unwrap();
    let response = common::app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_401() {
    let mut config = common::jwt_config();
    config.access_ttl = -60;
    let token = TokenService::new(&config)
        .issue_access(&AccessPayload {
            user_id: 1,
            role: "admin".to_string(),
            email: "admin@campus.test".to_string(),
            institution_id: None,
        })
        .unwrap();

    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_other_secret_is_401() {
    let mut config = common::jwt_config();
    config.secret = "a-different-secret".to_string();
    let token = TokenService::new(&config)
        .issue_access(&AccessPayload {
            user_id: 1,
            role: "admin".to_string(),
            email: "admin@campus.test".to_string(),
            institution_id: None,
        })
        .unwrap();

    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_issuer_token_is_401() {
    let mut config = common::jwt_config();
    config.issuer = "someone-else".to_string();
    let token = TokenService::new(&config)
        .issue_access(&AccessPayload {
            user_id: 1,
            role: "admin".to_string(),
            email: "admin@campus.test".to_string(),
            institution_id: None,
        })
        .unwrap();

    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn wrong_audience_token_is_401() {
    let mut config = common::jwt_config();
    config.audience = "other-app".to_string();
    let token = TokenService::new(&config)
        .issue_access(&AccessPayload {
            user_id: 1,
            role: "admin".to_string(),
            email: "admin@campus.test".to_string(),
            institution_id: None,
        })
        .unwrap();

    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn rejected_requests_never_invoke_the_handler() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let state = common::test_state();

    let app = axum::Router::new()
        .route(
            "/spy",
            axum::routing::get(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                async { "ok" }
            }),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            campus_api::middleware::auth::require_auth,
        ))
        .with_state(state);

    let response = app.clone().oneshot(get("/spy")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(authed_get("/spy", "garbage"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let response = app.oneshot(authed_get("/spy", &access_token())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refresh_token_cannot_reach_protected_routes() {
    let token = tokens().issue_refresh(1).unwrap();
    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn valid_token_reaches_me_endpoint() {
    let response = common::app()
        .oneshot(authed_get("/api/auth/me", &access_token()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["id"], 1);
    assert_eq!(body["data"]["role"], "admin");
    assert_eq!(body["data"]["email"], "admin@campus.test");
}

#[tokio::test]
async fn trailing_slash_is_stripped_before_matching() {
    let response = common::app()
        .oneshot(authed_get("/api/auth/me/", &access_token()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn nested_materials_route_binds_both_params() {
    // A matched protected route answers 401 without a token; anything the
    // router cannot match falls through to the 404 envelope. That splits
    // route matching from handler behavior without touching the database.
    let response = common::app()
        .oneshot(get("/api/courses/7/materials/12"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::app()
        .oneshot(get("/api/courses/7/materials"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = common::app()
        .oneshot(get("/api/courses/7/materials/12/extra"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_numeric_path_param_is_rejected() {
    let response = common::app()
        .oneshot(authed_get("/api/courses/abc/materials/12", &access_token()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_with_missing_fields_is_422() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{}"#))
        .unwrap();
    let response = common::app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert!(body["errors"]["email"].is_string());
    assert!(body["errors"]["password"].is_string());
}

#[tokio::test]
async fn health_and_root_are_public() {
    let response = common::app().oneshot(get("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
