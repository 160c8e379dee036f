//! End-to-end login and refresh against a real MySQL database.
//!
//! Run with `DATABASE_URL=mysql://... cargo test -- --ignored`. The test
//! creates its own `users` table and account, so the target schema only
//! needs to be writable.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::MySqlPool;
use tower::ServiceExt;

const TEST_EMAIL: &str = "flow-test@campus.test";
const TEST_PASSWORD: &str = "correct horse battery";

async fn seed_user(pool: &MySqlPool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS `users` (
            `id` BIGINT PRIMARY KEY AUTO_INCREMENT,
            `institution_id` BIGINT NULL,
            `name` VARCHAR(255) NOT NULL,
            `email` VARCHAR(255) NOT NULL UNIQUE,
            `password` VARCHAR(255) NOT NULL,
            `role` VARCHAR(32) NOT NULL,
            `status` VARCHAR(32) NOT NULL DEFAULT 'active',
            `created_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP,
            `updated_at` TIMESTAMP NULL DEFAULT CURRENT_TIMESTAMP
        )",
    )
    .execute(pool)
    .await?;

    sqlx::query("DELETE FROM `users` WHERE `email` = ?")
        .bind(TEST_EMAIL)
        .execute(pool)
        .await?;

    let hash = bcrypt::hash(TEST_PASSWORD, bcrypt::DEFAULT_COST)?;
    sqlx::query(
        "INSERT INTO `users` (`name`, `email`, `password`, `role`, `status`)
         VALUES ('Flow Test', ?, ?, 'admin', 'active')",
    )
    .bind(TEST_EMAIL)
    .bind(&hash)
    .execute(pool)
    .await?;
    Ok(())
}

fn post_json(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
#[ignore = "requires a MySQL database (set DATABASE_URL)"]
async fn login_then_refresh_round_trip() -> anyhow::Result<()> {
    let state = common::test_state();
    seed_user(&state.pool).await?;
    let app = campus_api::routes::app(state);

    // Wrong password stays 401
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": TEST_EMAIL, "password": "wrong" }).to_string(),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Correct credentials return the token pair
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            serde_json::json!({ "email": TEST_EMAIL, "password": TEST_PASSWORD }).to_string(),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 3600);
    assert!(body["data"]["user"].get("password").is_none());

    let access = body["data"]["access_token"].as_str().unwrap().to_string();
    let refresh = body["data"]["refresh_token"].as_str().unwrap().to_string();

    // Access token works on a protected route
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header(header::AUTHORIZATION, format!("Bearer {access}"))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    // Refresh token mints a fresh pair
    let response = app
        .clone()
        .oneshot(post_json(
            "/api/auth/refresh",
            serde_json::json!({ "refresh_token": refresh }).to_string(),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["access_token"].is_string());

    // Access tokens are rejected by the refresh endpoint
    let response = app
        .oneshot(post_json(
            "/api/auth/refresh",
            serde_json::json!({ "refresh_token": access }).to_string(),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
