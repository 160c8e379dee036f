mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use tower::ServiceExt;

fn request_with_origin(method: Method, uri: &str, origin: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn listed_origin_is_echoed() {
    let response = common::app()
        .oneshot(request_with_origin(
            Method::GET,
            "/health",
            "https://admin.campus.test",
        ))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://admin.campus.test")
    );
}

#[tokio::test]
async fn unlisted_origin_falls_back_to_first_configured() {
    let response = common::app()
        .oneshot(request_with_origin(
            Method::GET,
            "/health",
            "https://attacker.test",
        ))
        .await
        .unwrap();

    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://app.campus.test")
    );
}

#[tokio::test]
async fn preflight_short_circuits_with_200() {
    let response = common::app()
        .oneshot(request_with_origin(
            Method::OPTIONS,
            "/api/students",
            "https://app.campus.test",
        ))
        .await
        .unwrap();

    // Preflight never reaches the auth layer or a handler
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://app.campus.test")
    );
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .is_some());
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .is_some());
}

#[tokio::test]
async fn error_responses_still_carry_cors_headers() {
    let response = common::app()
        .oneshot(request_with_origin(
            Method::GET,
            "/api/students",
            "https://app.campus.test",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("https://app.campus.test")
    );
}
