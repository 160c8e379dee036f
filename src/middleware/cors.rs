use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::state::AppState;

const ALLOW_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
const ALLOW_HEADERS: &str = "Authorization, Content-Type";

/// CORS over the configured origin allow-list: echo the matching origin,
/// fall back to the first configured entry for unlisted origins, and
/// short-circuit preflight with 200 and no body.
pub async fn apply_cors(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let request_origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let allow_origin = resolve_origin(
        &state.config.security.allowed_origins,
        request_origin.as_deref(),
    );

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    if let Some(origin) = allow_origin {
        if let Ok(value) = HeaderValue::from_str(&origin) {
            let headers = response.headers_mut();
            headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOW_METHODS),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static(ALLOW_HEADERS),
            );
        }
    }

    response
}

/// Echo the request origin when it is allow-listed, otherwise fall back to
/// the first configured origin. A `*` entry permits any origin.
pub fn resolve_origin(allowed: &[String], request_origin: Option<&str>) -> Option<String> {
    if allowed.iter().any(|o| o == "*") {
        return Some("*".to_string());
    }
    match request_origin {
        Some(origin) if allowed.iter().any(|o| o == origin) => Some(origin.to_string()),
        _ => allowed.first().cloned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins() -> Vec<String> {
        vec!["https://a.test".to_string(), "https://b.test".to_string()]
    }

    #[test]
    fn echoes_listed_origin() {
        assert_eq!(
            resolve_origin(&origins(), Some("https://b.test")).as_deref(),
            Some("https://b.test")
        );
    }

    #[test]
    fn unlisted_origin_falls_back_to_first() {
        assert_eq!(
            resolve_origin(&origins(), Some("https://evil.test")).as_deref(),
            Some("https://a.test")
        );
    }

    #[test]
    fn missing_origin_falls_back_to_first() {
        assert_eq!(resolve_origin(&origins(), None).as_deref(), Some("https://a.test"));
    }

    #[test]
    fn wildcard_wins() {
        let allowed = vec!["*".to_string()];
        assert_eq!(resolve_origin(&allowed, Some("https://any.test")).as_deref(), Some("*"));
    }

    #[test]
    fn empty_list_disables_cors_headers() {
        assert_eq!(resolve_origin(&[], Some("https://a.test")), None);
    }
}
