use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::Claims;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller identity extracted from a validated access token.
/// Injected as a request extension; handlers receive it via `Extension`.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub role: String,
    pub email: String,
    pub institution_id: Option<i64>,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            role: claims.role.unwrap_or_default(),
            email: claims.email.unwrap_or_default(),
            institution_id: claims.institution_id,
        }
    }
}

/// Guards protected routes. All failures respond 401 with the standard
/// envelope and stop dispatch; the handler is never invoked. The middleware
/// guarantees authentication only; role checks are per-handler policy.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers()).map_err(ApiError::unauthorized)?;

    let claims = state
        .tokens
        .validate(&token)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    // Refresh tokens only mint new access tokens, they never grant access
    if claims.is_refresh() {
        return Err(ApiError::unauthorized("Invalid or expired token"));
    }

    request.extensions_mut().insert(AuthUser::from(claims));
    Ok(next.run(request).await)
}

/// Per-endpoint authorization policy helper.
pub fn require_role(user: &AuthUser, roles: &[&str]) -> Result<(), ApiError> {
    if roles.contains(&user.role.as_str()) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Insufficient permissions for this operation"))
    }
}

fn extract_bearer(headers: &HeaderMap) -> Result<String, String> {
    let header = headers
        .get("authorization")
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let value = header
        .to_str()
        .map_err(|_| "Invalid Authorization header".to_string())?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err("Authorization header must use the Bearer scheme".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(extract_bearer(&headers_with("Bearer abc.def.ghi")).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn rejects_missing_header() {
        assert!(extract_bearer(&HeaderMap::new()).is_err());
    }

    #[test]
    fn rejects_non_bearer_schemes() {
        assert!(extract_bearer(&headers_with("Basic dXNlcjpwYXNz")).is_err());
        assert!(extract_bearer(&headers_with("Bearer ")).is_err());
    }

    #[test]
    fn role_policy() {
        let user = AuthUser {
            id: 1,
            role: "teacher".to_string(),
            email: String::new(),
            institution_id: None,
        };
        assert!(require_role(&user, &["teacher", "admin"]).is_ok());
        assert!(require_role(&user, &["admin"]).is_err());
    }
}
