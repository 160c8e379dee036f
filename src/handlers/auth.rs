use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::Deserialize;
use serde_json::json;

use crate::api::envelope;
use crate::auth::AccessPayload;
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::Validator;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// POST /api/auth/login
///
/// Credential failures all answer 401 with the same message so the response
/// does not reveal whether the account exists.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require_str("email", req.email.as_deref());
    v.require_str("password", req.password.as_deref());
    v.finish()?;

    let email = req.email.unwrap_or_default();
    let password = req.password.unwrap_or_default();

    let user = User::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if user.status != "active" {
        return Err(invalid_credentials());
    }

    let verified = bcrypt::verify(&password, &user.password)
        .map_err(|e| ApiError::internal(format!("password verification failed: {}", e)))?;
    if !verified {
        return Err(invalid_credentials());
    }

    let payload = AccessPayload {
        user_id: user.id,
        role: user.role.clone(),
        email: user.email.clone(),
        institution_id: user.institution_id,
    };
    let access_token = state.tokens.issue_access(&payload)?;
    let refresh_token = state.tokens.issue_refresh(user.id)?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(envelope::success(
        json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "token_type": "Bearer",
            "expires_in": state.tokens.access_ttl(),
            "user": user,
        }),
        "Login successful",
    ))
}

/// POST /api/auth/refresh
///
/// Accepts only tokens carrying the refresh marker; the user must still
/// exist and be active when the new access token is minted.
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require_str("refresh_token", req.refresh_token.as_deref());
    v.finish()?;

    let claims = state
        .tokens
        .validate(req.refresh_token.as_deref().unwrap_or_default())
        .map_err(|_| ApiError::unauthorized("Invalid or expired refresh token"))?;

    if !claims.is_refresh() {
        return Err(ApiError::unauthorized("Invalid or expired refresh token"));
    }

    let user = User::repo(state.pool.clone())
        .find_by_id(claims.sub)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired refresh token"))?;

    if user.status != "active" {
        return Err(ApiError::unauthorized("Invalid or expired refresh token"));
    }

    let payload = AccessPayload {
        user_id: user.id,
        role: user.role.clone(),
        email: user.email.clone(),
        institution_id: user.institution_id,
    };
    let access_token = state.tokens.issue_access(&payload)?;
    let refresh_token = state.tokens.issue_refresh(user.id)?;

    Ok(envelope::success(
        json!({
            "access_token": access_token,
            "refresh_token": refresh_token,
            "token_type": "Bearer",
            "expires_in": state.tokens.access_ttl(),
        }),
        "Token refreshed",
    ))
}

/// GET /api/auth/me - identity claims of the current caller.
pub async fn me(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    envelope::success(
        json!({
            "id": user.id,
            "email": user.email,
            "role": user.role,
            "institution_id": user.institution_id,
        }),
        "Authenticated user",
    )
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid credentials")
}
