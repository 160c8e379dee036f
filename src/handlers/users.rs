use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::User;
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::middleware::auth::{require_role, AuthUser};
use crate::state::AppState;

const ROLES: &[&str] = &["admin", "teacher", "student", "parent", "staff"];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    institution_id: Option<i64>,
    role: Option<String>,
    status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = page_window(q.page, q.limit);
    let mut filters: Vec<(&str, Value)> = Vec::new();
    if let Some(v) = q.institution_id {
        filters.push(("institution_id", json!(v)));
    }
    if let Some(v) = q.role {
        filters.push(("role", json!(v)));
    }
    if let Some(v) = q.status {
        filters.push(("status", json!(v)));
    }

    let repo = User::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Users retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let user = User::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(envelope::success(user, "User retrieved"))
}

/// Account creation is an admin operation.
async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateUser>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin"])?;

    let mut v = Validator::new();
    v.require_str("name", req.name.as_deref());
    v.require_str("email", req.email.as_deref());
    v.require_str("password", req.password.as_deref());
    v.require_str("role", req.role.as_deref());
    if let Some(role) = req.role.as_deref() {
        v.check("role", ROLES.contains(&role), "Unknown role");
    }
    if let Some(password) = req.password.as_deref() {
        v.check("password", password.len() >= 8, "Must be at least 8 characters");
    }
    v.finish()?;

    let mut fields = to_fields(&req)?;
    let hash = hash_password(req.password.as_deref().unwrap_or_default())?;
    fields.insert("password".to_string(), json!(hash));
    fields
        .entry("status".to_string())
        .or_insert_with(|| json!("active"));

    let repo = User::repo(state.pool.clone());
    let id = repo.create(&fields).await?;
    let user = repo.find_by_id(id).await?;
    Ok(envelope::created(user, "User created"))
}

async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUser>,
) -> Result<impl IntoResponse, ApiError> {
    // Admins may edit anyone; others only themselves
    if caller.id != id {
        require_role(&caller, &["admin"])?;
    }

    let mut v = Validator::new();
    if let Some(role) = req.role.as_deref() {
        v.check("role", ROLES.contains(&role), "Unknown role");
    }
    if let Some(password) = req.password.as_deref() {
        v.check("password", password.len() >= 8, "Must be at least 8 characters");
    }
    v.finish()?;

    let repo = User::repo(state.pool.clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let mut fields = to_fields(&req)?;
    if let Some(password) = req.password.as_deref() {
        fields.insert("password".to_string(), json!(hash_password(password)?));
    }
    repo.update(id, &fields).await?;
    let user = repo.find_by_id(id).await?;
    Ok(envelope::success(user, "User updated"))
}

async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin"])?;
    let deleted = User::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "User deleted"))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::internal(format!("password hashing failed: {}", e)))
}
