use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::Institution;
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::middleware::auth::{require_role, AuthUser};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(destroy))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateInstitution {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateInstitution {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

async fn list(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = page_window(q.page, q.limit);
    let mut filters: Vec<(&str, Value)> = Vec::new();
    if let Some(v) = q.status {
        filters.push(("status", json!(v)));
    }

    let repo = Institution::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Institutions retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let institution = Institution::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Institution not found"))?;
    Ok(envelope::success(institution, "Institution retrieved"))
}

/// Creates the tenant and seeds its default settings in one transaction.
async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateInstitution>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin"])?;

    let mut v = Validator::new();
    v.require_str("name", req.name.as_deref());
    v.require_str("email", req.email.as_deref());
    v.finish()?;

    let mut fields = to_fields(&req)?;
    fields
        .entry("status".to_string())
        .or_insert_with(|| json!("active"));

    let id = Institution::create_with_defaults(&state.pool, &fields).await?;
    let institution = Institution::repo(state.pool.clone()).find_by_id(id).await?;
    Ok(envelope::created(institution, "Institution created"))
}

async fn update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateInstitution>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin"])?;

    let repo = Institution::repo(state.pool.clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Institution not found"))?;
    repo.update(id, &to_fields(&req)?).await?;
    let institution = repo.find_by_id(id).await?;
    Ok(envelope::success(institution, "Institution updated"))
}

async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin"])?;
    let deleted = Institution::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Institution not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Institution deleted"))
}
