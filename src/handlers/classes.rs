use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::SchoolClass;
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
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
    institution_id: Option<i64>,
    teacher_id: Option<i64>,
    grade_level: Option<String>,
    academic_year: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateClass {
    pub institution_id: Option<i64>,
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateClass {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub academic_year: Option<String>,
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
    if let Some(v) = q.teacher_id {
        filters.push(("teacher_id", json!(v)));
    }
    if let Some(v) = q.grade_level {
        filters.push(("grade_level", json!(v)));
    }
    if let Some(v) = q.academic_year {
        filters.push(("academic_year", json!(v)));
    }

    let repo = SchoolClass::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Classes retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let class = SchoolClass::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Class not found"))?;
    Ok(envelope::success(class, "Class retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateClass>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require_str("name", req.name.as_deref());
    v.finish()?;

    let repo = SchoolClass::repo(state.pool.clone());
    let id = repo.create(&to_fields(&req)?).await?;
    let class = repo.find_by_id(id).await?;
    Ok(envelope::created(class, "Class created"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateClass>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = SchoolClass::repo(state.pool.clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Class not found"))?;
    repo.update(id, &to_fields(&req)?).await?;
    let class = repo.find_by_id(id).await?;
    Ok(envelope::success(class, "Class updated"))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = SchoolClass::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Class not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Class deleted"))
}
