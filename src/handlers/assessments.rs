use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::Assessment;
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
    course_id: Option<i64>,
    kind: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAssessment {
    pub institution_id: Option<i64>,
    pub course_id: Option<i64>,
    pub title: Option<String>,
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_score: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assessment_date: Option<NaiveDate>,
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
    if let Some(v) = q.course_id {
        filters.push(("course_id", json!(v)));
    }
    if let Some(v) = q.kind {
        filters.push(("kind", json!(v)));
    }

    let repo = Assessment::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Assessments retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let assessment = Assessment::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    Ok(envelope::success(assessment, "Assessment retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateAssessment>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require("course_id", &req.course_id);
    v.require_str("title", req.title.as_deref());
    v.require_str("kind", req.kind.as_deref());
    v.finish()?;

    let repo = Assessment::repo(state.pool.clone());
    let id = repo.create(&to_fields(&req)?).await?;
    let assessment = repo.find_by_id(id).await?;
    Ok(envelope::created(assessment, "Assessment created"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateAssessment>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = Assessment::repo(state.pool.clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Assessment not found"))?;
    repo.update(id, &to_fields(&req)?).await?;
    let assessment = repo.find_by_id(id).await?;
    Ok(envelope::success(assessment, "Assessment updated"))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = Assessment::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Assessment not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Assessment deleted"))
}
