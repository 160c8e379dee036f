use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::{Course, CourseMaterial};
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).put(update).delete(destroy))
        .route("/:id/materials", get(materials_list).post(materials_create))
        .route(
            "/:id/materials/:material_id",
            get(materials_show).delete(materials_destroy),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    institution_id: Option<i64>,
    class_id: Option<i64>,
    teacher_id: Option<i64>,
    status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCourse {
    pub institution_id: Option<i64>,
    pub name: Option<String>,
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateCourse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
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
    if let Some(v) = q.class_id {
        filters.push(("class_id", json!(v)));
    }
    if let Some(v) = q.teacher_id {
        filters.push(("teacher_id", json!(v)));
    }
    if let Some(v) = q.status {
        filters.push(("status", json!(v)));
    }

    let repo = Course::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Courses retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let course = Course::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    Ok(envelope::success(course, "Course retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateCourse>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require_str("name", req.name.as_deref());
    v.require_str("code", req.code.as_deref());
    v.finish()?;

    let repo = Course::repo(state.pool.clone());
    let mut fields = to_fields(&req)?;
    fields
        .entry("status".to_string())
        .or_insert_with(|| json!("active"));
    let id = repo.create(&fields).await?;
    let course = repo.find_by_id(id).await?;
    Ok(envelope::created(course, "Course created"))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateCourse>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = Course::repo(state.pool.clone());
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))?;
    repo.update(id, &to_fields(&req)?).await?;
    let course = repo.find_by_id(id).await?;
    Ok(envelope::success(course, "Course updated"))
}

async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = Course::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Course not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Course deleted"))
}

// Nested materials; every operation verifies the parent course first.

#[derive(Debug, Deserialize)]
pub struct MaterialsQuery {
    page: Option<i64>,
    limit: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateMaterial {
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

async fn materials_list(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(q): Query<MaterialsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    require_course(&state, id).await?;
    let (page, limit) = page_window(q.page, q.limit);
    let filters: Vec<(&str, Value)> = vec![("course_id", json!(id))];

    let repo = CourseMaterial::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Materials retrieved"))
}

async fn materials_show(
    State(state): State<AppState>,
    Path((id, material_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let material = find_material(&state, id, material_id).await?;
    Ok(envelope::success(material, "Material retrieved"))
}

async fn materials_create(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<CreateMaterial>,
) -> Result<impl IntoResponse, ApiError> {
    require_course(&state, id).await?;
    let mut v = Validator::new();
    v.require_str("title", req.title.as_deref());
    v.finish()?;

    let repo = CourseMaterial::repo(state.pool.clone());
    let mut fields = to_fields(&req)?;
    fields.insert("course_id".to_string(), json!(id));
    let material_id = repo.create(&fields).await?;
    let material = repo.find_by_id(material_id).await?;
    Ok(envelope::created(material, "Material created"))
}

async fn materials_destroy(
    State(state): State<AppState>,
    Path((id, material_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    find_material(&state, id, material_id).await?;
    CourseMaterial::repo(state.pool.clone()).delete(material_id).await?;
    Ok(envelope::success(json!({ "id": material_id }), "Material deleted"))
}

async fn require_course(state: &AppState, id: i64) -> Result<Course, ApiError> {
    Course::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course not found"))
}

async fn find_material(
    state: &AppState,
    course_id: i64,
    material_id: i64,
) -> Result<CourseMaterial, ApiError> {
    let material = CourseMaterial::repo(state.pool.clone())
        .find_by_id(material_id)
        .await?
        .filter(|m| m.course_id == course_id)
        .ok_or_else(|| ApiError::not_found("Material not found"))?;
    Ok(material)
}
