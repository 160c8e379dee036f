use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::Notification;
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::middleware::auth::{require_role, AuthUser};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/:id", get(show).delete(destroy))
        .route("/:id/read", post(mark_read))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    institution_id: Option<i64>,
    user_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateNotification {
    pub institution_id: Option<i64>,
    pub user_id: Option<i64>,
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Callers see their own notifications unless they filter explicitly.
async fn list(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Query(q): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (page, limit) = page_window(q.page, q.limit);
    let mut filters: Vec<(&str, Value)> = Vec::new();
    if let Some(v) = q.institution_id {
        filters.push(("institution_id", json!(v)));
    }
    filters.push(("user_id", json!(q.user_id.unwrap_or(caller.id))));

    let repo = Notification::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Notifications retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = find_visible(&state, &caller, id).await?;
    Ok(envelope::success(notification, "Notification retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateNotification>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin", "teacher"])?;

    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require("user_id", &req.user_id);
    v.require_str("title", req.title.as_deref());
    v.finish()?;

    let repo = Notification::repo(state.pool.clone());
    let id = repo.create(&to_fields(&req)?).await?;
    let notification = repo.find_by_id(id).await?;
    Ok(envelope::created(notification, "Notification created"))
}

/// POST /api/notifications/:id/read
async fn mark_read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let marked = Notification::mark_read(&state.pool, id, caller.id).await?;
    if !marked {
        return Err(ApiError::not_found("Notification not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Notification marked as read"))
}

async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    find_visible(&state, &caller, id).await?;
    Notification::repo(state.pool.clone()).delete(id).await?;
    Ok(envelope::success(json!({ "id": id }), "Notification deleted"))
}

async fn find_visible(
    state: &AppState,
    caller: &AuthUser,
    id: i64,
) -> Result<Notification, ApiError> {
    let notification = Notification::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Notification not found"))?;
    if notification.user_id != caller.id && caller.role != "admin" {
        return Err(ApiError::forbidden("You do not have access to this notification"));
    }
    Ok(notification)
}
