use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::Message;
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::middleware::auth::AuthUser;
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
    sender_id: Option<i64>,
    recipient_id: Option<i64>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateMessage {
    pub institution_id: Option<i64>,
    pub recipient_id: Option<i64>,
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
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
    if let Some(v) = q.sender_id {
        filters.push(("sender_id", json!(v)));
    }
    if let Some(v) = q.recipient_id {
        filters.push(("recipient_id", json!(v)));
    }

    let repo = Message::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Messages retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let message = find_visible(&state, &caller, id).await?;
    Ok(envelope::success(message, "Message retrieved"))
}

/// Sender identity always comes from the token, never the body.
async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateMessage>,
) -> Result<impl IntoResponse, ApiError> {
    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require("recipient_id", &req.recipient_id);
    v.require_str("body", req.body.as_deref());
    v.finish()?;

    let repo = Message::repo(state.pool.clone());
    let mut fields = to_fields(&req)?;
    fields.insert("sender_id".to_string(), json!(caller.id));
    let id = repo.create(&fields).await?;
    let message = repo.find_by_id(id).await?;
    Ok(envelope::created(message, "Message sent"))
}

/// POST /api/messages/:id/read - recipient marks their copy read.
async fn mark_read(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let marked = Message::mark_read(&state.pool, id, caller.id).await?;
    if !marked {
        return Err(ApiError::not_found("Message not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Message marked as read"))
}

async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    find_visible(&state, &caller, id).await?;
    Message::repo(state.pool.clone()).delete(id).await?;
    Ok(envelope::success(json!({ "id": id }), "Message deleted"))
}

/// A message is visible to its sender, its recipient, and admins.
async fn find_visible(state: &AppState, caller: &AuthUser, id: i64) -> Result<Message, ApiError> {
    let message = Message::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Message not found"))?;
    if message.sender_id != caller.id && message.recipient_id != caller.id && caller.role != "admin"
    {
        return Err(ApiError::forbidden("You do not have access to this message"));
    }
    Ok(message)
}
