use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::envelope;
use crate::database::models::{attendance::AttendanceEntry, AttendanceRecord};
use crate::error::ApiError;
use crate::handlers::{page_window, to_fields, Validator};
use crate::middleware::auth::{require_role, AuthUser};
use crate::state::AppState;

const STATUSES: &[&str] = &["present", "absent", "late", "excused"];

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/bulk", post(mark_bulk))
        .route("/:id", get(show).delete(destroy))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    page: Option<i64>,
    limit: Option<i64>,
    institution_id: Option<i64>,
    class_id: Option<i64>,
    student_id: Option<i64>,
    date: Option<NaiveDate>,
    status: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateAttendance {
    pub institution_id: Option<i64>,
    pub class_id: Option<i64>,
    pub student_id: Option<i64>,
    pub attendance_date: Option<NaiveDate>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkRequest {
    pub institution_id: Option<i64>,
    pub class_id: Option<i64>,
    pub attendance_date: Option<NaiveDate>,
    pub entries: Option<Vec<AttendanceEntry>>,
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
    if let Some(v) = q.student_id {
        filters.push(("student_id", json!(v)));
    }
    if let Some(v) = q.date {
        filters.push(("attendance_date", json!(v.to_string())));
    }
    if let Some(v) = q.status {
        filters.push(("status", json!(v)));
    }

    let repo = AttendanceRecord::repo(state.pool.clone());
    let total = repo.count(&filters).await?;
    let rows = repo.list(page, limit, &filters).await?;
    Ok(envelope::paginated(rows, total, page, limit, "Attendance retrieved"))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let record = AttendanceRecord::repo(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Attendance record not found"))?;
    Ok(envelope::success(record, "Attendance record retrieved"))
}

async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateAttendance>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin", "teacher"])?;

    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require("class_id", &req.class_id);
    v.require("student_id", &req.student_id);
    v.require("attendance_date", &req.attendance_date);
    v.require_str("status", req.status.as_deref());
    if let Some(status) = req.status.as_deref() {
        v.check("status", STATUSES.contains(&status), "Unknown attendance status");
    }
    v.finish()?;

    let repo = AttendanceRecord::repo(state.pool.clone());
    let mut fields = to_fields(&req)?;
    fields.insert("recorded_by".to_string(), json!(caller.id));
    let id = repo.create(&fields).await?;
    let record = repo.find_by_id(id).await?;
    Ok(envelope::created(record, "Attendance recorded"))
}

/// POST /api/attendance/bulk - mark a whole class for one day.
/// All rows are written in a single transaction; a failure anywhere means
/// nothing is recorded.
async fn mark_bulk(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<BulkRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin", "teacher"])?;

    let mut v = Validator::new();
    v.require("institution_id", &req.institution_id);
    v.require("class_id", &req.class_id);
    v.require("attendance_date", &req.attendance_date);
    v.require("entries", &req.entries);
    if let Some(entries) = &req.entries {
        v.check("entries", !entries.is_empty(), "At least one entry is required");
        v.check(
            "entries",
            entries.iter().all(|e| STATUSES.contains(&e.status.as_str())),
            "Unknown attendance status",
        );
    }
    v.finish()?;

    let entries = req.entries.unwrap_or_default();
    let written = AttendanceRecord::mark_bulk(
        &state.pool,
        req.institution_id.unwrap_or_default(),
        req.class_id.unwrap_or_default(),
        req.attendance_date.unwrap_or_default(),
        caller.id,
        &entries,
    )
    .await?;

    Ok(envelope::success(
        json!({ "marked": written }),
        "Attendance marked",
    ))
}

async fn destroy(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    require_role(&caller, &["admin", "teacher"])?;
    let deleted = AttendanceRecord::repo(state.pool.clone()).delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found("Attendance record not found"));
    }
    Ok(envelope::success(json!({ "id": id }), "Attendance record deleted"))
}
