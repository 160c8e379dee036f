//! The fixed JSON wrapper every endpoint responds with.
//!
//! Three shapes only: `success`, `error`, and `paginated`. Handlers never
//! build response JSON by hand.

use axum::{http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};

/// Success envelope with a custom status code.
pub fn success_with_status<T: Serialize>(
    data: T,
    status: StatusCode,
    message: impl Into<String>,
) -> impl IntoResponse {
    let body = json!({
        "success": true,
        "message": message.into(),
        "data": data,
        "timestamp": Utc::now().to_rfc3339(),
    });
    (status, Json(body))
}

/// 200 success envelope.
pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> impl IntoResponse {
    success_with_status(data, StatusCode::OK, message)
}

/// 201 success envelope for freshly created resources.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> impl IntoResponse {
    success_with_status(data, StatusCode::CREATED, message)
}

/// Paginated success envelope. The page math must hold for every
/// (total, page, limit) triple, including total = 0.
pub fn paginated<T: Serialize>(
    data: Vec<T>,
    total: i64,
    page: i64,
    limit: i64,
    message: impl Into<String>,
) -> impl IntoResponse {
    let meta = page_meta(total, page, limit);
    let body = json!({
        "success": true,
        "message": message.into(),
        "data": data,
        "total": meta.total,
        "per_page": meta.per_page,
        "current_page": meta.current_page,
        "last_page": meta.last_page,
        "from": meta.from,
        "to": meta.to,
        "timestamp": Utc::now().to_rfc3339(),
    });
    (StatusCode::OK, Json(body))
}

#[derive(Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub total: i64,
    pub per_page: i64,
    pub current_page: i64,
    pub last_page: i64,
    pub from: i64,
    pub to: i64,
}

/// last_page = ceil(total/limit), from = (page-1)*limit + 1,
/// to = min(page*limit, total). Saturating so a hostile page number can
/// never overflow; degenerate for total = 0 but never panics.
pub fn page_meta(total: i64, page: i64, limit: i64) -> PageMeta {
    let limit = limit.max(1);
    let page = page.max(1);
    PageMeta {
        total,
        per_page: limit,
        current_page: page,
        last_page: total.saturating_add(limit - 1) / limit,
        from: (page - 1).saturating_mul(limit).saturating_add(1),
        to: page.saturating_mul(limit).min(total),
    }
}

/// Error envelope outside of `ApiError` conversion paths (router fallback).
pub fn error(message: impl Into<String>, status: StatusCode, errors: Value) -> impl IntoResponse {
    let body = json!({
        "success": false,
        "message": message.into(),
        "errors": errors,
        "timestamp": Utc::now().to_rfc3339(),
    });
    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_is_degenerate_but_defined() {
        let meta = page_meta(0, 1, 20);
        assert_eq!(meta.last_page, 0);
        assert_eq!(meta.from, 1);
        assert_eq!(meta.to, 0);
    }

    #[test]
    fn middle_page_math() {
        let meta = page_meta(45, 2, 20);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.from, 21);
        assert_eq!(meta.to, 40);
    }

    #[test]
    fn final_partial_page() {
        let meta = page_meta(45, 3, 20);
        assert_eq!(meta.from, 41);
        assert_eq!(meta.to, 45);
    }

    #[test]
    fn extreme_page_number_saturates_instead_of_overflowing() {
        let meta = page_meta(45, i64::MAX, 100);
        assert_eq!(meta.current_page, i64::MAX);
        assert_eq!(meta.from, i64::MAX);
        assert_eq!(meta.to, 45);
        assert_eq!(meta.last_page, 1);

        let meta = page_meta(0, i64::MAX, 20);
        assert_eq!(meta.to, 0);
    }

    #[test]
    fn exact_multiple_of_limit() {
        let meta = page_meta(40, 2, 20);
        assert_eq!(meta.last_page, 2);
        assert_eq!(meta.to, 40);
    }
}
