pub mod assessments;
pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod classes;
pub mod courses;
pub mod health;
pub mod institutions;
pub mod messages;
pub mod notifications;
pub mod quizzes;
pub mod students;
pub mod teachers;
pub mod users;

use std::collections::HashMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Clamp pagination inputs to a sane window.
pub(crate) fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(20).clamp(1, 100);
    (page, limit)
}

/// Serialize a request body into the field map the repository consumes.
/// `Option` fields must carry `skip_serializing_if` so omitted fields stay
/// omitted instead of becoming SQL NULLs.
pub(crate) fn to_fields<T: Serialize>(value: &T) -> Result<Map<String, Value>, ApiError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::internal("request body did not serialize to an object")),
        Err(e) => Err(ApiError::internal(format!("request serialization failed: {}", e))),
    }
}

/// Collects per-field validation messages for a 422 response.
#[derive(Debug, Default)]
pub(crate) struct Validator {
    errors: HashMap<String, String>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require_str(&mut self, field: &str, value: Option<&str>) {
        match value {
            Some(s) if !s.trim().is_empty() => {}
            _ => {
                self.errors
                    .insert(field.to_string(), "This field is required".to_string());
            }
        }
    }

    pub fn require<T>(&mut self, field: &str, value: &Option<T>) {
        if value.is_none() {
            self.errors
                .insert(field.to_string(), "This field is required".to_string());
        }
    }

    pub fn check(&mut self, field: &str, ok: bool, message: &str) {
        if !ok {
            self.errors.insert(field.to_string(), message.to_string());
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::validation("Validation failed", self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_window_defaults_and_clamps() {
        assert_eq!(page_window(None, None), (1, 20));
        assert_eq!(page_window(Some(0), Some(0)), (1, 1));
        assert_eq!(page_window(Some(3), Some(500)), (3, 100));
    }

    #[test]
    fn validator_collects_field_errors() {
        let mut v = Validator::new();
        v.require_str("email", None);
        v.require_str("name", Some("  "));
        v.require_str("subject", Some("ok"));
        let err = v.finish().unwrap_err();
        match err {
            ApiError::Validation { field_errors, .. } => {
                assert_eq!(field_errors.len(), 2);
                assert!(field_errors.contains_key("email"));
                assert!(field_errors.contains_key("name"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
