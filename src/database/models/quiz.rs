use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Quiz {
    pub id: i64,
    pub institution_id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub time_limit_minutes: Option<i32>,
    pub total_marks: Option<i32>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "course_id",
    "title",
    "description",
    "time_limit_minutes",
    "total_marks",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "course_id", "status"];

impl Quiz {
    pub fn repo(pool: MySqlPool) -> Repository<Quiz> {
        Repository::new("quizzes", WRITABLE, FILTERABLE, pool)
    }
}
