use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assignment {
    pub id: i64,
    pub institution_id: i64,
    pub course_id: i64,
    pub teacher_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub max_score: Option<i32>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "course_id",
    "teacher_id",
    "title",
    "description",
    "due_date",
    "max_score",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "course_id", "teacher_id", "status"];

impl Assignment {
    pub fn repo(pool: MySqlPool) -> Repository<Assignment> {
        Repository::new("assignments", WRITABLE, FILTERABLE, pool)
    }
}
