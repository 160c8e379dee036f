use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

/// Graded evaluation (exam, test, practical) attached to a course.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Assessment {
    pub id: i64,
    pub institution_id: i64,
    pub course_id: i64,
    pub title: String,
    pub kind: String,
    pub max_score: Option<i32>,
    pub assessment_date: Option<NaiveDate>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "course_id",
    "title",
    "kind",
    "max_score",
    "assessment_date",
];
const FILTERABLE: &[&str] = &["institution_id", "course_id", "kind"];

impl Assessment {
    pub fn repo(pool: MySqlPool) -> Repository<Assessment> {
        Repository::new("assessments", WRITABLE, FILTERABLE, pool)
    }
}
