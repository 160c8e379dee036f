use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

/// A class (homeroom) of students. Stored in the `classes` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SchoolClass {
    pub id: i64,
    pub institution_id: i64,
    pub teacher_id: Option<i64>,
    pub name: String,
    pub grade_level: Option<String>,
    pub academic_year: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "teacher_id",
    "name",
    "grade_level",
    "academic_year",
];
const FILTERABLE: &[&str] = &["institution_id", "teacher_id", "grade_level", "academic_year"];

impl SchoolClass {
    pub fn repo(pool: MySqlPool) -> Repository<SchoolClass> {
        Repository::new("classes", WRITABLE, FILTERABLE, pool)
    }
}
