use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Course {
    pub id: i64,
    pub institution_id: i64,
    pub class_id: Option<i64>,
    pub teacher_id: Option<i64>,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "class_id",
    "teacher_id",
    "name",
    "code",
    "description",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "class_id", "teacher_id", "status"];

impl Course {
    pub fn repo(pool: MySqlPool) -> Repository<Course> {
        Repository::new("courses", WRITABLE, FILTERABLE, pool)
    }
}
