use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

/// Supplementary material attached to a course; the file itself lives in
/// external storage, only the URL is tracked here.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CourseMaterial {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub file_url: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &["course_id", "title", "description", "file_url"];
const FILTERABLE: &[&str] = &["course_id"];

impl CourseMaterial {
    pub fn repo(pool: MySqlPool) -> Repository<CourseMaterial> {
        Repository::new("course_materials", WRITABLE, FILTERABLE, pool)
    }
}
