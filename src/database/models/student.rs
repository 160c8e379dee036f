use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub institution_id: i64,
    pub user_id: Option<i64>,
    pub class_id: Option<i64>,
    pub admission_number: String,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "user_id",
    "class_id",
    "admission_number",
    "guardian_name",
    "guardian_phone",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "class_id", "status"];

impl Student {
    pub fn repo(pool: MySqlPool) -> Repository<Student> {
        Repository::new("students", WRITABLE, FILTERABLE, pool)
    }
}
