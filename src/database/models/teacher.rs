use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Teacher {
    pub id: i64,
    pub institution_id: i64,
    pub user_id: Option<i64>,
    pub employee_number: String,
    pub department: Option<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "user_id",
    "employee_number",
    "department",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "department", "status"];

impl Teacher {
    pub fn repo(pool: MySqlPool) -> Repository<Teacher> {
        Repository::new("teachers", WRITABLE, FILTERABLE, pool)
    }
}
