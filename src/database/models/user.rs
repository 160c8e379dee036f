use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;
use crate::database::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub institution_id: Option<i64>,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never serialized into a response
    #[serde(skip_serializing)]
    pub password: String,
    pub role: String,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "name",
    "email",
    "password",
    "role",
    "status",
];
const FILTERABLE: &[&str] = &["institution_id", "role", "status"];

impl User {
    pub fn repo(pool: MySqlPool) -> Repository<User> {
        Repository::new("users", WRITABLE, FILTERABLE, pool)
    }

    /// Login lookup; email is unique per deployment.
    pub async fn find_by_email(pool: &MySqlPool, email: &str) -> Result<Option<User>, DbError> {
        Ok(
            sqlx::query_as::<_, User>("SELECT * FROM `users` WHERE `email` = ? LIMIT 1")
                .bind(email)
                .fetch_optional(pool)
                .await?,
        )
    }
}
