use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;
use crate::database::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Notification {
    pub id: i64,
    pub institution_id: i64,
    pub user_id: i64,
    pub title: String,
    pub body: Option<String>,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &["institution_id", "user_id", "title", "body"];
const FILTERABLE: &[&str] = &["institution_id", "user_id"];

impl Notification {
    pub fn repo(pool: MySqlPool) -> Repository<Notification> {
        Repository::new("notifications", WRITABLE, FILTERABLE, pool)
    }

    pub async fn mark_read(pool: &MySqlPool, id: i64, user_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE `notifications` SET `read_at` = NOW() \
             WHERE `id` = ? AND `user_id` = ? AND `read_at` IS NULL",
        )
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
