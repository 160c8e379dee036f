use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;
use crate::database::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub institution_id: i64,
    pub sender_id: i64,
    pub recipient_id: i64,
    pub subject: Option<String>,
    pub body: String,
    pub read_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "sender_id",
    "recipient_id",
    "subject",
    "body",
];
const FILTERABLE: &[&str] = &["institution_id", "sender_id", "recipient_id"];

impl Message {
    pub fn repo(pool: MySqlPool) -> Repository<Message> {
        Repository::new("messages", WRITABLE, FILTERABLE, pool)
    }

    /// Stamp the read time; only the recipient can mark their copy read.
    pub async fn mark_read(pool: &MySqlPool, id: i64, recipient_id: i64) -> Result<bool, DbError> {
        let result = sqlx::query(
            "UPDATE `messages` SET `read_at` = NOW() \
             WHERE `id` = ? AND `recipient_id` = ? AND `read_at` IS NULL",
        )
        .bind(id)
        .bind(recipient_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
