use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};

use crate::database::repository::Repository;
use crate::database::DbError;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AttendanceRecord {
    pub id: i64,
    pub institution_id: i64,
    pub class_id: i64,
    pub student_id: i64,
    pub attendance_date: NaiveDate,
    /// present | absent | late | excused
    pub status: String,
    pub recorded_by: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &[
    "institution_id",
    "class_id",
    "student_id",
    "attendance_date",
    "status",
    "recorded_by",
];
const FILTERABLE: &[&str] = &["institution_id", "class_id", "student_id", "attendance_date", "status"];

/// One row of a bulk marking request.
#[derive(Debug, Clone, Deserialize)]
pub struct AttendanceEntry {
    pub student_id: i64,
    pub status: String,
}

impl AttendanceRecord {
    pub fn repo(pool: MySqlPool) -> Repository<AttendanceRecord> {
        Repository::new("attendance_records", WRITABLE, FILTERABLE, pool)
    }

    /// Mark a whole class for one day in a single transaction. Rows are
    /// upserted on (class_id, student_id, attendance_date); any failure
    /// rolls back every row. Returns the number of entries written.
    pub async fn mark_bulk(
        pool: &MySqlPool,
        institution_id: i64,
        class_id: i64,
        date: NaiveDate,
        recorded_by: i64,
        entries: &[AttendanceEntry],
    ) -> Result<u64, DbError> {
        let mut tx = pool.begin().await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO `attendance_records` \
                 (`institution_id`, `class_id`, `student_id`, `attendance_date`, `status`, `recorded_by`) \
                 VALUES (?, ?, ?, ?, ?, ?) \
                 ON DUPLICATE KEY UPDATE `status` = VALUES(`status`), `recorded_by` = VALUES(`recorded_by`)",
            )
            .bind(institution_id)
            .bind(class_id)
            .bind(entry.student_id)
            .bind(date)
            .bind(&entry.status)
            .bind(recorded_by)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(entries.len() as u64)
    }
}
