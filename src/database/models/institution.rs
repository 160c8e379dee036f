use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::{FromRow, MySqlPool};

use crate::database::query::{self, bind_value};
use crate::database::repository::Repository;
use crate::database::DbError;

/// Tenant root: every domain table is scoped by an institution id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Institution {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

const WRITABLE: &[&str] = &["name", "email", "phone", "address", "status"];
const FILTERABLE: &[&str] = &["status"];

/// Settings every new institution starts with.
const DEFAULT_SETTINGS: &[(&str, &str)] = &[
    ("academic_year", "2026-2027"),
    ("grading_scale", "percentage"),
    ("attendance_mode", "daily"),
    ("timezone", "UTC"),
];

impl Institution {
    pub fn repo(pool: MySqlPool) -> Repository<Institution> {
        Repository::new("institutions", WRITABLE, FILTERABLE, pool)
    }

    /// Create an institution and seed its default settings in one
    /// transaction; any failure rolls the whole batch back.
    pub async fn create_with_defaults(
        pool: &MySqlPool,
        fields: &Map<String, Value>,
    ) -> Result<i64, DbError> {
        let insert_fields: Vec<(&str, Value)> = WRITABLE
            .iter()
            .filter_map(|column| fields.get(*column).map(|v| (*column, v.clone())))
            .collect();
        let sql = query::insert("institutions", &insert_fields)?;

        let mut tx = pool.begin().await?;

        let mut q = sqlx::query(&sql.sql);
        for p in sql.params.iter() {
            q = bind_value(q, p);
        }
        let result = q.execute(&mut *tx).await?;
        let institution_id = result.last_insert_id() as i64;

        for (key, value) in DEFAULT_SETTINGS {
            sqlx::query(
                "INSERT INTO `institution_settings` (`institution_id`, `setting_key`, `setting_value`) \
                 VALUES (?, ?, ?)",
            )
            .bind(institution_id)
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(institution_id)
    }
}
