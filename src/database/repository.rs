use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::mysql::MySqlRow;
use sqlx::{FromRow, MySqlPool, Row};
use tracing::debug;

use crate::database::query::{self, bind_value, bind_value_as};
use crate::database::DbError;

/// Generic per-table accessor. Every resource accessor is an instance of
/// this with its own table name and column allow-lists; filters or fields
/// outside the allow-list never reach SQL.
pub struct Repository<T> {
    table: &'static str,
    /// Columns accepted by create/update.
    writable: &'static [&'static str],
    /// Columns accepted as equality filters in list/count.
    filterable: &'static [&'static str],
    pool: MySqlPool,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Repository<T>
where
    T: for<'r> FromRow<'r, MySqlRow> + Send + Unpin + Serialize,
{
    pub fn new(
        table: &'static str,
        writable: &'static [&'static str],
        filterable: &'static [&'static str],
        pool: MySqlPool,
    ) -> Self {
        Self {
            table,
            writable,
            filterable,
            pool,
            _phantom: std::marker::PhantomData,
        }
    }

    /// One page of rows matching the allow-listed filters, newest first.
    pub async fn list(
        &self,
        page: i64,
        limit: i64,
        filters: &[(&str, Value)],
    ) -> Result<Vec<T>, DbError> {
        let filters = self.allowed_filters(filters);
        let offset = (page.max(1) - 1).saturating_mul(limit);
        let sql = query::select(self.table, &filters, limit, offset)?;
        let mut q = sqlx::query_as::<_, T>(&sql.sql);
        for p in sql.params.iter() {
            q = bind_value_as(q, p);
        }
        Ok(q.fetch_all(&self.pool).await?)
    }

    pub async fn count(&self, filters: &[(&str, Value)]) -> Result<i64, DbError> {
        let filters = self.allowed_filters(filters);
        let sql = query::count(self.table, &filters)?;
        let mut q = sqlx::query(&sql.sql);
        for p in sql.params.iter() {
            q = bind_value(q, p);
        }
        let row = q.fetch_one(&self.pool).await?;
        Ok(row.try_get("count")?)
    }

    /// `Ok(None)` means the row does not exist; errors are real failures.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<T>, DbError> {
        let sql = query::select_by_id(self.table)?;
        Ok(sqlx::query_as::<_, T>(&sql.sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// Insert the writable subset of `fields`; returns the new row id.
    pub async fn create(&self, fields: &Map<String, Value>) -> Result<i64, DbError> {
        let fields = self.writable_fields(fields);
        let sql = query::insert(self.table, &fields)?;
        let mut q = sqlx::query(&sql.sql);
        for p in sql.params.iter() {
            q = bind_value(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.last_insert_id() as i64)
    }

    /// Partial update; true when a row was changed. A body with no writable
    /// fields is a no-op, not an error.
    pub async fn update(&self, id: i64, fields: &Map<String, Value>) -> Result<bool, DbError> {
        let fields = self.writable_fields(fields);
        if fields.is_empty() {
            return Ok(false);
        }
        let sql = query::update(self.table, id, &fields)?;
        let mut q = sqlx::query(&sql.sql);
        for p in sql.params.iter() {
            q = bind_value(q, p);
        }
        let result = q.execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(&self, id: i64) -> Result<bool, DbError> {
        let sql = query::delete(self.table)?;
        let result = sqlx::query(&sql.sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    fn allowed_filters<'a>(&self, filters: &[(&'a str, Value)]) -> Vec<(&'a str, Value)> {
        filters
            .iter()
            .filter(|(column, _)| {
                let allowed = self.filterable.contains(column);
                if !allowed {
                    debug!(table = self.table, column, "dropping non-filterable column");
                }
                allowed
            })
            .cloned()
            .collect()
    }

    fn writable_fields<'a>(&self, fields: &'a Map<String, Value>) -> Vec<(&'a str, Value)> {
        self.writable
            .iter()
            .filter_map(|column| fields.get(*column).map(|v| (*column, v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use sqlx::mysql::MySqlPoolOptions;

    #[derive(serde::Serialize, sqlx::FromRow)]
    struct Dummy {
        id: i64,
    }

    fn repo() -> Repository<Dummy> {
        // connect_lazy never touches the network until a query runs
        let pool = MySqlPoolOptions::new().connect_lazy("mysql://test@localhost/test").unwrap();
        Repository::new("dummies", &["name", "status"], &["status"], pool)
    }

    #[tokio::test]
    async fn unknown_filters_are_dropped() {
        let r = repo();
        let kept = r.allowed_filters(&[
            ("status", json!("active")),
            ("password", json!("x")),
        ]);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "status");
    }

    #[tokio::test]
    async fn update_without_writable_fields_is_a_noop() {
        let r = repo();
        // Never reaches the pool, so the lazy connection is not exercised
        assert!(!r.update(1, &Map::new()).await.unwrap());

        let mut fields = Map::new();
        fields.insert("id".to_string(), json!(99));
        fields.insert("unknown".to_string(), json!("x"));
        assert!(!r.update(1, &fields).await.unwrap());
    }

    #[tokio::test]
    async fn writable_fields_follow_the_allow_list() {
        let r = repo();
        let mut fields = Map::new();
        fields.insert("name".to_string(), json!("Ada"));
        fields.insert("id".to_string(), json!(99));
        fields.insert("role".to_string(), json!("admin"));
        let kept = r.writable_fields(&fields);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].0, "name");
    }
}
