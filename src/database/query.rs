//! Parameterized SQL assembly for the generic repository.
//!
//! Builders return a `SqlQuery` (statement plus ordered params); binding
//! happens at execution time via `bind_value`. Identifiers are validated and
//! backtick-quoted, values always travel as placeholders.

use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::{FromRow, MySql};

use crate::database::DbError;

#[derive(Debug, Clone)]
pub struct SqlQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Reject anything that is not a plain `[a-zA-Z0-9_]` identifier.
pub fn valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.chars().next().is_some_and(|c| c.is_ascii_digit())
}

fn quote(name: &str) -> String {
    format!("`{}`", name)
}

fn check_identifier(name: &str) -> Result<(), DbError> {
    if valid_identifier(name) {
        Ok(())
    } else {
        Err(DbError::UnknownColumn(name.to_string()))
    }
}

fn where_clause(filters: &[(&str, Value)]) -> Result<(String, Vec<Value>), DbError> {
    if filters.is_empty() {
        return Ok((String::new(), vec![]));
    }
    let mut parts = Vec::with_capacity(filters.len());
    let mut params = Vec::with_capacity(filters.len());
    for (column, value) in filters {
        check_identifier(column)?;
        if value.is_null() {
            parts.push(format!("{} IS NULL", quote(column)));
        } else {
            parts.push(format!("{} = ?", quote(column)));
            params.push(value.clone());
        }
    }
    Ok((format!(" WHERE {}", parts.join(" AND ")), params))
}

/// SELECT with equality filters, newest-first ordering, and a page window.
pub fn select(
    table: &str,
    filters: &[(&str, Value)],
    limit: i64,
    offset: i64,
) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    let (clause, params) = where_clause(filters)?;
    let sql = format!(
        "SELECT * FROM {}{} ORDER BY `id` DESC LIMIT {} OFFSET {}",
        quote(table),
        clause,
        limit.max(0),
        offset.max(0)
    );
    Ok(SqlQuery { sql, params })
}

pub fn select_by_id(table: &str) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    Ok(SqlQuery {
        sql: format!("SELECT * FROM {} WHERE `id` = ?", quote(table)),
        params: vec![],
    })
}

pub fn count(table: &str, filters: &[(&str, Value)]) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    let (clause, params) = where_clause(filters)?;
    Ok(SqlQuery {
        sql: format!("SELECT COUNT(*) AS count FROM {}{}", quote(table), clause),
        params,
    })
}

pub fn insert(table: &str, fields: &[(&str, Value)]) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    if fields.is_empty() {
        return Err(DbError::UnknownColumn("<empty field list>".to_string()));
    }
    let mut columns = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());
    for (column, value) in fields {
        check_identifier(column)?;
        columns.push(quote(column));
        params.push(value.clone());
    }
    let placeholders = vec!["?"; fields.len()].join(", ");
    Ok(SqlQuery {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            columns.join(", "),
            placeholders
        ),
        params,
    })
}

pub fn update(table: &str, id: i64, fields: &[(&str, Value)]) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    if fields.is_empty() {
        return Err(DbError::UnknownColumn("<empty field list>".to_string()));
    }
    let mut sets = Vec::with_capacity(fields.len());
    let mut params = Vec::with_capacity(fields.len());
    for (column, value) in fields {
        check_identifier(column)?;
        sets.push(format!("{} = ?", quote(column)));
        params.push(value.clone());
    }
    params.push(Value::from(id));
    Ok(SqlQuery {
        sql: format!("UPDATE {} SET {} WHERE `id` = ?", quote(table), sets.join(", ")),
        params,
    })
}

pub fn delete(table: &str) -> Result<SqlQuery, DbError> {
    check_identifier(table)?;
    Ok(SqlQuery {
        sql: format!("DELETE FROM {} WHERE `id` = ?", quote(table)),
        params: vec![],
    })
}

/// Bind a JSON value onto a plain query. MySQL has no u64 column type, so
/// large unsigned values are cast down.
pub fn bind_value<'q>(
    q: sqlx::query::Query<'q, MySql, MySqlArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, MySql, MySqlArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

/// Same as `bind_value`, for typed `query_as` queries.
pub fn bind_value_as<'q, O>(
    q: sqlx::query::QueryAs<'q, MySql, O, MySqlArguments>,
    v: &'q Value,
) -> sqlx::query::QueryAs<'q, MySql, O, MySqlArguments>
where
    O: for<'r> FromRow<'r, sqlx::mysql::MySqlRow>,
{
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(u) = n.as_u64() {
                q.bind(u as i64)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_without_filters() {
        let q = select("courses", &[], 20, 0).unwrap();
        assert_eq!(q.sql, "SELECT * FROM `courses` ORDER BY `id` DESC LIMIT 20 OFFSET 0");
        assert!(q.params.is_empty());
    }

    #[test]
    fn select_with_filters_binds_in_order() {
        let q = select(
            "courses",
            &[("institution_id", json!(3)), ("status", json!("active"))],
            10,
            20,
        )
        .unwrap();
        assert_eq!(
            q.sql,
            "SELECT * FROM `courses` WHERE `institution_id` = ? AND `status` = ? \
             ORDER BY `id` DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(q.params, vec![json!(3), json!("active")]);
    }

    #[test]
    fn null_filter_becomes_is_null() {
        let q = count("notifications", &[("read_at", Value::Null)]).unwrap();
        assert_eq!(q.sql, "SELECT COUNT(*) AS count FROM `notifications` WHERE `read_at` IS NULL");
        assert!(q.params.is_empty());
    }

    #[test]
    fn insert_lists_columns_and_placeholders() {
        let q = insert("users", &[("name", json!("Ada")), ("role", json!("admin"))]).unwrap();
        assert_eq!(q.sql, "INSERT INTO `users` (`name`, `role`) VALUES (?, ?)");
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_appends_id_param() {
        let q = update("users", 9, &[("name", json!("Ada"))]).unwrap();
        assert_eq!(q.sql, "UPDATE `users` SET `name` = ? WHERE `id` = ?");
        assert_eq!(q.params, vec![json!("Ada"), json!(9)]);
    }

    #[test]
    fn rejects_hostile_identifiers() {
        assert!(select("users; DROP TABLE users", &[], 1, 0).is_err());
        assert!(insert("users", &[("na`me", json!(1))]).is_err());
        assert!(update("users", 1, &[]).is_err());
    }

    #[test]
    fn identifier_rules() {
        assert!(valid_identifier("attendance_records"));
        assert!(!valid_identifier("1users"));
        assert!(!valid_identifier(""));
        assert!(!valid_identifier("a-b"));
    }
}
