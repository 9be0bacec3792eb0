use serde_json::{Map, Value};
use sqlx::{mysql::MySqlArguments, MySql};

use crate::database::manager::DatabaseError;

/// Builds parameterized INSERT/UPDATE statements from JSON field maps.
///
/// Column names only ever come from a caller-supplied whitelist of static
/// strings, so user input never reaches the SQL text; values are bound.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    table_name: &'static str,
    values: Vec<(&'static str, Value)>,
}

impl QueryBuilder {
    pub fn new(table_name: &'static str) -> Self {
        Self {
            table_name,
            values: Vec::new(),
        }
    }

    /// Start from a JSON object, keeping only whitelisted columns.
    /// Any key outside the whitelist is an error.
    pub fn from_fields(
        table_name: &'static str,
        allowed: &[&'static str],
        fields: &Map<String, Value>,
    ) -> Result<Self, DatabaseError> {
        let mut builder = Self::new(table_name);
        for (key, value) in fields {
            let column = allowed
                .iter()
                .find(|c| **c == key.as_str())
                .ok_or_else(|| DatabaseError::QueryError(format!("Column '{}' is not writable on {}", key, table_name)))?;
            builder = builder.set(*column, value.clone());
        }
        Ok(builder)
    }

    pub fn set(mut self, column: &'static str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if let Some(existing) = self.values.iter_mut().find(|(c, _)| *c == column) {
            existing.1 = value;
        } else {
            self.values.push((column, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn insert_sql(&self) -> String {
        let columns: Vec<String> = self.values.iter().map(|(c, _)| format!("`{}`", c)).collect();
        let placeholders = vec!["?"; self.values.len()].join(", ");
        format!(
            "INSERT INTO `{}` ({}) VALUES ({})",
            self.table_name,
            columns.join(", "),
            placeholders
        )
    }

    pub fn update_sql(&self) -> String {
        let assignments: Vec<String> = self.values.iter().map(|(c, _)| format!("`{}` = ?", c)).collect();
        format!(
            "UPDATE `{}` SET {} WHERE `id` = ?",
            self.table_name,
            assignments.join(", ")
        )
    }

    pub async fn insert<'e, E>(self, executor: E) -> Result<i64, DatabaseError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        if self.is_empty() {
            return Err(DatabaseError::QueryError("Nothing to insert".to_string()));
        }
        let sql = self.insert_sql();
        let mut q = sqlx::query(&sql);
        for (_, v) in self.values.iter() {
            q = bind_param_query(q, v);
        }
        let result = q.execute(executor).await?;
        Ok(result.last_insert_id() as i64)
    }

    pub async fn update<'e, E>(self, executor: E, id: i64) -> Result<u64, DatabaseError>
    where
        E: sqlx::Executor<'e, Database = MySql>,
    {
        if self.is_empty() {
            return Ok(0);
        }
        let sql = self.update_sql();
        let mut q = sqlx::query(&sql);
        for (_, v) in self.values.iter() {
            q = bind_param_query(q, v);
        }
        let result = q.bind(id).execute(executor).await?;
        Ok(result.rows_affected())
    }
}

fn bind_param_query<'q>(
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
                q.bind(u)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["title", "description", "status"];

    #[test]
    fn builds_update_sql_in_field_order() {
        let qb = QueryBuilder::new("programs")
            .set("title", "Feeding Program")
            .set("status", "active");
        assert_eq!(qb.update_sql(), "UPDATE `programs` SET `title` = ?, `status` = ? WHERE `id` = ?");
    }

    #[test]
    fn builds_insert_sql() {
        let qb = QueryBuilder::new("programs")
            .set("organization_id", 4)
            .set("title", "Tree Planting");
        assert_eq!(
            qb.insert_sql(),
            "INSERT INTO `programs` (`organization_id`, `title`) VALUES (?, ?)"
        );
    }

    #[test]
    fn set_overwrites_existing_column() {
        let qb = QueryBuilder::new("programs").set("title", "a").set("title", "b");
        assert_eq!(qb.values.len(), 1);
        assert_eq!(qb.values[0].1, json!("b"));
    }

    #[test]
    fn rejects_columns_outside_whitelist() {
        let fields = json!({ "title": "x", "organization_id": 9 });
        let err = QueryBuilder::from_fields("programs", ALLOWED, fields.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, DatabaseError::QueryError(msg) if msg.contains("organization_id")));
    }

    #[test]
    fn accepts_whitelisted_columns() {
        let fields = json!({ "title": "x", "status": "completed" });
        let qb = QueryBuilder::from_fields("programs", ALLOWED, fields.as_object().unwrap()).unwrap();
        assert!(!qb.is_empty());
        assert!(qb.update_sql().contains("`status` = ?"));
    }
}
