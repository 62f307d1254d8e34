//! PostgreSQL dialect

use super::{quote_with, SqlDialect};

/// PostgreSQL dialect: double-quoted identifiers, `$n` placeholders
pub struct PostgresDialect;

impl PostgresDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PostgresDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for PostgresDialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${}", position)
    }

    fn limit_syntax(&self, limit: Option<u64>, offset: u64) -> String {
        let mut sql = String::new();
        if let Some(limit) = limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if offset > 0 {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
