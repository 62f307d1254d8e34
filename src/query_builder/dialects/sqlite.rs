//! SQLite dialect

use super::{quote_with, SqlDialect};

/// SQLite dialect
pub struct SQLiteDialect;

impl SQLiteDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SQLiteDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for SQLiteDialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '"')
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn limit_syntax(&self, limit: Option<u64>, offset: u64) -> String {
        // SQLite needs a LIMIT for OFFSET; -1 means no limit
        match (limit, offset) {
            (Some(limit), 0) => format!(" LIMIT {}", limit),
            (Some(limit), offset) => format!(" LIMIT {} OFFSET {}", limit, offset),
            (None, 0) => String::new(),
            (None, offset) => format!(" LIMIT -1 OFFSET {}", offset),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
