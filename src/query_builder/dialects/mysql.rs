//! MySQL/MariaDB dialect

use super::{quote_with, SqlDialect};

/// Largest row count MySQL accepts; used when an offset has no limit
const MYSQL_MAX_ROWS: u64 = u64::MAX;

/// MySQL/MariaDB dialect
pub struct MySQLDialect;

impl MySQLDialect {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MySQLDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlDialect for MySQLDialect {
    fn quote_identifier(&self, identifier: &str) -> String {
        quote_with(identifier, '`')
    }

    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn limit_syntax(&self, limit: Option<u64>, offset: u64) -> String {
        // MySQL has no OFFSET without LIMIT
        match (limit, offset) {
            (Some(limit), 0) => format!(" LIMIT {}", limit),
            (Some(limit), offset) => format!(" LIMIT {} OFFSET {}", limit, offset),
            (None, 0) => String::new(),
            (None, offset) => format!(" LIMIT {} OFFSET {}", MYSQL_MAX_ROWS, offset),
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_without_limit() {
        let dialect = MySQLDialect::new();
        assert_eq!(
            dialect.limit_syntax(None, 20),
            " LIMIT 18446744073709551615 OFFSET 20"
        );
        assert_eq!(dialect.limit_syntax(Some(5), 0), " LIMIT 5");
    }

    #[test]
    fn test_backtick_quoting() {
        assert_eq!(MySQLDialect::new().quote_identifier("order"), "`order`");
    }
}
