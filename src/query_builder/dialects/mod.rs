//! Database dialects shared by both query builder backends
//!
//! Each dialect knows how its database quotes identifiers, numbers bound
//! parameters and spells LIMIT/OFFSET. The Primary and LegacyCompatible
//! builders render through the same dialect so that a listing produces the
//! same SQL shape whichever backend is selected.

use serde::{Deserialize, Serialize};

/// Database backend types a listing can target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Postgres,
    MySQL,
    MariaDB,
    SQLite,
}

impl DatabaseBackend {
    /// Parse a backend name as used in configuration files and environment variables
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Some(DatabaseBackend::Postgres),
            "mysql" => Some(DatabaseBackend::MySQL),
            "mariadb" => Some(DatabaseBackend::MariaDB),
            "sqlite" => Some(DatabaseBackend::SQLite),
            _ => None,
        }
    }
}

/// Unified error type for query rendering
#[derive(thiserror::Error, Debug)]
pub enum QueryError {
    #[error("Missing required clause: {clause}. Add .{clause}() to your query.")]
    MissingClause { clause: String },
}

/// Trait for database-specific SQL generation
pub trait SqlDialect: Send + Sync {
    /// Quote an identifier (table name, column name) for this database
    fn quote_identifier(&self, identifier: &str) -> String;

    /// Generate a parameter placeholder for the given position
    fn placeholder(&self, position: usize) -> String;

    /// Generate LIMIT/OFFSET syntax for this database
    ///
    /// An offset of zero is never rendered.
    fn limit_syntax(&self, limit: Option<u64>, offset: u64) -> String;

    /// Support for downcasting to specific dialect implementations
    fn as_any(&self) -> &dyn std::any::Any;
}

pub mod mysql;
pub mod postgres;
pub mod sqlite;

pub use mysql::MySQLDialect;
pub use postgres::PostgresDialect;
pub use sqlite::SQLiteDialect;

/// Factory function to create the appropriate dialect for a database backend
pub fn create_dialect(backend: DatabaseBackend) -> Box<dyn SqlDialect> {
    match backend {
        DatabaseBackend::Postgres => Box::new(PostgresDialect::new()),
        DatabaseBackend::MySQL | DatabaseBackend::MariaDB => Box::new(MySQLDialect::new()),
        DatabaseBackend::SQLite => Box::new(SQLiteDialect::new()),
    }
}

/// Quote `identifier` with `quote` when it is a bare name
///
/// Qualified names, `*`, already-quoted names and expressions pass through
/// unchanged.
pub(crate) fn quote_with(identifier: &str, quote: char) -> String {
    if is_bare_identifier(identifier) {
        format!("{q}{}{q}", identifier, q = quote)
    } else {
        identifier.to_string()
    }
}

fn is_bare_identifier(identifier: &str) -> bool {
    let mut chars = identifier.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_backend_names() {
        assert_eq!(DatabaseBackend::parse("PostgreSQL"), Some(DatabaseBackend::Postgres));
        assert_eq!(DatabaseBackend::parse(" mariadb "), Some(DatabaseBackend::MariaDB));
        assert_eq!(DatabaseBackend::parse("sqlite"), Some(DatabaseBackend::SQLite));
        assert_eq!(DatabaseBackend::parse("oracle"), None);
    }

    #[test]
    fn test_factory_picks_dialect() {
        let dialect = create_dialect(DatabaseBackend::MariaDB);
        assert!(dialect.as_any().is::<MySQLDialect>());

        let dialect = create_dialect(DatabaseBackend::Postgres);
        assert!(dialect.as_any().is::<PostgresDialect>());
    }

    #[test]
    fn test_qualified_names_are_not_quoted() {
        assert_eq!(quote_with("users.id", '"'), "users.id");
        assert_eq!(quote_with("*", '`'), "*");
        assert_eq!(quote_with("created_at", '"'), "\"created_at\"");
    }

    #[test]
    fn test_expressions_and_quoted_names_pass_through() {
        assert_eq!(quote_with("DATE(created_at)", '`'), "DATE(created_at)");
        assert_eq!(quote_with("FIELD(id, 3, 1)", '`'), "FIELD(id, 3, 1)");
        assert_eq!(quote_with("`o_key`", '`'), "`o_key`");
        assert_eq!(quote_with("\"Mixed Case\"", '"'), "\"Mixed Case\"");
        assert_eq!(quote_with("score DESC NULLS LAST", '"'), "score DESC NULLS LAST");
        assert_eq!(quote_with("1", '"'), "1");
    }
}
