//! Filter expressions handed from a listing to a query builder
//!
//! A condition is an opaque SQL fragment plus the values bound to its `?`
//! markers. Builders do not parse it; they only renumber the markers for the
//! dialect they render with, and only when values are bound. A condition
//! without values is emitted verbatim, so PostgreSQL operators such as
//! jsonb `?`, `?|` and `?&` survive in it.

use super::dialects::SqlDialect;
use crate::value::SqlValue;

/// SQL filter expression with bound condition variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Condition {
    sql: String,
    params: Vec<SqlValue>,
}

impl Condition {
    /// Create a condition without bound variables
    pub fn new<S: Into<String>>(sql: S) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Create a condition whose `?` markers bind `params` in order
    ///
    /// # Example
    /// ```
    /// use listing_query::Condition;
    ///
    /// let condition = Condition::with_params("published = ? AND author_id = ?", vec![true.into(), 7i64.into()]);
    /// assert_eq!(condition.params().len(), 2);
    /// ```
    pub fn with_params<S: Into<String>>(sql: S, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// A blank condition means "no filter"
    pub fn is_empty(&self) -> bool {
        self.sql.trim().is_empty()
    }

    /// Render with dialect placeholders, numbering from `start_param_index`
    ///
    /// Returns the SQL, the bound values and the next free parameter index.
    /// Markers inside single-quoted literals are left alone.
    pub(crate) fn render(
        &self,
        dialect: &dyn SqlDialect,
        start_param_index: usize,
    ) -> (String, Vec<SqlValue>, usize) {
        if self.params.is_empty() {
            return (self.sql.clone(), Vec::new(), start_param_index);
        }

        let mut sql = String::with_capacity(self.sql.len());
        let mut param_count = start_param_index;
        let mut in_literal = false;

        for ch in self.sql.chars() {
            match ch {
                '\'' => {
                    in_literal = !in_literal;
                    sql.push(ch);
                }
                '?' if !in_literal => {
                    sql.push_str(&dialect.placeholder(param_count));
                    param_count += 1;
                }
                _ => sql.push(ch),
            }
        }

        (sql, self.params.clone(), param_count)
    }
}

impl From<&str> for Condition {
    fn from(sql: &str) -> Self {
        Condition::new(sql)
    }
}

impl From<String> for Condition {
    fn from(sql: String) -> Self {
        Condition::new(sql)
    }
}
