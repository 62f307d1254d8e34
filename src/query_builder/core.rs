//! Primary query builder
//!
//! The default backend for listings. It keeps SELECT, WHERE, GROUP BY,
//! ORDER BY and LIMIT/OFFSET as separate query parts so a listing can mutate
//! them in place, and renders through a [`SqlDialect`] when asked for SQL.

use super::condition::Condition;
use super::dialects::{create_dialect, DatabaseBackend, QueryError, SqlDialect};
use super::{ListingQuery, QueryBuilderKind};
use crate::value::SqlValue;
use std::any::Any;
use std::fmt;

/// Main query builder that works with any database
pub struct QueryBuilder {
    pub(crate) dialect: Box<dyn SqlDialect>,
    pub(crate) backend: DatabaseBackend,
    pub(crate) table: Option<String>,
    pub(crate) select_columns: Vec<String>,
    pub(crate) where_conditions: Vec<WhereCondition>,
    pub(crate) group_by: Vec<String>,
    pub(crate) order_by: Vec<OrderByClause>,
    pub(crate) max_results: Option<u64>,
    pub(crate) first_result: u64,
}

/// One AND-ed term of the WHERE clause
#[derive(Clone, Debug, PartialEq)]
pub enum WhereCondition {
    /// `column = value`, value bound as a parameter
    Equals { column: String, value: SqlValue },
    /// `column IS NULL`
    IsNull(String),
    /// Free-form expression from a listing
    Expression(Condition),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderByClause {
    pub column: String,
    /// `None` leaves the direction to the database (ascending)
    pub direction: Option<OrderDirection>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderDirection {
    Asc,
    Desc,
    /// Any other direction token, rendered verbatim (e.g. `ASC NULLS LAST`)
    Raw(String),
}

impl OrderDirection {
    /// Parse a direction token such as `"ASC"`, `"desc"` or `"DESC NULLS FIRST"`
    ///
    /// Blank tokens yield `None`. `asc`/`desc` are recognised in any case;
    /// every other token is kept as [`OrderDirection::Raw`].
    pub fn from_token(token: &str) -> Option<Self> {
        let token = token.trim();
        if token.is_empty() {
            None
        } else if token.eq_ignore_ascii_case("asc") || token.eq_ignore_ascii_case("ascending") {
            Some(OrderDirection::Asc)
        } else if token.eq_ignore_ascii_case("desc") || token.eq_ignore_ascii_case("descending")
        {
            Some(OrderDirection::Desc)
        } else {
            Some(OrderDirection::Raw(token.to_string()))
        }
    }

    pub fn as_sql(&self) -> &str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
            OrderDirection::Raw(token) => token,
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Query parts that can be reset individually
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryPart {
    Select,
    Where,
    GroupBy,
    OrderBy,
}

impl QueryBuilder {
    /// Create a new query builder for the specified database backend
    pub fn new(backend: DatabaseBackend) -> Self {
        QueryBuilder {
            dialect: create_dialect(backend),
            backend,
            table: None,
            select_columns: vec!["*".to_string()],
            where_conditions: Vec::new(),
            group_by: Vec::new(),
            order_by: Vec::new(),
            max_results: None,
            first_result: 0,
        }
    }

    /// Set the table to query from
    pub fn from<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Set the columns to select
    pub fn select<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_select(columns);
        self
    }

    /// Add WHERE column = value condition
    pub fn where_eq<S: Into<String>, V: Into<SqlValue>>(mut self, column: S, value: V) -> Self {
        self.where_conditions.push(WhereCondition::Equals {
            column: column.into(),
            value: value.into(),
        });
        self
    }

    /// Add WHERE column IS NULL condition
    pub fn where_null<S: Into<String>>(mut self, column: S) -> Self {
        self.where_conditions.push(WhereCondition::IsNull(column.into()));
        self
    }

    /// AND a free-form expression onto the WHERE clause
    pub fn where_expr<C: Into<Condition>>(mut self, condition: C) -> Self {
        self.and_where(condition.into());
        self
    }

    /// Add ORDER BY clause
    pub fn order_by<S: Into<String>>(mut self, column: S, direction: OrderDirection) -> Self {
        self.add_order_by(column, Some(direction));
        self
    }

    /// Add GROUP BY clause
    pub fn group_by<S: Into<String>>(mut self, column: S) -> Self {
        self.add_group_by(column);
        self
    }

    /// Add LIMIT clause
    pub fn limit(mut self, limit: u64) -> Self {
        self.max_results = Some(limit);
        self
    }

    /// Add OFFSET clause
    pub fn offset(mut self, offset: u64) -> Self {
        self.first_result = offset;
        self
    }

    // =========================================================================
    // IN-PLACE MUTATION
    // =========================================================================

    /// Replace the selected columns; an empty list selects `*`
    pub fn set_select<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select_columns = columns.into_iter().map(|s| s.into()).collect();
        if self.select_columns.is_empty() {
            self.select_columns = vec!["*".to_string()];
        }
    }

    /// Replace the whole WHERE clause with `condition`
    pub fn set_where(&mut self, condition: Condition) {
        self.where_conditions.clear();
        self.and_where(condition);
    }

    /// AND `condition` onto the existing WHERE clause
    pub fn and_where(&mut self, condition: Condition) {
        self.where_conditions.push(WhereCondition::Expression(condition));
    }

    pub fn add_group_by<S: Into<String>>(&mut self, column: S) {
        self.group_by.push(column.into());
    }

    pub fn add_order_by<S: Into<String>>(&mut self, column: S, direction: Option<OrderDirection>) {
        self.order_by.push(OrderByClause {
            column: column.into(),
            direction,
        });
    }

    pub fn set_first_result(&mut self, offset: u64) {
        self.first_result = offset;
    }

    /// Set the maximum row count; `None` removes the limit
    pub fn set_max_results(&mut self, limit: Option<u64>) {
        self.max_results = limit;
    }

    /// Clear one query part back to its initial state
    pub fn reset_query_part(&mut self, part: QueryPart) {
        match part {
            QueryPart::Select => self.select_columns = vec!["*".to_string()],
            QueryPart::Where => self.where_conditions.clear(),
            QueryPart::GroupBy => self.group_by.clear(),
            QueryPart::OrderBy => self.order_by.clear(),
        }
    }

    // =========================================================================
    // ACCESSORS
    // =========================================================================

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn select_columns(&self) -> &[String] {
        &self.select_columns
    }

    pub fn where_conditions(&self) -> &[WhereCondition] {
        &self.where_conditions
    }

    pub fn group_by_columns(&self) -> &[String] {
        &self.group_by
    }

    pub fn order_by_clauses(&self) -> &[OrderByClause] {
        &self.order_by
    }

    pub fn max_results(&self) -> Option<u64> {
        self.max_results
    }

    pub fn first_result(&self) -> u64 {
        self.first_result
    }

    /// Build the SQL query string with dialect-specific syntax
    pub fn build(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        let table = self.table.as_ref().ok_or_else(|| QueryError::MissingClause {
            clause: "from".to_string(),
        })?;

        let mut sql = String::new();
        let mut params = Vec::new();

        sql.push_str("SELECT ");
        sql.push_str(&self.select_columns.join(", "));

        sql.push_str(" FROM ");
        sql.push_str(&self.dialect.quote_identifier(table));

        let (where_sql, where_params, _next_param) = self.build_where_clause(1);
        sql.push_str(&where_sql);
        params.extend(where_params);

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            let group_clauses: Vec<String> = self
                .group_by
                .iter()
                .map(|col| self.dialect.quote_identifier(col))
                .collect();
            sql.push_str(&group_clauses.join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            let order_clauses: Vec<String> = self
                .order_by
                .iter()
                .map(|clause| {
                    let column = self.dialect.quote_identifier(&clause.column);
                    match &clause.direction {
                        Some(direction) => format!("{} {}", column, direction),
                        None => column,
                    }
                })
                .collect();
            sql.push_str(&order_clauses.join(", "));
        }

        sql.push_str(
            &self
                .dialect
                .limit_syntax(self.max_results, self.first_result),
        );

        Ok((sql, params))
    }

    fn build_where_clause(&self, start_param_index: usize) -> (String, Vec<SqlValue>, usize) {
        if self.where_conditions.is_empty() {
            return (String::new(), Vec::new(), start_param_index);
        }

        let mut sql = String::from(" WHERE ");
        let mut params = Vec::new();
        let mut param_count = start_param_index;
        let wrap_expressions = self.where_conditions.len() > 1;

        for (i, condition) in self.where_conditions.iter().enumerate() {
            if i > 0 {
                sql.push_str(" AND ");
            }

            match condition {
                WhereCondition::Equals { column, value } => {
                    sql.push_str(&format!(
                        "{} = {}",
                        self.dialect.quote_identifier(column),
                        self.dialect.placeholder(param_count)
                    ));
                    params.push(value.clone());
                    param_count += 1;
                }
                WhereCondition::IsNull(column) => {
                    sql.push_str(&format!("{} IS NULL", self.dialect.quote_identifier(column)));
                }
                WhereCondition::Expression(expression) => {
                    let (expr_sql, expr_params, next) =
                        expression.render(self.dialect.as_ref(), param_count);
                    if wrap_expressions {
                        sql.push_str(&format!("({})", expr_sql));
                    } else {
                        sql.push_str(&expr_sql);
                    }
                    params.extend(expr_params);
                    param_count = next;
                }
            }
        }

        (sql, params, param_count)
    }
}

impl ListingQuery for QueryBuilder {
    fn kind(&self) -> QueryBuilderKind {
        QueryBuilderKind::Primary
    }

    fn where_condition(&mut self, condition: &Condition) {
        self.set_where(condition.clone());
    }

    fn add_group_by(&mut self, column: &str) {
        QueryBuilder::add_group_by(self, column);
    }

    fn add_order_by(&mut self, column: &str, direction: Option<OrderDirection>) {
        QueryBuilder::add_order_by(self, column, direction);
    }

    fn set_first_result(&mut self, offset: u64) {
        QueryBuilder::set_first_result(self, offset);
    }

    fn set_max_results(&mut self, limit: Option<u64>) {
        QueryBuilder::set_max_results(self, limit);
    }

    fn reset_for_count(&mut self) {
        self.set_select(["COUNT(*)"]);
        self.reset_query_part(QueryPart::OrderBy);
        QueryBuilder::set_max_results(self, None);
        QueryBuilder::set_first_result(self, 0);
    }

    fn to_sql(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        self.build()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for QueryBuilder {
    fn clone(&self) -> Self {
        QueryBuilder {
            dialect: create_dialect(self.backend),
            backend: self.backend,
            table: self.table.clone(),
            select_columns: self.select_columns.clone(),
            where_conditions: self.where_conditions.clone(),
            group_by: self.group_by.clone(),
            order_by: self.order_by.clone(),
            max_results: self.max_results,
            first_result: self.first_result,
        }
    }
}

// The dialect is derived from the backend, so it takes no part in equality
impl PartialEq for QueryBuilder {
    fn eq(&self, other: &Self) -> bool {
        self.backend == other.backend
            && self.table == other.table
            && self.select_columns == other.select_columns
            && self.where_conditions == other.where_conditions
            && self.group_by == other.group_by
            && self.order_by == other.order_by
            && self.max_results == other.max_results
            && self.first_result == other.first_result
    }
}

impl fmt::Debug for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryBuilder")
            .field("backend", &self.backend)
            .field("table", &self.table)
            .field("select_columns", &self.select_columns)
            .field("where_conditions", &self.where_conditions)
            .field("group_by", &self.group_by)
            .field("order_by", &self.order_by)
            .field("max_results", &self.max_results)
            .field("first_result", &self.first_result)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tokens() {
        assert_eq!(OrderDirection::from_token("ASC"), Some(OrderDirection::Asc));
        assert_eq!(OrderDirection::from_token(" desc "), Some(OrderDirection::Desc));
        assert_eq!(OrderDirection::from_token("  "), None);
        assert_eq!(
            OrderDirection::from_token("ASC NULLS LAST"),
            Some(OrderDirection::Raw("ASC NULLS LAST".to_string()))
        );
    }

    #[test]
    fn test_build_requires_table() {
        let query = QueryBuilder::new(DatabaseBackend::Postgres);
        assert!(matches!(
            query.build(),
            Err(QueryError::MissingClause { .. })
        ));
    }

    #[test]
    fn test_build_full_select() {
        let query = QueryBuilder::new(DatabaseBackend::Postgres)
            .from("articles")
            .select(vec!["id", "title"])
            .where_eq("published", true)
            .where_expr(Condition::with_params("views > ?", vec![100i64.into()]))
            .group_by("author_id")
            .order_by("created_at", OrderDirection::Desc)
            .limit(10)
            .offset(20);

        let (sql, params) = query.build().unwrap();

        assert_eq!(
            sql,
            "SELECT id, title FROM \"articles\" WHERE \"published\" = $1 AND (views > $2) \
             GROUP BY \"author_id\" ORDER BY \"created_at\" DESC LIMIT 10 OFFSET 20"
        );
        assert_eq!(params, vec![SqlValue::Bool(true), SqlValue::BigInt(100)]);
    }

    #[test]
    fn test_set_where_replaces_previous_clause() {
        let mut query = QueryBuilder::new(DatabaseBackend::SQLite)
            .from("users")
            .where_eq("active", true);

        query.set_where(Condition::new("deleted_at IS NULL"));

        let (sql, params) = query.build().unwrap();
        assert_eq!(sql, "SELECT * FROM \"users\" WHERE deleted_at IS NULL");
        assert!(params.is_empty());
    }

    #[test]
    fn test_order_without_direction() {
        let mut query = QueryBuilder::new(DatabaseBackend::MySQL).from("users");
        query.add_order_by("name", None);

        let (sql, _) = query.build().unwrap();
        assert_eq!(sql, "SELECT * FROM `users` ORDER BY `name`");
    }

    #[test]
    fn test_expression_terms_render_unchanged() {
        let mut query = QueryBuilder::new(DatabaseBackend::MySQL).from("orders");
        query.add_group_by("DATE(created_at)");
        query.add_order_by("`o_key`", Some(OrderDirection::Desc));
        query.add_order_by("FIELD(id, 3, 1)", None);
        query.add_order_by("total", Some(OrderDirection::Raw("DESC NULLS LAST".to_string())));

        let (sql, _) = query.build().unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM `orders` GROUP BY DATE(created_at) \
             ORDER BY `o_key` DESC, FIELD(id, 3, 1), `total` DESC NULLS LAST"
        );
    }

    #[test]
    fn test_reset_for_count() {
        let mut query = QueryBuilder::new(DatabaseBackend::Postgres)
            .from("users")
            .order_by("name", OrderDirection::Asc)
            .limit(10)
            .offset(5);

        query.reset_for_count();

        assert_eq!(query.select_columns(), ["COUNT(*)".to_string()]);
        assert!(query.order_by_clauses().is_empty());
        assert_eq!(query.max_results(), None);
        assert_eq!(query.first_result(), 0);
    }

    #[test]
    fn test_clone_is_equal() {
        let query = QueryBuilder::new(DatabaseBackend::MariaDB)
            .from("users")
            .where_null("deleted_at");
        assert_eq!(query.clone(), query);
    }
}
