//! Legacy-compatible query builder
//!
//! Kept for listings that still build their SELECT through the older
//! part-based API: columns are given as one list when the query is created,
//! WHERE conditions always AND together, ORDER entries are `"column DIR"`
//! specs and LIMIT is set as a `(count, offset)` pair. Any part can be
//! cleared with [`LegacyQuery::reset`].

use super::condition::Condition;
use super::core::OrderDirection;
use super::dialects::{create_dialect, DatabaseBackend, QueryError, SqlDialect};
use super::{ListingQuery, QueryBuilderKind};
use crate::value::SqlValue;
use std::any::Any;
use std::fmt;

/// Query parts understood by [`LegacyQuery::reset`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LegacyPart {
    Columns,
    Where,
    Group,
    Order,
    LimitCount,
    LimitOffset,
}

/// A selected column, either a plain identifier or a raw SQL expression
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LegacyColumn {
    Column(String),
    Expression(String),
}

impl LegacyColumn {
    pub fn expression<S: Into<String>>(sql: S) -> Self {
        LegacyColumn::Expression(sql.into())
    }
}

// Strings with parentheses are taken as expressions, everything else is an identifier
impl From<&str> for LegacyColumn {
    fn from(value: &str) -> Self {
        if value.contains('(') {
            LegacyColumn::Expression(value.to_string())
        } else {
            LegacyColumn::Column(value.to_string())
        }
    }
}

impl From<String> for LegacyColumn {
    fn from(value: String) -> Self {
        LegacyColumn::from(value.as_str())
    }
}

/// Part-based SELECT builder for the legacy-compatible backend
pub struct LegacyQuery {
    dialect: Box<dyn SqlDialect>,
    backend: DatabaseBackend,
    from: Option<String>,
    columns: Vec<LegacyColumn>,
    where_parts: Vec<Condition>,
    group: Vec<String>,
    order: Vec<(String, Option<OrderDirection>)>,
    limit_count: Option<u64>,
    limit_offset: u64,
}

impl LegacyQuery {
    pub fn new(backend: DatabaseBackend) -> Self {
        LegacyQuery {
            dialect: create_dialect(backend),
            backend,
            from: None,
            columns: Vec::new(),
            where_parts: Vec::new(),
            group: Vec::new(),
            order: Vec::new(),
            limit_count: None,
            limit_offset: 0,
        }
    }

    /// Set the table and the columns selected from it
    pub fn from<S, I, C>(mut self, table: S, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<LegacyColumn>,
    {
        self.from = Some(table.into());
        self.columns(columns);
        self
    }

    /// Replace the selected columns
    pub fn columns<I, C>(&mut self, columns: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<LegacyColumn>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
    }

    /// AND a condition onto the WHERE part
    pub fn where_<C: Into<Condition>>(&mut self, condition: C) {
        self.where_parts.push(condition.into());
    }

    pub fn group<S: Into<String>>(&mut self, column: S) {
        self.group.push(column.into());
    }

    /// Add an ORDER entry from a spec like `"name DESC"` or `"name"`
    ///
    /// Only a trailing `ASC`/`DESC` is split off; anything else stays part of
    /// the term.
    pub fn order(&mut self, spec: &str) {
        let spec = spec.trim();
        if spec.is_empty() {
            return;
        }
        if let Some((column, token)) = spec.rsplit_once(char::is_whitespace) {
            if let Some(direction @ (OrderDirection::Asc | OrderDirection::Desc)) =
                OrderDirection::from_token(token)
            {
                self.order_by(column.trim(), Some(direction));
                return;
            }
        }
        self.order_by(spec, None);
    }

    pub fn order_by<S: Into<String>>(&mut self, column: S, direction: Option<OrderDirection>) {
        self.order.push((column.into(), direction));
    }

    /// Set LIMIT count and offset together; a `None` count means no limit
    pub fn limit(&mut self, count: Option<u64>, offset: u64) {
        self.limit_count = count;
        self.limit_offset = offset;
    }

    /// Clear one part back to its initial state
    pub fn reset(&mut self, part: LegacyPart) {
        match part {
            LegacyPart::Columns => self.columns.clear(),
            LegacyPart::Where => self.where_parts.clear(),
            LegacyPart::Group => self.group.clear(),
            LegacyPart::Order => self.order.clear(),
            LegacyPart::LimitCount => self.limit_count = None,
            LegacyPart::LimitOffset => self.limit_offset = 0,
        }
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn table(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn columns_part(&self) -> &[LegacyColumn] {
        &self.columns
    }

    pub fn where_part(&self) -> &[Condition] {
        &self.where_parts
    }

    pub fn group_part(&self) -> &[String] {
        &self.group
    }

    pub fn order_part(&self) -> &[(String, Option<OrderDirection>)] {
        &self.order
    }

    pub fn limit_count(&self) -> Option<u64> {
        self.limit_count
    }

    pub fn limit_offset(&self) -> u64 {
        self.limit_offset
    }

    /// Render the SELECT statement
    pub fn assemble(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        let table = self.from.as_ref().ok_or_else(|| QueryError::MissingClause {
            clause: "from".to_string(),
        })?;

        let mut sql = String::from("SELECT ");
        let mut params = Vec::new();

        if self.columns.is_empty() {
            sql.push('*');
        } else {
            let columns: Vec<String> = self
                .columns
                .iter()
                .map(|column| match column {
                    LegacyColumn::Column(name) => self.dialect.quote_identifier(name),
                    LegacyColumn::Expression(expr) => expr.clone(),
                })
                .collect();
            sql.push_str(&columns.join(", "));
        }

        sql.push_str(" FROM ");
        sql.push_str(&self.dialect.quote_identifier(table));

        if !self.where_parts.is_empty() {
            let mut param_count = 1;
            let mut clauses = Vec::with_capacity(self.where_parts.len());
            for condition in &self.where_parts {
                let (clause, values, next) = condition.render(self.dialect.as_ref(), param_count);
                clauses.push(format!("({})", clause));
                params.extend(values);
                param_count = next;
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        if !self.group.is_empty() {
            let group: Vec<String> = self
                .group
                .iter()
                .map(|col| self.dialect.quote_identifier(col))
                .collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&group.join(", "));
        }

        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(column, direction)| {
                    let column = self.dialect.quote_identifier(column);
                    match direction {
                        Some(direction) => format!("{} {}", column, direction),
                        None => column,
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        sql.push_str(
            &self
                .dialect
                .limit_syntax(self.limit_count, self.limit_offset),
        );

        Ok((sql, params))
    }
}

impl ListingQuery for LegacyQuery {
    fn kind(&self) -> QueryBuilderKind {
        QueryBuilderKind::LegacyCompatible
    }

    fn where_condition(&mut self, condition: &Condition) {
        self.where_(condition.clone());
    }

    fn add_group_by(&mut self, column: &str) {
        self.group(column);
    }

    fn add_order_by(&mut self, column: &str, direction: Option<OrderDirection>) {
        self.order_by(column, direction);
    }

    fn set_first_result(&mut self, offset: u64) {
        self.limit_offset = offset;
    }

    fn set_max_results(&mut self, limit: Option<u64>) {
        self.limit_count = limit;
    }

    fn reset_for_count(&mut self) {
        self.columns([LegacyColumn::expression("COUNT(*)")]);
        self.reset(LegacyPart::LimitCount);
        self.reset(LegacyPart::LimitOffset);
        self.reset(LegacyPart::Order);
    }

    fn to_sql(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        self.assemble()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Clone for LegacyQuery {
    fn clone(&self) -> Self {
        LegacyQuery {
            dialect: create_dialect(self.backend),
            backend: self.backend,
            from: self.from.clone(),
            columns: self.columns.clone(),
            where_parts: self.where_parts.clone(),
            group: self.group.clone(),
            order: self.order.clone(),
            limit_count: self.limit_count,
            limit_offset: self.limit_offset,
        }
    }
}

impl PartialEq for LegacyQuery {
    fn eq(&self, other: &Self) -> bool {
        self.backend == other.backend
            && self.from == other.from
            && self.columns == other.columns
            && self.where_parts == other.where_parts
            && self.group == other.group
            && self.order == other.order
            && self.limit_count == other.limit_count
            && self.limit_offset == other.limit_offset
    }
}

impl fmt::Debug for LegacyQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyQuery")
            .field("backend", &self.backend)
            .field("from", &self.from)
            .field("columns", &self.columns)
            .field("where", &self.where_parts)
            .field("group", &self.group)
            .field("order", &self.order)
            .field("limit_count", &self.limit_count)
            .field("limit_offset", &self.limit_offset)
            .finish()
    }
}
