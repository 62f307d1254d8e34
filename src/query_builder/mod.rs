//! Query builder backends for listings
//!
//! Two interchangeable backends exist: the Primary [`QueryBuilder`] and the
//! [`LegacyQuery`] kept for listings that have not migrated yet. Both expose
//! the same [`ListingQuery`] capability set, which is all the listing code
//! ever talks to.

pub mod condition;
pub mod core;
pub mod dialects;
pub mod legacy;

pub use self::core::{OrderByClause, OrderDirection, QueryBuilder, QueryPart, WhereCondition};
pub use condition::Condition;
pub use dialects::{create_dialect, DatabaseBackend, QueryError, SqlDialect};
pub use legacy::{LegacyColumn, LegacyPart, LegacyQuery};

use crate::value::SqlValue;
use std::any::Any;

/// Which backend a query object belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryBuilderKind {
    Primary,
    LegacyCompatible,
}

/// Capabilities a query object offers to listings
///
/// Implemented by both backends. A listing applies its parameters through the
/// first five methods and turns any query into a row count through
/// [`ListingQuery::reset_for_count`].
pub trait ListingQuery {
    fn kind(&self) -> QueryBuilderKind;

    /// Set `condition` as the WHERE clause, following the backend's own semantics
    fn where_condition(&mut self, condition: &Condition);

    /// Append an extra GROUP BY term
    fn add_group_by(&mut self, column: &str);

    /// Append an ORDER BY term; `None` leaves the direction to the database
    fn add_order_by(&mut self, column: &str, direction: Option<OrderDirection>);

    fn set_first_result(&mut self, offset: u64);

    /// `None` means unbounded
    fn set_max_results(&mut self, limit: Option<u64>);

    /// Select `COUNT(*)` and drop ordering, limit and offset
    fn reset_for_count(&mut self);

    fn to_sql(&self) -> Result<(String, Vec<SqlValue>), QueryError>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl dyn ListingQuery + '_ {
    /// Downcast to a concrete backend, e.g. inside a query builder hook
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

/// A query object from either backend
#[derive(Debug, Clone, PartialEq)]
pub enum AnyQueryBuilder {
    Primary(QueryBuilder),
    Legacy(LegacyQuery),
}

impl AnyQueryBuilder {
    pub fn kind(&self) -> QueryBuilderKind {
        self.as_listing_query().kind()
    }

    pub fn as_listing_query(&self) -> &dyn ListingQuery {
        match self {
            AnyQueryBuilder::Primary(query) => query,
            AnyQueryBuilder::Legacy(query) => query,
        }
    }

    pub fn as_listing_query_mut(&mut self) -> &mut dyn ListingQuery {
        match self {
            AnyQueryBuilder::Primary(query) => query,
            AnyQueryBuilder::Legacy(query) => query,
        }
    }

    pub fn as_primary(&self) -> Option<&QueryBuilder> {
        match self {
            AnyQueryBuilder::Primary(query) => Some(query),
            AnyQueryBuilder::Legacy(_) => None,
        }
    }

    pub fn as_legacy(&self) -> Option<&LegacyQuery> {
        match self {
            AnyQueryBuilder::Legacy(query) => Some(query),
            AnyQueryBuilder::Primary(_) => None,
        }
    }

    pub fn to_sql(&self) -> Result<(String, Vec<SqlValue>), QueryError> {
        self.as_listing_query().to_sql()
    }
}

impl From<QueryBuilder> for AnyQueryBuilder {
    fn from(query: QueryBuilder) -> Self {
        AnyQueryBuilder::Primary(query)
    }
}

impl From<LegacyQuery> for AnyQueryBuilder {
    fn from(query: LegacyQuery) -> Self {
        AnyQueryBuilder::Legacy(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downcast_through_trait_object() {
        let mut query = AnyQueryBuilder::from(QueryBuilder::new(DatabaseBackend::Postgres));
        let listing_query = query.as_listing_query_mut();

        assert!(listing_query.downcast_ref::<LegacyQuery>().is_none());
        let primary = listing_query
            .downcast_mut::<QueryBuilder>()
            .expect("primary backend");
        primary.add_group_by("author_id");

        assert_eq!(
            query.as_primary().map(|q| q.group_by_columns().len()),
            Some(1)
        );
    }

    #[test]
    fn test_kind_follows_variant() {
        let query = AnyQueryBuilder::from(LegacyQuery::new(DatabaseBackend::SQLite));
        assert_eq!(query.kind(), QueryBuilderKind::LegacyCompatible);
        assert!(query.as_legacy().is_some());
    }
}
