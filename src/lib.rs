//! listing-query - listing parameters for interchangeable query builders
//!
//! A listing (filter, grouping, ordering, page bounds) is described once and
//! applied to whichever query builder backend is configured:
//! - [`ListingDao::apply_listing_parameters_to_query_builder`] copies the
//!   listing onto a query and runs the optional post-composition hook
//! - [`ListingDao::get_query_builder_compatibility`] picks the Primary or the
//!   legacy-compatible backend
//! - [`prepare_query_builder_for_total_count`] rewrites a query into its
//!   `COUNT(*)` variant

// Enforce error handling best practices
#![cfg_attr(
    not(test),
    warn(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
    )
)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used,))]

pub mod config;
pub mod error;
pub mod listing;
pub mod query_builder;
pub mod value;

pub use config::{DatabaseConfig, ListingConfig, QueryBuilderConfig};
pub use error::{Error, Result};
pub use listing::{
    order_terms, prepare_query_builder_for_total_count, ListingDao, ListingModel,
    ListingSpecification, OrderKey, QueryBuilderHook,
};
pub use query_builder::{
    AnyQueryBuilder, Condition, DatabaseBackend, LegacyColumn, LegacyPart, LegacyQuery,
    ListingQuery, OrderDirection, QueryBuilder, QueryBuilderKind, QueryError, QueryPart,
};
pub use value::SqlValue;

/// Prelude module for common imports
pub mod prelude {
    pub use crate::{
        AnyQueryBuilder, Condition, DatabaseBackend, ListingConfig, ListingDao, ListingModel,
        ListingQuery, ListingSpecification, OrderDirection, OrderKey, QueryBuilder,
        QueryBuilderKind, SqlValue,
    };
}
