//! Applying listing parameters to query builders
//!
//! [`ListingDao`] is the data-access side of a listing. It picks the query
//! builder backend, copies the listing's condition, grouping, ordering and
//! page bounds onto a query, hands the result to an optional hook, and can
//! turn any query into its total-count variant.
//!
//! # Example
//! ```
//! use listing_query::{ListingDao, ListingSpecification};
//!
//! let spec = ListingSpecification::new()
//!     .with_condition("published = 1")
//!     .with_order_key(["created_at", "id"])
//!     .with_order(["desc"])
//!     .with_limit(20);
//!
//! let dao = ListingDao::new(spec, "articles");
//! let query = dao.load_query().unwrap();
//! let (sql, _params) = query.to_sql().unwrap();
//!
//! assert_eq!(
//!     sql,
//!     "SELECT * FROM \"articles\" WHERE published = 1 ORDER BY \"created_at\" DESC, \"id\" DESC LIMIT 20"
//! );
//! ```

use super::{ListingModel, OrderKey};
use crate::config::{ListingConfig, QueryBuilderConfig};
use crate::error::Result;
use crate::query_builder::{
    AnyQueryBuilder, DatabaseBackend, LegacyColumn, LegacyQuery, ListingQuery, OrderDirection,
    QueryBuilder,
};
use std::fmt;

/// Callback run after listing parameters have been applied to a query
///
/// Errors it returns reach the caller of
/// [`ListingDao::apply_listing_parameters_to_query_builder`] unchanged.
pub type QueryBuilderHook = Box<dyn Fn(&mut dyn ListingQuery) -> Result<()> + Send + Sync>;

/// Data-access helper for one listing
pub struct ListingDao<M: ListingModel> {
    model: M,
    table: String,
    backend: DatabaseBackend,
    config: QueryBuilderConfig,
    on_create_query_builder: Option<QueryBuilderHook>,
}

impl<M: ListingModel> ListingDao<M> {
    /// Create a helper for `table` with the default backend and settings
    pub fn new<S: Into<String>>(model: M, table: S) -> Self {
        Self {
            model,
            table: table.into(),
            backend: DatabaseBackend::default(),
            config: QueryBuilderConfig::default(),
            on_create_query_builder: None,
        }
    }

    /// Create a helper using the backend and query builder settings from `config`
    pub fn from_config<S: Into<String>>(model: M, table: S, config: &ListingConfig) -> Self {
        Self {
            model,
            table: table.into(),
            backend: config.database.backend,
            config: config.query_builder.clone(),
            on_create_query_builder: None,
        }
    }

    pub fn with_backend(mut self, backend: DatabaseBackend) -> Self {
        self.backend = backend;
        self
    }

    /// Route [`ListingDao::get_query_builder_compatibility`] to the legacy backend
    pub fn with_legacy_compatibility(mut self, enabled: bool) -> Self {
        self.config.legacy_compatibility = enabled;
        self
    }

    /// Install the post-composition hook up front
    pub fn with_query_builder_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut dyn ListingQuery) -> Result<()> + Send + Sync + 'static,
    {
        self.on_create_query_builder = Some(Box::new(hook));
        self
    }

    /// Install or clear (`None`) the post-composition hook
    ///
    /// Only the most recently installed hook is kept.
    pub fn on_create_query_builder(&mut self, hook: Option<QueryBuilderHook>) {
        self.on_create_query_builder = hook;
    }

    pub fn has_query_builder_hook(&self) -> bool {
        self.on_create_query_builder.is_some()
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    pub fn is_legacy_compatible(&self) -> bool {
        self.config.legacy_compatibility
    }

    /// Apply condition, grouping, ordering and page bounds, then run the hook
    pub fn apply_listing_parameters_to_query_builder(
        &self,
        query: &mut dyn ListingQuery,
    ) -> Result<()> {
        log::debug!(
            "Applying listing parameters for '{}' to {:?} query",
            self.table,
            query.kind()
        );

        self.apply_condition(query);
        self.apply_group_by(query);
        self.apply_order_by(query);
        self.apply_limit(query);

        if let Some(hook) = &self.on_create_query_builder {
            hook(query)?;
        }

        Ok(())
    }

    fn apply_condition(&self, query: &mut dyn ListingQuery) {
        if let Some(condition) = self.model.condition() {
            if !condition.is_empty() {
                query.where_condition(condition);
            }
        }
    }

    fn apply_group_by(&self, query: &mut dyn ListingQuery) {
        if let Some(group_by) = self.model.group_by() {
            if !group_by.is_empty() {
                query.add_group_by(group_by);
            }
        }
    }

    fn apply_order_by(&self, query: &mut dyn ListingQuery) {
        for (column, direction) in order_terms(self.model.order_key(), self.model.order()) {
            log::trace!("ORDER BY {} {:?}", column, direction);
            query.add_order_by(&column, direction);
        }
    }

    fn apply_limit(&self, query: &mut dyn ListingQuery) {
        query.set_first_result(self.model.offset());
        query.set_max_results(self.model.limit());
    }

    /// Primary query selecting `columns` from the listing's table
    pub fn get_query_builder(&self, columns: &[&str]) -> QueryBuilder {
        QueryBuilder::new(self.backend)
            .select(self.resolve_columns(columns))
            .from(self.table.as_str())
    }

    /// Legacy-compatible query selecting `columns` from the listing's table
    pub fn get_query(&self, columns: &[&str]) -> LegacyQuery {
        let columns: Vec<LegacyColumn> = self
            .resolve_columns(columns)
            .into_iter()
            .map(LegacyColumn::from)
            .collect();
        LegacyQuery::new(self.backend).from(self.table.as_str(), columns)
    }

    /// Query object of the configured backend selecting `columns`
    ///
    /// An empty `columns` slice selects the configured default columns.
    pub fn get_query_builder_compatibility(&self, columns: &[&str]) -> AnyQueryBuilder {
        if self.config.legacy_compatibility {
            AnyQueryBuilder::Legacy(self.get_query(columns))
        } else {
            AnyQueryBuilder::Primary(self.get_query_builder(columns))
        }
    }

    /// Turn `query` into a row count; see [`prepare_query_builder_for_total_count`]
    pub fn prepare_query_builder_for_total_count(&self, query: &mut dyn ListingQuery) {
        prepare_query_builder_for_total_count(query);
    }

    /// Query for one page of the listing
    pub fn load_query(&self) -> Result<AnyQueryBuilder> {
        let mut query = self.get_query_builder_compatibility(&[]);
        self.apply_listing_parameters_to_query_builder(query.as_listing_query_mut())?;
        Ok(query)
    }

    /// Query counting every row the listing matches, ignoring page bounds
    pub fn total_count_query(&self) -> Result<AnyQueryBuilder> {
        let mut query = self.load_query()?;
        self.prepare_query_builder_for_total_count(query.as_listing_query_mut());
        Ok(query)
    }

    fn resolve_columns(&self, columns: &[&str]) -> Vec<String> {
        if columns.is_empty() {
            self.config.default_columns.clone()
        } else {
            columns.iter().map(|c| c.to_string()).collect()
        }
    }
}

impl<M: ListingModel + fmt::Debug> fmt::Debug for ListingDao<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListingDao")
            .field("model", &self.model)
            .field("table", &self.table)
            .field("backend", &self.backend)
            .field("config", &self.config)
            .field("has_hook", &self.on_create_query_builder.is_some())
            .finish()
    }
}

/// Rewrite `query` in place into a total-row-count query
///
/// Selects `COUNT(*)`, drops ORDER BY, removes the limit and resets the
/// offset to zero, using whatever primitives the backend offers for that.
pub fn prepare_query_builder_for_total_count(query: &mut dyn ListingQuery) {
    log::debug!("Preparing {:?} query for total count", query.kind());
    query.reset_for_count();
}

/// Pair ordering keys with directions
///
/// Only a sequence of keys is ordered. Each key takes the direction at its
/// position when that entry is present and non-empty, otherwise the last
/// non-empty direction seen so far (starting from the first entry). Keys
/// with no direction at all get `None`. Tokens other than `asc`/`desc` are
/// passed through as [`OrderDirection::Raw`].
///
/// # Example
/// ```
/// use listing_query::{order_terms, OrderDirection, OrderKey};
///
/// let keys = OrderKey::from(["a", "b", "c"]);
/// let order = vec!["asc".to_string(), String::new(), "desc".to_string()];
/// let terms = order_terms(&keys, &order);
///
/// assert_eq!(terms[1], ("b".to_string(), Some(OrderDirection::Asc)));
/// assert_eq!(terms[2], ("c".to_string(), Some(OrderDirection::Desc)));
/// ```
pub fn order_terms(order_key: &OrderKey, order: &[String]) -> Vec<(String, Option<OrderDirection>)> {
    if order_key.is_empty() && order.is_empty() {
        return Vec::new();
    }

    let keys = match order_key {
        OrderKey::Many(keys) => keys,
        OrderKey::Single(_) => return Vec::new(),
    };

    let directions: Vec<Option<OrderDirection>> =
        order.iter().map(|t| OrderDirection::from_token(t)).collect();
    let mut current = directions.first().cloned().flatten();

    keys.iter()
        .enumerate()
        .map(|(i, key)| {
            if let Some(direction) = directions.get(i).cloned().flatten() {
                current = Some(direction);
            }
            (key.clone(), current.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(keys: &[&str], order: &[&str]) -> Vec<(String, Option<OrderDirection>)> {
        let order: Vec<String> = order.iter().map(|s| s.to_string()).collect();
        order_terms(&OrderKey::from(keys.to_vec()), &order)
    }

    fn term(key: &str, direction: Option<OrderDirection>) -> (String, Option<OrderDirection>) {
        (key.to_string(), direction)
    }

    #[test]
    fn test_single_direction_carries_forward() {
        assert_eq!(
            terms(&["k0", "k1", "k2"], &["asc"]),
            vec![
                term("k0", Some(OrderDirection::Asc)),
                term("k1", Some(OrderDirection::Asc)),
                term("k2", Some(OrderDirection::Asc)),
            ]
        );
    }

    #[test]
    fn test_last_seen_direction_is_reused() {
        assert_eq!(
            terms(&["k0", "k1", "k2"], &["asc", "desc"]),
            vec![
                term("k0", Some(OrderDirection::Asc)),
                term("k1", Some(OrderDirection::Desc)),
                term("k2", Some(OrderDirection::Desc)),
            ]
        );
    }

    #[test]
    fn test_empty_direction_keeps_previous() {
        assert_eq!(
            terms(&["k0", "k1", "k2"], &["asc", "", "desc"]),
            vec![
                term("k0", Some(OrderDirection::Asc)),
                term("k1", Some(OrderDirection::Asc)),
                term("k2", Some(OrderDirection::Desc)),
            ]
        );
    }

    #[test]
    fn test_keys_without_directions() {
        assert_eq!(
            terms(&["k0", "k1"], &[]),
            vec![term("k0", None), term("k1", None)]
        );
    }

    #[test]
    fn test_leading_empty_direction() {
        assert_eq!(
            terms(&["k0", "k1"], &["", "desc"]),
            vec![term("k0", None), term("k1", Some(OrderDirection::Desc))]
        );
    }

    #[test]
    fn test_free_form_token_becomes_current_direction() {
        let nulls_last = Some(OrderDirection::Raw("ASC NULLS LAST".to_string()));
        assert_eq!(
            terms(&["k0", "k1", "k2"], &["desc", "ASC NULLS LAST"]),
            vec![
                term("k0", Some(OrderDirection::Desc)),
                term("k1", nulls_last.clone()),
                term("k2", nulls_last),
            ]
        );
    }

    #[test]
    fn test_leading_free_form_token_seeds_direction() {
        let token = Some(OrderDirection::Raw("DESC NULLS FIRST".to_string()));
        assert_eq!(
            terms(&["k0", "k1"], &["DESC NULLS FIRST"]),
            vec![term("k0", token.clone()), term("k1", token)]
        );
    }

    #[test]
    fn test_whitespace_token_counts_as_empty() {
        assert_eq!(
            terms(&["k0", "k1"], &["asc", "  "]),
            vec![
                term("k0", Some(OrderDirection::Asc)),
                term("k1", Some(OrderDirection::Asc)),
            ]
        );
    }

    #[test]
    fn test_single_key_is_never_ordered() {
        let order = vec!["desc".to_string()];
        assert!(order_terms(&OrderKey::from("k0"), &order).is_empty());
    }

    #[test]
    fn test_nothing_to_order() {
        assert!(terms(&[], &[]).is_empty());
        assert!(terms(&[], &["asc"]).is_empty());
    }
}
