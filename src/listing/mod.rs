//! Listing specifications
//!
//! A listing describes the shape of one list query: an optional filter, an
//! optional grouping key, ordering keys with their directions and the page
//! bounds. [`ListingModel`] is the read-only view the applicator consumes;
//! [`ListingSpecification`] is the plain in-memory implementation.

pub mod applicator;

pub use applicator::{
    order_terms, prepare_query_builder_for_total_count, ListingDao, QueryBuilderHook,
};

use crate::query_builder::Condition;

/// Ordering keys of a listing
///
/// Only [`OrderKey::Many`] produces ORDER BY terms. A lone [`OrderKey::Single`]
/// key is carried along but never applied to a query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderKey {
    Single(String),
    Many(Vec<String>),
}

impl OrderKey {
    pub fn is_empty(&self) -> bool {
        match self {
            OrderKey::Single(key) => key.is_empty(),
            OrderKey::Many(keys) => keys.is_empty(),
        }
    }
}

impl Default for OrderKey {
    fn default() -> Self {
        OrderKey::Many(Vec::new())
    }
}

impl From<&str> for OrderKey {
    fn from(key: &str) -> Self {
        OrderKey::Single(key.to_string())
    }
}

impl From<String> for OrderKey {
    fn from(key: String) -> Self {
        OrderKey::Single(key)
    }
}

impl From<Vec<String>> for OrderKey {
    fn from(keys: Vec<String>) -> Self {
        OrderKey::Many(keys)
    }
}

impl From<Vec<&str>> for OrderKey {
    fn from(keys: Vec<&str>) -> Self {
        OrderKey::Many(keys.into_iter().map(String::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OrderKey {
    fn from(keys: [&str; N]) -> Self {
        OrderKey::Many(keys.iter().map(|k| k.to_string()).collect())
    }
}

/// Read access to the parameters of a listing
pub trait ListingModel {
    fn condition(&self) -> Option<&Condition>;

    fn group_by(&self) -> Option<&str>;

    fn order_key(&self) -> &OrderKey;

    /// Direction tokens aligned with [`ListingModel::order_key`]; may be shorter
    fn order(&self) -> &[String];

    fn offset(&self) -> u64;

    /// `None` means unbounded
    fn limit(&self) -> Option<u64>;
}

/// In-memory listing parameters
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListingSpecification {
    condition: Option<Condition>,
    group_by: Option<String>,
    order_key: OrderKey,
    order: Vec<String>,
    offset: u64,
    limit: Option<u64>,
}

impl ListingSpecification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_condition<C: Into<Condition>>(mut self, condition: C) -> Self {
        self.set_condition(Some(condition.into()));
        self
    }

    pub fn with_group_by<S: Into<String>>(mut self, group_by: S) -> Self {
        self.set_group_by(Some(group_by.into()));
        self
    }

    pub fn with_order_key<K: Into<OrderKey>>(mut self, order_key: K) -> Self {
        self.set_order_key(order_key);
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_order(order);
        self
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_condition(&mut self, condition: Option<Condition>) {
        self.condition = condition;
    }

    pub fn set_group_by(&mut self, group_by: Option<String>) {
        self.group_by = group_by;
    }

    pub fn set_order_key<K: Into<OrderKey>>(&mut self, order_key: K) {
        self.order_key = order_key.into();
    }

    pub fn set_order<I, S>(&mut self, order: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.order = order.into_iter().map(Into::into).collect();
    }

    pub fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub fn set_limit(&mut self, limit: Option<u64>) {
        self.limit = limit;
    }
}

impl ListingModel for ListingSpecification {
    fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    fn group_by(&self) -> Option<&str> {
        self.group_by.as_deref()
    }

    fn order_key(&self) -> &OrderKey {
        &self.order_key
    }

    fn order(&self) -> &[String] {
        &self.order
    }

    fn offset(&self) -> u64 {
        self.offset
    }

    fn limit(&self) -> Option<u64> {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_key_conversions() {
        assert_eq!(OrderKey::from("name"), OrderKey::Single("name".to_string()));
        assert_eq!(
            OrderKey::from(["name", "id"]),
            OrderKey::Many(vec!["name".to_string(), "id".to_string()])
        );
        assert!(OrderKey::default().is_empty());
    }

    #[test]
    fn test_specification_defaults() {
        let spec = ListingSpecification::new();
        assert!(spec.condition().is_none());
        assert!(spec.group_by().is_none());
        assert!(spec.order().is_empty());
        assert_eq!(spec.offset(), 0);
        assert_eq!(spec.limit(), None);
    }

    #[test]
    fn test_setters_replace_values() {
        let mut spec = ListingSpecification::new().with_limit(25).with_group_by("type");
        spec.set_limit(None);
        spec.set_group_by(None);
        spec.set_order(["asc", "desc"]);

        assert_eq!(spec.limit(), None);
        assert!(spec.group_by().is_none());
        assert_eq!(spec.order(), ["asc".to_string(), "desc".to_string()]);
    }
}
