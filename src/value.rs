//! SQL values bound to listing conditions
//!
//! Condition parameters travel with the condition through both query builder
//! backends and come back out of `to_sql()` in placeholder order.

use serde::{Deserialize, Serialize};

/// Generic SQL value type for parameter binding
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i32),
    BigInt(i64),
    UnsignedBigInt(u64),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<i32> for SqlValue {
    fn from(value: i32) -> Self {
        SqlValue::Int(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::BigInt(value)
    }
}

impl From<u64> for SqlValue {
    fn from(value: u64) -> Self {
        SqlValue::UnsignedBigInt(value)
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        SqlValue::Double(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::String(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::String(value)
    }
}

impl From<&String> for SqlValue {
    fn from(value: &String) -> Self {
        SqlValue::String(value.clone())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(value: Vec<u8>) -> Self {
        SqlValue::Bytes(value)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_maps_to_null() {
        let value: SqlValue = None::<i32>.into();
        assert_eq!(value, SqlValue::Null);

        let value: SqlValue = Some(7i64).into();
        assert_eq!(value, SqlValue::BigInt(7));
    }

    #[test]
    fn test_string_conversions() {
        let owned = String::from("O'Brien");
        assert_eq!(SqlValue::from(&owned), SqlValue::String("O'Brien".to_string()));
        assert_eq!(SqlValue::from("x"), SqlValue::String("x".to_string()));
    }
}
