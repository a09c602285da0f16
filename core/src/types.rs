//! Request options and the decoded response type.
//!
//! # Design
//! Endpoint options are free-form on the wire, so they are modelled as an
//! ordered list of `(name, OptionValue)` pairs rather than one struct per
//! endpoint. `OptionValue` restricts values to what the query string can
//! carry: strings, numbers, booleans and ordered string sequences.
//! Insertion order is kept because it decides the order of the query string.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Decoded response body: string keys to arbitrary JSON, in body order.
pub type ApiResponse = Map<String, Value>;

/// A single query option value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl fmt::Display for OptionValue {
    /// Query-string rendering. Sequences are comma-joined without escaping.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(n) => write!(f, "{n}"),
            OptionValue::UInt(n) => write!(f, "{n}"),
            OptionValue::Float(n) => write!(f, "{n}"),
            OptionValue::Str(s) => f.write_str(s),
            OptionValue::List(items) => f.write_str(&items.join(",")),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl From<&String> for OptionValue {
    fn from(value: &String) -> Self {
        OptionValue::Str(value.clone())
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        OptionValue::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<u32> for OptionValue {
    fn from(value: u32) -> Self {
        OptionValue::Int(value.into())
    }
}

impl From<u64> for OptionValue {
    fn from(value: u64) -> Self {
        OptionValue::UInt(value)
    }
}

impl From<usize> for OptionValue {
    fn from(value: usize) -> Self {
        OptionValue::UInt(value as u64)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        OptionValue::Float(value)
    }
}

impl From<Vec<String>> for OptionValue {
    fn from(value: Vec<String>) -> Self {
        OptionValue::List(value)
    }
}

impl From<Vec<&str>> for OptionValue {
    fn from(value: Vec<&str>) -> Self {
        value.as_slice().into()
    }
}

impl From<&[&str]> for OptionValue {
    fn from(value: &[&str]) -> Self {
        OptionValue::List(value.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OptionValue {
    fn from(value: [&str; N]) -> Self {
        value.as_slice().into()
    }
}

impl<const N: usize> From<&[&str; N]> for OptionValue {
    fn from(value: &[&str; N]) -> Self {
        value.as_slice().into()
    }
}

impl TryFrom<Value> for OptionValue {
    type Error = ApiError;

    /// Scalars map to their variant, `null` to an empty string. Arrays must
    /// hold scalars only; their elements are rendered to strings.
    fn try_from(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Array(_) | Value::Object(_) => Err(ApiError::InvalidOptionsType),
                    scalar => Ok(scalar_to_option(scalar)?.to_string()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OptionValue::List),
            Value::Object(_) => Err(ApiError::InvalidOptionsType),
            scalar => scalar_to_option(scalar),
        }
    }
}

fn scalar_to_option(value: Value) -> Result<OptionValue, ApiError> {
    match value {
        Value::Null => Ok(OptionValue::Str(String::new())),
        Value::Bool(b) => Ok(OptionValue::Bool(b)),
        Value::String(s) => Ok(OptionValue::Str(s)),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(OptionValue::Int(i))
            } else if let Some(u) = n.as_u64() {
                Ok(OptionValue::UInt(u))
            } else {
                n.as_f64().map(OptionValue::Float).ok_or(ApiError::InvalidOptionsType)
            }
        }
        Value::Array(_) | Value::Object(_) => Err(ApiError::InvalidOptionsType),
    }
}

/// Ordered mapping of option name to value.
///
/// Setting a key that is already present replaces its value in place, so the
/// key keeps its original position in the query string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    entries: Vec<(String, OptionValue)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of `insert`.
    pub fn with(mut self, key: &str, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Set `key`, returning the previous value if there was one.
    pub fn insert(&mut self, key: &str, value: impl Into<OptionValue>) -> Option<OptionValue> {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key.to_string(), value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// `self` followed by every entry of `extra` whose key is not already set.
    pub(crate) fn merged(mut self, extra: RequestOptions) -> Self {
        for (key, value) in extra.entries {
            if !self.contains_key(&key) {
                self.entries.push((key, value));
            }
        }
        self
    }
}

impl<K: AsRef<str>, V: Into<OptionValue>> FromIterator<(K, V)> for RequestOptions {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = RequestOptions::new();
        for (key, value) in iter {
            options.insert(key.as_ref(), value);
        }
        options
    }
}

impl TryFrom<Value> for RequestOptions {
    type Error = ApiError;

    /// A JSON object converts in key order and `null` is empty; anything else
    /// is not a mapping.
    fn try_from(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Null => Ok(RequestOptions::new()),
            Value::Object(map) => {
                let mut options = RequestOptions::new();
                for (key, value) in map {
                    options.insert(&key, OptionValue::try_from(value)?);
                }
                Ok(options)
            }
            _ => Err(ApiError::InvalidOptionsType),
        }
    }
}
