//! Open, string-keyed property bags with typed accessors.
//!
//! The catalog attaches free-form `properties` objects to every event and to
//! every product submission. [`PropertyMap`] keeps the parsed JSON values in
//! document order and turns a missing key into an explicit
//! [`PropertyError::Missing`] rather than a silent `None`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors raised by property lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PropertyError {
    /// The key is not present in the bag.
    #[error("no property {key} found")]
    Missing {
        /// The requested key.
        key: String,
    },

    /// The key is present but its value cannot be read as the requested type.
    #[error("property {key} is not a valid {expected}")]
    InvalidType {
        /// The requested key.
        key: String,
        /// Name of the type the caller asked for.
        expected: &'static str,
    },
}

/// A string-keyed bag of JSON values.
///
/// Most catalog product properties are serialised as strings even when they
/// hold numbers (`"maxmmi": "6.4"`), so the numeric accessors accept both
/// JSON numbers and numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyMap(Map<String, Value>);

impl PropertyMap {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Raw value for `key`.
    pub fn get(&self, key: &str) -> Result<&Value, PropertyError> {
        self.0.get(key).ok_or_else(|| PropertyError::Missing {
            key: key.to_owned(),
        })
    }

    /// Value for `key` as a string slice.
    pub fn get_str(&self, key: &str) -> Result<&str, PropertyError> {
        self.get(key)?
            .as_str()
            .ok_or_else(|| invalid_type(key, "string"))
    }

    /// Value for `key` as a finite floating point number.
    pub fn get_f64(&self, key: &str) -> Result<f64, PropertyError> {
        let parsed = match self.get(key)? {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|value| value.is_finite())
            .ok_or_else(|| invalid_type(key, "number"))
    }

    /// Value for `key` as a number, treating an absent key or `null` as
    /// `None`. Any other non-numeric value is still an error.
    pub fn get_optional_f64(&self, key: &str) -> Result<Option<f64>, PropertyError> {
        match self.0.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.get_f64(key).map(Some),
        }
    }

    /// Value for `key` as a signed integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, PropertyError> {
        let parsed = match self.get(key)? {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.ok_or_else(|| invalid_type(key, "integer"))
    }

    /// Keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Key/value pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bag holds no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or replace a property, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Remove a property, returning its value. Remaining keys keep their
    /// document order.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }
}

impl From<Map<String, Value>> for PropertyMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for PropertyMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

fn invalid_type(key: &str, expected: &'static str) -> PropertyError {
    PropertyError::InvalidType {
        key: key.to_owned(),
        expected,
    }
}
