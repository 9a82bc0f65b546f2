//! Three-state field values for partial updates.
//!
//! A JSON body distinguishes between a key that is missing, a key that is
//! `null`, and a key with a value. `Option<T>` collapses the first two, so
//! update requests use [`Patch`] instead:
//!
//! ```rust
//! use serde::Deserialize;
//! use taskdeck_core::Patch;
//!
//! #[derive(Deserialize)]
//! struct Body {
//!     #[serde(default)]
//!     description: Patch<String>,
//! }
//!
//! let absent: Body = serde_json::from_str("{}").unwrap();
//! let cleared: Body = serde_json::from_str(r#"{"description": null}"#).unwrap();
//! let set: Body = serde_json::from_str(r#"{"description": "x"}"#).unwrap();
//!
//! assert!(absent.description.is_absent());
//! assert_eq!(cleared.description, Patch::Null);
//! assert_eq!(set.description.value(), Some(&"x".to_string()));
//! ```
//!
//! Fields must carry `#[serde(default)]` so that a missing key becomes
//! [`Patch::Absent`].

use serde::{Deserialize, Deserializer};

/// A field in a partial update: leave untouched, clear, or set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Patch<T> {
    /// Key not supplied; leave the stored value alone.
    #[default]
    Absent,
    /// Key supplied as `null`; clear the stored value.
    Null,
    /// Key supplied with a value.
    Value(T),
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(v) => Some(v),
            _ => None,
        }
    }

    /// `None` when absent, `Some(None)` when null, `Some(Some(v))` when set.
    pub fn into_update(self) -> Option<Option<T>> {
        match self {
            Patch::Absent => None,
            Patch::Null => Some(None),
            Patch::Value(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<T>> for Patch<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Patch::Value(v),
            None => Patch::Null,
        }
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; a missing key uses Default.
        Option::<T>::deserialize(deserializer).map(Patch::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Body {
        #[serde(default)]
        category_id: Patch<i64>,
        #[serde(default)]
        due_date: Patch<String>,
    }

    #[test]
    fn test_missing_key_is_absent() {
        let body: Body = serde_json::from_str("{}").unwrap();
        assert!(body.category_id.is_absent());
        assert!(body.due_date.is_absent());
    }

    #[test]
    fn test_null_is_null() {
        let body: Body = serde_json::from_str(r#"{"category_id": null}"#).unwrap();
        assert_eq!(body.category_id, Patch::Null);
        assert!(body.due_date.is_absent());
    }

    #[test]
    fn test_value_is_value() {
        let body: Body =
            serde_json::from_str(r#"{"category_id": 5, "due_date": "2030-12-31"}"#).unwrap();
        assert_eq!(body.category_id, Patch::Value(5));
        assert_eq!(body.due_date.value().map(String::as_str), Some("2030-12-31"));
    }

    #[test]
    fn test_wrong_type_is_an_error() {
        let result = serde_json::from_str::<Body>(r#"{"category_id": "five"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_into_update() {
        assert_eq!(Patch::<i32>::Absent.into_update(), None);
        assert_eq!(Patch::<i32>::Null.into_update(), Some(None));
        assert_eq!(Patch::Value(3).into_update(), Some(Some(3)));
    }
}
