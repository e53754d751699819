use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;

/// A fieldset is a mapping from field key to field value — the materialized
/// state of an entity at some point in history, and the shape of relation
/// tuple attributes.
pub type Fieldset = BTreeMap<String, Value>;

///
/// Value
///
/// A field value: null, boolean, number, string, ordered list, or a mapping
/// from string to field value. Equality is structural.
///
/// A relation is not a distinct variant — it is a `List` of exactly two
/// elements whose first element is a `Text` reference and whose second is a
/// `Map` of relation-local attributes (see [`crate::relation`]). A bare
/// `Text` value is also a valid (unattributed) relation reference.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    Text(String),
    List(Vec<Value>),
    Map(Fieldset),
}

impl Value {
    /// A null value is semantically "absent".
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// An empty list is coerced to absent during application.
    #[must_use]
    pub fn is_empty_list(&self) -> bool {
        matches!(self, Self::List(items) if items.is_empty())
    }

    /// Treat an empty list the same as null, per the application contract.
    #[must_use]
    pub fn normalize_absence(self) -> Self {
        if self.is_empty_list() {
            Self::Null
        } else {
            self
        }
    }

    #[must_use]
    pub const fn as_list(&self) -> Option<&Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn into_list(self) -> Option<Vec<Value>> {
        match self {
            Self::List(items) => Some(items),
            Self::Null => Some(Vec::new()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_map(&self) -> Option<&Fieldset> {
        match self {
            Self::Map(fields) => Some(fields),
            _ => None,
        }
    }

    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Self::Map(fields) => {
                write!(f, "{{")?;
                for (i, (k, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{k:?}:{v}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Self::Number(Number::from(n))
    }
}

impl<T> From<Vec<T>> for Value
where
    T: Into<Value>,
{
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_normalizes_to_null() {
        let value = Value::List(vec![]).normalize_absence();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn non_empty_list_is_unaffected() {
        let value = Value::from(vec!["a"]).normalize_absence();
        assert_eq!(value, Value::List(vec![Value::text("a")]));
    }

    #[test]
    fn structural_equality_ignores_map_construction_order() {
        let mut a = Fieldset::new();
        a.insert("x".into(), Value::from(1i64));
        a.insert("y".into(), Value::from(2i64));

        let mut b = Fieldset::new();
        b.insert("y".into(), Value::from(2i64));
        b.insert("x".into(), Value::from(1i64));

        assert_eq!(Value::Map(a), Value::Map(b));
    }
}
