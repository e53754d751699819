use crate::error::ChangeError;
use crate::value::{Fieldset, Value};

/// A relation tuple: a reference plus relation-local attributes. A bare
/// reference is represented with empty `attrs`; `attrs` is only persisted
/// as a tuple once it has been touched by a patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationTuple {
    pub reference: String,
    pub attrs: Fieldset,
}

impl RelationTuple {
    /// Render back to tuple value form `[ref, attrs]`, the form a `patch`
    /// mutation always produces regardless of whether it started bare.
    #[must_use]
    pub fn into_tuple_value(self) -> Value {
        Value::List(vec![Value::Text(self.reference), Value::Map(self.attrs)])
    }
}

/// Split a value into its relation reference and attrs, promoting a bare
/// reference to an (empty-attrs) tuple as needed.
pub fn promote(value: &Value) -> Result<RelationTuple, ChangeError> {
    match value {
        Value::Text(reference) => Ok(RelationTuple {
            reference: reference.clone(),
            attrs: Fieldset::new(),
        }),
        Value::List(items) if items.len() == 2 => {
            let reference = items[0].as_text().ok_or(ChangeError::NotARelation)?.to_string();
            let attrs = items[1].as_map().ok_or(ChangeError::NotARelation)?.clone();
            Ok(RelationTuple { reference, attrs })
        }
        _ => Err(ChangeError::NotARelation),
    }
}

/// The bare reference string of a value, whether bare or tupled. Used to
/// locate sequence elements by relation-ref without fully promoting them.
#[must_use]
pub fn reference_of(value: &Value) -> Option<&str> {
    match value {
        Value::Text(reference) => Some(reference.as_str()),
        Value::List(items) if items.len() == 2 => items[0].as_text(),
        _ => None,
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_reference_promotes_to_empty_attrs() {
        let tuple = promote(&Value::text("alice")).unwrap();
        assert_eq!(tuple.reference, "alice");
        assert!(tuple.attrs.is_empty());
    }

    #[test]
    fn tuple_promotes_to_its_own_attrs() {
        let mut attrs = Fieldset::new();
        attrs.insert("role".into(), Value::text("admin"));
        let value = Value::List(vec![Value::text("alice"), Value::Map(attrs.clone())]);

        let tuple = promote(&value).unwrap();
        assert_eq!(tuple.reference, "alice");
        assert_eq!(tuple.attrs, attrs);
    }

    #[test]
    fn non_relation_value_fails() {
        assert_eq!(promote(&Value::from(1i64)), Err(ChangeError::NotARelation));
    }

    #[test]
    fn reference_of_works_for_both_forms() {
        assert_eq!(reference_of(&Value::text("bob")), Some("bob"));
        let tuple = Value::List(vec![Value::text("bob"), Value::Map(Fieldset::new())]);
        assert_eq!(reference_of(&tuple), Some("bob"));
        assert_eq!(reference_of(&Value::from(1i64)), None);
    }
}
