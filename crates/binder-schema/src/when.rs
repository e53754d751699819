use binder_core::Value;
use serde::{Deserialize, Serialize};

///
/// WhenCondition
///
/// A field's visibility predicate over a sibling field: the field only
/// participates in validation (required-ness, type-checking) when the
/// named sibling currently equals `equals`.
///

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhenCondition {
    pub field: String,
    pub equals: Value,
}

impl WhenCondition {
    #[must_use]
    pub const fn new(field: String, equals: Value) -> Self {
        Self { field, equals }
    }

    /// Evaluate the condition against a sibling fieldset (or partial input
    /// map) that may or may not contain the referenced field.
    #[must_use]
    pub fn is_met(&self, siblings: &binder_core::Fieldset) -> bool {
        siblings.get(&self.field).is_some_and(|v| v == &self.equals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmet_when_sibling_absent() {
        let cond = WhenCondition::new("kind".into(), Value::text("remote"));
        assert!(!cond.is_met(&binder_core::Fieldset::new()));
    }

    #[test]
    fn met_when_sibling_matches() {
        let cond = WhenCondition::new("kind".into(), Value::text("remote"));
        let mut siblings = binder_core::Fieldset::new();
        siblings.insert("kind".into(), Value::text("remote"));
        assert!(cond.is_met(&siblings));
    }
}
