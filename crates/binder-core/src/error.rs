use thiserror::Error as ThisError;

///
/// ChangeError
///
/// Structured failures from the field-change algebra (apply/inverse/squash/rebase).
/// Carries an optional dotted path, accumulated by callers as the error propagates
/// back out through nested fieldsets and sequence mutations.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ChangeError {
    #[error("set precondition failed: expected {expected:?}, found {found:?}")]
    SetPrecondition { expected: String, found: String },

    #[error("clear precondition failed: expected {expected}, found {found:?}")]
    ClearPrecondition { expected: String, found: String },

    #[error("value is not a list")]
    NotAList,

    #[error("position {pos} out of range for length {len}")]
    PositionOutOfRange { pos: usize, len: usize },

    #[error("remove value mismatch: expected {expected}, found {found}")]
    RemoveValueMismatch { expected: String, found: String },

    #[error("reference not found: {reference}")]
    RefNotFound { reference: String },

    #[error("value is not a relation tuple")]
    NotARelation,

    #[error("cannot rebase set/clear change: anchors diverge")]
    CannotRebaseSet,

    #[error("rebase conflict")]
    RebaseConflict,

    #[error("unknown change kind")]
    UnknownChangeKind,

    #[error("{path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl ChangeError {
    /// Prepend a field-key segment to the error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        self.with_path_segment(field.as_ref())
    }

    /// Prepend a sequence-index segment to the error path.
    #[must_use]
    pub fn with_index(self, index: usize) -> Self {
        self.with_path_segment(format!("[{index}]"))
    }

    /// The innermost, non-context variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            other => other,
        }
    }

    /// The full accumulated path, if any context has been attached.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    #[must_use]
    fn with_path_segment(self, segment: impl Into<String>) -> Self {
        let segment = segment.into();
        match self {
            Self::Context { path, source } => Self::Context {
                path: Self::join_segments(&segment, &path),
                source,
            },
            other => Self::Context {
                path: segment,
                source: Box::new(other),
            },
        }
    }

    #[must_use]
    fn join_segments(prefix: &str, suffix: &str) -> String {
        if suffix.starts_with('[') {
            format!("{prefix}{suffix}")
        } else {
            format!("{prefix}.{suffix}")
        }
    }
}

pub type ChangeResult<T> = Result<T, ChangeError>;

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_accumulates_dotted_path() {
        let err = ChangeError::NotAList
            .with_field("tags")
            .with_index(2)
            .with_field("attrs");

        assert_eq!(err.path(), Some("attrs[2].tags"));
        assert_eq!(*err.leaf(), ChangeError::NotAList);
    }
}
