use thiserror::Error;

/// Recoverable faults inside a batch operation.
///
/// None of these escape `measure`, `reconcile`, `route` or the drag
/// handlers; they are logged and the offending item is skipped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("element `{key}` not found")]
    MissingElement { key: String },
    #[error("malformed descriptor: {reason}")]
    MalformedDescriptor { reason: String },
    #[error("geometry for `{key}` could not be computed: {reason}")]
    Computation { key: String, reason: String },
    #[error("no {0} handler configured; changes are not persisted")]
    ConfigurationMissing(&'static str),
}

impl LayoutError {
    pub fn missing(key: &str) -> Self {
        Self::MissingElement {
            key: key.to_string(),
        }
    }

    pub fn computation(key: &str, reason: impl Into<String>) -> Self {
        Self::Computation {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
