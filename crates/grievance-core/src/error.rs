//! Error types for grievance triage

/// Result type alias using the triage Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for triage operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Complaint text was empty after trimming
    #[error("complaint text is empty")]
    EmptyInput,

    /// A label outside the configured taxonomy
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// No reply template registered for a category
    #[error("no reply template for category: {0}")]
    TemplateMissing(String),

    /// The external classifier could not be reached or loaded
    #[error("classifier unavailable: {0}")]
    ClassifierUnavailable(String),

    /// The classifier rejected or could not rank a specific input
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Batch input has no recognised complaint text column
    #[error("missing required column: expected one of {}", .expected.join(", "))]
    MissingRequiredColumn { expected: Vec<String> },

    /// A single batch row could not be analyzed
    #[error("row {row} failed: {reason}")]
    RowProcessingFailed { row: usize, reason: String },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Tabular input/output errors
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new classifier unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::ClassifierUnavailable(msg.into())
    }

    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Create a new row failure
    pub fn row_failed(row: usize, reason: impl Into<String>) -> Self {
        Self::RowProcessingFailed {
            row,
            reason: reason.into(),
        }
    }

    /// Whether a batch run can record this error against one row and continue.
    ///
    /// Anything that points at the dependency or the whole input (an
    /// unreachable classifier, bad configuration, unreadable CSV) is not.
    pub fn is_row_recoverable(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::UnknownCategory(_)
                | Self::TemplateMissing(_)
                | Self::Classifier(_)
                | Self::RowProcessingFailed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_recoverable_split() {
        assert!(Error::EmptyInput.is_row_recoverable());
        assert!(Error::UnknownCategory("Spam".into()).is_row_recoverable());
        assert!(Error::classifier("bad input").is_row_recoverable());
        assert!(!Error::unavailable("connection refused").is_row_recoverable());
        assert!(!Error::config("no labels").is_row_recoverable());
    }

    #[test]
    fn test_missing_column_message() {
        let err = Error::MissingRequiredColumn {
            expected: vec!["Complaint".into(), "Text".into()],
        };
        assert_eq!(
            err.to_string(),
            "missing required column: expected one of Complaint, Text"
        );
    }
}
