//! Error types for the stockcast engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while forecasting or computing inventory policy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Fewer observations than the seasonal model needs.
    #[error("insufficient history: need at least {needed} daily observations, got {got}")]
    InsufficientHistory { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Length mismatch between two aligned sequences.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Dates are out of order, duplicated, gapped or misaligned.
    #[error("date error: {0}")]
    DateMismatch(String),

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// A required source table does not exist.
    #[error("required input not found: {path}")]
    InputMissing { path: String },

    /// A required column is absent from a loaded table.
    #[error("table '{table}' is missing required column '{column}'")]
    SchemaMismatch { table: String, column: String },

    /// A row could not be parsed.
    #[error("table '{table}' line {line}: {message}")]
    MalformedRecord {
        table: String,
        line: u64,
        message: String,
    },

    /// A product's attributes cannot produce a valid policy.
    #[error("product {product_id}: {reason}")]
    NumericGuard { product_id: String, reason: String },

    /// Filesystem failure while reading or writing a table.
    #[error("io error: {0}")]
    Io(String),

    /// Configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl EngineError {
    /// Whether this error aborts a whole run.
    ///
    /// `NumericGuard` only excludes a single product row.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::NumericGuard { .. })
    }

    pub(crate) fn guard(product_id: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::NumericGuard {
            product_id: product_id.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = EngineError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = EngineError::InsufficientHistory { needed: 14, got: 9 };
        assert_eq!(
            err.to_string(),
            "insufficient history: need at least 14 daily observations, got 9"
        );

        let err = EngineError::SchemaMismatch {
            table: "products".to_string(),
            column: "cost_price".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "table 'products' is missing required column 'cost_price'"
        );

        let err = EngineError::guard("PROD_0001", "holding cost per unit must be positive");
        assert_eq!(
            err.to_string(),
            "product PROD_0001: holding cost per unit must be positive"
        );
    }

    #[test]
    fn only_numeric_guard_is_non_fatal() {
        assert!(!EngineError::guard("P1", "lead time").is_fatal());
        assert!(EngineError::EmptyData.is_fatal());
        assert!(EngineError::InputMissing {
            path: "x.csv".to_string()
        }
        .is_fatal());
        assert!(EngineError::InsufficientHistory { needed: 14, got: 3 }.is_fatal());
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: EngineError = io.into();
        assert!(matches!(err, EngineError::Io(ref m) if m.contains("denied")));
    }
}
