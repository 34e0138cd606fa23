//! Error types for documentation generation.

use thiserror::Error;

/// Errors that can occur while generating an OpenAPI document.
#[derive(Debug, Error)]
pub enum DocsError {
    /// The document could not be serialized to JSON.
    #[error("failed to serialize OpenAPI document: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A descriptor carries an HTTP method with no OpenAPI slot.
    #[error("operation `{operation_id}` uses unsupported method `{method}`")]
    UnsupportedMethod {
        /// The operation the descriptor documents.
        operation_id: String,
        /// The rejected method.
        method: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_error_message() {
        let err: DocsError = serde_json::from_str::<String>("not json").unwrap_err().into();
        assert!(err.to_string().contains("serialize"));
    }

    #[test]
    fn test_unsupported_method_message() {
        let err = DocsError::UnsupportedMethod {
            operation_id: "getTest".to_string(),
            method: "connect".to_string(),
        };
        assert!(err.to_string().contains("getTest"));
        assert!(err.to_string().contains("connect"));
    }
}
