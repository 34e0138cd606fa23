//! Boundary to the JSON Schema validation engine.
//!
//! A [`Schema`] wraps a compiled validator from the `jsonschema` crate.
//! Validation yields either success or a [`ValidationFailure`] — a
//! structured, serializable list of issues suitable for inclusion in a
//! `400` response body. Format assertions are enabled, so constraints
//! like `"format": "date-time"` are enforced rather than annotated.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error returned when a schema document cannot be compiled.
#[derive(Debug, Clone, Error)]
#[error("invalid schema: {message}")]
pub struct SchemaError {
    /// Description of the compilation failure.
    message: String,
}

/// A single validation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending part of the instance.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
}

/// Structured result of a failed validation.
///
/// Serialized into the `error` field of validation failure responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// All violations found in the instance.
    pub issues: Vec<ValidationIssue>,
}

impl std::fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<&str> = self.issues.iter().map(|i| i.message.as_str()).collect();
        write!(f, "{}", messages.join("; "))
    }
}

/// A compiled JSON Schema.
///
/// Cheap to clone; the compiled validator is shared behind an [`Arc`].
///
/// # Example
///
/// ```rust
/// use trellis_core::Schema;
/// use serde_json::json;
///
/// let schema = Schema::compile(json!({
///     "type": "object",
///     "properties": { "age": { "type": "number" } },
///     "required": ["age"],
/// })).unwrap();
///
/// assert!(schema.validate(&json!({ "age": 30 })).is_ok());
/// assert!(schema.validate(&json!({ "age": "thirty" })).is_err());
/// ```
#[derive(Clone)]
pub struct Schema {
    /// The schema document as provided.
    raw: Value,
    /// The compiled validator.
    compiled: Arc<jsonschema::Validator>,
}

impl Schema {
    /// Compiles a schema document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the document is not a valid JSON Schema.
    pub fn compile(raw: Value) -> Result<Self, SchemaError> {
        let compiled = jsonschema::options()
            .should_validate_formats(true)
            .build(&raw)
            .map_err(|e| SchemaError {
                message: e.to_string(),
            })?;
        Ok(Self {
            raw,
            compiled: Arc::new(compiled),
        })
    }

    /// Returns the schema document as provided at compile time.
    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validates an instance against the schema.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationFailure`] listing every violation.
    pub fn validate(&self, instance: &Value) -> Result<(), ValidationFailure> {
        let issues: Vec<ValidationIssue> = self
            .compiled
            .iter_errors(instance)
            .map(|e| ValidationIssue {
                path: e.instance_path().to_string(),
                message: e.to_string(),
            })
            .collect();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure { issues })
        }
    }

    /// Returns true if the instance satisfies the schema.
    #[must_use]
    pub fn is_valid(&self, instance: &Value) -> bool {
        self.compiled.is_valid(instance)
    }
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema").field("raw", &self.raw).finish()
    }
}
