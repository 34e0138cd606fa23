//! Response model and handler reply types.
//!
//! An endpoint declares the responses it can produce as a map from status
//! code to [`ResponseModel`]. At runtime a handler returns a [`Reply`],
//! which the pipeline serializes according to the declared model: status
//! first, then declared headers, then the payload (or an empty body).
//!
//! Outbound payloads are trusted — the pipeline does not re-validate them
//! against the declared schema. The schema still drives documentation.

use bytes::Bytes;
use http::StatusCode;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// The content type of a declared response.
///
/// Open for extension; JSON is the only kind today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseKind {
    /// A JSON payload, optionally described by a JSON Schema document.
    Json {
        /// Schema for the payload, used for documentation.
        schema: Option<Value>,
    },
}

impl ResponseKind {
    /// Returns the Content-Type header value for this kind.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Json { .. } => "application/json",
        }
    }
}

/// A declared response: content kind plus the headers it may carry.
///
/// # Example
///
/// ```rust
/// use trellis_core::ResponseModel;
/// use serde_json::json;
///
/// let model = ResponseModel::json_schema(json!({ "type": "string" }))
///     .header("x-request-id");
/// assert_eq!(model.header_names(), ["x-request-id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseModel {
    /// The content kind of the payload.
    kind: ResponseKind,
    /// Names of headers this response may set.
    header_names: Vec<String>,
}

impl ResponseModel {
    /// Declares a JSON response without a payload schema.
    #[must_use]
    pub fn json() -> Self {
        Self {
            kind: ResponseKind::Json { schema: None },
            header_names: Vec::new(),
        }
    }

    /// Declares a JSON response with a payload schema.
    #[must_use]
    pub fn json_schema(schema: Value) -> Self {
        Self {
            kind: ResponseKind::Json {
                schema: Some(schema),
            },
            header_names: Vec::new(),
        }
    }

    /// Declares a header this response may carry.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        self.header_names.push(name.into());
        self
    }

    /// Returns the content kind.
    #[must_use]
    pub fn kind(&self) -> &ResponseKind {
        &self.kind
    }

    /// Returns the declared header names.
    #[must_use]
    pub fn header_names(&self) -> &[String] {
        &self.header_names
    }
}

/// The value a handler returns: a status code, an optional serialized
/// payload, and header values.
///
/// # Example
///
/// ```rust
/// use trellis_core::Reply;
/// use http::StatusCode;
///
/// let reply = Reply::json(StatusCode::OK, &"test").unwrap();
/// assert_eq!(reply.status(), StatusCode::OK);
///
/// let empty = Reply::empty(StatusCode::NO_CONTENT);
/// assert!(empty.payload().is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// The response status code.
    status: StatusCode,
    /// The serialized payload, if any.
    payload: Option<Bytes>,
    /// Header (name, value) pairs to set on the response.
    headers: Vec<(String, String)>,
}

impl Reply {
    /// Creates a JSON reply by serializing the payload.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Serialization`] if the payload cannot be
    /// serialized to JSON.
    pub fn json<T: Serialize>(status: StatusCode, payload: &T) -> Result<Self, ApiError> {
        let bytes = serde_json::to_vec(payload).map_err(|e| ApiError::serialization(e.to_string()))?;
        Ok(Self {
            status,
            payload: Some(Bytes::from(bytes)),
            headers: Vec::new(),
        })
    }

    /// Creates a reply with no payload.
    #[must_use]
    pub fn empty(status: StatusCode) -> Self {
        Self {
            status,
            payload: None,
            headers: Vec::new(),
        }
    }

    /// Sets a header value on the reply.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Returns the status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the serialized payload, if any.
    #[must_use]
    pub fn payload(&self) -> Option<&Bytes> {
        self.payload.as_ref()
    }

    /// Returns the header (name, value) pairs.
    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
