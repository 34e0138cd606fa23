//! Read-only view of an incoming request.
//!
//! [`RequestParts`] carries the method, URI, and headers of a request into
//! security schemes and handlers. Bodies are handled separately by the
//! dispatch pipeline so this view stays cheap to clone.

use http::{HeaderMap, Method, Uri};
use serde_json::{Map, Value};

/// The non-body parts of an incoming HTTP request.
///
/// # Example
///
/// ```rust
/// use trellis_core::RequestParts;
/// use http::{HeaderMap, Method, Uri};
///
/// let parts = RequestParts::new(
///     Method::GET,
///     Uri::from_static("/mock?time=2023-01-01T00:00:00Z"),
///     HeaderMap::new(),
/// );
///
/// assert_eq!(parts.path(), "/mock");
/// assert_eq!(parts.query_string(), Some("time=2023-01-01T00:00:00Z"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestParts {
    /// The HTTP method.
    method: Method,
    /// The request URI (path and query).
    uri: Uri,
    /// The request headers.
    headers: HeaderMap,
}

impl RequestParts {
    /// Creates a request view from its components.
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the request path.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Returns the raw query string, if present.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns the request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Folds the query string into a JSON object of string values.
    ///
    /// Query parameters are untyped on the wire, so each value is kept as
    /// a string; schemas validating query objects should expect string
    /// properties. Repeated keys keep the last value.
    #[must_use]
    pub fn query_object(&self) -> Value {
        let mut object = Map::new();
        let pairs: Vec<(String, String)> = self
            .query_string()
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();
        for (key, value) in pairs {
            object.insert(key, Value::String(value));
        }
        Value::Object(object)
    }
}

impl From<http::request::Parts> for RequestParts {
    fn from(parts: http::request::Parts) -> Self {
        Self::new(parts.method, parts.uri, parts.headers)
    }
}
