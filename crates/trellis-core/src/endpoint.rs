//! Endpoint definitions.
//!
//! An [`EndpointDefinition`] declares everything about one route: path,
//! method, metadata, request schemas, response models, and security
//! schemes. Its three type parameters — body, query, caller — are set by
//! the builder methods and fix the handler signature for the endpoint, so
//! structural mistakes (a body schema on a body-less endpoint, schemes
//! with mismatched identity types) do not compile.
//!
//! # Example
//!
//! ```rust
//! use trellis_core::{Endpoint, EndpointMeta, ResponseModel};
//! use http::StatusCode;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Deserialize)]
//! struct MockBody { age: f64 }
//!
//! let endpoint = Endpoint::post("/mock")
//!     .unwrap()
//!     .meta(EndpointMeta::new("postMock", "Mock creation endpoint"))
//!     .body::<MockBody>(json!({
//!         "type": "object",
//!         "properties": { "age": { "type": "number" } },
//!         "required": ["age"],
//!     }))
//!     .unwrap()
//!     .response(StatusCode::OK, ResponseModel::json());
//! ```

use std::collections::BTreeMap;
use std::marker::PhantomData;
use std::sync::Arc;

use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::extract::{Json, NoBody, NoQuery, Query};
use crate::response::ResponseModel;
use crate::schema::{Schema, SchemaError};
use crate::security::{CallerSource, SchemeKind, SecurityScheme, Unauthenticated};

/// Error returned when a path pattern cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    /// The path does not start with `/`.
    #[error("path `{path}` must start with `/`")]
    NotAbsolute {
        /// The rejected path.
        path: String,
    },

    /// A segment contains a malformed placeholder.
    #[error("invalid placeholder segment `{segment}` in `{path}`")]
    InvalidPlaceholder {
        /// The path containing the segment.
        path: String,
        /// The rejected segment.
        segment: String,
    },

    /// Two placeholders share a name.
    #[error("duplicate parameter `{name}` in `{path}`")]
    DuplicateParam {
        /// The path containing the duplicate.
        path: String,
        /// The duplicated parameter name.
        name: String,
    },
}

/// A validated path pattern with `:name` placeholder segments.
///
/// # Example
///
/// ```rust
/// use trellis_core::PathSpec;
///
/// let path = PathSpec::parse("/users/:userId/posts").unwrap();
/// assert_eq!(path.param_names(), ["userId"]);
///
/// assert!(PathSpec::parse("/users/:").is_err());
/// assert!(PathSpec::parse("users").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSpec {
    /// The pattern as written.
    raw: String,
    /// Placeholder names in order of appearance.
    param_names: Vec<String>,
}

impl PathSpec {
    /// Parses and validates a path pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for relative paths, malformed placeholder
    /// segments, and duplicate parameter names.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if !path.starts_with('/') {
            return Err(PathError::NotAbsolute {
                path: path.to_string(),
            });
        }

        let mut param_names = Vec::new();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            if let Some(name) = segment.strip_prefix(':') {
                let well_formed = !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_');
                if !well_formed {
                    return Err(PathError::InvalidPlaceholder {
                        path: path.to_string(),
                        segment: segment.to_string(),
                    });
                }
                if param_names.iter().any(|n| n == name) {
                    return Err(PathError::DuplicateParam {
                        path: path.to_string(),
                        name: name.to_string(),
                    });
                }
                param_names.push(name.to_string());
            } else if segment.contains(':') {
                return Err(PathError::InvalidPlaceholder {
                    path: path.to_string(),
                    segment: segment.to_string(),
                });
            }
        }

        Ok(Self {
            raw: path.to_string(),
            param_names,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the placeholder names in order of appearance.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }
}

impl std::fmt::Display for PathSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Documentation metadata for an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EndpointMeta {
    /// Short identifier, e.g. `getUser`.
    name: String,
    /// Human-readable description.
    description: String,
    /// Optional grouping tag.
    group: Option<String>,
}

impl EndpointMeta {
    /// Creates metadata with a name and description.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            group: None,
        }
    }

    /// Sets the grouping tag.
    #[must_use]
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Returns the endpoint name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the grouping tag if set.
    #[must_use]
    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }
}

/// A security scheme as recorded for documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityDescriptor {
    /// The scheme's name.
    pub name: String,
    /// The scheme's well-known kind.
    pub kind: SchemeKind,
}

/// The type-erased record of a registered endpoint.
///
/// Kept by the server registry in registration order and consumed by
/// documentation generation.
#[derive(Debug, Clone)]
pub struct EndpointDescriptor {
    /// The path pattern with `:name` placeholders.
    pub path: String,
    /// Placeholder names in order of appearance.
    pub param_names: Vec<String>,
    /// The HTTP method, lowercase.
    pub method: String,
    /// Documentation metadata.
    pub meta: EndpointMeta,
    /// The body schema document, if declared.
    pub body_schema: Option<Value>,
    /// The query schema document, if declared.
    pub query_schema: Option<Value>,
    /// Declared responses by status code.
    pub responses: BTreeMap<u16, ResponseModel>,
    /// Declared security schemes in evaluation order.
    pub security: Vec<SecurityDescriptor>,
}

/// Entry points for building endpoint definitions.
pub struct Endpoint;

macro_rules! entry_method {
    ($fn_name:ident, $method:expr, $doc:literal) => {
        #[doc = $doc]
        ///
        /// # Errors
        ///
        /// Returns [`PathError`] if the path pattern is malformed.
        pub fn $fn_name(path: &str) -> Result<EndpointDefinition, PathError> {
            EndpointDefinition::new($method, path)
        }
    };
}

impl Endpoint {
    entry_method!(get, Method::GET, "Starts a GET endpoint definition.");
    entry_method!(post, Method::POST, "Starts a POST endpoint definition.");
    entry_method!(put, Method::PUT, "Starts a PUT endpoint definition.");
    entry_method!(delete, Method::DELETE, "Starts a DELETE endpoint definition.");
    entry_method!(patch, Method::PATCH, "Starts a PATCH endpoint definition.");
    entry_method!(head, Method::HEAD, "Starts a HEAD endpoint definition.");
    entry_method!(options, Method::OPTIONS, "Starts an OPTIONS endpoint definition.");
}

/// An immutable endpoint declaration.
///
/// The type parameters fix the handler signature: `B` is the body type
/// ([`NoBody`] or [`Json<T>`]), `Q` the query type ([`NoQuery`] or
/// [`Query<T>`]), and `C` the caller identity ([`Unauthenticated`] or the
/// identity type shared by the declared security schemes).
pub struct EndpointDefinition<B = NoBody, Q = NoQuery, C = Unauthenticated> {
    path: PathSpec,
    method: Method,
    meta: EndpointMeta,
    body_schema: Option<Schema>,
    query_schema: Option<Schema>,
    responses: BTreeMap<StatusCode, ResponseModel>,
    security: CallerSource<C>,
    _marker: PhantomData<fn() -> (B, Q)>,
}

impl EndpointDefinition {
    /// Creates a bare definition for a method and path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] if the path pattern is malformed.
    pub fn new(method: Method, path: &str) -> Result<Self, PathError> {
        Ok(Self {
            path: PathSpec::parse(path)?,
            method,
            meta: EndpointMeta::default(),
            body_schema: None,
            query_schema: None,
            responses: BTreeMap::new(),
            security: CallerSource::Anonymous(|| Unauthenticated),
            _marker: PhantomData,
        })
    }
}

impl<B, Q, C: Send + 'static> EndpointDefinition<B, Q, C> {
    /// Sets the documentation metadata.
    #[must_use]
    pub fn meta(mut self, meta: EndpointMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Declares a response for a status code.
    ///
    /// Status codes are unique by construction; re-declaring a status
    /// replaces the previous model.
    #[must_use]
    pub fn response(mut self, status: StatusCode, model: ResponseModel) -> Self {
        self.responses.insert(status, model);
        self
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn path(&self) -> &PathSpec {
        &self.path
    }

    /// Returns the HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the metadata.
    #[must_use]
    pub fn meta_ref(&self) -> &EndpointMeta {
        &self.meta
    }

    /// Returns the compiled body schema, if declared.
    #[must_use]
    pub fn body_schema(&self) -> Option<&Schema> {
        self.body_schema.as_ref()
    }

    /// Returns the compiled query schema, if declared.
    #[must_use]
    pub fn query_schema(&self) -> Option<&Schema> {
        self.query_schema.as_ref()
    }

    /// Returns the declared responses.
    #[must_use]
    pub fn responses(&self) -> &BTreeMap<StatusCode, ResponseModel> {
        &self.responses
    }

    /// Returns the declared security schemes in evaluation order.
    #[must_use]
    pub fn security_schemes(&self) -> &[Arc<dyn SecurityScheme<Identity = C>>] {
        self.security.schemes()
    }

    /// Returns the caller source for this endpoint.
    #[must_use]
    pub fn caller_source(&self) -> &CallerSource<C> {
        &self.security
    }

    /// Builds the type-erased descriptor for this definition.
    #[must_use]
    pub fn descriptor(&self) -> EndpointDescriptor {
        EndpointDescriptor {
            path: self.path.as_str().to_string(),
            param_names: self.path.param_names().to_vec(),
            method: self.method.as_str().to_lowercase(),
            meta: self.meta.clone(),
            body_schema: self.body_schema.as_ref().map(|s| s.raw().clone()),
            query_schema: self.query_schema.as_ref().map(|s| s.raw().clone()),
            responses: self
                .responses
                .iter()
                .map(|(status, model)| (status.as_u16(), model.clone()))
                .collect(),
            security: self
                .security
                .schemes()
                .iter()
                .map(|s| SecurityDescriptor {
                    name: s.name().to_string(),
                    kind: s.kind(),
                })
                .collect(),
        }
    }
}

impl<Q, C> EndpointDefinition<NoBody, Q, C> {
    /// Declares a JSON request body validated against a schema and
    /// deserialized into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema document does not compile.
    pub fn body<T>(self, schema: Value) -> Result<EndpointDefinition<Json<T>, Q, C>, SchemaError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(EndpointDefinition {
            path: self.path,
            method: self.method,
            meta: self.meta,
            body_schema: Some(Schema::compile(schema)?),
            query_schema: self.query_schema,
            responses: self.responses,
            security: self.security,
            _marker: PhantomData,
        })
    }
}

impl<B, C> EndpointDefinition<B, NoQuery, C> {
    /// Declares query parameters validated against a schema and
    /// deserialized into `T`.
    ///
    /// The query string is folded into an object of string values before
    /// validation, so the schema should describe string properties.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError`] if the schema document does not compile.
    pub fn query<T>(self, schema: Value) -> Result<EndpointDefinition<B, Query<T>, C>, SchemaError>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Ok(EndpointDefinition {
            path: self.path,
            method: self.method,
            meta: self.meta,
            body_schema: self.body_schema,
            query_schema: Some(Schema::compile(schema)?),
            responses: self.responses,
            security: self.security,
            _marker: PhantomData,
        })
    }
}

impl<B, Q> EndpointDefinition<B, Q, Unauthenticated> {
    /// Declares the first security scheme, fixing the caller identity
    /// type to the scheme's identity.
    #[must_use]
    pub fn security<S: SecurityScheme>(self, scheme: S) -> EndpointDefinition<B, Q, S::Identity> {
        EndpointDefinition {
            path: self.path,
            method: self.method,
            meta: self.meta,
            body_schema: self.body_schema,
            query_schema: self.query_schema,
            responses: self.responses,
            security: CallerSource::Schemes(vec![Arc::new(scheme)]),
            _marker: PhantomData,
        }
    }
}

impl<B, Q, C> EndpointDefinition<B, Q, C> {
    /// Declares an additional security scheme, tried after the previous
    /// ones. Its identity type must match the first scheme's.
    #[must_use]
    pub fn or_security<S: SecurityScheme<Identity = C>>(mut self, scheme: S) -> Self {
        match &mut self.security {
            CallerSource::Schemes(schemes) => schemes.push(Arc::new(scheme)),
            source @ CallerSource::Anonymous(_) => {
                *source = CallerSource::Schemes(vec![Arc::new(scheme)]);
            }
        }
        self
    }
}

impl<B, Q, C: Send + 'static> std::fmt::Debug for EndpointDefinition<B, Q, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointDefinition")
            .field("path", &self.path)
            .field("method", &self.method)
            .field("meta", &self.meta)
            .field("responses", &self.responses.keys())
            .field("security", &self.security.schemes().len())
            .finish()
    }
}
