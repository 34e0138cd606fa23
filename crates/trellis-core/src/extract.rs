//! Typed body and query wrappers.
//!
//! An endpoint definition's type parameters name one of these wrappers,
//! and the dispatch pipeline uses the [`FromBody`] / [`FromQuery`]
//! conversions to turn the already-validated JSON value into the typed
//! argument the handler receives. [`NoBody`] and [`NoQuery`] mark
//! endpoints that skip extraction entirely.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;

use crate::error::ApiError;

/// Marker for endpoints that accept no request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoBody;

/// Marker for endpoints that accept no query parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoQuery;

/// Typed JSON request body.
///
/// The inner value is deserialized from the request body after it has
/// passed schema validation.
///
/// # Example
///
/// ```rust
/// use trellis_core::Json;
///
/// let body = Json(42);
/// assert_eq!(*body, 42);
/// assert_eq!(body.into_inner(), 42);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Typed query parameters.
///
/// The inner value is deserialized from the folded query object after it
/// has passed schema validation. Query values arrive as strings, so the
/// target type's fields are typically `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T> Query<T> {
    /// Consumes the wrapper and returns the inner value.
    #[must_use]
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for Query<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Conversion from the validated request body into a handler argument.
pub trait FromBody: Sized + Send + 'static {
    /// Converts the body value, `None` when the endpoint declares no body.
    fn from_body(value: Option<&Value>) -> Result<Self, ApiError>;
}

impl FromBody for NoBody {
    fn from_body(_value: Option<&Value>) -> Result<Self, ApiError> {
        Ok(Self)
    }
}

impl<T: DeserializeOwned + Send + 'static> FromBody for Json<T> {
    fn from_body(value: Option<&Value>) -> Result<Self, ApiError> {
        let value = value.ok_or_else(|| ApiError::validation("request body required"))?;
        let inner = T::deserialize(value).map_err(|e| ApiError::validation(e.to_string()))?;
        Ok(Json(inner))
    }
}

/// Conversion from the validated query object into a handler argument.
pub trait FromQuery: Sized + Send + 'static {
    /// Converts the query object, `None` when the endpoint declares no
    /// query schema.
    fn from_query(value: Option<&Value>) -> Result<Self, ApiError>;
}

impl FromQuery for NoQuery {
    fn from_query(_value: Option<&Value>) -> Result<Self, ApiError> {
        Ok(Self)
    }
}

impl<T: DeserializeOwned + Send + 'static> FromQuery for Query<T> {
    fn from_query(value: Option<&Value>) -> Result<Self, ApiError> {
        let value = value.ok_or_else(|| ApiError::validation("query parameters required"))?;
        let inner = T::deserialize(value).map_err(|e| ApiError::validation(e.to_string()))?;
        Ok(Query(inner))
    }
}
