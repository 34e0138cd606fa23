//! # Trellis Core
//!
//! Core types for the Trellis endpoint framework.
//!
//! This crate provides the foundational types used throughout Trellis:
//!
//! - [`EndpointDefinition`] - Typed, immutable endpoint declarations
//! - [`Reply`] / [`ResponseModel`] - The response model
//! - [`SecurityScheme`] - Pluggable authentication with typed identities
//! - [`Handler`] / [`HandlerArgs`] - Handler signatures derived from definitions
//! - [`Schema`] - Boundary to the JSON Schema validation engine
//! - [`ApiError`] - Standard error types
//! - [`RequestContext`] / [`RequestId`] - Per-request bookkeeping

#![doc(html_root_url = "https://docs.rs/trellis-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod endpoint;
mod error;
mod extract;
mod handler;
mod request;
mod response;
mod schema;
mod security;

pub use context::{RequestContext, RequestId};
pub use endpoint::{
    Endpoint, EndpointDefinition, EndpointDescriptor, EndpointMeta, PathError, PathSpec,
    SecurityDescriptor,
};
pub use error::{ApiError, ApiResult, ErrorCategory, ErrorDetail, ErrorEnvelope};
pub use extract::{FromBody, FromQuery, Json, NoBody, NoQuery, Query};
pub use handler::{BoxFuture, Handler, HandlerArgs};
pub use request::RequestParts;
pub use response::{Reply, ResponseKind, ResponseModel};
pub use schema::{Schema, SchemaError, ValidationFailure, ValidationIssue};
pub use security::{
    authenticate_first_match, CallerSource, SchemeKind, SecurityScheme, Unauthenticated,
};
