//! # Trellis Docs
//!
//! OpenAPI 3.0 document generation for Trellis endpoints.
//!
//! The generator is a pure transformation over the server's descriptor
//! list: it reads what each endpoint declared (path, method, metadata,
//! schemas, responses, security schemes) and emits a document. Nothing
//! here touches the dispatch path.
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{Endpoint, EndpointMeta, ResponseModel};
//! use trellis_docs::OpenApiGenerator;
//! use http::StatusCode;
//!
//! let descriptor = Endpoint::get("/test")
//!     .unwrap()
//!     .meta(EndpointMeta::new("getTest", "Test endpoint"))
//!     .response(StatusCode::OK, ResponseModel::json())
//!     .descriptor();
//!
//! let doc = OpenApiGenerator::new()
//!     .title("Mock API")
//!     .version("1.0.0")
//!     .generate(&[descriptor])
//!     .unwrap();
//!
//! assert!(doc.paths.contains_key("/test"));
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod openapi;

pub use error::{DocsError, DocsResult};
pub use openapi::{
    Components, Info, MediaType, OpenApi, OpenApiGenerator, Operation, Parameter, ParameterIn,
    PathItem, RequestBody, ResponseObject, SecurityRequirement, SecuritySchemeObject, ServerEntry,
};
