//! # Trellis
//!
//! **Typed endpoint registration and dispatch over HTTP**
//!
//! Trellis turns declarative endpoint definitions into a running server:
//!
//! - **Typed definitions** – Request body, query, and caller identity are
//!   type parameters set by the builder, so handler signatures are fixed
//!   at compile time
//! - **Schema validation** – JSON Schema documents validate bodies and
//!   query strings before a handler runs
//! - **First-match authentication** – Basic/Bearer schemes evaluated in
//!   declaration order, with a uniform empty `401`
//! - **Fixed pipeline** – Auth, query validation, body validation,
//!   handler with timeout and panic recovery, reply serialization
//! - **OpenAPI generation** – Documents built from the same descriptors
//!   the server registers
//!
//! ## Quick Start
//!
//! ```rust
//! use trellis::prelude::*;
//! use http::StatusCode;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let server = ServerBuilder::new(ServerConfig::default())
//!     .endpoint(
//!         Endpoint::get("/test")?
//!             .meta(EndpointMeta::new("getTest", "Test endpoint"))
//!             .response(StatusCode::OK, ResponseModel::json()),
//!         |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
//!             Reply::json(StatusCode::OK, &serde_json::json!({ "code": 200, "data": "test" }))
//!         },
//!     )?
//!     .build();
//! # assert_eq!(server.descriptors().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! Start serving with [`Server::run`](trellis_server::Server::run), or
//! [`Server::run_with_shutdown`](trellis_server::Server::run_with_shutdown)
//! for graceful shutdown.

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use trellis_core as core;

// Re-export authentication schemes
pub use trellis_auth as auth;

// Re-export router types
pub use trellis_router as router;

// Re-export server types
pub use trellis_server as server;

// Re-export documentation generation
pub use trellis_docs as docs;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use trellis::prelude::*;
/// ```
pub mod prelude {
    pub use trellis_core::{
        ApiError, ApiResult, Endpoint, EndpointDefinition, EndpointMeta, Handler, HandlerArgs,
        Json, NoBody, NoQuery, Query, Reply, RequestContext, RequestId, ResponseModel,
        SchemeKind, SecurityScheme, Unauthenticated,
    };

    // Re-export ready-made authentication schemes
    pub use trellis_auth::{BasicScheme, BearerScheme};

    // Re-export server entry points
    pub use trellis_server::{
        init_tracing, Server, ServerBuilder, ServerConfig, ShutdownSignal,
    };

    // Re-export documentation generation
    pub use trellis_docs::OpenApiGenerator;
}
