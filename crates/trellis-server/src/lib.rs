//! # Trellis Server
//!
//! Dispatch pipeline and HTTP server for Trellis endpoints.
//!
//! This crate turns endpoint definitions into a running service:
//!
//! - [`ServerBuilder`] - Accumulates endpoint registrations
//! - [`Server`] - Immutable registry with dispatch and serving
//! - [`ServerConfig`] - Bind address, timeouts, dev mode
//! - [`ShutdownSignal`] - Graceful shutdown coordination
//!
//! Each registration compiles the definition and its handler into a
//! fixed-order pipeline: authentication, query validation, body
//! validation, handler invocation, reply serialization. The compiled
//! pipelines and the routing table are frozen by
//! [`ServerBuilder::build`]; the serving phase never mutates them.
//!
//! ## Example
//!
//! ```rust
//! use trellis_core::{Endpoint, HandlerArgs, NoBody, NoQuery, Reply, Unauthenticated};
//! use trellis_server::{ServerBuilder, ServerConfig};
//! use http::StatusCode;
//!
//! let server = ServerBuilder::new(ServerConfig::default())
//!     .endpoint(
//!         Endpoint::get("/test").unwrap(),
//!         |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
//!             Reply::json(StatusCode::OK, &serde_json::json!({ "code": 200, "data": "test" }))
//!         },
//!     )
//!     .unwrap()
//!     .build();
//!
//! assert_eq!(server.descriptors().len(), 1);
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod logging;
mod pipeline;
mod server;
mod shutdown;

pub use config::{
    ServerConfig, ServerConfigBuilder, DEFAULT_HTTP_ADDR, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SHUTDOWN_TIMEOUT_SECS,
};
pub use logging::init_tracing;
pub use pipeline::{HttpResponse, ResponseBody};
pub use server::{RegistrationError, Server, ServerBuilder, ServerError};
pub use shutdown::{ConnectionToken, ConnectionTracker, ShutdownSignal};
