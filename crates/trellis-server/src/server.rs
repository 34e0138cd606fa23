//! Endpoint registry and HTTP server.
//!
//! Registration and serving are separate phases: a [`ServerBuilder`]
//! accumulates endpoint registrations, and [`ServerBuilder::build`]
//! produces an immutable [`Server`] whose routing table can no longer
//! change. Requests are dispatched to the pipeline compiled for the
//! matched route; unmatched paths get a JSON `404`.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis_core::{Endpoint, HandlerArgs, NoBody, NoQuery, Reply, Unauthenticated};
//! use trellis_server::{ServerBuilder, ServerConfig};
//! use http::StatusCode;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = ServerBuilder::new(ServerConfig::default())
//!         .endpoint(
//!             Endpoint::get("/test")?,
//!             |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
//!                 Reply::json(StatusCode::OK, &serde_json::json!({ "code": 200, "data": "test" }))
//!             },
//!         )?
//!         .build();
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request};
use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use trellis_core::{
    EndpointDefinition, EndpointDescriptor, FromBody, FromQuery, Handler, RequestParts,
};
use trellis_router::{InsertError, RouteId, Router};

use crate::config::ServerConfig;
use crate::pipeline::{empty_response, not_found_response, HttpResponse, Pipeline};
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Error returned when an endpoint cannot be registered.
#[derive(Debug, Error)]
pub enum RegistrationError {
    /// The route conflicts with or is rejected by the router.
    #[error(transparent)]
    Route(#[from] InsertError),
}

/// Error returned when the server fails to start or serve.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured address could not be bound.
    #[error("failed to bind {addr}: {message}")]
    Bind {
        /// The configured bind address.
        addr: String,
        /// Description of the failure.
        message: String,
    },

    /// An I/O error occurred while serving.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Accumulates endpoint registrations before the server starts.
///
/// Each [`endpoint`](Self::endpoint) call compiles the definition and
/// handler into a pipeline, installs the route, and records the
/// descriptor. Duplicate method+path registrations fail.
pub struct ServerBuilder {
    config: ServerConfig,
    router: Router,
    pipelines: Vec<Pipeline>,
    descriptors: Vec<EndpointDescriptor>,
}

impl ServerBuilder {
    /// Creates a builder with the given configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            router: Router::new(),
            pipelines: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Registers an endpoint definition with its handler.
    ///
    /// The handler signature is fixed by the definition's type
    /// parameters; a mismatched handler does not compile.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when a route for the same method and
    /// path already exists, or the method is unsupported.
    pub fn endpoint<B, Q, C, H>(
        mut self,
        definition: EndpointDefinition<B, Q, C>,
        handler: H,
    ) -> Result<Self, RegistrationError>
    where
        B: FromBody,
        Q: FromQuery,
        C: Send + 'static,
        H: Handler<B, Q, C>,
    {
        let route = RouteId::new(self.pipelines.len());
        self.router
            .insert(definition.path().as_str(), definition.method(), route)?;

        debug!(
            endpoint = definition.meta_ref().name(),
            method = %definition.method(),
            path = definition.path().as_str(),
            "registered endpoint"
        );

        self.descriptors.push(definition.descriptor());
        self.pipelines.push(Pipeline::compile(
            &definition,
            handler,
            self.config.request_timeout(),
        ));
        Ok(self)
    }

    /// Finalizes registration into an immutable [`Server`].
    #[must_use]
    pub fn build(self) -> Server {
        Server {
            config: self.config,
            router: self.router,
            pipelines: self.pipelines,
            descriptors: self.descriptors,
        }
    }
}

impl std::fmt::Debug for ServerBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerBuilder")
            .field("config", &self.config)
            .field("endpoints", &self.pipelines.len())
            .finish()
    }
}

/// The immutable, serving-phase registry.
///
/// Once built, no endpoint can be added or removed; dispatch reads the
/// routing table without locking.
pub struct Server {
    config: ServerConfig,
    router: Router,
    pipelines: Vec<Pipeline>,
    descriptors: Vec<EndpointDescriptor>,
}

impl Server {
    /// Returns the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the registered endpoint descriptors in registration order.
    #[must_use]
    pub fn descriptors(&self) -> &[EndpointDescriptor] {
        &self.descriptors
    }

    /// Returns the number of registered endpoints.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    /// Returns `true` if no endpoints are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    /// Dispatches one request through the matched pipeline.
    ///
    /// This is the same path `run` uses for live connections; tests can
    /// call it directly without opening a socket.
    pub async fn dispatch(&self, request: Request<Bytes>) -> HttpResponse {
        let (parts, body) = request.into_parts();
        let method = parts.method.clone();
        let path = parts.uri.path().to_string();
        let request = RequestParts::from(parts);

        match self.router.match_route(&method, &path) {
            Some(matched) => {
                let pipeline = &self.pipelines[matched.route.index()];
                debug!(%method, path, endpoint = pipeline.name(), "dispatching");
                pipeline.run(request, matched.params, body).await
            }
            None => {
                debug!(%method, path, "no route matched");
                not_found_response(&path)
            }
        }
    }

    /// Runs the server until a SIGTERM or SIGINT is received.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the configured address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        let shutdown = ShutdownSignal::with_os_signals();
        self.run_with_shutdown(shutdown).await
    }

    /// Runs the server with a caller-controlled shutdown signal.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the configured address cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let addr = self
            .config
            .socket_addr()
            .map_err(|e| ServerError::Bind {
                addr: self.config.http_addr().to_string(),
                message: e.to_string(),
            })?;

        let listener = TcpListener::bind(addr).await.map_err(|e| ServerError::Bind {
            addr: addr.to_string(),
            message: e.to_string(),
        })?;

        info!(%addr, endpoints = self.pipelines.len(), "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    match accepted {
                        Ok((stream, remote_addr)) => {
                            let server = Arc::clone(&server);
                            let token = tracker.acquire();
                            let shutdown = shutdown.clone();

                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req: Request<Incoming>| {
                                    let server = Arc::clone(&server);
                                    async move { server.serve_request(req).await }
                                });

                                let conn = http1::Builder::new().serve_connection(io, service);
                                tokio::select! {
                                    result = conn => {
                                        if let Err(e) = result {
                                            warn!(%remote_addr, error = %e, "connection error");
                                        }
                                    }
                                    _ = shutdown.wait() => {
                                        debug!(%remote_addr, "connection closed for shutdown");
                                    }
                                }
                                drop(token);
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "failed to accept connection");
                        }
                    }
                }

                _ = shutdown.wait() => {
                    info!("shutdown signal received, stopping accept loop");
                    break;
                }
            }
        }

        let shutdown_timeout = server.config.shutdown_timeout();
        info!(
            active = tracker.active_connections(),
            timeout_secs = shutdown_timeout.as_secs(),
            "waiting for in-flight connections"
        );

        tokio::select! {
            _ = tracker.drained() => {
                info!("all connections closed");
            }
            _ = tokio::time::sleep(shutdown_timeout) => {
                warn!(
                    active = tracker.active_connections(),
                    "shutdown timeout reached with connections still active"
                );
            }
        }

        info!("server stopped");
        Ok(())
    }

    /// Collects the body and dispatches; the hyper service entry point.
    async fn serve_request(
        self: &Arc<Self>,
        request: Request<Incoming>,
    ) -> Result<HttpResponse, std::convert::Infallible> {
        let (parts, body) = request.into_parts();
        let body = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(e) => {
                warn!(error = %e, "failed to read request body");
                return Ok(empty_response(http::StatusCode::BAD_REQUEST));
            }
        };

        let request = Request::from_parts(parts, body);
        Ok(self.dispatch(request).await)
    }

    /// Returns the allowed methods for a path, if it matches any route.
    ///
    /// Useful for diagnostics; dispatch itself treats a method mismatch
    /// as not found.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Option<Vec<Method>> {
        self.router
            .match_path(path)
            .map(|(methods, _)| methods.allowed_methods())
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("config", &self.config)
            .field("endpoints", &self.pipelines.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use serde_json::json;
    use std::time::Duration;
    use trellis_core::{Endpoint, HandlerArgs, NoBody, NoQuery, Reply, Unauthenticated};

    fn test_server() -> Server {
        ServerBuilder::new(ServerConfig::default())
            .endpoint(
                Endpoint::get("/test").unwrap(),
                |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
                    Reply::json(StatusCode::OK, &json!({ "code": 200, "data": "test" }))
                },
            )
            .unwrap()
            .build()
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let handler = |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
            Reply::json(StatusCode::OK, &"x")
        };

        let result = ServerBuilder::new(ServerConfig::default())
            .endpoint(Endpoint::get("/test").unwrap(), handler)
            .unwrap()
            .endpoint(Endpoint::get("/test").unwrap(), handler);

        assert!(matches!(
            result,
            Err(RegistrationError::Route(InsertError::DuplicateRoute { .. }))
        ));
    }

    #[test]
    fn test_same_path_different_methods_allowed() {
        let handler = |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
            Reply::json(StatusCode::OK, &"x")
        };

        let server = ServerBuilder::new(ServerConfig::default())
            .endpoint(Endpoint::get("/thing").unwrap(), handler)
            .unwrap()
            .endpoint(Endpoint::post("/thing").unwrap(), handler)
            .unwrap()
            .build();

        assert_eq!(server.len(), 2);
        let allowed = server.allowed_methods("/thing").unwrap();
        assert!(allowed.contains(&Method::GET));
        assert!(allowed.contains(&Method::POST));
    }

    #[test]
    fn test_descriptors_keep_registration_order() {
        let handler = |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
            Reply::json(StatusCode::OK, &"x")
        };

        let server = ServerBuilder::new(ServerConfig::default())
            .endpoint(
                Endpoint::get("/b").unwrap().meta(trellis_core::EndpointMeta::new("getB", "b")),
                handler,
            )
            .unwrap()
            .endpoint(
                Endpoint::get("/a").unwrap().meta(trellis_core::EndpointMeta::new("getA", "a")),
                handler,
            )
            .unwrap()
            .build();

        let names: Vec<_> = server.descriptors().iter().map(|d| d.meta.name()).collect();
        assert_eq!(names, ["getB", "getA"]);
    }

    #[tokio::test]
    async fn test_dispatch_matched_route() {
        let server = test_server();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/test")
            .body(Bytes::new())
            .unwrap();

        let response = server.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dispatch_unknown_path_is_404() {
        let server = test_server();
        let request = Request::builder()
            .method(Method::GET)
            .uri("/nope")
            .body(Bytes::new())
            .unwrap();

        let response = server.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_dispatch_method_mismatch_is_404() {
        let server = test_server();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/test")
            .body(Bytes::new())
            .unwrap();

        let response = server.dispatch(request).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_address() {
        let server = ServerBuilder::new(
            ServerConfig::builder().http_addr("not-an-address").build(),
        )
        .build();

        let result = server.run_with_shutdown(ShutdownSignal::new()).await;
        assert!(matches!(result, Err(ServerError::Bind { .. })));
    }

    #[tokio::test]
    async fn test_run_and_shutdown() {
        let server = ServerBuilder::new(
            ServerConfig::builder()
                .http_addr("127.0.0.1:0")
                .shutdown_timeout(Duration::from_millis(100))
                .build(),
        )
        .build();

        let shutdown = ShutdownSignal::new();
        shutdown.trigger();

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            server.run_with_shutdown(shutdown),
        )
        .await;

        assert!(result.is_ok());
        assert!(result.unwrap().is_ok());
    }
}
