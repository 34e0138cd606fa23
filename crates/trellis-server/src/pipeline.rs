//! Per-endpoint dispatch pipelines.
//!
//! At registration time each endpoint definition and its handler are
//! compiled into an erased pipeline. The pipeline runs the same fixed
//! sequence for every request:
//!
//! 1. authentication (only when schemes are declared) — rejection is a
//!    uniform `401` with an empty body;
//! 2. query validation (only when a query schema is declared) — failure
//!    is `400` with `{ "message": "Query parameters invalid", "error": … }`;
//! 3. body validation (only when a body schema is declared) — failure is
//!    `400` with `{ "message": "Body invalid", "error": … }`;
//! 4. handler invocation under a timeout, with panic recovery, followed
//!    by serialization of the returned [`Reply`].
//!
//! Compiling the same definition and handler always yields a pipeline
//! with identical behavior; nothing is sampled or reordered.

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures_util::FutureExt;
use http::{Response, StatusCode};
use http_body_util::Full;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use trellis_core::{
    ApiError, BoxFuture, CallerSource, EndpointDefinition, FromBody, FromQuery, Handler,
    HandlerArgs, Reply, RequestContext, RequestParts, ResponseModel, Schema, ValidationFailure,
    ValidationIssue,
};
use trellis_router::Params;

/// The response body type produced by pipelines.
pub type ResponseBody = Full<Bytes>;

/// The HTTP response type produced by pipelines.
pub type HttpResponse = Response<ResponseBody>;

/// An erased, compiled pipeline for one registered endpoint.
pub(crate) struct Pipeline {
    /// The endpoint name, for logging.
    name: Arc<str>,
    /// The erased dispatch function.
    run: Arc<
        dyn Fn(RequestParts, Params, Bytes) -> BoxFuture<'static, HttpResponse> + Send + Sync,
    >,
}

impl Pipeline {
    /// Compiles a definition and handler into an erased pipeline.
    pub(crate) fn compile<B, Q, C, H>(
        definition: &EndpointDefinition<B, Q, C>,
        handler: H,
        timeout: Duration,
    ) -> Self
    where
        B: FromBody,
        Q: FromQuery,
        C: Send + 'static,
        H: Handler<B, Q, C>,
    {
        let name: Arc<str> = Arc::from(definition.meta_ref().name());
        let caller_source = definition.caller_source().clone();
        let body_schema = definition.body_schema().cloned();
        let query_schema = definition.query_schema().cloned();
        let responses = definition.responses().clone();
        let handler = Arc::new(handler);

        let endpoint = Arc::clone(&name);
        let run = Arc::new(move |request: RequestParts, params: Params, body: Bytes| {
            let endpoint = Arc::clone(&endpoint);
            let caller_source = caller_source.clone();
            let body_schema = body_schema.clone();
            let query_schema = query_schema.clone();
            let responses = responses.clone();
            let handler = Arc::clone(&handler);

            let future: BoxFuture<'static, HttpResponse> = Box::pin(async move {
                dispatch(
                    &endpoint,
                    &caller_source,
                    body_schema.as_ref(),
                    query_schema.as_ref(),
                    &responses,
                    handler.as_ref(),
                    timeout,
                    request,
                    params,
                    &body,
                )
                .await
            });
            future
        });

        Self { name, run }
    }

    /// Returns the endpoint name.
    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    /// Runs the pipeline for one request.
    pub(crate) fn run(
        &self,
        request: RequestParts,
        params: Params,
        body: Bytes,
    ) -> BoxFuture<'static, HttpResponse> {
        (self.run)(request, params, body)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline").field("name", &self.name).finish()
    }
}

/// Runs the fixed step sequence for one request.
#[allow(clippy::too_many_arguments)]
async fn dispatch<B, Q, C, H>(
    endpoint: &str,
    caller_source: &CallerSource<C>,
    body_schema: Option<&Schema>,
    query_schema: Option<&Schema>,
    responses: &BTreeMap<StatusCode, ResponseModel>,
    handler: &H,
    timeout: Duration,
    request: RequestParts,
    params: Params,
    body: &Bytes,
) -> HttpResponse
where
    B: FromBody,
    Q: FromQuery,
    C: Send + 'static,
    H: Handler<B, Q, C>,
{
    let context = RequestContext::new().with_endpoint(endpoint);
    let request_id = context.request_id();

    // Step 1: authentication. Scheme mismatch and credential rejection
    // are indistinguishable on the wire.
    let caller = match caller_source.resolve(&request).await {
        Some(caller) => caller,
        None => {
            debug!(%request_id, endpoint, "authentication rejected");
            return empty_response(StatusCode::UNAUTHORIZED);
        }
    };

    // Step 2: query validation against the folded string-valued object.
    let query_value = match query_schema {
        Some(schema) => {
            let object = request.query_object();
            if let Err(failure) = schema.validate(&object) {
                debug!(%request_id, endpoint, %failure, "query validation failed");
                return validation_response("Query parameters invalid", &failure);
            }
            Some(object)
        }
        None => None,
    };

    // Step 3: body validation. An unparseable body is a validation
    // failure, not a transport error.
    let body_value = match body_schema {
        Some(schema) => {
            let parsed: Value = match serde_json::from_slice(body) {
                Ok(value) => value,
                Err(e) => {
                    debug!(%request_id, endpoint, error = %e, "body is not valid JSON");
                    let failure = ValidationFailure {
                        issues: vec![ValidationIssue {
                            path: String::new(),
                            message: e.to_string(),
                        }],
                    };
                    return validation_response("Body invalid", &failure);
                }
            };
            if let Err(failure) = schema.validate(&parsed) {
                debug!(%request_id, endpoint, %failure, "body validation failed");
                return validation_response("Body invalid", &failure);
            }
            Some(parsed)
        }
        None => None,
    };

    let body_arg = match B::from_body(body_value.as_ref()) {
        Ok(body) => body,
        Err(e) => return error_response(&e, &context),
    };
    let query_arg = match Q::from_query(query_value.as_ref()) {
        Ok(query) => query,
        Err(e) => return error_response(&e, &context),
    };

    let args = HandlerArgs {
        request,
        params,
        query: query_arg,
        body: body_arg,
        caller,
        context: context.clone(),
    };

    // Step 4: the handler, bounded by the timeout and shielded against
    // panics.
    let invocation = AssertUnwindSafe(handler.call(args)).catch_unwind();
    match tokio::time::timeout(timeout, invocation).await {
        Ok(Ok(Ok(reply))) => {
            debug!(
                %request_id,
                endpoint,
                status = %reply.status(),
                elapsed_ms = context.elapsed().as_millis() as u64,
                "request completed"
            );
            serialize_reply(&reply, responses, &context)
        }
        Ok(Ok(Err(e))) => {
            warn!(%request_id, endpoint, error = %e, "handler returned an error");
            error_response(&e, &context)
        }
        Ok(Err(_panic)) => {
            error!(%request_id, endpoint, "handler panicked");
            error_response(&ApiError::internal("handler panicked"), &context)
        }
        Err(_elapsed) => {
            warn!(%request_id, endpoint, timeout_ms = timeout.as_millis() as u64, "handler timed out");
            error_response(&ApiError::timeout("handler exceeded deadline"), &context)
        }
    }
}

/// Serializes a handler reply: status first, then headers, then payload.
///
/// A reply carrying a malformed header name or value cannot become a
/// response; that is a handler bug and maps to `500`, never to a
/// default response that drops the declared status.
fn serialize_reply(
    reply: &Reply,
    responses: &BTreeMap<StatusCode, ResponseModel>,
    context: &RequestContext,
) -> HttpResponse {
    let mut builder = Response::builder().status(reply.status());
    for (name, value) in reply.headers() {
        builder = builder.header(name, value);
    }

    let built = match reply.payload() {
        Some(payload) => {
            let content_type = responses
                .get(&reply.status())
                .map_or("application/json", |model| model.kind().content_type());
            builder
                .header("content-type", content_type)
                .body(Full::new(payload.clone()))
        }
        None => builder.body(Full::new(Bytes::new())),
    };

    match built {
        Ok(response) => response,
        Err(e) => {
            error!(request_id = %context.request_id(), error = %e, "reply has malformed headers");
            error_response(&ApiError::internal("reply has malformed headers"), context)
        }
    }
}

/// A response with no body at all.
pub(crate) fn empty_response(status: StatusCode) -> HttpResponse {
    Response::builder()
        .status(status)
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// A JSON response from a serializable value.
pub(crate) fn json_response(status: StatusCode, body: &Value) -> HttpResponse {
    Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Full::new(Bytes::from(body.to_string())))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// The `400` body shape for schema validation failures.
fn validation_response(message: &str, failure: &ValidationFailure) -> HttpResponse {
    json_response(
        StatusCode::BAD_REQUEST,
        &json!({ "message": message, "error": failure }),
    )
}

/// Maps an [`ApiError`] to its wire form.
fn error_response(error: &ApiError, context: &RequestContext) -> HttpResponse {
    match error {
        // Authentication failures never leak detail.
        ApiError::Authentication { .. } => empty_response(StatusCode::UNAUTHORIZED),
        ApiError::Validation {
            message,
            failure: Some(failure),
        } => validation_response(message, failure),
        _ => {
            let request_id = context.request_id().to_string();
            let envelope = error.to_envelope(Some(&request_id));
            let body = serde_json::to_value(&envelope)
                .unwrap_or_else(|_| json!({ "message": "internal error" }));
            json_response(error.status_code(), &body)
        }
    }
}

/// The `404` response for unmatched paths.
pub(crate) fn not_found_response(path: &str) -> HttpResponse {
    json_response(
        StatusCode::NOT_FOUND,
        &json!({ "message": "Not found", "path": path }),
    )
}
