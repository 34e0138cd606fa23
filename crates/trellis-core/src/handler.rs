//! Handler traits and argument bundle.
//!
//! The handler signature for an endpoint is determined by the endpoint
//! definition's type parameters: a definition with body `B`, query `Q`,
//! and caller `C` accepts exactly a `Handler<B, Q, C>`. Any async
//! function or closure taking [`HandlerArgs<B, Q, C>`] and returning
//! `Result<Reply, ApiError>` qualifies through the blanket impl.

use std::future::Future;
use std::pin::Pin;

use trellis_router::Params;

use crate::context::RequestContext;
use crate::error::ApiError;
use crate::request::RequestParts;
use crate::response::Reply;

/// A boxed future, as returned by erased async callbacks.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Everything a handler receives for one request.
///
/// Path parameters are always strings; `query`, `body`, and `caller` are
/// the types fixed by the endpoint definition.
#[derive(Debug)]
pub struct HandlerArgs<B, Q, C> {
    /// The non-body parts of the request.
    pub request: RequestParts,
    /// Extracted path parameters.
    pub params: Params,
    /// The typed query parameters.
    pub query: Q,
    /// The typed request body.
    pub body: B,
    /// The authenticated caller identity.
    pub caller: C,
    /// Per-request context.
    pub context: RequestContext,
}

/// An endpoint handler for a definition with body `B`, query `Q`, and
/// caller `C`.
///
/// Implemented for any `Fn(HandlerArgs<B, Q, C>) -> Future<Output =
/// Result<Reply, ApiError>>` that is `Send + Sync`.
pub trait Handler<B, Q, C>: Send + Sync + 'static {
    /// Invokes the handler.
    fn call(&self, args: HandlerArgs<B, Q, C>) -> BoxFuture<'static, Result<Reply, ApiError>>;
}

impl<F, Fut, B, Q, C> Handler<B, Q, C> for F
where
    F: Fn(HandlerArgs<B, Q, C>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, ApiError>> + Send + 'static,
{
    fn call(&self, args: HandlerArgs<B, Q, C>) -> BoxFuture<'static, Result<Reply, ApiError>> {
        Box::pin(self(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{NoBody, NoQuery};
    use crate::security::Unauthenticated;
    use http::{HeaderMap, Method, StatusCode, Uri};

    fn args() -> HandlerArgs<NoBody, NoQuery, Unauthenticated> {
        HandlerArgs {
            request: RequestParts::new(Method::GET, Uri::from_static("/test"), HeaderMap::new()),
            params: Params::new(),
            query: NoQuery,
            body: NoBody,
            caller: Unauthenticated,
            context: RequestContext::new(),
        }
    }

    #[tokio::test]
    async fn test_async_closure_is_a_handler() {
        let handler = |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
            Reply::json(StatusCode::OK, &"test")
        };

        let reply = handler.call(args()).await.unwrap();
        assert_eq!(reply.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_handler_error_propagates() {
        let handler = |_args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async {
            Err::<Reply, _>(ApiError::not_found("nothing here"))
        };

        let err = handler.call(args()).await.unwrap_err();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_handler_sees_params() {
        let mut params = Params::new();
        params.push("id", "42");
        let mut a = args();
        a.params = params;

        let handler = |args: HandlerArgs<NoBody, NoQuery, Unauthenticated>| async move {
            let id = args
                .params
                .get("id")
                .ok_or_else(|| ApiError::validation("missing id"))?
                .to_string();
            Reply::json(StatusCode::OK, &id)
        };

        let reply = handler.call(a).await.unwrap();
        let body: String = serde_json::from_slice(reply.payload().unwrap()).unwrap();
        assert_eq!(body, "42");
    }
}
