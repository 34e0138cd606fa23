//! HTTP Bearer authentication.

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use trellis_core::{BoxFuture, RequestParts, SchemeKind, SecurityScheme};

/// The credential prefix for Bearer authentication.
const PREFIX: &str = "Bearer ";

/// HTTP Bearer authentication scheme.
///
/// Matches requests whose `Authorization` header starts with `Bearer `
/// and passes the token to the user-supplied validator. A missing header
/// or wrong prefix rejects without invoking the validator.
///
/// # Example
///
/// ```rust
/// use trellis_auth::BearerScheme;
///
/// let scheme = BearerScheme::new(|token| async move {
///     (token == "TestToken123").then_some("service-account")
/// });
/// ```
pub struct BearerScheme<C> {
    /// Scheme name used in logs and documentation.
    name: String,
    /// Verifies a bearer token.
    validator: Arc<dyn Fn(String) -> BoxFuture<'static, Option<C>> + Send + Sync>,
}

impl<C> BearerScheme<C> {
    /// Creates a Bearer scheme with a token validator.
    ///
    /// The validator receives the token (without the `Bearer ` prefix)
    /// and returns the caller identity, or `None` to reject.
    pub fn new<F, Fut>(validator: F) -> Self
    where
        F: Fn(String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<C>> + Send + 'static,
    {
        Self {
            name: "bearer".to_string(),
            validator: Arc::new(move |token| Box::pin(validator(token))),
        }
    }

    /// Overrides the scheme name used in logs and documentation.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<C: Send + 'static> SecurityScheme for BearerScheme<C> {
    type Identity = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SchemeKind {
        SchemeKind::Bearer
    }

    fn matches(&self, request: &RequestParts) -> bool {
        request
            .header("authorization")
            .is_some_and(|v| v.starts_with(PREFIX))
    }

    fn authenticate(&self, request: &RequestParts) -> BoxFuture<'static, Option<Self::Identity>> {
        let token = request
            .header("authorization")
            .and_then(|v| v.strip_prefix(PREFIX))
            .map(ToString::to_string);

        match token {
            Some(token) => (self.validator)(token),
            None => {
                debug!(scheme = %self.name, "missing bearer token");
                Box::pin(async { None })
            }
        }
    }
}
