//! HTTP Basic authentication.

use std::future::Future;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::debug;

use trellis_core::{BoxFuture, RequestParts, SchemeKind, SecurityScheme};

/// The credential prefix for Basic authentication.
const PREFIX: &str = "Basic ";

/// HTTP Basic authentication scheme.
///
/// Matches requests whose `Authorization` header starts with `Basic `,
/// decodes the base64 `user:password` pair, and passes it to the
/// user-supplied validator. Decode failures reject without invoking the
/// validator.
///
/// # Example
///
/// ```rust
/// use trellis_auth::BasicScheme;
///
/// #[derive(Clone)]
/// struct User { name: String }
///
/// let scheme = BasicScheme::new(|user, password| async move {
///     (user == "Test" && password == "TestPW").then(|| User { name: user })
/// });
/// ```
pub struct BasicScheme<C> {
    /// Scheme name used in logs and documentation.
    name: String,
    /// Verifies a decoded `(user, password)` pair.
    validator: Arc<dyn Fn(String, String) -> BoxFuture<'static, Option<C>> + Send + Sync>,
}

impl<C> BasicScheme<C> {
    /// Creates a Basic scheme with a credential validator.
    ///
    /// The validator receives the decoded user and password and returns
    /// the caller identity, or `None` to reject.
    pub fn new<F, Fut>(validator: F) -> Self
    where
        F: Fn(String, String) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Option<C>> + Send + 'static,
    {
        Self {
            name: "basic".to_string(),
            validator: Arc::new(move |user, password| Box::pin(validator(user, password))),
        }
    }

    /// Overrides the scheme name used in logs and documentation.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Decodes a base64 `user:password` pair.
fn decode_credentials(encoded: &str) -> Option<(String, String)> {
    let bytes = BASE64.decode(encoded).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (user, password) = text.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

impl<C: Send + 'static> SecurityScheme for BasicScheme<C> {
    type Identity = C;

    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> SchemeKind {
        SchemeKind::Basic
    }

    fn matches(&self, request: &RequestParts) -> bool {
        request
            .header("authorization")
            .is_some_and(|v| v.starts_with(PREFIX))
    }

    fn authenticate(&self, request: &RequestParts) -> BoxFuture<'static, Option<Self::Identity>> {
        let credentials = request
            .header("authorization")
            .and_then(|v| v.strip_prefix(PREFIX))
            .and_then(decode_credentials);

        match credentials {
            Some((user, password)) => (self.validator)(user, password),
            None => {
                debug!(scheme = %self.name, "malformed basic credentials");
                Box::pin(async { None })
            }
        }
    }
}
