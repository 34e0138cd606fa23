//! Pluggable authentication schemes.
//!
//! A [`SecurityScheme`] inspects a request's headers and verifies the
//! credentials it finds, producing a typed caller identity. Endpoints
//! declare schemes in order; evaluation is first-match-wins — the first
//! scheme whose credential format is present is the only one asked to
//! verify, and every failure mode collapses into the same rejection so
//! callers cannot distinguish a missing header from a bad credential.

use std::sync::Arc;

use tracing::trace;

use crate::handler::BoxFuture;
use crate::request::RequestParts;

/// Marker caller type for endpoints without security schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unauthenticated;

/// The well-known kind of a security scheme.
///
/// Used for documentation output; the dispatch pipeline only relies on
/// the scheme's own matching logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemeKind {
    /// HTTP Basic authentication (`Authorization: Basic <base64>`).
    Basic,
    /// HTTP Bearer authentication (`Authorization: Bearer <token>`).
    Bearer,
}

impl SchemeKind {
    /// Returns the lowercase scheme name used in OpenAPI documents.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Bearer => "bearer",
        }
    }
}

impl std::fmt::Display for SchemeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authentication scheme producing a typed caller identity.
///
/// All schemes attached to one endpoint must share the same `Identity`
/// type, so the handler sees the correct type whichever scheme matches.
pub trait SecurityScheme: Send + Sync + 'static {
    /// The caller identity produced on successful authentication.
    type Identity: Send + 'static;

    /// A short name for this scheme, used in logs and documentation.
    fn name(&self) -> &str;

    /// The well-known kind of this scheme.
    fn kind(&self) -> SchemeKind;

    /// Returns true if the request carries credentials in this scheme's
    /// format. Matching alone never authenticates.
    fn matches(&self, request: &RequestParts) -> bool;

    /// Verifies the request's credentials.
    ///
    /// Returns `None` to reject. Implementations must not be invoked for
    /// requests where [`matches`](Self::matches) is false.
    fn authenticate(&self, request: &RequestParts) -> BoxFuture<'static, Option<Self::Identity>>;
}

/// Evaluates schemes first-match-wins.
///
/// The first scheme in declaration order whose format matches is the only
/// one evaluated; its verdict is final. Returns `None` when no scheme
/// matches or the matching scheme rejects the credentials.
pub async fn authenticate_first_match<C: Send + 'static>(
    schemes: &[Arc<dyn SecurityScheme<Identity = C>>],
    request: &RequestParts,
) -> Option<C> {
    let Some(scheme) = schemes.iter().find(|s| s.matches(request)) else {
        trace!("no security scheme matched the request");
        return None;
    };
    trace!(scheme = scheme.name(), "evaluating matched security scheme");
    scheme.authenticate(request).await
}

/// How an endpoint obtains its caller identity.
///
/// Endpoints without security schemes construct the identity directly
/// (the constructor is captured while the caller type is still concrete,
/// so no trait bound on `C` is needed); endpoints with schemes evaluate
/// them first-match-wins.
pub enum CallerSource<C> {
    /// No schemes declared; every request gets this identity.
    Anonymous(fn() -> C),
    /// Declared schemes, evaluated in order.
    Schemes(Vec<Arc<dyn SecurityScheme<Identity = C>>>),
}

// Not derived: both variants clone without a `C: Clone` bound.
impl<C> Clone for CallerSource<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Anonymous(make) => Self::Anonymous(*make),
            Self::Schemes(schemes) => Self::Schemes(schemes.clone()),
        }
    }
}

impl<C: Send + 'static> CallerSource<C> {
    /// Resolves the caller identity for a request.
    ///
    /// Returns `None` when schemes are declared and none accepts the
    /// request; anonymous endpoints never reject.
    pub async fn resolve(&self, request: &RequestParts) -> Option<C> {
        match self {
            Self::Anonymous(make) => Some(make()),
            Self::Schemes(schemes) => authenticate_first_match(schemes, request).await,
        }
    }

    /// Returns the declared schemes, empty for anonymous endpoints.
    #[must_use]
    pub fn schemes(&self) -> &[Arc<dyn SecurityScheme<Identity = C>>] {
        match self {
            Self::Anonymous(_) => &[],
            Self::Schemes(schemes) => schemes,
        }
    }
}

impl<C> std::fmt::Debug for CallerSource<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anonymous(_) => f.write_str("CallerSource::Anonymous"),
            Self::Schemes(schemes) => write!(f, "CallerSource::Schemes({})", schemes.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};

    struct HeaderScheme {
        name: &'static str,
        prefix: &'static str,
        accept: &'static str,
    }

    impl SecurityScheme for HeaderScheme {
        type Identity = String;

        fn name(&self) -> &str {
            self.name
        }

        fn kind(&self) -> SchemeKind {
            SchemeKind::Bearer
        }

        fn matches(&self, request: &RequestParts) -> bool {
            request
                .header("authorization")
                .is_some_and(|v| v.starts_with(self.prefix))
        }

        fn authenticate(
            &self,
            request: &RequestParts,
        ) -> BoxFuture<'static, Option<Self::Identity>> {
            let header = request.header("authorization").map(ToString::to_string);
            let accept = self.accept.to_string();
            let prefix = self.prefix.to_string();
            Box::pin(async move {
                let token = header?.strip_prefix(&prefix)?.to_string();
                (token == accept).then(|| format!("caller:{token}"))
            })
        }
    }

    fn request_with_auth(value: Option<&str>) -> RequestParts {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert("authorization", v.parse().unwrap());
        }
        RequestParts::new(Method::GET, Uri::from_static("/"), headers)
    }

    fn schemes() -> Vec<Arc<dyn SecurityScheme<Identity = String>>> {
        vec![
            Arc::new(HeaderScheme {
                name: "alpha",
                prefix: "Alpha ",
                accept: "a-token",
            }),
            Arc::new(HeaderScheme {
                name: "beta",
                prefix: "Beta ",
                accept: "b-token",
            }),
        ]
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let schemes = schemes();

        let req = request_with_auth(Some("Alpha a-token"));
        let caller = authenticate_first_match(&schemes, &req).await;
        assert_eq!(caller, Some("caller:a-token".to_string()));

        let req = request_with_auth(Some("Beta b-token"));
        let caller = authenticate_first_match(&schemes, &req).await;
        assert_eq!(caller, Some("caller:b-token".to_string()));
    }

    #[tokio::test]
    async fn test_matching_scheme_verdict_is_final() {
        let schemes = schemes();

        // Alpha matches but rejects; Beta is never consulted
        let req = request_with_auth(Some("Alpha wrong"));
        let caller = authenticate_first_match(&schemes, &req).await;
        assert_eq!(caller, None);
    }

    #[tokio::test]
    async fn test_no_scheme_matches() {
        let schemes = schemes();

        let req = request_with_auth(Some("Gamma token"));
        assert!(authenticate_first_match(&schemes, &req).await.is_none());

        let req = request_with_auth(None);
        assert!(authenticate_first_match(&schemes, &req).await.is_none());
    }

    #[test]
    fn test_scheme_kind_display() {
        assert_eq!(SchemeKind::Basic.to_string(), "basic");
        assert_eq!(SchemeKind::Bearer.to_string(), "bearer");
    }

    #[tokio::test]
    async fn test_anonymous_source_never_rejects() {
        let source: CallerSource<Unauthenticated> = CallerSource::Anonymous(|| Unauthenticated);
        let req = request_with_auth(None);
        assert_eq!(source.resolve(&req).await, Some(Unauthenticated));
        assert!(source.schemes().is_empty());
    }

    #[tokio::test]
    async fn test_scheme_source_delegates() {
        let source = CallerSource::Schemes(schemes());

        let req = request_with_auth(Some("Alpha a-token"));
        assert_eq!(
            source.resolve(&req).await,
            Some("caller:a-token".to_string())
        );

        let req = request_with_auth(None);
        assert!(source.resolve(&req).await.is_none());
        assert_eq!(source.schemes().len(), 2);
    }
}
