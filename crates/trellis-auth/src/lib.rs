//! # Trellis Auth
//!
//! Ready-made authentication schemes for Trellis endpoints.
//!
//! This crate provides [`BasicScheme`] and [`BearerScheme`], both generic
//! over the caller identity type their validator produces. Endpoints may
//! declare several schemes; the dispatch pipeline evaluates them
//! first-match-wins, and all schemes on one endpoint must agree on the
//! identity type.
//!
//! # Example
//!
//! ```rust
//! use trellis_auth::{BasicScheme, BearerScheme};
//! use trellis_core::Endpoint;
//!
//! #[derive(Clone)]
//! struct Caller { subject: String }
//!
//! let endpoint = Endpoint::get("/secure")
//!     .unwrap()
//!     .security(BasicScheme::new(|user, password| async move {
//!         (user == "Test" && password == "TestPW")
//!             .then(|| Caller { subject: user })
//!     }))
//!     .or_security(BearerScheme::new(|token| async move {
//!         (token == "TestToken123").then(|| Caller {
//!             subject: "token-caller".to_string(),
//!         })
//!     }));
//! ```

#![doc(html_root_url = "https://docs.rs/trellis-auth/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod basic;
mod bearer;

pub use basic::BasicScheme;
pub use bearer::BearerScheme;

// Re-exported so scheme implementors only need this crate in scope.
pub use trellis_core::{authenticate_first_match, SchemeKind, SecurityScheme, Unauthenticated};

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};
    use std::sync::Arc;
    use trellis_core::RequestParts;

    fn request_with_auth(value: Option<&str>) -> RequestParts {
        let mut headers = HeaderMap::new();
        if let Some(v) = value {
            headers.insert("authorization", v.parse().unwrap());
        }
        RequestParts::new(Method::GET, Uri::from_static("/"), headers)
    }

    fn mixed_schemes() -> Vec<Arc<dyn SecurityScheme<Identity = String>>> {
        vec![
            Arc::new(BasicScheme::new(|user, password| async move {
                (user == "Test" && password == "TestPW").then(|| format!("basic:{user}"))
            })),
            Arc::new(BearerScheme::new(|token| async move {
                (token == "TestToken123").then(|| "bearer:service".to_string())
            })),
        ]
    }

    #[tokio::test]
    async fn test_basic_and_bearer_coexist() {
        let schemes = mixed_schemes();

        // base64("Test:TestPW")
        let req = request_with_auth(Some("Basic VGVzdDpUZXN0UFc="));
        let caller = authenticate_first_match(&schemes, &req).await;
        assert_eq!(caller, Some("basic:Test".to_string()));

        let req = request_with_auth(Some("Bearer TestToken123"));
        let caller = authenticate_first_match(&schemes, &req).await;
        assert_eq!(caller, Some("bearer:service".to_string()));
    }

    #[tokio::test]
    async fn test_unknown_scheme_rejected() {
        let schemes = mixed_schemes();
        let req = request_with_auth(Some("Digest abc"));
        assert!(authenticate_first_match(&schemes, &req).await.is_none());
    }
}
