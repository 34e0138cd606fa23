//! Radix tree path router for Trellis endpoint dispatch.
//!
//! This crate matches request paths against registered patterns using a
//! radix tree (compressed trie). Patterns use `:name` placeholder segments
//! for path parameters, and static segments always win over placeholders.
//!
//! Matched routes resolve to a [`RouteId`] — an index into whatever table
//! the caller keeps its per-route dispatch state in — plus the extracted
//! [`Params`].
//!
//! # Example
//!
//! ```rust
//! use trellis_router::{RouteId, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
//! router.insert("/users/:id", &Method::GET, RouteId::new(1)).unwrap();
//!
//! let m = router.match_route(&Method::GET, "/users/123").unwrap();
//! assert_eq!(m.route, RouteId::new(1));
//! assert_eq!(m.params.get("id"), Some("123"));
//! ```
//!
//! # Route Priority
//!
//! When both could match, a static segment (e.g. `/users/me`) takes
//! priority over a parameter segment (e.g. `/users/:id`). Trailing
//! slashes are normalized away before matching.

mod method_table;
mod node;
mod params;
mod router;

pub use method_table::MethodTable;
pub use node::Node;
pub use params::Params;
pub use router::{InsertError, Router};

/// Identifier for a registered route.
///
/// The router does not interpret this value; callers typically use it as
/// an index into a registration-ordered table of dispatch pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(usize);

impl RouteId {
    /// Creates a route identifier from an index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the underlying index.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A matched route with its identifier and extracted parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The identifier registered for the matched route
    pub route: RouteId,
    /// Extracted path parameters
    pub params: Params,
}

impl RouteMatch {
    /// Creates a new route match.
    #[must_use]
    pub fn new(route: RouteId, params: Params) -> Self {
        Self { route, params }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    #[test]
    fn test_basic_routing() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
        router.insert("/users/:id", &Method::GET, RouteId::new(1)).unwrap();

        let m = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(m.route, RouteId::new(0));
        assert!(m.params.is_empty());

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(m.route, RouteId::new(1));
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_method_routing() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
        router.insert("/users", &Method::POST, RouteId::new(1)).unwrap();

        let get = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(get.route, RouteId::new(0));

        let post = router.match_route(&Method::POST, "/users").unwrap();
        assert_eq!(post.route, RouteId::new(1));

        assert!(router.match_route(&Method::DELETE, "/users").is_none());
    }

    #[test]
    fn test_no_match() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        assert!(router.match_route(&Method::GET, "/posts").is_none());
    }

    #[test]
    fn test_multiple_params() {
        let mut router = Router::new();
        router
            .insert("/orgs/:orgId/users/:userId", &Method::GET, RouteId::new(0))
            .unwrap();

        let m = router
            .match_route(&Method::GET, "/orgs/acme/users/123")
            .unwrap();
        assert_eq!(m.route, RouteId::new(0));
        assert_eq!(m.params.get("orgId"), Some("acme"));
        assert_eq!(m.params.get("userId"), Some("123"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        let err = router
            .insert("/users", &Method::GET, RouteId::new(1))
            .unwrap_err();
        assert!(matches!(err, InsertError::DuplicateRoute { .. }));
    }
}
