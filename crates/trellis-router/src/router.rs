//! High-level router API.
//!
//! This module provides the main [`Router`] struct which is the primary
//! interface for registering and matching routes.

use http::Method;

use crate::method_table::MethodTable;
use crate::node::Node;
use crate::params::Params;
use crate::{RouteId, RouteMatch};

/// Error returned when a route cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InsertError {
    /// A route is already registered for this method and path.
    #[error("route already registered for {method} {path}")]
    DuplicateRoute {
        /// The conflicting HTTP method
        method: Method,
        /// The conflicting path pattern
        path: String,
    },

    /// The HTTP method is not supported by the router.
    #[error("unsupported method {method} for {path}")]
    UnsupportedMethod {
        /// The rejected HTTP method
        method: Method,
        /// The path pattern being registered
        path: String,
    },
}

/// A radix tree router mapping method + path to route identifiers.
///
/// Routes are matched in O(k) time where k is the number of path segments.
///
/// # Example
///
/// ```rust
/// use trellis_router::{RouteId, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
/// router.insert("/users/:id", &Method::GET, RouteId::new(1)).unwrap();
///
/// let m = router.match_route(&Method::GET, "/users/123").unwrap();
/// assert_eq!(m.route, RouteId::new(1));
/// assert_eq!(m.params.get("id"), Some("123"));
/// ```
///
/// # Route Priority
///
/// When multiple patterns could match, static segments (e.g. `/users/me`)
/// take priority over parameter segments (e.g. `/users/:id`).
#[derive(Debug, Clone)]
pub struct Router {
    /// Root node of the radix tree
    root: Node,
    /// Number of routes registered
    route_count: usize,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers a route for a method and path pattern.
    ///
    /// # Errors
    ///
    /// Returns [`InsertError::DuplicateRoute`] if a route is already
    /// registered for this method and path, and
    /// [`InsertError::UnsupportedMethod`] for methods outside the
    /// supported set.
    pub fn insert(&mut self, path: &str, method: &Method, route: RouteId) -> Result<(), InsertError> {
        match self.root.entry(path).set(method, route) {
            Ok(()) => {
                self.route_count += 1;
                Ok(())
            }
            Err(Some(_)) => Err(InsertError::DuplicateRoute {
                method: method.clone(),
                path: path.to_string(),
            }),
            Err(None) => Err(InsertError::UnsupportedMethod {
                method: method.clone(),
                path: path.to_string(),
            }),
        }
    }

    /// Matches a path and method against the router.
    ///
    /// Returns a [`RouteMatch`] if a matching route is found.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let (methods, params) = self.root.match_path(path)?;
        let route = methods.get(method)?;
        Some(RouteMatch::new(route, params))
    }

    /// Matches a path against the router (without method).
    ///
    /// Returns the method table and extracted parameters if a path matches.
    /// Useful for checking allowed methods or generating 405 responses.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodTable, Params)> {
        self.root.match_path(path)
    }

    /// Returns the number of routes registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_router_new() {
        let router = Router::new();
        assert!(router.is_empty());
        assert_eq!(router.len(), 0);
    }

    #[test]
    fn test_router_insert() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
        assert_eq!(router.len(), 1);
        assert!(!router.is_empty());
    }

    #[test]
    fn test_router_match_static() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        let m = router.match_route(&Method::GET, "/users").unwrap();
        assert_eq!(m.route, RouteId::new(0));
    }

    #[test]
    fn test_router_match_param() {
        let mut router = Router::new();
        router.insert("/users/:id", &Method::GET, RouteId::new(0)).unwrap();

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(m.route, RouteId::new(0));
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_router_method_not_allowed() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        // Path matches but method doesn't
        assert!(router.match_route(&Method::POST, "/users").is_none());

        // Can still check if path exists
        let (methods, _) = router.match_path("/users").unwrap();
        assert_eq!(methods.allowed_methods(), vec![Method::GET]);
    }

    #[test]
    fn test_router_duplicate_route() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        let err = router
            .insert("/users", &Method::GET, RouteId::new(1))
            .unwrap_err();
        assert_eq!(
            err,
            InsertError::DuplicateRoute {
                method: Method::GET,
                path: "/users".to_string(),
            }
        );
        // Failed insert does not bump the route count
        assert_eq!(router.len(), 1);
    }

    #[test]
    fn test_router_unsupported_method() {
        let mut router = Router::new();
        let err = router
            .insert("/debug", &Method::TRACE, RouteId::new(0))
            .unwrap_err();
        assert!(matches!(err, InsertError::UnsupportedMethod { .. }));
    }

    #[test]
    fn test_router_same_path_different_methods() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();
        router.insert("/users", &Method::POST, RouteId::new(1)).unwrap();
        router.insert("/users", &Method::DELETE, RouteId::new(2)).unwrap();

        assert_eq!(
            router.match_route(&Method::GET, "/users").map(|m| m.route),
            Some(RouteId::new(0))
        );
        assert_eq!(
            router.match_route(&Method::POST, "/users").map(|m| m.route),
            Some(RouteId::new(1))
        );
        assert_eq!(
            router
                .match_route(&Method::DELETE, "/users")
                .map(|m| m.route),
            Some(RouteId::new(2))
        );
    }

    #[test]
    fn test_router_complex_paths() {
        let mut router = Router::new();
        router.insert("/api/v1/users", &Method::GET, RouteId::new(0)).unwrap();
        router
            .insert("/api/v1/users/:userId", &Method::GET, RouteId::new(1))
            .unwrap();
        router
            .insert("/api/v1/users/:userId/posts", &Method::GET, RouteId::new(2))
            .unwrap();
        router
            .insert(
                "/api/v1/users/:userId/posts/:postId",
                &Method::GET,
                RouteId::new(3),
            )
            .unwrap();

        let m = router
            .match_route(&Method::GET, "/api/v1/users/123/posts/456")
            .unwrap();
        assert_eq!(m.route, RouteId::new(3));
        assert_eq!(m.params.get("userId"), Some("123"));
        assert_eq!(m.params.get("postId"), Some("456"));
    }

    #[test]
    fn test_router_static_vs_param_priority() {
        let mut router = Router::new();
        router.insert("/users/me", &Method::GET, RouteId::new(0)).unwrap();
        router.insert("/users/:id", &Method::GET, RouteId::new(1)).unwrap();

        let m = router.match_route(&Method::GET, "/users/me").unwrap();
        assert_eq!(m.route, RouteId::new(0));

        let m = router.match_route(&Method::GET, "/users/123").unwrap();
        assert_eq!(m.route, RouteId::new(1));
        assert_eq!(m.params.get("id"), Some("123"));
    }

    #[test]
    fn test_router_trailing_slash() {
        let mut router = Router::new();
        router.insert("/users", &Method::GET, RouteId::new(0)).unwrap();

        // Trailing slashes are normalized because empty segments are filtered
        let m = router.match_route(&Method::GET, "/users/").unwrap();
        assert_eq!(m.route, RouteId::new(0));
    }

    #[test]
    fn test_router_root_path() {
        let mut router = Router::new();
        router.insert("/", &Method::GET, RouteId::new(0)).unwrap();

        let m = router.match_route(&Method::GET, "/").unwrap();
        assert_eq!(m.route, RouteId::new(0));
    }
}
