//! Per-path HTTP method table.
//!
//! This module provides [`MethodTable`] which maps HTTP methods to route
//! identifiers for a single path. Registering a method that is already
//! occupied is rejected so duplicate routes surface at registration time.

use http::Method;

use crate::RouteId;

/// Maps HTTP methods to route identifiers for a single path.
///
/// # Example
///
/// ```rust
/// use trellis_router::{MethodTable, RouteId};
/// use http::Method;
///
/// let mut table = MethodTable::new();
/// table.set(&Method::GET, RouteId::new(0)).unwrap();
/// table.set(&Method::POST, RouteId::new(1)).unwrap();
///
/// assert_eq!(table.get(&Method::GET), Some(RouteId::new(0)));
/// assert_eq!(table.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodTable {
    /// GET route
    get: Option<RouteId>,
    /// POST route
    post: Option<RouteId>,
    /// PUT route
    put: Option<RouteId>,
    /// DELETE route
    delete: Option<RouteId>,
    /// PATCH route
    patch: Option<RouteId>,
    /// HEAD route
    head: Option<RouteId>,
    /// OPTIONS route
    options: Option<RouteId>,
}

impl MethodTable {
    /// Creates a new empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route for a method.
    ///
    /// # Errors
    ///
    /// Returns the already-registered [`RouteId`] if the method is occupied
    /// or the method is not supported by the table.
    pub fn set(&mut self, method: &Method, route: RouteId) -> Result<(), Option<RouteId>> {
        let slot = match *method {
            Method::GET => &mut self.get,
            Method::POST => &mut self.post,
            Method::PUT => &mut self.put,
            Method::DELETE => &mut self.delete,
            Method::PATCH => &mut self.patch,
            Method::HEAD => &mut self.head,
            Method::OPTIONS => &mut self.options,
            _ => return Err(None),
        };
        match slot {
            Some(existing) => Err(Some(*existing)),
            None => {
                *slot = Some(route);
                Ok(())
            }
        }
    }

    /// Returns the route registered for a given HTTP method.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<RouteId> {
        match *method {
            Method::GET => self.get,
            Method::POST => self.post,
            Method::PUT => self.put,
            Method::DELETE => self.delete,
            Method::PATCH => self.patch,
            Method::HEAD => self.head,
            Method::OPTIONS => self.options,
            _ => None,
        }
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        self.get.is_some()
            || self.post.is_some()
            || self.put.is_some()
            || self.delete.is_some()
            || self.patch.is_some()
            || self.head.is_some()
            || self.options.is_some()
    }

    /// Returns a list of methods registered for this route.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        let mut methods = Vec::with_capacity(7);
        if self.get.is_some() {
            methods.push(Method::GET);
        }
        if self.post.is_some() {
            methods.push(Method::POST);
        }
        if self.put.is_some() {
            methods.push(Method::PUT);
        }
        if self.delete.is_some() {
            methods.push(Method::DELETE);
        }
        if self.patch.is_some() {
            methods.push(Method::PATCH);
        }
        if self.head.is_some() {
            methods.push(Method::HEAD);
        }
        if self.options.is_some() {
            methods.push(Method::OPTIONS);
        }
        methods
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_table_new() {
        let table = MethodTable::new();
        assert!(!table.has_any_method());
    }

    #[test]
    fn test_method_table_set_and_get() {
        let mut table = MethodTable::new();
        table.set(&Method::GET, RouteId::new(3)).unwrap();

        assert_eq!(table.get(&Method::GET), Some(RouteId::new(3)));
        assert_eq!(table.get(&Method::POST), None);
    }

    #[test]
    fn test_method_table_multiple() {
        let mut table = MethodTable::new();
        table.set(&Method::GET, RouteId::new(0)).unwrap();
        table.set(&Method::POST, RouteId::new(1)).unwrap();
        table.set(&Method::PUT, RouteId::new(2)).unwrap();
        table.set(&Method::DELETE, RouteId::new(3)).unwrap();

        assert_eq!(table.get(&Method::GET), Some(RouteId::new(0)));
        assert_eq!(table.get(&Method::POST), Some(RouteId::new(1)));
        assert_eq!(table.get(&Method::PUT), Some(RouteId::new(2)));
        assert_eq!(table.get(&Method::DELETE), Some(RouteId::new(3)));
    }

    #[test]
    fn test_method_table_conflict() {
        let mut table = MethodTable::new();
        table.set(&Method::GET, RouteId::new(0)).unwrap();

        let err = table.set(&Method::GET, RouteId::new(1)).unwrap_err();
        assert_eq!(err, Some(RouteId::new(0)));
        // First registration wins
        assert_eq!(table.get(&Method::GET), Some(RouteId::new(0)));
    }

    #[test]
    fn test_method_table_unsupported_method() {
        let mut table = MethodTable::new();
        let err = table.set(&Method::TRACE, RouteId::new(0)).unwrap_err();
        assert_eq!(err, None);
    }

    #[test]
    fn test_method_table_allowed_methods() {
        let mut table = MethodTable::new();
        table.set(&Method::GET, RouteId::new(0)).unwrap();
        table.set(&Method::POST, RouteId::new(1)).unwrap();
        table.set(&Method::DELETE, RouteId::new(2)).unwrap();

        let allowed = table.allowed_methods();
        assert!(allowed.contains(&Method::GET));
        assert!(allowed.contains(&Method::POST));
        assert!(allowed.contains(&Method::DELETE));
        assert!(!allowed.contains(&Method::PUT));
    }
}
