use std::fmt;

use axum::routing::MethodRouter;
use axum::Router;

use crate::error::GatewayError;

/// One `(path, handler)` pair.
pub struct Route {
    path: &'static str,
    handler: MethodRouter,
}

impl Route {
    pub fn path(&self) -> &'static str {
        self.path
    }
}

/// Routes of one or more gateways, in registration order.
///
/// Paths are unique: inserting a path twice is an error rather than a
/// silent override, so two methods that mangle to the same path are caught
/// when the gateway is assembled.
#[derive(Default)]
pub struct RouteMap {
    routes: Vec<Route>,
}

impl RouteMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: &'static str, handler: MethodRouter) -> Result<(), GatewayError> {
        if self.contains(path) {
            return Err(GatewayError::DuplicateRoute(path.to_owned()));
        }
        self.routes.push(Route { path, handler });
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, path: &'static str, handler: MethodRouter) -> Result<Self, GatewayError> {
        self.insert(path, handler)?;
        Ok(self)
    }

    /// Append every route of `other`.
    ///
    /// All paths are checked first: on a duplicate, nothing is merged and
    /// `self` is left as it was.
    pub fn merge(&mut self, other: RouteMap) -> Result<(), GatewayError> {
        for (i, route) in other.routes.iter().enumerate() {
            if self.contains(route.path) || other.routes[..i].iter().any(|seen| seen.path == route.path) {
                return Err(GatewayError::DuplicateRoute(route.path.to_owned()));
            }
        }
        self.routes.extend(other.routes);
        Ok(())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.routes.iter().any(|route| route.path == path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.routes.iter().map(Route::path)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_router(self) -> Router {
        self.routes
            .into_iter()
            .fold(Router::new(), |router, route| router.route(route.path, route.handler))
    }
}

impl fmt::Debug for RouteMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.paths()).finish()
    }
}
