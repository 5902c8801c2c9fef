//! Navigation state model
//!
//! A navigator's state is an ordered list of routes plus the index of the
//! active one. States are values: reducers build a new state rather than
//! mutating an existing one, and routes that did not change are shared
//! (`Arc`) between the old and the new state.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{NavigationError, Result};

// =============================================================================
// Route Parameters
// =============================================================================

/// Parameters for a route
pub type RouteParams = HashMap<String, serde_json::Value>;

/// Generate a fresh route key
///
/// Keys are never reused, even for a route that is popped and pushed again
/// with the same name and params.
pub fn generate_key() -> String {
    format!("id-{}", uuid::Uuid::new_v4())
}

// =============================================================================
// Route
// =============================================================================

/// One navigable entry in a navigator's state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Unique, stable key
    pub key: String,
    /// Name of the screen this route renders
    pub route_name: String,
    /// Route parameters
    #[serde(default)]
    pub params: RouteParams,
}

impl Route {
    /// Create a route with a freshly generated key
    pub fn new(route_name: impl Into<String>, params: RouteParams) -> Self {
        Self {
            key: generate_key(),
            route_name: route_name.into(),
            params,
        }
    }

    /// Create a route with an explicit key
    pub fn with_key(
        key: impl Into<String>,
        route_name: impl Into<String>,
        params: RouteParams,
    ) -> Self {
        Self {
            key: key.into(),
            route_name: route_name.into(),
            params,
        }
    }

    /// Copy of this route with `params` shallow-merged over the current ones
    pub fn merge_params(&self, params: &RouteParams) -> Self {
        let mut merged = self.params.clone();
        for (name, value) in params {
            merged.insert(name.clone(), value.clone());
        }
        Self {
            key: self.key.clone(),
            route_name: self.route_name.clone(),
            params: merged,
        }
    }

    /// Get a parameter by name
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.params.get(name)
    }
}

// =============================================================================
// Navigation State
// =============================================================================

/// A navigator's route list and active index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavigationState {
    index: usize,
    routes: Vec<Arc<Route>>,
}

impl NavigationState {
    /// Create a state holding a single route
    pub fn new(route: Route) -> Self {
        Self {
            index: 0,
            routes: vec![Arc::new(route)],
        }
    }

    /// Create a state from an index and routes, validating the invariant
    pub fn from_parts(index: usize, routes: Vec<Arc<Route>>) -> Result<Self> {
        if routes.is_empty() {
            return Err(NavigationError::EmptyRoutes);
        }
        if index >= routes.len() {
            return Err(NavigationError::IndexOutOfBounds {
                index,
                len: routes.len(),
            });
        }
        let mut keys = HashSet::with_capacity(routes.len());
        if let Some(route) = routes.iter().find(|route| !keys.insert(route.key.as_str())) {
            return Err(NavigationError::DuplicateRouteKey(route.key.clone()));
        }
        Ok(Self { index, routes })
    }

    /// Index of the active route
    pub fn index(&self) -> usize {
        self.index
    }

    /// All routes, bottom to top
    pub fn routes(&self) -> &[Arc<Route>] {
        &self.routes
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// The active route
    pub fn active_route(&self) -> &Arc<Route> {
        &self.routes[self.index]
    }

    /// Position of the route with the given key
    pub fn position_of(&self, key: &str) -> Option<usize> {
        self.routes.iter().position(|route| route.key == key)
    }

    /// Check if a route with the given key exists
    pub fn contains_key(&self, key: &str) -> bool {
        self.position_of(key).is_some()
    }

    /// Check if we can go back
    pub fn can_go_back(&self) -> bool {
        self.index > 0
    }

    /// Copy of this state with the route at `position` replaced
    pub(crate) fn replace_route(&self, position: usize, route: Route) -> Self {
        let mut routes = self.routes.clone();
        routes[position] = Arc::new(route);
        Self {
            index: self.index,
            routes,
        }
    }

    /// Copy of this state with a route pushed on top and made active
    pub(crate) fn push(&self, route: Route) -> Self {
        let mut routes = self.routes.clone();
        routes.push(Arc::new(route));
        Self {
            index: routes.len() - 1,
            routes,
        }
    }

    /// Copy of this state keeping only the first `len` routes, top one active
    pub(crate) fn truncate(&self, len: usize) -> Self {
        let routes: Vec<_> = self.routes[..len].to_vec();
        Self {
            index: routes.len() - 1,
            routes,
        }
    }

    /// Copy of this state with a different active index
    pub(crate) fn with_index(&self, index: usize) -> Self {
        Self {
            index,
            routes: self.routes.clone(),
        }
    }

    /// Check whether both states share every route allocation
    pub fn shares_routes_with(&self, other: &NavigationState) -> bool {
        self.index == other.index
            && self.routes.len() == other.routes.len()
            && self
                .routes
                .iter()
                .zip(other.routes.iter())
                .all(|(a, b)| Arc::ptr_eq(a, b))
    }
}

#[derive(Deserialize)]
struct RawNavigationState {
    index: usize,
    routes: Vec<Arc<Route>>,
}

impl<'de> Deserialize<'de> for NavigationState {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = RawNavigationState::deserialize(deserializer)?;
        NavigationState::from_parts(raw.index, raw.routes).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================
