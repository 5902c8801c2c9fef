//! Routers
//!
//! A router is a reducer that also knows which screen renders each route
//! and what options that screen has.

use nav_core::{
    NavigateBehavior, NavigationAction, NavigationProp, NavigationState, NavigatorType,
    RouteParams, StackConfig, StackReducer, StateReducer,
};
use std::fmt;
use std::sync::Arc;

use crate::error::{CardStackError, Result};
use crate::options::{ScreenOptions, ScreenProps};

/// A renderable screen
pub trait ScreenComponent: Send + Sync + fmt::Debug {
    /// Display name of the screen
    fn name(&self) -> &str;

    /// Options declared by the screen itself
    fn navigation_options(&self) -> Option<ScreenOptions> {
        None
    }
}

/// Router contract consumed by the card stack
pub trait Router: StateReducer {
    /// Options for the screen showing `navigation`'s route
    ///
    /// The returned options may hold dynamic values; they are resolved at
    /// render time.
    fn get_screen_options(
        &self,
        navigation: &NavigationProp,
        screen_props: Option<&ScreenProps>,
    ) -> ScreenOptions;

    /// Screen rendering a route name
    fn get_component_for_route_name(&self, route_name: &str) -> Result<Arc<dyn ScreenComponent>>;
}

/// Registration of one route
#[derive(Debug, Clone)]
pub struct RouteConfig {
    /// Screen rendering the route
    pub screen: Arc<dyn ScreenComponent>,
    /// Options overriding the screen's own
    pub navigation_options: Option<ScreenOptions>,
}

// =============================================================================
// Stack Router
// =============================================================================

/// Router for card stacks
pub struct StackRouter {
    reducer: StackReducer,
    routes: Vec<(String, RouteConfig)>,
    default_options: ScreenOptions,
}

impl StackRouter {
    /// Start building a stack router
    pub fn builder() -> StackRouterBuilder {
        StackRouterBuilder::default()
    }

    fn route_config(&self, route_name: &str) -> Option<&RouteConfig> {
        self.routes
            .iter()
            .find(|(name, _)| name == route_name)
            .map(|(_, config)| config)
    }
}

impl StateReducer for StackRouter {
    fn navigator_type(&self) -> NavigatorType {
        self.reducer.navigator_type()
    }

    fn get_state_for_action(
        &self,
        action: &NavigationAction,
        state: Option<&NavigationState>,
    ) -> nav_core::Result<NavigationState> {
        self.reducer.get_state_for_action(action, state)
    }
}

impl Router for StackRouter {
    fn get_screen_options(
        &self,
        navigation: &NavigationProp,
        _screen_props: Option<&ScreenProps>,
    ) -> ScreenOptions {
        let route_name = &navigation.state().route_name;
        let Some(config) = self.route_config(route_name) else {
            tracing::warn!(route = %route_name, "No route config, using default options");
            return self.default_options.clone();
        };

        let mut options = self.default_options.clone();
        if let Some(screen_options) = config.screen.navigation_options() {
            options = options.merge(&screen_options);
        }
        if let Some(route_options) = &config.navigation_options {
            options = options.merge(route_options);
        }
        options
    }

    fn get_component_for_route_name(&self, route_name: &str) -> Result<Arc<dyn ScreenComponent>> {
        self.route_config(route_name)
            .map(|config| config.screen.clone())
            .ok_or_else(|| CardStackError::UnknownScreen(route_name.to_string()))
    }
}

impl fmt::Debug for StackRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StackRouter")
            .field("config", self.reducer.config())
            .finish_non_exhaustive()
    }
}

/// Builder for [`StackRouter`]
#[derive(Default)]
pub struct StackRouterBuilder {
    routes: Vec<(String, RouteConfig)>,
    initial_route_name: Option<String>,
    initial_params: Option<RouteParams>,
    navigate_behavior: NavigateBehavior,
    default_options: ScreenOptions,
}

impl StackRouterBuilder {
    /// Register a route
    pub fn route(self, name: impl Into<String>, screen: Arc<dyn ScreenComponent>) -> Self {
        self.route_config(
            name,
            RouteConfig {
                screen,
                navigation_options: None,
            },
        )
    }

    /// Register a route with options
    pub fn route_with_options(
        self,
        name: impl Into<String>,
        screen: Arc<dyn ScreenComponent>,
        options: ScreenOptions,
    ) -> Self {
        self.route_config(
            name,
            RouteConfig {
                screen,
                navigation_options: Some(options),
            },
        )
    }

    /// Register a route from a full config
    pub fn route_config(mut self, name: impl Into<String>, config: RouteConfig) -> Self {
        self.routes.push((name.into(), config));
        self
    }

    /// Initial route
    pub fn initial_route(mut self, name: impl Into<String>) -> Self {
        self.initial_route_name = Some(name.into());
        self
    }

    /// Params of the initial route
    pub fn initial_params(mut self, params: RouteParams) -> Self {
        self.initial_params = Some(params);
        self
    }

    /// Repeat-name navigation policy
    pub fn navigate_behavior(mut self, behavior: NavigateBehavior) -> Self {
        self.navigate_behavior = behavior;
        self
    }

    /// Options applied to every screen
    pub fn default_navigation_options(mut self, options: ScreenOptions) -> Self {
        self.default_options = options;
        self
    }

    /// Build the router
    pub fn build(self) -> Result<StackRouter> {
        if self.routes.is_empty() {
            return Err(nav_core::NavigationError::EmptyRoutes.into());
        }
        let route_names: Vec<String> = self.routes.iter().map(|(name, _)| name.clone()).collect();
        if let Some(initial) = &self.initial_route_name {
            if !route_names.contains(initial) {
                return Err(nav_core::NavigationError::UnknownRouteName(initial.clone()).into());
            }
        }
        let config = StackConfig {
            route_names,
            initial_route_name: self.initial_route_name,
            initial_params: self.initial_params,
            navigate_behavior: self.navigate_behavior,
        };
        Ok(StackRouter {
            reducer: StackReducer::new(config),
            routes: self.routes,
            default_options: self.default_options,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
