//! Reducers turning `(state, action)` into a new state
//!
//! Reducers are pure: they never mutate the state they are given, and an
//! action that changes nothing hands back a state equal to (and sharing
//! routes with) the input.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::action::{NavigateAction, NavigationAction};
use crate::error::{NavigationError, Result};
use crate::state::{NavigationState, Route, RouteParams};

// =============================================================================
// Navigator Types
// =============================================================================

/// Kind of navigator a reducer implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigatorType {
    /// Card stack
    #[serde(rename = "react-navigation/STACK")]
    Stack,
    /// Tab bar
    #[serde(rename = "react-navigation/TAB")]
    Tab,
    /// Side drawer
    #[serde(rename = "react-navigation/DRAWER")]
    Drawer,
}

impl NavigatorType {
    /// Type tag used in logs and bridge payloads
    pub fn as_str(&self) -> &'static str {
        match self {
            NavigatorType::Stack => "react-navigation/STACK",
            NavigatorType::Tab => "react-navigation/TAB",
            NavigatorType::Drawer => "react-navigation/DRAWER",
        }
    }
}

/// Reducer contract shared by all navigators
pub trait StateReducer: Send + Sync {
    /// Which kind of navigator this is
    fn navigator_type(&self) -> NavigatorType;

    /// Apply an action
    ///
    /// `state` is `None` before the navigator has been initialized.
    fn get_state_for_action(
        &self,
        action: &NavigationAction,
        state: Option<&NavigationState>,
    ) -> Result<NavigationState>;

    /// Build the initial state
    fn initial_state(&self) -> Result<NavigationState> {
        self.get_state_for_action(&NavigationAction::init(), None)
    }
}

// =============================================================================
// Stack Reducer
// =============================================================================

/// What a stack does when navigating to a route name already in the stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NavigateBehavior {
    /// Always push a new entry
    #[default]
    Push,
    /// Pop back to the most recent entry with that name
    ReuseExisting,
}

/// Static configuration of a stack navigator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackConfig {
    /// Registered route names, in declaration order
    pub route_names: Vec<String>,
    /// Initial route; the first registered route when omitted
    #[serde(default)]
    pub initial_route_name: Option<String>,
    /// Params for the initial route
    #[serde(default)]
    pub initial_params: Option<RouteParams>,
    /// Repeat-name navigation policy
    #[serde(default)]
    pub navigate_behavior: NavigateBehavior,
}

impl StackConfig {
    /// Create a config from route names
    pub fn new<I, S>(route_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            route_names: route_names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Set the initial route
    pub fn initial_route(mut self, route_name: impl Into<String>) -> Self {
        self.initial_route_name = Some(route_name.into());
        self
    }

    /// Set the repeat-name policy
    pub fn navigate_behavior(mut self, behavior: NavigateBehavior) -> Self {
        self.navigate_behavior = behavior;
        self
    }
}

/// Reducer for stack navigators
#[derive(Debug, Clone)]
pub struct StackReducer {
    config: StackConfig,
}

impl StackReducer {
    /// Create a stack reducer
    pub fn new(config: StackConfig) -> Self {
        Self { config }
    }

    /// Static configuration
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Check if a route name is registered
    pub fn has_route(&self, route_name: &str) -> bool {
        self.config.route_names.iter().any(|name| name == route_name)
    }

    fn require_route(&self, route_name: &str) -> Result<()> {
        if self.has_route(route_name) {
            Ok(())
        } else {
            Err(NavigationError::UnknownRouteName(route_name.to_string()))
        }
    }

    fn initial(&self, params: Option<&RouteParams>) -> Result<NavigationState> {
        let route_name = self
            .config
            .initial_route_name
            .clone()
            .or_else(|| self.config.route_names.first().cloned())
            .ok_or(NavigationError::EmptyRoutes)?;
        self.require_route(&route_name)?;

        let mut initial_params = self.config.initial_params.clone().unwrap_or_default();
        if let Some(params) = params {
            initial_params.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        Ok(NavigationState::new(Route::new(route_name, initial_params)))
    }

    fn navigate(&self, state: &NavigationState, action: &NavigateAction) -> Result<NavigationState> {
        self.require_route(&action.route_name)?;

        if self.config.navigate_behavior == NavigateBehavior::ReuseExisting {
            if let Some(existing) = state
                .routes()
                .iter()
                .rposition(|route| route.route_name == action.route_name)
            {
                let popped = state.truncate(existing + 1);
                return Ok(match &action.params {
                    Some(params) => {
                        popped.replace_route(existing, popped.routes()[existing].merge_params(params))
                    }
                    None => popped,
                });
            }
        }

        let params = action.params.clone().unwrap_or_default();
        Ok(state.push(Route::new(action.route_name.clone(), params)))
    }

    fn back(&self, state: &NavigationState, key: Option<&str>) -> NavigationState {
        match key {
            Some(key) => match state.position_of(key) {
                Some(position) if position > 0 => state.truncate(position),
                _ => state.clone(),
            },
            None if state.index() > 0 => state.truncate(state.len() - 1),
            None => state.clone(),
        }
    }

    fn reset(&self, index: usize, actions: &[NavigateAction]) -> Result<NavigationState> {
        if actions.is_empty() {
            return Err(NavigationError::InvalidReset("no routes given".to_string()));
        }
        if index >= actions.len() {
            return Err(NavigationError::InvalidReset(format!(
                "index {} out of bounds for {} routes",
                index,
                actions.len()
            )));
        }
        let routes = actions
            .iter()
            .map(|action| {
                self.require_route(&action.route_name)?;
                Ok(Arc::new(Route::new(
                    action.route_name.clone(),
                    action.params.clone().unwrap_or_default(),
                )))
            })
            .collect::<Result<Vec<_>>>()?;
        NavigationState::from_parts(index, routes)
    }
}

impl StateReducer for StackReducer {
    fn navigator_type(&self) -> NavigatorType {
        NavigatorType::Stack
    }

    fn get_state_for_action(
        &self,
        action: &NavigationAction,
        state: Option<&NavigationState>,
    ) -> Result<NavigationState> {
        let state = match state {
            Some(state) => state,
            None => {
                let params = match action {
                    NavigationAction::Init { params } => params.as_ref(),
                    _ => None,
                };
                let initial = self.initial(params)?;
                if matches!(action, NavigationAction::Init { .. }) {
                    return Ok(initial);
                }
                return self.get_state_for_action(action, Some(&initial));
            }
        };

        match action {
            NavigationAction::Init { .. } => Ok(state.clone()),
            NavigationAction::Navigate(navigate) => self.navigate(state, navigate),
            NavigationAction::Back { key } => Ok(self.back(state, key.as_deref())),
            NavigationAction::SetParams { key, params } => Ok(set_params(state, key.as_deref(), params)),
            NavigationAction::Reset { index, actions } => self.reset(*index, actions),
        }
    }
}

/// Merge params into the route with `key` (the active route when `None`)
///
/// Unknown keys leave the state unchanged.
pub(crate) fn set_params(
    state: &NavigationState,
    key: Option<&str>,
    params: &RouteParams,
) -> NavigationState {
    let position = match key {
        Some(key) => state.position_of(key),
        None => Some(state.index()),
    };
    match position {
        Some(position) => state.replace_route(position, state.routes()[position].merge_params(params)),
        None => state.clone(),
    }
}

// =============================================================================
// Tests
// =============================================================================
