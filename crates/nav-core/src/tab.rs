//! Tab navigator reducer
//!
//! Tabs have a fixed route list, one route per tab keyed by its route name.
//! Navigation only moves the active index.

use serde::{Deserialize, Serialize};

use crate::action::NavigationAction;
use crate::error::{NavigationError, Result};
use crate::reducer::{set_params, NavigatorType, StateReducer};
use crate::state::{NavigationState, Route, RouteParams};
use std::sync::Arc;

/// Static configuration of a tab navigator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabConfig {
    /// Tab route names, in display order
    pub route_names: Vec<String>,
    /// Initially selected tab; the first tab when omitted
    #[serde(default)]
    pub initial_route_name: Option<String>,
}

impl TabConfig {
    /// Create a config from tab route names
    pub fn new<I, S>(route_names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            route_names: route_names.into_iter().map(Into::into).collect(),
            initial_route_name: None,
        }
    }
}

/// Reducer for tab navigators
#[derive(Debug, Clone)]
pub struct TabReducer {
    config: TabConfig,
}

impl TabReducer {
    /// Create a tab reducer
    pub fn new(config: TabConfig) -> Self {
        Self { config }
    }

    fn initial_index(&self) -> Result<usize> {
        match &self.config.initial_route_name {
            Some(name) => self
                .config
                .route_names
                .iter()
                .position(|n| n == name)
                .ok_or_else(|| NavigationError::UnknownRouteName(name.clone())),
            None => Ok(0),
        }
    }

    fn initial(&self, params: Option<&RouteParams>) -> Result<NavigationState> {
        let index = self.initial_index()?;
        let routes = self
            .config
            .route_names
            .iter()
            .enumerate()
            .map(|(position, name)| {
                let params = match params {
                    Some(params) if position == index => params.clone(),
                    _ => RouteParams::new(),
                };
                Arc::new(Route::with_key(name.clone(), name.clone(), params))
            })
            .collect();
        NavigationState::from_parts(index, routes)
    }
}

impl StateReducer for TabReducer {
    fn navigator_type(&self) -> NavigatorType {
        NavigatorType::Tab
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
            NavigationAction::Navigate(navigate) => {
                let position = state
                    .routes()
                    .iter()
                    .position(|route| route.route_name == navigate.route_name)
                    .ok_or_else(|| NavigationError::UnknownRouteName(navigate.route_name.clone()))?;
                let switched = state.with_index(position);
                Ok(match &navigate.params {
                    Some(params) => set_params(&switched, Some(&switched.routes()[position].key), params),
                    None => switched,
                })
            }
            NavigationAction::Back { .. } => {
                let initial = self.initial_index()?;
                if state.index() == initial {
                    Ok(state.clone())
                } else {
                    Ok(state.with_index(initial))
                }
            }
            NavigationAction::SetParams { key, params } => Ok(set_params(state, key.as_deref(), params)),
            NavigationAction::Reset { .. } => Err(NavigationError::UnhandledAction {
                navigator: NavigatorType::Tab.as_str(),
                action: action.kind(),
            }),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reducer() -> TabReducer {
        TabReducer::new(TabConfig::new(["Home", "Search", "Notifications"]))
    }

    #[test]
    fn test_init_builds_all_tabs() {
        let state = reducer().initial_state().unwrap();
        assert_eq!(state.len(), 3);
        assert_eq!(state.index(), 0);
        assert_eq!(state.routes()[1].key, "Search");
    }

    #[test]
    fn test_initial_tab() {
        let reducer = TabReducer::new(TabConfig {
            route_names: vec!["Home".into(), "Search".into()],
            initial_route_name: Some("Search".into()),
        });
        assert_eq!(reducer.initial_state().unwrap().index(), 1);
    }

    #[test]
    fn test_navigate_switches_tab() {
        let reducer = reducer();
        let state = reducer.initial_state().unwrap();
        let mut params = RouteParams::new();
        params.insert("q".to_string(), json!("rust"));
        let switched = reducer
            .get_state_for_action(&NavigationAction::navigate_with("Search", params), Some(&state))
            .unwrap();
        assert_eq!(switched.index(), 1);
        assert_eq!(switched.len(), 3);
        assert_eq!(switched.active_route().param("q"), Some(&json!("rust")));
    }

    #[test]
    fn test_back_returns_to_initial_tab() {
        let reducer = reducer();
        let state = reducer.initial_state().unwrap();
        let switched = reducer
            .get_state_for_action(&NavigationAction::navigate("Notifications"), Some(&state))
            .unwrap();
        let back = reducer
            .get_state_for_action(&NavigationAction::back(), Some(&switched))
            .unwrap();
        assert_eq!(back.index(), 0);

        let again = reducer
            .get_state_for_action(&NavigationAction::back(), Some(&back))
            .unwrap();
        assert_eq!(again, back);
    }

    #[test]
    fn test_reset_is_unhandled() {
        let reducer = reducer();
        let state = reducer.initial_state().unwrap();
        let err = reducer
            .get_state_for_action(&NavigationAction::Reset { index: 0, actions: vec![] }, Some(&state))
            .unwrap_err();
        assert!(matches!(err, NavigationError::UnhandledAction { .. }));
    }
}
