//! Navigation actions
//!
//! Actions are transient values: UI and gesture code build them, a reducer
//! consumes them once. The serialized form is tagged by `type` using the
//! `Navigation/*` names understood by bridges and persisted logs.

use serde::{Deserialize, Serialize};

use crate::error::{NavigationError, Result};
use crate::state::RouteParams;

/// Wire name of the navigate action
pub const NAVIGATE: &str = "Navigation/NAVIGATE";
/// Wire name of the back action
pub const BACK: &str = "Navigation/BACK";
/// Wire name of the set-params action
pub const SET_PARAMS: &str = "Navigation/SET_PARAMS";
/// Wire name of the init action
pub const INIT: &str = "Navigation/INIT";
/// Wire name of the reset action
pub const RESET: &str = "Navigation/RESET";

/// Navigate to a named route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigateAction {
    /// Target route name
    pub route_name: String,
    /// Params for the new route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<RouteParams>,
}

impl NavigateAction {
    /// Create a navigate action without params
    pub fn new(route_name: impl Into<String>) -> Self {
        Self {
            route_name: route_name.into(),
            params: None,
        }
    }

    /// Attach params
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = Some(params);
        self
    }
}

/// All actions a navigator understands
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NavigationAction {
    /// Push (or switch to) a named route
    #[serde(rename = "Navigation/NAVIGATE")]
    Navigate(NavigateAction),

    /// Go back, optionally from a specific route
    #[serde(rename = "Navigation/BACK")]
    Back {
        /// Route to go back from; the active route when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    /// Merge params into a route
    #[serde(rename = "Navigation/SET_PARAMS")]
    SetParams {
        /// Target route; the active route when omitted
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        /// Params to merge
        params: RouteParams,
    },

    /// Build the initial state
    #[serde(rename = "Navigation/INIT")]
    Init {
        /// Params merged into the initial route
        #[serde(default, skip_serializing_if = "Option::is_none")]
        params: Option<RouteParams>,
    },

    /// Replace the whole route list
    #[serde(rename = "Navigation/RESET")]
    Reset {
        /// Active index of the new state
        index: usize,
        /// One navigate action per new route
        actions: Vec<NavigateAction>,
    },
}

impl NavigationAction {
    /// Navigate to a route without params
    pub fn navigate(route_name: impl Into<String>) -> Self {
        NavigationAction::Navigate(NavigateAction::new(route_name))
    }

    /// Navigate to a route with params
    pub fn navigate_with(route_name: impl Into<String>, params: RouteParams) -> Self {
        NavigationAction::Navigate(NavigateAction::new(route_name).with_params(params))
    }

    /// Go back from the active route
    pub fn back() -> Self {
        NavigationAction::Back { key: None }
    }

    /// Go back from the route with the given key
    pub fn back_from(key: impl Into<String>) -> Self {
        NavigationAction::Back {
            key: Some(key.into()),
        }
    }

    /// Merge params into a route
    pub fn set_params(key: Option<String>, params: RouteParams) -> Self {
        NavigationAction::SetParams { key, params }
    }

    /// Initialize a navigator
    pub fn init() -> Self {
        NavigationAction::Init { params: None }
    }

    /// Wire name of this action
    pub fn kind(&self) -> &'static str {
        match self {
            NavigationAction::Navigate(_) => NAVIGATE,
            NavigationAction::Back { .. } => BACK,
            NavigationAction::SetParams { .. } => SET_PARAMS,
            NavigationAction::Init { .. } => INIT,
            NavigationAction::Reset { .. } => RESET,
        }
    }

    /// Decode an action from its JSON form
    ///
    /// An unrecognized `type` tag is reported as
    /// [`NavigationError::UnknownActionType`] rather than a generic decode error
    /// so dispatch sites can tell foreign actions from malformed ones.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_owned)
            .unwrap_or_default();
        if ![NAVIGATE, BACK, SET_PARAMS, INIT, RESET].contains(&kind.as_str()) {
            return Err(NavigationError::UnknownActionType(kind));
        }
        Ok(serde_json::from_value(value)?)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_navigate_wire_format() {
        let action = NavigationAction::navigate("Profile");
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json, json!({ "type": "Navigation/NAVIGATE", "routeName": "Profile" }));
    }

    #[test]
    fn test_decode_back_with_key() {
        let action =
            NavigationAction::from_value(json!({ "type": "Navigation/BACK", "key": "id-1" }))
                .unwrap();
        assert_eq!(action, NavigationAction::back_from("id-1"));
    }

    #[test]
    fn test_decode_set_params() {
        let action = NavigationAction::from_value(json!({
            "type": "Navigation/SET_PARAMS",
            "params": { "title": "Hello" }
        }))
        .unwrap();
        match action {
            NavigationAction::SetParams { key, params } => {
                assert!(key.is_none());
                assert_eq!(params.get("title"), Some(&json!("Hello")));
            }
            other => panic!("unexpected action {:?}", other),
        }
    }

    #[test]
    fn test_decode_unknown_type() {
        let err = NavigationAction::from_value(json!({ "type": "Navigation/OPEN_DRAWER" }))
            .unwrap_err();
        assert!(matches!(err, NavigationError::UnknownActionType(t) if t == "Navigation/OPEN_DRAWER"));
    }

    #[test]
    fn test_decode_malformed_known_type() {
        let err = NavigationAction::from_value(json!({ "type": "Navigation/RESET" })).unwrap_err();
        assert!(matches!(err, NavigationError::ActionDecode(_)));
    }

    #[test]
    fn test_kind() {
        assert_eq!(NavigationAction::back().kind(), BACK);
        assert_eq!(NavigationAction::init().kind(), INIT);
    }
}
