//! Navigation errors

use thiserror::Error;

/// Errors produced by navigation state construction and reducers
#[derive(Debug, Error)]
pub enum NavigationError {
    /// A navigation state must hold at least one route
    #[error("Navigation state has no routes")]
    EmptyRoutes,

    /// The active index does not point into the route list
    #[error("Index {index} out of bounds for {len} routes")]
    IndexOutOfBounds {
        /// Requested index
        index: usize,
        /// Number of routes
        len: usize,
    },

    /// The route name is not registered with the navigator
    #[error("Unknown route name: {0}")]
    UnknownRouteName(String),

    /// Two routes in the same state share a key
    #[error("Route key {0} conflicts with another route")]
    DuplicateRouteKey(String),

    /// A reset action could not be applied
    #[error("Invalid reset: {0}")]
    InvalidReset(String),

    /// The navigator does not handle this kind of action
    #[error("{navigator} navigator cannot handle {action}")]
    UnhandledAction {
        /// Navigator type tag
        navigator: &'static str,
        /// Action type tag
        action: &'static str,
    },

    /// A serialized action carried an unrecognized type tag
    #[error("Unknown action type: {0}")]
    UnknownActionType(String),

    /// A serialized action could not be decoded
    #[error("Action decode error: {0}")]
    ActionDecode(#[from] serde_json::Error),
}

/// Result type for navigation operations
pub type Result<T> = std::result::Result<T, NavigationError>;
