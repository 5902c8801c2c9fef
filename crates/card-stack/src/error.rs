//! Card stack errors

use nav_core::NavigationError;
use thiserror::Error;

/// Errors produced by the card stack and its router
#[derive(Debug, Error)]
pub enum CardStackError {
    /// No screen component is registered for a route name
    #[error("No screen registered for route {0}")]
    UnknownScreen(String),

    /// Navigation state or reducer error
    #[error("Navigation error: {0}")]
    Navigation(#[from] NavigationError),

    /// Configuration could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for card stack operations
pub type Result<T> = std::result::Result<T, CardStackError>;
