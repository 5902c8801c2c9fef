//! Navigation state and reducers for Aurora Compass
//!
//! This crate provides the declarative half of navigation: the state model,
//! the action protocol, stack and tab reducers, the navigator that owns the
//! state, and the scene list derived from it for rendering.
//!
//! # Modules
//!
//! - [`state`] - Routes and navigation state
//! - [`action`] - Navigation actions and their wire format
//! - [`reducer`] - Reducer contract and the stack reducer
//! - [`tab`] - Tab reducer
//! - [`navigator`] - Dispatch boundary, navigator, navigation prop
//! - [`scenes`] - Scene list builder
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use nav_core::{Dispatch, NavigationAction, Navigator, StackConfig, StackReducer};
//!
//! let reducer = StackReducer::new(StackConfig::new(["Home", "Profile"]));
//! let navigator = Navigator::new(Arc::new(reducer)).unwrap();
//!
//! navigator.dispatch(NavigationAction::navigate("Profile"));
//! assert_eq!(navigator.state().index(), 1);
//!
//! navigator.dispatch(NavigationAction::back());
//! assert_eq!(navigator.state().index(), 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod error;
pub mod navigator;
pub mod reducer;
pub mod scenes;
pub mod state;
pub mod tab;

pub use action::{NavigateAction, NavigationAction};
pub use error::{NavigationError, Result};
pub use navigator::{Dispatch, NavigationProp, Navigator, SubscriptionId};
pub use reducer::{NavigateBehavior, NavigatorType, StackConfig, StackReducer, StateReducer};
pub use scenes::{active_scene, build_scenes, prune_stale, scene_key, Scene};
pub use state::{generate_key, NavigationState, Route, RouteParams};
pub use tab::{TabConfig, TabReducer};
