//! Card stack navigator engine for Aurora Compass
//!
//! This crate renders a stack navigator as a pile of cards. It owns the
//! continuous stack position, animates it with springs, recognizes the edge
//! swipe that takes the user back, and resolves per-screen options through a
//! router.
//!
//! # Modules
//!
//! - [`card_stack`] - The engine: scenes, gestures, transitions, rendering
//! - [`router`] - Router contract and the stack router
//! - [`options`] - Screen options and headers
//! - [`transition`] - Transition configs and card interpolators
//! - [`gesture`] - Back gesture recognition
//! - [`animated`] - Animated values
//! - [`spring`] - Spring physics
//! - [`driver`] - Off-thread animation driver
//! - [`config`] - Engine configuration
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use card_stack::{CardStack, CardStackConfig, Layout, ScreenComponent, StackRouter};
//! use nav_core::{Dispatch, NavigationAction, StateReducer};
//!
//! #[derive(Debug)]
//! struct Screen(&'static str);
//!
//! impl ScreenComponent for Screen {
//!     fn name(&self) -> &str {
//!         self.0
//!     }
//! }
//!
//! struct Ignore;
//!
//! impl Dispatch for Ignore {
//!     fn dispatch(&self, _action: NavigationAction) -> bool {
//!         false
//!     }
//! }
//!
//! let router = StackRouter::builder()
//!     .route("Home", Arc::new(Screen("HomeScreen")))
//!     .build()
//!     .unwrap();
//! let state = router.initial_state().unwrap();
//! let stack = CardStack::new(Arc::new(router), Arc::new(Ignore), state, CardStackConfig::default()).unwrap();
//! stack.set_layout(Layout::new(390.0, 844.0));
//!
//! let frame = stack.render().unwrap();
//! assert_eq!(frame.cards.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod animated;
pub mod card_stack;
pub mod config;
pub mod driver;
pub mod error;
pub mod gesture;
pub mod options;
pub mod router;
pub mod spring;
pub mod transition;

pub use animated::{AnimatedValue, AnimationEnd, ListenerId};
pub use card_stack::{CardFrame, CardStack, CardStackFrame, ScreenDetails, TransitionCallback};
pub use config::{
    CardMode, CardStackConfig, GestureConfig, HeaderMode, LayoutDirection, PlatformConfig,
    PlatformOs, ANIMATION_DURATION_MS,
};
pub use driver::{NativeDriver, DEFAULT_FRAME_INTERVAL};
pub use error::{CardStackError, Result};
pub use gesture::{GestureEvent, GestureState, ReleaseDecision};
pub use options::{
    resolve_option, HeaderFrame, HeaderProps, HeaderSpec, OptionContext, OptionValue,
    ScreenOptions, ScreenProps,
};
pub use router::{RouteConfig, Router, ScreenComponent, StackRouter, StackRouterBuilder};
pub use spring::SpringConfig;
pub use transition::{
    get_transition_config, CardStyle, Layout, TransitionConfig, TransitionConfigurer,
    TransitionOverride, TransitionProps,
};
