//! Navigator and dispatch boundary
//!
//! The [`Navigator`] owns a navigation state and its reducer. Everything else
//! (screens, the card stack, bridges) changes navigation only by dispatching
//! actions through the [`Dispatch`] trait.

use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::action::NavigationAction;
use crate::error::{NavigationError, Result};
use crate::reducer::StateReducer;
use crate::state::{NavigationState, Route, RouteParams};

// =============================================================================
// Dispatch
// =============================================================================

/// Sink for navigation actions
#[cfg_attr(test, mockall::automock)]
pub trait Dispatch: Send + Sync {
    /// Dispatch an action, returning true if the navigation state changed
    fn dispatch(&self, action: NavigationAction) -> bool;
}

/// Identifier returned by [`Navigator::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type StateListener = Arc<dyn Fn(&NavigationState) + Send + Sync>;

// =============================================================================
// Navigator
// =============================================================================

/// Owner of a navigation state
pub struct Navigator {
    reducer: Arc<dyn StateReducer>,
    state: RwLock<NavigationState>,
    listeners: RwLock<Vec<(SubscriptionId, StateListener)>>,
    next_subscription: AtomicU64,
}

impl Navigator {
    /// Create a navigator with the reducer's initial state
    pub fn new(reducer: Arc<dyn StateReducer>) -> Result<Self> {
        let state = reducer.initial_state()?;
        Ok(Self::with_state(reducer, state))
    }

    /// Create a navigator from a previously persisted state
    pub fn with_state(reducer: Arc<dyn StateReducer>, state: NavigationState) -> Self {
        Self {
            reducer,
            state: RwLock::new(state),
            listeners: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(0),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> NavigationState {
        self.state.read().clone()
    }

    /// Register a listener called after every state change
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&NavigationState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Dispatch an action received in its JSON form
    ///
    /// Unknown action types are reported and ignored.
    pub fn dispatch_json(&self, value: serde_json::Value) -> bool {
        match NavigationAction::from_value(value) {
            Ok(action) => self.dispatch(action),
            Err(NavigationError::UnknownActionType(kind)) => {
                tracing::error!("Navigator cannot handle action type {:?}", kind);
                false
            }
            Err(e) => {
                tracing::error!("Failed to decode navigation action: {}", e);
                false
            }
        }
    }
}

impl Dispatch for Navigator {
    fn dispatch(&self, action: NavigationAction) -> bool {
        let next = {
            let mut state = self.state.write();
            let next = match self.reducer.get_state_for_action(&action, Some(&state)) {
                Ok(next) => next,
                Err(e) => {
                    tracing::error!(
                        navigator = self.reducer.navigator_type().as_str(),
                        action = action.kind(),
                        "Navigation action failed: {}",
                        e
                    );
                    return false;
                }
            };
            if next == *state {
                tracing::debug!(action = action.kind(), "Navigation action left state unchanged");
                return false;
            }
            *state = next.clone();
            next
        };

        tracing::debug!(
            action = action.kind(),
            index = next.index(),
            routes = next.len(),
            "Navigation state changed"
        );

        let listeners: Vec<StateListener> = self
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&next);
        }
        true
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("type", &self.reducer.navigator_type())
            .field("state", &*self.state.read())
            .finish()
    }
}

// =============================================================================
// Navigation Prop
// =============================================================================

/// A route bundled with the dispatcher, handed to screens
#[derive(Clone)]
pub struct NavigationProp {
    state: Arc<Route>,
    dispatcher: Arc<dyn Dispatch>,
}

impl NavigationProp {
    /// Create a navigation prop for a route
    pub fn new(state: Arc<Route>, dispatcher: Arc<dyn Dispatch>) -> Self {
        Self { state, dispatcher }
    }

    /// The route this prop describes
    pub fn state(&self) -> &Arc<Route> {
        &self.state
    }

    /// Get a route parameter
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.state.param(name)
    }

    /// Dispatch a raw action
    pub fn dispatch(&self, action: NavigationAction) -> bool {
        self.dispatcher.dispatch(action)
    }

    /// Go back from this route
    pub fn go_back(&self) -> bool {
        self.go_back_from(Some(&self.state.key))
    }

    /// Go back from a specific route, or from the active route when `None`
    pub fn go_back_from(&self, key: Option<&str>) -> bool {
        self.dispatch(NavigationAction::Back {
            key: key.map(str::to_owned),
        })
    }

    /// Navigate to a route
    pub fn navigate(&self, route_name: impl Into<String>, params: Option<RouteParams>) -> bool {
        let action = match params {
            Some(params) => NavigationAction::navigate_with(route_name, params),
            None => NavigationAction::navigate(route_name),
        };
        self.dispatch(action)
    }

    /// Merge params into this route
    pub fn set_params(&self, params: RouteParams) -> bool {
        self.dispatch(NavigationAction::set_params(Some(self.state.key.clone()), params))
    }
}

impl fmt::Debug for NavigationProp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationProp")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
