//! Card stack engine
//!
//! [`CardStack`] renders a stack navigator's scenes as cards, animates the
//! continuous stack position between indices, and turns edge swipes into
//! `BACK` actions.
//!
//! # Gesture states
//!
//! - **Idle**: no gesture, position at rest on the current index.
//! - **Responding**: a back gesture is in progress and the position follows
//!   the finger, clamped between the previous and current card.
//! - **Resetting**: the gesture was released without intent to go back and
//!   the position springs back to the current index.
//! - **Going back**: the position springs to the previous index. When the
//!   spring settles a `BACK` action is dispatched for the card that was left.
//!   An interrupted back spring dispatches nothing.
//!
//! The engine never holds its own lock while it calls the position, the
//! router or the dispatcher, so any of them may call back into it.

use nav_core::{
    active_scene, build_scenes, prune_stale, Dispatch, NavigationAction, NavigationProp,
    NavigationState, Route, Scene,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::animated::AnimatedValue;
use crate::config::{CardMode, CardStackConfig, HeaderMode};
use crate::error::Result;
use crate::gesture::{
    decide_release, drag_position, should_respond, GestureAxis, GestureEvent, GestureState,
    ReleaseDecision, ResponderCheck,
};
use crate::options::{
    resolve_option, HeaderFrame, HeaderProps, OptionContext, ScreenOptions, ScreenProps,
};
use crate::router::{Router, ScreenComponent};
use crate::transition::{
    get_transition_config, CardStyle, Layout, TransitionConfigurer, TransitionProps,
};

/// Called with the new and previous transition props
pub type TransitionCallback =
    Arc<dyn Fn(&TransitionProps, Option<&TransitionProps>) + Send + Sync>;

// =============================================================================
// Render Output
// =============================================================================

/// Cached per-scene lookup
#[derive(Debug, Clone)]
pub struct ScreenDetails {
    /// Route the details were computed for
    pub state: Arc<Route>,
    /// Navigation prop handed to the screen
    pub navigation: NavigationProp,
    /// Unresolved screen options
    pub options: ScreenOptions,
}

/// One rendered card
#[derive(Debug, Clone)]
pub struct CardFrame {
    /// Scene shown by the card
    pub scene: Scene,
    /// Interpolated style
    pub style: CardStyle,
    /// Screen rendering the scene
    pub component: Arc<dyn ScreenComponent>,
    /// Navigation prop of the screen
    pub navigation: NavigationProp,
    /// Header drawn inside the card
    pub header: Option<HeaderFrame>,
    /// Back gestures accepted on this card
    pub gestures_enabled: bool,
}

/// A rendered card stack
#[derive(Debug, Clone)]
pub struct CardStackFrame {
    /// Position the frame was rendered at
    pub position: f64,
    /// Committed navigation index
    pub index: usize,
    /// Header mode in effect
    pub header_mode: HeaderMode,
    /// Floating header above the cards
    pub header: Option<HeaderFrame>,
    /// Cards, bottom first
    pub cards: Vec<CardFrame>,
}

impl CardStackFrame {
    /// Card showing a route
    pub fn card(&self, route_key: &str) -> Option<&CardFrame> {
        self.cards.iter().find(|card| card.scene.route.key == route_key)
    }

    /// Card of the active scene
    pub fn active_card(&self) -> Option<&CardFrame> {
        self.cards.iter().find(|card| card.scene.is_active)
    }
}

// =============================================================================
// Engine State
// =============================================================================

struct EngineState {
    state: NavigationState,
    scenes: Vec<Scene>,
    layout: Layout,
    screen_props: Option<Arc<ScreenProps>>,
    gesture_start_value: f64,
    gesture_start_pending: bool,
    is_responding: bool,
    immediate_index: Option<usize>,
    pending_back: Vec<String>,
    back_generation: u64,
    screen_details: HashMap<String, Arc<ScreenDetails>>,
    prev_index: Option<usize>,
    transition: u64,
    transition_configurer: Option<TransitionConfigurer>,
    on_transition_start: Option<TransitionCallback>,
    on_transition_end: Option<TransitionCallback>,
}

struct Shared {
    router: Arc<dyn Router>,
    dispatcher: Arc<dyn Dispatch>,
    config: CardStackConfig,
    axis: GestureAxis,
    position: AnimatedValue,
    engine: Mutex<EngineState>,
}

impl Shared {
    fn is_modal(&self) -> bool {
        self.config.mode == CardMode::Modal
    }

    fn transition_props(&self, layout: Layout, position: f64, index: usize) -> TransitionProps {
        TransitionProps {
            layout,
            position,
            index,
            rtl: self.config.platform.is_rtl(),
        }
    }

    fn screen_details(&self, scene: &Scene) -> Arc<ScreenDetails> {
        let screen_props = {
            let engine = self.engine.lock();
            if let Some(details) = engine.screen_details.get(&scene.key) {
                if Arc::ptr_eq(&details.state, &scene.route) {
                    return details.clone();
                }
            }
            engine.screen_props.clone()
        };

        let navigation = NavigationProp::new(scene.route.clone(), self.dispatcher.clone());
        let options = self
            .router
            .get_screen_options(&navigation, screen_props.as_deref());
        let details = Arc::new(ScreenDetails {
            state: scene.route.clone(),
            navigation,
            options,
        });
        self.engine
            .lock()
            .screen_details
            .insert(scene.key.clone(), details.clone());
        details
    }

    fn gestures_enabled(&self, details: &ScreenDetails, screen_props: Option<&ScreenProps>) -> bool {
        let ctx = OptionContext {
            navigation: &details.navigation,
            screen_props,
        };
        resolve_option(&details.options.gestures_enabled, &ctx)
            .unwrap_or_else(|| self.config.platform.gestures_enabled())
    }

    fn header(
        &self,
        scene: &Scene,
        details: &ScreenDetails,
        mode: HeaderMode,
        screen_props: Option<&ScreenProps>,
    ) -> Option<HeaderFrame> {
        let ctx = OptionContext {
            navigation: &details.navigation,
            screen_props,
        };
        let title = resolve_option(&details.options.title, &ctx);
        let spec = details.options.header.clone().unwrap_or_default();
        spec.render(&HeaderProps {
            scene,
            mode,
            title: title.as_deref(),
            navigation: &details.navigation,
        })
    }

    fn reset(self: &Arc<Self>, to: usize, velocity: f64) {
        tracing::debug!(index = to, velocity, "Card stack resetting");
        self.engine.lock().pending_back.clear();
        let weak = Arc::downgrade(self);
        self.position.spring_to(
            to as f64,
            self.config.spring,
            velocity,
            Some(Box::new(move |end| {
                if !end.finished {
                    return;
                }
                if let Some(shared) = weak.upgrade() {
                    shared.prune_stale_scenes();
                }
            })),
        );
    }

    fn go_back(self: &Arc<Self>, from: usize, velocity: f64) {
        let to = from.saturating_sub(1);
        let generation = {
            let mut engine = self.engine.lock();
            engine.back_generation += 1;
            engine.immediate_index = Some(to);
            let back_key = engine
                .scenes
                .iter()
                .find(|scene| !scene.is_stale && scene.index == from)
                .map(|scene| scene.route.key.clone());
            match back_key {
                Some(key) if !engine.pending_back.contains(&key) => engine.pending_back.push(key),
                Some(_) => {}
                None => tracing::warn!(index = from, "No scene to go back from"),
            }
            engine.back_generation
        };
        tracing::debug!(from, to, velocity, "Card stack going back");

        let weak = Arc::downgrade(self);
        self.position.spring_to(
            to as f64,
            self.config.spring,
            velocity,
            Some(Box::new(move |end| {
                if let Some(shared) = weak.upgrade() {
                    shared.finish_go_back(generation, end.finished);
                }
            })),
        );
    }

    /// A back spring ended
    ///
    /// Only a spring that came to rest dispatches `BACK`. An interrupted one
    /// leaves its key pending: a chained back or the release of a new gesture
    /// decides whether it is still wanted.
    fn finish_go_back(&self, generation: u64, finished: bool) {
        let back_key = {
            let mut engine = self.engine.lock();
            if engine.back_generation != generation {
                tracing::debug!("Back animation superseded by a later one");
                return;
            }
            engine.immediate_index = None;
            if !finished {
                tracing::debug!("Back animation interrupted");
                return;
            }
            if engine.is_responding {
                tracing::debug!("Gesture responding, BACK suppressed");
                return;
            }
            // BACK from the lowest pending key pops every card above it too
            let pending = std::mem::take(&mut engine.pending_back);
            pending
                .into_iter()
                .filter_map(|key| engine.state.position_of(&key).map(|position| (position, key)))
                .min_by_key(|(position, _)| *position)
                .map(|(_, key)| key)
        };
        match back_key {
            Some(key) => {
                self.dispatcher.dispatch(NavigationAction::back_from(key));
            }
            None => tracing::debug!("No pending card to go back from"),
        }
    }

    fn finish_transition(&self, generation: u64, finished: bool) {
        if !finished {
            return;
        }
        let (on_end, props, prev) = {
            let mut engine = self.engine.lock();
            if engine.transition != generation {
                return;
            }
            engine.scenes = prune_stale(&engine.scenes);
            let index = engine.state.index();
            let props = self.transition_props(engine.layout, index as f64, index);
            let prev = engine
                .prev_index
                .map(|index| TransitionProps { index, ..props });
            (engine.on_transition_end.clone(), props, prev)
        };
        tracing::debug!(index = props.index, "Card stack transition ended");
        if let Some(on_end) = on_end {
            on_end(&props, prev.as_ref());
        }
    }

    fn prune_stale_scenes(&self) {
        let mut engine = self.engine.lock();
        if engine.scenes.iter().any(|scene| scene.is_stale) {
            engine.scenes = prune_stale(&engine.scenes);
        }
    }
}

// =============================================================================
// Card Stack
// =============================================================================

/// Card stack engine of one mounted stack navigator
#[derive(Clone)]
pub struct CardStack {
    shared: Arc<Shared>,
}

impl CardStack {
    /// Create the engine for a navigator's current state
    pub fn new(
        router: Arc<dyn Router>,
        dispatcher: Arc<dyn Dispatch>,
        state: NavigationState,
        config: CardStackConfig,
    ) -> Result<Self> {
        let config = config.validated();
        let scenes = build_scenes(&[], &state, None)?;
        let index = state.index() as f64;
        let position = if config.use_native_driver {
            AnimatedValue::native(index)
        } else {
            AnimatedValue::new(index)
        };
        // Keeps the UI-side copy of a native position in sync for async reads
        position.ensure_subscribed();

        Ok(Self {
            shared: Arc::new(Shared {
                router,
                dispatcher,
                axis: GestureAxis::new(config.mode, &config.platform),
                config,
                position,
                engine: Mutex::new(EngineState {
                    state,
                    scenes,
                    layout: Layout::default(),
                    screen_props: None,
                    gesture_start_value: index,
                    gesture_start_pending: false,
                    is_responding: false,
                    immediate_index: None,
                    pending_back: Vec::new(),
                    back_generation: 0,
                    screen_details: HashMap::new(),
                    prev_index: None,
                    transition: 0,
                    transition_configurer: None,
                    on_transition_start: None,
                    on_transition_end: None,
                }),
            }),
        })
    }

    /// Continuous stack position
    ///
    /// The host ticks it every frame, or hands it to a
    /// [`NativeDriver`](crate::driver::NativeDriver) when the configuration
    /// asks for native driving.
    pub fn position(&self) -> AnimatedValue {
        self.shared.position.clone()
    }

    /// Resolved configuration
    pub fn config(&self) -> &CardStackConfig {
        &self.shared.config
    }

    /// Current navigation state
    pub fn state(&self) -> NavigationState {
        self.shared.engine.lock().state.clone()
    }

    /// Current scenes, including stale ones still transitioning out
    pub fn scenes(&self) -> Vec<Scene> {
        self.shared.engine.lock().scenes.clone()
    }

    /// Is a back gesture in progress?
    pub fn is_responding(&self) -> bool {
        self.shared.engine.lock().is_responding
    }

    /// Index a running back animation is heading to
    pub fn immediate_index(&self) -> Option<usize> {
        self.shared.engine.lock().immediate_index
    }

    /// Measured layout
    pub fn layout(&self) -> Layout {
        self.shared.engine.lock().layout
    }

    /// Record the measured layout
    pub fn set_layout(&self, layout: Layout) {
        self.shared.engine.lock().layout = layout;
    }

    /// Replace the navigator-wide screen props
    ///
    /// A different props allocation invalidates every cached screen detail.
    pub fn set_screen_props(&self, screen_props: Option<Arc<ScreenProps>>) {
        let mut engine = self.shared.engine.lock();
        let same = match (&engine.screen_props, &screen_props) {
            (Some(current), Some(next)) => Arc::ptr_eq(current, next),
            (None, None) => true,
            _ => false,
        };
        if !same {
            engine.screen_details.clear();
        }
        engine.screen_props = screen_props;
    }

    /// Override the platform transition
    pub fn set_transition_config(&self, configurer: Option<TransitionConfigurer>) {
        self.shared.engine.lock().transition_configurer = configurer;
    }

    /// Called when a transition between indices starts
    pub fn on_transition_start<F>(&self, callback: F)
    where
        F: Fn(&TransitionProps, Option<&TransitionProps>) + Send + Sync + 'static,
    {
        self.shared.engine.lock().on_transition_start = Some(Arc::new(callback));
    }

    /// Called when a transition between indices has settled
    pub fn on_transition_end<F>(&self, callback: F)
    where
        F: Fn(&TransitionProps, Option<&TransitionProps>) + Send + Sync + 'static,
    {
        self.shared.engine.lock().on_transition_end = Some(Arc::new(callback));
    }

    /// Take a new navigation state
    ///
    /// Scenes are rebuilt, keeping removed routes as stale scenes. When the
    /// index changes or cards leave the stack, the position springs to the
    /// new index and stale scenes are dropped once it settles.
    pub fn update(&self, next: NavigationState) -> Result<()> {
        let shared = &self.shared;
        let position = shared.position.value();
        let started = {
            let mut engine = shared.engine.lock();
            let scenes = build_scenes(&engine.scenes, &next, Some(&engine.state))?;
            engine.screen_details.retain(|key, details| {
                scenes
                    .iter()
                    .any(|scene| &scene.key == key && Arc::ptr_eq(&scene.route, &details.state))
            });

            let prev_index = engine.state.index();
            let index_changed = next.index() != prev_index;
            let has_stale = scenes.iter().any(|scene| scene.is_stale);
            engine.state = next;
            engine.scenes = scenes;
            engine.prev_index = Some(prev_index);
            if index_changed || has_stale {
                // The new state supersedes any back animation still in flight
                engine.pending_back.clear();
            }

            if !index_changed && !has_stale {
                None
            } else if engine.is_responding {
                tracing::debug!("Gesture responding, transition deferred to release");
                None
            } else {
                engine.transition += 1;
                let props = shared.transition_props(engine.layout, position, engine.state.index());
                let prev = TransitionProps {
                    index: prev_index,
                    ..props
                };
                Some((
                    engine.transition,
                    props,
                    prev,
                    engine.transition_configurer.clone(),
                    engine.on_transition_start.clone(),
                ))
            }
        };

        let Some((generation, props, prev, configurer, on_start)) = started else {
            return Ok(());
        };
        tracing::debug!(from = prev.index, to = props.index, "Card stack transition started");
        if let Some(on_start) = on_start {
            on_start(&props, Some(&prev));
        }

        let spring = get_transition_config(
            configurer.as_ref(),
            &props,
            Some(&prev),
            shared.is_modal(),
            &shared.config.platform,
        )
        .transition_spec
        .unwrap_or(shared.config.spring);
        let weak: Weak<Shared> = Arc::downgrade(shared);
        shared.position.spring_to(
            props.index as f64,
            spring,
            0.0,
            Some(Box::new(move |end| {
                if let Some(shared) = weak.upgrade() {
                    shared.finish_transition(generation, end.finished);
                }
            })),
        );
        Ok(())
    }

    /// Cached details of a scene
    ///
    /// The cache entry is reused until the scene's route allocation changes
    /// or the screen props are replaced.
    pub fn get_screen_details(&self, scene: &Scene) -> Arc<ScreenDetails> {
        self.shared.screen_details(scene)
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Should a touch on the focused card become a back gesture?
    pub fn should_set_responder(&self, event: &GestureEvent, gesture: &GestureState) -> bool {
        let shared = &self.shared;
        let (scene, check, screen_props) = {
            let engine = shared.engine.lock();
            let Some(scene) = active_scene(&engine.scenes).cloned() else {
                return false;
            };
            let check = ResponderCheck {
                scene_index: scene.index,
                index: engine.state.index(),
                immediate_index: engine.immediate_index,
                layout: engine.layout,
            };
            (scene, check, engine.screen_props.clone())
        };

        let details = shared.screen_details(&scene);
        if !shared.gestures_enabled(&details, screen_props.as_deref()) {
            return false;
        }
        should_respond(&shared.axis, &check, event, gesture, &shared.config.gesture)
    }

    /// The stack was granted the gesture
    ///
    /// Any running animation is stopped where it is. A back animation that is
    /// interrupted this way does not dispatch `BACK`.
    pub fn handle_gesture_start(&self) {
        let shared = &self.shared;
        let current = shared.position.value();
        {
            let mut engine = shared.engine.lock();
            engine.is_responding = true;
            engine.gesture_start_value = current;
            engine.gesture_start_pending = true;
        }
        tracing::debug!(position = current, "Back gesture started");

        let weak = Arc::downgrade(shared);
        shared.position.stop_animation(move |value| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut engine = shared.engine.lock();
            if engine.gesture_start_pending {
                engine.gesture_start_value = value;
                engine.gesture_start_pending = false;
            }
        });
    }

    /// Follow the finger
    pub fn handle_gesture_move(&self, gesture: &GestureState) {
        let shared = &self.shared;
        let (start, index, length) = {
            let mut engine = shared.engine.lock();
            if !engine.is_responding {
                return;
            }
            engine.gesture_start_pending = false;
            (
                engine.gesture_start_value,
                engine.state.index(),
                shared.axis.length(&engine.layout),
            )
        };
        if length <= 0.0 {
            return;
        }
        let value = drag_position(start, shared.axis.delta(gesture), length, index);
        shared.position.set_value(value);
    }

    /// The finger was lifted
    pub fn handle_gesture_release(&self, gesture: &GestureState) {
        let shared = &self.shared;
        let (index, target) = {
            let mut engine = shared.engine.lock();
            if !engine.is_responding {
                return;
            }
            engine.is_responding = false;
            let index = engine.state.index();
            (index, engine.immediate_index.unwrap_or(index))
        };

        let velocity = shared.axis.velocity(gesture);
        let spring_velocity = velocity * shared.config.gesture.animated_velocity_ratio;
        let weak = Arc::downgrade(shared);
        shared.position.stop_animation(move |value| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let decision = decide_release(value, index, velocity, &shared.config.gesture);
            tracing::debug!(position = value, velocity, ?decision, "Back gesture released");
            match decision {
                ReleaseDecision::Reset => shared.reset(target, spring_velocity),
                ReleaseDecision::Back => shared.go_back(target, spring_velocity),
            }
        });
    }

    /// Another view took the gesture
    pub fn handle_gesture_terminate(&self) {
        let shared = &self.shared;
        let target = {
            let mut engine = shared.engine.lock();
            engine.is_responding = false;
            engine.immediate_index.unwrap_or(engine.state.index())
        };
        tracing::debug!("Back gesture terminated");
        shared.reset(target, 0.0);
    }

    /// Animate back to the previous card, then dispatch `BACK`
    ///
    /// Returns false at the root or while a gesture is in progress.
    pub fn go_back(&self) -> bool {
        let from = {
            let engine = self.shared.engine.lock();
            if engine.is_responding {
                return false;
            }
            engine.immediate_index.unwrap_or(engine.state.index())
        };
        if from == 0 {
            tracing::debug!("Already at the first card");
            return false;
        }
        self.shared.go_back(from, 0.0);
        true
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// Render every scene as a card
    ///
    /// Fails if a scene's route has no registered screen.
    pub fn render(&self) -> Result<CardStackFrame> {
        let shared = &self.shared;
        let position = shared.position.value();
        let (scenes, index, layout, screen_props, configurer, prev_index) = {
            let engine = shared.engine.lock();
            (
                engine.scenes.clone(),
                engine.state.index(),
                engine.layout,
                engine.screen_props.clone(),
                engine.transition_configurer.clone(),
                engine.prev_index,
            )
        };
        let screen_props = screen_props.as_deref();

        let props = shared.transition_props(layout, position, index);
        let prev = prev_index.map(|index| TransitionProps { index, ..props });
        let transition = get_transition_config(
            configurer.as_ref(),
            &props,
            prev.as_ref(),
            shared.is_modal(),
            &shared.config.platform,
        );
        let header_mode = shared.config.resolved_header_mode();

        let mut header = None;
        let mut cards = Vec::with_capacity(scenes.len());
        for scene in scenes {
            let details = shared.screen_details(&scene);
            let component = shared
                .router
                .get_component_for_route_name(&scene.route.route_name)?;
            let card_header = match header_mode {
                HeaderMode::Screen => shared.header(&scene, &details, header_mode, screen_props),
                HeaderMode::Float if scene.is_active => {
                    header = shared.header(&scene, &details, header_mode, screen_props);
                    None
                }
                _ => None,
            };
            cards.push(CardFrame {
                style: transition.style_for(&props, &scene),
                gestures_enabled: shared.gestures_enabled(&details, screen_props),
                navigation: details.navigation.clone(),
                header: card_header,
                component,
                scene,
            });
        }

        Ok(CardStackFrame {
            position,
            index,
            header_mode,
            header,
            cards,
        })
    }
}

impl fmt::Debug for CardStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let engine = self.shared.engine.lock();
        f.debug_struct("CardStack")
            .field("state", &engine.state)
            .field("scenes", &engine.scenes.len())
            .field("is_responding", &engine.is_responding)
            .field("immediate_index", &engine.immediate_index)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================
