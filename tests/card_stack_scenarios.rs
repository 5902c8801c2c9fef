//! Card Stack Scenarios
//!
//! End-to-end tests wiring a card stack to a real navigator: gestures drive
//! the position, the engine dispatches BACK, and the navigator feeds the new
//! state back into the engine.

use card_stack::{
    CardStack, CardStackConfig, GestureEvent, GestureState, Layout, NativeDriver,
    ScreenComponent, StackRouter, DEFAULT_FRAME_INTERVAL,
};
use nav_core::{Dispatch, NavigationAction, Navigator};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);
const WIDTH: f64 = 300.0;

#[derive(Debug)]
struct Screen(&'static str);

impl ScreenComponent for Screen {
    fn name(&self) -> &str {
        self.0
    }
}

struct Harness {
    navigator: Arc<Navigator>,
    stack: CardStack,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn harness(names: &[&str], config: CardStackConfig) -> Harness {
    init_tracing();
    let router = Arc::new(
        StackRouter::builder()
            .route("A", Arc::new(Screen("ScreenA")))
            .route("B", Arc::new(Screen("ScreenB")))
            .route("C", Arc::new(Screen("ScreenC")))
            .build()
            .unwrap(),
    );
    let navigator = Arc::new(Navigator::new(router.clone()).unwrap());
    for name in &names[1..] {
        assert!(navigator.dispatch(NavigationAction::navigate(*name)));
    }

    let stack = CardStack::new(router, navigator.clone(), navigator.state(), config).unwrap();
    stack.set_layout(Layout::new(WIDTH, 640.0));
    let listener = stack.clone();
    navigator.subscribe(move |state| {
        listener.update(state.clone()).unwrap();
    });

    Harness { navigator, stack }
}

fn settle(stack: &CardStack) {
    let position = stack.position();
    for _ in 0..2000 {
        if !position.tick(FRAME) {
            return;
        }
    }
    panic!("position did not settle");
}

fn grab(stack: &CardStack) -> bool {
    let event = GestureEvent { page_x: 30.0, page_y: 300.0 };
    let gesture = GestureState { dx: 20.0, ..GestureState::default() };
    if !stack.should_set_responder(&event, &gesture) {
        return false;
    }
    stack.handle_gesture_start();
    true
}

fn drag_and_release(stack: &CardStack, dx: f64, vx: f64) {
    let moved = GestureState { dx, ..GestureState::default() };
    stack.handle_gesture_move(&moved);
    stack.handle_gesture_release(&GestureState { vx, ..moved });
}

fn route_names(navigator: &Navigator) -> Vec<String> {
    navigator
        .state()
        .routes()
        .iter()
        .map(|route| route.route_name.clone())
        .collect()
}

/// Swiping 40% of the width and letting go pops the top card
#[test]
fn test_swipe_back_pops_card() {
    let Harness { navigator, stack } = harness(&["A", "B"], CardStackConfig::default());
    let ends = Arc::new(AtomicUsize::new(0));
    let counter = ends.clone();
    stack.on_transition_end(move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.05);
    settle(&stack);

    let state = navigator.state();
    assert_eq!(state.index(), 0);
    assert_eq!(route_names(&navigator), vec!["A"]);
    assert_eq!(stack.position().value(), 0.0);
    assert_eq!(stack.scenes().len(), 1);
    assert_eq!(ends.load(Ordering::SeqCst), 1);
}

/// Catching the card while it animates back cancels the pop
#[test]
fn test_regrab_during_back_animation_prevents_pop() {
    let Harness { navigator, stack } = harness(&["A", "B"], CardStackConfig::default());
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.05);

    let position = stack.position();
    for _ in 0..3 {
        position.tick(FRAME);
    }
    assert!(position.is_animating());

    stack.handle_gesture_start();
    drag_and_release(&stack, 0.0, -1.0);
    settle(&stack);

    assert_eq!(route_names(&navigator), vec!["A", "B"]);
    assert_eq!(stack.position().value(), 1.0);
    assert_eq!(stack.immediate_index(), None);
}

/// Releasing exactly one third of the way back goes back
#[test]
fn test_position_threshold_is_inclusive() {
    let Harness { navigator, stack } = harness(&["A", "B"], CardStackConfig::default());
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH / 3.0, 0.0);
    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A"]);
}

/// Release velocities of exactly 0.5 fall through to the position rule
#[test]
fn test_velocity_thresholds_are_strict() {
    let Harness { navigator, stack } = harness(&["A", "B"], CardStackConfig::default());
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.1, 0.5);
    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A", "B"]);

    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.5, -0.5);
    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A"]);
}

/// A second swipe during a back animation on a deep stack is accepted and
/// still pops only one card
#[test]
fn test_rapid_swipes_on_deep_stack() {
    let Harness { navigator, stack } = harness(&["A", "B", "C"], CardStackConfig::default());
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.0);
    assert_eq!(stack.immediate_index(), Some(1));

    let position = stack.position();
    position.tick(FRAME);
    position.tick(FRAME);

    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.0);
    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A", "B"]);

    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.5, 0.0);
    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A"]);

    // Nothing left to swipe back to
    assert!(!grab(&stack));
}

/// Chained programmatic backs commit only once the last animation settles
#[test]
fn test_chained_go_back_waits_for_settle() {
    let Harness { navigator, stack } = harness(&["A", "B", "C"], CardStackConfig::default());
    assert!(stack.go_back());
    stack.position().tick(FRAME);
    assert!(stack.go_back());
    assert_eq!(route_names(&navigator), vec!["A", "B", "C"]);

    let position = stack.position();
    for _ in 0..3 {
        position.tick(FRAME);
    }
    assert!(position.is_animating());
    assert_eq!(route_names(&navigator), vec!["A", "B", "C"]);

    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A"]);
    assert_eq!(stack.position().value(), 0.0);
    assert_eq!(stack.scenes().len(), 1);
}

/// A screen pushed while the card animates back survives the animation
#[test]
fn test_push_during_back_animation_keeps_new_route() {
    let Harness { navigator, stack } = harness(&["A", "B"], CardStackConfig::default());
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.0);
    stack.position().tick(FRAME);

    assert!(navigator.dispatch(NavigationAction::navigate("C")));
    assert_eq!(route_names(&navigator), vec!["A", "B", "C"]);

    settle(&stack);
    assert_eq!(route_names(&navigator), vec!["A", "B", "C"]);
    assert_eq!(stack.position().value(), 2.0);
    assert_eq!(stack.immediate_index(), None);
}

/// Pushing a screen animates the new card in from the trailing edge
#[test]
fn test_push_animates_new_card() {
    let Harness { navigator, stack } = harness(&["A"], CardStackConfig::default());
    navigator.dispatch(NavigationAction::navigate("B"));
    assert_eq!(stack.state().index(), 1);

    let frame = stack.render().unwrap();
    let incoming = frame.active_card().unwrap();
    assert_eq!(incoming.component.name(), "ScreenB");
    assert_eq!(incoming.style.translate_x, WIDTH);

    settle(&stack);
    let frame = stack.render().unwrap();
    assert_eq!(frame.active_card().unwrap().style.translate_x, 0.0);
    assert_eq!(frame.header.unwrap().title, None);
}

/// With a native driver the release decision waits for the driver's read
#[tokio::test(start_paused = true)]
async fn test_native_driver_swipe_back() {
    let config = CardStackConfig {
        use_native_driver: true,
        ..CardStackConfig::default()
    };
    let Harness { navigator, stack } = harness(&["A", "B"], config);
    assert!(stack.position().is_native_driven());
    assert_eq!(stack.position().listener_count(), 1);

    let driver = NativeDriver::spawn(vec![stack.position()], DEFAULT_FRAME_INTERVAL);
    assert!(grab(&stack));
    drag_and_release(&stack, WIDTH * 0.4, 0.0);
    assert_eq!(route_names(&navigator), vec!["A", "B"]);

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(route_names(&navigator), vec!["A"]);
    assert_eq!(stack.position().value(), 0.0);
    driver.stop();
}
