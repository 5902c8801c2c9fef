//! Back gesture recognition
//!
//! Pure decision functions used by the card stack's gesture handlers. All
//! distances are in px and velocities in px per ms, as reported by the
//! platform's gesture recognizer.

use serde::{Deserialize, Serialize};

use crate::config::{CardMode, GestureConfig, PlatformConfig};
use crate::transition::Layout;

/// Touch position of a gesture event
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureEvent {
    /// Touch x in page coordinates
    pub page_x: f64,
    /// Touch y in page coordinates
    pub page_y: f64,
}

/// Accumulated gesture since the touch began
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureState {
    /// Net horizontal drag
    pub dx: f64,
    /// Net vertical drag
    pub dy: f64,
    /// Horizontal velocity
    pub vx: f64,
    /// Vertical velocity
    pub vy: f64,
}

/// Axis on which back gestures are tracked
///
/// Deltas and velocities are reported along the back direction: positive
/// values move toward the previous card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureAxis {
    /// Vertical axis (modal)
    pub vertical: bool,
    /// Mirrored horizontal axis
    pub rtl: bool,
}

impl GestureAxis {
    /// Axis for a presentation mode and platform
    pub fn new(mode: CardMode, platform: &PlatformConfig) -> Self {
        let vertical = mode.is_vertical();
        Self {
            vertical,
            rtl: !vertical && platform.is_rtl(),
        }
    }

    fn signed(&self, value: f64) -> f64 {
        if self.rtl {
            -value
        } else {
            value
        }
    }

    /// Drag distance toward the previous card
    pub fn delta(&self, gesture: &GestureState) -> f64 {
        self.signed(if self.vertical { gesture.dy } else { gesture.dx })
    }

    /// Velocity toward the previous card
    pub fn velocity(&self, gesture: &GestureState) -> f64 {
        self.signed(if self.vertical { gesture.vy } else { gesture.vx })
    }

    /// Length of the axis in the layout
    pub fn length(&self, layout: &Layout) -> f64 {
        layout.axis_length(self.vertical)
    }

    /// Distance from the leading edge to where the touch began
    pub fn edge_distance(&self, event: &GestureEvent, gesture: &GestureState, layout: &Layout) -> f64 {
        if self.vertical {
            event.page_y - gesture.dy
        } else {
            let origin = event.page_x - gesture.dx;
            if self.rtl {
                layout.width - origin
            } else {
                origin
            }
        }
    }
}

/// Navigator state seen by the gesture-start check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResponderCheck {
    /// Index of the focused scene
    pub scene_index: usize,
    /// Committed navigation index
    pub index: usize,
    /// Index a running back animation is heading to
    pub immediate_index: Option<usize>,
    /// Stack layout
    pub layout: Layout,
}

/// Decide whether a touch should become a back gesture
pub fn should_respond(
    axis: &GestureAxis,
    check: &ResponderCheck,
    event: &GestureEvent,
    gesture: &GestureState,
    config: &GestureConfig,
) -> bool {
    if check.scene_index != check.index {
        return false;
    }
    let edge_distance = axis.edge_distance(event, gesture, &check.layout);
    if edge_distance > config.response_distance(axis.vertical) {
        return false;
    }
    let dragged_enough = axis.delta(gesture).abs() > config.respond_threshold;
    let measured = axis.length(&check.layout) > 0.0;
    let effective_index = check.immediate_index.unwrap_or(check.index);
    dragged_enough && measured && effective_index != 0
}

/// Position while dragging, clamped between the previous and current card
pub fn drag_position(start: f64, delta: f64, axis_length: f64, index: usize) -> f64 {
    let index = index as f64;
    let value = start - delta / axis_length;
    value.clamp(index - 1.0, index)
}

/// Outcome of releasing a back gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseDecision {
    /// Spring back to the current card
    Reset,
    /// Complete the back transition
    Back,
}

/// Judge intent on release
///
/// A decisive fling wins; otherwise the card goes back once it has crossed
/// the position threshold. Both velocity bounds are strict.
pub fn decide_release(
    position: f64,
    index: usize,
    velocity: f64,
    config: &GestureConfig,
) -> ReleaseDecision {
    if velocity < -config.velocity_threshold {
        return ReleaseDecision::Reset;
    }
    if velocity > config.velocity_threshold {
        return ReleaseDecision::Back;
    }
    if position <= index as f64 - config.position_threshold {
        ReleaseDecision::Back
    } else {
        ReleaseDecision::Reset
    }
}

// =============================================================================
// Tests
// =============================================================================
