//! Transition configuration and card style interpolators
//!
//! Interpolators map the continuous stack position to the style of each
//! card. They are pure and cheap, and are evaluated on every render because
//! the position changes continuously while a gesture or animation runs.

use nav_core::Scene;
use std::fmt;
use std::sync::Arc;

use crate::config::{PlatformConfig, PlatformOs};
use crate::spring::SpringConfig;

// =============================================================================
// Layout and Styles
// =============================================================================

/// Measured size of the card stack
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Layout {
    /// Width in px
    pub width: f64,
    /// Height in px
    pub height: f64,
}

impl Layout {
    /// Create a layout
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Check if the layout has been measured
    pub fn is_measured(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Length of the gesture axis
    pub fn axis_length(&self, vertical: bool) -> f64 {
        if vertical {
            self.height
        } else {
            self.width
        }
    }
}

/// Visual offsets of one card
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardStyle {
    /// Opacity, 0 to 1
    pub opacity: f64,
    /// Horizontal offset in px
    pub translate_x: f64,
    /// Vertical offset in px
    pub translate_y: f64,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            translate_x: 0.0,
            translate_y: 0.0,
        }
    }
}

/// Inputs shared by all cards during one render
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionProps {
    /// Stack layout
    pub layout: Layout,
    /// Continuous stack position
    pub position: f64,
    /// Committed navigation index
    pub index: usize,
    /// Right-to-left layout
    pub rtl: bool,
}

/// Piecewise-linear interpolation, clamped outside the input range
pub fn interpolate(value: f64, input: &[f64], output: &[f64]) -> f64 {
    debug_assert_eq!(input.len(), output.len());
    debug_assert!(!input.is_empty());
    if value <= input[0] {
        return output[0];
    }
    for window in 0..input.len() - 1 {
        let (x0, x1) = (input[window], input[window + 1]);
        if value <= x1 {
            let (y0, y1) = (output[window], output[window + 1]);
            if x1 == x0 {
                return y1;
            }
            return y0 + (value - x0) / (x1 - x0) * (y1 - y0);
        }
    }
    output[output.len() - 1]
}

fn input_range(scene: &Scene) -> [f64; 4] {
    let index = scene.index as f64;
    [index - 1.0, index, index + 0.99, index + 1.0]
}

// =============================================================================
// Interpolators
// =============================================================================

/// Maps transition props to a card style
pub type ScreenInterpolator = Arc<dyn Fn(&TransitionProps, &Scene) -> CardStyle + Send + Sync>;

/// Style used before the layout is measured: only the focused card is shown
pub fn for_initial(props: &TransitionProps, scene: &Scene) -> CardStyle {
    let focused = props.index == scene.index;
    let translate = if focused { 0.0 } else { 1_000_000.0 };
    CardStyle {
        opacity: if focused { 1.0 } else { 0.0 },
        translate_x: translate,
        translate_y: translate,
    }
}

/// Cards slide in from the trailing edge
pub fn for_horizontal(props: &TransitionProps, scene: &Scene) -> CardStyle {
    if !props.layout.is_measured() {
        return for_initial(props, scene);
    }
    let range = input_range(scene);
    let width = props.layout.width;
    let output = if props.rtl {
        [-width, 0.0, 10.0, 10.0]
    } else {
        [width, 0.0, -10.0, -10.0]
    };
    CardStyle {
        opacity: interpolate(props.position, &range, &[1.0, 1.0, 0.3, 0.0]),
        translate_x: interpolate(props.position, &range, &output),
        translate_y: 0.0,
    }
}

/// Cards slide up from the bottom
pub fn for_vertical(props: &TransitionProps, scene: &Scene) -> CardStyle {
    if !props.layout.is_measured() {
        return for_initial(props, scene);
    }
    let range = input_range(scene);
    let height = props.layout.height;
    CardStyle {
        opacity: interpolate(props.position, &range, &[1.0, 1.0, 0.3, 0.0]),
        translate_x: 0.0,
        translate_y: interpolate(props.position, &range, &[height, 0.0, 0.0, 0.0]),
    }
}

/// Cards fade in while rising slightly
pub fn for_fade_from_bottom(props: &TransitionProps, scene: &Scene) -> CardStyle {
    if !props.layout.is_measured() {
        return for_initial(props, scene);
    }
    let range = input_range(scene);
    CardStyle {
        opacity: interpolate(props.position, &range, &[0.0, 1.0, 1.0, 0.0]),
        translate_x: 0.0,
        translate_y: interpolate(props.position, &range, &[50.0, 0.0, 0.0, 0.0]),
    }
}

// =============================================================================
// Transition Config
// =============================================================================

/// How cards animate
#[derive(Clone)]
pub struct TransitionConfig {
    /// Card style interpolator
    pub screen_interpolator: ScreenInterpolator,
    /// Spring for programmatic transitions; the engine's spring when `None`
    pub transition_spec: Option<SpringConfig>,
}

impl TransitionConfig {
    /// Horizontal slide
    pub fn slide_from_right() -> Self {
        Self {
            screen_interpolator: Arc::new(for_horizontal),
            transition_spec: None,
        }
    }

    /// Vertical slide for modals
    pub fn modal_slide_from_bottom() -> Self {
        Self {
            screen_interpolator: Arc::new(for_vertical),
            transition_spec: None,
        }
    }

    /// Android fade
    pub fn fade_from_bottom() -> Self {
        Self {
            screen_interpolator: Arc::new(for_fade_from_bottom),
            transition_spec: None,
        }
    }

    /// Style of one card
    pub fn style_for(&self, props: &TransitionProps, scene: &Scene) -> CardStyle {
        (self.screen_interpolator)(props, scene)
    }
}

impl fmt::Debug for TransitionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionConfig")
            .field("transition_spec", &self.transition_spec)
            .finish_non_exhaustive()
    }
}

/// Partial transition config supplied by the application
#[derive(Clone, Default)]
pub struct TransitionOverride {
    /// Replacement interpolator
    pub screen_interpolator: Option<ScreenInterpolator>,
    /// Replacement spring
    pub transition_spec: Option<SpringConfig>,
}

/// Produces an override for a transition
pub type TransitionConfigurer = Arc<
    dyn Fn(&TransitionProps, Option<&TransitionProps>, bool) -> TransitionOverride + Send + Sync,
>;

/// Platform default for a transition
pub fn default_transition_config(is_modal: bool, platform: &PlatformConfig) -> TransitionConfig {
    if platform.os == PlatformOs::Android {
        TransitionConfig::fade_from_bottom()
    } else if is_modal {
        TransitionConfig::modal_slide_from_bottom()
    } else {
        TransitionConfig::slide_from_right()
    }
}

/// Resolve the transition config, merging an application override over the
/// platform default
pub fn get_transition_config(
    configurer: Option<&TransitionConfigurer>,
    transition_props: &TransitionProps,
    prev_transition_props: Option<&TransitionProps>,
    is_modal: bool,
    platform: &PlatformConfig,
) -> TransitionConfig {
    let mut config = default_transition_config(is_modal, platform);
    if let Some(configurer) = configurer {
        let over = configurer(transition_props, prev_transition_props, is_modal);
        if let Some(interpolator) = over.screen_interpolator {
            config.screen_interpolator = interpolator;
        }
        if over.transition_spec.is_some() {
            config.transition_spec = over.transition_spec;
        }
    }
    config
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use nav_core::{Route, RouteParams};

    fn scene(index: usize) -> Scene {
        Scene {
            key: format!("scene_{}", index),
            index,
            route: Arc::new(Route::with_key(index.to_string(), "Card", RouteParams::new())),
            is_stale: false,
            is_active: false,
        }
    }

    fn props(position: f64, index: usize) -> TransitionProps {
        TransitionProps {
            layout: Layout::new(300.0, 600.0),
            position,
            index,
            rtl: false,
        }
    }

    #[test]
    fn test_interpolate_clamps() {
        let input = [0.0, 1.0];
        let output = [0.0, 100.0];
        assert_eq!(interpolate(-1.0, &input, &output), 0.0);
        assert_eq!(interpolate(0.25, &input, &output), 25.0);
        assert_eq!(interpolate(2.0, &input, &output), 100.0);
    }

    #[test]
    fn test_horizontal_focused_card_is_in_place() {
        let style = for_horizontal(&props(1.0, 1), &scene(1));
        assert_eq!(style, CardStyle::default());
    }

    #[test]
    fn test_horizontal_incoming_card_offscreen() {
        let style = for_horizontal(&props(0.0, 0), &scene(1));
        assert_eq!(style.translate_x, 300.0);
        assert_eq!(style.opacity, 1.0);
    }

    #[test]
    fn test_horizontal_halfway() {
        let style = for_horizontal(&props(0.5, 1), &scene(1));
        assert_eq!(style.translate_x, 150.0);
        let below = for_horizontal(&props(0.5, 1), &scene(0));
        assert!(below.translate_x < 0.0);
        assert!(below.opacity < 1.0);
    }

    #[test]
    fn test_horizontal_rtl_mirrors() {
        let mut p = props(0.0, 0);
        p.rtl = true;
        assert_eq!(for_horizontal(&p, &scene(1)).translate_x, -300.0);
    }

    #[test]
    fn test_vertical_slides_from_bottom() {
        let style = for_vertical(&props(0.0, 0), &scene(1));
        assert_eq!(style.translate_y, 600.0);
        assert_eq!(style.translate_x, 0.0);
    }

    #[test]
    fn test_fade_from_bottom() {
        let style = for_fade_from_bottom(&props(0.0, 0), &scene(1));
        assert_eq!(style.opacity, 0.0);
        assert_eq!(style.translate_y, 50.0);
    }

    #[test]
    fn test_unmeasured_layout_uses_initial() {
        let mut p = props(1.0, 1);
        p.layout = Layout::default();
        assert_eq!(for_horizontal(&p, &scene(1)).opacity, 1.0);
        assert_eq!(for_horizontal(&p, &scene(0)).opacity, 0.0);
    }

    #[test]
    fn test_default_config_by_platform_and_mode() {
        let p = props(0.0, 0);
        let card = scene(1);
        let ios = default_transition_config(false, &PlatformConfig::ios());
        assert_eq!(ios.style_for(&p, &card).translate_x, 300.0);

        let modal = default_transition_config(true, &PlatformConfig::ios());
        assert_eq!(modal.style_for(&p, &card).translate_y, 600.0);

        let android = default_transition_config(false, &PlatformConfig::android());
        assert_eq!(android.style_for(&p, &card).translate_y, 50.0);
    }

    #[test]
    fn test_override_merges_over_default() {
        let configurer: TransitionConfigurer = Arc::new(|_: &TransitionProps, _: Option<&TransitionProps>, _: bool| TransitionOverride {
            screen_interpolator: Some(Arc::new(|_: &TransitionProps, _: &Scene| CardStyle {
                opacity: 0.5,
                translate_x: 0.0,
                translate_y: 0.0,
            })),
            transition_spec: None,
        });
        let p = props(0.0, 0);
        let config = get_transition_config(Some(&configurer), &p, None, false, &PlatformConfig::ios());
        assert_eq!(config.style_for(&p, &scene(1)).opacity, 0.5);
        assert!(config.transition_spec.is_none());
    }

    #[test]
    fn test_override_sees_previous_props() {
        let stiff = SpringConfig::critically_damped(900.0);
        let configurer: TransitionConfigurer = Arc::new(move |props: &TransitionProps, prev: Option<&TransitionProps>, _: bool| TransitionOverride {
            screen_interpolator: None,
            transition_spec: match prev {
                Some(prev) if prev.index > props.index => Some(stiff),
                _ => None,
            },
        });
        let back = get_transition_config(
            Some(&configurer),
            &props(1.0, 0),
            Some(&props(1.0, 1)),
            false,
            &PlatformConfig::ios(),
        );
        assert_eq!(back.transition_spec, Some(stiff));
    }
}
