//! Card stack configuration
//!
//! Every platform-dependent value the card stack uses is collected here and
//! resolved once when the engine is constructed.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;
use crate::spring::SpringConfig;

/// Duration of a card transition in milliseconds
pub const ANIMATION_DURATION_MS: u64 = 200;

// =============================================================================
// Modes
// =============================================================================

/// How cards enter and leave
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardMode {
    /// Cards slide horizontally
    #[default]
    Card,
    /// Cards slide up from the bottom
    Modal,
}

impl CardMode {
    /// Gestures and transitions run on the vertical axis
    pub fn is_vertical(&self) -> bool {
        matches!(self, CardMode::Modal)
    }
}

/// Where headers are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// One header above the stack, showing the focused scene
    Float,
    /// Each card renders its own header
    Screen,
    /// No headers
    None,
}

// =============================================================================
// Platform
// =============================================================================

/// Target platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformOs {
    /// iOS
    #[default]
    Ios,
    /// Android
    Android,
}

/// Horizontal layout direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutDirection {
    /// Left to right
    #[default]
    Ltr,
    /// Right to left
    Rtl,
}

/// Platform-dependent behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformConfig {
    /// Target platform
    pub os: PlatformOs,
    /// Layout direction
    pub layout_direction: LayoutDirection,
    /// Whether back gestures are on when a screen does not say;
    /// platform default when omitted
    pub gestures_enabled_by_default: Option<bool>,
}

impl PlatformConfig {
    /// iOS, left to right
    pub fn ios() -> Self {
        Self::default()
    }

    /// Android, left to right
    pub fn android() -> Self {
        Self {
            os: PlatformOs::Android,
            ..Self::default()
        }
    }

    /// Switch to right-to-left layout
    pub fn rtl(mut self) -> Self {
        self.layout_direction = LayoutDirection::Rtl;
        self
    }

    /// Whether screens accept back gestures unless they opt out
    pub fn gestures_enabled(&self) -> bool {
        self.gestures_enabled_by_default
            .unwrap_or(self.os == PlatformOs::Ios)
    }

    /// Platform without a native navigation bar history; headers scroll
    /// with their screens
    pub fn prefers_screen_headers(&self) -> bool {
        self.os == PlatformOs::Android
    }

    /// Right-to-left layout
    pub fn is_rtl(&self) -> bool {
        self.layout_direction == LayoutDirection::Rtl
    }
}

// =============================================================================
// Gesture Tunables
// =============================================================================

/// Gesture recognition tunables
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureConfig {
    /// Band from the leading edge where horizontal gestures may start (px)
    pub response_distance_horizontal: f64,
    /// Band from the top edge where vertical gestures may start (px)
    pub response_distance_vertical: f64,
    /// Drag distance before a gesture is recognized (px)
    pub respond_threshold: f64,
    /// Fraction of the axis that must be crossed to go back
    pub position_threshold: f64,
    /// Release speed (units per ms) that decides intent on its own
    pub velocity_threshold: f64,
    /// Gesture velocity to spring velocity ratio
    pub animated_velocity_ratio: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            response_distance_horizontal: 35.0,
            response_distance_vertical: 135.0,
            respond_threshold: 12.0,
            position_threshold: 1.0 / 3.0,
            velocity_threshold: 0.5,
            animated_velocity_ratio: -4.0,
        }
    }
}

impl GestureConfig {
    /// Edge band for the given axis
    pub fn response_distance(&self, vertical: bool) -> f64 {
        if vertical {
            self.response_distance_vertical
        } else {
            self.response_distance_horizontal
        }
    }
}

// =============================================================================
// Card Stack Config
// =============================================================================

/// Complete card stack configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardStackConfig {
    /// Card or modal presentation
    pub mode: CardMode,
    /// Explicit header mode; derived from platform and mode when omitted
    pub header_mode: Option<HeaderMode>,
    /// Platform behaviour
    pub platform: PlatformConfig,
    /// Gesture tunables
    pub gesture: GestureConfig,
    /// Spring used for transitions
    pub spring: SpringConfig,
    /// Nominal transition duration in milliseconds
    ///
    /// Informational only. Transitions are spring driven and settle when the
    /// spring comes to rest, so this value does not time any animation.
    pub animation_duration_ms: u64,
    /// Drive the stack position off the UI thread
    pub use_native_driver: bool,
}

impl Default for CardStackConfig {
    fn default() -> Self {
        Self {
            mode: CardMode::Card,
            header_mode: None,
            platform: PlatformConfig::default(),
            gesture: GestureConfig::default(),
            spring: SpringConfig::default(),
            animation_duration_ms: ANIMATION_DURATION_MS,
            use_native_driver: false,
        }
    }
}

impl CardStackConfig {
    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: CardStackConfig = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    /// Load a configuration file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Replace unusable values with defaults
    pub fn validated(mut self) -> Self {
        if !self.spring.is_valid() {
            tracing::warn!(spring = ?self.spring, "Invalid spring configuration, using default");
            self.spring = SpringConfig::default();
        }
        let defaults = GestureConfig::default();
        if !(self.gesture.position_threshold > 0.0 && self.gesture.position_threshold < 1.0) {
            tracing::warn!(
                threshold = self.gesture.position_threshold,
                "Position threshold must be between 0 and 1, using default"
            );
            self.gesture.position_threshold = defaults.position_threshold;
        }
        if self.gesture.velocity_threshold < 0.0 {
            tracing::warn!(
                threshold = self.gesture.velocity_threshold,
                "Negative velocity threshold, using default"
            );
            self.gesture.velocity_threshold = defaults.velocity_threshold;
        }
        self
    }

    /// Header mode after applying platform and mode defaults
    pub fn resolved_header_mode(&self) -> HeaderMode {
        if let Some(mode) = self.header_mode {
            return mode;
        }
        if self.platform.prefers_screen_headers() || self.mode == CardMode::Modal {
            HeaderMode::Screen
        } else {
            HeaderMode::Float
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_tunables() {
        let config = CardStackConfig::default();
        assert_eq!(config.gesture.response_distance(false), 35.0);
        assert_eq!(config.gesture.response_distance(true), 135.0);
        assert_eq!(config.gesture.respond_threshold, 12.0);
        assert_eq!(config.gesture.velocity_threshold, 0.5);
        assert_eq!(config.gesture.animated_velocity_ratio, -4.0);
        assert_eq!(config.animation_duration_ms, 200);
        assert!(!config.use_native_driver);
    }

    #[test]
    fn test_header_mode_resolution() {
        let mut config = CardStackConfig::default();
        assert_eq!(config.resolved_header_mode(), HeaderMode::Float);

        config.mode = CardMode::Modal;
        assert_eq!(config.resolved_header_mode(), HeaderMode::Screen);

        config.mode = CardMode::Card;
        config.platform = PlatformConfig::android();
        assert_eq!(config.resolved_header_mode(), HeaderMode::Screen);

        config.header_mode = Some(HeaderMode::Float);
        assert_eq!(config.resolved_header_mode(), HeaderMode::Float);
    }

    #[test]
    fn test_platform_gesture_defaults() {
        assert!(PlatformConfig::ios().gestures_enabled());
        assert!(!PlatformConfig::android().gestures_enabled());
        let forced = PlatformConfig {
            gestures_enabled_by_default: Some(true),
            ..PlatformConfig::android()
        };
        assert!(forced.gestures_enabled());
    }

    #[test]
    fn test_from_json_partial() {
        let config = CardStackConfig::from_json_str(
            r#"{ "mode": "modal", "platform": { "layoutDirection": "rtl" }, "gesture": { "velocityThreshold": 0.8 } }"#,
        )
        .unwrap();
        assert_eq!(config.mode, CardMode::Modal);
        assert!(config.platform.is_rtl());
        assert_eq!(config.gesture.velocity_threshold, 0.8);
        assert_eq!(config.gesture.respond_threshold, 12.0);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = CardStackConfig::from_json_str(
            r#"{ "spring": { "stiffness": 0 }, "gesture": { "positionThreshold": 2.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.spring, SpringConfig::default());
        assert_eq!(config.gesture.position_threshold, 1.0 / 3.0);
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "headerMode": "none", "useNativeDriver": true }}"#).unwrap();
        let config = CardStackConfig::from_path(file.path()).unwrap();
        assert_eq!(config.resolved_header_mode(), HeaderMode::None);
        assert!(config.use_native_driver);
    }

    #[test]
    fn test_from_path_missing_file() {
        let err = CardStackConfig::from_path("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::error::CardStackError::Io(_)));
    }
}
