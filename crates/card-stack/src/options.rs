//! Screen options
//!
//! Options are either literal values or functions of the navigation context.
//! They are stored unresolved and resolved through [`resolve_option`] each
//! time they are read, so a title derived from route params follows the
//! params without invalidating anything.

use nav_core::{NavigationProp, Scene};
use std::fmt;
use std::sync::Arc;

use crate::config::HeaderMode;

/// Properties shared by every screen of a navigator
pub type ScreenProps = serde_json::Value;

/// What dynamic options are computed from
#[derive(Debug, Clone, Copy)]
pub struct OptionContext<'a> {
    /// Navigation prop of the screen
    pub navigation: &'a NavigationProp,
    /// Navigator-wide screen props
    pub screen_props: Option<&'a ScreenProps>,
}

type OptionFn<T> = Arc<dyn Fn(&OptionContext<'_>) -> T + Send + Sync>;

/// A literal option or a function of the navigation context
pub enum OptionValue<T> {
    /// Literal value
    Static(T),
    /// Computed at render time
    Dynamic(OptionFn<T>),
}

impl<T: Clone> OptionValue<T> {
    /// Wrap a function
    pub fn dynamic<F>(f: F) -> Self
    where
        F: Fn(&OptionContext<'_>) -> T + Send + Sync + 'static,
    {
        OptionValue::Dynamic(Arc::new(f))
    }

    /// Resolve against a navigation context
    pub fn resolve(&self, ctx: &OptionContext<'_>) -> T {
        match self {
            OptionValue::Static(value) => value.clone(),
            OptionValue::Dynamic(f) => f(ctx),
        }
    }
}

impl<T> From<T> for OptionValue<T> {
    fn from(value: T) -> Self {
        OptionValue::Static(value)
    }
}

impl<T> Clone for OptionValue<T>
where
    T: Clone,
{
    fn clone(&self) -> Self {
        match self {
            OptionValue::Static(value) => OptionValue::Static(value.clone()),
            OptionValue::Dynamic(f) => OptionValue::Dynamic(f.clone()),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for OptionValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Static(value) => f.debug_tuple("Static").field(value).finish(),
            OptionValue::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Resolve an optional option value
pub fn resolve_option<T: Clone>(option: &Option<OptionValue<T>>, ctx: &OptionContext<'_>) -> Option<T> {
    option.as_ref().map(|value| value.resolve(ctx))
}

// =============================================================================
// Headers
// =============================================================================

/// Input of a header renderer
#[derive(Debug, Clone, Copy)]
pub struct HeaderProps<'a> {
    /// Scene the header describes
    pub scene: &'a Scene,
    /// Header mode in effect
    pub mode: HeaderMode,
    /// Resolved title
    pub title: Option<&'a str>,
    /// Navigation prop of the scene
    pub navigation: &'a NavigationProp,
}

/// A header ready to be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderFrame {
    /// Scene the header belongs to
    pub scene_key: String,
    /// Header mode in effect
    pub mode: HeaderMode,
    /// Title text
    pub title: Option<String>,
    /// Show a back button
    pub show_back_button: bool,
    /// Produced by a custom renderer
    pub is_custom: bool,
}

impl HeaderFrame {
    /// The standard header for a scene
    pub fn standard(props: &HeaderProps<'_>) -> Self {
        Self {
            scene_key: props.scene.key.clone(),
            mode: props.mode,
            title: props.title.map(str::to_owned),
            show_back_button: props.scene.index > 0,
            is_custom: false,
        }
    }
}

type HeaderRenderer = Arc<dyn Fn(&HeaderProps<'_>) -> HeaderFrame + Send + Sync>;

/// Header option of a screen
#[derive(Clone, Default)]
pub enum HeaderSpec {
    /// Standard header
    #[default]
    Default,
    /// No header
    Hidden,
    /// Custom renderer
    Custom(HeaderRenderer),
}

impl HeaderSpec {
    /// Wrap a custom header renderer
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&HeaderProps<'_>) -> HeaderFrame + Send + Sync + 'static,
    {
        HeaderSpec::Custom(Arc::new(f))
    }

    /// Render the header, if any
    pub fn render(&self, props: &HeaderProps<'_>) -> Option<HeaderFrame> {
        match self {
            HeaderSpec::Default => Some(HeaderFrame::standard(props)),
            HeaderSpec::Hidden => None,
            HeaderSpec::Custom(render) => {
                let mut frame = render(props);
                frame.is_custom = true;
                Some(frame)
            }
        }
    }
}

impl fmt::Debug for HeaderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderSpec::Default => f.write_str("Default"),
            HeaderSpec::Hidden => f.write_str("Hidden"),
            HeaderSpec::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// =============================================================================
// Screen Options
// =============================================================================

/// Options of a screen inside a card stack
#[derive(Debug, Clone, Default)]
pub struct ScreenOptions {
    /// Title shown in the header
    pub title: Option<OptionValue<String>>,
    /// Header rendering
    pub header: Option<HeaderSpec>,
    /// Accept back gestures; platform default when unset
    pub gestures_enabled: Option<OptionValue<bool>>,
}

impl ScreenOptions {
    /// Empty options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(OptionValue::Static(title.into()));
        self
    }

    /// Set a computed title
    pub fn title_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&OptionContext<'_>) -> String + Send + Sync + 'static,
    {
        self.title = Some(OptionValue::dynamic(f));
        self
    }

    /// Set the header option
    pub fn header(mut self, header: HeaderSpec) -> Self {
        self.header = Some(header);
        self
    }

    /// Enable or disable back gestures
    pub fn gestures_enabled(mut self, enabled: impl Into<OptionValue<bool>>) -> Self {
        self.gestures_enabled = Some(enabled.into());
        self
    }

    /// Options from `over` take precedence over these
    pub fn merge(&self, over: &ScreenOptions) -> ScreenOptions {
        ScreenOptions {
            title: over.title.clone().or_else(|| self.title.clone()),
            header: over.header.clone().or_else(|| self.header.clone()),
            gestures_enabled: over
                .gestures_enabled
                .clone()
                .or_else(|| self.gestures_enabled.clone()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
