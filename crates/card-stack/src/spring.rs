//! Spring physics
//!
//! A damped harmonic oscillator integrated in fixed 1ms substeps. With the
//! default configuration the spring is critically damped (no bounce), which
//! is what card transitions use.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const SUBSTEP_SECS: f64 = 0.001;

/// Spring parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringConfig {
    /// Spring stiffness
    pub stiffness: f64,
    /// Damping coefficient
    pub damping: f64,
    /// Mass
    pub mass: f64,
    /// Distance from target under which the spring may come to rest
    pub rest_displacement_threshold: f64,
    /// Speed (units per second) under which the spring may come to rest
    pub rest_speed_threshold: f64,
    /// Snap to the target as soon as it is crossed
    pub overshoot_clamping: bool,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::critically_damped(342.0)
    }
}

impl SpringConfig {
    /// A spring with no bounce for the given stiffness (unit mass)
    pub fn critically_damped(stiffness: f64) -> Self {
        Self {
            stiffness,
            damping: 2.0 * stiffness.sqrt(),
            mass: 1.0,
            rest_displacement_threshold: 0.001,
            rest_speed_threshold: 0.001,
            overshoot_clamping: false,
        }
    }

    /// Check the parameters describe a spring that settles
    pub fn is_valid(&self) -> bool {
        self.stiffness > 0.0 && self.damping > 0.0 && self.mass > 0.0
    }
}

/// An in-flight spring toward `to`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Target value
    pub to: f64,
    /// Current velocity (units per second)
    pub velocity: f64,
    /// Parameters
    pub config: SpringConfig,
    from: f64,
}

impl Spring {
    /// Start a spring at `from` with an initial velocity
    pub fn new(from: f64, to: f64, velocity: f64, config: SpringConfig) -> Self {
        Self {
            to,
            velocity,
            config,
            from,
        }
    }

    /// Check whether a spring at `value` with this velocity is already at rest
    pub fn is_at_rest(&self, value: f64) -> bool {
        (value - self.to).abs() <= self.config.rest_displacement_threshold
            && self.velocity.abs() <= self.config.rest_speed_threshold
    }

    /// Advance the spring by `dt` from `value`
    ///
    /// Returns the new value and whether the spring has settled. A settled
    /// spring always lands exactly on its target.
    pub fn step(&mut self, mut value: f64, dt: Duration) -> (f64, bool) {
        let steps = ((dt.as_secs_f64() / SUBSTEP_SECS).round() as u64).max(1);
        let config = self.config;
        for _ in 0..steps {
            let displacement = value - self.to;
            let acceleration =
                (-config.stiffness * displacement - config.damping * self.velocity) / config.mass;
            self.velocity += acceleration * SUBSTEP_SECS;
            value += self.velocity * SUBSTEP_SECS;

            if config.overshoot_clamping && self.has_overshot(value) {
                self.velocity = 0.0;
                return (self.to, true);
            }
            if self.is_at_rest(value) {
                self.velocity = 0.0;
                return (self.to, true);
            }
        }
        (value, false)
    }

    fn has_overshot(&self, value: f64) -> bool {
        if self.from < self.to {
            value > self.to
        } else {
            value < self.to
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
