#![forbid(unsafe_code)]

//! Menu configuration.
//!
//! Only options that influence prediction or activation timing live here.
//! Row lookup, styling and element wiring belong to the presentation layer.
//!
//! Defaults can be overridden from the environment:
//!
//! | Variable                       | Field                |
//! |--------------------------------|----------------------|
//! | `MENU_AIM_DIRECTION`           | `submenu_direction`  |
//! | `MENU_AIM_TOLERANCE`           | `tolerance`          |
//! | `MENU_AIM_ACTIVATION_DELAY_MS` | `activation_delay`   |
//! | `MENU_AIM_LOCS_TRACKED`        | `mouse_locs_tracked` |
//! | `MENU_AIM_DEFAULT_DELAY_MS`    | `default_delay`      |
//!
//! Values that do not parse, unknown directions and negative tolerances are
//! ignored and the default is kept. `MENU_AIM_LOCS_TRACKED=0` is raised to 1.
//!
//! Deserialized configs are normalized the same way the builders normalize:
//! an unknown direction falls back to `right`, tolerance is clamped to a
//! finite non-negative value and the tracked position count to at least 1.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::geometry::SubmenuDirection;
use crate::trajectory::DEFAULT_CAPACITY;

const ENV_DIRECTION: &str = "MENU_AIM_DIRECTION";
const ENV_TOLERANCE: &str = "MENU_AIM_TOLERANCE";
const ENV_ACTIVATION_DELAY_MS: &str = "MENU_AIM_ACTIVATION_DELAY_MS";
const ENV_LOCS_TRACKED: &str = "MENU_AIM_LOCS_TRACKED";
const ENV_DEFAULT_DELAY_MS: &str = "MENU_AIM_DEFAULT_DELAY_MS";

/// Configuration for a menu instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MenuAimConfig {
    /// Side on which submenus open.
    /// Default: right
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lossy::direction"))]
    pub submenu_direction: SubmenuDirection,

    /// Pixels of slack added around the menu's bounding box.
    /// Default: 75
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lossy::tolerance"))]
    pub tolerance: f64,

    /// Grace period before the first activation in a menu. Switching between
    /// rows once a row is active is never delayed by this.
    /// Default: 300ms
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub activation_delay: Duration,

    /// Number of pointer positions kept for trajectory estimation.
    /// Default: 3
    #[cfg_attr(feature = "serde", serde(deserialize_with = "lossy::capacity"))]
    pub mouse_locs_tracked: usize,

    /// Delay imposed when the pointer is heading for the submenu.
    /// Default: 300ms
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub default_delay: Duration,
}

impl Default for MenuAimConfig {
    fn default() -> Self {
        Self {
            submenu_direction: SubmenuDirection::Right,
            tolerance: 75.0,
            activation_delay: Duration::from_millis(300),
            mouse_locs_tracked: DEFAULT_CAPACITY,
            default_delay: Duration::from_millis(300),
        }
    }
}

impl MenuAimConfig {
    /// Defaults with no grace period before the first activation.
    #[must_use]
    pub fn instant_switching() -> Self {
        Self {
            activation_delay: Duration::ZERO,
            ..Self::default()
        }
    }

    /// Defaults overlaid with `MENU_AIM_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`.
    #[must_use]
    pub fn from_env_with<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(direction) = lookup(ENV_DIRECTION).and_then(|v| v.parse().ok()) {
            config.submenu_direction = direction;
        }
        if let Some(tolerance) = lookup(ENV_TOLERANCE).and_then(|v| parse_tolerance(&v)) {
            config.tolerance = tolerance;
        }
        if let Some(delay) = lookup(ENV_ACTIVATION_DELAY_MS).and_then(|v| parse_millis(&v)) {
            config.activation_delay = delay;
        }
        if let Some(n) = lookup(ENV_LOCS_TRACKED).and_then(|v| v.trim().parse::<usize>().ok()) {
            config.mouse_locs_tracked = n.max(1);
        }
        if let Some(delay) = lookup(ENV_DEFAULT_DELAY_MS).and_then(|v| parse_millis(&v)) {
            config.default_delay = delay;
        }

        config
    }

    #[must_use]
    pub fn with_direction(mut self, direction: SubmenuDirection) -> Self {
        self.submenu_direction = direction;
        self
    }

    /// Negative or non-finite tolerances are treated as 0.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = clamp_tolerance(tolerance);
        self
    }

    #[must_use]
    pub fn with_activation_delay(mut self, delay: Duration) -> Self {
        self.activation_delay = delay;
        self
    }

    /// Capacity below 1 is raised to 1.
    #[must_use]
    pub fn with_mouse_locs_tracked(mut self, n: usize) -> Self {
        self.mouse_locs_tracked = n.max(1);
        self
    }

    #[must_use]
    pub fn with_default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }
}

fn clamp_tolerance(tolerance: f64) -> f64 {
    if tolerance.is_finite() {
        tolerance.max(0.0)
    } else {
        0.0
    }
}

fn parse_tolerance(value: &str) -> Option<f64> {
    let v: f64 = value.trim().parse().ok()?;
    (v.is_finite() && v >= 0.0).then_some(v)
}

fn parse_millis(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_millis)
}

#[cfg(feature = "serde")]
mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(feature = "serde")]
mod lossy {
    use serde::{Deserialize, Deserializer};

    use crate::geometry::SubmenuDirection;

    pub fn direction<'de, D: Deserializer<'de>>(d: D) -> Result<SubmenuDirection, D::Error> {
        let value = String::deserialize(d)?;
        Ok(SubmenuDirection::parse_lossy(&value))
    }

    pub fn tolerance<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        f64::deserialize(d).map(super::clamp_tolerance)
    }

    pub fn capacity<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
        usize::deserialize(d).map(|n| n.max(1))
    }
}
