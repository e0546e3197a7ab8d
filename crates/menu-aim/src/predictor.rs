#![forbid(unsafe_code)]

//! Submenu intent prediction from recent pointer trajectory.
//!
//! Decides whether switching the active row right now is safe, or whether
//! the pointer is probably travelling diagonally toward the open submenu and
//! the switch should be deferred.
//!
//! # Algorithm
//!
//! The menu's bounding box is widened by `tolerance` on the axis
//! perpendicular to the submenu direction. Two corners of that box are
//! picked as references (for a right-hand submenu: top-right and
//! bottom-right). With `loc` the newest tracked point and `prev` the oldest:
//!
//! - `slope(loc, decreasing) < slope(prev, decreasing)` and
//! - `slope(loc, increasing) > slope(prev, increasing)`
//!
//! means the wedge between the pointer and the submenu edge is narrowing:
//! the pointer is converging on the submenu, so the predictor asks for a
//! delay and remembers `loc`. Anything else clears the remembered point and
//! allows immediate action.
//!
//! # Short circuits (checked in order)
//!
//! 1. No active row: nothing to protect.
//! 2. No recorded position: no decision possible.
//! 3. `loc` outside the tolerant box (or the region is empty).
//! 4. `loc` equals the last point that caused a delay, so a stationary
//!    pointer cannot defer forever.

use std::time::Duration;

use crate::config::MenuAimConfig;
use crate::geometry::{Point, Region, SubmenuDirection};
use crate::trajectory::TrajectoryHistory;

/// Outcome of an intent prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// No row is active; act immediately.
    NoActiveRow,
    /// No pointer position recorded yet; act immediately.
    NoHistory,
    /// Pointer is outside the tolerant box; act immediately.
    OutsideRegion,
    /// Pointer has not moved since the last delay; act immediately.
    Repeated,
    /// Pointer is heading for the submenu; wait this long and ask again.
    Diverging(Duration),
    /// Pointer is not heading for the submenu; act immediately.
    NotDiverging,
}

impl Verdict {
    /// Delay to wait before re-evaluating, `None` for immediate action.
    ///
    /// A zero-length delay counts as immediate.
    #[inline]
    #[must_use]
    pub fn delay(self) -> Option<Duration> {
        match self {
            Self::Diverging(d) if !d.is_zero() => Some(d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_immediate(self) -> bool {
        self.delay().is_none()
    }

    /// Short name for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoActiveRow => "no_active_row",
            Self::NoHistory => "no_history",
            Self::OutsideRegion => "outside_region",
            Self::Repeated => "repeated",
            Self::Diverging(_) => "diverging",
            Self::NotDiverging => "not_diverging",
        }
    }
}

/// Trajectory-based predictor. Owns the last location that caused a delay.
#[derive(Debug, Clone)]
pub struct IntentPredictor {
    direction: SubmenuDirection,
    tolerance: f64,
    default_delay: Duration,
    last_delay_location: Option<Point>,
}

impl IntentPredictor {
    #[must_use]
    pub fn new(config: &MenuAimConfig) -> Self {
        Self {
            direction: config.submenu_direction,
            tolerance: config.tolerance,
            default_delay: config.default_delay,
            last_delay_location: None,
        }
    }

    /// Decide whether to act now on the given trajectory.
    ///
    /// Records the current location on a [`Verdict::Diverging`] outcome and
    /// clears it on [`Verdict::NotDiverging`]; other outcomes leave it as is.
    pub fn decide(
        &mut self,
        region: &Region,
        history: &TrajectoryHistory,
        has_active_row: bool,
    ) -> Verdict {
        let verdict = self.evaluate(region, history, has_active_row);
        match verdict {
            Verdict::Diverging(_) => self.last_delay_location = history.latest(),
            Verdict::NotDiverging => self.last_delay_location = None,
            _ => {}
        }
        crate::trace!(
            verdict = verdict.as_str(),
            loc = ?history.latest(),
            "intent verdict"
        );
        verdict
    }

    fn evaluate(&self, region: &Region, history: &TrajectoryHistory, has_active_row: bool) -> Verdict {
        if !has_active_row {
            return Verdict::NoActiveRow;
        }
        let Some(loc) = history.latest() else {
            return Verdict::NoHistory;
        };
        let prev = history.oldest().unwrap_or(loc);

        if !region.contains_tolerant(loc, self.direction, self.tolerance) {
            return Verdict::OutsideRegion;
        }
        if self.last_delay_location == Some(loc) {
            return Verdict::Repeated;
        }

        let corners = region.tolerant_corners(self.direction, self.tolerance);
        let (decreasing, increasing) = corners.reference(self.direction);

        let decreasing_slope = loc.slope_to(decreasing);
        let increasing_slope = loc.slope_to(increasing);
        let prev_decreasing_slope = prev.slope_to(decreasing);
        let prev_increasing_slope = prev.slope_to(increasing);

        if decreasing_slope < prev_decreasing_slope && increasing_slope > prev_increasing_slope {
            Verdict::Diverging(self.default_delay)
        } else {
            Verdict::NotDiverging
        }
    }

    /// The last location that caused a delay, if any.
    #[inline]
    #[must_use]
    pub fn last_delay_location(&self) -> Option<Point> {
        self.last_delay_location
    }

    /// Forget the last delay location.
    pub fn clear(&mut self) {
        self.last_delay_location = None;
    }

    #[inline]
    #[must_use]
    pub fn direction(&self) -> SubmenuDirection {
        self.direction
    }
}
