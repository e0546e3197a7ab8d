#![forbid(unsafe_code)]

//! Bounded history of recent pointer positions.
//!
//! The predictor only ever looks at two points: the newest and the oldest
//! retained one. Keeping a short window (three points by default) makes the
//! oldest point a baseline a few pointer-move events in the past, which is
//! long enough to see a direction and short enough to forget stale motion.
//!
//! # Invariants
//!
//! 1. `len() <= capacity()` at all times.
//! 2. Iteration order is insertion order (oldest first).
//! 3. Capacity is at least 1.

use std::collections::VecDeque;

use crate::geometry::Point;

/// Default number of tracked positions.
pub const DEFAULT_CAPACITY: usize = 3;

/// Fixed-capacity FIFO of pointer positions, oldest evicted first.
#[derive(Debug, Clone)]
pub struct TrajectoryHistory {
    points: VecDeque<Point>,
    capacity: usize,
}

impl Default for TrajectoryHistory {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl TrajectoryHistory {
    /// Create an empty history holding at most `capacity` points.
    ///
    /// A capacity of 0 is raised to 1: the predictor needs at least the
    /// current position.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a position, evicting the oldest one when full.
    pub fn record(&mut self, point: Point) {
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    /// Most recent position.
    #[inline]
    #[must_use]
    pub fn latest(&self) -> Option<Point> {
        self.points.back().copied()
    }

    /// Earliest retained position.
    #[inline]
    #[must_use]
    pub fn oldest(&self) -> Option<Point> {
        self.points.front().copied()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Forget every recorded position.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Positions oldest first.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }
}
