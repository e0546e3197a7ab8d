#![forbid(unsafe_code)]

//! Pending transitions: deadline-based, individually cancellable timers.
//!
//! Timers never run on their own. The host passes `now` into
//! [`PendingTransitions::take_due`] and acts on what comes back, so tests can
//! drive everything from a fixed `Instant` plus offsets.
//!
//! A menu has exactly two independent slots:
//!
//! - `retry`: re-ask the predictor after it requested a delay
//!   (for either a pending activation or a pending deactivation).
//! - `open_delay`: the grace period before the very first activation.
//!
//! # Invariants
//!
//! 1. A slot holds at most one pending action; scheduling replaces.
//! 2. An action is handed out at most once.
//! 3. When both slots are due, the earlier deadline fires first
//!    (`retry` wins ties).

use std::time::{Duration, Instant};

/// What a fired retry should re-evaluate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Retry<R> {
    /// Re-run possibly-activate for this row.
    Activate(R),
    /// Re-run possibly-deactivate for whatever row is active at fire time.
    Deactivate,
}

/// A due action taken from [`PendingTransitions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fired<R> {
    Retry(Retry<R>),
    /// The grace period for activating this row has elapsed.
    OpenDelay(R),
}

/// One cancellable timer.
#[derive(Debug, Clone)]
pub struct TimerSlot<A> {
    pending: Option<(Instant, A)>,
}

impl<A> Default for TimerSlot<A> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<A> TimerSlot<A> {
    /// Schedule `action` at `now + delay`. Returns `true` if this replaced an
    /// earlier pending action.
    pub fn schedule(&mut self, now: Instant, delay: Duration, action: A) -> bool {
        self.pending.replace((now + delay, action)).is_some()
    }

    /// Drop the pending action. Returns `true` if there was one.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    #[inline]
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn action(&self) -> Option<&A> {
        self.pending.as_ref().map(|(_, a)| a)
    }

    /// Take the action if its deadline is at or before `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<A> {
        match self.pending {
            Some((at, _)) if at <= now => self.pending.take().map(|(_, a)| a),
            _ => None,
        }
    }
}

/// The two named timers of a menu instance.
#[derive(Debug, Clone)]
pub struct PendingTransitions<R> {
    pub retry: TimerSlot<Retry<R>>,
    pub open_delay: TimerSlot<R>,
}

impl<R> Default for PendingTransitions<R> {
    fn default() -> Self {
        Self {
            retry: TimerSlot::default(),
            open_delay: TimerSlot::default(),
        }
    }
}

impl<R> PendingTransitions<R> {
    /// Earliest pending deadline across both slots.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.retry.deadline(), self.open_delay.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Take the earliest action due at `now`, if any.
    pub fn take_due(&mut self, now: Instant) -> Option<Fired<R>> {
        let retry_at = self.retry.deadline().filter(|at| *at <= now);
        let open_at = self.open_delay.deadline().filter(|at| *at <= now);
        match (retry_at, open_at) {
            (Some(r), Some(o)) if o < r => self.open_delay.take_due(now).map(Fired::OpenDelay),
            (Some(_), _) => self.retry.take_due(now).map(Fired::Retry),
            (None, Some(_)) => self.open_delay.take_due(now).map(Fired::OpenDelay),
            (None, None) => None,
        }
    }

    /// Cancel both slots. Returns how many actions were dropped.
    pub fn cancel_all(&mut self) -> usize {
        usize::from(self.retry.cancel()) + usize::from(self.open_delay.cancel())
    }

    #[must_use]
    pub fn is_idle(&self) -> bool {
        !self.retry.is_pending() && !self.open_delay.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn slot_fires_once_at_deadline() {
        let t = Instant::now();
        let mut slot = TimerSlot::default();
        assert!(!slot.schedule(t, ms(100), "a"));
        assert_eq!(slot.take_due(t + ms(99)), None);
        assert_eq!(slot.take_due(t + ms(100)), Some("a"));
        assert_eq!(slot.take_due(t + ms(200)), None);
    }

    #[test]
    fn scheduling_replaces_pending_action() {
        let t = Instant::now();
        let mut slot = TimerSlot::default();
        slot.schedule(t, ms(100), 1);
        assert!(slot.schedule(t, ms(300), 2));
        assert_eq!(slot.take_due(t + ms(100)), None);
        assert_eq!(slot.take_due(t + ms(300)), Some(2));
    }

    #[test]
    fn cancel_reports_whether_pending() {
        let t = Instant::now();
        let mut slot = TimerSlot::default();
        assert!(!slot.cancel());
        slot.schedule(t, ms(10), ());
        assert!(slot.cancel());
        assert!(!slot.is_pending());
    }

    #[test]
    fn earliest_slot_fires_first() {
        let t = Instant::now();
        let mut p: PendingTransitions<u32> = PendingTransitions::default();
        p.retry.schedule(t, ms(300), Retry::Activate(1));
        p.open_delay.schedule(t, ms(100), 2);
        assert_eq!(p.next_deadline(), Some(t + ms(100)));

        let later = t + ms(400);
        assert_eq!(p.take_due(later), Some(Fired::OpenDelay(2)));
        assert_eq!(p.take_due(later), Some(Fired::Retry(Retry::Activate(1))));
        assert_eq!(p.take_due(later), None);
        assert!(p.is_idle());
    }

    #[test]
    fn retry_wins_ties() {
        let t = Instant::now();
        let mut p: PendingTransitions<u32> = PendingTransitions::default();
        p.retry.schedule(t, ms(100), Retry::Deactivate);
        p.open_delay.schedule(t, ms(100), 7);
        assert_eq!(p.take_due(t + ms(100)), Some(Fired::Retry(Retry::Deactivate)));
    }

    #[test]
    fn cancel_all_counts_dropped_actions() {
        let t = Instant::now();
        let mut p: PendingTransitions<u32> = PendingTransitions::default();
        assert_eq!(p.cancel_all(), 0);
        p.retry.schedule(t, ms(1), Retry::Deactivate);
        p.open_delay.schedule(t, ms(1), 3);
        assert_eq!(p.cancel_all(), 2);
        assert_eq!(p.next_deadline(), None);
    }
}
