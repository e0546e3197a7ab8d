#![forbid(unsafe_code)]

//! Activation state machine for one menu instance.
//!
//! [`MenuAim`] owns the active row, the pointer trajectory, the predictor
//! and the two pending-transition timers. Feed it host events, call
//! [`poll`](MenuAim::poll) when [`next_deadline`](MenuAim::next_deadline)
//! passes, and observe transitions through [`MenuHooks`].
//!
//! # States
//!
//! `Idle` (no active row) and `Active(row)`. Scheduled but unconfirmed
//! transitions live in the pending timers, not in the state itself.
//!
//! # Invariants
//!
//! 1. At most one active row.
//! 2. Every activate notification for a row is followed by exactly one
//!    deactivate notification before that row is activated again.
//! 3. Activating the already-active row notifies nothing.
//! 4. Switching rows while one is active deactivates the old row, then
//!    activates the new one, without the grace period.
//! 5. A fired retry re-reads the live trajectory, region and active row.
//! 6. After teardown no timer fires and no event is processed.
//!
//! # Example
//!
//! ```
//! use std::time::{Duration, Instant};
//! use menu_aim::config::MenuAimConfig;
//! use menu_aim::geometry::{Point, Region};
//! use menu_aim::machine::MenuAim;
//!
//! let mut menu: MenuAim<&str> = MenuAim::new(MenuAimConfig::default());
//! menu.set_region(Region::new(0.0, 0.0, 200.0, 60.0));
//!
//! let t0 = Instant::now();
//! menu.pointer_moved(Point::new(20.0, 10.0));
//! menu.row_entered("file", t0);
//!
//! // First activation waits for the grace period.
//! assert_eq!(menu.active_row(), None);
//! menu.poll(t0 + Duration::from_millis(300));
//! assert_eq!(menu.active_row(), Some(&"file"));
//! ```

use std::fmt;
use std::time::Instant;

use crate::adapter::{AttachError, EventSource, MenuEvent, MenuId};
use crate::config::MenuAimConfig;
use crate::geometry::{Point, Region};
use crate::hooks::MenuHooks;
use crate::pending::{Fired, PendingTransitions, Retry};
use crate::predictor::{IntentPredictor, Verdict};
use crate::trajectory::TrajectoryHistory;

/// Diagnostic counters. Never cleared by [`MenuAim::reset`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuAimStats {
    pub activations: u64,
    pub deactivations: u64,
    /// Predictor-requested delays.
    pub deferrals: u64,
    /// Pending timers dropped before firing.
    pub cancelled_timers: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Processing events and timers.
    Live,
    /// Torn down; ignores everything until attached again.
    TornDown,
}

/// Trajectory-aware activation controller for one menu.
pub struct MenuAim<R> {
    id: MenuId,
    config: MenuAimConfig,
    region: Region,
    trajectory: TrajectoryHistory,
    predictor: IntentPredictor,
    active_row: Option<R>,
    pending: PendingTransitions<R>,
    hooks: MenuHooks<R>,
    lifecycle: Lifecycle,
    /// Holds a subscription on a host event source.
    subscribed: bool,
    stats: MenuAimStats,
}

impl<R: fmt::Debug> fmt::Debug for MenuAim<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuAim")
            .field("id", &self.id)
            .field("region", &self.region)
            .field("active_row", &self.active_row)
            .field("pending", &self.pending)
            .field("lifecycle", &self.lifecycle)
            .field("subscribed", &self.subscribed)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<R: PartialEq + fmt::Debug> MenuAim<R> {
    /// Create a menu with no hooks and an empty region.
    #[must_use]
    pub fn new(config: MenuAimConfig) -> Self {
        Self {
            id: MenuId::next(),
            region: Region::default(),
            trajectory: TrajectoryHistory::with_capacity(config.mouse_locs_tracked),
            predictor: IntentPredictor::new(&config),
            active_row: None,
            pending: PendingTransitions::default(),
            hooks: MenuHooks::default(),
            lifecycle: Lifecycle::Live,
            subscribed: false,
            stats: MenuAimStats::default(),
            config,
        }
    }

    /// Install observer hooks (builder pattern).
    #[must_use]
    pub fn with_hooks(mut self, hooks: MenuHooks<R>) -> Self {
        self.hooks = hooks;
        self
    }

    // -----------------------------------------------------------------------
    // Host input
    // -----------------------------------------------------------------------

    /// Update the menu's bounding box. Read at every prediction.
    pub fn set_region(&mut self, region: Region) {
        self.region = region;
    }

    /// Record a pointer position (absolute page coordinates).
    pub fn pointer_moved(&mut self, point: Point) {
        if self.rejects_input() {
            return;
        }
        self.trajectory.record(point);
    }

    /// The pointer entered `row`.
    pub fn row_entered(&mut self, row: R, now: Instant) {
        if self.rejects_input() {
            return;
        }
        if self.pending.retry.cancel() {
            self.note_cancelled("retry");
        }
        self.hooks.entered(&row);
        self.possibly_activate(row, now);
    }

    /// The pointer left `row`. Does not change the active row.
    pub fn row_left(&mut self, row: &R) {
        if self.rejects_input() {
            return;
        }
        self.hooks.exited(row);
    }

    /// The pointer left the whole menu.
    pub fn menu_left(&mut self, now: Instant) {
        if self.rejects_input() {
            return;
        }
        if self.pending.retry.cancel() {
            self.note_cancelled("retry");
        }
        if self.pending.open_delay.cancel() {
            self.note_cancelled("open_delay");
        }
        self.possibly_deactivate(now);
        self.hooks.exited_menu();
    }

    /// Route a host event to the matching operation.
    pub fn handle_event(&mut self, event: MenuEvent<R>, now: Instant) {
        if self.rejects_input() {
            return;
        }
        match event {
            MenuEvent::PointerMove(point) => self.pointer_moved(point),
            MenuEvent::RowEnter(row) => self.row_entered(row, now),
            MenuEvent::RowLeave(row) => self.row_left(&row),
            MenuEvent::MenuLeave => self.menu_left(now),
            MenuEvent::Layout(region) => self.set_region(region),
        }
    }

    /// Fire every timer due at `now`, earliest first. Returns how many fired.
    pub fn poll(&mut self, now: Instant) -> usize {
        if self.is_detached() {
            return 0;
        }
        let span = crate::debug_span!("menu_aim.poll", menu = self.id.get());
        let _guard = span.enter();
        let mut fired = 0;
        while let Some(action) = self.pending.take_due(now) {
            fired += 1;
            match action {
                Fired::Retry(Retry::Activate(row)) => self.possibly_activate(row, now),
                Fired::Retry(Retry::Deactivate) => self.possibly_deactivate(now),
                Fired::OpenDelay(row) => self.activate_now(row),
            }
        }
        fired
    }

    /// When the host should call [`poll`](Self::poll) next.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        if self.is_detached() {
            return None;
        }
        self.pending.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Activate `row` now, or retry after the predictor's delay.
    pub fn possibly_activate(&mut self, row: R, now: Instant) {
        match self.consult().delay() {
            Some(delay) => {
                crate::debug!(menu = self.id.get(), row = ?row, ?delay, "activation deferred");
                self.stats.deferrals += 1;
                self.pending.retry.schedule(now, delay, Retry::Activate(row));
            }
            None => self.activate(row, now),
        }
    }

    /// Make `row` active, after the grace period if no row is active yet.
    ///
    /// No-op if `row` is already active.
    pub fn activate(&mut self, row: R, now: Instant) {
        if self.active_row.as_ref() == Some(&row) {
            return;
        }
        if self.pending.open_delay.cancel() {
            self.note_cancelled("open_delay");
        }
        let grace = self.config.activation_delay;
        if self.active_row.is_some() || grace.is_zero() {
            self.activate_now(row);
        } else {
            crate::debug!(menu = self.id.get(), row = ?row, delay = ?grace, "activation scheduled");
            self.pending.open_delay.schedule(now, grace, row);
        }
    }

    /// Switch the active row to `row` immediately.
    pub fn activate_now(&mut self, row: R) {
        if self.active_row.as_ref() == Some(&row) {
            return;
        }
        if let Some(old) = self.active_row.take() {
            self.notify_deactivated(&old);
        }
        crate::debug!(menu = self.id.get(), row = ?row, "row activated");
        self.stats.activations += 1;
        self.hooks.activated(&row);
        self.active_row = Some(row);
    }

    /// Deactivate the active row now, or retry after the predictor's delay.
    ///
    /// The row is read when the decision is final, not when it was first
    /// requested.
    pub fn possibly_deactivate(&mut self, now: Instant) {
        match self.consult().delay() {
            Some(delay) => {
                crate::debug!(menu = self.id.get(), ?delay, "deactivation deferred");
                self.stats.deferrals += 1;
                self.pending.retry.schedule(now, delay, Retry::Deactivate);
            }
            None => self.deactivate_now(),
        }
    }

    /// Clear the active row immediately, cancelling a pending first activation.
    pub fn deactivate_now(&mut self) {
        if self.pending.open_delay.cancel() {
            self.note_cancelled("open_delay");
        }
        if let Some(row) = self.active_row.take() {
            self.notify_deactivated(&row);
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Subscribe to `source`. Also revives a detached menu.
    ///
    /// # Errors
    ///
    /// [`AttachError::AlreadyAttached`] if this menu is already subscribed,
    /// including a menu torn down without [`detach`](Self::detach).
    pub fn attach<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<(), AttachError> {
        if self.subscribed {
            return Err(AttachError::AlreadyAttached(self.id));
        }
        source.subscribe(self.id);
        self.subscribed = true;
        self.lifecycle = Lifecycle::Live;
        crate::debug!(menu = self.id.get(), "menu attached");
        Ok(())
    }

    /// Unsubscribe from `source` and tear down.
    ///
    /// Also removes the subscription of a menu already torn down by
    /// [`teardown`](Self::teardown).
    ///
    /// # Errors
    ///
    /// [`AttachError::NotAttached`] if this menu is not subscribed.
    pub fn detach<S: EventSource + ?Sized>(&mut self, source: &mut S) -> Result<(), AttachError> {
        if !self.subscribed {
            return Err(AttachError::NotAttached(self.id));
        }
        source.unsubscribe(self.id);
        self.subscribed = false;
        self.teardown();
        crate::debug!(menu = self.id.get(), "menu detached");
        Ok(())
    }

    /// Cancel all timers and stop processing events.
    ///
    /// Does not notify a final deactivation. An event source subscription
    /// stays installed until [`detach`](Self::detach) removes it.
    pub fn teardown(&mut self) {
        let dropped = self.pending.cancel_all();
        self.stats.cancelled_timers += dropped as u64;
        self.lifecycle = Lifecycle::TornDown;
    }

    /// Deactivate the current row, cancel timers and forget the trajectory.
    pub fn reset(&mut self) {
        self.deactivate_now();
        let dropped = self.pending.cancel_all();
        self.stats.cancelled_timers += dropped as u64;
        self.trajectory.clear();
        self.predictor.clear();
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn id(&self) -> MenuId {
        self.id
    }

    #[inline]
    #[must_use]
    pub fn active_row(&self) -> Option<&R> {
        self.active_row.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn region(&self) -> Region {
        self.region
    }

    #[inline]
    #[must_use]
    pub fn trajectory(&self) -> &TrajectoryHistory {
        &self.trajectory
    }

    /// The last location that caused a predictor delay.
    #[inline]
    #[must_use]
    pub fn last_delay_location(&self) -> Option<Point> {
        self.predictor.last_delay_location()
    }

    #[inline]
    #[must_use]
    pub fn pending(&self) -> &PendingTransitions<R> {
        &self.pending
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MenuAimConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn stats(&self) -> MenuAimStats {
        self.stats
    }

    #[inline]
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.subscribed
    }

    #[inline]
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.lifecycle == Lifecycle::TornDown
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Warns and returns `true` if the menu is torn down.
    fn rejects_input(&self) -> bool {
        if self.is_detached() {
            crate::warn!(menu = self.id.get(), "event delivered to detached menu");
            return true;
        }
        false
    }

    fn consult(&mut self) -> Verdict {
        self.predictor
            .decide(&self.region, &self.trajectory, self.active_row.is_some())
    }

    fn notify_deactivated(&mut self, row: &R) {
        crate::debug!(menu = self.id.get(), row = ?row, "row deactivated");
        self.stats.deactivations += 1;
        self.hooks.deactivated(row);
    }

    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    fn note_cancelled(&mut self, timer: &'static str) {
        crate::debug!(menu = self.id.get(), timer, "pending timer cancelled");
        self.stats.cancelled_timers += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    type Log = Rc<RefCell<Vec<String>>>;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn recording_hooks(log: &Log) -> MenuHooks<u32> {
        let (e, x, a, d, m) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
        MenuHooks::new()
            .on_enter(move |r| e.borrow_mut().push(format!("enter {r}")))
            .on_exit(move |r| x.borrow_mut().push(format!("exit {r}")))
            .on_activate(move |r| a.borrow_mut().push(format!("activate {r}")))
            .on_deactivate(move |r| d.borrow_mut().push(format!("deactivate {r}")))
            .on_exit_menu(move || m.borrow_mut().push("exit menu".to_string()))
    }

    fn menu(config: MenuAimConfig) -> (MenuAim<u32>, Log) {
        let log: Log = Rc::default();
        let mut m = MenuAim::new(config).with_hooks(recording_hooks(&log));
        m.set_region(Region::new(0.0, 0.0, 200.0, 20.0));
        (m, log)
    }

    #[test]
    fn first_activation_waits_for_grace_period() {
        let (mut m, log) = menu(MenuAimConfig::default());
        let t = Instant::now();
        m.pointer_moved(Point::new(10.0, 10.0));
        m.row_entered(1, t);

        assert_eq!(m.active_row(), None);
        assert_eq!(m.next_deadline(), Some(t + ms(300)));
        assert_eq!(m.poll(t + ms(299)), 0);
        assert_eq!(m.poll(t + ms(300)), 1);
        assert_eq!(m.active_row(), Some(&1));
        assert_eq!(*log.borrow(), vec!["enter 1", "activate 1"]);
    }

    #[test]
    fn zero_grace_period_activates_synchronously() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.pointer_moved(Point::new(10.0, 10.0));
        m.row_entered(1, t);
        assert_eq!(m.active_row(), Some(&1));
        assert_eq!(m.next_deadline(), None);
        assert_eq!(*log.borrow(), vec!["enter 1", "activate 1"]);
    }

    #[test]
    fn activating_active_row_is_idempotent() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.activate(1, t);
        m.activate(1, t);
        m.activate_now(1);
        assert_eq!(*log.borrow(), vec!["activate 1"]);
        assert_eq!(m.stats().activations, 1);
    }

    #[test]
    fn switching_rows_skips_grace_period() {
        let (mut m, log) = menu(MenuAimConfig::default());
        let t = Instant::now();
        m.activate_now(1);
        m.activate(2, t);
        assert_eq!(m.active_row(), Some(&2));
        assert_eq!(*log.borrow(), vec!["activate 1", "deactivate 1", "activate 2"]);
    }

    #[test]
    fn entering_another_row_cancels_pending_grace() {
        let (mut m, log) = menu(MenuAimConfig::default());
        let t = Instant::now();
        m.pointer_moved(Point::new(10.0, 5.0));
        m.row_entered(1, t);
        m.row_entered(2, t + ms(100));
        m.poll(t + ms(300));
        assert_eq!(m.active_row(), None);
        m.poll(t + ms(400));
        assert_eq!(m.active_row(), Some(&2));
        assert_eq!(*log.borrow(), vec!["enter 1", "enter 2", "activate 2"]);
    }

    #[test]
    fn converging_pointer_defers_switch() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.activate_now(1);
        m.pointer_moved(Point::new(50.0, 50.0));
        m.pointer_moved(Point::new(150.0, 15.0));
        m.row_entered(2, t);

        assert_eq!(m.active_row(), Some(&1));
        assert_eq!(m.last_delay_location(), Some(Point::new(150.0, 15.0)));
        assert_eq!(m.stats().deferrals, 1);

        // Pointer stopped: the retry sees a repeated location and switches.
        m.poll(t + ms(300));
        assert_eq!(m.active_row(), Some(&2));
        assert_eq!(
            *log.borrow(),
            vec!["activate 1", "enter 2", "deactivate 1", "activate 2"]
        );
    }

    #[test]
    fn retry_keeps_deferring_while_pointer_converges() {
        let (mut m, _log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.activate_now(1);
        m.pointer_moved(Point::new(20.0, 50.0));
        m.pointer_moved(Point::new(60.0, 30.0));
        m.row_entered(2, t);
        assert_eq!(m.active_row(), Some(&1));

        m.pointer_moved(Point::new(100.0, 20.0));
        m.poll(t + ms(300));
        assert_eq!(m.active_row(), Some(&1));
        assert_eq!(m.stats().deferrals, 2);
        assert_eq!(m.next_deadline(), Some(t + ms(600)));
    }

    #[test]
    fn row_leave_does_not_deactivate() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        m.activate_now(1);
        m.row_left(&1);
        assert_eq!(m.active_row(), Some(&1));
        assert_eq!(*log.borrow(), vec!["activate 1", "exit 1"]);
    }

    #[test]
    fn leaving_menu_deactivates_when_pointer_is_outside() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.activate_now(1);
        m.pointer_moved(Point::new(210.0, 5.0));
        m.pointer_moved(Point::new(210.0, 100.0));
        m.menu_left(t);
        assert_eq!(m.active_row(), None);
        assert_eq!(*log.borrow(), vec!["activate 1", "deactivate 1", "exit menu"]);
    }

    #[test]
    fn leaving_menu_cancels_pending_grace() {
        let (mut m, log) = menu(MenuAimConfig::default());
        let t = Instant::now();
        m.pointer_moved(Point::new(10.0, 10.0));
        m.row_entered(1, t);
        m.menu_left(t + ms(50));
        assert_eq!(m.poll(t + ms(1000)), 0);
        assert_eq!(m.active_row(), None);
        assert_eq!(*log.borrow(), vec!["enter 1", "exit menu"]);
        assert_eq!(m.stats().cancelled_timers, 1);
    }

    #[test]
    fn deferred_deactivation_reads_active_row_at_fire_time() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.activate_now(1);
        m.pointer_moved(Point::new(50.0, 50.0));
        m.pointer_moved(Point::new(150.0, 15.0));
        m.menu_left(t);
        assert_eq!(m.active_row(), Some(&1));

        // Something else switched rows before the retry fired.
        m.activate_now(2);
        m.poll(t + ms(300));
        assert_eq!(m.active_row(), None);
        assert_eq!(
            *log.borrow(),
            vec!["activate 1", "exit menu", "deactivate 1", "activate 2", "deactivate 2"]
        );
    }

    #[test]
    fn teardown_silences_pending_timers() {
        let (mut m, log) = menu(MenuAimConfig::default());
        let t = Instant::now();
        m.pointer_moved(Point::new(10.0, 10.0));
        m.row_entered(1, t);
        m.teardown();
        assert_eq!(m.next_deadline(), None);
        assert_eq!(m.poll(t + ms(1000)), 0);
        m.row_entered(2, t + ms(1000));
        assert_eq!(m.active_row(), None);
        assert_eq!(*log.borrow(), vec!["enter 1"]);
    }

    #[test]
    fn teardown_keeps_subscription_until_detach() {
        #[derive(Default)]
        struct Source(Vec<MenuId>);
        impl EventSource for Source {
            fn subscribe(&mut self, menu: MenuId) {
                self.0.push(menu);
            }
            fn unsubscribe(&mut self, menu: MenuId) {
                self.0.retain(|m| *m != menu);
            }
        }

        let (mut m, _log) = menu(MenuAimConfig::default());
        let mut source = Source::default();
        m.attach(&mut source).unwrap();
        m.teardown();
        assert!(m.is_detached());
        assert!(m.is_attached());
        assert_eq!(m.attach(&mut source), Err(AttachError::AlreadyAttached(m.id())));

        m.detach(&mut source).unwrap();
        assert!(source.0.is_empty());
        assert!(!m.is_attached());
        assert_eq!(m.detach(&mut source), Err(AttachError::NotAttached(m.id())));
    }

    #[test]
    fn teardown_does_not_notify_final_deactivation() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        m.activate_now(1);
        m.teardown();
        assert_eq!(*log.borrow(), vec!["activate 1"]);
    }

    #[test]
    fn reset_deactivates_and_forgets() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        m.activate_now(1);
        m.pointer_moved(Point::new(10.0, 10.0));
        m.reset();
        assert_eq!(m.active_row(), None);
        assert!(m.trajectory().is_empty());
        assert_eq!(m.last_delay_location(), None);
        assert!(!m.is_detached());
        assert_eq!(*log.borrow(), vec!["activate 1", "deactivate 1"]);
    }

    #[test]
    fn empty_region_never_defers() {
        let log: Log = Rc::default();
        let mut m = MenuAim::new(MenuAimConfig::instant_switching()).with_hooks(recording_hooks(&log));
        let t = Instant::now();
        m.activate_now(1);
        m.pointer_moved(Point::new(50.0, 50.0));
        m.pointer_moved(Point::new(150.0, 15.0));
        m.row_entered(2, t);
        assert_eq!(m.active_row(), Some(&2));
    }

    #[test]
    fn handle_event_routes_to_operations() {
        let (mut m, log) = menu(MenuAimConfig::instant_switching());
        let t = Instant::now();
        m.handle_event(MenuEvent::Layout(Region::new(0.0, 0.0, 100.0, 40.0)), t);
        m.handle_event(MenuEvent::PointerMove(Point::new(5.0, 5.0)), t);
        m.handle_event(MenuEvent::RowEnter(4), t);
        m.handle_event(MenuEvent::RowLeave(4), t);
        assert_eq!(m.region(), Region::new(0.0, 0.0, 100.0, 40.0));
        assert_eq!(m.trajectory().latest(), Some(Point::new(5.0, 5.0)));
        assert_eq!(*log.borrow(), vec!["enter 4", "activate 4", "exit 4"]);
    }

    #[test]
    fn debug_format() {
        let (m, _log) = menu(MenuAimConfig::default());
        let dbg = format!("{m:?}");
        assert!(dbg.contains("MenuAim"));
        assert!(dbg.contains("active_row: None"));
    }
}
