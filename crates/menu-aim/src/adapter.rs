#![forbid(unsafe_code)]

//! Boundary between a host UI toolkit and the activation core.
//!
//! The host translates its own pointer events into [`MenuEvent`]s and
//! delivers them to the menu they belong to. [`EventSource`] is the hook a
//! host implements so a menu can install and remove its subscriptions on
//! [`attach`](crate::machine::MenuAim::attach) and
//! [`detach`](crate::machine::MenuAim::detach).
//!
//! [`MenuSet`] holds several independent menus, fans pointer moves out to all
//! of them (pointer movement is tracked page-wide, not per menu) and routes
//! row events to their owner.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use crate::geometry::{Point, Region};
use crate::machine::MenuAim;

/// Unique identifier of a menu instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MenuId(u64);

static NEXT_MENU_ID: AtomicU64 = AtomicU64::new(1);

impl MenuId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MENU_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[inline]
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MenuId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "menu#{}", self.0)
    }
}

/// A host event, already resolved to a menu's rows.
#[derive(Debug, Clone, PartialEq)]
pub enum MenuEvent<R> {
    /// Pointer moved (absolute page coordinates).
    PointerMove(Point),
    /// Pointer entered a row.
    RowEnter(R),
    /// Pointer left a row.
    RowLeave(R),
    /// Pointer left the whole menu.
    MenuLeave,
    /// Menu bounding box changed.
    Layout(Region),
}

/// Host-side event subscription management.
pub trait EventSource {
    /// Start delivering pointer events for `menu`.
    fn subscribe(&mut self, menu: MenuId);

    /// Stop delivering pointer events for `menu`.
    fn unsubscribe(&mut self, menu: MenuId);
}

/// Attach/detach misuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachError {
    /// The menu is already subscribed to an event source.
    AlreadyAttached(MenuId),
    /// The menu is not subscribed to an event source.
    NotAttached(MenuId),
}

impl fmt::Display for AttachError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyAttached(id) => write!(f, "{id} is already attached"),
            Self::NotAttached(id) => write!(f, "{id} is not attached"),
        }
    }
}

impl std::error::Error for AttachError {}

/// A collection of independent menus.
#[derive(Debug)]
pub struct MenuSet<R> {
    menus: Vec<MenuAim<R>>,
}

impl<R> Default for MenuSet<R> {
    fn default() -> Self {
        Self { menus: Vec::new() }
    }
}

impl<R: PartialEq + fmt::Debug> MenuSet<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a menu. Returns its id.
    pub fn insert(&mut self, menu: MenuAim<R>) -> MenuId {
        let id = menu.id();
        self.menus.push(menu);
        id
    }

    /// Remove a menu without tearing it down.
    pub fn remove(&mut self, id: MenuId) -> Option<MenuAim<R>> {
        let idx = self.menus.iter().position(|m| m.id() == id)?;
        Some(self.menus.remove(idx))
    }

    #[must_use]
    pub fn get(&self, id: MenuId) -> Option<&MenuAim<R>> {
        self.menus.iter().find(|m| m.id() == id)
    }

    pub fn get_mut(&mut self, id: MenuId) -> Option<&mut MenuAim<R>> {
        self.menus.iter_mut().find(|m| m.id() == id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.menus.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MenuAim<R>> {
        self.menus.iter()
    }

    /// Record a pointer position in every menu that is not torn down.
    pub fn pointer_moved(&mut self, point: Point) {
        for menu in self.menus.iter_mut().filter(|m| !m.is_detached()) {
            menu.pointer_moved(point);
        }
    }

    /// Deliver `event` to menu `id`. Pointer moves go to every menu.
    ///
    /// Returns `false` if no menu has that id.
    pub fn dispatch(&mut self, id: MenuId, event: MenuEvent<R>, now: Instant) -> bool {
        if self.get(id).is_none() {
            crate::warn!(menu = id.get(), "event for unknown menu dropped");
            return false;
        }
        match event {
            MenuEvent::PointerMove(point) => self.pointer_moved(point),
            event => {
                if let Some(menu) = self.get_mut(id) {
                    menu.handle_event(event, now);
                }
            }
        }
        true
    }

    /// Poll every menu. Returns the total number of timers fired.
    pub fn poll(&mut self, now: Instant) -> usize {
        self.menus.iter_mut().map(|m| m.poll(now)).sum()
    }

    /// Earliest deadline across all menus.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.menus.iter().filter_map(|m| m.next_deadline()).min()
    }

    /// Attach every menu that is not attached yet.
    pub fn attach_all<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        for menu in self.menus.iter_mut().filter(|m| !m.is_attached()) {
            // Filtered to unattached menus, so this cannot fail.
            let _ = menu.attach(source);
        }
    }

    /// Detach every attached menu.
    pub fn detach_all<S: EventSource + ?Sized>(&mut self, source: &mut S) {
        for menu in self.menus.iter_mut().filter(|m| m.is_attached()) {
            let _ = menu.detach(source);
        }
    }
}
