#![forbid(unsafe_code)]

//! Observer hooks for the presentation layer.
//!
//! Every hook is optional; an unset hook costs nothing. Hooks receive the
//! row by reference and cannot reach back into the menu that invokes them,
//! so a notification can never start while another one for the same menu is
//! still running.

use std::fmt;

type RowHook<R> = Box<dyn FnMut(&R)>;
type MenuHook = Box<dyn FnMut()>;

/// Lifecycle notifications emitted by a menu.
pub struct MenuHooks<R> {
    enter: Option<RowHook<R>>,
    exit: Option<RowHook<R>>,
    activate: Option<RowHook<R>>,
    deactivate: Option<RowHook<R>>,
    exit_menu: Option<MenuHook>,
}

impl<R> Default for MenuHooks<R> {
    fn default() -> Self {
        Self {
            enter: None,
            exit: None,
            activate: None,
            deactivate: None,
            exit_menu: None,
        }
    }
}

impl<R> fmt::Debug for MenuHooks<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuHooks")
            .field("enter", &self.enter.is_some())
            .field("exit", &self.exit.is_some())
            .field("activate", &self.activate.is_some())
            .field("deactivate", &self.deactivate.is_some())
            .field("exit_menu", &self.exit_menu.is_some())
            .finish()
    }
}

impl<R> MenuHooks<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the pointer enters a row.
    #[must_use]
    pub fn on_enter(mut self, f: impl FnMut(&R) + 'static) -> Self {
        self.enter = Some(Box::new(f));
        self
    }

    /// Called when the pointer leaves a row.
    #[must_use]
    pub fn on_exit(mut self, f: impl FnMut(&R) + 'static) -> Self {
        self.exit = Some(Box::new(f));
        self
    }

    /// Called when a row becomes the active row.
    #[must_use]
    pub fn on_activate(mut self, f: impl FnMut(&R) + 'static) -> Self {
        self.activate = Some(Box::new(f));
        self
    }

    /// Called when a row stops being the active row.
    #[must_use]
    pub fn on_deactivate(mut self, f: impl FnMut(&R) + 'static) -> Self {
        self.deactivate = Some(Box::new(f));
        self
    }

    /// Called when the pointer leaves the whole menu.
    #[must_use]
    pub fn on_exit_menu(mut self, f: impl FnMut() + 'static) -> Self {
        self.exit_menu = Some(Box::new(f));
        self
    }

    pub(crate) fn entered(&mut self, row: &R) {
        if let Some(f) = self.enter.as_mut() {
            f(row);
        }
    }

    pub(crate) fn exited(&mut self, row: &R) {
        if let Some(f) = self.exit.as_mut() {
            f(row);
        }
    }

    pub(crate) fn activated(&mut self, row: &R) {
        if let Some(f) = self.activate.as_mut() {
            f(row);
        }
    }

    pub(crate) fn deactivated(&mut self, row: &R) {
        if let Some(f) = self.deactivate.as_mut() {
            f(row);
        }
    }

    pub(crate) fn exited_menu(&mut self) {
        if let Some(f) = self.exit_menu.as_mut() {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn unset_hooks_are_no_ops() {
        let mut hooks: MenuHooks<u32> = MenuHooks::new();
        hooks.entered(&1);
        hooks.activated(&1);
        hooks.exited_menu();
    }

    #[test]
    fn set_hooks_receive_rows() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (a, d, m) = (log.clone(), log.clone(), log.clone());
        let mut hooks = MenuHooks::new()
            .on_activate(move |r: &u32| a.borrow_mut().push(format!("activate {r}")))
            .on_deactivate(move |r: &u32| d.borrow_mut().push(format!("deactivate {r}")))
            .on_exit_menu(move || m.borrow_mut().push("exit menu".to_string()));

        hooks.activated(&3);
        hooks.deactivated(&3);
        hooks.exited_menu();

        assert_eq!(*log.borrow(), vec!["activate 3", "deactivate 3", "exit menu"]);
    }

    #[test]
    fn debug_lists_installed_hooks() {
        let hooks: MenuHooks<u32> = MenuHooks::new().on_enter(|_| {});
        let dbg = format!("{hooks:?}");
        assert!(dbg.contains("enter: true"));
        assert!(dbg.contains("exit: false"));
    }
}
