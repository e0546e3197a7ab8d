#![forbid(unsafe_code)]

//! Menu aim: submenu intent prediction for hover menus.
//!
//! Keeps a submenu open while the pointer travels diagonally toward it,
//! instead of switching to every row the pointer crosses on the way.
//!
//! - [`trajectory`] records the last few pointer positions.
//! - [`predictor`] decides from that trajectory whether to act now or wait.
//! - [`machine`] owns the active row and its pending timers and notifies
//!   [`hooks`].
//! - [`adapter`] is the boundary a host UI toolkit plugs into.
//!
//! The core never touches a clock or a UI toolkit. Time is passed in as
//! `Instant`s and the host polls for due timers.

pub mod adapter;
pub mod config;
pub mod geometry;
pub mod hooks;
pub mod logging;
pub mod machine;
pub mod pending;
pub mod predictor;
pub mod trajectory;

pub use adapter::{AttachError, EventSource, MenuEvent, MenuId, MenuSet};
pub use config::MenuAimConfig;
pub use geometry::{Point, Region, SubmenuDirection};
pub use hooks::MenuHooks;
pub use machine::{MenuAim, MenuAimStats};
pub use predictor::{IntentPredictor, Verdict};
pub use trajectory::TrajectoryHistory;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, debug_span, trace, warn};
