#![forbid(unsafe_code)]

//! Logging support.
//!
//! With the `tracing` feature, the macros used inside the crate are plain
//! re-exports of the `tracing` macros. Without it, same-named no-op macros
//! are exported so call sites can write `crate::debug!(...)` unconditionally.
//!
//! Levels used by this crate:
//!
//! - `trace`: every predictor verdict.
//! - `debug`: activation, deactivation, deferral, timer cancellation and
//!   attach/detach of a menu instance.
//! - `warn`: host misuse that is tolerated (events delivered to a detached
//!   menu, unknown menu ids).

#[cfg(feature = "tracing")]
pub use tracing::{debug, debug_span, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// No-op warn macro when tracing is disabled.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// No-op debug_span macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug_span {
        ($($arg:tt)*) => {
            $crate::logging::NoopSpan
        };
    }
}

/// Span stand-in returned by `debug_span!` when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Enter the span (does nothing).
    pub fn enter(&self) -> NoopGuard {
        NoopGuard
    }
}

/// Guard for [`NoopSpan::enter`].
#[cfg(not(feature = "tracing"))]
pub struct NoopGuard;

/// Build a JSON subscriber filtered by `RUST_LOG` (default `menu_aim=debug`).
///
/// The crate never installs a global subscriber; hosts that want one can
/// pass this to `tracing::subscriber::set_global_default`.
#[cfg(feature = "tracing-json")]
pub fn json_subscriber() -> impl tracing::Subscriber + Send + Sync {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("menu_aim=debug"));
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .finish()
}
