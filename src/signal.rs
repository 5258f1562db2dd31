//! Cooperative cancellation and Ctrl+C handling.
//!
//! The engine never interrupts work mid-operation. It polls a
//! [`CancelCheck`] between units of work (before each image is hashed and
//! before each pair is compared) and stops as soon as the check returns
//! `true`, keeping whatever it has already done.
//!
//! [`CancellationToken`] is the standard implementation: an `AtomicBool`
//! shared between the caller and the worker. [`install_handler`] wires it to
//! Ctrl+C.
//!
//! # Usage
//!
//! ```rust,no_run
//! use imgdedup::signal::install_handler;
//!
//! let token = install_handler().expect("Failed to install signal handler");
//!
//! // Pass token.clone() to the engine; it is tripped on Ctrl+C.
//! if token.is_cancelled() {
//!     println!("Cancelled");
//! }
//! ```

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

/// Exit code for SIGINT (Ctrl+C) interruption.
/// This follows Unix convention: 128 + signal number (SIGINT = 2).
pub const EXIT_CODE_INTERRUPTED: i32 = 130;

/// Polled between units of work to decide whether to stop.
pub trait CancelCheck: Send + Sync {
    /// Returns true once the run should stop.
    fn is_cancelled(&self) -> bool;
}

impl<F> CancelCheck for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_cancelled(&self) -> bool {
        self()
    }
}

/// Shared cancellation flag.
///
/// Clones share the same flag, so one clone can be handed to the worker
/// while the caller keeps another to cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns true if cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can be reused for another run.
    pub fn reset(&self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

impl CancelCheck for CancellationToken {
    fn is_cancelled(&self) -> bool {
        CancellationToken::is_cancelled(self)
    }
}

/// Error type for signal handler installation.
#[derive(Debug, thiserror::Error)]
pub enum SignalError {
    /// Failed to install the Ctrl+C handler.
    #[error("Failed to install signal handler: {0}")]
    InstallFailed(#[from] ctrlc::Error),
}

static GLOBAL_TOKEN: OnceLock<CancellationToken> = OnceLock::new();

/// Install a Ctrl+C handler that cancels the returned token.
///
/// The handler can only be registered once per process. Later calls (for
/// example from tests calling `run_app` repeatedly) get the already
/// installed token back, reset to "not cancelled". If another component
/// registered a Ctrl+C handler first, an unhooked token is returned that
/// can still be cancelled manually.
///
/// # Errors
///
/// Currently always succeeds; the `Result` leaves room for platforms where
/// installation failure must be surfaced.
pub fn install_handler() -> Result<CancellationToken, SignalError> {
    if let Some(token) = GLOBAL_TOKEN.get() {
        token.reset();
        return Ok(token.clone());
    }

    let token = CancellationToken::new();
    let hooked = token.clone();

    match ctrlc::set_handler(move || {
        hooked.cancel();

        let _ = writeln!(std::io::stderr(), "\nInterrupted. Finishing current step...");
        let _ = std::io::stderr().flush();

        log::info!("Shutdown signal received");
    }) {
        Ok(()) => {
            let _ = GLOBAL_TOKEN.set(token.clone());
            Ok(token)
        }
        Err(e) => {
            if let Some(existing) = GLOBAL_TOKEN.get() {
                existing.reset();
                return Ok(existing.clone());
            }
            log::debug!("Ctrl+C handler unavailable ({}), using unhooked token", e);
            let fallback = CancellationToken::new();
            let _ = GLOBAL_TOKEN.set(fallback.clone());
            Ok(fallback)
        }
    }
}
