//! Progress and log notification for engine runs.
//!
//! The engine reports through two narrow traits, [`ProgressSink`] and
//! [`LogSink`], so it can run headless, under test, or behind a terminal
//! UI. Closures implement both traits directly.
//!
//! When the engine runs on a worker thread, [`ChannelSink`] forwards every
//! notification as an [`EngineEvent`] over a channel; the caller renders
//! them with [`Progress`], an `indicatif` bar that also prints log lines
//! above itself.

use std::sync::mpsc::Sender;
use std::sync::Mutex;

use indicatif::{ProgressBar, ProgressStyle};

/// Receives `(current, total, message)` progress updates.
pub trait ProgressSink: Send + Sync {
    /// Called when a unit of work completes.
    ///
    /// # Arguments
    ///
    /// * `current` - Units completed so far
    /// * `total` - Units planned for the current phase
    /// * `message` - Short description of the phase
    fn on_progress(&self, current: usize, total: usize, message: &str);
}

/// Receives free-text log lines meant for the user.
pub trait LogSink: Send + Sync {
    /// Called for each log line.
    fn on_log(&self, message: &str);
}

impl<F> ProgressSink for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        self(current, total, message);
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn on_log(&self, message: &str) {
        self(message);
    }
}

/// Sink that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn on_progress(&self, _current: usize, _total: usize, _message: &str) {}
}

impl LogSink for NullSink {
    fn on_log(&self, _message: &str) {}
}

/// A notification pushed from a worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Progress update
    Progress {
        /// Units completed so far
        current: usize,
        /// Units planned for the current phase
        total: usize,
        /// Phase description
        message: String,
    },
    /// Log line
    Log(String),
}

/// Forwards notifications over an mpsc channel.
///
/// Sending never blocks the worker. If the receiver is gone the event is
/// dropped.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<EngineEvent>,
}

impl ChannelSink {
    /// Wrap the sending half of a channel.
    #[must_use]
    pub fn new(tx: Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        let _ = self.tx.send(EngineEvent::Progress {
            current,
            total,
            message: message.to_string(),
        });
    }
}

impl LogSink for ChannelSink {
    fn on_log(&self, message: &str) {
        let _ = self.tx.send(EngineEvent::Log(message.to_string()));
    }
}

/// Terminal progress reporter using indicatif.
///
/// A single bar is created on the first update and reused for every phase;
/// its length follows the `total` of the latest update.
pub struct Progress {
    bar: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, neither bars nor log lines are displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use imgdedup::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// progress.log_line("hidden");
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            bar: Mutex::new(None),
            quiet,
        }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    /// Render one engine event.
    pub fn handle(&self, event: &EngineEvent) {
        match event {
            EngineEvent::Progress {
                current,
                total,
                message,
            } => self.on_progress(*current, *total, message),
            EngineEvent::Log(line) => self.log_line(line),
        }
    }

    /// Print a log line above the bar (or to stderr if no bar is shown).
    pub fn log_line(&self, line: &str) {
        if self.quiet {
            return;
        }

        match self.bar.lock() {
            Ok(guard) => match guard.as_ref() {
                Some(bar) => bar.println(line),
                None => eprintln!("{}", line),
            },
            Err(_) => eprintln!("{}", line),
        }
    }

    /// Clear the bar once the run is over.
    pub fn finish(&self) {
        if let Ok(mut guard) = self.bar.lock() {
            if let Some(bar) = guard.take() {
                bar.finish_and_clear();
            }
        }
    }
}

impl ProgressSink for Progress {
    fn on_progress(&self, current: usize, total: usize, message: &str) {
        if self.quiet {
            return;
        }

        let Ok(mut guard) = self.bar.lock() else {
            return;
        };
        let bar = guard.get_or_insert_with(|| {
            let bar = ProgressBar::new(total as u64);
            bar.set_style(Self::style());
            bar
        });
        bar.set_length(total as u64);
        bar.set_position(current as u64);
        bar.set_message(message.to_string());
    }
}
