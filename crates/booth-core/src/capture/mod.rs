//! Score acquisition.
//!
//! One capability behind one trait: "capture the current score, or time
//! out". The manual implementation lives in the CLI crate; the automatic
//! one polls a score feed maintained by an external reader process.

mod auto;
mod monitor;
mod reader;

pub use auto::*;
pub use monitor::*;
pub use reader::*;

use std::time::Duration;

use crate::error::Result;
use crate::session::CaptureMethod;
use crate::shutdown::ShutdownSignal;

/// Outcome of one capture attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreCapture {
    Captured(u32),
    /// Nothing usable within the timeout. The orchestrator records a
    /// defaulted zero score; it never blocks a try on this.
    TimedOut,
}

pub trait ScoreSource {
    /// Capture the score for the try that just ended.
    ///
    /// Must return within `timeout` (give or take one poll interval) and
    /// must honor `shutdown` so an exit request is not stuck behind a
    /// capture prompt.
    fn capture(&mut self, timeout: Duration, shutdown: &ShutdownSignal) -> Result<ScoreCapture>;

    /// Tag recorded on successfully captured scores.
    fn method(&self) -> CaptureMethod;
}
