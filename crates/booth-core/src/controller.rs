//! Game session control.
//!
//! Starting/stopping a play attempt and detecting that it ended. Manual
//! booths rely on the operator's game-over key alone; auto booths add a
//! score-feed monitor that detects the end on its own.

use tracing::{debug, warn};

use crate::capture::{ScoreMonitor, ScoreReader};
use crate::error::Result;

/// What the controller saw since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    Running,
    GameOver,
}

pub trait GameController {
    /// A try is starting (the player just gave the start gesture).
    fn start_try(&mut self, try_index: u32) -> Result<()>;

    /// Non-blocking auto-detect check; called between signal polls.
    fn poll(&mut self) -> Result<ControllerEvent>;

    /// The try ended (by any path); stop monitoring and reset.
    fn finish_try(&mut self) -> Result<()>;
}

/// Controller for operator-signaled booths: starts and stops are
/// bookkeeping only, auto-detection never fires.
#[derive(Debug, Default)]
pub struct NullController;

impl GameController for NullController {
    fn start_try(&mut self, try_index: u32) -> Result<()> {
        debug!("Try {} started (operator-signaled booth)", try_index);
        Ok(())
    }

    fn poll(&mut self) -> Result<ControllerEvent> {
        Ok(ControllerEvent::Running)
    }

    fn finish_try(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Controller that watches a score feed and declares game over when the
/// score freezes or the feed goes dark.
pub struct MonitoredController<R> {
    reader: R,
    monitor: ScoreMonitor,
    active: bool,
}

impl<R: ScoreReader> MonitoredController<R> {
    pub fn new(reader: R, freeze_polls: u32, failure_polls: u32) -> Self {
        Self {
            reader,
            monitor: ScoreMonitor::new(freeze_polls, failure_polls),
            active: false,
        }
    }
}

impl<R: ScoreReader> GameController for MonitoredController<R> {
    fn start_try(&mut self, try_index: u32) -> Result<()> {
        self.monitor.reset();
        self.active = true;
        debug!("Try {} started, score monitoring armed", try_index);
        Ok(())
    }

    fn poll(&mut self) -> Result<ControllerEvent> {
        if !self.active {
            return Ok(ControllerEvent::Running);
        }
        let reading = match self.reader.read_score() {
            Ok(reading) => reading,
            Err(e) => {
                warn!("Score feed poll failed: {}", e);
                None
            }
        };
        if self.monitor.feed(reading) {
            debug!(
                "Game over auto-detected (highest seen: {})",
                self.monitor.highest()
            );
            return Ok(ControllerEvent::GameOver);
        }
        Ok(ControllerEvent::Running)
    }

    fn finish_try(&mut self) -> Result<()> {
        self.active = false;
        self.monitor.reset();
        Ok(())
    }
}
