//! Operator/input signal abstraction.
//!
//! The state machine consumes [`BoothSignal`]s without knowing where they
//! came from: a keyboard, a pose-detection gesture, a physical button, or a
//! test fixture all drive the same transition table.

use std::time::Duration;

/// One externally triggered booth event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothSignal {
    /// Player is ready; begin the next try (e.g. join-hands gesture).
    StartTry,
    /// The current try is over; capture a score.
    GameOver,
    /// Operator decision: another try.
    PlayAgain,
    /// Operator decision: save the session and end it.
    SaveAndEnd,
    /// Shut the whole booth down.
    Terminate,
}

/// Source of booth signals.
///
/// `poll` blocks for at most `timeout` and returns the next pending signal,
/// or `None` if nothing arrived. Implementations must never block past the
/// timeout; the orchestrator relies on that to stay responsive to shutdown.
pub trait SignalSource {
    fn poll(&mut self, timeout: Duration) -> Option<BoothSignal>;
}

impl<T: SignalSource + ?Sized> SignalSource for Box<T> {
    fn poll(&mut self, timeout: Duration) -> Option<BoothSignal> {
        (**self).poll(timeout)
    }
}
