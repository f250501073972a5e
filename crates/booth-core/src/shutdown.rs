use std::sync::{Condvar, Mutex};
use std::time::Duration;

/// A shutdown flag that supports interruptible waits.
///
/// Every bounded wait in the booth loop goes through this so that an
/// operator exit request takes effect immediately instead of after the
/// current sleep expires.
pub struct ShutdownSignal {
    state: Mutex<bool>,
    condvar: Condvar,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Trigger the shutdown signal, waking all waiting threads.
    pub fn trigger(&self) {
        let mut stopped = match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        *stopped = true;
        self.condvar.notify_all();
    }

    /// Check if shutdown has been triggered.
    pub fn is_shutdown(&self) -> bool {
        match self.state.lock() {
            Ok(g) => *g,
            // Poisoned lock: some thread died mid-update, stop the booth
            Err(_) => true,
        }
    }

    /// Wait for the given duration or until shutdown is triggered.
    ///
    /// Returns `true` if shutdown was triggered, `false` on a normal timeout.
    pub fn wait(&self, duration: Duration) -> bool {
        let Ok(guard) = self.state.lock() else {
            return true;
        };
        match self
            .condvar
            .wait_timeout_while(guard, duration, |stopped| !*stopped)
        {
            Ok((guard, _)) => *guard,
            Err(_) => true,
        }
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
