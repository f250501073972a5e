//! Player registration seam.

use crate::error::Result;
use crate::session::PlayerProfile;
use crate::shutdown::ShutdownSignal;

/// What came out of the registration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationOutcome {
    Submitted(PlayerProfile),
    /// Operator closed the form; the booth loop ends.
    Cancelled,
}

/// Blocks until a valid profile is submitted or the form is cancelled.
///
/// Field validation (and re-prompting on bad input) happens entirely
/// inside the implementation; a returned profile is always valid for the
/// booth's configured requirements. Implementations must watch `shutdown`
/// and return `Cancelled` when it trips.
pub trait RegistrationCollector {
    fn collect(&mut self, shutdown: &ShutdownSignal) -> Result<RegistrationOutcome>;
}
