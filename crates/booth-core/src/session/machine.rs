//! Booth session state machine.
//!
//! Pure transition logic: no clocks, no I/O. Callers feed it signals plus
//! the current `Instant`; it answers whether the signal was accepted and
//! which effect the orchestrator should run next. Signals arriving outside
//! their valid state are dropped, never queued.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::session::{CaptureMethod, PlayerProfile, Session, SessionStatus, TryResult};

/// Orchestrator-visible states of one booth cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoothState {
    Idle,
    Registering,
    AwaitingTryStart,
    TryInProgress,
    AwaitingScore,
    TryDecision,
    Finalizing,
    ShowingLeaderboard,
}

/// Operator choice at the end of a try.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryDecision {
    PlayAgain,
    SaveAndEnd,
}

/// What a decision led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// Another try slot opened; its 1-based index.
    NextTry(u32),
    /// Session finished with the given status.
    Finalize(SessionStatus),
    /// Decision arrived outside `TryDecision` and was dropped.
    Ignored,
}

pub struct SessionMachine {
    state: BoothState,
    session: Option<Session>,
    max_tries: u32,
    cooldown: Duration,
    /// Start / game-over signals are dropped until this deadline passes.
    ignore_until: Option<Instant>,
}

impl SessionMachine {
    pub fn new(max_tries: u32, cooldown: Duration) -> Self {
        Self {
            state: BoothState::Idle,
            session: None,
            max_tries: max_tries.max(1),
            cooldown,
            ignore_until: None,
        }
    }

    pub fn state(&self) -> BoothState {
        self.state
    }

    /// The in-flight session, if one exists.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn cooling_down(&self, now: Instant) -> bool {
        self.ignore_until.is_some_and(|deadline| now < deadline)
    }

    /// Idle (startup) or post-leaderboard reset -> Registering.
    pub fn begin_registration(&mut self) -> bool {
        if self.state != BoothState::Idle {
            return false;
        }
        self.state = BoothState::Registering;
        true
    }

    /// Registering -> AwaitingTryStart; creates the session.
    pub fn profile_submitted(&mut self, profile: PlayerProfile) -> bool {
        if self.state != BoothState::Registering {
            return false;
        }
        self.session = Some(Session::new(profile, self.max_tries));
        self.ignore_until = None;
        self.state = BoothState::AwaitingTryStart;
        true
    }

    /// Registering -> Idle. The caller terminates the booth loop.
    pub fn registration_cancelled(&mut self) -> bool {
        if self.state != BoothState::Registering {
            return false;
        }
        self.session = None;
        self.state = BoothState::Idle;
        true
    }

    /// AwaitingTryStart -> TryInProgress on an accepted start signal.
    pub fn start_signal(&mut self, now: Instant) -> bool {
        if self.state != BoothState::AwaitingTryStart {
            return false;
        }
        if self.cooling_down(now) {
            debug!("Start signal ignored during cooldown");
            return false;
        }
        self.state = BoothState::TryInProgress;
        true
    }

    /// TryInProgress -> AwaitingScore on an accepted game-over signal.
    ///
    /// Game-over signals during any other state are spurious (stale key
    /// press, double trigger) and dropped; so are signals inside the
    /// cooldown window, which would otherwise record a phantom try.
    pub fn game_over_signal(&mut self, now: Instant) -> bool {
        if self.state != BoothState::TryInProgress {
            debug!("Game-over signal dropped in {:?}", self.state);
            return false;
        }
        if self.cooling_down(now) {
            debug!("Game-over signal ignored during cooldown");
            return false;
        }
        self.state = BoothState::AwaitingScore;
        true
    }

    /// AwaitingScore -> TryDecision, recording exactly one TryResult.
    pub fn score_recorded(&mut self, score: u32, method: CaptureMethod) -> Option<TryResult> {
        if self.state != BoothState::AwaitingScore {
            return None;
        }
        let result = self.session.as_mut()?.record_try(score, method)?;
        self.state = BoothState::TryDecision;
        Some(result)
    }

    /// TryDecision -> AwaitingTryStart (cooldown armed) or Finalizing.
    pub fn decide(&mut self, decision: TryDecision, now: Instant) -> DecisionOutcome {
        if self.state != BoothState::TryDecision {
            return DecisionOutcome::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return DecisionOutcome::Ignored;
        };

        match decision {
            TryDecision::PlayAgain if !session.is_full() => {
                self.ignore_until = Some(now + self.cooldown);
                self.state = BoothState::AwaitingTryStart;
                DecisionOutcome::NextTry(session.next_try_index())
            }
            TryDecision::PlayAgain => {
                let status = session.finalize(false);
                self.state = BoothState::Finalizing;
                DecisionOutcome::Finalize(status)
            }
            TryDecision::SaveAndEnd => {
                let status = session.finalize(true);
                self.state = BoothState::Finalizing;
                DecisionOutcome::Finalize(status)
            }
        }
    }

    /// Finalizing -> ShowingLeaderboard (unconditional).
    pub fn persisted(&mut self) -> bool {
        if self.state != BoothState::Finalizing {
            return false;
        }
        self.state = BoothState::ShowingLeaderboard;
        true
    }

    /// ShowingLeaderboard -> Idle; hands back the finished session for
    /// disposal and leaves the machine ready for `begin_registration`.
    pub fn cycle_complete(&mut self) -> Option<Session> {
        if self.state != BoothState::ShowingLeaderboard {
            return None;
        }
        self.state = BoothState::Idle;
        self.ignore_until = None;
        self.session.take()
    }
}
