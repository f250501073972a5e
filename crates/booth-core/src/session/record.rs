use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::session::PlayerProfile;

/// How a try's score was obtained.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, IntoStaticStr,
    Display,
)]
pub enum CaptureMethod {
    #[strum(serialize = "manual")]
    Manual,
    #[strum(serialize = "ocr")]
    Ocr,
    /// Capture was skipped or timed out; score defaulted to 0.
    #[strum(serialize = "timeout_default")]
    TimeoutDefault,
}

/// Lifecycle tag of a session.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    EnumString,
    IntoStaticStr,
    Display,
)]
pub enum SessionStatus {
    #[default]
    #[strum(serialize = "in_progress")]
    InProgress,
    #[strum(serialize = "ended_early")]
    EndedEarly,
    #[strum(serialize = "completed")]
    Completed,
}

/// One finished play attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TryResult {
    /// 1-based, contiguous within a session.
    pub try_index: u32,
    pub score: u32,
    pub method: CaptureMethod,
}

/// One player's registration-to-leaderboard cycle.
///
/// Owned exclusively by the orchestrator; tries are appended in order and
/// the session becomes immutable once finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    profile: PlayerProfile,
    max_tries: u32,
    tries: Vec<TryResult>,
    status: SessionStatus,
}

impl Session {
    pub fn new(profile: PlayerProfile, max_tries: u32) -> Self {
        Self {
            profile,
            max_tries: max_tries.max(1),
            tries: Vec::new(),
            status: SessionStatus::InProgress,
        }
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    pub fn tries(&self) -> &[TryResult] {
        &self.tries
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Index the next recorded try will get (1-based).
    pub fn next_try_index(&self) -> u32 {
        self.tries.len() as u32 + 1
    }

    /// True once every try slot has been played.
    pub fn is_full(&self) -> bool {
        self.tries.len() as u32 >= self.max_tries
    }

    /// Append the result of the try that just finished.
    ///
    /// Returns the recorded result, or `None` if the session is already
    /// full or finalized (callers treat that as a dropped duplicate signal).
    pub fn record_try(&mut self, score: u32, method: CaptureMethod) -> Option<TryResult> {
        if self.is_full() || self.status != SessionStatus::InProgress {
            return None;
        }
        let result = TryResult {
            try_index: self.next_try_index(),
            score,
            method,
        };
        self.tries.push(result);
        Some(result)
    }

    /// Highest score across recorded tries, 0 if none.
    pub fn high_score(&self) -> u32 {
        self.tries.iter().map(|t| t.score).max().unwrap_or(0)
    }

    /// Mark the session finished.
    ///
    /// A full session always finalizes as completed, whatever the operator
    /// chose; an early save keeps the ended-early tag.
    pub fn finalize(&mut self, early: bool) -> SessionStatus {
        self.status = if early && !self.is_full() {
            SessionStatus::EndedEarly
        } else {
            SessionStatus::Completed
        };
        self.status
    }
}
