//! Booth orchestrator.
//!
//! Owns the state machine, the collaborators, and the single in-flight
//! session. Runs registration -> try loop -> persist -> leaderboard ->
//! reset until the operator terminates the booth. Every collaborator
//! failure has a defined fallback; none may stall the loop.

use std::time::{Duration, Instant};

use tracing::{error, info, warn};

use crate::capture::{ScoreCapture, ScoreSource};
use crate::config::{BoothConfig, timing};
use crate::controller::{ControllerEvent, GameController};
use crate::error::Result;
use crate::leaderboard::{LeaderboardView, rank};
use crate::registration::{RegistrationCollector, RegistrationOutcome};
use crate::session::{BoothState, CaptureMethod, SessionMachine, TryDecision};
use crate::shutdown::ShutdownSignal;
use crate::signal::{BoothSignal, SignalSource};
use crate::storage::SessionStore;

/// How one booth cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CycleEnd {
    /// Loop back to registration for the next player.
    Continue,
    /// Operator terminated the booth.
    Terminate,
}

pub struct Orchestrator {
    config: BoothConfig,
    machine: SessionMachine,
    registration: Box<dyn RegistrationCollector>,
    signals: Box<dyn SignalSource>,
    controller: Box<dyn GameController>,
    score_source: Box<dyn ScoreSource>,
    store: Box<dyn SessionStore>,
    view: Box<dyn LeaderboardView>,
}

impl Orchestrator {
    pub fn new(
        config: BoothConfig,
        registration: Box<dyn RegistrationCollector>,
        signals: Box<dyn SignalSource>,
        controller: Box<dyn GameController>,
        score_source: Box<dyn ScoreSource>,
        store: Box<dyn SessionStore>,
        view: Box<dyn LeaderboardView>,
    ) -> Self {
        let machine = SessionMachine::new(config.max_tries, config.cooldown());
        Self {
            config,
            machine,
            registration,
            signals,
            controller,
            score_source,
            store,
            view,
        }
    }

    /// Run the booth until registration is cancelled, a terminate signal
    /// arrives, or shutdown trips.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<()> {
        let mut sessions = 0usize;

        while !shutdown.is_shutdown() {
            self.machine.begin_registration();
            info!("Waiting for player registration...");

            match self.registration.collect(shutdown)? {
                RegistrationOutcome::Submitted(profile) => {
                    info!("Player registered: {}", profile.display_name());
                    self.machine.profile_submitted(profile);
                }
                RegistrationOutcome::Cancelled => {
                    self.machine.registration_cancelled();
                    info!("Registration cancelled, shutting the booth down");
                    break;
                }
            }

            if self.run_cycle(shutdown)? == CycleEnd::Terminate {
                break;
            }
            sessions += 1;

            if shutdown.wait(timing::CYCLE_PAUSE) {
                break;
            }
        }

        info!("Booth stopped after {} session(s)", sessions);
        Ok(())
    }

    /// Drive one session from AwaitingTryStart through the leaderboard.
    fn run_cycle(&mut self, shutdown: &ShutdownSignal) -> Result<CycleEnd> {
        // Auto-detect runs on the configured feed cadence, not the
        // (faster) signal poll cadence, so the freeze math holds.
        let controller_interval = self.config.capture.poll_interval();
        let mut last_controller_poll: Option<Instant> = None;

        loop {
            if shutdown.is_shutdown() {
                self.abandon_session("shutdown requested");
                return Ok(CycleEnd::Terminate);
            }

            match self.machine.state() {
                BoothState::AwaitingTryStart => {
                    let Some(signal) = self.signals.poll(timing::SIGNAL_POLL) else {
                        continue;
                    };
                    match signal {
                        BoothSignal::StartTry => {
                            let now = Instant::now();
                            if self.machine.start_signal(now) {
                                let try_index = self
                                    .machine
                                    .session()
                                    .map(|s| s.next_try_index())
                                    .unwrap_or(1);
                                info!("Starting try {}/{}", try_index, self.config.max_tries);
                                if let Err(e) = self.controller.start_try(try_index) {
                                    // The try still runs; the operator key can end it
                                    warn!("Game controller start failed: {}", e);
                                }
                            }
                        }
                        BoothSignal::Terminate => {
                            self.abandon_session("terminate signal");
                            return Ok(CycleEnd::Terminate);
                        }
                        // Game-over and decision keys are stale here
                        _ => {}
                    }
                }

                BoothState::TryInProgress => {
                    if let Some(signal) = self.signals.poll(timing::CONTROLLER_POLL) {
                        match signal {
                            BoothSignal::GameOver => {
                                self.on_game_over(Instant::now());
                                continue;
                            }
                            BoothSignal::Terminate => {
                                self.abandon_session("terminate signal");
                                return Ok(CycleEnd::Terminate);
                            }
                            _ => {}
                        }
                    }
                    let now = Instant::now();
                    if last_controller_poll
                        .is_none_or(|last| now.duration_since(last) >= controller_interval)
                    {
                        last_controller_poll = Some(now);
                        match self.controller.poll() {
                            Ok(ControllerEvent::GameOver) => self.on_game_over(now),
                            Ok(ControllerEvent::Running) => {}
                            Err(e) => warn!("Game controller poll failed: {}", e),
                        }
                    }
                }

                BoothState::AwaitingScore => {
                    self.capture_score(shutdown);
                }

                BoothState::TryDecision => {
                    let Some(signal) = self.signals.poll(timing::SIGNAL_POLL) else {
                        continue;
                    };
                    let decision = match signal {
                        BoothSignal::PlayAgain => TryDecision::PlayAgain,
                        BoothSignal::SaveAndEnd => TryDecision::SaveAndEnd,
                        BoothSignal::Terminate => {
                            self.abandon_session("terminate signal");
                            return Ok(CycleEnd::Terminate);
                        }
                        _ => continue,
                    };
                    self.machine.decide(decision, Instant::now());
                }

                BoothState::Finalizing => {
                    self.persist_and_show(shutdown);
                }

                BoothState::ShowingLeaderboard => {
                    // persist_and_show already held the display; close out
                    if let Some(session) = self.machine.cycle_complete() {
                        info!(
                            "Session finished: {} tries, high score {} ({})",
                            session.tries().len(),
                            session.high_score(),
                            session.status()
                        );
                    }
                    return Ok(CycleEnd::Continue);
                }

                // Registration states are handled by `run`; reaching them
                // here means the cycle is over.
                BoothState::Idle | BoothState::Registering => return Ok(CycleEnd::Continue),
            }
        }
    }

    fn on_game_over(&mut self, now: Instant) {
        if self.machine.game_over_signal(now) {
            if let Err(e) = self.controller.finish_try() {
                warn!("Game controller finish failed: {}", e);
            }
        }
    }

    /// Capture a score or default it; every try records exactly one result.
    fn capture_score(&mut self, shutdown: &ShutdownSignal) {
        let timeout = self.config.entry_timeout();
        let (score, method) = match self.score_source.capture(timeout, shutdown) {
            Ok(ScoreCapture::Captured(score)) => (score, self.score_source.method()),
            Ok(ScoreCapture::TimedOut) => {
                warn!("Score capture timed out, recording 0");
                (0, CaptureMethod::TimeoutDefault)
            }
            Err(e) => {
                warn!("Score capture failed ({}), recording 0", e);
                (0, CaptureMethod::TimeoutDefault)
            }
        };
        if let Some(result) = self.machine.score_recorded(score, method) {
            info!(
                "Try {} finished with score {} ({})",
                result.try_index, result.score, result.method
            );
        }
    }

    /// Persist the finalized session and hold the leaderboard display.
    /// Persistence failure loses this session's row but never the loop.
    fn persist_and_show(&mut self, shutdown: &ShutdownSignal) {
        if let Some(session) = self.machine.session() {
            match self.store.append(session) {
                Ok(()) => info!(
                    "Session saved: {} (high score {})",
                    session.profile().display_name(),
                    session.high_score()
                ),
                Err(e) => error!(
                    "SESSION DATA LOST for {}: failed to persist: {}",
                    session.profile().display_name(),
                    e
                ),
            }
        }
        self.machine.persisted();

        let history = match self.store.list_history() {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to read history for leaderboard: {}", e);
                Vec::new()
            }
        };
        let entries = rank(&history, self.config.leaderboard.top_n);
        if let Err(e) = self
            .view
            .show(&entries, self.config.display_duration(), shutdown)
        {
            warn!("Leaderboard display failed: {}", e);
        }
    }

    fn abandon_session(&mut self, reason: &str) {
        if let Some(session) = self.machine.session()
            && !session.tries().is_empty()
        {
            warn!(
                "Booth stopping ({}); in-flight session for {} discarded unsaved",
                reason,
                session.profile().display_name()
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NullController;
    use crate::error::Error;
    use crate::leaderboard::LeaderboardEntry;
    use crate::session::PlayerProfile;
    use crate::storage::SessionSummary;
    use chrono::NaiveDateTime;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn test_config(max_tries: u32) -> BoothConfig {
        let mut config = BoothConfig::default();
        config.max_tries = max_tries;
        // Real time does not pass in these tests
        config.session.cooldown_ms = 0;
        config.capture.entry_timeout_secs = 1;
        config.leaderboard.display_secs = 0;
        config
    }

    fn profile(name: &str) -> PlayerProfile {
        PlayerProfile {
            name: name.into(),
            email: "p@example.com".into(),
            phone: "5551234567".into(),
            contact_permission: false,
        }
    }

    struct QueueRegistration(VecDeque<RegistrationOutcome>);

    impl RegistrationCollector for QueueRegistration {
        fn collect(&mut self, _shutdown: &ShutdownSignal) -> Result<RegistrationOutcome> {
            Ok(self.0.pop_front().unwrap_or(RegistrationOutcome::Cancelled))
        }
    }

    /// Scripted signals; terminates the booth when the script runs dry so
    /// a wrong transition can never hang a test.
    struct QueueSignals(VecDeque<BoothSignal>);

    impl SignalSource for QueueSignals {
        fn poll(&mut self, _timeout: Duration) -> Option<BoothSignal> {
            Some(self.0.pop_front().unwrap_or(BoothSignal::Terminate))
        }
    }

    struct QueueScores(VecDeque<Result<ScoreCapture>>);

    impl ScoreSource for QueueScores {
        fn capture(
            &mut self,
            _timeout: Duration,
            _shutdown: &ShutdownSignal,
        ) -> Result<ScoreCapture> {
            self.0.pop_front().unwrap_or(Ok(ScoreCapture::TimedOut))
        }

        fn method(&self) -> CaptureMethod {
            CaptureMethod::Manual
        }
    }

    #[derive(Clone, Default)]
    struct MemoryStore {
        rows: Arc<Mutex<Vec<SessionSummary>>>,
        fail_appends: bool,
    }

    impl SessionStore for MemoryStore {
        fn append(&mut self, session: &crate::session::Session) -> Result<()> {
            if self.fail_appends {
                return Err(Error::Io(std::io::Error::other("disk full")));
            }
            let n = self.rows.lock().unwrap().len();
            let timestamp = NaiveDateTime::parse_from_str(
                &format!("2026-08-06 10:00:{:02}", n),
                crate::storage::TIMESTAMP_FORMAT,
            )
            .unwrap();
            let mut try_scores = vec![None; session.max_tries() as usize];
            for t in session.tries() {
                try_scores[(t.try_index - 1) as usize] = Some(t.score);
            }
            self.rows.lock().unwrap().push(SessionSummary {
                timestamp,
                name: session.profile().name.clone(),
                email: session.profile().email.clone(),
                phone: session.profile().phone.clone(),
                contact_permission: session.profile().contact_permission,
                try_scores,
                high_score: session.high_score(),
            });
            Ok(())
        }

        fn list_history(&self) -> Result<Vec<SessionSummary>> {
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingView {
        shown: Arc<Mutex<Vec<Vec<LeaderboardEntry>>>>,
    }

    impl LeaderboardView for RecordingView {
        fn show(
            &mut self,
            entries: &[LeaderboardEntry],
            _duration: Duration,
            _shutdown: &ShutdownSignal,
        ) -> Result<()> {
            self.shown.lock().unwrap().push(entries.to_vec());
            Ok(())
        }
    }

    fn orchestrator(
        max_tries: u32,
        registrations: Vec<RegistrationOutcome>,
        signals: Vec<BoothSignal>,
        scores: Vec<Result<ScoreCapture>>,
        store: MemoryStore,
        view: RecordingView,
    ) -> Orchestrator {
        Orchestrator::new(
            test_config(max_tries),
            Box::new(QueueRegistration(registrations.into())),
            Box::new(QueueSignals(signals.into())),
            Box::new(NullController),
            Box::new(QueueScores(scores.into())),
            Box::new(store),
            Box::new(view),
        )
    }

    fn play_signals(score_count: usize, last: BoothSignal) -> Vec<BoothSignal> {
        let mut signals = Vec::new();
        for i in 0..score_count {
            signals.push(BoothSignal::StartTry);
            signals.push(BoothSignal::GameOver);
            signals.push(if i + 1 == score_count {
                last
            } else {
                BoothSignal::PlayAgain
            });
        }
        signals
    }

    #[test]
    fn test_three_try_session_persisted() {
        let store = MemoryStore::default();
        let view = RecordingView::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Alice"))],
            play_signals(3, BoothSignal::PlayAgain),
            vec![
                Ok(ScoreCapture::Captured(150)),
                Ok(ScoreCapture::Captured(300)),
                Ok(ScoreCapture::Captured(90)),
            ],
            store.clone(),
            view.clone(),
        );
        orch.run(&shutdown).unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].try_scores, vec![Some(150), Some(300), Some(90)]);
        assert_eq!(rows[0].high_score, 300);

        // Leaderboard rendered once, already including the new row
        let shown = view.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0][0].high_score, 300);
    }

    #[test]
    fn test_save_and_end_on_first_try() {
        let store = MemoryStore::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Bob"))],
            play_signals(1, BoothSignal::SaveAndEnd),
            vec![Ok(ScoreCapture::Captured(80))],
            store.clone(),
            RecordingView::default(),
        );
        orch.run(&shutdown).unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].try_scores, vec![Some(80), None, None]);
        assert_eq!(rows[0].high_score, 80);
    }

    #[test]
    fn test_capture_timeout_defaults_to_zero() {
        let store = MemoryStore::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Cara"))],
            play_signals(2, BoothSignal::SaveAndEnd),
            vec![Ok(ScoreCapture::Captured(120)), Ok(ScoreCapture::TimedOut)],
            store.clone(),
            RecordingView::default(),
        );
        orch.run(&shutdown).unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows[0].try_scores, vec![Some(120), Some(0), None]);
        assert_eq!(rows[0].high_score, 120);
    }

    #[test]
    fn test_capture_error_defaults_to_zero() {
        let store = MemoryStore::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Dee"))],
            play_signals(1, BoothSignal::SaveAndEnd),
            vec![Err(Error::ScoreFeedUnreadable("lens cap on".into()))],
            store.clone(),
            RecordingView::default(),
        );
        orch.run(&shutdown).unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows[0].try_scores, vec![Some(0), None, None]);
    }

    #[test]
    fn test_store_failure_does_not_stop_loop() {
        let mut store = MemoryStore::default();
        store.fail_appends = true;
        let view = RecordingView::default();
        let shutdown = ShutdownSignal::new();

        let mut signals = play_signals(1, BoothSignal::SaveAndEnd);
        signals.extend(play_signals(1, BoothSignal::SaveAndEnd));

        let mut orch = orchestrator(
            3,
            vec![
                RegistrationOutcome::Submitted(profile("First")),
                RegistrationOutcome::Submitted(profile("Second")),
            ],
            signals,
            vec![Ok(ScoreCapture::Captured(10)), Ok(ScoreCapture::Captured(20))],
            store,
            view.clone(),
        );
        orch.run(&shutdown).unwrap();

        // Both cycles reached the leaderboard despite lost writes
        assert_eq!(view.shown.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_stale_game_over_before_start_is_dropped() {
        let store = MemoryStore::default();
        let shutdown = ShutdownSignal::new();

        // Spurious game-over first; the real try follows
        let mut signals = vec![BoothSignal::GameOver];
        signals.extend(play_signals(1, BoothSignal::SaveAndEnd));

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Eve"))],
            signals,
            vec![Ok(ScoreCapture::Captured(55))],
            store.clone(),
            RecordingView::default(),
        );
        orch.run(&shutdown).unwrap();

        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].try_scores, vec![Some(55), None, None]);
    }

    #[test]
    fn test_terminate_mid_session_discards_it() {
        let store = MemoryStore::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Submitted(profile("Gone"))],
            vec![BoothSignal::StartTry, BoothSignal::Terminate],
            vec![],
            store.clone(),
            RecordingView::default(),
        );
        orch.run(&shutdown).unwrap();

        assert!(store.rows.lock().unwrap().is_empty());
    }

    #[test]
    fn test_registration_cancel_ends_booth() {
        let store = MemoryStore::default();
        let view = RecordingView::default();
        let shutdown = ShutdownSignal::new();

        let mut orch = orchestrator(
            3,
            vec![RegistrationOutcome::Cancelled],
            vec![],
            vec![],
            store.clone(),
            view.clone(),
        );
        orch.run(&shutdown).unwrap();

        assert!(store.rows.lock().unwrap().is_empty());
        assert!(view.shown.lock().unwrap().is_empty());
    }

    #[test]
    fn test_two_sessions_rank_on_shared_history() {
        let store = MemoryStore::default();
        let view = RecordingView::default();
        let shutdown = ShutdownSignal::new();

        let mut signals = play_signals(1, BoothSignal::SaveAndEnd);
        signals.extend(play_signals(1, BoothSignal::SaveAndEnd));

        let mut orch = orchestrator(
            3,
            vec![
                RegistrationOutcome::Submitted(profile("Low")),
                RegistrationOutcome::Submitted(profile("High")),
            ],
            signals,
            vec![Ok(ScoreCapture::Captured(100)), Ok(ScoreCapture::Captured(900))],
            store,
            view.clone(),
        );
        orch.run(&shutdown).unwrap();

        let shown = view.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        // Second display ranks the new 900 above the earlier 100
        assert_eq!(shown[1][0].name, "High");
        assert_eq!(shown[1][1].name, "Low");
    }
}
