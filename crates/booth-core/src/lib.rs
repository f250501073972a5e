//! # booth-core
//!
//! Core library for the pose-booth session manager.
//!
//! This crate provides:
//! - The session state machine and orchestrator
//! - Player registration, score capture, and game control seams
//! - CSV session storage and leaderboard ranking
//! - Booth configuration and shutdown plumbing
//!
//! The binary crate (`booth-cli`) supplies the terminal implementations of
//! the collaborator traits and wires everything together.

pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod leaderboard;
pub mod orchestrator;
pub mod registration;
pub mod session;
pub mod shutdown;
pub mod signal;
pub mod storage;

pub use capture::{
    AutoScoreSource, FileScoreReader, ScoreCapture, ScoreMonitor, ScoreReader, ScoreSource,
    parse_score,
};
pub use config::{BoothConfig, CaptureConfig, CaptureMode, RegistrationConfig, timing};
pub use controller::{ControllerEvent, GameController, MonitoredController, NullController};
pub use error::{Error, Result};
pub use leaderboard::{
    LeaderboardEntry, LeaderboardView, TerminalLeaderboard, format_entries, rank,
    sanitize_display_name,
};
pub use orchestrator::Orchestrator;
pub use registration::{RegistrationCollector, RegistrationOutcome};
pub use session::{
    BoothState, CaptureMethod, DecisionOutcome, FieldError, PlayerProfile, Session,
    SessionMachine, SessionStatus, TryDecision, TryResult, validate_profile,
};
pub use shutdown::ShutdownSignal;
pub use signal::{BoothSignal, SignalSource};
pub use storage::{
    CsvStore, SessionStore, SessionSummary, clamp_score, format_csv_header, format_csv_row,
    parse_csv_row, sanitize_field,
};
