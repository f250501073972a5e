//! Booth configuration.
//!
//! Loaded from a TOML file; every field has a default so a missing or
//! partial file still yields a runnable booth.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Fixed timing constants that are not operator-tunable.
pub mod timing {
    use std::time::Duration;

    /// Granularity of signal polling in the orchestrator loop.
    pub const SIGNAL_POLL: Duration = Duration::from_millis(100);
    /// Granularity of game-over auto-detect polling.
    pub const CONTROLLER_POLL: Duration = Duration::from_millis(100);
    /// Pause between two booth cycles.
    pub const CYCLE_PAUSE: Duration = Duration::from_secs(1);
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BoothConfig {
    /// Maximum play attempts per session (>= 1).
    pub max_tries: u32,
    pub capture: CaptureConfig,
    pub registration: RegistrationConfig,
    pub leaderboard: LeaderboardConfig,
    pub session: SessionConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Operator types the final score in at the end of each try.
    Manual,
    /// Final score is read from an external score feed (e.g. an OCR
    /// process writing to a file).
    Auto,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub mode: CaptureMode,
    /// Path to the score feed consumed in auto mode.
    pub score_feed: PathBuf,
    /// How long manual entry / auto capture may take before the try is
    /// recorded with a defaulted score.
    pub entry_timeout_secs: u64,
    /// Score feed poll interval.
    pub poll_interval_ms: u64,
    /// Seconds of unchanged score before a try counts as over.
    pub freeze_secs: u64,
    /// Seconds of continuous feed read failure before a try counts as over.
    pub read_timeout_secs: u64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RegistrationConfig {
    pub require_name: bool,
    pub require_email: bool,
    pub require_phone: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub display_secs: u64,
    pub top_n: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Window after "play again" during which start / game-over signals
    /// are ignored.
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub csv_path: PathBuf,
}

impl Default for BoothConfig {
    fn default() -> Self {
        Self {
            max_tries: 3,
            capture: CaptureConfig::default(),
            registration: RegistrationConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            session: SessionConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Manual,
            score_feed: PathBuf::from("score_feed.txt"),
            entry_timeout_secs: 60,
            poll_interval_ms: 300,
            freeze_secs: 5,
            read_timeout_secs: 180,
        }
    }
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            require_name: true,
            require_email: true,
            require_phone: true,
        }
    }
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            display_secs: 5,
            top_n: 3,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { cooldown_ms: 1500 }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("scores.csv"),
        }
    }
}

impl BoothConfig {
    /// Load config from a TOML file.
    ///
    /// A missing file falls back to defaults with a warning; a present but
    /// unparsable file is an error (a misconfigured booth should not start
    /// with silently different settings).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Config file {:?} not found, using defaults", path);
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self = toml::from_str(&text)
            .map_err(|e| Error::InvalidConfig(format!("{:?}: {}", path, e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 {
            return Err(Error::InvalidConfig("max_tries must be >= 1".into()));
        }
        if self.capture.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "capture.poll_interval_ms must be > 0".into(),
            ));
        }
        if self.leaderboard.top_n == 0 {
            return Err(Error::InvalidConfig("leaderboard.top_n must be >= 1".into()));
        }
        Ok(())
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.session.cooldown_ms)
    }

    pub fn entry_timeout(&self) -> Duration {
        Duration::from_secs(self.capture.entry_timeout_secs)
    }

    pub fn display_duration(&self) -> Duration {
        Duration::from_secs(self.leaderboard.display_secs)
    }
}

impl CaptureConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Consecutive unchanged polls needed to call a score frozen.
    pub fn freeze_polls(&self) -> u32 {
        let polls = self.freeze_secs * 1000 / self.poll_interval_ms.max(1);
        (polls as u32).max(1)
    }

    /// Consecutive failed polls needed to call the feed dead.
    pub fn failure_polls(&self) -> u32 {
        let polls = self.read_timeout_secs * 1000 / self.poll_interval_ms.max(1);
        (polls as u32).max(1)
    }
}
