//! Main booth mode: run the registration/try/leaderboard loop until the
//! operator terminates it.

use std::sync::Arc;

use anyhow::{Context, Result};
use booth_core::{
    AutoScoreSource, BoothConfig, CaptureMode, CsvStore, Error, FileScoreReader, GameController,
    MonitoredController, NullController, Orchestrator, ScoreSource, ShutdownSignal,
    TerminalLeaderboard,
};
use tracing::info;

use crate::input;
use crate::prompter::{CliRegistrationForm, ManualScoreEntry};

pub fn run(config: BoothConfig) -> Result<()> {
    let shutdown = Arc::new(ShutdownSignal::new());
    let shutdown_ctrlc = Arc::clone(&shutdown);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal, stopping...");
        shutdown_ctrlc.trigger();
    })?;

    // Startup checks: a booth that cannot reach its devices must not
    // half-run.
    if config.capture.mode == CaptureMode::Auto {
        let feed = &config.capture.score_feed;
        if let Some(parent) = feed.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            return Err(Error::DeviceUnavailable(format!(
                "score feed directory {:?} does not exist; is the reader process set up?",
                parent
            ))
            .into());
        }
    }

    let (signals, _keyboard_handle) = input::spawn_keyboard_monitor(Arc::clone(&shutdown));

    let (controller, score_source): (Box<dyn GameController>, Box<dyn ScoreSource>) =
        match config.capture.mode {
            CaptureMode::Manual => (Box::new(NullController), Box::new(ManualScoreEntry)),
            CaptureMode::Auto => (
                Box::new(MonitoredController::new(
                    FileScoreReader::new(&config.capture.score_feed),
                    config.capture.freeze_polls(),
                    config.capture.failure_polls(),
                )),
                Box::new(AutoScoreSource::new(
                    FileScoreReader::new(&config.capture.score_feed),
                    config.capture.poll_interval(),
                )),
            ),
        };

    let store = CsvStore::new(&config.storage.csv_path, config.max_tries);
    let registration = CliRegistrationForm::new(config.registration);

    println!("Booth ready. Keys: Enter/s start try, Space game over,");
    println!("              p play again, e save & end, Esc/q quit.");

    let mut orchestrator = Orchestrator::new(
        config,
        Box::new(registration),
        Box::new(signals),
        controller,
        score_source,
        Box::new(store),
        Box::new(TerminalLeaderboard),
    );

    orchestrator
        .run(&shutdown)
        .context("booth loop failed")?;

    info!("Shutdown complete");
    Ok(())
}
