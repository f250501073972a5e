use std::time::{Duration, Instant};

use tracing::debug;

use crate::capture::{ScoreCapture, ScoreReader, ScoreSource};
use crate::error::Result;
use crate::session::CaptureMethod;
use crate::shutdown::ShutdownSignal;

/// Automatic score capture from a score feed.
///
/// By the time this runs the game shows a frozen final score, so the
/// strategy is: poll until two consecutive readings agree, or fall back to
/// the highest reading seen before the deadline. No readings at all within
/// the timeout maps to [`ScoreCapture::TimedOut`], never to an error.
pub struct AutoScoreSource<R> {
    reader: R,
    poll_interval: Duration,
}

impl<R: ScoreReader> AutoScoreSource<R> {
    pub fn new(reader: R, poll_interval: Duration) -> Self {
        Self {
            reader,
            poll_interval,
        }
    }
}

impl<R: ScoreReader> ScoreSource for AutoScoreSource<R> {
    fn capture(&mut self, timeout: Duration, shutdown: &ShutdownSignal) -> Result<ScoreCapture> {
        let deadline = Instant::now() + timeout;
        let mut previous: Option<u32> = None;
        let mut highest: Option<u32> = None;

        while Instant::now() < deadline && !shutdown.is_shutdown() {
            match self.reader.read_score() {
                Ok(Some(score)) => {
                    if previous == Some(score) {
                        return Ok(ScoreCapture::Captured(score));
                    }
                    if highest.is_none_or(|h| score > h) {
                        highest = Some(score);
                    }
                    previous = Some(score);
                }
                Ok(None) => previous = None,
                Err(e) => {
                    // Transient feed trouble; keep polling until deadline
                    debug!("Score feed read failed: {}", e);
                    previous = None;
                }
            }

            if shutdown.wait(self.poll_interval) {
                break;
            }
        }

        Ok(match highest {
            Some(score) => ScoreCapture::Captured(score),
            None => ScoreCapture::TimedOut,
        })
    }

    fn method(&self) -> CaptureMethod {
        CaptureMethod::Ocr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Reader fed from a canned list of poll results.
    struct ScriptedReader {
        readings: Vec<Result<Option<u32>>>,
        cursor: usize,
    }

    impl ScriptedReader {
        fn new(readings: Vec<Result<Option<u32>>>) -> Self {
            Self {
                readings,
                cursor: 0,
            }
        }
    }

    impl ScoreReader for ScriptedReader {
        fn read_score(&mut self) -> Result<Option<u32>> {
            let reading = match self.readings.get_mut(self.cursor) {
                Some(r) => std::mem::replace(r, Ok(None)),
                None => Ok(None),
            };
            self.cursor += 1;
            reading
        }
    }

    fn source(readings: Vec<Result<Option<u32>>>) -> AutoScoreSource<ScriptedReader> {
        AutoScoreSource::new(ScriptedReader::new(readings), Duration::from_millis(1))
    }

    #[test]
    fn test_stable_reading_captured() {
        let shutdown = ShutdownSignal::new();
        let mut source = source(vec![Ok(Some(900)), Ok(Some(900))]);
        let capture = source
            .capture(Duration::from_millis(200), &shutdown)
            .unwrap();
        assert_eq!(capture, ScoreCapture::Captured(900));
    }

    #[test]
    fn test_blank_feed_times_out() {
        let shutdown = ShutdownSignal::new();
        let mut source = source(vec![]);
        let capture = source.capture(Duration::from_millis(20), &shutdown).unwrap();
        assert_eq!(capture, ScoreCapture::TimedOut);
    }

    #[test]
    fn test_unstable_readings_fall_back_to_highest() {
        let shutdown = ShutdownSignal::new();
        // Never two equal in a row; best seen should win at the deadline
        let readings: Vec<Result<Option<u32>>> =
            (0..200).map(|i| Ok(Some(100 + (i % 7)))).collect();
        let mut source = source(readings);
        let capture = source.capture(Duration::from_millis(20), &shutdown).unwrap();
        assert!(matches!(capture, ScoreCapture::Captured(s) if s >= 100));
    }

    #[test]
    fn test_read_errors_do_not_abort_capture() {
        let shutdown = ShutdownSignal::new();
        let mut source = source(vec![
            Err(Error::ScoreFeedUnreadable("glare".into())),
            Ok(Some(300)),
            Ok(Some(300)),
        ]);
        let capture = source
            .capture(Duration::from_millis(200), &shutdown)
            .unwrap();
        assert_eq!(capture, ScoreCapture::Captured(300));
    }
}
