use std::path::{Path, PathBuf};

use crate::error::Result;

/// Raw score readings from wherever the game surfaces them.
///
/// `Ok(None)` means "nothing readable right now" (blank feed, OCR miss);
/// it is an expected condition, not an error.
pub trait ScoreReader {
    fn read_score(&mut self) -> Result<Option<u32>>;
}

/// Reads the score from a text file kept current by an external process
/// (an OCR sidecar, a game plugin, a manual helper script).
pub struct FileScoreReader {
    path: PathBuf,
}

impl FileScoreReader {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ScoreReader for FileScoreReader {
    fn read_score(&mut self) -> Result<Option<u32>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            // Feed not written yet: not an error, just no reading
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_score(&text))
    }
}

/// Extract a score from feed text: digits only, other characters ignored.
///
/// Tolerates thousands separators and stray OCR artifacts ("1,234 pts" ->
/// 1234). No digits at all means no reading.
pub fn parse_score(text: &str) -> Option<u32> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    // Saturate absurdly long digit runs instead of failing the read
    Some(digits.parse::<u32>().unwrap_or(u32::MAX))
}
