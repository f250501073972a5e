//! Leaderboard ranking and terminal display.

use std::time::Duration;

use chrono::NaiveDateTime;
use owo_colors::OwoColorize;

use crate::error::Result;
use crate::shutdown::ShutdownSignal;
use crate::storage::SessionSummary;

/// Longest name rendered before truncation.
pub const MAX_DISPLAY_NAME_LEN: usize = 20;

/// Derived, read-only ranking row. Computed from history at render time,
/// never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub name: String,
    pub high_score: u32,
    pub timestamp: NaiveDateTime,
}

/// Rank history: descending high score, ties broken by earlier timestamp
/// (first recorded wins), truncated to `top_n`.
pub fn rank(history: &[SessionSummary], top_n: usize) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = history
        .iter()
        .map(|row| LeaderboardEntry {
            name: row.name.clone(),
            high_score: row.high_score,
            timestamp: row.timestamp,
        })
        .collect();

    entries.sort_by(|a, b| {
        b.high_score
            .cmp(&a.high_score)
            .then(a.timestamp.cmp(&b.timestamp))
    });
    entries.truncate(top_n);
    entries
}

/// Renders the ranking for a fixed duration, then returns unconditionally.
pub trait LeaderboardView {
    fn show(
        &mut self,
        entries: &[LeaderboardEntry],
        duration: Duration,
        shutdown: &ShutdownSignal,
    ) -> Result<()>;
}

/// Trim a name for rendering: printable ASCII only, bounded length.
pub fn sanitize_display_name(name: &str) -> String {
    let mut cleaned: String = name
        .chars()
        .filter(|c| (' '..='~').contains(c))
        .collect();
    if cleaned.len() > MAX_DISPLAY_NAME_LEN {
        cleaned.truncate(MAX_DISPLAY_NAME_LEN - 1);
        cleaned.push('…');
    }
    cleaned
}

/// Plain-text leaderboard lines (color applied separately at print time).
pub fn format_entries(entries: &[LeaderboardEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec!["  No scores recorded yet!".to_string()];
    }
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            format!(
                "  {}. {:<20}  {}",
                i + 1,
                sanitize_display_name(&entry.name),
                entry.high_score
            )
        })
        .collect()
}

/// Terminal leaderboard: prints the ranking, holds for the display
/// duration (interruptible), returns without needing input.
pub struct TerminalLeaderboard;

impl LeaderboardView for TerminalLeaderboard {
    fn show(
        &mut self,
        entries: &[LeaderboardEntry],
        duration: Duration,
        shutdown: &ShutdownSignal,
    ) -> Result<()> {
        println!();
        println!("{}", "=== LEADERBOARD ===".yellow().bold());
        for (i, line) in format_entries(entries).iter().enumerate() {
            match i {
                0 => println!("{}", line.yellow()),
                1 => println!("{}", line.white()),
                2 => println!("{}", line.red()),
                _ => println!("{}", line),
            }
        }
        println!("{}", "Play to get on the leaderboard!".dimmed());
        println!();

        shutdown.wait(duration);
        Ok(())
    }
}
