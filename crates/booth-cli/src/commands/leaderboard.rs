//! Standalone leaderboard print: rank the stored history and exit.

use anyhow::Result;
use booth_core::{BoothConfig, CsvStore, SessionStore, format_entries, rank};

pub fn run(config: BoothConfig, top_n: Option<usize>) -> Result<()> {
    let store = CsvStore::new(&config.storage.csv_path, config.max_tries);
    let history = store.list_history()?;
    let entries = rank(&history, top_n.unwrap_or(config.leaderboard.top_n));

    println!("=== LEADERBOARD ===");
    for line in format_entries(&entries) {
        println!("{}", line);
    }
    println!("({} session(s) on record)", history.len());
    Ok(())
}
