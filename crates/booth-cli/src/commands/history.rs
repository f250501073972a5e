//! Dump stored sessions as JSON for offline analysis.

use anyhow::Result;
use booth_core::{BoothConfig, CsvStore, SessionStore};

pub fn run(config: BoothConfig) -> Result<()> {
    let store = CsvStore::new(&config.storage.csv_path, config.max_tries);
    let history = store.list_history()?;
    println!("{}", serde_json::to_string_pretty(&history)?);
    Ok(())
}
