//! Session persistence.
//!
//! One CSV row per finalized session, append-only, fixed try-score
//! columns. The history read-back feeds the leaderboard.

mod format;
mod store;

pub use format::*;
pub use store::*;
