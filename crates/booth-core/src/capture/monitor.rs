/// Game-over detection from a stream of score readings.
///
/// Two independent conditions end a try:
/// - the score has not changed for `freeze_polls` consecutive readings
///   while some score has been seen (the game froze it on the result
///   screen);
/// - the feed has been unreadable for `failure_polls` consecutive polls
///   (window closed, game-over art covering the score).
///
/// Counts polls, not wall time; the caller owns the poll cadence.
#[derive(Debug)]
pub struct ScoreMonitor {
    freeze_polls: u32,
    failure_polls: u32,
    highest: u32,
    last_reading: u32,
    unchanged: u32,
    failures: u32,
    game_over: bool,
}

impl ScoreMonitor {
    pub fn new(freeze_polls: u32, failure_polls: u32) -> Self {
        Self {
            freeze_polls: freeze_polls.max(1),
            failure_polls: failure_polls.max(1),
            highest: 0,
            last_reading: 0,
            unchanged: 0,
            failures: 0,
            game_over: false,
        }
    }

    /// Feed one poll result. Returns true once game over is detected.
    pub fn feed(&mut self, reading: Option<u32>) -> bool {
        if self.game_over {
            return true;
        }

        match reading {
            Some(score) => {
                self.failures = 0;
                if score > self.highest {
                    self.highest = score;
                }
                if score == self.last_reading && self.highest > 0 {
                    self.unchanged += 1;
                } else {
                    self.unchanged = 0;
                    self.last_reading = score;
                }
            }
            None => {
                // Screen likely unchanged; count toward the freeze too
                self.failures += 1;
                if self.highest > 0 {
                    self.unchanged += 1;
                }
            }
        }

        if self.highest > 0 && self.unchanged >= self.freeze_polls {
            self.game_over = true;
        }
        if self.failures >= self.failure_polls {
            self.game_over = true;
        }
        self.game_over
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Highest score observed during the try.
    pub fn highest(&self) -> u32 {
        self.highest
    }

    /// Clear all state for the next try.
    pub fn reset(&mut self) {
        self.highest = 0;
        self.last_reading = 0;
        self.unchanged = 0;
        self.failures = 0;
        self.game_over = false;
    }
}
