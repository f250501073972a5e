//! Terminal implementations of the registration form and manual score
//! entry.

use std::io::{self, BufRead, Write};
use std::time::Duration;

use booth_core::{
    CaptureMethod, PlayerProfile, RegistrationCollector, RegistrationConfig, RegistrationOutcome,
    Result, ScoreCapture, ScoreSource, ShutdownSignal, validate_profile,
};

/// Typing this (or closing stdin) at any registration prompt cancels the
/// booth.
const CANCEL_WORD: &str = "cancel";

/// Read one trimmed line; `None` on EOF.
fn read_line(prompt: &str) -> io::Result<Option<String>> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Interactive registration form.
///
/// Prompts for each field, validates against the booth's requirements, and
/// re-prompts with the full error list until the profile passes. Validation
/// problems never leave this type.
pub struct CliRegistrationForm {
    requirements: RegistrationConfig,
}

impl CliRegistrationForm {
    pub fn new(requirements: RegistrationConfig) -> Self {
        Self { requirements }
    }

    fn prompt_profile(&self) -> io::Result<Option<PlayerProfile>> {
        println!();
        println!("=== Player Registration === (type '{}' to exit)", CANCEL_WORD);

        let fields = [
            ("Full name: ", self.requirements.require_name),
            ("Email address: ", self.requirements.require_email),
            ("Phone number: ", self.requirements.require_phone),
        ];
        let mut values = Vec::with_capacity(fields.len());
        for (label, required) in fields {
            let label = if required {
                format!("{}* ", label.trim_end())
            } else {
                label.to_string()
            };
            let Some(value) = read_line(&format!("  {} ", label.trim_end()))? else {
                return Ok(None);
            };
            if value.eq_ignore_ascii_case(CANCEL_WORD) {
                return Ok(None);
            }
            values.push(value);
        }

        let Some(consent) = read_line("  May we contact you about future events? [y/N] ")? else {
            return Ok(None);
        };

        let mut values = values.into_iter();
        Ok(Some(PlayerProfile {
            name: values.next().unwrap_or_default(),
            email: values.next().unwrap_or_default(),
            phone: values.next().unwrap_or_default(),
            contact_permission: consent.eq_ignore_ascii_case("y")
                || consent.eq_ignore_ascii_case("yes"),
        }))
    }
}

impl RegistrationCollector for CliRegistrationForm {
    fn collect(&mut self, shutdown: &ShutdownSignal) -> Result<RegistrationOutcome> {
        loop {
            if shutdown.is_shutdown() {
                return Ok(RegistrationOutcome::Cancelled);
            }

            let Some(profile) = self.prompt_profile()? else {
                return Ok(RegistrationOutcome::Cancelled);
            };

            let errors = validate_profile(&profile, &self.requirements);
            if errors.is_empty() {
                return Ok(RegistrationOutcome::Submitted(profile));
            }
            println!();
            for error in errors {
                println!("  ! {}", error.message());
            }
        }
    }
}

/// Manual score entry: the operator reads the score off the game screen
/// and types it in. Blank input or EOF skips the try (recorded as a
/// defaulted zero upstream).
pub struct ManualScoreEntry;

impl ScoreSource for ManualScoreEntry {
    fn capture(&mut self, _timeout: Duration, shutdown: &ShutdownSignal) -> Result<ScoreCapture> {
        loop {
            if shutdown.is_shutdown() {
                return Ok(ScoreCapture::TimedOut);
            }

            let Some(line) = read_line("Enter final score (blank to skip): ")? else {
                return Ok(ScoreCapture::TimedOut);
            };
            if line.is_empty() {
                return Ok(ScoreCapture::TimedOut);
            }
            match line.parse::<u32>() {
                Ok(score) => return Ok(ScoreCapture::Captured(score)),
                Err(_) => println!("  ! Please enter a whole number 0 or greater"),
            }
        }
    }

    fn method(&self) -> CaptureMethod {
        CaptureMethod::Manual
    }
}
