use serde::{Deserialize, Serialize};

use crate::config::RegistrationConfig;

/// Minimum digits for a phone number to be considered valid.
pub const MIN_PHONE_DIGITS: usize = 10;

/// Player contact details collected at registration.
///
/// Immutable once a session is created from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contact_permission: bool,
}

impl PlayerProfile {
    /// Display name for leaderboard / console output.
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            "Player"
        } else {
            self.name.trim()
        }
    }
}

/// One failed field check, re-promptable by the registration UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    NameMissing,
    EmailMissing,
    EmailInvalid,
    PhoneMissing,
    PhoneInvalid,
}

impl FieldError {
    pub fn message(&self) -> &'static str {
        match self {
            Self::NameMissing => "Name is required",
            Self::EmailMissing => "Email is required",
            Self::EmailInvalid => "Invalid email format",
            Self::PhoneMissing => "Phone number is required",
            Self::PhoneInvalid => "Phone number must have at least 10 digits",
        }
    }
}

/// Validate a profile against the booth's field requirements.
///
/// Returns every failed check so the form can show them all at once.
pub fn validate_profile(
    profile: &PlayerProfile,
    requirements: &RegistrationConfig,
) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if requirements.require_name && profile.name.trim().is_empty() {
        errors.push(FieldError::NameMissing);
    }

    if requirements.require_email {
        let email = profile.email.trim();
        if email.is_empty() {
            errors.push(FieldError::EmailMissing);
        } else if !is_valid_email(email) {
            errors.push(FieldError::EmailInvalid);
        }
    }

    if requirements.require_phone {
        let phone = profile.phone.trim();
        if phone.is_empty() {
            errors.push(FieldError::PhoneMissing);
        } else if !is_valid_phone(phone) {
            errors.push(FieldError::PhoneInvalid);
        }
    }

    errors
}

/// Structural email check: one '@', non-empty local part, dotted domain.
pub fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}

/// Phone check: at least [`MIN_PHONE_DIGITS`] digits once separators are stripped.
pub fn is_valid_phone(phone: &str) -> bool {
    phone.chars().filter(|c| c.is_ascii_digit()).count() >= MIN_PHONE_DIGITS
}
