//! CSV row formatting and parsing for the booth score file.
//!
//! The file is operator-facing (opened in spreadsheet tools), so free-text
//! fields are sanitized against formula injection and control characters
//! before they are written.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::error::{Error, Result};

/// Timestamp column format.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Ceiling applied to persisted scores.
pub const MAX_SCORE: u32 = 999_999;

/// Number of fixed (non-try) columns before the trailing high score.
const LEADING_COLUMNS: usize = 5;

/// One persisted session row.
///
/// `try_scores` always has one slot per configured try; slots never played
/// are `None` and serialize as blank columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub timestamp: NaiveDateTime,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub contact_permission: bool,
    pub try_scores: Vec<Option<u32>>,
    pub high_score: u32,
}

impl SessionSummary {
    /// Count of tries actually played.
    pub fn tries_played(&self) -> usize {
        self.try_scores.iter().flatten().count()
    }
}

/// Clamp a score to the persisted ceiling.
pub fn clamp_score(score: u32) -> u32 {
    score.min(MAX_SCORE)
}

/// Sanitize a free-text field for CSV.
///
/// Strips control characters and neutralizes spreadsheet formula prefixes
/// (`=`, `+`, `-`, `@`) with a leading apostrophe.
pub fn sanitize_field(value: &str) -> String {
    let cleaned: String = value.chars().filter(|c| !c.is_control()).collect();
    match cleaned.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') => format!("'{}", cleaned),
        _ => cleaned,
    }
}

/// Quote a field if it contains separators or quotes.
fn escape_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Header line for a booth with `max_tries` try columns.
pub fn format_csv_header(max_tries: u32) -> String {
    let mut columns = vec![
        "Timestamp".to_string(),
        "Name".to_string(),
        "Email".to_string(),
        "Phone".to_string(),
        "Contact_Permission".to_string(),
    ];
    for i in 1..=max_tries {
        columns.push(format!("Try_{}_Score", i));
    }
    columns.push("High_Score".to_string());
    columns.join(",")
}

/// Format one session row. Column count matches [`format_csv_header`] for
/// the same try-slot count, whatever the session actually played.
pub fn format_csv_row(summary: &SessionSummary) -> String {
    let consent = if summary.contact_permission { "Yes" } else { "No" };
    let mut fields = vec![
        summary.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        escape_field(&sanitize_field(&summary.name)),
        escape_field(&sanitize_field(&summary.email)),
        escape_field(&sanitize_field(&summary.phone)),
        consent.to_string(),
    ];
    for slot in &summary.try_scores {
        fields.push(match slot {
            Some(score) => clamp_score(*score).to_string(),
            None => String::new(),
        });
    }
    fields.push(clamp_score(summary.high_score).to_string());
    fields.join(",")
}

/// Split one CSV line into fields, honoring double-quote escaping.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}

/// Parse one data row back into a summary.
///
/// `line_no` is only used for diagnostics.
pub fn parse_csv_row(line: &str, line_no: usize) -> Result<SessionSummary> {
    let fields = split_csv_line(line);
    if fields.len() < LEADING_COLUMNS + 2 {
        return Err(Error::MalformedRow {
            line: line_no,
            message: format!("expected at least 7 columns, got {}", fields.len()),
        });
    }

    let timestamp = NaiveDateTime::parse_from_str(&fields[0], TIMESTAMP_FORMAT).map_err(|e| {
        Error::MalformedRow {
            line: line_no,
            message: format!("bad timestamp '{}': {}", fields[0], e),
        }
    })?;

    let high_field = fields.last().map(String::as_str).unwrap_or_default();
    let high_score = parse_score_field(high_field, line_no)?.unwrap_or(0);

    let try_scores = fields[LEADING_COLUMNS..fields.len() - 1]
        .iter()
        .map(|f| parse_score_field(f, line_no))
        .collect::<Result<Vec<_>>>()?;

    Ok(SessionSummary {
        timestamp,
        name: fields[1].clone(),
        email: fields[2].clone(),
        phone: fields[3].clone(),
        contact_permission: fields[4].eq_ignore_ascii_case("yes"),
        try_scores,
        high_score,
    })
}

fn parse_score_field(field: &str, line_no: usize) -> Result<Option<u32>> {
    let field = field.trim();
    if field.is_empty() {
        return Ok(None);
    }
    field
        .parse::<u32>()
        .map(Some)
        .map_err(|_| Error::MalformedRow {
            line: line_no,
            message: format!("bad score '{}'", field),
        })
}
