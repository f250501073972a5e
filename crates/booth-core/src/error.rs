use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Score feed unreadable: {0}")]
    ScoreFeedUnreadable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed history row {line}: {message}")]
    MalformedRow { line: usize, message: String },

    #[error("Input device unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}
