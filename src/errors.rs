//! Error types for playlist loading and playback control

use thiserror::Error;

/// Errors raised while obtaining or validating a playlist.
///
/// Parsing itself never fails; these cover transport, format sniffing and
/// the "nothing playable" outcome callers report to the user.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Invalid playlist URL: {0}")]
    InvalidUrl(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Failed to fetch playlist: {0}")]
    Fetch(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Playlist too large: {size_mb:.1}MB (limit {limit_mb}MB)")]
    TooLarge { size_mb: f64, limit_mb: usize },

    #[error("Failed to read playlist file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unrecognized playlist format (no #EXTM3U or #EXTINF markers)")]
    UnrecognizedFormat,

    #[error("No playable content found in playlist")]
    NoPlayableContent,
}

impl LoadError {
    /// Short label used for metrics
    pub fn reason(&self) -> &'static str {
        match self {
            LoadError::InvalidUrl(_) => "invalid_url",
            LoadError::MissingCredentials(_) => "missing_credentials",
            LoadError::Fetch(_) => "fetch",
            LoadError::Http { .. } => "http",
            LoadError::TooLarge { .. } => "too_large",
            LoadError::Io(_) => "io",
            LoadError::UnrecognizedFormat => "unrecognized_format",
            LoadError::NoPlayableContent => "no_playable_content",
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        LoadError::Fetch(err.to_string())
    }
}

/// Errors returned by playback commands
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The media element refused to start playback
    #[error("Playback rejected: {0}")]
    StartRejected(String),

    /// The session is in the error state; build a new controller to retry
    #[error("Playback unavailable: {0}")]
    Unavailable(String),

    /// The controller was torn down
    #[error("Playback session already closed")]
    Disposed,
}
