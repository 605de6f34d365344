//! Error types and user-facing classification for the hearts client.
//!
//! Transport and HTTP failures are classified into one of four fixed
//! user-facing messages (one per operation plus a fallback), reported to a
//! shared [`ErrorSink`], and re-signaled to the caller. Domain rejections
//! (`success: false` bodies) are not errors and never reach the sink.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for hearts operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Non-success status from the hearts fetch endpoint
    #[error("Failed to fetch hearts (status {status})")]
    FetchHearts { status: u16, message: Option<String> },

    /// Non-success status from the lose endpoint
    #[error("Failed to lose heart (status {status})")]
    LoseHeart { status: u16, message: Option<String> },

    /// Non-success status from the reward endpoint
    #[error("Failed to reward heart (status {status})")]
    RewardHeart { status: u16, message: Option<String> },

    /// Non-success status from the consecutive-correct endpoint
    #[error("Failed to update consecutive correct (status {status})")]
    ConsecutiveCorrect { status: u16, message: Option<String> },

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Message the server attached to a failed response body, if any
    pub fn api_message(&self) -> Option<&str> {
        match self {
            Error::FetchHearts { message, .. }
            | Error::LoseHeart { message, .. }
            | Error::RewardHeart { message, .. }
            | Error::ConsecutiveCorrect { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// User-facing messages
// ============================================================================

/// Shown when the hearts status could not be loaded
pub const FETCH_HEARTS_MESSAGE: &str =
    "Could not load your hearts, please check your connection";
/// Shown when a heart loss could not be recorded
pub const LOSE_HEART_MESSAGE: &str = "Could not update your hearts, please try again later";
/// Shown when a reward could not be claimed
pub const REWARD_HEART_MESSAGE: &str = "Could not award your hearts, please try again later";
/// Shown for any other hearts-domain failure
pub const HEARTS_FALLBACK_MESSAGE: &str =
    "The hearts system ran into a problem, please try again later";
/// Last-resort message for the generic handler
pub const GENERIC_FALLBACK_MESSAGE: &str = "Something went wrong, please try again later";

/// Map a hearts-domain failure to its fixed user-facing message.
///
/// Finite dispatch over the error's message text, one message per
/// operation plus a fallback.
pub fn classify_hearts_error(error: &Error) -> &'static str {
    let text = error.to_string();

    if text.contains("Failed to fetch hearts") {
        FETCH_HEARTS_MESSAGE
    } else if text.contains("Failed to lose heart") {
        LOSE_HEART_MESSAGE
    } else if text.contains("Failed to reward heart") {
        REWARD_HEART_MESSAGE
    } else {
        HEARTS_FALLBACK_MESSAGE
    }
}

// ============================================================================
// Shared error display state
// ============================================================================

/// Most recent error message plus a visibility flag, for display by any
/// interested observer regardless of which operation failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorSink {
    message: String,
    visible: bool,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error for display.
    ///
    /// The displayed message falls through, in order: an explicit override,
    /// the message the server attached to the failed response, the error's
    /// own text, and finally [`GENERIC_FALLBACK_MESSAGE`].
    pub fn handle(&mut self, error: &Error, override_message: Option<&str>) {
        tracing::error!("hearts operation failed: {}", error);

        let message = override_message
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .or_else(|| {
                error
                    .api_message()
                    .filter(|m| !m.is_empty())
                    .map(str::to_owned)
            })
            .or_else(|| Some(error.to_string()).filter(|m| !m.is_empty()))
            .unwrap_or_else(|| GENERIC_FALLBACK_MESSAGE.to_owned());

        self.message = message;
        self.visible = true;
    }

    /// Record a hearts-domain error with its classified message
    pub fn handle_hearts(&mut self, error: &Error) {
        self.handle(error, Some(classify_hearts_error(error)));
    }

    /// Dismiss the current error
    pub fn clear(&mut self) {
        self.message.clear();
        self.visible = false;
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }
}
