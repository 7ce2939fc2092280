use thiserror::Error;

/// Fatal outcome of a chapter extraction. Nothing is written when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("Timed out waiting for {url}")]
    NavigationTimeout { url: String },

    /// Anti-automation challenge. The whole run should stop, not just this chapter.
    #[error("Blocked by a CAPTCHA challenge at {url}")]
    BlockedContent { url: String },

    #[error("Could not switch to the Ge'ez rendering: {0}")]
    LanguageSwitchFailed(String),

    #[error("Verse count mismatch: English={english}, Ge'ez={geez}")]
    VerseCountMismatch { english: usize, geez: usize },

    #[error("Page session used out of order: {0}")]
    InvalidState(String),

    #[error("Page error: {0}")]
    Page(String),
}

impl ExtractionFailure {
    /// Stable code for log records.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::NavigationTimeout { .. } => "navigation_timeout",
            Self::BlockedContent { .. } => "blocked_content",
            Self::LanguageSwitchFailed(_) => "language_switch_failed",
            Self::VerseCountMismatch { .. } => "verse_count_mismatch",
            Self::InvalidState(_) => "invalid_state",
            Self::Page(_) => "page_error",
        }
    }

    /// Whether the caller should abandon the remaining chapters of the run.
    pub fn halts_run(&self) -> bool {
        matches!(self, Self::BlockedContent { .. })
    }
}
