/// Book state definitions for tracking one detail page through the crawl
///
/// This module defines the states a book URL moves through and the reasons a
/// book can be skipped without stopping the run.
use std::fmt;

/// Represents the current state of a book URL in the crawl pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookState {
    // ===== Active States =====
    /// Detail page request is in flight
    Fetching,

    /// Detail page response is being checked for the sentinel redirect and status
    Validating,

    /// Metadata is being read from the detail page
    Extracting,

    /// Book text is being downloaded
    DownloadingText,

    /// Cover image is being downloaded
    DownloadingCover,

    /// Record is being appended to the collection
    Recording,

    // ===== Terminal Success States =====
    /// Record was added to the collection
    Recorded,

    // ===== Terminal Skip States =====
    /// The site redirected the detail page away (book id does not exist)
    SkippedRedirected,

    /// Detail page or text export answered with a non-success status
    SkippedHttpError,

    /// URL does not follow the detail-page convention
    SkippedInvalidUrl,
}

impl BookState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        self.is_success() || self.is_skipped()
    }

    /// Returns true if this is an active state (book is still being processed)
    pub fn is_active(&self) -> bool {
        !self.is_terminal()
    }

    /// Returns true if the book made it into the collection
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Recorded)
    }

    /// Returns true if the book was dropped without stopping the run
    pub fn is_skipped(&self) -> bool {
        matches!(
            self,
            Self::SkippedRedirected | Self::SkippedHttpError | Self::SkippedInvalidUrl
        )
    }

    /// Checks whether moving to `next` follows the pipeline order
    ///
    /// Asset downloads are optional, so the pipeline may jump over either of
    /// them. Skips are reachable from every active state up to the text download.
    pub fn can_transition_to(&self, next: BookState) -> bool {
        use BookState::*;

        match (self, next) {
            (Fetching, Validating) => true,
            (Fetching, SkippedInvalidUrl) => true,
            (Validating, Extracting) => true,
            (Validating, SkippedRedirected | SkippedHttpError) => true,
            (Extracting, DownloadingText | DownloadingCover | Recording) => true,
            (DownloadingText, DownloadingCover | Recording) => true,
            (DownloadingText, SkippedHttpError) => true,
            (DownloadingCover, Recording) => true,
            (Recording, Recorded) => true,
            _ => false,
        }
    }

    /// Returns the snake_case name used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fetching => "fetching",
            Self::Validating => "validating",
            Self::Extracting => "extracting",
            Self::DownloadingText => "downloading_text",
            Self::DownloadingCover => "downloading_cover",
            Self::Recording => "recording",
            Self::Recorded => "recorded",
            Self::SkippedRedirected => "skipped_redirected",
            Self::SkippedHttpError => "skipped_http_error",
            Self::SkippedInvalidUrl => "skipped_invalid_url",
        }
    }

    /// Returns all possible book states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Fetching,
            Self::Validating,
            Self::Extracting,
            Self::DownloadingText,
            Self::DownloadingCover,
            Self::Recording,
            Self::Recorded,
            Self::SkippedRedirected,
            Self::SkippedHttpError,
            Self::SkippedInvalidUrl,
        ]
    }
}

impl fmt::Display for BookState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a book was left out of the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// The site answered with a redirect instead of the page
    Redirected,

    /// Non-success status without a redirect
    HttpError { status: u16 },

    /// URL is not a `/b<id>/` detail page
    InvalidUrl,
}

impl SkipReason {
    /// The terminal state a book ends in when skipped for this reason
    pub fn state(&self) -> BookState {
        match self {
            Self::Redirected => BookState::SkippedRedirected,
            Self::HttpError { .. } => BookState::SkippedHttpError,
            Self::InvalidUrl => BookState::SkippedInvalidUrl,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Redirected => write!(f, "book not found (redirected)"),
            Self::HttpError { status } => write!(f, "HTTP {}", status),
            Self::InvalidUrl => write!(f, "not a book detail URL"),
        }
    }
}
