//! Internal domain types for the external lyrics and sentiment providers.
//!
//! These types are OUR types - they don't change when external APIs change.
//! All provider responses get converted into these types via adapters.

/// Transport-level fault from any external provider call.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderFault {
    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("Unauthorized - check the API token")]
    Unauthorized,

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

impl ProviderFault {
    /// Map a non-success HTTP status to a fault.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimited,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::Unauthorized
            }
            _ => Self::Http {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            },
        }
    }
}

impl From<reqwest::Error> for ProviderFault {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Errors from the lyrics fetcher.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LyricsError {
    #[error("Lyrics not found for '{title}' by '{artist}'")]
    NotFound { title: String, artist: String },

    #[error("Failed to fetch lyrics for '{title}' by '{artist}': {cause}")]
    Provider {
        title: String,
        artist: String,
        #[source]
        cause: ProviderFault,
    },
}

impl LyricsError {
    pub fn not_found(title: &str, artist: &str) -> Self {
        Self::NotFound {
            title: title.to_string(),
            artist: artist.to_string(),
        }
    }

    pub fn provider(title: &str, artist: &str, cause: ProviderFault) -> Self {
        Self::Provider {
            title: title.to_string(),
            artist: artist.to_string(),
            cause,
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// A definite "no such song" answer is permanent; transport faults are not.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::NotFound { .. })
    }
}

/// Errors from the sentiment provider.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SentimentError {
    #[error("Sentiment inference failed: {0}")]
    Provider(#[from] ProviderFault),

    #[error("Sentiment provider returned no candidates")]
    EmptyResult,
}
