use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

/// Terminal fetch failures, classified so the retry policy can pick a
/// class-specific backoff. A value of this type reaching a caller means the
/// attempt ceiling was exhausted (or the class is not retryable at all).
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("TLS failure fetching {url}: {message}")]
    Tls { url: String, message: String },

    #[error("timed out fetching {url}")]
    Timeout { url: String },

    #[error("connection failure fetching {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("bot challenge detected at {url}")]
    Challenge { url: String },

    #[error("transport failure fetching {url}: {message}")]
    Transport { url: String, message: String },

    #[error("fetcher configuration error: {0}")]
    Config(String),
}

/// Per-article extraction rejections. Missing dates are not errors — they
/// are defaulted — so only the two fatal conditions appear here.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no usable title found at {url}")]
    MissingTitle { url: String },

    #[error("extracted body too short ({len} chars) at {url}")]
    BodyTooShort { url: String, len: usize },
}
