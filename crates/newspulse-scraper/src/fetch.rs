//! Resilient page fetcher.
//!
//! Wraps a single `reqwest::Client` with a browser-like identity (headers and
//! a seeded cookie jar, consistent across calls within one run), randomized
//! pre-request throttling, bot-challenge detection, and class-specific retry
//! backoff. Non-retryable HTTP statuses fail immediately; everything
//! transient is retried up to the attempt ceiling and then surfaced as a
//! typed [`FetchError`] that callers treat as "no content".

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Url};

use newspulse_core::AppConfig;

use crate::error::FetchError;

/// Everything a [`PageFetcher`] needs, with delays as plain fields so tests
/// can run against a mock server without sleeping.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Total attempts per fetch, including the first.
    pub max_attempts: u32,
    /// Randomized sleep before every attempt, uniform in `[min, max]` ms.
    /// `(0, 0)` disables the throttle.
    pub jitter_ms: (u64, u64),
    /// Base for the exponential backoff classes: `base << attempt`.
    pub backoff_base: Duration,
    /// Fixed wait after a challenge page before retrying.
    pub challenge_delay: Duration,
    /// Fixed wait after a read/connect timeout.
    pub timeout_delay: Duration,
    /// Fixed wait after a connection-level failure.
    pub connect_delay: Duration,
    /// Fixed wait after an unclassified transport failure.
    pub misc_delay: Duration,
    pub user_agent: String,
    /// Additional default headers sent with every request.
    pub headers: Vec<(String, String)>,
    /// Cookies seeded into the jar before the first request.
    pub cookies: Vec<(String, String)>,
    /// Origin URL the seed cookies are scoped to. Required when `cookies`
    /// is non-empty.
    pub cookie_origin: Option<String>,
    /// Case-insensitive substrings marking an anti-bot interstitial.
    pub challenge_markers: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            read_timeout: Duration::from_secs(30),
            max_attempts: 3,
            jitter_ms: (500, 1500),
            backoff_base: Duration::from_secs(1),
            challenge_delay: Duration::from_secs(5),
            timeout_delay: Duration::from_secs(3),
            connect_delay: Duration::from_secs(5),
            misc_delay: Duration::from_secs(2),
            user_agent: "newspulse/0.1".to_owned(),
            headers: Vec::new(),
            cookies: Vec::new(),
            cookie_origin: None,
            challenge_markers: vec![
                "captcha".to_owned(),
                "робот".to_owned(),
                "bot".to_owned(),
                "доступ ограничен".to_owned(),
            ],
        }
    }
}

impl FetcherConfig {
    /// Carry the tunables from the application config; identity headers,
    /// cookies, and challenge markers stay at their defaults for the
    /// adapter to fill in.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.fetch_connect_timeout_secs),
            read_timeout: Duration::from_secs(config.fetch_read_timeout_secs),
            max_attempts: config.fetch_max_attempts,
            jitter_ms: (config.fetch_jitter_min_ms, config.fetch_jitter_max_ms),
            backoff_base: Duration::from_secs(config.fetch_backoff_base_secs),
            challenge_delay: Duration::from_secs(config.fetch_challenge_delay_secs),
            user_agent: config.user_agent.clone(),
            ..Self::default()
        }
    }
}

/// HTTP page fetcher with retry-on-transient-failure.
///
/// One client (connection pool + cookie jar) per fetcher; adapters own
/// their fetcher exclusively, so no locking is involved.
pub struct PageFetcher {
    client: Client,
    config: FetcherConfig,
    /// Lowercased copies of `config.challenge_markers`.
    markers: Vec<String>,
}

impl PageFetcher {
    /// Build the underlying client: timeouts, default headers, seeded
    /// cookie jar.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Config`] if a header name/value is malformed,
    /// the cookie origin is missing or unparseable, or the client cannot
    /// be constructed.
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| FetchError::Config(format!("invalid header name {name:?}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| FetchError::Config(format!("invalid header value for {name}: {e}")))?;
            headers.insert(name, value);
        }

        let jar = Arc::new(Jar::default());
        if !config.cookies.is_empty() {
            let origin = config
                .cookie_origin
                .as_deref()
                .ok_or_else(|| FetchError::Config("seed cookies given without an origin".into()))?;
            let origin_url = Url::parse(origin)
                .map_err(|e| FetchError::Config(format!("invalid cookie origin {origin:?}: {e}")))?;
            for (name, value) in &config.cookies {
                jar.add_cookie_str(&format!("{name}={value}"), &origin_url);
            }
        }

        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.read_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .cookie_provider(jar)
            .build()
            .map_err(|e| FetchError::Config(format!("failed to build HTTP client: {e}")))?;

        let markers = config
            .challenge_markers
            .iter()
            .map(|m| m.to_lowercase())
            .collect();

        Ok(Self {
            client,
            config,
            markers,
        })
    }

    /// Fetch `url` and return the decoded body text.
    ///
    /// Retries transient failures (timeouts, connection/TLS errors, 429 and
    /// 5xx statuses, challenge pages) with a class-specific delay, consuming
    /// one attempt each. Other non-2xx statuses fail immediately.
    ///
    /// # Errors
    ///
    /// Returns the last [`FetchError`] once attempts are exhausted, or the
    /// first non-retryable one. Callers treat any error as "no content".
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let mut attempt: u32 = 0;
        loop {
            self.jitter().await;
            match self.attempt(url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    let Some(delay) = retry_delay(&self.config, &err, attempt) else {
                        tracing::debug!(url, error = %err, "fetch failed — not retryable");
                        return Err(err);
                    };
                    attempt += 1;
                    if attempt >= self.config.max_attempts {
                        tracing::warn!(
                            url,
                            attempts = attempt,
                            error = %err,
                            "fetch failed after exhausting attempts"
                        );
                        return Err(err);
                    }
                    tracing::warn!(
                        url,
                        attempt,
                        max_attempts = self.config.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "transient fetch error — retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// One request/response round trip.
    async fn attempt(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_owned(),
            });
        }

        // text() decodes with the response's detected charset, UTF-8 default.
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(&e, url))?;

        let lowered = body.to_lowercase();
        if self.markers.iter().any(|m| lowered.contains(m)) {
            return Err(FetchError::Challenge {
                url: url.to_owned(),
            });
        }

        Ok(body)
    }

    /// Randomized short sleep before each request to throttle request rate.
    async fn jitter(&self) {
        let (min, max) = self.config.jitter_ms;
        if max == 0 {
            return;
        }
        let ms = if min >= max {
            min
        } else {
            rand::rng().random_range(min..=max)
        };
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

/// The per-class retry schedule. `None` means not retryable.
fn retry_delay(config: &FetcherConfig, err: &FetchError, attempt: u32) -> Option<Duration> {
    match err {
        FetchError::Tls { .. } => Some(exponential(config.backoff_base, attempt)),
        FetchError::Timeout { .. } => Some(config.timeout_delay),
        FetchError::Connect { .. } => Some(config.connect_delay),
        FetchError::Status { status, .. } => {
            if *status == 429 || (500..=599).contains(status) {
                Some(exponential(config.backoff_base, attempt))
            } else {
                None
            }
        }
        FetchError::Challenge { .. } => Some(config.challenge_delay),
        FetchError::Transport { .. } => Some(config.misc_delay),
        FetchError::Config(_) => None,
    }
}

fn exponential(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(1u32 << attempt.min(10))
}

/// Map a transport-level `reqwest::Error` onto a retry class.
///
/// TLS failures usually surface as connect errors, so the error chain is
/// inspected for TLS wording before the connect check.
fn classify_transport_error(err: &reqwest::Error, url: &str) -> FetchError {
    if err.is_timeout() {
        return FetchError::Timeout {
            url: url.to_owned(),
        };
    }
    if mentions_tls(err) {
        return FetchError::Tls {
            url: url.to_owned(),
            message: err.to_string(),
        };
    }
    if err.is_connect() {
        return FetchError::Connect {
            url: url.to_owned(),
            message: err.to_string(),
        };
    }
    FetchError::Transport {
        url: url.to_owned(),
        message: err.to_string(),
    }
}

fn mentions_tls(err: &reqwest::Error) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = current {
        let message = e.to_string().to_ascii_lowercase();
        if message.contains("tls") || message.contains("certificate") || message.contains("ssl") {
            return true;
        }
        current = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> FetcherConfig {
        FetcherConfig {
            jitter_ms: (0, 0),
            backoff_base: Duration::ZERO,
            challenge_delay: Duration::ZERO,
            timeout_delay: Duration::ZERO,
            connect_delay: Duration::ZERO,
            misc_delay: Duration::ZERO,
            ..FetcherConfig::default()
        }
    }

    #[test]
    fn non_retryable_status_has_no_delay() {
        let config = FetcherConfig::default();
        let err = FetchError::Status {
            status: 404,
            url: "https://example.com/".to_owned(),
        };
        assert!(retry_delay(&config, &err, 0).is_none());
    }

    #[test]
    fn rate_limit_and_server_errors_are_retryable() {
        let config = FetcherConfig::default();
        for status in [429, 500, 503] {
            let err = FetchError::Status {
                status,
                url: "https://example.com/".to_owned(),
            };
            assert!(
                retry_delay(&config, &err, 0).is_some(),
                "status {status} should be retryable"
            );
        }
    }

    #[test]
    fn tls_backoff_doubles_per_attempt() {
        let config = FetcherConfig::default();
        let err = FetchError::Tls {
            url: "https://example.com/".to_owned(),
            message: "handshake".to_owned(),
        };
        assert_eq!(retry_delay(&config, &err, 0), Some(Duration::from_secs(1)));
        assert_eq!(retry_delay(&config, &err, 1), Some(Duration::from_secs(2)));
        assert_eq!(retry_delay(&config, &err, 2), Some(Duration::from_secs(4)));
    }

    #[test]
    fn fixed_class_delays_come_from_config() {
        let config = FetcherConfig::default();
        let timeout = FetchError::Timeout {
            url: "https://example.com/".to_owned(),
        };
        let connect = FetchError::Connect {
            url: "https://example.com/".to_owned(),
            message: "refused".to_owned(),
        };
        let challenge = FetchError::Challenge {
            url: "https://example.com/".to_owned(),
        };
        assert_eq!(retry_delay(&config, &timeout, 0), Some(config.timeout_delay));
        assert_eq!(retry_delay(&config, &connect, 0), Some(config.connect_delay));
        assert_eq!(
            retry_delay(&config, &challenge, 0),
            Some(config.challenge_delay)
        );
    }

    #[test]
    fn config_error_is_never_retried() {
        let config = FetcherConfig::default();
        let err = FetchError::Config("bad header".to_owned());
        assert!(retry_delay(&config, &err, 0).is_none());
    }

    #[test]
    fn seed_cookies_without_origin_are_rejected() {
        let config = FetcherConfig {
            cookies: vec![("acceptCookies".to_owned(), "true".to_owned())],
            cookie_origin: None,
            ..quiet_config()
        };
        let result = PageFetcher::new(config);
        assert!(matches!(result, Err(FetchError::Config(_))));
    }

    #[test]
    fn invalid_header_name_is_rejected() {
        let config = FetcherConfig {
            headers: vec![("bad header name".to_owned(), "x".to_owned())],
            ..quiet_config()
        };
        let result = PageFetcher::new(config);
        assert!(matches!(result, Err(FetchError::Config(_))));
    }
}
