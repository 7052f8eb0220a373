/// Application configuration, loaded from environment variables.
///
/// Fetcher timing fields are all plain integers so adapters (and tests) can
/// build throttled or zero-delay fetchers from the same struct.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub log_level: String,
    /// Trailing window, in hours, an article's publication time must fall
    /// within to be kept.
    pub recency_window_hours: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub fetch_connect_timeout_secs: u64,
    pub fetch_read_timeout_secs: u64,
    /// Total attempts per fetch, including the first.
    pub fetch_max_attempts: u32,
    /// Base for the exponential backoff classes: `base << attempt` seconds.
    pub fetch_backoff_base_secs: u64,
    /// Randomized sleep before every request, uniform in this range.
    pub fetch_jitter_min_ms: u64,
    pub fetch_jitter_max_ms: u64,
    /// Fixed wait after a bot-challenge page before retrying.
    pub fetch_challenge_delay_secs: u64,
    /// Randomized pause between successive detail-page fetches.
    pub detail_pacing_min_ms: u64,
    pub detail_pacing_max_ms: u64,
    pub user_agent: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("recency_window_hours", &self.recency_window_hours)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field(
                "fetch_connect_timeout_secs",
                &self.fetch_connect_timeout_secs,
            )
            .field("fetch_read_timeout_secs", &self.fetch_read_timeout_secs)
            .field("fetch_max_attempts", &self.fetch_max_attempts)
            .field("fetch_backoff_base_secs", &self.fetch_backoff_base_secs)
            .field("fetch_jitter_min_ms", &self.fetch_jitter_min_ms)
            .field("fetch_jitter_max_ms", &self.fetch_jitter_max_ms)
            .field(
                "fetch_challenge_delay_secs",
                &self.fetch_challenge_delay_secs,
            )
            .field("detail_pacing_min_ms", &self.detail_pacing_min_ms)
            .field("detail_pacing_max_ms", &self.detail_pacing_max_ms)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
