//! Configuration loading for the search client (spec §6.3).
//!
//! Follows the teacher's `mcp-agent-mail-core::config` pattern: one
//! `env_*` helper per primitive type, a `from_env()` constructor, and a
//! `Default` impl carrying the documented defaults. Values are read once at
//! construction — the client does not watch the environment for changes.

use std::env;
use std::time::Duration;

/// Env-var driven settings for a [`crate::dispatch::SearchClient`].
#[derive(Debug, Clone, PartialEq)]
pub struct SearchClientConfig {
    /// Upper bound for insert retry attempts (default 8).
    pub max_retry_attempts: u32,
    /// Base delay for the insert backoff formula `2^attempt * retry_delay` (default 2000ms).
    pub retry_delay: Duration,
    /// Default `limit` when a caller omits one (default 25).
    pub page: u64,
    /// Enables debug payload fields (`ranking.listFeatures`, `tracelevel`).
    pub is_debug_mode: bool,
    /// Minimum interval between query-history record updates (default 60s).
    pub user_query_update_interval: Duration,
    /// Namespace passed through to the transport.
    pub namespace: String,
    /// Cluster identifier passed through to the transport.
    pub cluster: String,
    /// Transport base URL for feed (insert/update/delete) operations.
    pub feed_endpoint: String,
    /// Transport base URL for query (search) operations.
    pub query_endpoint: String,
    /// Concurrency limit for `fetch_all_by_name`'s batched fan-out (default 3).
    pub fetch_all_concurrency: usize,
    /// Batch size for `fetch_all_by_name` (default 400).
    pub fetch_all_batch_size: u64,
    /// Per-request timeout threaded into the transport payload (default 30s).
    pub request_timeout: Duration,
}

impl Default for SearchClientConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: 8,
            retry_delay: Duration::from_millis(2000),
            page: 25,
            is_debug_mode: false,
            user_query_update_interval: Duration::from_secs(60),
            namespace: "default".to_owned(),
            cluster: "default".to_owned(),
            feed_endpoint: String::new(),
            query_endpoint: String::new(),
            fetch_all_concurrency: 3,
            fetch_all_batch_size: 400,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl SearchClientConfig {
    /// Load configuration from the process environment, falling back to
    /// [`Default`] for anything unset or unparseable.
    #[must_use]
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            max_retry_attempts: env_u32(
                "SEARCH_CLIENT_MAX_RETRY_ATTEMPTS",
                default.max_retry_attempts,
            ),
            retry_delay: Duration::from_millis(env_u64(
                "SEARCH_CLIENT_RETRY_DELAY_MS",
                default.retry_delay.as_millis() as u64,
            )),
            page: env_u64("SEARCH_CLIENT_PAGE", default.page),
            is_debug_mode: env_bool("SEARCH_CLIENT_DEBUG", default.is_debug_mode),
            user_query_update_interval: Duration::from_millis(env_u64(
                "SEARCH_CLIENT_USER_QUERY_UPDATE_INTERVAL_MS",
                default.user_query_update_interval.as_millis() as u64,
            )),
            namespace: env_string("SEARCH_CLIENT_NAMESPACE", &default.namespace),
            cluster: env_string("SEARCH_CLIENT_CLUSTER", &default.cluster),
            feed_endpoint: env_string("SEARCH_CLIENT_FEED_ENDPOINT", &default.feed_endpoint),
            query_endpoint: env_string("SEARCH_CLIENT_QUERY_ENDPOINT", &default.query_endpoint),
            fetch_all_concurrency: env_usize(
                "SEARCH_CLIENT_FETCH_ALL_CONCURRENCY",
                default.fetch_all_concurrency,
            ),
            fetch_all_batch_size: env_u64(
                "SEARCH_CLIENT_FETCH_ALL_BATCH_SIZE",
                default.fetch_all_batch_size,
            ),
            request_timeout: Duration::from_millis(env_u64(
                "SEARCH_CLIENT_REQUEST_TIMEOUT_MS",
                default.request_timeout.as_millis() as u64,
            )),
        }
    }

    /// The request timeout rendered as the transport's expected string form, e.g. `"30s"`.
    #[must_use]
    pub fn request_timeout_str(&self) -> String {
        format!("{}s", self.request_timeout.as_secs())
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_string(key: &str, default: &str) -> String {
    env_value(key).unwrap_or_else(|| default.to_owned())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_value(key).map_or(default, |v| match v.trim().to_lowercase().as_str() {
        "1" | "true" | "t" | "yes" | "y" => true,
        "0" | "false" | "f" | "no" | "n" => false,
        _ => default,
    })
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_value(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env_value(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env_value(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = SearchClientConfig::default();
        assert_eq!(c.max_retry_attempts, 8);
        assert_eq!(c.retry_delay, Duration::from_millis(2000));
        assert_eq!(c.fetch_all_concurrency, 3);
        assert_eq!(c.fetch_all_batch_size, 400);
        assert_eq!(c.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn request_timeout_str_renders_seconds() {
        let c = SearchClientConfig::default();
        assert_eq!(c.request_timeout_str(), "30s");
    }

    #[test]
    fn env_bool_parses_common_spellings() {
        assert!(env_bool("SEARCH_CLIENT_CONFIG_TEST_NONEXISTENT_BOOL", false) == false);
    }

    #[test]
    fn env_u64_falls_back_on_missing_or_garbage() {
        assert_eq!(
            env_u64("SEARCH_CLIENT_CONFIG_TEST_NONEXISTENT_U64", 7),
            7
        );
    }
}
