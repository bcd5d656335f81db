//! # Advisor Configuration
//!
//! Environment variable-based configuration for the advisor client. Every value
//! has a default, so an empty environment reproduces the stock behavior: POST to
//! the local advisor, no client-side timeout, newest submission wins.
//!
//! ## Environment Variables
//!
//! ### `FARMWISE_ENDPOINT`
//!
//! Advisor URL. Default: `http://127.0.0.1:5000/api/advisor`
//!
//! ### `FARMWISE_TIMEOUT_MS`
//!
//! Request timeout in milliseconds. Unset, empty or `0` means no timeout is set
//! on the client.
//!
//! ### `FARMWISE_RESPONSE_POLICY`
//!
//! How overlapping submissions are resolved:
//! - `latest-submission` (default): responses to superseded submissions are dropped
//! - `last-resolved`: whichever response resolves last is rendered
//!
//! ## Usage
//!
//! ```rust
//! use farmwise::config::AdvisorConfig;
//!
//! let config = AdvisorConfig::from_env();
//! println!("Posting to {}", config.endpoint);
//! ```

use std::env;
use std::time::Duration;

use crate::handler::ResponsePolicy;

/// Default advisor endpoint
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/api/advisor";

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Advisor URL receiving the POST
    pub endpoint: String,
    /// Request timeout in milliseconds; `None` leaves the client default
    pub timeout_ms: Option<u64>,
    /// Resolution of overlapping submissions
    pub response_policy: ResponsePolicy,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_ms: None,
            response_policy: ResponsePolicy::default(),
        }
    }
}

impl AdvisorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let endpoint = lookup("FARMWISE_ENDPOINT")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.endpoint);
        let timeout_ms = lookup("FARMWISE_TIMEOUT_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|ms| *ms > 0);
        let response_policy = lookup("FARMWISE_RESPONSE_POLICY")
            .map(|v| ResponsePolicy::parse(&v))
            .unwrap_or(defaults.response_policy);
        Self {
            endpoint,
            timeout_ms,
            response_policy,
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::from_lookup(lookup(&[]));
        assert_eq!(config, AdvisorConfig::default());
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout(), None);
        assert_eq!(config.response_policy, ResponsePolicy::LatestSubmissionWins);
    }

    #[test]
    fn test_overrides() {
        let config = AdvisorConfig::from_lookup(lookup(&[
            ("FARMWISE_ENDPOINT", "http://advisor.internal/api/advisor"),
            ("FARMWISE_TIMEOUT_MS", "2500"),
            ("FARMWISE_RESPONSE_POLICY", "last-resolved"),
        ]));
        assert_eq!(config.endpoint, "http://advisor.internal/api/advisor");
        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.response_policy, ResponsePolicy::LastResolvedWins);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = AdvisorConfig::from_lookup(lookup(&[
            ("FARMWISE_ENDPOINT", "  "),
            ("FARMWISE_TIMEOUT_MS", "soon"),
        ]));
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.timeout_ms, None);

        let zero = AdvisorConfig::from_lookup(lookup(&[("FARMWISE_TIMEOUT_MS", "0")]));
        assert_eq!(zero.timeout_ms, None);
    }
}
