//! Typed configuration for the audit engine, loaded from environment variables
//! with documented defaults matching the engine's own contract. Library crates
//! (fetch, robots, crawler) consume `AuditConfig` values; only the binary entry
//! point is expected to call [`AuditConfig::from_env`].

mod env;

pub use env::{EnvConfigLoader, EnvError};
use seo_types::AuditError;
use std::time::Duration;

/// Prefix for every environment variable this crate reads.
pub const ENV_PREFIX: &str = "SEO_AUDIT_";

#[derive(Debug, Clone)]
pub struct AuditConfig {
    /// Max concurrent in-flight fetches across the whole crawl.
    pub max_concurrent_fetches: usize,
    /// Per-host requests per second.
    pub per_host_rps: f64,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Response body cap in bytes; oversize bodies are truncated, not rejected.
    pub max_body_bytes: u64,
    pub default_max_pages: u32,
    /// Global crawl deadline; `None` means unbounded, matching the core's default.
    pub global_deadline: Option<Duration>,
    pub respect_robots_default: bool,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 10,
            per_host_rps: 2.0,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            user_agent: "SeoAuditBot/1.0 (+https://example.invalid/bot)".to_string(),
            max_body_bytes: 10 * 1024 * 1024,
            default_max_pages: 9_999,
            global_deadline: None,
            respect_robots_default: false,
        }
    }
}

impl AuditConfig {
    /// Load configuration from `SEO_AUDIT_*` environment variables, falling back
    /// to [`AuditConfig::default`] for anything unset. A malformed value (set but
    /// not parseable) is a deployment bug, not a request error, so it surfaces as
    /// `AuditError::Internal` rather than a validation error.
    pub fn from_env() -> Result<Self, AuditError> {
        let defaults = Self::default();
        let loader = EnvConfigLoader::with_prefix(ENV_PREFIX)
            .default("max_concurrent_fetches", defaults.max_concurrent_fetches.to_string())
            .default("per_host_rps", defaults.per_host_rps.to_string())
            .default("connect_timeout_secs", defaults.connect_timeout.as_secs().to_string())
            .default("request_timeout_secs", defaults.request_timeout.as_secs().to_string())
            .default("user_agent", defaults.user_agent.clone())
            .default("max_body_bytes", defaults.max_body_bytes.to_string())
            .default("default_max_pages", defaults.default_max_pages.to_string())
            .default(
                "global_deadline_secs",
                defaults.global_deadline.map(|d| d.as_secs()).unwrap_or(0).to_string(),
            );

        let map_err = |e: EnvError| AuditError::internal(e.to_string());

        let global_deadline_secs = loader.get_u64("global_deadline_secs").map_err(map_err)?;

        Ok(Self {
            max_concurrent_fetches: loader.get_u32("max_concurrent_fetches").map_err(map_err)? as usize,
            per_host_rps: loader.get_f64("per_host_rps").map_err(map_err)?,
            connect_timeout: Duration::from_secs(loader.get_u64("connect_timeout_secs").map_err(map_err)?),
            request_timeout: Duration::from_secs(loader.get_u64("request_timeout_secs").map_err(map_err)?),
            user_agent: loader.get_string("user_agent"),
            max_body_bytes: loader.get_u64("max_body_bytes").map_err(map_err)?,
            default_max_pages: loader.get_u32("default_max_pages").map_err(map_err)?,
            global_deadline: (global_deadline_secs > 0).then(|| Duration::from_secs(global_deadline_secs)),
            respect_robots_default: defaults.respect_robots_default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_contract() {
        let config = AuditConfig::default();
        assert_eq!(config.max_concurrent_fetches, 10);
        assert_eq!(config.per_host_rps, 2.0);
        assert_eq!(config.default_max_pages, 9_999);
        assert!(!config.respect_robots_default);
    }

    #[test]
    fn global_deadline_env_var_zero_means_unbounded() {
        std::env::remove_var("SEO_AUDIT_GLOBAL_DEADLINE_SECS");
        let config = AuditConfig::from_env().expect("defaults are always valid");
        assert_eq!(config.global_deadline, None);
    }

    #[test]
    fn global_deadline_env_var_sets_a_bounded_deadline() {
        std::env::set_var("SEO_AUDIT_GLOBAL_DEADLINE_SECS", "120");
        let config = AuditConfig::from_env().expect("valid value parses");
        assert_eq!(config.global_deadline, Some(Duration::from_secs(120)));
        std::env::remove_var("SEO_AUDIT_GLOBAL_DEADLINE_SECS");
    }

    #[test]
    fn from_env_falls_back_to_defaults_when_unset() {
        let config = AuditConfig::from_env().expect("defaults are always valid");
        assert_eq!(config.max_concurrent_fetches, AuditConfig::default().max_concurrent_fetches);
    }
}
