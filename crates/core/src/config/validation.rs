//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - a timeout is below 100ms or above 5 minutes
    /// - `user_agent` is empty
    /// - a size budget, `enrich_limit` or `max_render_sessions` is 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        for (field, value) in [
            ("fetch_timeout_ms", self.fetch_timeout_ms),
            ("direct_fetch_timeout_ms", self.direct_fetch_timeout_ms),
            ("render_timeout_ms", self.render_timeout_ms),
            ("search_timeout_ms", self.search_timeout_ms),
        ] {
            if value < 100 {
                return Err(invalid(field, "must be at least 100ms"));
            }
            if value > 300_000 {
                return Err(invalid(field, "must not exceed 5 minutes (300000ms)"));
            }
        }

        if self.render_settle_ms >= self.render_timeout_ms {
            return Err(invalid("render_settle_ms", "must be shorter than render_timeout_ms"));
        }

        if self.user_agent.trim().is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }

        if self.enrich_budget == 0 {
            return Err(invalid("enrich_budget", "must be greater than 0"));
        }
        if self.direct_budget == 0 {
            return Err(invalid("direct_budget", "must be greater than 0"));
        }
        if self.enrich_limit == 0 {
            return Err(invalid("enrich_limit", "must be greater than 0"));
        }
        if self.max_render_sessions == 0 {
            return Err(invalid("max_render_sessions", "must be greater than 0"));
        }

        for (field, value) in self.fetch_timeouts_not_below_render() {
            tracing::warn!(
                field,
                timeout_ms = value,
                render_timeout_ms = self.render_timeout_ms,
                "lightweight fetch timeout is not shorter than the render timeout"
            );
        }

        Ok(())
    }

    /// Lightweight fetch timeouts, per mode, that are not shorter than the
    /// render timeout.
    pub(crate) fn fetch_timeouts_not_below_render(&self) -> Vec<(&'static str, u64)> {
        [("fetch_timeout_ms", self.fetch_timeout_ms), ("direct_fetch_timeout_ms", self.direct_fetch_timeout_ms)]
            .into_iter()
            .filter(|(_, value)| *value >= self.render_timeout_ms)
            .collect()
    }
}
