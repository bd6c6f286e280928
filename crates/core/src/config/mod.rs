//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PAGESIFT_*)
//! 2. TOML config file (if PAGESIFT_CONFIG_FILE set)
//! 3. Built-in defaults
//!
//! The loaded configuration is read-only for the lifetime of the process.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::model::FetchMode;

mod validation;

pub use validation::ConfigError;

/// Browser-like identity sent by the lightweight fetch tier.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PAGESIFT_*)
/// 2. TOML config file (if PAGESIFT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// User-Agent string for lightweight fetches.
    ///
    /// Set via PAGESIFT_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum response body size in bytes for lightweight fetches.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Lightweight fetch timeout in enrichment mode, in milliseconds.
    #[serde(default = "default_fetch_timeout_ms")]
    pub fetch_timeout_ms: u64,

    /// Lightweight fetch timeout in direct-fetch mode, in milliseconds.
    #[serde(default = "default_direct_fetch_timeout_ms")]
    pub direct_fetch_timeout_ms: u64,

    /// Whether the render tier (headless browser) should be started.
    ///
    /// Set via PAGESIFT_RENDER_ENABLED environment variable.
    #[serde(default = "default_true")]
    pub render_enabled: bool,

    /// Render timeout in milliseconds, covering navigation and capture.
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Delay after navigation before the DOM is captured, in milliseconds.
    #[serde(default = "default_render_settle_ms")]
    pub render_settle_ms: u64,

    /// Run the browser without a visible window.
    #[serde(default = "default_true")]
    pub headless: bool,

    /// Explicit Chrome/Chromium binary. Auto-detected when unset.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Extra command line arguments for the browser process.
    #[serde(default = "default_browser_args")]
    pub browser_args: Vec<String>,

    /// Blocks with fewer words than this are dropped from rendered output.
    #[serde(default = "default_word_count_threshold")]
    pub word_count_threshold: usize,

    /// Elements dropped from rendered output along with their subtree.
    #[serde(default = "default_excluded_tags")]
    pub excluded_tags: Vec<String>,

    /// Maximum number of browser tabs open at the same time.
    #[serde(default = "default_max_render_sessions")]
    pub max_render_sessions: usize,

    /// Content size budget (chars) for enriched search results.
    #[serde(default = "default_enrich_budget")]
    pub enrich_budget: usize,

    /// Content size budget (chars) for direct fetches.
    #[serde(default = "default_direct_budget")]
    pub direct_budget: usize,

    /// Number of leading search results that get enriched.
    #[serde(default = "default_enrich_limit")]
    pub enrich_limit: usize,

    /// Default number of search results requested from the provider.
    #[serde(default = "default_search_max_results")]
    pub search_max_results: usize,

    /// Search provider timeout in milliseconds.
    #[serde(default = "default_search_timeout_ms")]
    pub search_timeout_ms: u64,
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_fetch_timeout_ms() -> u64 {
    5_000
}

fn default_direct_fetch_timeout_ms() -> u64 {
    15_000
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_render_settle_ms() -> u64 {
    1_000
}

fn default_browser_args() -> Vec<String> {
    vec!["--no-sandbox".into(), "--disable-dev-shm-usage".into()]
}

fn default_word_count_threshold() -> usize {
    10
}

fn default_excluded_tags() -> Vec<String> {
    ["nav", "footer", "header", "aside"].iter().map(|t| t.to_string()).collect()
}

fn default_max_render_sessions() -> usize {
    2
}

fn default_enrich_budget() -> usize {
    5_000
}

fn default_direct_budget() -> usize {
    20_000
}

fn default_enrich_limit() -> usize {
    2
}

fn default_search_max_results() -> usize {
    5
}

fn default_search_timeout_ms() -> u64 {
    10_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            fetch_timeout_ms: default_fetch_timeout_ms(),
            direct_fetch_timeout_ms: default_direct_fetch_timeout_ms(),
            render_enabled: true,
            render_timeout_ms: default_render_timeout_ms(),
            render_settle_ms: default_render_settle_ms(),
            headless: true,
            chrome_executable: None,
            browser_args: default_browser_args(),
            word_count_threshold: default_word_count_threshold(),
            excluded_tags: default_excluded_tags(),
            max_render_sessions: default_max_render_sessions(),
            enrich_budget: default_enrich_budget(),
            direct_budget: default_direct_budget(),
            enrich_limit: default_enrich_limit(),
            search_max_results: default_search_max_results(),
            search_timeout_ms: default_search_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Lightweight fetch timeout for the given mode.
    pub fn fetch_timeout(&self, mode: FetchMode) -> Duration {
        match mode {
            FetchMode::Enrichment => Duration::from_millis(self.fetch_timeout_ms),
            FetchMode::DirectFetch => Duration::from_millis(self.direct_fetch_timeout_ms),
        }
    }

    /// Render timeout as Duration.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    /// Search provider timeout as Duration.
    pub fn search_timeout(&self) -> Duration {
        Duration::from_millis(self.search_timeout_ms)
    }

    /// Content size budget for the given mode.
    pub fn budget(&self, mode: FetchMode) -> usize {
        match mode {
            FetchMode::Enrichment => self.enrich_budget,
            FetchMode::DirectFetch => self.direct_budget,
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `PAGESIFT_`
    /// 2. TOML file from `PAGESIFT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PAGESIFT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PAGESIFT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
