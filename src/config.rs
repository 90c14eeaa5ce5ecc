//! Crawl configuration, loaded from defaults and overlaid with environment
//! variables, following the same load/override/validate pipeline as the
//! original application's `ConfigLoader`.

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use crate::error::{ConfigError, CrawlResult};

/// Runtime configuration for a single crawl.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    /// `"<type>/<key>"` identifiers to skip entirely (and their descendants).
    /// Projects additionally match on `"project/<projectNumber>"`.
    pub excluded_resources: HashSet<String>,
    /// Upper bound on concurrently dispatched subtrees.
    pub max_dispatch_concurrency: usize,
    /// Budget handed to the API client for individual calls; the core does
    /// not enforce this itself, it is advisory metadata passed through.
    pub connection_timeout: Duration,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            excluded_resources: HashSet::new(),
            max_dispatch_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            connection_timeout: Duration::from_secs(30),
        }
    }
}

impl CrawlConfig {
    pub fn is_excluded(&self, type_tag: &str, key: &str) -> bool {
        self.excluded_resources
            .contains(&format!("{type_tag}/{key}"))
    }
}

/// Loads a [`CrawlConfig`] from defaults, overlaid with `CRAWLER_*`
/// environment variables, then validates the result.
pub struct ConfigLoader {
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self {
            env_prefix: "CRAWLER".to_string(),
        }
    }

    pub fn env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn load(&self) -> CrawlResult<CrawlConfig> {
        let config = self.load_from_env(CrawlConfig::default())?;
        self.validate(&config)?;
        Ok(config)
    }

    pub fn load_from_env(&self, base: CrawlConfig) -> CrawlResult<CrawlConfig> {
        let mut config = base;

        let concurrency_key = format!("{}_MAX_DISPATCH_CONCURRENCY", self.env_prefix);
        if let Ok(value) = env::var(&concurrency_key) {
            config.max_dispatch_concurrency =
                value.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
                    field: "max_dispatch_concurrency",
                    value: value.clone(),
                    reason: "expected a positive integer",
                })?;
        }

        let timeout_key = format!("{}_CONNECTION_TIMEOUT_SECS", self.env_prefix);
        if let Ok(value) = env::var(&timeout_key) {
            let secs = value.parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                field: "connection_timeout",
                value: value.clone(),
                reason: "expected a positive integer number of seconds",
            })?;
            config.connection_timeout = Duration::from_secs(secs);
        }

        let excluded_key = format!("{}_EXCLUDED_RESOURCES", self.env_prefix);
        if let Ok(value) = env::var(&excluded_key) {
            config.excluded_resources = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        Ok(config)
    }

    pub fn validate(&self, config: &CrawlConfig) -> CrawlResult<()> {
        if config.max_dispatch_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_dispatch_concurrency",
                value: "0".to_string(),
                reason: "must be greater than 0",
            }
            .into());
        }

        if config.connection_timeout.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                field: "connection_timeout",
                value: "0".to_string(),
                reason: "must be greater than 0 seconds",
            }
            .into());
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
