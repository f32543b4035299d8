//! CLI configuration

use anyhow::Result;
use serde::Deserialize;

/// CLI configuration, loaded from `VRA_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    /// Capability service base URL
    #[serde(default = "default_capability_endpoint")]
    pub capability_endpoint: String,

    /// Pricing service base URL
    #[serde(default = "default_pricing_endpoint")]
    pub pricing_endpoint: String,

    /// Worker pool size for parallel batch runs
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Per-record processing budget in seconds
    #[serde(default = "default_timeout_secs")]
    pub per_job_timeout_secs: u64,

    /// Maximum alternatives attached to a record
    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: usize,
}

fn default_capability_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_pricing_endpoint() -> String {
    "http://localhost:8081".to_string()
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_alternatives() -> usize {
    5
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            capability_endpoint: default_capability_endpoint(),
            pricing_endpoint: default_pricing_endpoint(),
            concurrency: default_concurrency(),
            per_job_timeout_secs: default_timeout_secs(),
            max_alternatives: default_max_alternatives(),
        }
    }
}

impl CliConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("VRA"))
            .build()?;

        Ok(config.try_deserialize().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.per_job_timeout_secs, 60);
        assert_eq!(config.max_alternatives, 5);
        assert!(config.capability_endpoint.starts_with("http://"));
    }
}
