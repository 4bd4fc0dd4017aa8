//! Configuration module

use std::env;
use std::net::SocketAddr;

use flowguard_core::ArtifactPaths;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Environment (development, production)
    pub environment: String,

    /// Upper bound on records per batch request
    pub max_batch: usize,

    /// Artifact locations
    pub artifacts: ArtifactPaths,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let artifact_dir = lookup(flowguard_core::constants::ENV_ARTIFACT_DIR)
            .unwrap_or_else(|| flowguard_core::constants::DEFAULT_ARTIFACT_DIR.to_string());

        Self {
            host: lookup("HOST")
                .unwrap_or_else(|| "0.0.0.0".to_string()),

            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8000),

            environment: lookup("ENVIRONMENT")
                .unwrap_or_else(|| "development".to_string()),

            max_batch: lookup("MAX_BATCH_RECORDS")
                .and_then(|n| n.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(crate::handlers::predict::MAX_BATCH_RECORDS),

            artifacts: ArtifactPaths::in_dir(artifact_dir).with_overrides(&lookup),
        }
    }

    /// Socket address to bind
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port).parse()?;
        Ok(addr)
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
