//! Cluster endpoint configuration.
//!
//! Endpoints and credentials come from the environment (the same variables
//! the surrounding deployment tooling already exports): `SOURCE_ES_CLUSTER`,
//! `TARGET_ES_CLUSTER` plus optional `*_ES_USERNAME` / `*_ES_PASSWORD`.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusterConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ClusterConfig {
    pub fn from_env(prefix: &str) -> Result<Self> {
        let url = std::env::var(format!("{prefix}_ES_CLUSTER"))
            .map_err(|_| anyhow!("{prefix}_ES_CLUSTER environment variable is not set"))?;
        Url::parse(&url).map_err(|e| anyhow!("{prefix}_ES_CLUSTER is not a valid URL: {e}"))?;

        Ok(Self {
            url,
            username: std::env::var(format!("{prefix}_ES_USERNAME")).ok(),
            password: std::env::var(format!("{prefix}_ES_PASSWORD")).ok(),
        })
    }

    /// Basic-auth pair, present only when both halves are set.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.username, &self.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => {
                Some((u.clone(), p.clone()))
            }
            _ => None,
        }
    }
}

/// Source and target endpoints for one migration run.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source: ClusterConfig,
    pub target: ClusterConfig,
}

impl MigrationConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            source: ClusterConfig::from_env("SOURCE")?,
            target: ClusterConfig::from_env("TARGET")?,
        })
    }
}
