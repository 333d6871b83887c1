//! Configuration Management
//!
//! Optional settings file for gcp-tree. JSON by default; `.yaml`/`.yml`
//! files are parsed as YAML. Command-line flags override every field.

use crate::gcp::auth;
use crate::resource::ResourceKind;
use crate::tree::RiskPolicy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Region used when neither flags, config nor gcloud name one
pub const DEFAULT_REGION: &str = "us-central1";

/// Per-collector time limit
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    /// Seconds before a kind's collector is abandoned
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Kinds to collect; all when absent or empty
    #[serde(default)]
    pub kinds: Option<Vec<ResourceKind>>,
    /// Overrides the built-in Cloud Functions runtime allow-list
    #[serde(default)]
    pub supported_runtimes: Option<Vec<String>>,
    /// Derive console links for resources
    #[serde(default = "default_console_links")]
    pub console_links: bool,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_console_links() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_id: None,
            region: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            kinds: None,
            supported_runtimes: None,
            console_links: true,
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("gcp-tree").join("config.json"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist and parse. Without one, the default
    /// file is used when present and unreadable content falls back to
    /// defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            return Self::parse(&content, path);
        }

        let Some(path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Self::parse(&content, &path))
        {
            Ok(config) => Ok(config),
            Err(e) => {
                tracing::warn!("Ignoring config file {}: {:#}", path.display(), e);
                Ok(Self::default())
            }
        }
    }

    /// Parse `content`, choosing the format from `path`'s extension
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let is_yaml = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

        let config = if is_yaml {
            serde_yaml::from_str(content)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        } else {
            serde_json::from_str(content)
                .with_context(|| format!("Invalid JSON in {}", path.display()))?
        };

        Ok(config)
    }

    /// Get effective project (CLI > config > gcloud default)
    pub fn effective_project(&self, cli: Option<&str>, profile: Option<&str>) -> Result<String> {
        let project = cli
            .map(str::to_string)
            .or_else(|| self.project_id.clone())
            .or_else(|| auth::get_default_project(profile));

        let Some(project) = project else {
            bail!("No GCP project configured. Use --project, the config file, or `gcloud config set project`");
        };

        if !auth::validate_project_id(&project) {
            bail!("Invalid project ID: {}", project);
        }

        Ok(project)
    }

    /// Get effective region (CLI > config > gcloud default > us-central1)
    pub fn effective_region(&self, cli: Option<&str>, profile: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| self.region.clone())
            .or_else(|| auth::get_default_region(profile))
            .unwrap_or_else(|| DEFAULT_REGION.to_string())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Kinds to collect, deduplicated in declaration order
    pub fn kinds(&self) -> Vec<ResourceKind> {
        match &self.kinds {
            Some(kinds) if !kinds.is_empty() => {
                let mut kinds = kinds.clone();
                kinds.sort();
                kinds.dedup();
                kinds
            }
            _ => ResourceKind::ALL.to_vec(),
        }
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        match &self.supported_runtimes {
            Some(runtimes) => RiskPolicy::new(runtimes.clone()),
            None => RiskPolicy::default(),
        }
    }
}
