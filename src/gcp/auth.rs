//! GCP Authentication
//!
//! Handles authentication using Application Default Credentials (ADC) or a
//! pre-issued access token, and reads defaults from gcloud configurations.

use anyhow::{Context, Result};
use gcp_auth::TokenProvider;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Default scopes for GCP API access
pub const DEFAULT_SCOPES: &[&str] = &["https://www.googleapis.com/auth/cloud-platform"];

/// Environment variable naming a file that holds a pre-issued access token
pub const ACCESS_TOKEN_FILE_ENV: &str = "CLOUDSDK_AUTH_ACCESS_TOKEN_FILE";

/// Token expiry buffer - refresh tokens this much before they actually expire
const TOKEN_EXPIRY_BUFFER: Duration = Duration::from_secs(60);

/// Default token TTL if we can't determine expiry (conservative: 30 minutes)
const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

#[derive(Clone)]
enum TokenSource {
    Adc(Arc<dyn TokenProvider>),
    Static(String),
}

/// GCP credentials holder with token caching
#[derive(Clone)]
pub struct GcpCredentials {
    source: TokenSource,
    token_cache: Arc<RwLock<Option<CachedToken>>>,
}

#[derive(Clone)]
struct CachedToken {
    token: String,
    /// When this token expires (with buffer applied)
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

impl GcpCredentials {
    /// Create credentials from the environment.
    ///
    /// A token file named by `CLOUDSDK_AUTH_ACCESS_TOKEN_FILE` takes
    /// precedence over Application Default Credentials.
    pub async fn new() -> Result<Self> {
        if let Ok(path) = std::env::var(ACCESS_TOKEN_FILE_ENV) {
            let token = read_token_file(Path::new(&path))?;
            tracing::info!("Using access token from {}", ACCESS_TOKEN_FILE_ENV);
            return Ok(Self::from_token(token));
        }

        let provider = gcp_auth::provider().await.context(
            "Failed to initialize GCP authentication. Run 'gcloud auth application-default login'",
        )?;

        Ok(Self {
            source: TokenSource::Adc(provider),
            token_cache: Arc::new(RwLock::new(None)),
        })
    }

    /// Credentials backed by a pre-issued access token
    pub fn from_token(token: impl Into<String>) -> Self {
        Self {
            source: TokenSource::Static(token.into()),
            token_cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Get an access token for API calls
    pub async fn get_token(&self) -> Result<String> {
        let provider = match &self.source {
            TokenSource::Static(token) => return Ok(token.clone()),
            TokenSource::Adc(provider) => provider,
        };

        {
            let cache = self.token_cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid() {
                    return Ok(cached.token.clone());
                }
                tracing::debug!("Cached token expired, fetching new token");
            }
        }

        let token = provider
            .token(DEFAULT_SCOPES)
            .await
            .context("Failed to get access token")?;

        let token_str = token.as_str().to_string();
        let expires_at = Instant::now() + DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER;

        {
            let mut cache = self.token_cache.write().await;
            *cache = Some(CachedToken {
                token: token_str.clone(),
                expires_at,
            });
        }

        tracing::debug!(
            "New token cached, expires in ~{} minutes",
            (DEFAULT_TOKEN_TTL - TOKEN_EXPIRY_BUFFER).as_secs() / 60
        );

        Ok(token_str)
    }
}

fn read_token_file(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read access token file {}", path.display()))?;
    let token = content.trim();
    if token.is_empty() {
        anyhow::bail!("Access token file {} is empty", path.display());
    }
    Ok(token.to_string())
}

/// Get the gcloud configuration directory
pub fn get_gcloud_config_dir() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("CLOUDSDK_CONFIG") {
        return Some(PathBuf::from(path));
    }

    dirs::config_dir().map(|p| p.join("gcloud"))
}

/// Validate a GCP project ID format
/// Project IDs must be 6-30 characters, lowercase letters, digits, and hyphens
/// Must start with a letter and cannot end with a hyphen
pub fn validate_project_id(project: &str) -> bool {
    if project.len() < 6 || project.len() > 30 {
        return false;
    }

    match project.chars().next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }

    if project.ends_with('-') {
        return false;
    }

    project
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Validate a gcloud configuration name (used to build a file path)
pub fn validate_profile_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Name of the gcloud configuration to read: the requested profile, or the
/// active one.
fn resolve_profile(config_dir: &Path, profile: Option<&str>) -> Option<String> {
    let name = match profile {
        Some(p) => p.to_string(),
        None => std::fs::read_to_string(config_dir.join("active_config"))
            .ok()?
            .trim()
            .to_string(),
    };

    if !validate_profile_name(&name) {
        tracing::warn!("Invalid characters in gcloud configuration name");
        return None;
    }
    Some(name)
}

/// Read `key` from `[section]` of a gcloud configuration file
pub fn read_config_property(content: &str, section: &str, key: &str) -> Option<String> {
    let header = format!("[{}]", section);
    let mut in_section = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') {
            in_section = line == header;
            continue;
        }
        if !in_section {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            if k.trim() == key {
                let value = v.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }

    None
}

fn read_profile_property(profile: Option<&str>, section: &str, key: &str) -> Option<String> {
    let config_dir = get_gcloud_config_dir()?;
    let name = resolve_profile(&config_dir, profile)?;
    let path = config_dir
        .join("configurations")
        .join(format!("config_{}", name));
    let content = std::fs::read_to_string(path).ok()?;
    read_config_property(&content, section, key)
}

/// Read the default project from the environment or a gcloud configuration
/// Security: Validates project ID format before returning
pub fn get_default_project(profile: Option<&str>) -> Option<String> {
    for var in ["CLOUDSDK_CORE_PROJECT", "GOOGLE_CLOUD_PROJECT", "GCLOUD_PROJECT"] {
        if let Ok(project) = std::env::var(var) {
            if validate_project_id(&project) {
                return Some(project);
            }
            tracing::warn!("Invalid project ID format in {}", var);
        }
    }

    let project = read_profile_property(profile, "core", "project")?;
    if validate_project_id(&project) {
        Some(project)
    } else {
        tracing::warn!("Invalid project ID format in gcloud configuration");
        None
    }
}

/// Get the default region from the environment or a gcloud configuration
pub fn get_default_region(profile: Option<&str>) -> Option<String> {
    if let Ok(region) = std::env::var("CLOUDSDK_COMPUTE_REGION") {
        return Some(region);
    }

    read_profile_property(profile, "compute", "region")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("my-project-123"));
        assert!(!validate_project_id("short"));
        assert!(!validate_project_id("1starts-with-digit"));
        assert!(!validate_project_id("ends-with-hyphen-"));
        assert!(!validate_project_id("Has-Upper-Case"));
    }

    #[test]
    fn test_validate_profile_name_rejects_traversal() {
        assert!(validate_profile_name("prod_eu-1"));
        assert!(!validate_profile_name("../secrets"));
        assert!(!validate_profile_name(""));
    }

    #[test]
    fn test_read_config_property_by_section() {
        let content = "\
[core]
account = me@example.com
project = my-project-123
# project = commented-out

[compute]
region = europe-west1
zone = europe-west1-b
";
        assert_eq!(
            read_config_property(content, "core", "project").as_deref(),
            Some("my-project-123")
        );
        assert_eq!(
            read_config_property(content, "compute", "region").as_deref(),
            Some("europe-west1")
        );
        assert_eq!(read_config_property(content, "compute", "project"), None);
    }

    #[test]
    fn test_static_token_is_returned() {
        let creds = GcpCredentials::from_token("abc");
        let token = tokio_test::block_on(creds.get_token()).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_read_token_file_rejects_empty() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "  \n").unwrap();
        assert!(read_token_file(file.path()).is_err());

        std::fs::write(file.path(), "ya29.token\n").unwrap();
        assert_eq!(read_token_file(file.path()).unwrap(), "ya29.token");
    }
}
