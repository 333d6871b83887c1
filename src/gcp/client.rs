//! GCP Client
//!
//! Main client for interacting with GCP APIs, combining authentication
//! and HTTP functionality.

use super::auth::GcpCredentials;
use super::http::GcpHttpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Main GCP client
#[derive(Clone)]
pub struct GcpClient {
    pub credentials: GcpCredentials,
    pub http: GcpHttpClient,
    pub project_id: String,
    pub region: String,
    /// Replaces every `https://<service host>` prefix (used against mock servers)
    endpoint_override: Option<String>,
}

impl GcpClient {
    /// Create a new GCP client
    pub async fn new(project_id: &str, region: &str) -> Result<Self> {
        let credentials = GcpCredentials::new()
            .await
            .context("Failed to initialize GCP credentials")?;

        Self::with_credentials(credentials, project_id, region)
    }

    /// Create a client from already-resolved credentials
    pub fn with_credentials(
        credentials: GcpCredentials,
        project_id: &str,
        region: &str,
    ) -> Result<Self> {
        let http = GcpHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            project_id: project_id.to_string(),
            region: region.to_string(),
            endpoint_override: None,
        })
    }

    /// Send every request to `base` instead of the public Google endpoints
    pub fn with_endpoint(mut self, base: &str) -> Self {
        self.endpoint_override = Some(base.trim_end_matches('/').to_string());
        self
    }

    /// Get the current access token
    pub async fn get_token(&self) -> Result<String> {
        self.credentials.get_token().await
    }

    /// Make a GET request to a GCP API
    pub async fn get(&self, url: &str) -> Result<Value> {
        let token = self.get_token().await?;
        self.http.get(url, &token).await
    }

    fn api_url(&self, host: &str, path: &str) -> String {
        match &self.endpoint_override {
            Some(base) => format!("{}/{}", base, path),
            None => format!("https://{}/{}", host, path),
        }
    }

    // =========================================================================
    // Compute Engine API helpers
    // =========================================================================

    /// Build Compute Engine API URL
    pub fn compute_url(&self, path: &str) -> String {
        self.api_url(
            "compute.googleapis.com",
            &format!("compute/v1/projects/{}/{}", self.project_id, path),
        )
    }

    /// Build global Compute Engine API URL
    pub fn compute_global_url(&self, resource: &str) -> String {
        self.compute_url(&format!("global/{}", resource))
    }

    /// Build aggregated Compute Engine API URL (all zones and regions)
    pub fn compute_aggregated_url(&self, resource: &str) -> String {
        self.compute_url(&format!("aggregated/{}", resource))
    }

    // =========================================================================
    // Cloud Storage API helpers
    // =========================================================================

    /// Build Cloud Storage API URL
    pub fn storage_url(&self, path: &str) -> String {
        self.api_url("storage.googleapis.com", &format!("storage/v1/{}", path))
    }

    /// Build Cloud Storage bucket URL
    pub fn storage_bucket_url(&self, bucket: &str) -> String {
        self.storage_url(&format!("b/{}", urlencoding::encode(bucket)))
    }

    // =========================================================================
    // Serverless, messaging and data API helpers
    // =========================================================================

    /// Build Cloud Functions (v2) URL, across all locations
    pub fn functions_url(&self, resource: &str) -> String {
        self.api_url(
            "cloudfunctions.googleapis.com",
            &format!("v2/projects/{}/locations/-/{}", self.project_id, resource),
        )
    }

    /// Build a Serverless VPC Access URL for a full resource name
    pub fn vpcaccess_url(&self, name: &str) -> String {
        self.api_url("vpcaccess.googleapis.com", &format!("v1/{}", name))
    }

    /// Build Pub/Sub URL
    pub fn pubsub_url(&self, resource: &str) -> String {
        self.api_url(
            "pubsub.googleapis.com",
            &format!("v1/projects/{}/{}", self.project_id, resource),
        )
    }

    /// Build Cloud Tasks URL in the client's region
    pub fn cloudtasks_url(&self, resource: &str) -> String {
        self.api_url(
            "cloudtasks.googleapis.com",
            &format!(
                "v2/projects/{}/locations/{}/{}",
                self.project_id, self.region, resource
            ),
        )
    }

    /// Build Datastream URL in the client's region
    pub fn datastream_url(&self, resource: &str) -> String {
        self.api_url(
            "datastream.googleapis.com",
            &format!(
                "v1/projects/{}/locations/{}/{}",
                self.project_id, self.region, resource
            ),
        )
    }

    /// Build Bigtable Admin URL
    pub fn bigtable_url(&self, resource: &str) -> String {
        self.api_url(
            "bigtableadmin.googleapis.com",
            &format!("v2/projects/{}/{}", self.project_id, resource),
        )
    }

    // =========================================================================
    // Resource Manager API helpers
    // =========================================================================

    /// Build Resource Manager effective tags URL for a full resource name
    pub fn effective_tags_url(&self, full_resource_name: &str) -> String {
        self.api_url(
            "cloudresourcemanager.googleapis.com",
            &format!(
                "v3/effectiveTags?parent={}",
                urlencoding::encode(full_resource_name)
            ),
        )
    }
}

/// Format a GCP API error for display
pub fn format_gcp_error(error: &anyhow::Error) -> String {
    super::http::format_gcp_error(error)
}
