//! GCP API interaction module
//!
//! This module provides the plumbing for talking to Google Cloud Platform
//! REST APIs: authentication, the HTTP client and endpoint URL building.
//!
//! # Module Structure
//!
//! - [`auth`] - Application Default Credentials, token caching, gcloud configurations
//! - [`client`] - Main GCP client and per-service URL builders
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use gcp_tree::gcp::client::GcpClient;
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = GcpClient::new("my-project", "us-central1").await?;
//!     let networks = client.get(&client.compute_global_url("networks")).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
