//! gcp-tree
//!
//! Inventories a GCP project's resources, groups them under the VPC network
//! that owns them, flags risky configurations and renders the result as a
//! collapsible HTML document or a plain-text outline.
//!
//! Pipeline: [`collector`] → [`tree::TreeBuilder`] → [`tree::prune`] →
//! [`render`].

pub mod collector;
pub mod config;
pub mod error;
pub mod gcp;
pub mod provider;
pub mod render;
pub mod resource;
pub mod tree;

pub use collector::{collect_all, Collection};
pub use error::InventoryError;
pub use provider::{DataProvider, GcpProvider};
pub use render::{OutputFormat, ReportContext};
pub use tree::{Tree, TreeBuilder};
