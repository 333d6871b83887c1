//! Resource abstraction layer
//!
//! This module owns the normalized resource model and a data-driven
//! description of how each kind is listed from GCP. Resource definitions are
//! loaded from JSON files at compile time, so adding a resource kind needs a
//! registry entry plus a dispatch arm, not a new collector.
//!
//! # Architecture
//!
//! - [`record`] - [`ResourceRecord`], [`ResourceKind`] and attribute values
//! - [`registry`] - Loads and caches resource definitions from embedded JSON
//! - [`fetcher`] - Fetches resources from GCP APIs with pagination support
//! - [`sdk_dispatch`] - Maps abstract SDK method names to concrete REST API calls
//!
//! # Resource Definitions
//!
//! Resources are defined in JSON files under `src/resources/`:
//! - `compute.json` - VPC networks, VM instances, forwarding rules
//! - `storage.json` - Cloud Storage buckets
//! - `serverless.json` - Cloud Functions
//! - `data.json` - Pub/Sub topics, Cloud Tasks queues, Datastream streams, Bigtable instances

pub mod fetcher;
pub mod record;
pub mod registry;
pub mod sdk_dispatch;

pub use fetcher::{extract_json_path, extract_json_str, extract_short_name, fetch_resources};
pub use record::{attr, AttrValue, NetworkId, ResourceKind, ResourceRecord, Scalar};
pub use registry::{definition, get_resource, ResourceDef};
