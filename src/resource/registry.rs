//! Resource Registry - Load resource definitions from JSON
//!
//! This module loads the per-kind collection definitions from embedded JSON
//! files and provides lookup functions for collectors and link derivation.

use super::record::ResourceKind;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Embedded resource JSON files (compiled into the binary)
const RESOURCE_FILES: &[&str] = &[
    include_str!("../resources/compute.json"),
    include_str!("../resources/storage.json"),
    include_str!("../resources/serverless.json"),
    include_str!("../resources/data.json"),
];

/// Attribute shown under a resource node
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDef {
    pub label: String,
    pub json_path: String,
    /// Reduce a full resource URL to its last path segment
    #[serde(default)]
    pub short: bool,
}

/// Resource definition from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceDef {
    pub service: String,
    pub sdk_method: String,
    #[serde(default)]
    pub sdk_method_params: Value,
    pub response_path: String,
    pub id_field: String,
    /// Path to the owning network's URL in the listed item
    #[serde(default)]
    pub network_field: Option<String>,
    #[serde(default)]
    pub labels_field: Option<String>,
    /// Path to the zone, region or location; reduced to its short name
    #[serde(default)]
    pub location_field: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
    /// SDK method fetching the auxiliary record a resource references
    #[serde(default)]
    pub detail_sdk_method: Option<String>,
    /// Path to the handle passed to `detail_sdk_method`
    #[serde(default)]
    pub detail_id_field: Option<String>,
    /// Path to the owning network's URL in the detail record
    #[serde(default)]
    pub detail_network_field: Option<String>,
    /// Full resource name template used for Resource Manager tag lookups
    #[serde(default)]
    pub tags_parent: Option<String>,
    pub console_link: String,
}

/// Root structure of resources/*.json
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceConfig {
    #[serde(default)]
    pub resources: HashMap<String, ResourceDef>,
}

/// Global registry loaded from JSON
static REGISTRY: OnceLock<ResourceConfig> = OnceLock::new();

/// Get the resource registry (loads from embedded JSON on first access)
pub fn get_registry() -> &'static ResourceConfig {
    REGISTRY.get_or_init(|| {
        let mut final_config = ResourceConfig {
            resources: HashMap::new(),
        };

        for content in RESOURCE_FILES {
            let partial: ResourceConfig = serde_json::from_str(content)
                .unwrap_or_else(|e| panic!("Failed to parse embedded resource JSON: {}", e));
            final_config.resources.extend(partial.resources);
        }

        final_config
    })
}

/// Get a resource definition by key
pub fn get_resource(key: &str) -> Option<&'static ResourceDef> {
    get_registry().resources.get(key)
}

/// Get the definition backing a resource kind
pub fn definition(kind: ResourceKind) -> Option<&'static ResourceDef> {
    get_resource(kind.key())
}
