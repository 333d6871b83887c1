//! Resource Fetcher
//!
//! Handles fetching resources from GCP APIs based on resource definitions.

use super::registry::ResourceDef;
use super::sdk_dispatch;
use crate::gcp::client::GcpClient;
use anyhow::Result;
use serde_json::Value;

/// Upper bound on pages followed for a single listing
const MAX_PAGES: usize = 100;

/// Result of paginated fetch
pub struct PaginatedResult {
    pub items: Vec<Value>,
    pub next_token: Option<String>,
}

/// Fetch all resources (auto-paginate)
pub async fn fetch_resources(resource_def: &ResourceDef, client: &GcpClient) -> Result<Vec<Value>> {
    let mut all_items = Vec::new();
    let mut page_token: Option<String> = None;

    for _ in 0..MAX_PAGES {
        let result = fetch_resources_paginated(resource_def, client, page_token.as_deref()).await?;
        all_items.extend(result.items);

        match result.next_token {
            Some(token) if !token.is_empty() => page_token = Some(token),
            _ => return Ok(all_items),
        }
    }

    tracing::warn!(
        "Stopped paginating {} after {} pages",
        resource_def.sdk_method,
        MAX_PAGES
    );
    Ok(all_items)
}

/// Fetch one page of resources
pub async fn fetch_resources_paginated(
    resource_def: &ResourceDef,
    client: &GcpClient,
    page_token: Option<&str>,
) -> Result<PaginatedResult> {
    let mut params = resource_def.sdk_method_params.clone();
    if params.is_null() {
        params = Value::Object(serde_json::Map::new());
    }

    if let (Value::Object(map), Some(token)) = (&mut params, page_token) {
        map.insert("pageToken".to_string(), Value::String(token.to_string()));
    }

    let response = sdk_dispatch::invoke_sdk(
        &resource_def.service,
        &resource_def.sdk_method,
        client,
        &params,
    )
    .await?;

    let items = extract_items(&response, &resource_def.response_path);

    let next_token = response
        .get("nextPageToken")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());

    Ok(PaginatedResult { items, next_token })
}

/// Extract items from response using the response_path
fn extract_items(response: &Value, path: &str) -> Vec<Value> {
    let raw_items = if path.is_empty() {
        response.as_array().cloned().unwrap_or_default()
    } else {
        extract_json_path(response, path)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
    };

    raw_items.into_iter().map(post_process_item).collect()
}

/// Post-process an item to add computed/derived fields
fn post_process_item(mut item: Value) -> Value {
    if let Value::Object(ref mut map) = item {
        if let Some(zone) = map.get("zone").and_then(|v| v.as_str()) {
            let short = extract_short_name(zone);
            map.insert("zone_short".to_string(), Value::String(short));
        }

        if let Some(region) = map.get("region").and_then(|v| v.as_str()) {
            let short = extract_short_name(region);
            map.insert("region_short".to_string(), Value::String(short));
        }

        if let Some(machine_type) = map.get("machineType").and_then(|v| v.as_str()) {
            let short = extract_short_name(machine_type);
            map.insert("machineType_short".to_string(), Value::String(short));
        }

        // projects/p/locations/us-central1/functions/f -> us-central1
        if let Some(location) = map
            .get("name")
            .and_then(|v| v.as_str())
            .and_then(location_from_name)
        {
            map.insert("location_short".to_string(), Value::String(location));
        }

        if let Some(subnets) = map.get("subnetworks").and_then(|v| v.as_array()) {
            map.insert("subnetworks_count".to_string(), Value::from(subnets.len()));
        }

        if let Some(auto_create) = map.get("autoCreateSubnetworks").and_then(|v| v.as_bool()) {
            let display = if auto_create { "Auto" } else { "Custom" };
            map.insert(
                "autoCreateSubnetworks_display".to_string(),
                Value::String(display.to_string()),
            );
        }

        for field in ["timeCreated", "updateTime"] {
            if let Some(ts) = map.get(field).and_then(|v| v.as_str()) {
                let short = format_timestamp_short(ts);
                map.insert(format!("{}_short", field), Value::String(short));
            }
        }
    }

    item
}

fn location_from_name(name: &str) -> Option<String> {
    let mut parts = name.split('/');
    while let Some(part) = parts.next() {
        if part == "locations" {
            return parts.next().map(|s| s.to_string());
        }
    }
    None
}

/// Extract short name from GCP resource URL
/// e.g., "https://www.googleapis.com/compute/v1/projects/my-project/global/networks/default" -> "default"
pub fn extract_short_name(url: &str) -> String {
    url.rsplit('/').next().unwrap_or(url).to_string()
}

/// Format timestamp to short form
fn format_timestamp_short(timestamp: &str) -> String {
    // RFC3339 format: 2023-01-15T10:30:00.000Z
    match chrono::DateTime::parse_from_rfc3339(timestamp) {
        Ok(dt) => dt.format("%Y-%m-%d").to_string(),
        Err(_) => timestamp.chars().take(10).collect(),
    }
}

/// Look up a value using a dot-notation path (numeric segments index arrays)
pub fn extract_json_path<'a>(item: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = item;

    for part in path.split('.') {
        current = match part.parse::<usize>() {
            Ok(idx) => current.get(idx)?,
            Err(_) => current.get(part)?,
        };
    }

    Some(current)
}

/// Look up a string using a dot-notation path
pub fn extract_json_str<'a>(item: &'a Value, path: &str) -> Option<&'a str> {
    extract_json_path(item, path)?
        .as_str()
        .filter(|s| !s.is_empty())
}
