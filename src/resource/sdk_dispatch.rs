//! SDK Dispatch
//!
//! Maps SDK method names to GCP REST API calls.

use crate::gcp::client::GcpClient;
use anyhow::{Context, Result};
use serde_json::Value;

/// Invoke a GCP SDK list method
pub async fn invoke_sdk(
    service: &str,
    method: &str,
    client: &GcpClient,
    params: &Value,
) -> Result<Value> {
    tracing::debug!("invoke_sdk: service={}, method={}", service, method);

    match service {
        "compute" => invoke_compute(method, client, params).await,
        "storage" => invoke_storage(method, client, params).await,
        "cloudfunctions" => invoke_functions(method, client, params).await,
        "pubsub" => invoke_pubsub(method, client, params).await,
        "cloudtasks" => invoke_cloudtasks(method, client, params).await,
        "datastream" => invoke_datastream(method, client, params).await,
        "bigtable" => invoke_bigtable(method, client, params).await,
        _ => Err(anyhow::anyhow!("Unknown service: {}", service)),
    }
}

/// Invoke a detail method for a single resource handle
pub async fn invoke_detail(method: &str, client: &GcpClient, handle: &str) -> Result<Value> {
    tracing::debug!("invoke_detail: method={}, handle={}", method, handle);

    match method {
        "get_bucket_iam_policy" => {
            let url = format!("{}/iam", client.storage_bucket_url(handle));
            client.get(&url).await
        }
        "get_vpc_connector" => {
            // Handle is a full resource name: projects/*/locations/*/connectors/*
            if !handle.starts_with("projects/") || handle.contains("..") {
                return Err(anyhow::anyhow!("Invalid connector name: {}", handle));
            }
            client.get(&client.vpcaccess_url(handle)).await
        }
        _ => Err(anyhow::anyhow!("Unknown detail method: {}", method)),
    }
}

/// Fetch the Resource Manager effective tags bound to a resource
pub async fn invoke_effective_tags(client: &GcpClient, full_resource_name: &str) -> Result<Value> {
    let url = client.effective_tags_url(full_resource_name);
    client
        .get(&url)
        .await
        .context("Failed to fetch effective tags")
}

// =============================================================================
// Compute Engine
// =============================================================================

async fn invoke_compute(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_networks" => {
            let url = client.compute_global_url("networks");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        "list_instances" => {
            let url = client.compute_aggregated_url("instances");
            let url = add_query_params(&url, params);
            let response = client.get(&url).await?;
            Ok(flatten_aggregated_response(response))
        }
        "list_forwarding_rules" => {
            let url = client.compute_aggregated_url("forwardingRules");
            let url = add_query_params(&url, params);
            let response = client.get(&url).await?;
            Ok(flatten_aggregated_response(response))
        }
        _ => Err(anyhow::anyhow!("Unknown compute method: {}", method)),
    }
}

// =============================================================================
// Cloud Storage
// =============================================================================

async fn invoke_storage(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_buckets" => {
            let url = format!(
                "{}?project={}",
                client.storage_url("b"),
                urlencoding::encode(&client.project_id)
            );
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown storage method: {}", method)),
    }
}

// =============================================================================
// Cloud Functions
// =============================================================================

async fn invoke_functions(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_functions" => {
            let url = client.functions_url("functions");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown cloudfunctions method: {}", method)),
    }
}

// =============================================================================
// Messaging, queueing, streams and tables
// =============================================================================

async fn invoke_pubsub(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_topics" => {
            let url = client.pubsub_url("topics");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown pubsub method: {}", method)),
    }
}

async fn invoke_cloudtasks(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_queues" => {
            let url = client.cloudtasks_url("queues");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown cloudtasks method: {}", method)),
    }
}

async fn invoke_datastream(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_streams" => {
            let url = client.datastream_url("streams");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown datastream method: {}", method)),
    }
}

async fn invoke_bigtable(method: &str, client: &GcpClient, params: &Value) -> Result<Value> {
    match method {
        "list_instances" => {
            let url = client.bigtable_url("instances");
            let url = add_query_params(&url, params);
            client.get(&url).await
        }
        _ => Err(anyhow::anyhow!("Unknown bigtable method: {}", method)),
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn add_query_params(url: &str, params: &Value) -> String {
    let Value::Object(map) = params else {
        return url.to_string();
    };

    let mut query_parts: Vec<String> = Vec::new();

    for (key, value) in map {
        match value {
            Value::String(s) => {
                query_parts.push(format!("{}={}", key, urlencoding::encode(s)));
            }
            Value::Array(arr) => {
                for item in arr {
                    if let Value::String(s) = item {
                        query_parts.push(format!("{}={}", key, urlencoding::encode(s)));
                    }
                }
            }
            _ => {}
        }
    }

    if query_parts.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{}&{}", url, query_parts.join("&"))
    } else {
        format!("{}?{}", url, query_parts.join("&"))
    }
}

/// Flatten an aggregated API response into a standard list response.
/// Aggregated responses have format: { "items": { "zones/us-central1-a": { "instances": [...] }, ... } }
/// We flatten to: { "items": [...all instances...], "nextPageToken": ... }
fn flatten_aggregated_response(response: Value) -> Value {
    let next_token = response.get("nextPageToken").cloned();

    let Some(items) = response.get("items").and_then(|v| v.as_object()) else {
        return serde_json::json!({ "items": [] });
    };

    let mut all_items: Vec<Value> = Vec::new();

    for scope_data in items.values() {
        if let Some(obj) = scope_data.as_object() {
            for (key, value) in obj {
                // Scopes without resources only carry a warning
                if key == "warning" {
                    continue;
                }
                if let Some(arr) = value.as_array() {
                    all_items.extend(arr.iter().cloned());
                }
            }
        }
    }

    let mut flattened = serde_json::json!({ "items": all_items });
    if let Some(token) = next_token {
        flattened["nextPageToken"] = token;
    }
    flattened
}
