//! Data Provider
//!
//! The seam between collectors and a concrete cloud API. Collectors only see
//! raw JSON items through [`DataProvider`]; [`GcpProvider`] binds it to the
//! GCP REST APIs described by the resource registry.

use crate::gcp::client::GcpClient;
use crate::resource::{self, extract_json_path, ResourceKind};
use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::BTreeMap;

/// Source of raw resource data, one resource kind at a time
pub trait DataProvider: Send + Sync {
    /// List every raw item of `kind`
    fn list(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Vec<Value>>>;

    /// Fetch the auxiliary record `handle` refers to (e.g. a bucket's IAM policy)
    fn describe<'a>(&'a self, kind: ResourceKind, handle: &'a str) -> BoxFuture<'a, Result<Value>>;

    /// Tags bound to the resource outside its inline labels
    fn tags<'a>(
        &'a self,
        kind: ResourceKind,
        id: &'a str,
    ) -> BoxFuture<'a, Result<BTreeMap<String, String>>> {
        let _ = (kind, id);
        Box::pin(async { Ok(BTreeMap::new()) })
    }
}

/// [`DataProvider`] over the GCP REST APIs
#[derive(Clone)]
pub struct GcpProvider {
    client: GcpClient,
}

impl GcpProvider {
    pub fn new(client: GcpClient) -> Self {
        Self { client }
    }
}

impl DataProvider for GcpProvider {
    fn list(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Vec<Value>>> {
        Box::pin(async move {
            let def = resource::definition(kind)
                .ok_or_else(|| anyhow::anyhow!("Unknown resource: {}", kind.key()))?;
            resource::fetch_resources(def, &self.client).await
        })
    }

    fn describe<'a>(&'a self, kind: ResourceKind, handle: &'a str) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            let method = resource::definition(kind)
                .and_then(|def| def.detail_sdk_method.as_deref())
                .ok_or_else(|| anyhow::anyhow!("No detail method for {}", kind.key()))?;
            resource::sdk_dispatch::invoke_detail(method, &self.client, handle).await
        })
    }

    fn tags<'a>(
        &'a self,
        kind: ResourceKind,
        id: &'a str,
    ) -> BoxFuture<'a, Result<BTreeMap<String, String>>> {
        Box::pin(async move {
            let Some(template) = resource::definition(kind).and_then(|d| d.tags_parent.as_deref())
            else {
                return Ok(BTreeMap::new());
            };

            let parent = template
                .replace("{project}", &self.client.project_id)
                .replace("{id}", id);
            let response =
                resource::sdk_dispatch::invoke_effective_tags(&self.client, &parent).await?;
            Ok(parse_effective_tags(&response))
        })
    }
}

/// Turn an effectiveTags response into `key -> value` using the short
/// segment of the namespaced names (`123/env` -> `env`).
pub fn parse_effective_tags(response: &Value) -> BTreeMap<String, String> {
    extract_json_path(response, "effectiveTags")
        .and_then(|v| v.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| {
                    let key = tag.get("namespacedTagKey")?.as_str()?;
                    let value = tag.get("namespacedTagValue")?.as_str()?;
                    Some((
                        resource::extract_short_name(key),
                        resource::extract_short_name(value),
                    ))
                })
                .collect()
        })
        .unwrap_or_default()
}
