//! Resource Collectors
//!
//! One collection pass per [`ResourceKind`]: list raw items through a
//! [`DataProvider`], normalize them into [`ResourceRecord`]s and enrich each
//! record with auxiliary lookups. A failing kind yields zero records and a
//! [`InventoryError::Collector`] entry; a failing lookup only loses the
//! attributes it would have added.

use crate::error::InventoryError;
use crate::gcp::http::format_gcp_error;
use crate::provider::DataProvider;
use crate::resource::{
    attr, extract_json_path, extract_json_str, extract_short_name, AttrValue, NetworkId,
    ResourceDef, ResourceKind, ResourceRecord, Scalar,
};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Concurrent enrichment lookups per kind
const ENRICH_CONCURRENCY: usize = 8;

/// IAM members that make a binding public
const PUBLIC_MEMBERS: &[&str] = &["allUsers", "allAuthenticatedUsers"];

/// Output of one collection pass over several kinds
#[derive(Debug, Default)]
pub struct Collection {
    /// Records in kind declaration order, then provider order
    pub records: Vec<ResourceRecord>,
    /// Ids of every collected network
    pub networks: Vec<NetworkId>,
    /// Kinds that contributed nothing because their collector failed
    pub failures: Vec<InventoryError>,
}

impl Collection {
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Run the collectors for `kinds` concurrently, each bounded by `timeout`
pub async fn collect_all<P>(provider: &P, kinds: &[ResourceKind], timeout: Duration) -> Collection
where
    P: DataProvider + ?Sized,
{
    let mut kinds = kinds.to_vec();
    kinds.sort();
    kinds.dedup();

    let results = futures::future::join_all(kinds.iter().map(|&kind| async move {
        let outcome = tokio::time::timeout(timeout, collect_kind(provider, kind)).await;
        (kind, outcome)
    }))
    .await;

    let mut collection = Collection::default();

    for (kind, outcome) in results {
        let records = match outcome {
            Ok(Ok(records)) => records,
            Ok(Err(err)) => {
                tracing::warn!("{}", err);
                collection.failures.push(err);
                continue;
            }
            Err(_) => {
                let err = InventoryError::Collector {
                    kind,
                    message: format!("timed out after {:?}", timeout),
                };
                tracing::warn!("{}", err);
                collection.failures.push(err);
                continue;
            }
        };

        tracing::info!("Collected {} {}", records.len(), kind);

        if kind == ResourceKind::Network {
            collection
                .networks
                .extend(records.iter().map(|r| NetworkId::new(r.id())));
        }
        collection.records.extend(records);
    }

    collection
}

/// Collect every resource of one kind
pub async fn collect_kind<P>(provider: &P, kind: ResourceKind) -> Result<Vec<ResourceRecord>, InventoryError>
where
    P: DataProvider + ?Sized,
{
    let def = crate::resource::definition(kind).ok_or_else(|| InventoryError::Collector {
        kind,
        message: format!("no definition for {}", kind.key()),
    })?;

    let raw_items = provider
        .list(kind)
        .await
        .map_err(|e| InventoryError::Collector {
            kind,
            message: format_gcp_error(&e),
        })?;

    let records = stream::iter(raw_items.iter())
        .filter_map(|raw| async move {
            let record = normalize(kind, def, raw);
            if record.is_none() {
                tracing::debug!("Skipping {} item without `{}`", kind, def.id_field);
            }
            record.map(|record| (record, raw))
        })
        .map(|(record, raw)| enrich(provider, kind, def, record, raw))
        .buffered(ENRICH_CONCURRENCY)
        .collect::<Vec<_>>()
        .await;

    Ok(records)
}

/// Map one raw item to a record, without any auxiliary lookups
pub fn normalize(kind: ResourceKind, def: &ResourceDef, raw: &Value) -> Option<ResourceRecord> {
    let id = extract_short_name(extract_json_str(raw, &def.id_field)?);
    let mut record = ResourceRecord::new(kind, id);

    if let Some(network) = def
        .network_field
        .as_deref()
        .and_then(|path| extract_json_str(raw, path))
    {
        record = record.with_parent(NetworkId::new(extract_short_name(network)));
    }

    if let Some(location) = def
        .location_field
        .as_deref()
        .and_then(|path| extract_json_str(raw, path))
    {
        record = record.with_location(extract_short_name(location));
    }

    for attribute in &def.attributes {
        if let Some(value) = extract_json_path(raw, &attribute.json_path)
            .and_then(|v| to_attr_value(v, attribute.short))
        {
            record = record.with_attribute(&attribute.label, value);
        }
    }

    if kind == ResourceKind::Bucket {
        let encrypted = extract_json_str(raw, "encryption.defaultKmsKeyName").is_some();
        record = record.with_attribute(attr::ENCRYPTED, encrypted);
    }

    if let Some(labels) = def
        .labels_field
        .as_deref()
        .and_then(|path| extract_json_path(raw, path))
    {
        record = record.with_tags(labels_to_tags(labels));
    }

    Some(record)
}

/// Apply auxiliary lookups; each failure is logged and skipped
async fn enrich<P>(
    provider: &P,
    kind: ResourceKind,
    def: &ResourceDef,
    mut record: ResourceRecord,
    raw: &Value,
) -> ResourceRecord
where
    P: DataProvider + ?Sized,
{
    let handle = def
        .detail_id_field
        .as_deref()
        .and_then(|path| extract_json_str(raw, path));

    if let (Some(_), Some(handle)) = (def.detail_sdk_method.as_deref(), handle) {
        match provider.describe(kind, handle).await {
            Ok(detail) => record = apply_detail(kind, def, raw, &detail, record),
            Err(e) => warn_enrichment(kind, record.id(), &e),
        }
    }

    let tags = provider.tags(kind, record.id()).await;
    match tags {
        Ok(tags) if !tags.is_empty() => record = record.with_tags(tags),
        Ok(_) => {}
        Err(e) => warn_enrichment(kind, record.id(), &e),
    }

    record
}

fn warn_enrichment(kind: ResourceKind, id: &str, error: &anyhow::Error) {
    let err = InventoryError::Enrichment {
        kind,
        id: id.to_string(),
        message: format_gcp_error(error),
    };
    tracing::warn!("{}", err);
}

/// Fold a detail record into a resource record
fn apply_detail(
    kind: ResourceKind,
    def: &ResourceDef,
    raw: &Value,
    detail: &Value,
    mut record: ResourceRecord,
) -> ResourceRecord {
    if record.parent_key().is_none() {
        if let Some(network) = def
            .detail_network_field
            .as_deref()
            .and_then(|path| extract_json_str(detail, path))
        {
            record = record.with_parent(NetworkId::new(extract_short_name(network)));
        }
    }

    if kind == ResourceKind::Bucket {
        let prevention_enforced = extract_json_str(raw, "iamConfiguration.publicAccessPrevention")
            == Some("enforced");
        let public = !prevention_enforced && policy_grants_public(detail);
        record = record.with_attribute(attr::PUBLIC_ACCESS, public);
    }

    record
}

/// Whether any IAM binding names an anonymous or all-users principal
pub fn policy_grants_public(policy: &Value) -> bool {
    policy
        .get("bindings")
        .and_then(|v| v.as_array())
        .map(|bindings| {
            bindings.iter().any(|binding| {
                binding
                    .get("members")
                    .and_then(|v| v.as_array())
                    .map(|members| {
                        members
                            .iter()
                            .filter_map(|m| m.as_str())
                            .any(|m| PUBLIC_MEMBERS.contains(&m))
                    })
                    .unwrap_or(false)
            })
        })
        .unwrap_or(false)
}

fn labels_to_tags(labels: &Value) -> BTreeMap<String, String> {
    labels
        .as_object()
        .map(|map| {
            map.iter()
                .map(|(k, v)| {
                    let value = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), value)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn to_scalar(value: &Value, short: bool) -> Option<Scalar> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) if short => Some(Scalar::Text(extract_short_name(s))),
        Value::String(s) => Some(Scalar::Text(s.clone())),
        Value::Bool(b) => Some(Scalar::Bool(*b)),
        Value::Number(n) => Some(match n.as_i64() {
            Some(i) => Scalar::Number(i),
            None => Scalar::Text(n.to_string()),
        }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn to_attr_value(value: &Value, short: bool) -> Option<AttrValue> {
    match value {
        Value::Array(items) => {
            let scalars: Vec<Scalar> = items.iter().filter_map(|v| to_scalar(v, short)).collect();
            Some(AttrValue::List(scalars))
        }
        other => to_scalar(other, short).map(AttrValue::Scalar),
    }
}
