//! End-to-end pipeline tests: collect → build → prune → render
//!
//! Uses an in-memory data provider so every scenario is deterministic.

use anyhow::Result;
use futures::future::BoxFuture;
use gcp_tree::collector::collect_all;
use gcp_tree::provider::DataProvider;
use gcp_tree::render::{self, OutputFormat, ReportContext};
use gcp_tree::resource::{attr, NetworkId, ResourceKind, ResourceRecord};
use gcp_tree::tree::{self, Body, TreeBuilder, TAGS_KEY};
use gcp_tree::InventoryError;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

fn text(tree: &gcp_tree::Tree) -> String {
    render::render(tree, OutputFormat::Text, ReportContext::default()).unwrap()
}

fn html(tree: &gcp_tree::Tree) -> String {
    render::render(tree, OutputFormat::Interactive, ReportContext::default()).unwrap()
}

/// Test module for record-level scenarios
mod scenarios {
    use super::*;

    fn round_trip_records() -> (Vec<ResourceRecord>, Vec<NetworkId>) {
        let records = vec![
            ResourceRecord::new(ResourceKind::Network, "n1"),
            ResourceRecord::new(ResourceKind::Bucket, "b1")
                .with_parent("n1")
                .with_attribute(attr::ENCRYPTED, false),
            ResourceRecord::new(ResourceKind::Instance, "i1")
                .with_parent("n1")
                .with_tag("env", "prod"),
            ResourceRecord::new(ResourceKind::Bucket, "b2").with_attribute(attr::ENCRYPTED, true),
        ];
        (records, vec![NetworkId::from("n1")])
    }

    #[test]
    fn test_round_trip_text() {
        let (records, networks) = round_trip_records();
        let tree = tree::build(&records, &networks).pruned();

        let expected = "\
GCP Resources
+--n1
|  +--VM Instances
|  |  +--i1
|  |  |  +--Tags
|  |  |  |  +--env: prod
|  +--Storage Buckets
|  |  +--\x1b[1;31mb1\x1b[0m
|  |  |  +--Encrypted: false
+--Storage Buckets
|  +--b2
|  |  +--Encrypted: true
";
        assert_eq!(text(&tree), expected);
    }

    #[test]
    fn test_round_trip_html_matches_text_emphasis() {
        let (records, networks) = round_trip_records();
        let tree = tree::build(&records, &networks).pruned();
        let output = html(&tree);

        assert!(output.contains("<span class=\"risk\">b1</span>"));
        assert!(output.contains("<span class=\"label\">b2</span>"));
        assert!(output.contains("<span class=\"label\">env</span>: <span class=\"value\">prod</span>"));
        assert_eq!(output.matches("class=\"risk\"").count(), 1);
    }

    #[test]
    fn test_empty_input() {
        let tree = tree::build(&[], &[]).pruned();
        assert!(tree.is_empty());

        assert_eq!(text(&tree), "GCP Resources\n");

        let output = html(&tree);
        assert!(output.starts_with("<!DOCTYPE html>"));
        assert!(output.contains("<ul class=\"tree\"></ul>"));
        assert_eq!(output.matches("<details").count(), 0);
    }

    #[test]
    fn test_networks_without_resources_prune_away() {
        let tree = tree::build(&[], &[NetworkId::from("n1"), NetworkId::from("n2")]).pruned();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_duplicate_id_keeps_last() {
        let records = vec![
            ResourceRecord::new(ResourceKind::Function, "f1")
                .with_parent("n1")
                .with_attribute(attr::RUNTIME, "python37"),
            ResourceRecord::new(ResourceKind::Function, "f1")
                .with_parent("n1")
                .with_attribute(attr::RUNTIME, "python312"),
        ];
        let tree = tree::build(&records, &[NetworkId::from("n1")]).pruned();

        assert_eq!(tree.root().locate("f1").len(), 1);
        let function = tree.find(&["n1", "Cloud Functions", "f1"]).unwrap();
        assert!(!function.is_risk());
        assert_eq!(
            tree.find(&["n1", "Cloud Functions", "f1", attr::RUNTIME])
                .map(|n| n.body().clone()),
            Some(Body::Leaf(Some("python312".into())))
        );
    }
}

/// In-memory [`DataProvider`] keyed by resource kind
#[derive(Default)]
struct FixtureProvider {
    lists: HashMap<ResourceKind, Result<Vec<Value>, String>>,
    details: HashMap<String, Value>,
    tags: HashMap<String, BTreeMap<String, String>>,
}

impl FixtureProvider {
    fn with_list(mut self, kind: ResourceKind, items: Value) -> Self {
        let items = items.as_array().cloned().unwrap_or_default();
        self.lists.insert(kind, Ok(items));
        self
    }

    fn with_failure(mut self, kind: ResourceKind, message: &str) -> Self {
        self.lists.insert(kind, Err(message.to_string()));
        self
    }

    fn with_detail(mut self, handle: &str, detail: Value) -> Self {
        self.details.insert(handle.to_string(), detail);
        self
    }

    fn with_tags(mut self, id: &str, tags: &[(&str, &str)]) -> Self {
        self.tags.insert(
            id.to_string(),
            tags.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }
}

impl DataProvider for FixtureProvider {
    fn list(&self, kind: ResourceKind) -> BoxFuture<'_, Result<Vec<Value>>> {
        let result = match self.lists.get(&kind) {
            Some(Ok(items)) => Ok(items.clone()),
            Some(Err(message)) => Err(anyhow::anyhow!("API request failed: {}", message)),
            None => Ok(Vec::new()),
        };
        Box::pin(async move { result })
    }

    fn describe<'a>(&'a self, _kind: ResourceKind, handle: &'a str) -> BoxFuture<'a, Result<Value>> {
        Box::pin(async move {
            self.details
                .get(handle)
                .cloned()
                .ok_or_else(|| anyhow::anyhow!("API request failed: 404 Not Found"))
        })
    }

    fn tags<'a>(
        &'a self,
        _kind: ResourceKind,
        id: &'a str,
    ) -> BoxFuture<'a, Result<BTreeMap<String, String>>> {
        Box::pin(async move { Ok(self.tags.get(id).cloned().unwrap_or_default()) })
    }
}

/// Test module for provider-driven runs
mod collection {
    use super::*;

    fn project() -> FixtureProvider {
        FixtureProvider::default()
            .with_list(
                ResourceKind::Network,
                json!([{"name": "prod-vpc", "autoCreateSubnetworks": false}]),
            )
            .with_list(
                ResourceKind::Instance,
                json!([{
                    "name": "web-1",
                    "status": "RUNNING",
                    "zone": "projects/p/zones/us-central1-a",
                    "labels": {"env": "prod"},
                    "networkInterfaces": [{
                        "network": "https://www.googleapis.com/compute/v1/projects/p/global/networks/prod-vpc",
                        "networkIP": "10.0.0.2"
                    }]
                }]),
            )
            .with_list(
                ResourceKind::Function,
                json!([{
                    "name": "projects/p/locations/us-central1/functions/legacy",
                    "buildConfig": {"runtime": "nodejs10"},
                    "serviceConfig": {"vpcConnector": "projects/p/locations/us-central1/connectors/c1"}
                }]),
            )
            .with_detail(
                "projects/p/locations/us-central1/connectors/c1",
                json!({"network": "prod-vpc"}),
            )
            .with_list(
                ResourceKind::Bucket,
                json!([{"name": "assets", "iamConfiguration": {"publicAccessPrevention": "inherited"}}]),
            )
            .with_tags("assets", &[("team", "web")])
            .with_list(
                ResourceKind::Topic,
                json!([{"name": "projects/p/topics/events"}]),
            )
    }

    #[tokio::test]
    async fn test_full_run() {
        let provider = project();
        let collection = collect_all(&provider, &ResourceKind::ALL, Duration::from_secs(5)).await;
        assert!(!collection.is_partial());

        let tree = TreeBuilder::default()
            .build(&collection.records, &collection.networks)
            .pruned();

        assert!(tree
            .find(&["prod-vpc", "VM Instances", "us-central1-a/web-1", TAGS_KEY, "env"])
            .is_some());
        assert!(tree
            .find(&["prod-vpc", "Cloud Functions", "legacy"])
            .unwrap()
            .is_risk());
        // IAM lookup failed: encryption alone decides
        assert!(tree.find(&["Storage Buckets", "assets"]).unwrap().is_risk());
        assert!(tree
            .find(&["Storage Buckets", "assets", TAGS_KEY, "team"])
            .is_some());
        assert!(tree.find(&["Pub/Sub Topics", "events"]).is_some());

        let output = text(&tree);
        assert!(output.contains("\x1b[1;31mlegacy\x1b[0m"));
        assert!(output.contains("\x1b[1;31massets\x1b[0m"));
    }

    #[tokio::test]
    async fn test_partial_failure_still_renders() {
        let provider = project().with_failure(ResourceKind::Bucket, "403 Forbidden");
        let collection = collect_all(&provider, &ResourceKind::ALL, Duration::from_secs(5)).await;

        assert_eq!(collection.failures.len(), 1);
        assert!(matches!(
            &collection.failures[0],
            InventoryError::Collector { kind: ResourceKind::Bucket, .. }
        ));
        assert!(!collection.failures[0].is_fatal());

        let tree = TreeBuilder::default()
            .build(&collection.records, &collection.networks)
            .pruned();
        assert!(tree.find(&["Storage Buckets"]).is_none());
        assert!(tree
            .find(&["prod-vpc", "VM Instances", "us-central1-a/web-1"])
            .is_some());

        let output = html(&tree);
        assert!(output.contains("web-1"));
        assert!(!output.contains("assets"));
    }

    #[tokio::test]
    async fn test_network_failure_sends_everything_to_root() {
        let provider = project().with_failure(ResourceKind::Network, "500 Internal");
        let collection = collect_all(&provider, &ResourceKind::ALL, Duration::from_secs(5)).await;
        assert!(collection.networks.is_empty());

        let tree = tree::build(&collection.records, &collection.networks).pruned();
        assert!(tree
            .find(&["VM Instances", "us-central1-a/web-1 (prod-vpc)"])
            .is_some());
        assert!(tree.find(&["Cloud Functions", "legacy (prod-vpc)"]).is_some());
    }
}
