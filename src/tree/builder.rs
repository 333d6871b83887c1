//! Tree Builder
//!
//! Folds resource records into a single rooted [`Tree`]:
//!
//! ```text
//! GCP Resources
//! ├── <network id>            one per known network, in the order given
//! │   ├── URL                 link node, when a console link is known
//! │   ├── VM Instances        pre-declared for every network-scoped kind
//! │   │   └── <resource label>
//! │   └── ...
//! └── Storage Buckets         root-level bucket, created on first use
//!     ├── <resource label>
//!     └── <resource label> (<unknown network>)
//! ```
//!
//! Resources whose parent network is missing or unknown land in the
//! root-level bucket of their kind. An unknown parent stays in the label so
//! records that only differ by it do not collide. A record colliding with an
//! earlier one on (parent, kind, label) replaces it in place: last write wins.

use super::links::ConsoleLinks;
use super::risk::RiskPolicy;
use super::{Node, Tree, ROOT_LABEL, TAGS_KEY, URL_KEY};
use crate::resource::{AttrValue, NetworkId, ResourceKind, ResourceRecord};
use std::collections::HashSet;

/// Build a tree with the default risk policy and no derived links
pub fn build(records: &[ResourceRecord], networks: &[NetworkId]) -> Tree {
    TreeBuilder::default().build(records, networks)
}

#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    policy: RiskPolicy,
    links: Option<ConsoleLinks>,
}

impl TreeBuilder {
    pub fn new(policy: RiskPolicy) -> Self {
        Self {
            policy,
            links: None,
        }
    }

    /// Derive console links for records that carry none
    pub fn with_links(mut self, links: ConsoleLinks) -> Self {
        self.links = Some(links);
        self
    }

    pub fn build<'a, I>(&self, records: I, networks: &[NetworkId]) -> Tree
    where
        I: IntoIterator<Item = &'a ResourceRecord>,
    {
        let mut root = Node::internal(ROOT_LABEL);
        let mut known: HashSet<&str> = HashSet::new();

        for network in networks {
            if !known.insert(network.as_str()) {
                continue;
            }
            root.upsert(self.network_node(network));
        }

        let mut placed = 0usize;
        for record in records {
            self.place(&mut root, &known, record);
            placed += 1;
        }

        tracing::debug!(
            "Built tree from {} records across {} networks",
            placed,
            known.len()
        );

        Tree::from_root(root)
    }

    fn network_node(&self, network: &NetworkId) -> Node {
        let mut node = Node::internal(network.as_str());

        if let Some(url) = self
            .links
            .as_ref()
            .and_then(|l| l.url_for(ResourceKind::Network, network.as_str(), None))
        {
            node.upsert(Node::link(url));
        }

        for kind in ResourceKind::network_scoped() {
            node.upsert(Node::internal(kind.display_name()));
        }

        node
    }

    fn place(&self, root: &mut Node, known: &HashSet<&str>, record: &ResourceRecord) {
        let kind = record.kind();
        let risk = record.risk_flag() || self.policy.assess(record);
        let details = self.details(record);

        // A known network's own record decorates its node
        if kind == ResourceKind::Network && known.contains(record.id()) {
            if let Some(network) = root.child_mut(record.id()) {
                for child in details {
                    if !is_bucket_label(child.label()) {
                        network.upsert(child);
                    }
                }
                network.set_risk(risk);
            }
            return;
        }

        let (parent, label) = match record.parent_key() {
            Some(parent) if kind != ResourceKind::Network && known.contains(parent.as_str()) => {
                (Some(parent.as_str()), record.label())
            }
            Some(parent) => {
                tracing::debug!(
                    "{} `{}` references unknown network `{}`, placing at root",
                    kind,
                    record.id(),
                    parent
                );
                (None, format!("{} ({})", record.label(), parent))
            }
            None => (None, record.label()),
        };

        let node = if details.is_empty() {
            Node::summary(label)
        } else {
            details
                .into_iter()
                .fold(Node::internal(label), Node::with_child)
        }
        .flagged(risk);

        let bucket = match parent {
            Some(parent) => root
                .child_mut(parent)
                .and_then(|network| network.child_mut(kind.display_name())),
            None => {
                let label = global_bucket_label(kind, known);
                if root.child(&label).is_none() {
                    root.upsert(Node::internal(label.clone()));
                }
                root.child_mut(&label)
            }
        };

        if let Some(bucket) = bucket {
            if bucket.upsert(node).is_some() {
                tracing::debug!(
                    "Duplicate {} `{}`, keeping the last record",
                    kind,
                    record.id()
                );
            }
        }
    }

    /// Child nodes describing one record: URL, attributes, then tags
    fn details(&self, record: &ResourceRecord) -> Vec<Node> {
        let mut holder = Node::internal(record.id());

        let link = record
            .link()
            .map(str::to_string)
            .or_else(|| self.links.as_ref()?.url_for_record(record));
        if let Some(url) = link {
            holder.upsert(Node::link(url));
        }

        for (label, value) in record.attributes() {
            if label == URL_KEY || label == TAGS_KEY {
                tracing::debug!("Ignoring attribute with reserved label `{}`", label);
                continue;
            }
            let child = match value {
                AttrValue::Scalar(scalar) => Node::leaf(label.as_str(), scalar.clone()),
                // An empty list would be pruned and could take the resource with it
                AttrValue::List(items) if items.is_empty() => continue,
                AttrValue::List(items) => Node::list(
                    label.as_str(),
                    items.iter().map(|s| Node::summary(s.to_string())).collect(),
                ),
            };
            holder.upsert(child);
        }

        if !record.tags().is_empty() {
            let tags = record
                .tags()
                .iter()
                .fold(Node::internal(TAGS_KEY), |node, (k, v)| {
                    node.with_child(Node::leaf(k.as_str(), v.as_str()))
                });
            holder.upsert(tags);
        }

        holder.children().to_vec()
    }
}

fn is_bucket_label(label: &str) -> bool {
    ResourceKind::network_scoped().any(|k| k.display_name() == label)
}

/// Root-level bucket label; disambiguated if a network shares the name
fn global_bucket_label(kind: ResourceKind, known: &HashSet<&str>) -> String {
    let label = kind.display_name();
    if known.contains(label) {
        format!("{} (global)", label)
    } else {
        label.to_string()
    }
}
