//! Normalized resource records
//!
//! Collectors turn raw API items into [`ResourceRecord`]s. A record is
//! immutable once built: the builder-style `with_*` methods consume it and
//! only getters are exposed afterwards.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Well-known attribute labels shared by collectors and the risk policy.
pub mod attr {
    pub const LOCATION: &str = "Location";
    pub const ENCRYPTED: &str = "Encrypted";
    pub const PUBLIC_ACCESS: &str = "Public Access";
    pub const RUNTIME: &str = "Runtime";
    pub const EXTERNAL_IP: &str = "External IP";
}

/// Kind of inventoried resource.
///
/// Declaration order is the display order of per-network buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Network,
    Instance,
    LoadBalancer,
    Function,
    Bucket,
    Topic,
    Queue,
    Stream,
    Table,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Network,
        ResourceKind::Instance,
        ResourceKind::LoadBalancer,
        ResourceKind::Function,
        ResourceKind::Bucket,
        ResourceKind::Topic,
        ResourceKind::Queue,
        ResourceKind::Stream,
        ResourceKind::Table,
    ];

    /// Kinds that get a pre-declared bucket under every network node
    pub fn network_scoped() -> impl Iterator<Item = ResourceKind> {
        Self::ALL.into_iter().filter(|k| *k != ResourceKind::Network)
    }

    /// Registry key for this kind
    pub fn key(self) -> &'static str {
        match self {
            Self::Network => "compute-networks",
            Self::Instance => "compute-instances",
            Self::LoadBalancer => "compute-forwarding-rules",
            Self::Function => "cloudfunctions-functions",
            Self::Bucket => "storage-buckets",
            Self::Topic => "pubsub-topics",
            Self::Queue => "cloudtasks-queues",
            Self::Stream => "datastream-streams",
            Self::Table => "bigtable-instances",
        }
    }

    /// Label of the bucket holding resources of this kind
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Network => "VPC Networks",
            Self::Instance => "VM Instances",
            Self::LoadBalancer => "Load Balancers",
            Self::Function => "Cloud Functions",
            Self::Bucket => "Storage Buckets",
            Self::Topic => "Pub/Sub Topics",
            Self::Queue => "Task Queues",
            Self::Stream => "Datastream Streams",
            Self::Table => "Bigtable Instances",
        }
    }

    /// Kinds whose names are only unique within a zone, region or location
    pub fn location_scoped(self) -> bool {
        matches!(
            self,
            Self::Instance | Self::LoadBalancer | Self::Function | Self::Queue | Self::Stream
        )
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Identity of a VPC network (its short name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NetworkId(String);

impl NetworkId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NetworkId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scalar leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Bool(bool),
    Number(i64),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Text(s) => f.write_str(s),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Number(n) => write!(f, "{}", n),
        }
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value)
    }
}

/// Attribute value: a single scalar or an ordered list of scalars
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Scalar(Scalar),
    List(Vec<Scalar>),
}

impl From<Scalar> for AttrValue {
    fn from(value: Scalar) -> Self {
        AttrValue::Scalar(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Scalar(value.into())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Scalar(value.into())
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Scalar(value.into())
    }
}

impl From<i64> for AttrValue {
    fn from(value: i64) -> Self {
        AttrValue::Scalar(value.into())
    }
}

impl From<Vec<Scalar>> for AttrValue {
    fn from(value: Vec<Scalar>) -> Self {
        AttrValue::List(value)
    }
}

/// One normalized cloud resource, before tree placement
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceRecord {
    kind: ResourceKind,
    id: String,
    parent_key: Option<NetworkId>,
    location: Option<String>,
    attributes: Vec<(String, AttrValue)>,
    tags: BTreeMap<String, String>,
    link: Option<String>,
    risk_flag: bool,
}

impl ResourceRecord {
    pub fn new(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            parent_key: None,
            location: None,
            attributes: Vec::new(),
            tags: BTreeMap::new(),
            link: None,
            risk_flag: false,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<NetworkId>) -> Self {
        self.parent_key = Some(parent.into());
        self
    }

    /// Zone, region or location the resource lives in
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set or replace an attribute, keeping its first position
    pub fn with_attribute(mut self, label: &str, value: impl Into<AttrValue>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(l, _)| l == label) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((label.to_string(), value)),
        }
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    pub fn flagged(mut self, risk: bool) -> Self {
        self.risk_flag = risk;
        self
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_key(&self) -> Option<&NetworkId> {
        self.parent_key.as_ref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Node label: `location/id` for location-scoped kinds, else the id
    pub fn label(&self) -> String {
        match &self.location {
            Some(location) if self.kind.location_scoped() => format!("{}/{}", location, self.id),
            _ => self.id.clone(),
        }
    }

    pub fn attributes(&self) -> &[(String, AttrValue)] {
        &self.attributes
    }

    pub fn attribute(&self, label: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    pub fn bool_attribute(&self, label: &str) -> Option<bool> {
        match self.attribute(label)? {
            AttrValue::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text_attribute(&self, label: &str) -> Option<&str> {
        match self.attribute(label)? {
            AttrValue::Scalar(Scalar::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    pub fn risk_flag(&self) -> bool {
        self.risk_flag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_keys_round_trip() {
        for kind in ResourceKind::ALL {
            assert_eq!(ResourceKind::from_key(kind.key()), Some(kind));
        }
        assert_eq!(ResourceKind::from_key("nope"), None);
    }

    #[test]
    fn test_network_scoped_excludes_network() {
        let scoped: Vec<_> = ResourceKind::network_scoped().collect();
        assert_eq!(scoped.len(), ResourceKind::ALL.len() - 1);
        assert!(!scoped.contains(&ResourceKind::Network));
    }

    #[test]
    fn test_attribute_replace_keeps_position() {
        let record = ResourceRecord::new(ResourceKind::Bucket, "b1")
            .with_attribute("A", "1")
            .with_attribute("B", "2")
            .with_attribute("A", "3");

        let labels: Vec<_> = record.attributes().iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
        assert_eq!(record.text_attribute("A"), Some("3"));
    }

    #[test]
    fn test_typed_attribute_getters() {
        let record = ResourceRecord::new(ResourceKind::Bucket, "b1")
            .with_attribute(attr::ENCRYPTED, false)
            .with_attribute(attr::LOCATION, "US");

        assert_eq!(record.bool_attribute(attr::ENCRYPTED), Some(false));
        assert_eq!(record.bool_attribute(attr::LOCATION), None);
        assert_eq!(record.text_attribute(attr::LOCATION), Some("US"));
    }

    #[test]
    fn test_label_qualifies_location_scoped_kinds() {
        let instance = ResourceRecord::new(ResourceKind::Instance, "web-1");
        assert_eq!(instance.label(), "web-1");
        assert_eq!(
            instance.with_location("us-central1-a").label(),
            "us-central1-a/web-1"
        );

        let bucket = ResourceRecord::new(ResourceKind::Bucket, "logs").with_location("US");
        assert_eq!(bucket.label(), "logs");
        assert_eq!(bucket.location(), Some("US"));
    }
}
