//! Resource tree
//!
//! The single source of truth both renderers consume. A [`Node`] is either
//! an internal node with uniquely labeled children, a list node with ordered
//! anonymous siblings, or a leaf. Child order is insertion order.
//!
//! # Module Structure
//!
//! - [`builder`] - folds resource records into a [`Tree`]
//! - [`prune`] - removes empty branches
//! - [`risk`] - per-kind risk policy
//! - [`links`] - console deep-link derivation

pub mod builder;
pub mod links;
pub mod prune;
pub mod risk;

pub use builder::{build, TreeBuilder};
pub use links::ConsoleLinks;
pub use prune::prune;
pub use risk::RiskPolicy;

use crate::resource::Scalar;

/// Label of the link node the builder attaches to resources and networks
pub const URL_KEY: &str = "URL";

/// Label of the child holding a resource's tags
pub const TAGS_KEY: &str = "Tags";

/// Label of the root node
pub const ROOT_LABEL: &str = "GCP Resources";

/// Shape of a node
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// Named children, unique by label
    Internal(Vec<Node>),
    /// Ordered siblings of the same kind
    List(Vec<Node>),
    /// A scalar value, or `None` for a bare summary line
    Leaf(Option<Scalar>),
    /// Console link target, always labeled [`URL_KEY`]
    Link(String),
}

/// A labeled tree node
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    label: String,
    risk: bool,
    body: Body,
}

impl Node {
    pub fn internal(label: impl Into<String>) -> Self {
        Self::with_body(label, Body::Internal(Vec::new()))
    }

    pub fn list(label: impl Into<String>, items: Vec<Node>) -> Self {
        Self::with_body(label, Body::List(items))
    }

    pub fn leaf(label: impl Into<String>, value: impl Into<Scalar>) -> Self {
        Self::with_body(label, Body::Leaf(Some(value.into())))
    }

    /// Leaf that renders as its label alone
    pub fn summary(label: impl Into<String>) -> Self {
        Self::with_body(label, Body::Leaf(None))
    }

    /// Console link entry of a resource or network
    pub fn link(target: impl Into<String>) -> Self {
        Self::with_body(URL_KEY, Body::Link(target.into()))
    }

    fn with_body(label: impl Into<String>, body: Body) -> Self {
        Self {
            label: label.into(),
            risk: false,
            body,
        }
    }

    pub fn flagged(mut self, risk: bool) -> Self {
        self.risk = risk;
        self
    }

    pub(crate) fn set_risk(&mut self, risk: bool) {
        self.risk = risk;
    }

    /// Add or replace a child of an internal node (see [`Node::upsert`])
    pub fn with_child(mut self, child: Node) -> Self {
        self.upsert(child);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_risk(&self) -> bool {
        self.risk
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.body, Body::Leaf(_) | Body::Link(_))
    }

    /// Children of an internal or list node; empty for leaves
    pub fn children(&self) -> &[Node] {
        match &self.body {
            Body::Internal(children) | Body::List(children) => children,
            Body::Leaf(_) | Body::Link(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.body {
            Body::Internal(children) | Body::List(children) => Some(children),
            Body::Leaf(_) | Body::Link(_) => None,
        }
    }

    /// Child of an internal node by label
    pub fn child(&self, label: &str) -> Option<&Node> {
        match &self.body {
            Body::Internal(children) => children.iter().find(|c| c.label == label),
            _ => None,
        }
    }

    pub(crate) fn child_mut(&mut self, label: &str) -> Option<&mut Node> {
        match &mut self.body {
            Body::Internal(children) => children.iter_mut().find(|c| c.label == label),
            _ => None,
        }
    }

    /// Insert `child` into an internal node. A child with the same label is
    /// replaced in place (last write wins, first position kept) and returned.
    /// Non-internal nodes are left untouched and hand the child back.
    pub fn upsert(&mut self, child: Node) -> Option<Node> {
        let Body::Internal(children) = &mut self.body else {
            return Some(child);
        };

        match children.iter_mut().find(|c| c.label == child.label) {
            Some(slot) => Some(std::mem::replace(slot, child)),
            None => {
                children.push(child);
                None
            }
        }
    }

    /// Internal or list node without children
    pub fn is_empty_branch(&self) -> bool {
        match &self.body {
            Body::Internal(children) | Body::List(children) => children.is_empty(),
            Body::Leaf(_) | Body::Link(_) => false,
        }
    }

    /// Label paths (excluding this node) of every descendant labeled `label`
    pub fn locate(&self, label: &str) -> Vec<Vec<String>> {
        let mut found = Vec::new();
        let mut path = Vec::new();
        locate_in(self, label, &mut path, &mut found);
        found
    }

    /// Number of nodes in this subtree, this node included
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(Node::node_count).sum::<usize>()
    }

    /// Number of risk-flagged nodes in this subtree, this node included
    pub fn risk_count(&self) -> usize {
        usize::from(self.risk) + self.children().iter().map(Node::risk_count).sum::<usize>()
    }
}

fn locate_in(node: &Node, label: &str, path: &mut Vec<String>, found: &mut Vec<Vec<String>>) {
    for child in node.children() {
        path.push(child.label.clone());
        if child.label == label {
            found.push(path.clone());
        }
        locate_in(child, label, path, found);
        path.pop();
    }
}

/// A rooted resource tree
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    root: Node,
}

impl Tree {
    pub fn new() -> Self {
        Self {
            root: Node::internal(ROOT_LABEL),
        }
    }

    pub(crate) fn from_root(root: Node) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub(crate) fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children().is_empty()
    }

    /// Follow a path of labels from the root
    pub fn find(&self, path: &[&str]) -> Option<&Node> {
        path.iter()
            .try_fold(&self.root, |node, label| node.child(label))
    }

    /// Drop empty branches (see [`prune`])
    pub fn pruned(self) -> Self {
        prune(self)
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut node = Node::internal("bucket");
        node.upsert(Node::leaf("a", "1"));
        node.upsert(Node::leaf("b", "2"));
        let previous = node.upsert(Node::leaf("a", "3"));

        assert_eq!(previous, Some(Node::leaf("a", "1")));
        let labels: Vec<_> = node.children().iter().map(Node::label).collect();
        assert_eq!(labels, vec!["a", "b"]);
        assert_eq!(node.child("a"), Some(&Node::leaf("a", "3")));
    }

    #[test]
    fn test_upsert_on_leaf_hands_child_back() {
        let mut leaf = Node::summary("x");
        let child = Node::summary("y");
        assert_eq!(leaf.upsert(child.clone()), Some(child));
        assert!(leaf.children().is_empty());
    }

    #[test]
    fn test_list_children_are_not_addressable_by_label() {
        let list = Node::list("ports", vec![Node::summary("80")]);
        assert_eq!(list.children().len(), 1);
        assert!(list.child("80").is_none());
    }

    #[test]
    fn test_locate_and_find() {
        let root = Node::internal(ROOT_LABEL)
            .with_child(Node::internal("net-a").with_child(Node::summary("x")))
            .with_child(Node::internal("net-b").with_child(Node::summary("x")));
        let tree = Tree::from_root(root);

        assert_eq!(
            tree.root().locate("x"),
            vec![
                vec!["net-a".to_string(), "x".to_string()],
                vec!["net-b".to_string(), "x".to_string()]
            ]
        );
        assert!(tree.find(&["net-b", "x"]).is_some());
        assert!(tree.find(&["net-c"]).is_none());
    }

    #[test]
    fn test_link_is_a_leaf_distinct_from_a_url_label() {
        let link = Node::link("https://example.com");
        let named = Node::summary(URL_KEY);

        assert_eq!(link.label(), URL_KEY);
        assert!(link.is_leaf());
        assert!(!link.is_empty_branch());
        assert_ne!(link, named);
        assert_eq!(link.body(), &Body::Link("https://example.com".into()));
    }

    #[test]
    fn test_counts() {
        let node = Node::internal("r")
            .with_child(Node::summary("a").flagged(true))
            .with_child(Node::list("l", vec![Node::summary("b")]));
        assert_eq!(node.node_count(), 4);
        assert_eq!(node.risk_count(), 1);
    }
}
