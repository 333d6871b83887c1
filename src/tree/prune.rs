//! Tree pruning
//!
//! Bottom-up removal of internal and list nodes left without children.
//! The root itself is always kept, so an empty inventory prunes to a root
//! with no children.

use super::{Node, Tree};

/// Remove every empty branch. Idempotent.
pub fn prune(mut tree: Tree) -> Tree {
    prune_children(tree.root_mut());
    tree
}

fn prune_children(node: &mut Node) {
    let Some(children) = node.children_mut() else {
        return;
    };

    for child in children.iter_mut() {
        prune_children(child);
    }
    children.retain(|child| !child.is_empty_branch());
}
