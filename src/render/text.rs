use super::{check_link_parent, RenderError, Renderer, ReportContext};
use crate::tree::{Body, Node, Tree};
use std::borrow::Cow;
use std::fmt::Write;

/// Repeated once per depth level
pub const INDENT: &str = "|  ";

/// Precedes every node label
pub const BRANCH: &str = "+--";

/// Bold red
pub const RISK_START: &str = "\x1b[1;31m";

pub const RISK_RESET: &str = "\x1b[0m";

/// Indented plain-text outline: a title line, then one line per node
pub struct TextRenderer {
    context: ReportContext,
}

impl TextRenderer {
    pub fn new(context: ReportContext) -> Self {
        Self { context }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, tree: &Tree) -> Result<String, RenderError> {
        let mut out = String::with_capacity(4_096);
        writeln!(out, "{}", escape_controls(&self.context.title()))?;

        let root = tree.root();
        for child in root.children() {
            write_node(&mut out, root, child, 0)?;
        }

        Ok(out)
    }
}

fn write_node(out: &mut String, parent: &Node, node: &Node, depth: usize) -> Result<(), RenderError> {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
    out.push_str(BRANCH);
    write_label(out, node);

    match node.body() {
        Body::Link(target) => {
            check_link_parent(parent)?;
            writeln!(out, ": {}", escape_controls(target))?;
        }
        Body::Leaf(Some(value)) => writeln!(out, ": {}", escape_controls(&value.to_string()))?,
        Body::Leaf(None) => out.push('\n'),
        Body::Internal(children) | Body::List(children) => {
            out.push('\n');
            for child in children {
                write_node(out, node, child, depth + 1)?;
            }
        }
    }

    Ok(())
}

fn write_label(out: &mut String, node: &Node) {
    let label = escape_controls(node.label());
    if node.is_risk() {
        out.push_str(RISK_START);
        out.push_str(&label);
        out.push_str(RISK_RESET);
    } else {
        out.push_str(&label);
    }
}

/// Control characters (newlines, ESC) would break the outline or forge
/// emphasis, so they are written as Rust-style escapes
fn escape_controls(s: &str) -> Cow<'_, str> {
    if !s.chars().any(char::is_control) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 8);
    for c in s.chars() {
        if c.is_control() {
            escaped.extend(c.escape_default());
        } else {
            escaped.push(c);
        }
    }
    Cow::Owned(escaped)
}
