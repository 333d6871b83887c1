//! Tree renderers
//!
//! Both renderers walk the same pruned [`Tree`] in insertion order and
//! expose the same information: labels, values, link targets and risk
//! emphasis. Only the syntax differs.
//!
//! - [`html`] - self-contained collapsible HTML document
//! - [`text`] - indented plain-text outline with ANSI emphasis
//! - [`markup`] - typed element builder used by the HTML renderer

pub mod html;
pub mod markup;
pub mod text;

pub use html::HtmlRenderer;
pub use text::TextRenderer;

use crate::tree::{Body, Node, Tree, ROOT_LABEL};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Output format selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Collapsible HTML document
    #[default]
    Interactive,
    /// Plain-text outline
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Interactive => "html",
            OutputFormat::Text => "txt",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("link entry under `{parent}` is not part of an internal node")]
    MalformedLink { parent: String },

    #[error("formatting error: {0}")]
    Format(#[from] std::fmt::Error),
}

/// Serializes a tree into one output format
pub trait Renderer: Send + Sync {
    fn render(&self, tree: &Tree) -> Result<String, RenderError>;
}

/// Run metadata shown in the output header
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    project: Option<String>,
    generated_at: DateTime<Utc>,
}

impl ReportContext {
    pub fn new(project: Option<String>) -> Self {
        Self {
            project,
            generated_at: Utc::now(),
        }
    }

    pub fn with_timestamp(mut self, generated_at: DateTime<Utc>) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    /// Title line shared by both formats
    pub fn title(&self) -> String {
        match &self.project {
            Some(project) => format!("{} - {}", ROOT_LABEL, project),
            None => ROOT_LABEL.to_string(),
        }
    }
}

impl Default for ReportContext {
    fn default() -> Self {
        Self::new(None)
    }
}

pub fn renderer(format: OutputFormat, context: ReportContext) -> Box<dyn Renderer> {
    match format {
        OutputFormat::Interactive => Box::new(HtmlRenderer::new(context)),
        OutputFormat::Text => Box::new(TextRenderer::new(context)),
    }
}

pub fn render(tree: &Tree, format: OutputFormat, context: ReportContext) -> Result<String, RenderError> {
    renderer(format, context).render(tree)
}

/// Link nodes only ever hang off internal nodes; anywhere else the tree
/// was built wrong.
pub(crate) fn check_link_parent(parent: &Node) -> Result<(), RenderError> {
    match parent.body() {
        Body::Internal(_) => Ok(()),
        _ => Err(RenderError::MalformedLink {
            parent: parent.label().to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Interactive.extension(), "html");
        assert_eq!(OutputFormat::Text.extension(), "txt");
    }

    #[test]
    fn test_link_parent_must_be_internal() {
        assert!(check_link_parent(&Node::internal("b1")).is_ok());
        assert!(matches!(
            check_link_parent(&Node::list("values", vec![])),
            Err(RenderError::MalformedLink { parent }) if parent == "values"
        ));
    }

    #[test]
    fn test_resource_and_tag_named_url_render_as_plain_nodes() {
        use crate::resource::{ResourceKind, ResourceRecord};
        use crate::tree::URL_KEY;

        let records = vec![
            ResourceRecord::new(ResourceKind::Topic, URL_KEY),
            ResourceRecord::new(ResourceKind::Bucket, "b1").with_tag(URL_KEY, "not-a-link"),
        ];
        let tree = crate::tree::build(&records, &[]).pruned();

        let text = render(&tree, OutputFormat::Text, ReportContext::default()).unwrap();
        assert!(text.contains("+--Pub/Sub Topics\n|  +--URL\n"));
        assert!(text.contains("|  |  |  +--URL: not-a-link\n"));

        let html = render(&tree, OutputFormat::Interactive, ReportContext::default()).unwrap();
        assert!(html.contains("<li><span class=\"label\">URL</span></li>"));
        assert!(html.contains(
            "<li><span class=\"label\">URL</span>: <span class=\"value\">not-a-link</span></li>"
        ));
        assert!(!html.contains("class=\"link\""));
    }

    #[test]
    fn test_title() {
        assert_eq!(ReportContext::default().title(), "GCP Resources");
        assert_eq!(
            ReportContext::new(Some("demo".into())).title(),
            "GCP Resources - demo"
        );
    }
}
