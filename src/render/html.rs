use super::markup::{Element, Markup};
use super::{check_link_parent, RenderError, Renderer, ReportContext};
use crate::tree::{Body, Node, Tree};

/// Self-contained HTML document with inline CSS/JS and a collapsible
/// outline. Internal nodes become `<ul>` sections, list nodes `<ol>`.
pub struct HtmlRenderer {
    context: ReportContext,
}

impl HtmlRenderer {
    pub fn new(context: ReportContext) -> Self {
        Self { context }
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, tree: &Tree) -> Result<String, RenderError> {
        let root = tree.root();

        let mut outline = Element::new("ul").attr("class", "tree");
        for child in root.children() {
            outline.push(node_markup(root, child)?);
        }

        let title = self.context.title();
        let head = Element::new("head")
            .child(Element::new("meta").attr("charset", "utf-8"))
            .child(
                Element::new("meta")
                    .attr("name", "viewport")
                    .attr("content", "width=device-width,initial-scale=1"),
            )
            .child(Element::new("title").text(title.as_str()))
            .child(Element::new("style").child(Markup::Raw(STYLE)));

        let mut body = Element::new("body")
            .child(header(&self.context, &title))
            .child(
                Element::new("nav")
                    .child(Element::new("button").attr("id", "expand-all").text("Expand all"))
                    .child(Element::new("button").attr("id", "collapse-all").text("Collapse all")),
            );
        if tree.is_empty() {
            body.push(Element::new("p").attr("class", "empty").text("No resources found."));
        }
        body.push(outline);
        body.push(Element::new("script").child(Markup::Raw(SCRIPT)));

        let document = Element::new("html")
            .attr("lang", "en")
            .child(head)
            .child(body);

        Ok(document.to_document())
    }
}

fn header(context: &ReportContext, title: &str) -> Element {
    let mut meta = Element::new("p").attr("class", "meta");
    if let Some(project) = context.project() {
        meta.push(Markup::text(format!("Project: {} | ", project)));
    }
    meta.push(Markup::text(format!(
        "Generated: {}",
        context.generated_at().format("%Y-%m-%d %H:%M:%S UTC")
    )));

    Element::new("header")
        .child(Element::new("h1").text(title))
        .child(meta)
}

fn node_markup(parent: &Node, node: &Node) -> Result<Element, RenderError> {
    match node.body() {
        Body::Link(target) => {
            check_link_parent(parent)?;
            Ok(Element::new("li")
                .attr("class", "link")
                .child(label(node))
                .text(": ")
                .child(link_or_text(target)))
        }
        Body::Internal(children) => branch(node, "ul", children),
        Body::List(items) => branch(node, "ol", items),
        Body::Leaf(Some(value)) => Ok(Element::new("li")
            .child(label(node))
            .text(": ")
            .child(Element::new("span").attr("class", "value").text(value.to_string()))),
        Body::Leaf(None) => Ok(Element::new("li").child(label(node))),
    }
}

fn branch(node: &Node, list_tag: &'static str, children: &[Node]) -> Result<Element, RenderError> {
    let mut list = Element::new(list_tag);
    for child in children {
        list.push(node_markup(node, child)?);
    }

    Ok(Element::new("li").child(
        Element::new("details")
            .flag("open")
            .child(Element::new("summary").child(label(node)))
            .child(list),
    ))
}

fn label(node: &Node) -> Element {
    let class = if node.is_risk() { "risk" } else { "label" };
    Element::new("span").attr("class", class).text(node.label())
}

/// Clickable only for http(s) targets; anything else stays inert text
fn link_or_text(target: &str) -> Markup {
    match url::Url::parse(target) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Element::new("a")
            .attr("href", url.as_str())
            .attr("target", "_blank")
            .attr("rel", "noopener noreferrer")
            .text(target)
            .into(),
        _ => Markup::text(target),
    }
}

const STYLE: &str = "\
:root{--bg:#f8fafc;--text:#1e293b;--muted:#64748b;--accent:#2563eb;--risk:#dc2626;--rule:#cbd5e1}
*{box-sizing:border-box}
body{font-family:system-ui,-apple-system,sans-serif;background:var(--bg);color:var(--text);margin:0;padding:1rem 2rem;line-height:1.5}
header{border-bottom:2px solid var(--accent);margin-bottom:1rem}
h1{font-size:1.6rem;margin:.5rem 0;color:var(--accent)}
.meta{color:var(--muted);font-size:.85rem;margin:.25rem 0 .75rem}
nav{margin-bottom:1rem}
nav button{margin-right:.5rem;padding:.25rem .75rem;border:1px solid var(--rule);background:#fff;border-radius:4px;cursor:pointer}
ul,ol{margin:0;padding-left:1.25rem;border-left:1px dotted var(--rule)}
ul.tree{border-left:none;padding-left:0;list-style:none}
li{margin:.1rem 0}
summary{cursor:pointer}
.label{font-weight:600}
.value{font-family:ui-monospace,monospace}
.risk{font-weight:700;color:var(--risk)}
.link a{color:var(--accent)}
.empty{color:var(--muted);font-style:italic}
";

const SCRIPT: &str = "\
function setAll(open){document.querySelectorAll('details').forEach(d=>{d.open=open;});}
document.getElementById('expand-all').addEventListener('click',()=>setAll(true));
document.getElementById('collapse-all').addEventListener('click',()=>setAll(false));
";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ROOT_LABEL, URL_KEY};
    use chrono::TimeZone;

    fn renderer() -> HtmlRenderer {
        let at = chrono::Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        HtmlRenderer::new(ReportContext::new(Some("demo".into())).with_timestamp(at))
    }

    fn tree(children: Vec<Node>) -> Tree {
        let root = children
            .into_iter()
            .fold(Node::internal(ROOT_LABEL), Node::with_child);
        Tree::from_root(root)
    }

    #[test]
    fn test_empty_tree_is_well_formed() {
        let html = renderer().render(&Tree::new()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<ul class=\"tree\"></ul>"));
        assert!(html.contains("No resources found."));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(html.contains("Generated: 2024-05-01 12:00:00 UTC"));
    }

    #[test]
    fn test_internal_and_list_nodes() {
        let html = renderer()
            .render(&tree(vec![Node::internal("n1")
                .with_child(Node::leaf("Mode", "Custom"))
                .with_child(Node::list("Subnets", vec![Node::summary("a")]))]))
            .unwrap();

        assert!(html.contains(
            "<li><details open><summary><span class=\"label\">n1</span></summary><ul>"
        ));
        assert!(html.contains("<li><span class=\"label\">Mode</span>: <span class=\"value\">Custom</span></li>"));
        assert!(html.contains("<ol><li><span class=\"label\">a</span></li></ol>"));
    }

    #[test]
    fn test_risk_label_is_marked() {
        let html = renderer()
            .render(&tree(vec![Node::summary("b1").flagged(true), Node::summary("b2")]))
            .unwrap();
        assert!(html.contains("<span class=\"risk\">b1</span>"));
        assert!(html.contains("<span class=\"label\">b2</span>"));
    }

    #[test]
    fn test_names_are_escaped() {
        let html = renderer()
            .render(&tree(vec![Node::leaf("<b>", "\"x\" & <y>")]))
            .unwrap();
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("&quot;x&quot; &amp; &lt;y&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_url_becomes_link() {
        let html = renderer()
            .render(&tree(vec![Node::internal("b1")
                .with_child(Node::link("https://console.cloud.google.com/x?a=1&b=2"))]))
            .unwrap();
        assert!(html.contains(
            "<a href=\"https://console.cloud.google.com/x?a=1&amp;b=2\" target=\"_blank\""
        ));
    }

    #[test]
    fn test_non_http_url_is_plain_text() {
        let html = renderer()
            .render(&tree(vec![Node::internal("b1")
                .with_child(Node::link("javascript:alert(1)"))]))
            .unwrap();
        assert!(!html.contains("<a href"));
        assert!(html.contains("javascript:alert(1)"));
    }

    #[test]
    fn test_url_label_without_link_is_plain() {
        let html = renderer()
            .render(&tree(vec![Node::internal("b1")
                .with_child(Node::internal(URL_KEY).with_child(Node::summary("x")))]))
            .unwrap();
        assert!(html.contains("<summary><span class=\"label\">URL</span></summary>"));
        assert!(!html.contains("class=\"link\""));
    }

    #[test]
    fn test_link_inside_list_fails() {
        let result = renderer().render(&tree(vec![
            Node::list("Links", vec![Node::link("https://example.com")])
        ]));
        assert!(matches!(result, Err(RenderError::MalformedLink { parent }) if parent == "Links"));
    }
}
