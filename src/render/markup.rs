//! Minimal typed HTML builder
//!
//! Documents are assembled as [`Element`] values and serialized once. Text
//! and attribute values are always escaped; unescaped content is limited to
//! `&'static str` so runtime data can never reach the output raw.

/// A node in an HTML document
#[derive(Debug, Clone, PartialEq)]
pub enum Markup {
    Element(Element),
    Text(String),
    /// Trusted static content (inline CSS and script)
    Raw(&'static str),
}

impl Markup {
    pub fn text(text: impl Into<String>) -> Self {
        Markup::Text(text.into())
    }
}

impl From<Element> for Markup {
    fn from(element: Element) -> Self {
        Markup::Element(element)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: &'static str,
    attrs: Vec<(&'static str, Option<String>)>,
    children: Vec<Markup>,
}

/// Elements serialized without a closing tag
const VOID_TAGS: &[&str] = &["meta", "br", "hr", "img", "input", "link"];

impl Element {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, Some(value.into())));
        self
    }

    /// Boolean attribute such as `open`
    pub fn flag(mut self, name: &'static str) -> Self {
        self.attrs.push((name, None));
        self
    }

    pub fn child(mut self, child: impl Into<Markup>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(Markup::text(text))
    }

    pub fn push(&mut self, child: impl Into<Markup>) {
        self.children.push(child.into());
    }

    pub fn write_to(&self, out: &mut String) {
        out.push('<');
        out.push_str(self.tag);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if let Some(value) = value {
                out.push_str("=\"");
                escape_into(out, value);
                out.push('"');
            }
        }
        out.push('>');

        if VOID_TAGS.contains(&self.tag) {
            return;
        }

        for child in &self.children {
            match child {
                Markup::Element(element) => element.write_to(out),
                Markup::Text(text) => escape_into(out, text),
                Markup::Raw(raw) => out.push_str(raw),
            }
        }

        out.push_str("</");
        out.push_str(self.tag);
        out.push('>');
    }

    /// Serialize as a complete HTML5 document
    pub fn to_document(&self) -> String {
        let mut out = String::with_capacity(16_384);
        out.push_str("<!DOCTYPE html>\n");
        self.write_to(&mut out);
        out.push('\n');
        out
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut out = String::new();
        self.write_to(&mut out);
        f.write_str(&out)
    }
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_attributes_are_escaped() {
        let element = Element::new("a")
            .attr("href", "https://x/?a=1&b=\"2\"")
            .text("<script>alert('x')</script>");
        assert_eq!(
            element.to_string(),
            "<a href=\"https://x/?a=1&amp;b=&quot;2&quot;\">&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</a>"
        );
    }

    #[test]
    fn test_flags_and_void_tags() {
        let element = Element::new("details")
            .flag("open")
            .child(Element::new("meta").attr("charset", "utf-8"));
        assert_eq!(
            element.to_string(),
            "<details open><meta charset=\"utf-8\"></details>"
        );
    }

    #[test]
    fn test_raw_is_not_escaped() {
        let element = Element::new("style").child(Markup::Raw("a>b{}"));
        assert_eq!(element.to_string(), "<style>a>b{}</style>");
    }

    #[test]
    fn test_document_prefix() {
        let doc = Element::new("html").to_document();
        assert!(doc.starts_with("<!DOCTYPE html>\n<html>"));
    }
}
