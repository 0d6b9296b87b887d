//! Document tree – the element tree the renderer builds, plus a small HTML
//! reader and writer for it.
//!
//! Supported elements:
//! - Structural: div, p, h1-h4, table, tr, td, th, img
//! - Inline: span
//! - Styling via `class` and `style` attributes
//!
//! The writer and the reader are inverse to each other for every tree the
//! renderer produces, which is what export isolation relies on: the live
//! tree is written out and read back as an independent copy.

use std::collections::BTreeMap;
use std::fmt::Write as _;

// ---------------------------------------------------------------------------
// DOM types
// ---------------------------------------------------------------------------

/// The tag name of a supported element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    Div,
    P,
    H1,
    H2,
    H3,
    H4,
    Table,
    Tr,
    Td,
    Th,
    Span,
    Img,
    Body,
    Html,
    Head,
    /// Kept in the tree but never displayed.
    Unknown(String),
}

impl Tag {
    pub fn from_name(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "div" => Tag::Div,
            "p" => Tag::P,
            "h1" => Tag::H1,
            "h2" => Tag::H2,
            "h3" => Tag::H3,
            "h4" => Tag::H4,
            "table" => Tag::Table,
            "tr" => Tag::Tr,
            "td" => Tag::Td,
            "th" => Tag::Th,
            "span" => Tag::Span,
            "img" => Tag::Img,
            "body" => Tag::Body,
            "html" => Tag::Html,
            "head" => Tag::Head,
            _ => Tag::Unknown(s.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tag::Div => "div",
            Tag::P => "p",
            Tag::H1 => "h1",
            Tag::H2 => "h2",
            Tag::H3 => "h3",
            Tag::H4 => "h4",
            Tag::Table => "table",
            Tag::Tr => "tr",
            Tag::Td => "td",
            Tag::Th => "th",
            Tag::Span => "span",
            Tag::Img => "img",
            Tag::Body => "body",
            Tag::Html => "html",
            Tag::Head => "head",
            Tag::Unknown(name) => name,
        }
    }

    /// Elements whose inline children are merged into one wrapped text run.
    pub fn is_paragraph(&self) -> bool {
        matches!(self, Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::H4)
    }

    fn is_void(&self) -> bool {
        matches!(self, Tag::Img)
    }
}

/// A node in our DOM tree.
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    Element(ElementNode),
    Text(String),
}

/// An element node carrying tag, attributes, and children.
///
/// Attributes are kept sorted so that writing a tree is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub tag: Tag,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<DomNode>,
}

impl ElementNode {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn classes(&self) -> Vec<&str> {
        self.attributes
            .get("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }

    pub fn inline_style(&self) -> Option<&str> {
        self.attributes.get("style").map(|s| s.as_str())
    }

    pub fn src(&self) -> Option<&str> {
        self.attributes
            .get("src")
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").map(|s| s.as_str())
    }

    // -- builder helpers used by the renderer --------------------------------

    /// Set the class list. Empty class strings leave the attribute absent.
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        let joined = class.as_ref().split_whitespace().collect::<Vec<_>>().join(" ");
        if !joined.is_empty() {
            self.attributes.insert("class".to_string(), joined);
        }
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }

    pub fn child(mut self, node: impl Into<DomNode>) -> Self {
        self.children.push(node.into());
        self
    }

    /// Append an optional child; `None` leaves no trace in the tree.
    pub fn child_opt(mut self, node: Option<impl Into<DomNode>>) -> Self {
        if let Some(node) = node {
            self.children.push(node.into());
        }
        self
    }

    pub fn children<I, N>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<DomNode>,
    {
        self.children.extend(nodes.into_iter().map(Into::into));
        self
    }

    /// Append a text child. Empty strings add nothing.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.is_empty() {
            self.children.push(DomNode::Text(text));
        }
        self
    }

    /// Concatenated text of the whole subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl From<ElementNode> for DomNode {
    fn from(e: ElementNode) -> Self {
        DomNode::Element(e)
    }
}

/// Shorthand for `ElementNode::new(tag).class(class)`.
pub fn el(tag: Tag, class: impl AsRef<str>) -> ElementNode {
    ElementNode::new(tag).class(class)
}

fn collect_text(nodes: &[DomNode], out: &mut String) {
    for node in nodes {
        match node {
            DomNode::Text(t) => out.push_str(t),
            DomNode::Element(e) => collect_text(&e.children, out),
        }
    }
}

// ---------------------------------------------------------------------------
// Tree queries
// ---------------------------------------------------------------------------

/// Depth-first search for the element with the given `id` attribute.
pub fn find_by_id<'a>(nodes: &'a [DomNode], id: &str) -> Option<&'a ElementNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.id() == Some(id) {
                return Some(e);
            }
            if let Some(found) = find_by_id(&e.children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// All `<img>` elements in document order.
pub fn images(nodes: &[DomNode]) -> Vec<&ElementNode> {
    let mut out = Vec::new();
    walk(nodes, &mut |e| {
        if e.tag == Tag::Img {
            out.push(e);
        }
    });
    out
}

/// Visit every `<img>` mutably, in document order.
pub fn for_each_image_mut(nodes: &mut [DomNode], f: &mut impl FnMut(&mut ElementNode)) {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Img {
                f(e);
            }
            for_each_image_mut(&mut e.children, f);
        }
    }
}

fn walk<'a>(nodes: &'a [DomNode], f: &mut impl FnMut(&'a ElementNode)) {
    for node in nodes {
        if let DomNode::Element(e) = node {
            f(e);
            walk(&e.children, f);
        }
    }
}

// ---------------------------------------------------------------------------
// Writer
// ---------------------------------------------------------------------------

/// Serialise nodes as HTML. Text and attribute values are escaped.
pub fn to_html(nodes: &[DomNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, &mut out);
    }
    out
}

fn write_node(node: &DomNode, out: &mut String) {
    match node {
        DomNode::Text(t) => out.push_str(&escape(t, false)),
        DomNode::Element(e) => {
            let _ = write!(out, "<{}", e.tag.name());
            for (k, v) in &e.attributes {
                let _ = write!(out, " {}=\"{}\"", k, escape(v, true));
            }
            if e.tag.is_void() {
                out.push_str(" />");
                return;
            }
            out.push('>');
            for child in &e.children {
                write_node(child, out);
            }
            let _ = write!(out, "</{}>", e.tag.name());
        }
    }
}

fn escape(s: &str, attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\'' if attribute => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Parser – simple recursive descent over HTML
// ---------------------------------------------------------------------------

/// Parse an HTML string into a list of DOM nodes.
///
/// Hand-written for the controlled subset the renderer emits.
pub fn parse_html(html: &str) -> Vec<DomNode> {
    let mut parser = Parser::new(html);
    parser.parse_nodes()
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn parse_nodes(&mut self) -> Vec<DomNode> {
        let mut nodes = Vec::new();
        loop {
            self.skip_whitespace_preserve();
            if self.eof() || self.starts_with("</") {
                break;
            }
            if let Some(node) = self.parse_node() {
                nodes.push(node);
            }
        }
        nodes
    }

    fn parse_node(&mut self) -> Option<DomNode> {
        if self.starts_with("<!--") {
            self.skip_comment();
            return None;
        }
        if self.starts_with("<!") || self.starts_with("<?") {
            // doctype / processing instruction
            while !self.eof() && !self.starts_with(">") {
                self.advance(1);
            }
            if !self.eof() {
                self.advance(1);
            }
            return None;
        }
        if self.starts_with("<") {
            Some(self.parse_element())
        } else {
            Some(self.parse_text())
        }
    }

    fn parse_text(&mut self) -> DomNode {
        let start = self.pos;
        while !self.eof() && !self.starts_with("<") {
            self.advance(1);
        }
        DomNode::Text(decode_entities(&self.input[start..self.pos]))
    }

    fn parse_element(&mut self) -> DomNode {
        self.advance(1); // '<'
        let tag_name = self.parse_tag_name();
        let tag = Tag::from_name(&tag_name);
        let mut elem = ElementNode::new(tag.clone());

        loop {
            self.skip_whitespace();
            if self.eof() || self.starts_with(">") || self.starts_with("/>") {
                break;
            }
            let (key, value) = self.parse_attribute();
            if key.is_empty() {
                // Stray character in the tag; skip it rather than loop.
                self.advance(1);
                continue;
            }
            elem.attributes.insert(key, value);
        }

        if self.starts_with("/>") {
            self.advance(2);
            return DomNode::Element(elem);
        }
        if self.starts_with(">") {
            self.advance(1);
        }
        if tag.is_void() {
            return DomNode::Element(elem);
        }

        elem.children = self.parse_nodes();

        if self.starts_with("</") {
            self.advance(2);
            self.parse_tag_name();
            self.skip_whitespace();
            if self.starts_with(">") {
                self.advance(1);
            }
        }

        DomNode::Element(elem)
    }

    fn parse_tag_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                self.advance(1);
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_attribute(&mut self) -> (String, String) {
        let key = self.parse_tag_name();
        self.skip_whitespace();
        if !self.starts_with("=") {
            return (key, String::new());
        }
        self.advance(1);
        self.skip_whitespace();
        let value = self.parse_attr_value();
        (key, value)
    }

    fn parse_attr_value(&mut self) -> String {
        for quote in ["\"", "'"] {
            if self.starts_with(quote) {
                self.advance(1);
                let start = self.pos;
                while !self.eof() && !self.starts_with(quote) {
                    self.advance(1);
                }
                let val = self.input[start..self.pos].to_string();
                if !self.eof() {
                    self.advance(1);
                }
                return decode_entities(&val);
            }
        }
        let start = self.pos;
        while let Some(c) = self.current_char() {
            if c.is_whitespace() || c == '>' || c == '/' {
                break;
            }
            self.advance(1);
        }
        self.input[start..self.pos].to_string()
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance(1);
        }
    }

    /// Skip whitespace-only runs between tags; keep it when text follows.
    fn skip_whitespace_preserve(&mut self) {
        let saved = self.pos;
        self.skip_whitespace();
        if !self.eof() && !self.starts_with("<") {
            self.pos = saved;
        }
    }

    fn skip_comment(&mut self) {
        self.advance(4);
        while !self.eof() && !self.starts_with("-->") {
            self.advance(1);
        }
        if !self.eof() {
            self.advance(3);
        }
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn current_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self, n: usize) {
        for _ in 0..n {
            if let Some(c) = self.current_char() {
                self.pos += c.len_utf8();
            }
        }
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{00A0}")
        .replace("&amp;", "&")
}

/// Find the `<body>` element and return its children, or return all nodes if
/// no `<body>` is present.
pub fn body_children(nodes: &[DomNode]) -> Vec<DomNode> {
    for node in nodes {
        if let DomNode::Element(e) = node {
            if e.tag == Tag::Body {
                return e.children.clone();
            }
            if e.tag == Tag::Html {
                let inner = body_children(&e.children);
                if !inner.is_empty() {
                    return inner;
                }
            }
        }
    }
    nodes.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_div() {
        let html = r#"<div class="flex p-4"><p>Hello</p></div>"#;
        let nodes = parse_html(html);
        assert_eq!(nodes.len(), 1);
        if let DomNode::Element(e) = &nodes[0] {
            assert_eq!(e.tag, Tag::Div);
            assert_eq!(e.classes(), vec!["flex", "p-4"]);
            assert_eq!(e.children.len(), 1);
        } else {
            panic!("Expected element");
        }
    }

    #[test]
    fn parse_self_closing_img() {
        let nodes = parse_html(r#"<img src="logo.png" />"#);
        assert_eq!(nodes.len(), 1);
        if let DomNode::Element(e) = &nodes[0] {
            assert_eq!(e.tag, Tag::Img);
            assert_eq!(e.src(), Some("logo.png"));
        } else {
            panic!("Expected img element");
        }
    }

    #[test]
    fn parse_nested_spans() {
        let nodes = parse_html(r#"<p>Hello <span class="font-bold">world</span>!</p>"#);
        if let DomNode::Element(e) = &nodes[0] {
            assert_eq!(e.tag, Tag::P);
            assert_eq!(e.children.len(), 3);
        } else {
            panic!("Expected p element");
        }
    }

    #[test]
    fn builder_skips_empty_parts() {
        let node = el(Tag::Div, "  ").text("").child_opt(None::<ElementNode>);
        assert!(node.attributes.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn writer_and_reader_agree() {
        let tree: Vec<DomNode> = vec![el(Tag::Div, "flex justify-between")
            .attr("id", "invoice-preview")
            .child(el(Tag::P, "whitespace-pre-line").text("A & B <Co>\n\"Line 2\""))
            .child(el(Tag::Img, "h-16").attr("src", "data:image/png;base64,AAAA"))
            .child(el(Tag::Span, "").text("x"))
            .into()];
        let html = to_html(&tree);
        assert!(html.contains("A &amp; B &lt;Co&gt;"));
        assert_eq!(parse_html(&html), tree);
    }

    #[test]
    fn queries() {
        let tree: Vec<DomNode> = vec![el(Tag::Div, "")
            .attr("id", "root")
            .child(el(Tag::Img, "").attr("src", "a.png"))
            .child(el(Tag::Div, "").child(el(Tag::Img, "").attr("src", "b.png")))
            .into()];
        let srcs: Vec<_> = images(&tree).iter().filter_map(|i| i.src()).collect();
        assert_eq!(srcs, vec!["a.png", "b.png"]);
        assert!(find_by_id(&tree, "root").is_some());
        assert!(find_by_id(&tree, "missing").is_none());
    }
}
