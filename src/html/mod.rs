//! A small lenient HTML tree built on `quick-xml` tokens.
//!
//! Markdown renders to well-formed XHTML-ish markup, but raw HTML embedded by
//! authors may contain unclosed void elements (`<br>`), unquoted attributes or
//! stray end tags. The parser tolerates all of these: void elements never take
//! children, an end tag closes the nearest open element of the same name, and
//! end tags with no open counterpart are dropped.

pub mod ids;

pub use ids::{assign_block_ids, clean_inner_html, is_tracked, strip_block_ids, BlockIdAllocator};

use indexmap::IndexMap;
use quick_xml::escape::{escape, partial_escape, resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::errors::{LayoutError, Result};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Tags whose content is laid out as a block by the browser.
const BLOCK_LEVEL: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "li", "pre", "table", "thead",
    "tbody", "tr", "blockquote", "section", "figure", "figcaption",
];

pub fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

/// A node of the parsed tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    /// True for text nodes holding only whitespace.
    pub fn is_blank(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// An element with its attributes in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    /// Lowercased tag name.
    pub name: String,
    pub attrs: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attrs.insert(name.into(), value.into());
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name == name
    }

    pub fn is_heading(&self) -> bool {
        self.heading_level().is_some()
    }

    /// 1-6 for `h1`-`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        match self.name.as_str() {
            "h1" => Some(1),
            "h2" => Some(2),
            "h3" => Some(3),
            "h4" => Some(4),
            "h5" => Some(5),
            "h6" => Some(6),
            _ => None,
        }
    }

    pub fn is_block_level(&self) -> bool {
        BLOCK_LEVEL.contains(&self.name.as_str())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// First descendant (depth first, self excluded) matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> Option<&Element>
    where
        P: Fn(&Element) -> bool + Copy,
    {
        for child in self.child_elements() {
            if predicate(child) {
                return Some(child);
            }
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants matching `predicate`, in document order.
    pub fn find_all<'a, P>(&'a self, predicate: P, out: &mut Vec<&'a Element>)
    where
        P: Fn(&Element) -> bool + Copy,
    {
        for child in self.child_elements() {
            if predicate(child) {
                out.push(child);
            }
            child.find_all(predicate, out);
        }
    }

    /// Concatenated text of all descendants, as in the DOM's `textContent`.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }

    /// Whitespace-collapsed text, with `<br>` read as a line break.
    pub fn text(&self) -> String {
        let mut out = String::new();
        collect_visible_text(&self.children, &mut out);
        out.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn inner_html(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            write_node(child, self.is_raw_text(), &mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        write_element(self, &mut out);
        out
    }

    fn is_raw_text(&self) -> bool {
        RAW_TEXT_ELEMENTS.contains(&self.name.as_str())
    }
}

/// Collapses runs of whitespace to single spaces and trims the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) => collect_text(&el.children, out),
            Node::Comment(_) => {}
        }
    }
}

fn collect_visible_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element(el) if el.is("br") => out.push('\n'),
            Node::Element(el) if el.is_raw_text() => {}
            Node::Element(el) => {
                let block = el.is_block_level();
                if block && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                collect_visible_text(&el.children, out);
                if block {
                    out.push('\n');
                }
            }
            Node::Comment(_) => {}
        }
    }
}

/// Serializes a node list back to HTML.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

fn write_node(node: &Node, raw: bool, out: &mut String) {
    match node {
        Node::Element(el) => write_element(el, out),
        Node::Text(text) if raw => out.push_str(text),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
    }
}

fn write_element(el: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&el.name);
    for (name, value) in &el.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    if is_void(&el.name) {
        out.push_str(" />");
        return;
    }
    out.push('>');
    let raw = el.is_raw_text();
    for child in &el.children {
        write_node(child, raw, out);
    }
    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

/// Parses an HTML document or fragment into its top-level nodes.
///
/// Fails only when the input cannot be tokenized at all (for example an
/// unterminated tag at the end of input).
pub fn parse(html: &str) -> Result<Vec<Node>> {
    let mut reader = Reader::from_str(html);
    let config = reader.config_mut();
    config.trim_text(false);
    config.check_end_names = false;
    config.allow_unmatched_ends = true;

    let mut root: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let event = reader.read_event().map_err(|e| {
            LayoutError::Html(format!("{} at byte {}", e, reader.error_position()))
        })?;
        match event {
            Event::Start(e) => {
                let element = element_from_start(&reader, &e)?;
                if is_void(&element.name) {
                    append(&mut stack, &mut root, Node::Element(element));
                } else if element.is_raw_text() {
                    let span = reader.read_to_end(e.name()).map_err(|err| {
                        LayoutError::Html(format!("unterminated <{}>: {}", element.name, err))
                    })?;
                    let content = html
                        .get(span.start as usize..span.end as usize)
                        .unwrap_or_default();
                    let mut element = element;
                    if !content.is_empty() {
                        element.children.push(Node::Text(content.to_string()));
                    }
                    append(&mut stack, &mut root, Node::Element(element));
                } else {
                    close_implied(&mut stack, &mut root, &element.name);
                    stack.push(element);
                }
            }
            Event::Empty(e) => {
                let element = element_from_start(&reader, &e)?;
                append(&mut stack, &mut root, Node::Element(element));
            }
            Event::End(e) => {
                let name = decode_tag_name(&reader, e.name().as_ref())?;
                if let Some(pos) = stack.iter().rposition(|el| el.name == name) {
                    while stack.len() > pos {
                        close_top(&mut stack, &mut root);
                    }
                } else if !is_void(&name) {
                    log::debug!("Ignoring unmatched end tag </{}>", name);
                }
            }
            Event::Text(e) => {
                let text = e
                    .decode()
                    .map_err(|err| LayoutError::Html(format!("text decode error: {:?}", err)))?;
                push_text(&mut stack, &mut root, &text);
            }
            Event::CData(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| LayoutError::Html(format!("cdata decode error: {:?}", err)))?;
                push_text(&mut stack, &mut root, &text);
            }
            Event::GeneralRef(e) => {
                let name = e
                    .decode()
                    .map_err(|err| LayoutError::Html(format!("entity decode error: {:?}", err)))?;
                push_text(&mut stack, &mut root, &resolve_entity(&name));
            }
            Event::Comment(e) => {
                let text = reader
                    .decoder()
                    .decode(&e)
                    .map_err(|err| LayoutError::Html(format!("comment decode error: {:?}", err)))?;
                append(&mut stack, &mut root, Node::Comment(text.into_owned()));
            }
            Event::Eof => break,
            // Doctype, processing instructions and XML declarations carry no content.
            _ => {}
        }
    }

    while !stack.is_empty() {
        close_top(&mut stack, &mut root);
    }
    Ok(root)
}

/// Parses a fragment expected to hold exactly one root element, ignoring
/// surrounding whitespace.
pub fn parse_element(html: &str) -> Result<Element> {
    parse(html)?
        .into_iter()
        .find_map(|node| match node {
            Node::Element(el) => Some(el),
            _ => None,
        })
        .ok_or_else(|| LayoutError::Html("fragment contains no element".to_string()))
}

fn append(stack: &mut [Element], root: &mut Vec<Node>, node: Node) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => root.push(node),
    }
}

fn close_top(stack: &mut Vec<Element>, root: &mut Vec<Node>) {
    if let Some(element) = stack.pop() {
        append(stack, root, Node::Element(element));
    }
}

/// Closes an open sibling whose end tag HTML lets authors omit, such as the
/// previous `li` when the next one starts. The search stops at the nearest
/// element that scopes the group (the enclosing list or table).
fn close_implied(stack: &mut Vec<Element>, root: &mut Vec<Node>, name: &str) {
    let (group, scope): (&[&str], &[&str]) = match name {
        "li" => (&["li"], &["ul", "ol"]),
        "td" | "th" => (&["td", "th"], &["tr", "table"]),
        "tr" => (&["tr"], &["thead", "tbody", "tfoot", "table"]),
        _ => return,
    };
    let open = stack.iter().rposition(|el| group.contains(&el.name.as_str()));
    let boundary = stack.iter().rposition(|el| scope.contains(&el.name.as_str()));
    if let Some(pos) = open {
        if boundary.map_or(true, |b| b < pos) {
            while stack.len() > pos {
                close_top(stack, root);
            }
        }
    }
}

fn push_text(stack: &mut [Element], root: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match stack.last_mut() {
        Some(parent) => &mut parent.children,
        None => root,
    };
    if let Some(Node::Text(previous)) = siblings.last_mut() {
        previous.push_str(text);
    } else {
        siblings.push(Node::Text(text.to_string()));
    }
}

fn decode_tag_name(reader: &Reader<&[u8]>, raw: &[u8]) -> Result<String> {
    let decoded = reader
        .decoder()
        .decode(raw)
        .map_err(|err| LayoutError::Html(format!("tag name decode error: {:?}", err)))?;
    Ok(decoded.to_ascii_lowercase())
}

fn element_from_start(reader: &Reader<&[u8]>, e: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(decode_tag_name(reader, e.name().as_ref())?);
    for attr in e.html_attributes().flatten() {
        let key = match reader.decoder().decode(attr.key.as_ref()) {
            Ok(v) => v.to_ascii_lowercase(),
            Err(_) => continue,
        };
        let raw = match reader.decoder().decode(&attr.value) {
            Ok(v) => v.into_owned(),
            Err(_) => continue,
        };
        let value = match unescape_with(&raw, resolve_named) {
            Ok(v) => v.into_owned(),
            Err(_) => raw,
        };
        element.attrs.insert(key, value);
    }
    Ok(element)
}

/// Named HTML5 entity lookup. quick-xml's table maps the lowercase Greek
/// letters alpha to omicron to `;`, so those are answered here.
fn resolve_named(name: &str) -> Option<&'static str> {
    let greek = match name {
        "alpha" => "\u{3b1}",
        "beta" => "\u{3b2}",
        "gamma" => "\u{3b3}",
        "delta" => "\u{3b4}",
        "epsilon" => "\u{3b5}",
        "epsiv" | "varepsilon" => "\u{3f5}",
        "zeta" => "\u{3b6}",
        "eta" => "\u{3b7}",
        "theta" => "\u{3b8}",
        "iota" => "\u{3b9}",
        "kappa" => "\u{3ba}",
        "lambda" => "\u{3bb}",
        "mu" => "\u{3bc}",
        "nu" => "\u{3bd}",
        "xi" => "\u{3be}",
        "omicron" => "\u{3bf}",
        _ => return resolve_html5_entity(name),
    };
    Some(greek)
}

/// Resolves the name of an `&name;` reference (named HTML5 entities and
/// numeric character references) to its text. Unknown names are kept
/// verbatim.
fn resolve_entity(name: &str) -> String {
    let reference = format!("&{};", name);
    match unescape_with(&reference, resolve_named) {
        Ok(text) => text.into_owned(),
        Err(_) => reference,
    }
}
