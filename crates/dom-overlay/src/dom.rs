//! Arena-backed model of the live page.
//!
//! Nodes are never freed; a removed node simply loses its parent and becomes
//! unreachable from the body, which is what "not live" means here.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use bitflags::bitflags;

use crate::text::{byte_index, char_len};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

bitflags! {
    /// Interaction handlers attached to an element.
    #[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
    pub struct Handlers: u8 {
        const POINTER_ENTER = 0b0001;
        const POINTER_LEAVE = 0b0010;
        const CLICK = 0b0100;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Notifications the page would fire; drained by whoever drives the session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DomEvent {
    Input { target: NodeId },
}

#[derive(Clone, Debug, Default)]
pub struct ElementData {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    /// Form-control value; `None` for non-controls.
    pub value: Option<String>,
    pub rect: Option<Rect>,
    pub handlers: Handlers,
    /// Back-reference from an overlay to the control it decorates.
    pub overlay_owner: Option<NodeId>,
}

#[derive(Clone, Debug, Default)]
pub struct TextData {
    pub text: String,
    /// Set on pieces produced by splitting one text node; pieces with the
    /// same origin are merged back together when highlights are removed.
    pub split_origin: Option<NodeId>,
}

#[derive(Clone, Debug)]
pub enum NodeData {
    Element(ElementData),
    Text(TextData),
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    host: String,
    events: Vec<DomEvent>,
}

impl Document {
    pub fn new(host: impl Into<String>) -> Self {
        let mut doc = Self {
            nodes: Vec::new(),
            body: NodeId(0),
            host: host.into(),
            events: Vec::new(),
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let value = matches!(tag, "input" | "textarea").then(String::new);
        self.push(NodeData::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            value,
            ..ElementData::default()
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeData::Text(TextData {
            text: text.into(),
            split_origin: None,
        }))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    // --- tree structure -------------------------------------------------

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_before(parent, child, None);
    }

    /// Inserts `child` under `parent` before `reference`, or last when
    /// `reference` is `None` or not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: Option<NodeId>) {
        self.detach(child);
        let siblings = &mut self.nodes[parent.0].children;
        let position = reference
            .and_then(|r| siblings.iter().position(|c| *c == r))
            .unwrap_or(siblings.len());
        siblings.insert(position, child);
        self.nodes[child.0].parent = Some(parent);
    }

    pub fn insert_after(&mut self, node: NodeId, new_node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let next = self.next_sibling(node);
        self.insert_before(parent, new_node, next);
        true
    }

    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|c| *c == node)?;
        siblings.get(idx + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let siblings = self.children(parent);
        let idx = siblings.iter().position(|c| *c == node)?;
        idx.checked_sub(1).map(|i| siblings[i])
    }

    /// Whether `node` is reachable from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Descendants of `root` in document order, `root` excluded.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn text_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.is_text(*id))
            .collect()
    }

    pub fn query_all(&self, root: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| pred(self, *id))
            .collect()
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest(&self, node: NodeId, pred: impl Fn(&Document, NodeId) -> bool) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if pred(self, id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }

    // --- node data ------------------------------------------------------

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.0].data, NodeData::Text(_))
    }

    pub fn element(&self, node: NodeId) -> Option<&ElementData> {
        match &self.nodes[node.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[node.0].data {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    pub fn tag(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.tag.as_str())
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => Some(t.text.as_str()),
            NodeData::Element(_) => None,
        }
    }

    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        if let NodeData::Text(t) = &mut self.nodes[node.0].data {
            t.text = text.into();
        }
    }

    pub fn split_origin(&self, node: NodeId) -> Option<NodeId> {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => t.split_origin,
            NodeData::Element(_) => None,
        }
    }

    pub fn set_split_origin(&mut self, node: NodeId, origin: Option<NodeId>) {
        if let NodeData::Text(t) = &mut self.nodes[node.0].data {
            t.split_origin = origin;
        }
    }

    /// DOM `splitText`: keeps `[0, offset)` in `node` and moves the rest into
    /// a new following sibling. Both pieces are tagged with a shared origin.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Option<NodeId> {
        let text = self.text(node)?.to_string();
        if offset == 0 || offset >= char_len(&text) {
            return None;
        }
        let at = byte_index(&text, offset);
        let origin = self.split_origin(node).unwrap_or(node);
        let tail = self.create_text(&text[at..]);
        self.set_text(node, &text[..at]);
        self.set_split_origin(node, Some(origin));
        self.set_split_origin(tail, Some(origin));
        if self.parent(node).is_some() {
            self.insert_after(node, tail);
        }
        Some(tail)
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attrs.remove(name);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .map(|list| list.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let joined = match self.attr(node, "class") {
            Some(list) if !list.trim().is_empty() => format!("{} {class}", list.trim()),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", joined);
    }

    pub fn style(&self, node: NodeId, prop: &str) -> Option<&str> {
        self.element(node)?.style.get(prop).map(String::as_str)
    }

    pub fn set_style(&mut self, node: NodeId, prop: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.style.insert(prop.to_string(), value.into());
        }
    }

    /// Inline value if set, otherwise the user-agent default for the few
    /// properties the overlay copies.
    pub fn computed_style(&self, node: NodeId, prop: &str) -> String {
        if let Some(value) = self.style(node, prop) {
            return value.to_string();
        }
        match prop {
            "padding" | "border-width" => "0px",
            "font" => "inherit",
            "position" => "static",
            "display" => "inline",
            _ => "",
        }
        .to_string()
    }

    pub fn rect(&self, node: NodeId) -> Option<Rect> {
        self.element(node)?.rect
    }

    pub fn set_rect(&mut self, node: NodeId, rect: Rect) {
        if let Some(el) = self.element_mut(node) {
            el.rect = Some(rect);
        }
    }

    pub fn handlers(&self, node: NodeId) -> Handlers {
        self.element(node).map(|el| el.handlers).unwrap_or_default()
    }

    pub fn set_handlers(&mut self, node: NodeId, handlers: Handlers) {
        if let Some(el) = self.element_mut(node) {
            el.handlers = handlers;
        }
    }

    pub fn overlay_owner(&self, node: NodeId) -> Option<NodeId> {
        self.element(node)?.overlay_owner
    }

    pub fn set_overlay_owner(&mut self, node: NodeId, owner: NodeId) {
        if let Some(el) = self.element_mut(node) {
            el.overlay_owner = Some(owner);
        }
    }

    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.element(node)?.value.as_deref()
    }

    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        if let Some(el) = self.element_mut(node) {
            el.value = Some(value.into());
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.text_nodes(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Replaces every child with a single text node (none for empty text).
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if self.is_text(node) {
            self.set_text(node, text);
            return;
        }
        for child in self.children(node).to_vec() {
            self.detach(child);
        }
        if !text.is_empty() {
            let child = self.create_text(text);
            self.append_child(node, child);
        }
    }

    // --- events ---------------------------------------------------------

    pub fn dispatch(&mut self, event: DomEvent) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<DomEvent> {
        std::mem::take(&mut self.events)
    }

    // --- serialization --------------------------------------------------

    /// Deterministic markup for `node` and its subtree. Attributes are
    /// emitted in name order, inline style as one `style` attribute.
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].data {
            NodeData::Text(t) => out.push_str(&escape(&t.text)),
            NodeData::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    let _ = write!(out, " {name}=\"{}\"", escape(value));
                }
                if !el.style.is_empty() {
                    let style: Vec<String> =
                        el.style.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                    let _ = write!(out, " style=\"{}\"", escape(&style.join("; ")));
                }
                out.push('>');
                if let Some(value) = el.value.as_deref().filter(|v| !v.is_empty()) {
                    out.push_str(&escape(value));
                }
                for child in &self.nodes[node.0].children {
                    self.write_html(*child, out);
                }
                let _ = write!(out, "</{}>", el.tag);
            }
        }
    }

    /// Text-node boundaries under `root`: each entry is `(parent, text)`.
    pub fn text_segments(&self, root: NodeId) -> Vec<(Option<NodeId>, String)> {
        self.text_nodes(root)
            .into_iter()
            .map(|id| (self.parent(id), self.text(id).unwrap_or_default().to_string()))
            .collect()
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_detach_keep_tree_consistent() {
        let mut doc = Document::new("example.com");
        let div = doc.create_element("div");
        let a = doc.create_text("a");
        let c = doc.create_text("c");
        let b = doc.create_text("b");
        doc.append_child(doc.body(), div);
        doc.append_child(div, a);
        doc.append_child(div, c);
        doc.insert_before(div, b, Some(c));
        assert_eq!(doc.text_content(div), "abc");
        assert_eq!(doc.next_sibling(a), Some(b));
        assert_eq!(doc.previous_sibling(c), Some(b));

        doc.detach(b);
        assert_eq!(doc.text_content(div), "ac");
        assert!(!doc.is_connected(b));
        assert!(doc.is_connected(c));
    }

    #[test]
    fn split_text_tags_both_pieces() {
        let mut doc = Document::new("example.com");
        let p = doc.create_element("p");
        let t = doc.create_text("héllo world");
        doc.append_child(doc.body(), p);
        doc.append_child(p, t);

        let tail = doc.split_text(t, 5).unwrap();
        assert_eq!(doc.text(t), Some("héllo"));
        assert_eq!(doc.text(tail), Some(" world"));
        assert_eq!(doc.split_origin(t), Some(t));
        assert_eq!(doc.split_origin(tail), Some(t));
        assert_eq!(doc.children(p), &[t, tail]);
        assert!(doc.split_text(t, 0).is_none());
    }

    #[test]
    fn class_helpers_and_html() {
        let mut doc = Document::new("example.com");
        let span = doc.create_element("span");
        doc.add_class(span, "spell-error");
        doc.add_class(span, "error-type-1");
        doc.add_class(span, "spell-error");
        doc.set_style(span, "color", "transparent");
        let t = doc.create_text("a<b");
        doc.append_child(span, t);
        assert!(doc.has_class(span, "error-type-1"));
        assert_eq!(
            doc.to_html(span),
            "<span class=\"spell-error error-type-1\" style=\"color: transparent\">a&lt;b</span>"
        );
    }

    #[test]
    fn set_text_content_flattens_children() {
        let mut doc = Document::new("example.com");
        let div = doc.create_element("div");
        let b = doc.create_element("b");
        let t = doc.create_text("bold");
        doc.append_child(b, t);
        doc.append_child(div, b);
        doc.set_text_content(div, "plain");
        assert_eq!(doc.children(div).len(), 1);
        assert_eq!(doc.text_content(div), "plain");
    }
}
