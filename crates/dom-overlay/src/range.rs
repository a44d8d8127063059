//! Wrapping a sub-range of one text node in an element.

use tracing::trace;

use crate::dom::{Document, NodeId};
use crate::errors::RangeError;
use crate::render::HIGHLIGHT_CLASS;
use crate::text::{char_len, char_slice};

/// `[start, end)` inside a single text node, in chars.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TextRange {
    pub node: NodeId,
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(node: NodeId, start: usize, end: usize) -> Self {
        Self { node, start, end }
    }

    fn validate(&self, doc: &Document) -> Result<NodeId, RangeError> {
        let len = doc.text(self.node).map(char_len).unwrap_or(0);
        if self.start >= self.end || self.end > len {
            return Err(RangeError::InvalidOffsets {
                start: self.start,
                end: self.end,
                len,
            });
        }
        doc.parent(self.node).ok_or(RangeError::Orphan(self.node))
    }

    /// Range-based capture: splits the node at both boundaries and moves the
    /// middle piece into `wrapper`. Refuses to nest inside an existing
    /// highlight.
    pub fn surround_contents(&self, doc: &mut Document, wrapper: NodeId) -> Result<(), RangeError> {
        let parent = self.validate(doc)?;
        if doc.has_class(parent, HIGHLIGHT_CLASS) {
            return Err(RangeError::AlreadyWrapped(self.node));
        }
        doc.split_text(self.node, self.end);
        let middle = doc.split_text(self.node, self.start).unwrap_or(self.node);
        doc.insert_before(parent, wrapper, Some(middle));
        doc.append_child(wrapper, middle);
        Ok(())
    }

    /// Three-way manual split: replaces the node with `before`, `wrapper`
    /// holding the flagged text, and `after`. Empty pieces are skipped.
    pub fn manual_split(&self, doc: &mut Document, wrapper: NodeId) -> Result<(), RangeError> {
        let parent = self.validate(doc)?;
        let text = doc.text(self.node).unwrap_or_default().to_string();
        let len = char_len(&text);
        let origin = doc.split_origin(self.node).unwrap_or(self.node);

        let before = char_slice(&text, 0, self.start).to_string();
        let flagged = char_slice(&text, self.start, self.end).to_string();
        let after = char_slice(&text, self.end, len).to_string();

        let anchor = Some(self.node);
        if !before.is_empty() {
            let piece = doc.create_text(before);
            doc.set_split_origin(piece, Some(origin));
            doc.insert_before(parent, piece, anchor);
        }
        let inner = doc.create_text(flagged);
        doc.set_split_origin(inner, Some(origin));
        doc.append_child(wrapper, inner);
        doc.insert_before(parent, wrapper, anchor);
        if !after.is_empty() {
            let piece = doc.create_text(after);
            doc.set_split_origin(piece, Some(origin));
            doc.insert_before(parent, piece, anchor);
        }
        doc.detach(self.node);
        trace!(node = ?self.node, "highlight built by manual split");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("example.com");
        let p = doc.create_element("p");
        let t = doc.create_text(text);
        let body = doc.body();
        doc.append_child(body, p);
        doc.append_child(p, t);
        (doc, p, t)
    }

    #[test]
    fn surround_wraps_middle() {
        let (mut doc, p, t) = paragraph("I has a pen");
        let span = doc.create_element("span");
        TextRange::new(t, 2, 5).surround_contents(&mut doc, span).unwrap();
        assert_eq!(doc.to_html(p), "<p>I <span>has</span> a pen</p>");
    }

    #[test]
    fn surround_at_node_edges_does_not_create_empty_pieces() {
        let (mut doc, p, t) = paragraph("has");
        let span = doc.create_element("span");
        TextRange::new(t, 0, 3).surround_contents(&mut doc, span).unwrap();
        assert_eq!(doc.children(p), &[span]);
        assert_eq!(doc.children(span), &[t]);
    }

    #[test]
    fn surround_refuses_inside_highlight() {
        let (mut doc, p, t) = paragraph("text");
        doc.add_class(p, HIGHLIGHT_CLASS);
        let span = doc.create_element("span");
        assert_eq!(
            TextRange::new(t, 0, 2).surround_contents(&mut doc, span),
            Err(RangeError::AlreadyWrapped(t))
        );
    }

    #[test]
    fn manual_split_matches_surround_output() {
        let (mut doc, p, t) = paragraph("I has a pen");
        let span = doc.create_element("span");
        TextRange::new(t, 2, 5).manual_split(&mut doc, span).unwrap();
        assert_eq!(doc.to_html(p), "<p>I <span>has</span> a pen</p>");
        assert!(!doc.is_connected(t));
        for piece in doc.text_nodes(p) {
            assert_eq!(doc.split_origin(piece), Some(t));
        }
    }

    #[test]
    fn invalid_offsets_are_rejected() {
        let (mut doc, _, t) = paragraph("abc");
        let span = doc.create_element("span");
        assert!(matches!(
            TextRange::new(t, 1, 9).surround_contents(&mut doc, span),
            Err(RangeError::InvalidOffsets { len: 3, .. })
        ));
        let orphan = doc.create_text("loose");
        assert_eq!(
            TextRange::new(orphan, 0, 2).manual_split(&mut doc, span),
            Err(RangeError::Orphan(orphan))
        );
    }
}
