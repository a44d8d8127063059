//! Projection of a span list onto an editable element.
//!
//! Two backends share one interface: [`PlainControlBackend`] decorates a
//! form control with a sibling overlay, [`RichRegionBackend`] wraps live
//! text nodes in place. Both are exact inverses of their `clear`.

mod plain;
mod rich;

pub use plain::PlainControlBackend;
pub use rich::RichRegionBackend;

use spell_model::StableId;
use tracing::{debug, instrument};

use crate::classifier::{editable_shape, TargetShape};
use crate::dom::{Document, Handlers, NodeId};
use crate::errors::OverlayError;
use crate::spans::{HighlightSpan, SpanList};

pub const HIGHLIGHT_CLASS: &str = "spell-error";
pub const OVERLAY_CLASS: &str = "spell-input-overlay";
pub const IGNORED_CLASS: &str = "ignored";
pub const ERROR_ID_ATTR: &str = "data-error-id";
pub const ERROR_START_ATTR: &str = "data-error-start";
pub const ERROR_END_ATTR: &str = "data-error-end";

/// Outcome of one render pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderReport {
    /// Highlight elements inserted.
    pub rendered: usize,
    /// Spans that could not be placed (out of range, overlapped away).
    pub skipped: usize,
}

pub trait OverlayBackend {
    /// Inserts one highlight per placeable span. Callers clear first.
    fn apply(
        &self,
        doc: &mut Document,
        target: NodeId,
        spans: &SpanList,
    ) -> Result<RenderReport, OverlayError>;

    /// Removes everything `apply` inserted; returns the number of
    /// highlight or overlay nodes removed.
    fn clear(&self, doc: &mut Document, target: NodeId) -> usize;
}

/// Picks the backend by target shape and keeps clear-before-apply ordering.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayRenderer {
    plain: PlainControlBackend,
    rich: RichRegionBackend,
}

impl OverlayRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn backend(&self, shape: TargetShape) -> &dyn OverlayBackend {
        match shape {
            TargetShape::PlainControl => &self.plain,
            TargetShape::RichRegion => &self.rich,
        }
    }

    #[instrument(skip_all, fields(target = ?target, spans = spans.len()))]
    pub fn render(
        &self,
        doc: &mut Document,
        target: NodeId,
        shape: TargetShape,
        spans: &SpanList,
    ) -> Result<RenderReport, OverlayError> {
        if !doc.is_connected(target) {
            return Err(OverlayError::Detached(target));
        }
        let backend = self.backend(shape);
        backend.clear(doc, target);
        if spans.is_empty() {
            return Ok(RenderReport::default());
        }
        let report = backend.apply(doc, target, spans)?;
        debug!(rendered = report.rendered, skipped = report.skipped, "highlights rendered");
        Ok(report)
    }

    pub fn clear(&self, doc: &mut Document, target: NodeId, shape: TargetShape) -> usize {
        self.backend(shape).clear(doc, target)
    }
}

/// Builds a detached highlight element for `span` holding `text`.
pub(crate) fn build_highlight(doc: &mut Document, span: &HighlightSpan) -> NodeId {
    let el = doc.create_element("span");
    doc.add_class(el, HIGHLIGHT_CLASS);
    doc.add_class(el, &format!("error-type-{}", span.category.code()));
    doc.set_attr(el, ERROR_ID_ATTR, span.stable_id.as_str());
    doc.set_attr(el, ERROR_START_ATTR, span.start.to_string());
    doc.set_attr(el, ERROR_END_ATTR, span.end.to_string());
    doc.set_attr(el, "title", span.hint.as_str());
    doc.set_handlers(el, Handlers::all());
    el
}

/// Every live highlight in the document carrying `id`.
pub fn find_highlights(doc: &Document, id: &StableId) -> Vec<NodeId> {
    doc.query_all(doc.body(), |d, node| {
        d.has_class(node, HIGHLIGHT_CLASS) && d.attr(node, ERROR_ID_ATTR) == Some(id.as_str())
    })
}

/// Hides every live highlight carrying `id`; returns how many were hidden.
pub fn hide_highlights(doc: &mut Document, id: &StableId) -> usize {
    let nodes = find_highlights(doc, id);
    for node in &nodes {
        doc.add_class(*node, IGNORED_CLASS);
        doc.set_style(*node, "display", "none");
    }
    nodes.len()
}

/// Stable id stored on a highlight element.
pub fn highlight_id(doc: &Document, node: NodeId) -> Option<StableId> {
    if !doc.has_class(node, HIGHLIGHT_CLASS) {
        return None;
    }
    doc.attr(node, ERROR_ID_ATTR).map(StableId::from_raw)
}

/// Editable element that owns `node`: the nearest editable ancestor, or
/// for an overlay highlight the control recorded on the overlay.
pub fn resolve_owner(doc: &Document, node: NodeId) -> Option<(NodeId, TargetShape)> {
    if !doc.is_connected(node) {
        return None;
    }
    if let Some(owner) = doc.closest(node, |d, id| editable_shape(d, id).is_some()) {
        return editable_shape(doc, owner).map(|shape| (owner, shape));
    }
    let overlay = doc.closest(node, |d, id| d.has_class(id, OVERLAY_CLASS))?;
    let owner = doc.overlay_owner(overlay)?;
    if !doc.is_connected(owner) {
        return None;
    }
    editable_shape(doc, owner).map(|shape| (owner, shape))
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_model::{CorrectionCategory, SpellError};

    #[test]
    fn hide_marks_every_duplicate() {
        let mut doc = Document::new("example.com");
        let div = doc.create_element("div");
        doc.set_attr(div, "contenteditable", "true");
        let t = doc.create_text("I has a pen. I has a pen.");
        let body = doc.body();
        doc.append_child(body, div);
        doc.append_child(div, t);

        let error = SpellError::new(0, 2, 5, "has", vec![], "", CorrectionCategory::MisusedWord);
        let errors = vec![error.clone(), error.clone()];
        let renderer = OverlayRenderer::new();
        let report = renderer
            .render(&mut doc, div, TargetShape::RichRegion, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report.rendered, 2);

        let id = error.stable_id();
        assert_eq!(hide_highlights(&mut doc, &id), 2);
        for node in find_highlights(&doc, &id) {
            assert!(doc.has_class(node, IGNORED_CLASS));
            assert_eq!(doc.style(node, "display"), Some("none"));
        }
    }

    #[test]
    fn rendering_detached_target_fails() {
        let mut doc = Document::new("example.com");
        let area = doc.create_element("textarea");
        let result = OverlayRenderer::new().render(
            &mut doc,
            area,
            TargetShape::PlainControl,
            &SpanList::default(),
        );
        assert_eq!(result, Err(OverlayError::Detached(area)));
    }
}
