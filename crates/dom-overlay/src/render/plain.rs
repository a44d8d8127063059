use tracing::trace;

use super::{build_highlight, OverlayBackend, RenderReport, OVERLAY_CLASS};
use crate::dom::{Document, NodeId, Rect};
use crate::errors::OverlayError;
use crate::spans::SpanList;
use crate::text::{char_len, char_slice};

/// Transparent sibling overlay for `<input>` / `<textarea>`.
///
/// The overlay repeats the control's text invisibly so the highlight spans
/// line up with the native glyphs; only their underlines show. The overlay
/// itself ignores the pointer and each highlight re-enables it.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainControlBackend;

impl PlainControlBackend {
    fn build_overlay(&self, doc: &mut Document, target: NodeId) -> NodeId {
        let overlay = doc.create_element("div");
        doc.add_class(overlay, OVERLAY_CLASS);
        doc.set_overlay_owner(overlay, target);

        let rect = doc.rect(target).unwrap_or_default();
        let padding = doc.computed_style(target, "padding");
        let border = doc.computed_style(target, "border-width");
        for (prop, value) in [
            ("position", "absolute".to_string()),
            ("left", px(rect.x)),
            ("top", px(rect.y)),
            ("width", px(rect.width)),
            ("height", px(rect.height)),
            ("padding", padding),
            ("border", format!("{border} solid transparent")),
            ("box-sizing", "border-box".to_string()),
            ("font", "inherit".to_string()),
            ("white-space", "pre-wrap".to_string()),
            ("overflow", "hidden".to_string()),
            ("color", "transparent".to_string()),
            ("background", "transparent".to_string()),
            ("pointer-events", "none".to_string()),
            ("z-index", "1".to_string()),
        ] {
            doc.set_style(overlay, prop, value);
        }
        if rect != Rect::default() {
            doc.set_rect(overlay, rect);
        }
        overlay
    }

    fn append_run(&self, doc: &mut Document, parent: NodeId, text: &str) {
        if !text.is_empty() {
            let node = doc.create_text(text);
            doc.append_child(parent, node);
        }
    }
}

fn px(value: f64) -> String {
    format!("{value}px")
}

impl OverlayBackend for PlainControlBackend {
    fn apply(
        &self,
        doc: &mut Document,
        target: NodeId,
        spans: &SpanList,
    ) -> Result<RenderReport, OverlayError> {
        let text = doc.value(target).unwrap_or_default().to_string();
        if text.trim().is_empty() {
            return Ok(RenderReport::default());
        }
        let len = char_len(&text);
        let overlay = self.build_overlay(doc, target);
        let mut report = RenderReport::default();
        let mut cursor = 0;

        for span in spans {
            let start = span.start.max(cursor);
            let end = span.end.min(len);
            if start >= end {
                trace!(id = %span.stable_id, "span not placeable in overlay");
                report.skipped += 1;
                continue;
            }
            self.append_run(doc, overlay, char_slice(&text, cursor, start));

            let highlight = build_highlight(doc, span);
            for (prop, value) in [
                ("color", "transparent".to_string()),
                ("text-decoration", "underline wavy".to_string()),
                ("text-decoration-color", span.category.color().to_string()),
                ("text-decoration-thickness", "2px".to_string()),
                ("text-underline-offset", "2px".to_string()),
                ("pointer-events", "auto".to_string()),
                ("cursor", "help".to_string()),
            ] {
                doc.set_style(highlight, prop, value);
            }
            self.append_run(doc, highlight, char_slice(&text, start, end));
            doc.append_child(overlay, highlight);
            report.rendered += 1;
            cursor = end;
        }
        self.append_run(doc, overlay, char_slice(&text, cursor, len));

        if !doc.insert_after(target, overlay) {
            return Err(OverlayError::Detached(target));
        }
        Ok(report)
    }

    fn clear(&self, doc: &mut Document, target: NodeId) -> usize {
        let Some(parent) = doc.parent(target) else {
            return 0;
        };
        let stale: Vec<NodeId> = doc
            .children(parent)
            .iter()
            .copied()
            .filter(|id| doc.has_class(*id, OVERLAY_CLASS) && doc.overlay_owner(*id) == Some(target))
            .collect();
        for overlay in &stale {
            doc.detach(*overlay);
        }
        stale.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::TargetShape;
    use crate::render::{find_highlights, resolve_owner, HIGHLIGHT_CLASS};
    use pretty_assertions::assert_eq;
    use spell_model::{CorrectionCategory, SpellError};

    fn control(value: &str) -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("example.com");
        let form = doc.create_element("form");
        let area = doc.create_element("textarea");
        doc.set_value(area, value);
        doc.set_rect(area, Rect::new(10.0, 20.0, 300.0, 40.0));
        doc.set_style(area, "padding", "4px");
        let body = doc.body();
        doc.append_child(body, form);
        doc.append_child(form, area);
        (doc, form, area)
    }

    fn error(start: usize, end: usize, original: &str) -> SpellError {
        SpellError::new(0, start, end, original, vec!["have".into()], "", CorrectionCategory::MisusedWord)
    }

    #[test]
    fn overlay_mirrors_text_with_highlight() {
        let (mut doc, form, area) = control("I has a pen");
        let backend = PlainControlBackend;
        let errors = vec![error(2, 5, "has")];
        let report = backend.apply(&mut doc, area, &SpanList::from_errors(&errors)).unwrap();
        assert_eq!(report, RenderReport { rendered: 1, skipped: 0 });

        let overlay = doc.children(form)[1];
        assert_eq!(doc.overlay_owner(overlay), Some(area));
        assert_eq!(doc.style(overlay, "pointer-events"), Some("none"));
        assert_eq!(doc.style(overlay, "padding"), Some("4px"));
        assert_eq!(doc.style(overlay, "left"), Some("10px"));
        assert_eq!(doc.text_content(overlay), "I has a pen");

        let highlight = find_highlights(&doc, &errors[0].stable_id())[0];
        assert!(doc.has_class(highlight, HIGHLIGHT_CLASS));
        assert!(doc.has_class(highlight, "error-type-2"));
        assert_eq!(doc.style(highlight, "pointer-events"), Some("auto"));
        assert_eq!(doc.attr(highlight, "title"), Some("has → have"));
        assert_eq!(resolve_owner(&doc, highlight), Some((area, TargetShape::PlainControl)));
    }

    #[test]
    fn blank_value_renders_nothing() {
        let (mut doc, form, area) = control("   ");
        let errors = vec![error(0, 2, "  ")];
        let report = PlainControlBackend
            .apply(&mut doc, area, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report.rendered, 0);
        assert_eq!(doc.children(form).len(), 1);
    }

    #[test]
    fn overlapping_and_out_of_range_spans_are_clipped_or_skipped() {
        let (mut doc, _, area) = control("abcdef");
        let errors = vec![error(0, 3, "abc"), error(1, 2, "b"), error(2, 5, "cde"), error(9, 12, "x")];
        let report = PlainControlBackend
            .apply(&mut doc, area, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report, RenderReport { rendered: 2, skipped: 2 });
        let overlay = doc.next_sibling(area).unwrap();
        assert_eq!(doc.text_content(overlay), "abcdef");
    }

    #[test]
    fn clear_only_removes_own_overlays() {
        let (mut doc, form, area) = control("I has a pen");
        let other = doc.create_element("input");
        doc.set_value(other, "I has a pen");
        doc.append_child(form, other);

        let errors = vec![error(2, 5, "has")];
        let spans = SpanList::from_errors(&errors);
        PlainControlBackend.apply(&mut doc, area, &spans).unwrap();
        PlainControlBackend.apply(&mut doc, other, &spans).unwrap();
        assert_eq!(doc.children(form).len(), 4);

        assert_eq!(PlainControlBackend.clear(&mut doc, area), 1);
        let remaining = doc.children(form).to_vec();
        assert_eq!(remaining.len(), 3);
        assert_eq!(&remaining[..2], &[area, other]);
        assert_eq!(doc.overlay_owner(remaining[2]), Some(other));
    }
}
