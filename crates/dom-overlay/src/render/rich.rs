use tracing::{debug, trace};

use super::{build_highlight, OverlayBackend, RenderReport, HIGHLIGHT_CLASS};
use crate::dom::{Document, NodeId};
use crate::errors::OverlayError;
use crate::range::TextRange;
use crate::spans::{HighlightSpan, SpanList};
use crate::text::char_len;

/// In-place wrapping of live text nodes inside a `contenteditable` region.
#[derive(Clone, Copy, Debug, Default)]
pub struct RichRegionBackend;

/// Text node holding `offset`, with its local range clipped to that node.
fn locate(doc: &Document, target: NodeId, span: &HighlightSpan) -> Option<TextRange> {
    let mut running = 0;
    for node in doc.text_nodes(target) {
        let len = doc.text(node).map(char_len).unwrap_or(0);
        if span.start >= running && span.start < running + len {
            let local_start = span.start - running;
            let local_end = span.end.min(running + len) - running;
            return Some(TextRange::new(node, local_start, local_end));
        }
        running += len;
    }
    None
}

impl RichRegionBackend {
    fn wrap(&self, doc: &mut Document, range: TextRange, span: &HighlightSpan) -> bool {
        let highlight = build_highlight(doc, span);
        doc.set_style(highlight, "text-decoration", "underline wavy");
        doc.set_style(highlight, "text-decoration-color", span.category.color());
        doc.set_style(highlight, "cursor", "help");
        match range.surround_contents(doc, highlight) {
            Ok(()) => true,
            Err(err) => {
                trace!(%err, "range wrap refused, splitting manually");
                match range.manual_split(doc, highlight) {
                    Ok(()) => true,
                    Err(err) => {
                        debug!(%err, id = %span.stable_id, "highlight not placed");
                        false
                    }
                }
            }
        }
    }

    /// Merges adjacent text pieces that came from the same original node,
    /// then forgets the split bookkeeping.
    fn normalize_fragments(&self, doc: &mut Document, target: NodeId) {
        let mut parents = vec![target];
        parents.extend(doc.descendants(target).into_iter().filter(|id| !doc.is_text(*id)));
        for parent in parents {
            let children = doc.children(parent).to_vec();
            let mut previous: Option<NodeId> = None;
            for child in children {
                let origin = doc.split_origin(child);
                let merge_into = previous.filter(|prev| origin.is_some() && doc.split_origin(*prev) == origin);
                match merge_into {
                    Some(prev) => {
                        let joined = format!(
                            "{}{}",
                            doc.text(prev).unwrap_or_default(),
                            doc.text(child).unwrap_or_default()
                        );
                        doc.set_text(prev, joined);
                        doc.detach(child);
                    }
                    None => previous = doc.is_text(child).then_some(child),
                }
            }
        }
        for node in doc.text_nodes(target) {
            doc.set_split_origin(node, None);
        }
    }
}

impl OverlayBackend for RichRegionBackend {
    fn apply(
        &self,
        doc: &mut Document,
        target: NodeId,
        spans: &SpanList,
    ) -> Result<RenderReport, OverlayError> {
        let mut report = RenderReport::default();
        for span in spans {
            let Some(range) = locate(doc, target, span) else {
                trace!(id = %span.stable_id, start = span.start, "no text node holds span start");
                report.skipped += 1;
                continue;
            };
            if self.wrap(doc, range, span) {
                report.rendered += 1;
            } else {
                report.skipped += 1;
            }
        }
        Ok(report)
    }

    fn clear(&self, doc: &mut Document, target: NodeId) -> usize {
        let highlights = doc.query_all(target, |d, id| d.has_class(id, HIGHLIGHT_CLASS));
        for highlight in &highlights {
            let Some(parent) = doc.parent(*highlight) else {
                continue;
            };
            for child in doc.children(*highlight).to_vec() {
                doc.insert_before(parent, child, Some(*highlight));
            }
            doc.detach(*highlight);
        }
        self.normalize_fragments(doc, target);
        highlights.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spell_model::{CorrectionCategory, SpellError};

    fn region(html_parts: &[(&str, bool)]) -> (Document, NodeId) {
        let mut doc = Document::new("example.com");
        let div = doc.create_element("div");
        doc.set_attr(div, "contenteditable", "true");
        let body = doc.body();
        doc.append_child(body, div);
        for (text, bold) in html_parts {
            let t = doc.create_text(*text);
            if *bold {
                let b = doc.create_element("b");
                doc.append_child(b, t);
                doc.append_child(div, b);
            } else {
                doc.append_child(div, t);
            }
        }
        (doc, div)
    }

    fn error(start: usize, end: usize, original: &str) -> SpellError {
        SpellError::new(0, start, end, original, vec![], "", CorrectionCategory::Uncertain)
    }

    #[test]
    fn span_crossing_markup_is_clipped_to_first_node() {
        let (mut doc, div) = region(&[("I ha", false), ("s a pen", true)]);
        let errors = vec![error(2, 5, "has")];
        let report = RichRegionBackend
            .apply(&mut doc, div, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report.rendered, 1);
        let highlight = doc.query_all(div, |d, id| d.has_class(id, HIGHLIGHT_CLASS))[0];
        assert_eq!(doc.text_content(highlight), "ha");
    }

    #[test]
    fn start_past_text_is_skipped() {
        let (mut doc, div) = region(&[("short", false)]);
        let errors = vec![error(10, 12, "xx")];
        let report = RichRegionBackend
            .apply(&mut doc, div, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report, RenderReport { rendered: 0, skipped: 1 });
    }

    #[test]
    fn nested_span_falls_back_to_manual_split() {
        let (mut doc, div) = region(&[("I has a pen", false)]);
        let errors = vec![error(2, 7, "has a"), error(2, 5, "has")];
        let report = RichRegionBackend
            .apply(&mut doc, div, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(report.rendered, 2);
        let highlights = doc.query_all(div, |d, id| d.has_class(id, HIGHLIGHT_CLASS));
        assert_eq!(highlights.len(), 2);
        assert_eq!(doc.text_content(div), "I has a pen");

        RichRegionBackend.clear(&mut doc, div);
        assert_eq!(doc.to_html(div), "<div contenteditable=\"true\">I has a pen</div>");
    }

    #[test]
    fn clear_keeps_preexisting_boundaries() {
        let (mut doc, div) = region(&[("I has", false), (" a ", false), ("pen", true)]);
        let before = doc.text_segments(div);
        let errors = vec![error(2, 5, "has"), error(8, 11, "pen")];
        RichRegionBackend
            .apply(&mut doc, div, &SpanList::from_errors(&errors))
            .unwrap();
        assert_eq!(RichRegionBackend.clear(&mut doc, div), 2);
        assert_eq!(doc.text_segments(div), before);
    }
}
