use spell_model::{CorrectionCategory, SpellError, StableId};

/// Renderer-facing view of one error.
#[derive(Clone, Debug, PartialEq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub stable_id: StableId,
    pub category: CorrectionCategory,
    pub hint: String,
}

impl HighlightSpan {
    pub fn from_error(error: &SpellError) -> Self {
        Self {
            start: error.start,
            end: error.end,
            stable_id: error.stable_id(),
            category: error.category,
            hint: error.hover_hint(),
        }
    }
}

/// Spans sorted ascending by `(start, end)`; empty spans are dropped.
///
/// Sorting is stable, so spans with equal bounds keep service order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpanList {
    spans: Vec<HighlightSpan>,
}

impl SpanList {
    pub fn from_errors<'a, I>(errors: I) -> Self
    where
        I: IntoIterator<Item = &'a SpellError>,
    {
        let mut spans: Vec<HighlightSpan> = errors
            .into_iter()
            .filter(|error| !error.is_empty_span())
            .map(HighlightSpan::from_error)
            .collect();
        spans.sort_by_key(|span| (span.start, span.end));
        Self { spans }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HighlightSpan> {
        self.spans.iter()
    }

    pub fn len(&self) -> usize {
        self.spans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl<'a> IntoIterator for &'a SpanList {
    type Item = &'a HighlightSpan;
    type IntoIter = std::slice::Iter<'a, HighlightSpan>;

    fn into_iter(self) -> Self::IntoIter {
        self.spans.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn error(start: usize, end: usize, original: &str) -> SpellError {
        SpellError::new(0, start, end, original, vec![], "", CorrectionCategory::Uncertain)
    }

    #[test]
    fn sorts_and_drops_empty_spans() {
        let errors = vec![error(5, 8, "c"), error(0, 2, "a"), error(3, 3, "empty"), error(0, 1, "b")];
        let list = SpanList::from_errors(&errors);
        let starts: Vec<(usize, usize)> = list.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(starts, vec![(0, 1), (0, 2), (5, 8)]);
    }

    #[test]
    fn span_carries_identity_and_hint() {
        let mut e = error(2, 5, "has");
        e.suggestions = vec!["have".into()];
        let span = HighlightSpan::from_error(&e);
        assert_eq!(span.stable_id.as_str(), "2-5-has");
        assert_eq!(span.hint, "has → have");
    }
}
