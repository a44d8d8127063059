use std::fmt;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<br\s*/?>").expect("static regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

/// Placeholder shown in hover hints when the service offered nothing.
pub const NO_SUGGESTIONS: &str = "no suggestions";

/// Identity of a logical error, derived from its span and original text.
///
/// Two errors with the same `(start, end, original)` share an id even when
/// they come from different check calls, which is what lets ignore and apply
/// find the highlight nodes again after a redraw.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StableId(String);

impl StableId {
    pub fn derive(start: usize, end: usize, original: &str) -> Self {
        Self(format!("{start}-{end}-{original}"))
    }

    /// Wraps an id read back from a DOM attribute.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Classification reported by the service (`nCorrectMethod`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CorrectionCategory {
    NoError,
    /// Morpheme analysis failed; also the fallback for unknown codes.
    Uncertain,
    MisusedWord,
    MultiPhrase,
    SemanticStyle,
    Punctuation,
    StatisticalSpacing,
    EnglishMisuse,
    Tagging,
    CompoundUnderscore,
    SpacingByType,
}

impl CorrectionCategory {
    pub const ALL: [CorrectionCategory; 11] = [
        CorrectionCategory::NoError,
        CorrectionCategory::Uncertain,
        CorrectionCategory::MisusedWord,
        CorrectionCategory::MultiPhrase,
        CorrectionCategory::SemanticStyle,
        CorrectionCategory::Punctuation,
        CorrectionCategory::StatisticalSpacing,
        CorrectionCategory::EnglishMisuse,
        CorrectionCategory::Tagging,
        CorrectionCategory::CompoundUnderscore,
        CorrectionCategory::SpacingByType,
    ];

    pub fn from_code(code: u8) -> Self {
        Self::ALL
            .get(code as usize)
            .copied()
            .unwrap_or(CorrectionCategory::Uncertain)
    }

    pub fn code(self) -> u8 {
        match self {
            CorrectionCategory::NoError => 0,
            CorrectionCategory::Uncertain => 1,
            CorrectionCategory::MisusedWord => 2,
            CorrectionCategory::MultiPhrase => 3,
            CorrectionCategory::SemanticStyle => 4,
            CorrectionCategory::Punctuation => 5,
            CorrectionCategory::StatisticalSpacing => 6,
            CorrectionCategory::EnglishMisuse => 7,
            CorrectionCategory::Tagging => 8,
            CorrectionCategory::CompoundUnderscore => 9,
            CorrectionCategory::SpacingByType => 10,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            CorrectionCategory::NoError => "#28a745",
            CorrectionCategory::Uncertain => "#dc3545",
            CorrectionCategory::MisusedWord => "#fd7e14",
            CorrectionCategory::MultiPhrase => "#e83e8c",
            CorrectionCategory::SemanticStyle => "#6f42c1",
            CorrectionCategory::Punctuation => "#20c997",
            CorrectionCategory::StatisticalSpacing => "#17a2b8",
            CorrectionCategory::EnglishMisuse => "#ffc107",
            CorrectionCategory::Tagging => "#6c757d",
            CorrectionCategory::CompoundUnderscore => "#343a40",
            CorrectionCategory::SpacingByType => "#007bff",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CorrectionCategory::NoError => "No error",
            CorrectionCategory::Uncertain => "Unrecognized word",
            CorrectionCategory::MisusedWord => "Misused word",
            CorrectionCategory::MultiPhrase => "Multi-phrase error",
            CorrectionCategory::SemanticStyle => "Meaning or style",
            CorrectionCategory::Punctuation => "Punctuation",
            CorrectionCategory::StatisticalSpacing => "Spacing (statistical)",
            CorrectionCategory::EnglishMisuse => "English misuse",
            CorrectionCategory::Tagging => "Tagging error",
            CorrectionCategory::CompoundUnderscore => "Compound noun",
            CorrectionCategory::SpacingByType => "Spacing (by form)",
        }
    }
}

impl Default for CorrectionCategory {
    fn default() -> Self {
        CorrectionCategory::Uncertain
    }
}

impl From<u8> for CorrectionCategory {
    fn from(code: u8) -> Self {
        CorrectionCategory::from_code(code)
    }
}

impl From<CorrectionCategory> for u8 {
    fn from(category: CorrectionCategory) -> Self {
        category.code()
    }
}

/// One flagged span.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpellError {
    pub index: u32,
    pub start: usize,
    pub end: usize,
    pub original: String,
    pub suggestions: Vec<String>,
    /// Raw help text; may carry markup. See [`SpellError::display_description`].
    pub description: String,
    pub category: CorrectionCategory,
    #[serde(default)]
    pub applied: bool,
    #[serde(default)]
    pub ignored: bool,
}

impl SpellError {
    pub fn new(
        index: u32,
        start: usize,
        end: usize,
        original: impl Into<String>,
        suggestions: Vec<String>,
        description: impl Into<String>,
        category: CorrectionCategory,
    ) -> Self {
        Self {
            index,
            start,
            end,
            original: original.into(),
            suggestions,
            description: description.into(),
            category,
            applied: false,
            ignored: false,
        }
    }

    pub fn stable_id(&self) -> StableId {
        StableId::derive(self.start, self.end, &self.original)
    }

    pub fn is_empty_span(&self) -> bool {
        self.end <= self.start
    }

    /// `original → s1 | s2`, or the no-suggestions placeholder.
    pub fn hover_hint(&self) -> String {
        let suggestions = if self.suggestions.is_empty() {
            NO_SUGGESTIONS.to_string()
        } else {
            self.suggestions.join(" | ")
        };
        format!("{} → {}", self.original, suggestions)
    }

    pub fn display_description(&self) -> String {
        strip_markup(&self.description)
    }
}

/// Turns `<br>` variants into newlines and drops every other tag.
pub fn strip_markup(raw: &str) -> String {
    let with_breaks = BREAK_TAG.replace_all(raw, "\n");
    ANY_TAG.replace_all(&with_breaks, "").trim().to_string()
}

/// Aggregate for one checked text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub source_text: String,
    pub errors: Vec<SpellError>,
    pub succeeded: bool,
    pub status_message: String,
    pub checked_at: DateTime<Utc>,
}

impl CheckResult {
    pub fn empty(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            errors: Vec::new(),
            succeeded: true,
            status_message: String::new(),
            checked_at: Utc::now(),
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn find(&self, id: &StableId) -> Option<&SpellError> {
        self.errors.iter().find(|error| &error.stable_id() == id)
    }
}
