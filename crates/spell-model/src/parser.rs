use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::model::{CheckResult, CorrectionCategory, SpellError};

/// Status message the service sends when the text is clean.
pub const NO_ERROR_PHRASE: &str = "문법 및 철자 오류가 발견되지 않았습니다";

const RECORD_OPEN: &str = "<PnuErrorWord";
const RECORD_CLOSE: &str = "</PnuErrorWord>";

static STATUS_NODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Error\b([^>]*)>").expect("static regex"));
static ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:'([^']*)'|"([^"]*)")"#).expect("static regex")
});
static ORIGINAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<OrgStr>(.*?)</OrgStr>").expect("static regex"));
static HELP_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<Help\b([^>]*)>").expect("static regex"));
static HELP_BODY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<Help\b[^>]*>(.*?)</Help>").expect("static regex"));
static CDATA: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("static regex"));
static CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<CandWord>(.*?)</CandWord>").expect("static regex"));

/// Lenient reader for the speller's XML-ish payload.
///
/// Never fails: unreadable numbers fall back to `0` (offsets) or the
/// uncertain category, broken sub-fields read as empty, and a payload that
/// matches no known shape is an empty, successful result.
#[derive(Clone, Debug)]
pub struct ResponseParser {
    no_error_phrase: String,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new(NO_ERROR_PHRASE)
    }
}

impl ResponseParser {
    pub fn new(no_error_phrase: impl Into<String>) -> Self {
        Self {
            no_error_phrase: no_error_phrase.into(),
        }
    }

    pub fn parse(&self, payload: &str, source_text: &str) -> CheckResult {
        let mut result = CheckResult::empty(source_text);
        result.checked_at = Utc::now();

        if let Some(status) = STATUS_NODE.captures(payload) {
            let attrs = status.get(1).map(|m| m.as_str()).unwrap_or_default();
            result.status_message = attribute(attrs, "msg").unwrap_or_default();
            result.succeeded = result.status_message.contains(&self.no_error_phrase);
            debug!(
                succeeded = result.succeeded,
                message = %result.status_message,
                "speller returned status node"
            );
            return result;
        }

        for (attrs, body) in records(payload) {
            result.errors.push(parse_record(attrs, body));
        }
        debug!(errors = result.errors.len(), "parsed speller payload");
        result
    }
}

pub fn parse_response(payload: &str, source_text: &str) -> CheckResult {
    ResponseParser::default().parse(payload, source_text)
}

/// Splits the payload into `(attributes, body)` per error record. A record
/// without a closing tag runs until the next record or the end of input.
fn records(payload: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(found) = payload[cursor..].find(RECORD_OPEN) {
        let open = cursor + found;
        let after_name = open + RECORD_OPEN.len();
        let boundary = payload[after_name..].chars().next();
        if !matches!(boundary, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            cursor = after_name;
            continue;
        }

        let Some(tag_len) = payload[after_name..].find('>') else {
            out.push((&payload[after_name..], ""));
            break;
        };
        let tag_end = after_name + tag_len;
        let attrs = payload[after_name..tag_end].trim_end_matches('/');
        let body_start = tag_end + 1;
        if payload[after_name..tag_end].ends_with('/') {
            out.push((attrs, ""));
            cursor = body_start;
            continue;
        }

        let rest = &payload[body_start..];
        let close = rest.find(RECORD_CLOSE);
        let next = rest.find(RECORD_OPEN);
        let (body_end, resume) = match (close, next) {
            (Some(c), Some(n)) if n < c => (n, body_start + n),
            (Some(c), _) => (c, body_start + c + RECORD_CLOSE.len()),
            (None, Some(n)) => (n, body_start + n),
            (None, None) => (rest.len(), payload.len()),
        };
        out.push((attrs, &rest[..body_end]));
        cursor = resume;
    }
    out
}

fn parse_record(attrs: &str, body: &str) -> SpellError {
    let index: u32 = numeric(attrs, "nErrorIdx");
    let start: usize = numeric(attrs, "m_nStart");
    let end: usize = numeric(attrs, "m_nEnd");

    let original = ORIGINAL
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| decode_entities(m.as_str()))
        .unwrap_or_default();

    let category = HELP_OPEN
        .captures(body)
        .and_then(|c| c.get(1))
        .and_then(|m| attribute(m.as_str(), "nCorrectMethod"))
        .and_then(|raw| raw.trim().parse::<u8>().ok())
        .map(CorrectionCategory::from_code)
        .unwrap_or(CorrectionCategory::Uncertain);

    let description = HELP_BODY
        .captures(body)
        .and_then(|c| c.get(1))
        .map(|m| {
            let inner = m.as_str();
            match CDATA.captures(inner).and_then(|c| c.get(1)) {
                Some(cdata) => cdata.as_str().to_string(),
                None => inner.trim().to_string(),
            }
        })
        .unwrap_or_default();

    let suggestions = CANDIDATE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|s| !s.is_empty())
        .collect();

    SpellError::new(
        index,
        start,
        end,
        original,
        suggestions,
        description,
        category,
    )
}

fn attribute(attrs: &str, name: &str) -> Option<String> {
    ATTRIBUTE.captures_iter(attrs).find_map(|c| {
        if c.get(1)?.as_str() != name {
            return None;
        }
        c.get(2)
            .or_else(|| c.get(3))
            .map(|m| decode_entities(m.as_str()))
    })
}

fn numeric<T: std::str::FromStr + Default>(attrs: &str, name: &str) -> T {
    attribute(attrs, name)
        .and_then(|raw| raw.trim().parse::<T>().ok())
        .unwrap_or_default()
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    raw.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
