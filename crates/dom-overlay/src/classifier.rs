use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dom::{Document, NodeId};

/// Rendering strategy for an eligible element, picked once at classification.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum TargetShape {
    /// `<input type=text>` / `<textarea>`: text lives in a native widget.
    PlainControl,
    /// `contenteditable` subtree.
    RichRegion,
}

/// One structural signature that opts an element out of checking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ExclusionRule {
    /// `input[type=...]`
    InputType(&'static str),
    /// `input[name*=...]`
    InputNameContains(&'static str),
    /// Element carries the attribute.
    Attribute(&'static str),
    /// Element carries the class.
    Class(&'static str),
    /// Element or an ancestor carries the class (editor widgets).
    WithinClass(&'static str),
    /// `<tag> input`
    InputWithin(&'static str),
}

impl ExclusionRule {
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let is_input = doc.tag(node) == Some("input");
        match self {
            ExclusionRule::InputType(kind) => {
                is_input && doc.attr(node, "type").map(str::to_ascii_lowercase).as_deref() == Some(*kind)
            }
            ExclusionRule::InputNameContains(fragment) => {
                is_input
                    && doc
                        .attr(node, "name")
                        .map(|name| name.contains(fragment))
                        .unwrap_or(false)
            }
            ExclusionRule::Attribute(name) => doc.has_attr(node, name),
            ExclusionRule::Class(class) => doc.has_class(node, class),
            ExclusionRule::WithinClass(class) => {
                doc.closest(node, |d, id| d.has_class(id, class)).is_some()
            }
            ExclusionRule::InputWithin(tag) => {
                is_input
                    && doc
                        .parent(node)
                        .and_then(|p| doc.closest(p, |d, id| d.tag(id) == Some(*tag)))
                        .is_some()
            }
        }
    }
}

/// Ordered rule list; the first match wins.
pub fn default_exclusions() -> Vec<ExclusionRule> {
    vec![
        ExclusionRule::InputType("password"),
        ExclusionRule::InputType("email"),
        ExclusionRule::InputNameContains("password"),
        ExclusionRule::InputNameContains("pwd"),
        ExclusionRule::InputNameContains("card"),
        ExclusionRule::InputNameContains("ssn"),
        ExclusionRule::InputNameContains("phone"),
        ExclusionRule::InputNameContains("tel"),
        ExclusionRule::InputType("search"),
        ExclusionRule::InputNameContains("url"),
        ExclusionRule::InputNameContains("link"),
        ExclusionRule::Attribute("data-no-spellcheck"),
        ExclusionRule::Class("no-spellcheck"),
        ExclusionRule::WithinClass("ace_editor"),
        ExclusionRule::WithinClass("CodeMirror"),
        ExclusionRule::InputWithin("pre"),
        ExclusionRule::InputWithin("code"),
    ]
}

/// Host denylist entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HostPattern {
    /// Matches the host itself and any subdomain of it.
    Domain(String),
    /// `prefix.*.suffix`: exactly the given labels around one or more
    /// arbitrary middle labels.
    Wildcard { prefix: String, suffix: String },
}

impl HostPattern {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim().trim_end_matches('.').to_ascii_lowercase();
        match raw.split_once(".*.") {
            Some((prefix, suffix)) => HostPattern::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => HostPattern::Domain(raw),
        }
    }

    pub fn matches(&self, host: &str) -> bool {
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        match self {
            HostPattern::Domain(domain) => {
                host == *domain || host.ends_with(&format!(".{domain}"))
            }
            HostPattern::Wildcard { prefix, suffix } => {
                let head = format!("{prefix}.");
                let tail = format!(".{suffix}");
                host.len() > head.len() + tail.len()
                    && host.starts_with(&head)
                    && host.ends_with(&tail)
            }
        }
    }
}

/// Decides which elements get checked, and how they are rendered.
#[derive(Clone, Debug)]
pub struct TargetClassifier {
    rules: Vec<ExclusionRule>,
    denied_hosts: Vec<HostPattern>,
}

impl Default for TargetClassifier {
    fn default() -> Self {
        Self::new(
            default_exclusions(),
            ["accounts.google.com", "login.naver.com", "signin.*.com"]
                .iter()
                .map(|h| HostPattern::parse(h))
                .collect(),
        )
    }
}

impl TargetClassifier {
    pub fn new(rules: Vec<ExclusionRule>, denied_hosts: Vec<HostPattern>) -> Self {
        Self {
            rules,
            denied_hosts,
        }
    }

    pub fn with_denied_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            default_exclusions(),
            hosts.into_iter().map(|h| HostPattern::parse(h.as_ref())).collect(),
        )
    }

    /// False when the page host is on the denylist; checking is then off for
    /// the whole page.
    pub fn host_allowed(&self, host: &str) -> bool {
        !self.denied_hosts.iter().any(|p| p.matches(host))
    }

    pub fn excluded_by(&self, doc: &Document, node: NodeId) -> Option<&ExclusionRule> {
        self.rules.iter().find(|rule| rule.matches(doc, node))
    }

    pub fn classify(&self, doc: &Document, node: NodeId) -> Option<TargetShape> {
        let shape = editable_shape(doc, node)?;
        if let Some(rule) = self.excluded_by(doc, node) {
            debug!(?node, ?rule, "target excluded");
            return None;
        }
        Some(shape)
    }

    pub fn is_eligible(&self, doc: &Document, node: NodeId) -> bool {
        self.classify(doc, node).is_some()
    }
}

/// Structural shape of an editable element, ignoring exclusion rules.
pub fn editable_shape(doc: &Document, node: NodeId) -> Option<TargetShape> {
    match doc.tag(node)? {
        "textarea" => Some(TargetShape::PlainControl),
        "input" => {
            let kind = doc.attr(node, "type").unwrap_or("text");
            kind.eq_ignore_ascii_case("text")
                .then_some(TargetShape::PlainControl)
        }
        _ => match doc.attr(node, "contenteditable") {
            Some(v) if v.is_empty() || v.eq_ignore_ascii_case("true") => {
                Some(TargetShape::RichRegion)
            }
            _ => None,
        },
    }
}
