//! Suggestion tooltip: DOM construction and show/hide lifecycle.

use std::time::{Duration, Instant};

use dom_overlay::{Document, Handlers, NodeId, Rect};
use spell_model::{SpellError, StableId};
use tracing::trace;

use crate::timer::TimerSlot;

pub const TOOLTIP_CLASS: &str = "spell-tooltip";
pub const APPLY_BUTTON_CLASS: &str = "apply-btn";
pub const IGNORE_BUTTON_CLASS: &str = "ignore-btn";
pub const SUGGESTION_ATTR: &str = "data-suggestion";
pub const INDEX_ATTR: &str = "data-index";

const NO_SUGGESTIONS_TEXT: &str = "No suggestions";
const APPLY_TEXT: &str = "Apply";
const IGNORE_TEXT: &str = "Ignore";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TooltipPhase {
    Idle,
    Visible,
    /// Pointer left; the hide timer is running.
    AutoHiding,
    /// Opened by a click; only an outside click closes it.
    Pinned,
}

#[derive(Debug)]
pub struct Tooltip {
    phase: TooltipPhase,
    node: Option<NodeId>,
    error_id: Option<StableId>,
    owner: Option<NodeId>,
    hide: TimerSlot<()>,
    hide_delay: Duration,
}

impl Tooltip {
    pub fn new(hide_delay: Duration) -> Self {
        Self {
            phase: TooltipPhase::Idle,
            node: None,
            error_id: None,
            owner: None,
            hide: TimerSlot::new(),
            hide_delay,
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn error_id(&self) -> Option<&StableId> {
        self.error_id.as_ref()
    }

    /// Editable element whose highlight opened the tooltip.
    pub fn owner(&self) -> Option<NodeId> {
        self.owner
    }

    /// Replaces any open tooltip with one for `error` on `owner`, placed
    /// under `anchor`.
    pub fn show(
        &mut self,
        doc: &mut Document,
        owner: NodeId,
        anchor: Rect,
        error: &SpellError,
        pinned: bool,
    ) {
        self.close(doc);
        let node = build_tooltip(doc, anchor, error);
        let body = doc.body();
        doc.append_child(body, node);
        self.node = Some(node);
        self.error_id = Some(error.stable_id());
        self.owner = Some(owner);
        self.phase = if pinned {
            TooltipPhase::Pinned
        } else {
            TooltipPhase::Visible
        };
        trace!(id = %error.stable_id(), pinned, "tooltip shown");
    }

    /// Pointer entered the highlight or the tooltip: stop any pending hide.
    pub fn hold(&mut self) {
        if self.hide.cancel().is_some() && self.phase == TooltipPhase::AutoHiding {
            self.phase = TooltipPhase::Visible;
        }
    }

    /// Pointer left: start the grace period unless pinned.
    pub fn release(&mut self, now: Instant) {
        if matches!(self.phase, TooltipPhase::Visible | TooltipPhase::AutoHiding) {
            self.hide.schedule(now, self.hide_delay, ());
            self.phase = TooltipPhase::AutoHiding;
        }
    }

    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> bool {
        if self.hide.fire_if_due(now).is_some() {
            self.close(doc);
            return true;
        }
        false
    }

    pub fn close(&mut self, doc: &mut Document) {
        self.hide.cancel();
        if let Some(node) = self.node.take() {
            doc.detach(node);
        }
        self.error_id = None;
        self.owner = None;
        self.phase = TooltipPhase::Idle;
    }

    pub fn contains(&self, doc: &Document, node: NodeId) -> bool {
        self.node
            .map(|tooltip| doc.contains(tooltip, node))
            .unwrap_or(false)
    }
}

fn element(doc: &mut Document, tag: &str, class: &str, parent: NodeId) -> NodeId {
    let el = doc.create_element(tag);
    doc.add_class(el, class);
    doc.append_child(parent, el);
    el
}

fn text(doc: &mut Document, parent: NodeId, content: &str) {
    let node = doc.create_text(content);
    doc.append_child(parent, node);
}

fn build_tooltip(doc: &mut Document, anchor: Rect, error: &SpellError) -> NodeId {
    let tooltip = doc.create_element("div");
    doc.add_class(tooltip, TOOLTIP_CLASS);
    doc.set_attr(tooltip, dom_overlay::render::ERROR_ID_ATTR, error.stable_id().as_str());
    doc.set_handlers(tooltip, Handlers::POINTER_ENTER | Handlers::POINTER_LEAVE);
    for (prop, value) in [
        ("position", "fixed".to_string()),
        ("left", format!("{}px", anchor.x)),
        ("top", format!("{}px", anchor.bottom() + 5.0)),
        ("z-index", "9999".to_string()),
        ("background-color", "white".to_string()),
        ("border", "1px solid #ccc".to_string()),
        ("border-radius", "4px".to_string()),
        ("padding", "8px".to_string()),
        ("box-shadow", "0 2px 8px rgba(0,0,0,0.2)".to_string()),
        ("max-width", "300px".to_string()),
    ] {
        doc.set_style(tooltip, prop, value);
    }

    let header = element(doc, "div", "tooltip-header", tooltip);
    let original = element(doc, "span", "original-text", header);
    text(doc, original, &format!("\"{}\"", error.original));
    let badge = element(doc, "span", "error-type-badge", header);
    doc.set_style(badge, "background-color", error.category.color());
    text(doc, badge, error.category.label());

    if error.suggestions.is_empty() {
        let empty = element(doc, "div", "no-suggestions", tooltip);
        text(doc, empty, NO_SUGGESTIONS_TEXT);
    } else {
        let list = element(doc, "div", "suggestion-list", tooltip);
        for (index, suggestion) in error.suggestions.iter().enumerate() {
            let item = element(doc, "div", "suggestion-item", list);
            doc.set_attr(item, SUGGESTION_ATTR, suggestion.as_str());
            doc.set_attr(item, INDEX_ATTR, index.to_string());
            let label = element(doc, "span", "suggestion-text", item);
            text(doc, label, suggestion);
            let button = element(doc, "button", APPLY_BUTTON_CLASS, item);
            doc.set_attr(button, SUGGESTION_ATTR, suggestion.as_str());
            doc.set_attr(button, INDEX_ATTR, index.to_string());
            text(doc, button, APPLY_TEXT);
        }
    }

    let explanation = error.display_description();
    if !explanation.is_empty() {
        let block = element(doc, "div", "explanation", tooltip);
        text(doc, block, &explanation);
    }

    let actions = element(doc, "div", "actions", tooltip);
    let ignore = element(doc, "button", IGNORE_BUTTON_CLASS, actions);
    text(doc, ignore, IGNORE_TEXT);
    tooltip
}
