use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use dom_overlay::classifier::editable_shape;
use dom_overlay::render::{highlight_id, HIGHLIGHT_CLASS, IGNORED_CLASS};
use dom_overlay::text::splice;
use dom_overlay::{
    find_highlights, hide_highlights, resolve_owner, Document, DomEvent, NodeId, OverlayRenderer,
    Rect, RenderReport, SpanList, TargetClassifier, TargetShape,
};
use extensions_bridge::{BridgeRequest, BridgeResponse, MessageChannel};
use soulspell_core_types::{system_clock, SessionId, SharedClock};
use spell_model::{CachePolicy, CheckResult, ResultCache, SpellError, StableId};
use tracing::{debug, info, instrument, warn};

use crate::errors::ControllerError;
use crate::events::{ControllerEvent, EventLog};
use crate::model::{
    CheckOutcome, CheckRequest, CheckStart, CheckTicket, ClickOutcome, DisplayedErrors,
    SkipReason,
};
use crate::notice::SetupNotice;
use crate::policy::InteractionPolicy;
use crate::tooltip::{
    Tooltip, TooltipPhase, APPLY_BUTTON_CLASS, IGNORE_BUTTON_CLASS, SUGGESTION_ATTR, TOOLTIP_CLASS,
};
use crate::trigger::SmartTrigger;

const GENERIC_FAILURE: &str = "spell check failed";

pub struct SpellControllerBuilder {
    policy: InteractionPolicy,
    cache: CachePolicy,
    classifier: TargetClassifier,
    channel: Option<Arc<dyn MessageChannel>>,
    clock: Option<SharedClock>,
    session: Option<SessionId>,
}

impl SpellControllerBuilder {
    pub fn new(policy: InteractionPolicy) -> Self {
        Self {
            policy,
            cache: CachePolicy::default(),
            classifier: TargetClassifier::default(),
            channel: None,
            clock: None,
            session: None,
        }
    }

    pub fn with_channel(mut self, channel: Arc<dyn MessageChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn with_cache_policy(mut self, cache: CachePolicy) -> Self {
        self.cache = cache;
        self
    }

    pub fn with_classifier(mut self, classifier: TargetClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_session(mut self, session: SessionId) -> Self {
        self.session = Some(session);
        self
    }

    pub fn build(self) -> Result<SpellController, ControllerError> {
        let channel = self.channel.ok_or(ControllerError::MissingPort("channel"))?;
        let clock = self.clock.unwrap_or_else(system_clock);
        Ok(SpellController {
            session: self.session.unwrap_or_default(),
            cache: ResultCache::new(&self.cache, clock.clone()),
            trigger: SmartTrigger::new(self.policy.clone()),
            tooltip: Tooltip::new(self.policy.hide_delay()),
            notice: SetupNotice::new(self.policy.notice_lifetime()),
            renderer: OverlayRenderer::new(),
            classifier: self.classifier,
            channel,
            clock,
            ignored: HashSet::new(),
            displayed: HashMap::new(),
            busy: false,
            invalidated: false,
            events: EventLog::default(),
        })
    }
}

/// Per-page interaction state: one instance per page load.
///
/// Everything here runs on the page's single event loop. Checks are
/// serialized by a busy flag (new ones are dropped, not queued) and a lost
/// extension context switches checking off for the rest of the page.
pub struct SpellController {
    session: SessionId,
    classifier: TargetClassifier,
    renderer: OverlayRenderer,
    cache: ResultCache,
    trigger: SmartTrigger,
    tooltip: Tooltip,
    notice: SetupNotice,
    channel: Arc<dyn MessageChannel>,
    clock: SharedClock,
    ignored: HashSet<StableId>,
    displayed: HashMap<NodeId, DisplayedErrors>,
    busy: bool,
    invalidated: bool,
    events: EventLog,
}

fn current_text(doc: &Document, target: NodeId, shape: TargetShape) -> String {
    match shape {
        TargetShape::PlainControl => doc.value(target).unwrap_or_default().to_string(),
        TargetShape::RichRegion => doc.text_content(target),
    }
}

impl SpellController {
    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_invalidated(&self) -> bool {
        self.invalidated
    }

    pub fn is_ignored(&self, id: &StableId) -> bool {
        self.ignored.contains(id)
    }

    pub fn tooltip_phase(&self) -> TooltipPhase {
        self.tooltip.phase()
    }

    pub fn tooltip_node(&self) -> Option<NodeId> {
        self.tooltip.node()
    }

    pub fn notice_node(&self) -> Option<NodeId> {
        self.notice.node()
    }

    pub fn displayed_errors(&self, target: NodeId) -> Option<&[SpellError]> {
        self.displayed.get(&target).map(|d| d.errors.as_slice())
    }

    /// Render report of the last draw on `target`.
    pub fn last_report(&self, target: NodeId) -> Option<&RenderReport> {
        self.displayed.get(&target).map(|d| &d.report)
    }

    pub fn take_events(&mut self) -> Vec<ControllerEvent> {
        self.events.drain()
    }

    /// Shape of `target` if it may be checked on this page.
    pub fn target_shape(&self, doc: &Document, target: NodeId) -> Option<TargetShape> {
        if !self.classifier.host_allowed(doc.host()) {
            return None;
        }
        self.classifier.classify(doc, target)
    }

    // --- input -----------------------------------------------------------

    /// Text changed: drop stale highlights and restart the debounce.
    pub fn handle_input(&mut self, doc: &mut Document, target: NodeId) {
        if self.invalidated {
            return;
        }
        let Some(shape) = self.target_shape(doc, target) else {
            return;
        };
        self.clear_errors(doc, target);
        let text = current_text(doc, target, shape);
        self.trigger.on_input(self.clock.now(), target, &text);
    }

    /// A key was typed; sentence endings produce an immediate check.
    pub fn handle_key(&mut self, doc: &Document, target: NodeId, key: char) -> Option<CheckRequest> {
        if self.invalidated {
            return None;
        }
        let shape = self.target_shape(doc, target)?;
        let text = current_text(doc, target, shape);
        self.trigger.on_key(target, &text, key)
    }

    /// Advances tooltip, notice and debounce timers. Returns a check that
    /// became due, if any.
    pub fn poll_timers(&mut self, doc: &mut Document) -> Option<CheckRequest> {
        let now = self.clock.now();
        self.tooltip.poll(doc, now);
        self.notice.poll(doc, now);
        if self.invalidated {
            self.trigger.cancel();
            return None;
        }
        self.trigger.poll(now)
    }

    // --- check pipeline --------------------------------------------------

    /// Gates a check: invalidated and busy drop it, a cache hit resolves it
    /// on the spot, otherwise the caller must round-trip and then call
    /// [`SpellController::complete_check`].
    pub fn begin_check(&mut self, doc: &mut Document, request: CheckRequest) -> CheckStart {
        if self.invalidated {
            return CheckStart::Done(CheckOutcome::Skipped(SkipReason::Invalidated));
        }
        if self.busy {
            debug!(target_node = ?request.target, "check dropped while another is in flight");
            return CheckStart::Done(CheckOutcome::Skipped(SkipReason::Busy));
        }
        let Some(shape) = self.target_shape(doc, request.target) else {
            return CheckStart::Done(CheckOutcome::Skipped(SkipReason::NotEligible));
        };
        if let Some(cached) = self.cache.get(&request.text) {
            debug!(errors = cached.error_count(), "check served from cache");
            let outcome = self.show_result(doc, request.target, shape, &cached, true);
            self.events.emit(ControllerEvent::CheckFinished {
                target: request.target,
                outcome: outcome.clone(),
            });
            return CheckStart::Done(outcome);
        }
        self.busy = true;
        CheckStart::Pending(CheckTicket { request })
    }

    /// Applies the reply for `ticket`. `None` means the extension context
    /// is gone; that is terminal for this page.
    pub fn complete_check(
        &mut self,
        doc: &mut Document,
        ticket: CheckTicket,
        reply: Option<BridgeResponse>,
    ) -> CheckOutcome {
        self.busy = false;
        let CheckRequest { target, text } = ticket.request;
        let outcome = match reply {
            None => {
                warn!(session = %self.session, "extension context lost; checking disabled for this page");
                self.invalidated = true;
                self.trigger.cancel();
                self.events.emit(ControllerEvent::Invalidated);
                CheckOutcome::Invalidated
            }
            Some(reply) if reply.success => match reply.data {
                Some(result) if !result.succeeded => {
                    debug!(message = %result.status_message, "service reported a non-clean status");
                    CheckOutcome::Rejected(result.status_message)
                }
                Some(result) => {
                    self.cache.put(&text, result.clone());
                    match self.target_shape(doc, target) {
                        Some(shape) => self.show_result(doc, target, shape, &result, false),
                        None => CheckOutcome::Skipped(SkipReason::NotEligible),
                    }
                }
                None => CheckOutcome::Clean { from_cache: false },
            },
            Some(reply) if reply.needs_setup => {
                if self.notice.show(doc, self.clock.now()) {
                    self.events.emit(ControllerEvent::SetupNoticeShown);
                }
                CheckOutcome::NeedsSetup
            }
            Some(reply) if reply.disabled => CheckOutcome::Disabled,
            Some(reply) => {
                let message = reply.error.unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!(%message, "spell check request failed");
                self.events.emit(ControllerEvent::ApiFailure {
                    message: message.clone(),
                });
                CheckOutcome::Failed(message)
            }
        };
        info!(?target, ?outcome, "check finished");
        self.events.emit(ControllerEvent::CheckFinished {
            target,
            outcome: outcome.clone(),
        });
        outcome
    }

    /// Full check round trip over the message channel.
    #[instrument(skip_all, fields(session = %self.session, target = ?request.target))]
    pub async fn check_spelling(&mut self, doc: &mut Document, request: CheckRequest) -> CheckOutcome {
        let ticket = match self.begin_check(doc, request) {
            CheckStart::Done(outcome) => return outcome,
            CheckStart::Pending(ticket) => ticket,
        };
        let reply = self
            .channel
            .send(BridgeRequest::check(ticket.request().text.clone()))
            .await;
        self.complete_check(doc, ticket, reply)
    }

    fn show_result(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        shape: TargetShape,
        result: &CheckResult,
        from_cache: bool,
    ) -> CheckOutcome {
        match self.display_with_shape(doc, target, shape, &result.errors) {
            Ok(report) if report.rendered == 0 => CheckOutcome::Clean { from_cache },
            Ok(report) => CheckOutcome::Displayed {
                rendered: report.rendered,
                from_cache,
            },
            Err(err) => {
                debug!(%err, "result not displayed");
                CheckOutcome::Skipped(SkipReason::Detached)
            }
        }
    }

    // --- display ---------------------------------------------------------

    /// Draws `errors` on `target`, replacing whatever was drawn before.
    /// Ignored errors are filtered out first.
    pub fn display_errors(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        errors: &[SpellError],
    ) -> Result<RenderReport, ControllerError> {
        let shape = self
            .target_shape(doc, target)
            .ok_or(ControllerError::NotEligible(target))?;
        self.display_with_shape(doc, target, shape, errors)
    }

    fn display_with_shape(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        shape: TargetShape,
        errors: &[SpellError],
    ) -> Result<RenderReport, ControllerError> {
        self.clear_errors(doc, target);
        let visible: Vec<SpellError> = errors
            .iter()
            .filter(|error| !self.ignored.contains(&error.stable_id()))
            .cloned()
            .collect();
        if visible.is_empty() {
            return Ok(RenderReport::default());
        }
        let report = self
            .renderer
            .render(doc, target, shape, &SpanList::from_errors(&visible))?;
        self.displayed.insert(
            target,
            DisplayedErrors {
                shape,
                errors: visible,
                report: report.clone(),
            },
        );
        Ok(report)
    }

    /// Removes every highlight drawn on `target` and closes the tooltip.
    pub fn clear_errors(&mut self, doc: &mut Document, target: NodeId) -> usize {
        self.tooltip.close(doc);
        let shape = self
            .displayed
            .remove(&target)
            .map(|shown| shown.shape)
            .or_else(|| editable_shape(doc, target));
        match shape {
            Some(shape) => self.renderer.clear(doc, target, shape),
            None => 0,
        }
    }

    // --- pointer ---------------------------------------------------------

    /// Highlight under `node`, its owner and the displayed error behind it.
    fn error_for(&self, doc: &Document, node: NodeId) -> Option<(NodeId, NodeId, SpellError)> {
        let highlight = doc.closest(node, |d, id| d.has_class(id, HIGHLIGHT_CLASS))?;
        if doc.has_class(highlight, IGNORED_CLASS) {
            return None;
        }
        let id = highlight_id(doc, highlight)?;
        let (owner, _) = resolve_owner(doc, highlight)?;
        let error = self.displayed.get(&owner)?.find(&id)?.clone();
        Some((highlight, owner, error))
    }

    fn anchor_rect(&self, doc: &Document, highlight: NodeId) -> Rect {
        doc.rect(highlight)
            .or_else(|| resolve_owner(doc, highlight).and_then(|(owner, _)| doc.rect(owner)))
            .unwrap_or_default()
    }

    pub fn pointer_enter(&mut self, doc: &mut Document, node: NodeId) {
        if self.tooltip.contains(doc, node) {
            self.tooltip.hold();
            return;
        }
        let Some((highlight, owner, error)) = self.error_for(doc, node) else {
            return;
        };
        if self.tooltip.phase() == TooltipPhase::Pinned
            && self.tooltip.owner() == Some(owner)
            && self.tooltip.error_id() == Some(&error.stable_id())
        {
            return;
        }
        let anchor = self.anchor_rect(doc, highlight);
        self.tooltip.show(doc, owner, anchor, &error, false);
    }

    pub fn pointer_leave(&mut self, doc: &Document, node: NodeId) {
        let on_highlight = doc
            .closest(node, |d, id| d.has_class(id, HIGHLIGHT_CLASS))
            .is_some();
        if on_highlight || self.tooltip.contains(doc, node) {
            self.tooltip.release(self.clock.now());
        }
    }

    /// Document-level click routing.
    pub fn click(&mut self, doc: &mut Document, node: NodeId) -> ClickOutcome {
        if self.notice.is_dismiss_button(doc, node) {
            self.notice.dismiss(doc);
            return ClickOutcome::NoticeDismissed;
        }
        if self.tooltip.contains(doc, node) {
            let tooltip_id = doc
                .closest(node, |d, id| d.has_class(id, TOOLTIP_CLASS))
                .and_then(|tooltip| doc.attr(tooltip, dom_overlay::render::ERROR_ID_ATTR))
                .map(StableId::from_raw);
            let apply = doc.closest(node, |d, id| d.has_class(id, APPLY_BUTTON_CLASS));
            if let Some(button) = apply {
                let suggestion = doc.attr(button, SUGGESTION_ATTR).map(str::to_string);
                let (Some(owner), Some(id), Some(suggestion)) =
                    (self.tooltip.owner(), tooltip_id, suggestion)
                else {
                    return ClickOutcome::ApplyAborted;
                };
                return match self.apply_correction(doc, owner, &id, &suggestion) {
                    Ok(()) => ClickOutcome::Applied,
                    Err(err) => {
                        debug!(%err, "correction aborted");
                        ClickOutcome::ApplyAborted
                    }
                };
            }
            if doc
                .closest(node, |d, id| d.has_class(id, IGNORE_BUTTON_CLASS))
                .is_some()
            {
                if let Some(id) = tooltip_id {
                    self.ignore_error(doc, &id);
                    return ClickOutcome::Ignored;
                }
            }
            return ClickOutcome::Nothing;
        }
        if let Some((highlight, owner, error)) = self.error_for(doc, node) {
            let anchor = self.anchor_rect(doc, highlight);
            self.tooltip.show(doc, owner, anchor, &error, true);
            return ClickOutcome::TooltipPinned;
        }
        if self.tooltip.phase() != TooltipPhase::Idle {
            self.tooltip.close(doc);
            return ClickOutcome::TooltipClosed;
        }
        ClickOutcome::Nothing
    }

    // --- corrections -----------------------------------------------------

    /// Splices `suggestion` over the error's span in `target`'s current
    /// text and queues an input notification. Only a live highlight drawn
    /// for `target` counts; other elements showing the same id are never
    /// touched. Nothing is written when the highlight, owner or error can
    /// no longer be resolved.
    pub fn apply_correction(
        &mut self,
        doc: &mut Document,
        target: NodeId,
        id: &StableId,
        suggestion: &str,
    ) -> Result<(), ControllerError> {
        let highlights = find_highlights(doc, id);
        if highlights.is_empty() {
            return Err(ControllerError::HighlightNotFound(id.clone()));
        }
        let (owner, shape) = highlights
            .iter()
            .find_map(|&highlight| {
                resolve_owner(doc, highlight).filter(|(owner, _)| *owner == target)
            })
            .ok_or(ControllerError::OwnerNotFound(target))?;
        let error = self
            .displayed
            .get(&owner)
            .and_then(|shown| shown.find(id))
            .cloned()
            .ok_or_else(|| ControllerError::UnknownError(id.clone()))?;

        let text = current_text(doc, owner, shape);
        let corrected = splice(&text, error.start, error.end, suggestion).ok_or(
            ControllerError::StaleSpan {
                start: error.start,
                end: error.end,
            },
        )?;

        if let Some(entry) = self.displayed.get_mut(&owner).and_then(|shown| shown.find_mut(id)) {
            entry.applied = true;
        }
        match shape {
            TargetShape::PlainControl => doc.set_value(owner, corrected),
            TargetShape::RichRegion => doc.set_text_content(owner, &corrected),
        }
        self.tooltip.close(doc);
        doc.dispatch(DomEvent::Input { target: owner });
        info!(%id, suggestion, "correction applied");
        self.events.emit(ControllerEvent::CorrectionApplied {
            target: owner,
            id: id.clone(),
            replacement: suggestion.to_string(),
        });
        Ok(())
    }

    /// Hides `id` for the rest of the page and every highlight showing it
    /// now. Returns how many highlights were hidden.
    pub fn ignore_error(&mut self, doc: &mut Document, id: &StableId) -> usize {
        self.ignored.insert(id.clone());
        let hidden = hide_highlights(doc, id);
        for shown in self.displayed.values_mut() {
            if let Some(entry) = shown.find_mut(id) {
                entry.ignored = true;
            }
        }
        self.tooltip.close(doc);
        debug!(%id, hidden, "error ignored");
        self.events.emit(ControllerEvent::ErrorIgnored {
            id: id.clone(),
            hidden,
        });
        hidden
    }
}
