//! Page session driver.
//!
//! Plays the role of the page's event loop: forwards queued input
//! notifications to the controller, runs due timers and performs the
//! checks they produce.

use dom_overlay::classifier::editable_shape;
use dom_overlay::{Document, DomEvent, NodeId, TargetShape};
use overlay_controller::{CheckOutcome, CheckRequest, ClickOutcome, SpellController};
use spell_model::StableId;
use tracing::{debug, trace};

use crate::errors::CliError;

pub struct PageSession {
    doc: Document,
    controller: SpellController,
}

impl PageSession {
    pub fn new(doc: Document, controller: SpellController) -> Self {
        Self { doc, controller }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn controller(&self) -> &SpellController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SpellController {
        &mut self.controller
    }

    pub fn into_parts(self) -> (Document, SpellController) {
        (self.doc, self.controller)
    }

    /// Current text of an editable target.
    pub fn text_of(&self, target: NodeId) -> Option<String> {
        match editable_shape(&self.doc, target)? {
            TargetShape::PlainControl => Some(self.doc.value(target).unwrap_or_default().to_string()),
            TargetShape::RichRegion => Some(self.doc.text_content(target)),
        }
    }

    /// Replaces the target's text the way typing would and delivers the
    /// resulting input notification.
    pub fn edit(&mut self, target: NodeId, text: &str) -> Result<(), CliError> {
        match editable_shape(&self.doc, target).ok_or(CliError::NotEditable(target))? {
            TargetShape::PlainControl => self.doc.set_value(target, text),
            TargetShape::RichRegion => self.doc.set_text_content(target, text),
        }
        self.doc.dispatch(DomEvent::Input { target });
        self.pump();
        Ok(())
    }

    /// Drains queued DOM notifications into the controller. Returns how
    /// many were delivered.
    pub fn pump(&mut self) -> usize {
        let events = self.doc.take_events();
        let delivered = events.len();
        for event in events {
            match event {
                DomEvent::Input { target } => {
                    trace!(?target, "input event delivered");
                    self.controller.handle_input(&mut self.doc, target);
                }
            }
        }
        delivered
    }

    /// Checks the target's current text right away, bypassing the trigger.
    pub async fn check_now(&mut self, target: NodeId) -> Result<CheckOutcome, CliError> {
        let text = self.text_of(target).ok_or(CliError::NotEditable(target))?;
        if text.trim().is_empty() {
            return Err(CliError::EmptyText);
        }
        let request = CheckRequest { target, text };
        Ok(self.controller.check_spelling(&mut self.doc, request).await)
    }

    /// Feeds one typed key; sentence endings check immediately.
    pub async fn key(&mut self, target: NodeId, key: char) -> Option<CheckOutcome> {
        let request = self.controller.handle_key(&self.doc, target, key)?;
        Some(self.controller.check_spelling(&mut self.doc, request).await)
    }

    /// Routes a document click and delivers any input it caused.
    pub fn click(&mut self, node: NodeId) -> ClickOutcome {
        let outcome = self.controller.click(&mut self.doc, node);
        self.pump();
        outcome
    }

    /// Runs due timers and any check they release.
    pub async fn tick(&mut self) -> Option<CheckOutcome> {
        let request = self.controller.poll_timers(&mut self.doc)?;
        debug!(target = ?request.target, "debounced check released");
        Some(self.controller.check_spelling(&mut self.doc, request).await)
    }

    /// Applies `suggestion` for `id` on `target` and delivers the
    /// follow-up input notification.
    pub fn apply(
        &mut self,
        target: NodeId,
        id: &StableId,
        suggestion: &str,
    ) -> Result<(), CliError> {
        self.controller
            .apply_correction(&mut self.doc, target, id, suggestion)?;
        self.pump();
        Ok(())
    }

    pub fn html(&self) -> String {
        self.doc.to_html(self.doc.body())
    }
}
