use dom_overlay::{NodeId, RenderReport, TargetShape};
use serde::Serialize;
use spell_model::{SpellError, StableId};

/// Text captured from a target, ready to be checked.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckRequest {
    pub target: NodeId,
    pub text: String,
}

/// A check that passed the busy/invalidated/cache gates and is waiting for
/// its reply. Hand it back to `complete_check` exactly once.
#[derive(Debug)]
pub struct CheckTicket {
    pub(crate) request: CheckRequest,
}

impl CheckTicket {
    pub fn request(&self) -> &CheckRequest {
        &self.request
    }
}

#[derive(Debug)]
pub enum CheckStart {
    /// Resolved without a round trip (cache hit or gate).
    Done(CheckOutcome),
    Pending(CheckTicket),
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum SkipReason {
    /// Another check is in flight; this one is dropped.
    Busy,
    /// The extension context is gone for this page load.
    Invalidated,
    /// Host denylisted or target not eligible.
    NotEligible,
    /// The target left the document before the reply arrived.
    Detached,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub enum CheckOutcome {
    Displayed { rendered: usize, from_cache: bool },
    /// The check succeeded but nothing is left to show after filtering.
    Clean { from_cache: bool },
    /// The service answered with a status message other than "no errors".
    Rejected(String),
    Skipped(SkipReason),
    NeedsSetup,
    Disabled,
    /// Explicit service failure; the message is meant for the user.
    Failed(String),
    Invalidated,
}

/// What a document click ended up doing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClickOutcome {
    Applied,
    /// Apply button clicked but the target could not be resolved.
    ApplyAborted,
    Ignored,
    TooltipPinned,
    TooltipClosed,
    NoticeDismissed,
    Nothing,
}

/// Errors currently drawn on one target.
#[derive(Clone, Debug)]
pub(crate) struct DisplayedErrors {
    pub shape: TargetShape,
    pub errors: Vec<SpellError>,
    pub report: RenderReport,
}

impl DisplayedErrors {
    pub fn find(&self, id: &StableId) -> Option<&SpellError> {
        self.errors.iter().find(|error| &error.stable_id() == id)
    }

    pub fn find_mut(&mut self, id: &StableId) -> Option<&mut SpellError> {
        self.errors.iter_mut().find(|error| &error.stable_id() == id)
    }
}
