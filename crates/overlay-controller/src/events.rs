use dom_overlay::NodeId;
use spell_model::StableId;

use crate::model::CheckOutcome;

/// Things the controller did that a host may want to observe.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    CheckFinished {
        target: NodeId,
        outcome: CheckOutcome,
    },
    CorrectionApplied {
        target: NodeId,
        id: StableId,
        replacement: String,
    },
    ErrorIgnored {
        id: StableId,
        hidden: usize,
    },
    SetupNoticeShown,
    /// Explicit service failure, suitable for showing to the user.
    ApiFailure {
        message: String,
    },
    Invalidated,
}

#[derive(Debug, Default)]
pub(crate) struct EventLog {
    pending: Vec<ControllerEvent>,
}

impl EventLog {
    pub fn emit(&mut self, event: ControllerEvent) {
        self.pending.push(event);
    }

    pub fn drain(&mut self) -> Vec<ControllerEvent> {
        std::mem::take(&mut self.pending)
    }
}
