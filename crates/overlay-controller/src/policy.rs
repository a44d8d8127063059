use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionPolicy {
    /// Grace period before a tooltip closes after the pointer leaves.
    pub hide_delay_ms: u64,
    pub debounce_ms: u64,
    pub notice_ms: u64,
    /// Minimum trimmed length (chars) before a check is scheduled.
    pub min_text_len: usize,
    /// Longer text is cut to this many chars before checking.
    pub max_text_chars: usize,
}

impl InteractionPolicy {
    pub fn hide_delay(&self) -> Duration {
        Duration::from_millis(self.hide_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn notice_lifetime(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}

impl Default for InteractionPolicy {
    fn default() -> Self {
        Self {
            hide_delay_ms: 2000,
            debounce_ms: 1500,
            notice_ms: 5000,
            min_text_len: 2,
            max_text_chars: 400,
        }
    }
}
