use std::time::Instant;

use dom_overlay::text::{char_len, char_slice};
use dom_overlay::NodeId;
use tracing::trace;

use crate::model::CheckRequest;
use crate::policy::InteractionPolicy;
use crate::timer::TimerSlot;

pub const SENTENCE_ENDINGS: [char; 4] = ['.', '?', '!', '。'];

/// Decides when typed text is worth checking: after a typing pause, or
/// right away when a sentence ends.
#[derive(Debug)]
pub struct SmartTrigger {
    debounce: TimerSlot<CheckRequest>,
    policy: InteractionPolicy,
}

impl SmartTrigger {
    pub fn new(policy: InteractionPolicy) -> Self {
        Self {
            debounce: TimerSlot::new(),
            policy,
        }
    }

    fn prepare(&self, target: NodeId, text: &str) -> Option<CheckRequest> {
        if char_len(text.trim()) < self.policy.min_text_len {
            return None;
        }
        let text = if char_len(text) > self.policy.max_text_chars {
            char_slice(text, 0, self.policy.max_text_chars)
        } else {
            text
        };
        Some(CheckRequest {
            target,
            text: text.to_string(),
        })
    }

    /// Restarts the debounce with the latest text. Short text leaves any
    /// pending check untouched.
    pub fn on_input(&mut self, now: Instant, target: NodeId, text: &str) {
        let Some(request) = self.prepare(target, text) else {
            trace!(?target, "text too short to schedule");
            return;
        };
        self.debounce.schedule(now, self.policy.debounce(), request);
    }

    /// Fires immediately on a sentence-ending key, superseding the debounce.
    pub fn on_key(&mut self, target: NodeId, text: &str, key: char) -> Option<CheckRequest> {
        if !SENTENCE_ENDINGS.contains(&key) {
            return None;
        }
        self.debounce.cancel();
        self.prepare(target, text)
    }

    pub fn poll(&mut self, now: Instant) -> Option<CheckRequest> {
        self.debounce.fire_if_due(now)
    }

    pub fn cancel(&mut self) {
        self.debounce.cancel();
    }

    pub fn is_pending(&self) -> bool {
        self.debounce.is_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dom_overlay::Document;
    use std::time::Duration;

    fn target() -> NodeId {
        let mut doc = Document::new("example.com");
        doc.create_element("textarea")
    }

    #[test]
    fn debounce_uses_latest_text() {
        let t0 = Instant::now();
        let node = target();
        let mut trigger = SmartTrigger::new(InteractionPolicy::default());
        trigger.on_input(t0, node, "I ha");
        trigger.on_input(t0 + Duration::from_millis(1000), node, "I has");
        assert!(trigger.poll(t0 + Duration::from_millis(1600)).is_none());
        let fired = trigger.poll(t0 + Duration::from_millis(2500)).unwrap();
        assert_eq!(fired.text, "I has");
        assert!(!trigger.is_pending());
    }

    #[test]
    fn short_text_is_ignored_and_long_text_truncated() {
        let t0 = Instant::now();
        let node = target();
        let mut trigger = SmartTrigger::new(InteractionPolicy::default());
        trigger.on_input(t0, node, " a ");
        assert!(!trigger.is_pending());

        let long = "가".repeat(450);
        trigger.on_input(t0, node, &long);
        let fired = trigger.poll(t0 + Duration::from_secs(2)).unwrap();
        assert_eq!(char_len(&fired.text), 400);
    }

    #[test]
    fn sentence_end_fires_now_and_cancels_debounce() {
        let t0 = Instant::now();
        let node = target();
        let mut trigger = SmartTrigger::new(InteractionPolicy::default());
        trigger.on_input(t0, node, "I has a pen");
        assert!(trigger.on_key(node, "I has a pen", 'n').is_none());
        assert!(trigger.is_pending());

        let fired = trigger.on_key(node, "I has a pen.", '.').unwrap();
        assert_eq!(fired.text, "I has a pen.");
        assert!(!trigger.is_pending());
        assert!(trigger.on_key(node, "문장입니다。", '。').is_some());
    }
}
