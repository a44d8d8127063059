use std::time::{Duration, Instant};

use dom_overlay::{Document, Handlers, NodeId};

use crate::timer::TimerSlot;

pub const NOTICE_CLASS: &str = "spell-setup-notice";
pub const DISMISS_CLASS: &str = "notice-dismiss";

const NOTICE_TEXT: &str = "An API key is required for spell checking.";
const DISMISS_TEXT: &str = "OK";

/// "Needs setup" banner; shown at most once per page load.
#[derive(Debug)]
pub struct SetupNotice {
    shown: bool,
    node: Option<NodeId>,
    expiry: TimerSlot<()>,
    lifetime: Duration,
}

impl SetupNotice {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            shown: false,
            node: None,
            expiry: TimerSlot::new(),
            lifetime,
        }
    }

    /// Returns false when the notice was already shown for this page.
    pub fn show(&mut self, doc: &mut Document, now: Instant) -> bool {
        if self.shown {
            return false;
        }
        self.shown = true;

        let notice = doc.create_element("div");
        doc.add_class(notice, NOTICE_CLASS);
        for (prop, value) in [
            ("position", "fixed"),
            ("top", "20px"),
            ("right", "20px"),
            ("background", "#fff3cd"),
            ("color", "#856404"),
            ("z-index", "10000"),
        ] {
            doc.set_style(notice, prop, value);
        }
        let message = doc.create_element("div");
        let message_text = doc.create_text(NOTICE_TEXT);
        doc.append_child(message, message_text);
        doc.append_child(notice, message);

        let dismiss = doc.create_element("button");
        doc.add_class(dismiss, DISMISS_CLASS);
        doc.set_handlers(dismiss, Handlers::CLICK);
        let dismiss_text = doc.create_text(DISMISS_TEXT);
        doc.append_child(dismiss, dismiss_text);
        doc.append_child(notice, dismiss);

        let body = doc.body();
        doc.append_child(body, notice);
        self.node = Some(notice);
        self.expiry.schedule(now, self.lifetime, ());
        true
    }

    pub fn was_shown(&self) -> bool {
        self.shown
    }

    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn is_dismiss_button(&self, doc: &Document, node: NodeId) -> bool {
        match self.node {
            Some(notice) => doc.contains(notice, node) && doc.has_class(node, DISMISS_CLASS),
            None => false,
        }
    }

    pub fn dismiss(&mut self, doc: &mut Document) {
        self.expiry.cancel();
        if let Some(node) = self.node.take() {
            doc.detach(node);
        }
    }

    pub fn poll(&mut self, doc: &mut Document, now: Instant) -> bool {
        if self.expiry.fire_if_due(now).is_some() {
            self.dismiss(doc);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_once_and_expires() {
        let t0 = Instant::now();
        let mut doc = Document::new("example.com");
        let mut notice = SetupNotice::new(Duration::from_secs(5));
        assert!(notice.show(&mut doc, t0));
        let node = notice.node().unwrap();
        assert!(doc.is_connected(node));

        assert!(!notice.poll(&mut doc, t0 + Duration::from_secs(4)));
        assert!(notice.poll(&mut doc, t0 + Duration::from_secs(5)));
        assert!(!doc.is_connected(node));

        assert!(!notice.show(&mut doc, t0 + Duration::from_secs(6)));
        assert!(notice.node().is_none());
    }
}
