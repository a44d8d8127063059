use std::time::{Duration, Instant};

/// One pending deadline per concern. Scheduling again replaces whatever was
/// pending; nothing fires unless polled.
#[derive(Debug)]
pub struct TimerSlot<T> {
    pending: Option<(Instant, T)>,
}

impl<T> Default for TimerSlot<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> TimerSlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, delay: Duration, payload: T) {
        self.pending = Some((now + delay, payload));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, payload)| payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    /// Takes the payload once its deadline has been reached.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((at, _)) if now >= *at => self.cancel(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_at_deadline() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        slot.schedule(start, Duration::from_millis(100), "a");
        assert_eq!(slot.fire_if_due(start + Duration::from_millis(99)), None);
        assert_eq!(slot.fire_if_due(start + Duration::from_millis(100)), Some("a"));
        assert_eq!(slot.fire_if_due(start + Duration::from_secs(1)), None);
    }

    #[test]
    fn rescheduling_replaces_pending() {
        let start = Instant::now();
        let mut slot = TimerSlot::new();
        slot.schedule(start, Duration::from_millis(100), 1);
        slot.schedule(start + Duration::from_millis(50), Duration::from_millis(100), 2);
        assert_eq!(slot.fire_if_due(start + Duration::from_millis(120)), None);
        assert_eq!(slot.fire_if_due(start + Duration::from_millis(150)), Some(2));
    }
}
