use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use base64::{engine::general_purpose::STANDARD as Base64, Engine as _};
use serde::{Deserialize, Serialize};
use soulspell_core_types::SharedClock;
use tracing::debug;

use crate::model::CheckResult;

/// Reversible encoding of the checked text; equal keys mean equal text.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_text(text: &str) -> Self {
        Self(Base64.encode(text.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CachePolicy {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl CachePolicy {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: 50,
            ttl_secs: 10 * 60,
        }
    }
}

struct CacheEntry {
    result: CheckResult,
    inserted_at: Instant,
}

/// Bounded, time-limited memo of check results keyed by the checked text.
///
/// Eviction is FIFO by first insertion; expiry is measured from insertion
/// and enforced lazily on lookup.
pub struct ResultCache {
    entries: HashMap<CacheKey, CacheEntry>,
    order: VecDeque<CacheKey>,
    capacity: usize,
    ttl: Duration,
    clock: SharedClock,
}

impl ResultCache {
    pub fn new(policy: &CachePolicy, clock: SharedClock) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            capacity: policy.capacity.max(1),
            ttl: policy.ttl(),
            clock,
        }
    }

    pub fn get(&mut self, text: &str) -> Option<CheckResult> {
        let key = CacheKey::for_text(text);
        let inserted_at = self.entries.get(&key)?.inserted_at;
        if self.clock.now().saturating_duration_since(inserted_at) < self.ttl {
            return self.entries.get(&key).map(|entry| entry.result.clone());
        }
        debug!(key = key.as_str(), "cache entry expired");
        self.remove(&key);
        None
    }

    /// Stores `result` for `text`. Re-putting an existing text refreshes its
    /// value and timestamp but keeps its place in the eviction order.
    pub fn put(&mut self, text: &str, result: CheckResult) {
        let key = CacheKey::for_text(text);
        let entry = CacheEntry {
            result,
            inserted_at: self.clock.now(),
        };
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = entry;
            return;
        }
        while self.entries.len() >= self.capacity {
            let Some(oldest) = self.order.pop_front() else {
                break;
            };
            debug!(key = oldest.as_str(), "evicting oldest cache entry");
            self.entries.remove(&oldest);
        }
        self.order.push_back(key.clone());
        self.entries.insert(key, entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.entries.contains_key(&CacheKey::for_text(text))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    fn remove(&mut self, key: &CacheKey) {
        self.entries.remove(key);
        self.order.retain(|k| k != key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use soulspell_core_types::ManualClock;
    use std::sync::Arc;

    fn cache(capacity: usize, clock: Arc<ManualClock>) -> ResultCache {
        ResultCache::new(
            &CachePolicy {
                capacity,
                ttl_secs: 600,
            },
            clock,
        )
    }

    #[test]
    fn key_is_reversible_encoding() {
        let key = CacheKey::for_text("맞춤법 검사");
        let decoded = Base64.decode(key.as_str()).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "맞춤법 검사");
        assert_ne!(CacheKey::for_text("a"), CacheKey::for_text("b"));
    }

    #[test]
    fn overflow_evicts_first_inserted() {
        let clock = ManualClock::new();
        let mut cache = cache(3, clock);
        for text in ["one", "two", "three"] {
            cache.put(text, CheckResult::empty(text));
        }
        cache.put("four", CheckResult::empty("four"));

        assert_eq!(cache.len(), 3);
        assert!(cache.get("one").is_none());
        for text in ["two", "three", "four"] {
            assert_eq!(cache.get(text).unwrap().source_text, text);
        }
    }

    #[test]
    fn lookup_does_not_change_eviction_order() {
        let clock = ManualClock::new();
        let mut cache = cache(2, clock);
        cache.put("a", CheckResult::empty("a"));
        cache.put("b", CheckResult::empty("b"));
        assert!(cache.get("a").is_some());
        cache.put("c", CheckResult::empty("c"));
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[test]
    fn re_put_refreshes_without_moving() {
        let clock = ManualClock::new();
        let mut cache = cache(2, clock.clone());
        cache.put("a", CheckResult::empty("a"));
        cache.put("b", CheckResult::empty("b"));
        clock.advance(Duration::from_secs(500));
        cache.put("a", CheckResult::empty("a"));
        assert_eq!(cache.len(), 2);

        clock.advance(Duration::from_secs(200));
        assert!(cache.get("a").is_some());
        assert!(cache.get("b").is_none());
    }

    #[test]
    fn expired_entry_is_purged_on_lookup() {
        let clock = ManualClock::new();
        let mut cache = cache(5, clock.clone());
        cache.put("text", CheckResult::empty("text"));
        clock.advance(Duration::from_secs(599));
        assert!(cache.get("text").is_some());
        clock.advance(Duration::from_secs(1));
        assert!(cache.get("text").is_none());
        assert!(cache.is_empty());
    }
}
