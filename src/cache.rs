//! Bounded LRU cache for compiled subtitles.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::pgs::SubtitleData;

/// A cached compilation outcome.
///
/// "Compiled to nothing" is a real, cacheable result: it keeps repeated
/// seeks onto an empty display set from recompiling it. A map miss is the
/// third state, "not yet computed".
#[derive(Debug, Clone)]
pub enum CachedSubtitle {
    /// The display set compiled to no visible subtitle.
    Absent,
    /// The compiled subtitle, shared with every caller that hits this entry.
    Present(Arc<SubtitleData>),
}

struct CacheEntry {
    value: CachedSubtitle,
    last_access: u64,
}

/// Least-recently-used map from display-set index to compilation outcome.
///
/// Compiled pixel buffers are large, so the default capacity stays small:
/// enough to cover a handful of nearby seek targets.
pub(crate) struct SubtitleCache {
    entries: HashMap<usize, CacheEntry>,
    capacity: usize,
    access_counter: u64,
}

pub(crate) const DEFAULT_CACHE_CAPACITY: usize = 8;

impl SubtitleCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            access_counter: 0,
        }
    }

    /// Look up an index, promoting the entry to most recently used.
    pub fn get(&mut self, index: usize) -> Option<CachedSubtitle> {
        self.access_counter += 1;
        let counter = self.access_counter;
        let entry = self.entries.get_mut(&index)?;
        entry.last_access = counter;
        Some(entry.value.clone())
    }

    /// Store a compilation outcome, evicting the least recently used entry
    /// if the capacity is exceeded.
    pub fn insert(&mut self, index: usize, value: CachedSubtitle) {
        self.access_counter += 1;
        self.entries.insert(
            index,
            CacheEntry {
                value,
                last_access: self.access_counter,
            },
        );

        while self.entries.len() > self.capacity {
            if let Some((&lru_index, _)) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_access)
            {
                self.entries.remove(&lru_index);
                trace!(index = lru_index, "evicted cached subtitle");
            }
        }
    }

    /// Drop every entry. Called whenever a new stream is loaded.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.access_counter = 0;
    }

    #[cfg(test)]
    fn contains(&self, index: usize) -> bool {
        self.entries.contains_key(&index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_miss_then_hit() {
        let mut cache = SubtitleCache::new(4);
        assert!(cache.get(0).is_none());

        cache.insert(0, CachedSubtitle::Absent);
        assert!(matches!(cache.get(0), Some(CachedSubtitle::Absent)));
    }

    #[test]
    fn test_eviction_drops_least_recently_used() {
        let mut cache = SubtitleCache::new(3);
        for index in 0..3 {
            cache.insert(index, CachedSubtitle::Absent);
        }

        // Touch 0 so 1 becomes the oldest.
        cache.get(0);
        cache.insert(3, CachedSubtitle::Absent);

        assert!(cache.contains(0));
        assert!(!cache.contains(1));
        assert!(cache.contains(2));
        assert!(cache.contains(3));
    }

    #[test]
    fn test_clear_empties_the_cache() {
        let mut cache = SubtitleCache::new(2);
        cache.insert(0, CachedSubtitle::Absent);
        cache.clear();
        assert!(cache.get(0).is_none());
    }
}
