//! Snapshot cache
//!
//! This module memoizes engine output per snapshot. Keys are content hashes of
//! the snapshot, the goal, canonical "today" and the settings that change the
//! computation (reference offset, week window), so the same data on the same
//! day is only computed once and any change misses.

use crate::config::{EngineConfig, DEFAULT_CACHE_CAPACITY};
use crate::error::{AnalyticsError, Result};
use crate::normalizer::ReferenceOffset;
use crate::types::{ActivityDayKey, AnalyticsOutput, ReadingGoal, ReadingSnapshot};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, VecDeque};
use tracing::trace;

#[derive(Serialize)]
struct KeyMaterial<'a> {
    snapshot: &'a ReadingSnapshot,
    goal: Option<&'a ReadingGoal>,
    today: ActivityDayKey,
    offset: ReferenceOffset,
    week_window_days: u32,
}

/// Hex-encoded SHA-256 content key for one engine invocation
pub fn snapshot_key(
    snapshot: &ReadingSnapshot,
    goal: Option<&ReadingGoal>,
    today: ActivityDayKey,
    config: &EngineConfig,
) -> Result<String> {
    let material = serde_json::to_vec(&KeyMaterial {
        snapshot,
        goal,
        today,
        offset: config.offset(),
        week_window_days: config.week_window_days,
    })?;
    Ok(hex::encode(Sha256::digest(&material)))
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Bounded cache of engine output, evicting the oldest entry first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotCache {
    entries: HashMap<String, AnalyticsOutput>,
    /// Insertion order, oldest first
    order: VecDeque<String>,
    capacity: usize,
    #[serde(default)]
    hits: u64,
    #[serde(default)]
    misses: u64,
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

impl SnapshotCache {
    /// Create a cache holding at most `capacity` outputs (0 disables caching)
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            hits: 0,
            misses: 0,
        }
    }

    /// Look up an output, counting the hit or miss
    pub fn get(&mut self, key: &str) -> Option<&AnalyticsOutput> {
        match self.entries.get(key) {
            Some(output) => {
                self.hits += 1;
                trace!(key, "snapshot cache hit");
                Some(output)
            }
            None => {
                self.misses += 1;
                trace!(key, "snapshot cache miss");
                None
            }
        }
    }

    pub fn insert(&mut self, key: String, output: AnalyticsOutput) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.insert(key.clone(), output).is_some() {
            return;
        }

        self.order.push_back(key);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Change the bound, evicting the oldest entries that no longer fit
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
        while self.order.len() > capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }

    /// Load cache state from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let cache: SnapshotCache = serde_json::from_str(json)?;
        if cache.order.len() != cache.entries.len() {
            return Err(AnalyticsError::Encoding(
                "snapshot cache order and entries disagree".to_string(),
            ));
        }
        Ok(cache)
    }

    /// Serialize cache state to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityDay, DerivedStats};
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn output(completed: u32) -> AnalyticsOutput {
        AnalyticsOutput {
            stats: DerivedStats {
                completed_count: completed,
                reading_count: 0,
                total_pages_read: 0,
                books_this_week: 0,
                books_this_month: 0,
                books_this_year: 0,
                pages_this_week: 0,
                pages_this_month: 0,
                pages_this_year: 0,
                current_streak: 0,
                longest_streak: 0,
                avg_pages_per_book: 0,
                reading_pace: None,
                goal: None,
            },
            calendar: Vec::new(),
            daily_window: Vec::new(),
        }
    }

    #[test]
    fn test_key_is_stable_and_content_sensitive() {
        let config = EngineConfig::default();
        let today = day(2024, 3, 3);
        let snapshot = ReadingSnapshot {
            activity: vec![ActivityDay::marker(day(2024, 3, 1))],
            ..Default::default()
        };

        let a = snapshot_key(&snapshot, None, today, &config).unwrap();
        let b = snapshot_key(&snapshot.clone(), None, today, &config).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        let next_day = snapshot_key(&snapshot, None, day(2024, 3, 4), &config).unwrap();
        assert_ne!(a, next_day);

        let utc = config.clone().with_offset(ReferenceOffset::utc());
        assert_ne!(a, snapshot_key(&snapshot, None, today, &utc).unwrap());

        let goal = ReadingGoal {
            year: 2024,
            target_books: 12,
        };
        let with_goal = snapshot_key(&snapshot, Some(&goal), today, &config).unwrap();
        assert_ne!(a, with_goal);

        let mut changed = snapshot.clone();
        changed.activity.push(ActivityDay::new(day(2024, 3, 2), 5));
        assert_ne!(a, snapshot_key(&changed, None, today, &config).unwrap());
    }

    #[test]
    fn test_key_depends_on_week_window_but_not_logging() {
        let config = EngineConfig::default();
        let snapshot = ReadingSnapshot::default();
        let today = day(2024, 6, 20);
        let base = snapshot_key(&snapshot, None, today, &config).unwrap();

        let fortnight = EngineConfig {
            week_window_days: 14,
            ..config.clone()
        };
        assert_ne!(base, snapshot_key(&snapshot, None, today, &fortnight).unwrap());

        let mut verbose = config.clone();
        verbose.logging.level = "trace".to_string();
        verbose.cache_capacity = 1;
        assert_eq!(base, snapshot_key(&snapshot, None, today, &verbose).unwrap());
    }

    #[test]
    fn test_shrinking_capacity_evicts_oldest() {
        let mut cache = SnapshotCache::new(3);
        cache.insert("a".to_string(), output(1));
        cache.insert("b".to_string(), output(2));
        cache.insert("c".to_string(), output(3));

        cache.set_capacity(1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.contains("c"));

        cache.insert("d".to_string(), output(4));
        assert!(!cache.contains("c"));
    }

    #[test]
    fn test_hits_and_misses() {
        let mut cache = SnapshotCache::new(4);
        assert!(cache.get("a").is_none());
        cache.insert("a".to_string(), output(1));
        assert_eq!(cache.get("a").map(|o| o.stats.completed_count), Some(1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_evicts_oldest_at_capacity() {
        let mut cache = SnapshotCache::new(2);
        cache.insert("a".to_string(), output(1));
        cache.insert("b".to_string(), output(2));
        cache.insert("c".to_string(), output(3));

        assert_eq!(cache.len(), 2);
        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn test_reinsert_does_not_duplicate_order() {
        let mut cache = SnapshotCache::new(2);
        cache.insert("a".to_string(), output(1));
        cache.insert("a".to_string(), output(1));
        cache.insert("b".to_string(), output(2));
        assert!(cache.contains("a"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_zero_capacity_disables_caching() {
        let mut cache = SnapshotCache::new(0);
        cache.insert("a".to_string(), output(1));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_json_roundtrip_keeps_entries() {
        let mut cache = SnapshotCache::new(3);
        cache.insert("a".to_string(), output(7));
        let json = cache.to_json().unwrap();

        let mut restored = SnapshotCache::from_json(&json).unwrap();
        assert_eq!(restored.capacity(), 3);
        assert_eq!(restored.get("a").map(|o| o.stats.completed_count), Some(7));
    }
}
