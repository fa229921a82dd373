//! Transposition cache for the search.
//!
//! Features:
//! - Maps a 64-bit position hash to the deepest known `(depth, score)`
//! - `EXACT_DEPTH` marks scores valid at any depth (mate, stalemate,
//!   material draw, proven forced mate)
//! - Unbounded by default; `with_limit` caps the entry count, and a full
//!   table is reset before a new key goes in
//! - Stats: probes, hits, stores, resets
//!
//! Hash collisions are not detected.
//!
//! Usage:
//! - On each node: `cache.probe(key, depth)`
//! - For move ordering: `cache.guess(key)` (no stats, 0 on miss)
//! - After a complete (not cut off) search: `cache.store(key, depth, score)`

use std::collections::HashMap;
use tracing::debug;

/// Depth sentinel for scores that hold at any search depth.
pub const EXACT_DEPTH: i32 = i32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CacheEntry {
    /// Search depth the score is valid for
    pub depth: i32,
    /// Score from white's point of view
    pub score: i32,
}

impl CacheEntry {
    pub fn is_exact(&self) -> bool {
        self.depth == EXACT_DEPTH
    }
}

/// Result of probing the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeResult {
    /// No entry for this key.
    Miss,
    /// Entry exists but was searched shallower than requested.
    Shallow(CacheEntry),
    /// Entry is deep enough; the score can be returned directly.
    Usable(i32),
}

#[derive(Debug, Default)]
pub struct TranspositionTable {
    entries: HashMap<u64, CacheEntry>,
    limit: Option<usize>,

    // Stats
    pub probes: u64,
    pub hits: u64,
    pub stores: u64,
    pub resets: u64,
}

impl TranspositionTable {
    /// Unbounded table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Table that resets itself once it holds `limit` entries.
    pub fn with_limit(limit: usize) -> Self {
        assert!(limit >= 1, "limit must be >= 1");
        TranspositionTable {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn probe(&mut self, key: u64, depth: i32) -> ProbeResult {
        self.probes = self.probes.wrapping_add(1);
        let Some(entry) = self.entries.get(&key) else {
            return ProbeResult::Miss;
        };
        self.hits = self.hits.wrapping_add(1);
        if entry.depth >= depth {
            ProbeResult::Usable(entry.score)
        } else {
            ProbeResult::Shallow(*entry)
        }
    }

    pub fn get(&self, key: u64) -> Option<CacheEntry> {
        self.entries.get(&key).copied()
    }

    /// Last stored score for ordering purposes, 0 if unknown.
    pub fn guess(&self, key: u64) -> i32 {
        self.entries.get(&key).map_or(0, |e| e.score)
    }

    /// Stores a score, replacing any previous entry for the key.
    pub fn store(&mut self, key: u64, depth: i32, score: i32) {
        self.stores = self.stores.wrapping_add(1);
        if let Some(limit) = self.limit {
            if self.entries.len() >= limit && !self.entries.contains_key(&key) {
                debug!(entries = self.entries.len(), limit, "transposition table full, resetting");
                self.entries.clear();
                self.resets += 1;
            }
        }
        self.entries.insert(key, CacheEntry { depth, score });
    }

    /// Drops the entry for `key`, forcing the next search to recompute it.
    pub fn remove(&mut self, key: u64) -> Option<CacheEntry> {
        self.entries.remove(&key)
    }

    /// Force clear the table and its stats.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.probes = 0;
        self.hits = 0;
        self.stores = 0;
        self.resets = 0;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return stats snapshot as a human-readable string.
    pub fn stats(&self) -> String {
        format!(
            "TT: entries={} probes={} hits={} stores={} resets={} hit_rate={:.2}%",
            self.entries.len(),
            self.probes,
            self.hits,
            self.stores,
            self.resets,
            if self.probes == 0 {
                0.0
            } else {
                (self.hits as f64 / self.probes as f64) * 100.0
            }
        )
    }
}
