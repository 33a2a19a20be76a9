// src/game/search/tt.rs

use rand::Rng;
use std::collections::HashMap;

use crate::constants::{TT_CAPACITY, TT_EVICTION_RATE};
use crate::game::search::SearchResult;

/// Position-fingerprint cache of solved results.
///
/// Keys are Zobrist fingerprints (board contents + side to move); collisions
/// silently overwrite. Capacity is only enforced at write time: when a write
/// pushes the table past capacity, one eviction pass samples out roughly a
/// quarter of the entries. A cheap approximate memory bound, not LRU.
pub struct TranspositionTable {
    table: HashMap<u64, SearchResult>,
    capacity: usize,
    enabled: bool,
}

impl TranspositionTable {
    pub fn new() -> Self {
        Self::with_capacity(TT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            table: HashMap::new(),
            capacity,
            enabled: true,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Cached result for `fingerprint`, or `None`. Always a miss when the
    /// table is disabled.
    pub fn read(&self, fingerprint: u64) -> Option<SearchResult> {
        if !self.enabled {
            return None;
        }
        self.table.get(&fingerprint).copied()
    }

    /// Store `result` under `fingerprint`. Returns true when the write
    /// triggered an eviction pass.
    pub fn write(&mut self, fingerprint: u64, result: SearchResult) -> bool {
        if !self.enabled {
            return false;
        }
        debug_assert!(
            matches!(
                result,
                SearchResult::Win | SearchResult::Loss | SearchResult::Draw
            ),
            "only settled results belong in the transposition table"
        );
        self.table.insert(fingerprint, result);
        if self.table.len() > self.capacity {
            let mut rng = rand::thread_rng();
            self.table.retain(|_, _| !rng.gen_bool(TT_EVICTION_RATE));
            return true;
        }
        false
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new()
    }
}
