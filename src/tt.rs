//! Fixed-size direct-mapped transposition table.

use std::mem;

use crate::eval::MATE_THRESHOLD;
use crate::types::Move;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    LowerBound,
    UpperBound,
}

#[derive(Clone, Copy, Debug)]
pub struct TtEntry {
    pub hash: u64,
    pub depth: u32,
    /// Score, rebased to distance-from-this-node for mate scores.
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

pub struct TranspositionTable {
    table: Vec<Option<TtEntry>>,
    mask: usize,
}

impl TranspositionTable {
    /// Builds a table sized to approximately `size_mb` megabytes, rounded
    /// down to a power-of-two entry count.
    #[must_use]
    pub fn new(size_mb: usize) -> Self {
        let entry_size = mem::size_of::<Option<TtEntry>>();
        let mut num_entries = (size_mb * 1024 * 1024) / entry_size;
        num_entries = num_entries.next_power_of_two() / 2;
        if num_entries == 0 {
            num_entries = 1024;
        }
        TranspositionTable { table: vec![None; num_entries], mask: num_entries - 1 }
    }

    #[inline]
    fn index(&self, hash: u64) -> usize {
        (hash as usize) & self.mask
    }

    /// Looks up `hash`, rebasing any mate score back to distance-from-root
    /// using `ply` (the probing node's depth from the search root).
    #[must_use]
    pub fn probe(&self, hash: u64, ply: u32) -> Option<TtEntry> {
        let slot = self.table[self.index(hash)].as_ref()?;
        if slot.hash != hash {
            return None;
        }
        let mut entry = *slot;
        entry.score = rebase_from_node(entry.score, ply);
        Some(entry)
    }

    /// Stores an entry for `hash`, rebasing a mate score to
    /// distance-from-this-node using `ply` before writing.
    pub fn store(
        &mut self,
        hash: u64,
        depth: u32,
        score: i32,
        bound: Bound,
        best_move: Option<Move>,
        ply: u32,
    ) {
        let index = self.index(hash);
        let rebased_score = rebase_to_node(score, ply);
        let should_replace = match &self.table[index] {
            None => true,
            Some(existing) if existing.hash == hash => existing.depth <= depth,
            Some(existing) => existing.depth + 1 < depth,
        };
        if should_replace {
            self.table[index] =
                Some(TtEntry { hash, depth, score: rebased_score, bound, best_move });
        }
    }

    pub fn clear(&mut self) {
        for slot in &mut self.table {
            *slot = None;
        }
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::new(16)
    }
}

/// Mate scores encode "mate in N plies from the node where they were
/// computed". Stored at a different node than they're read from, N needs
/// shifting by the difference in ply so "distance to mate" stays absolute
/// from the root. Rebase to store: subtract the node's ply (the score
/// becomes relative to node 0, i.e. this node). Rebase to load: add the
/// probing node's ply back.
fn rebase_to_node(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score + ply as i32
    } else if score <= -MATE_THRESHOLD {
        score - ply as i32
    } else {
        score
    }
}

fn rebase_from_node(score: i32, ply: u32) -> i32 {
    if score >= MATE_THRESHOLD {
        score - ply as i32
    } else if score <= -MATE_THRESHOLD {
        score + ply as i32
    } else {
        score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_an_exact_entry() {
        let mut tt = TranspositionTable::new(1);
        tt.store(42, 5, 123, Bound::Exact, None, 0);
        let entry = tt.probe(42, 0).unwrap();
        assert_eq!(entry.score, 123);
        assert_eq!(entry.depth, 5);
    }

    #[test]
    fn hash_mismatch_at_same_slot_misses() {
        let mut tt = TranspositionTable::new(1);
        tt.store(42, 5, 123, Bound::Exact, None, 0);
        // A different hash that happens to collide on index (mask is small
        // for a 1MB table) must not return the wrong entry.
        let other_hash = 42 ^ (tt.mask as u64 + 1);
        assert!(tt.probe(other_hash, 0).is_none() || other_hash == 42);
    }

    #[test]
    fn shallower_entry_does_not_replace_deeper_one() {
        let mut tt = TranspositionTable::new(1);
        tt.store(7, 10, 50, Bound::Exact, None, 0);
        tt.store(7 | (tt.mask as u64 + 1), 2, 999, Bound::Exact, None, 0);
        // Same index (differs only in the high bits masked away), shallower
        // depth: the deep entry survives unless the hash actually matches.
        let entry = tt.probe(7, 0).unwrap();
        assert_eq!(entry.depth, 10);
    }

    #[test]
    fn mate_score_rebases_across_differing_ply() {
        let mut tt = TranspositionTable::new(1);
        // Stored 3 plies deep into the tree with "mate in 2 from here".
        tt.store(9, 4, crate::eval::winning(2), Bound::Exact, None, 3);
        // Probed again from the same node (same ply) must round-trip exactly.
        let entry = tt.probe(9, 3).unwrap();
        assert_eq!(entry.score, crate::eval::winning(2));
    }
}
