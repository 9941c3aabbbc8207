// crates/sv_algo/src/memo.rs
//
// Deduplicating map over candidate-id permutations.
//
// Keys are hashed with the standard structural hash of the ordered id
// sequence; equality is exact, so a repeat is never missed.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use sv_core::ids::{Ballot, CandidateId};

/// Map from ballot (permutation) to a per-ballot value.
#[derive(Clone, Debug, Default)]
pub struct PreferenceMemo<V> {
    map: HashMap<Ballot, V>,
}

/// Plain "already tried?" set.
pub type PreferenceSet = PreferenceMemo<()>;

impl<V> PreferenceMemo<V> {
    pub fn new() -> Self {
        Self { map: HashMap::new() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub fn contains(&self, ballot: &[CandidateId]) -> bool {
        self.map.contains_key(ballot)
    }

    #[inline]
    pub fn get(&self, ballot: &[CandidateId]) -> Option<&V> {
        self.map.get(ballot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[CandidateId], &V)> + '_ {
        self.map.iter().map(|(k, v)| (k.as_slice(), v))
    }
}

impl PreferenceMemo<()> {
    /// Record `ballot`; `true` if it had not been seen before.
    pub fn insert(&mut self, ballot: &[CandidateId]) -> bool {
        if self.map.contains_key(ballot) {
            return false;
        }
        self.map.insert(ballot.to_vec(), ());
        true
    }
}

impl PreferenceMemo<u64> {
    /// Add `score` to `ballot`'s running total (starting a new total if the
    /// ballot is unseen). Returns the updated total and whether it was a repeat.
    pub fn accumulate(&mut self, ballot: Ballot, score: u64) -> (u64, bool) {
        match self.map.entry(ballot) {
            Entry::Occupied(mut e) => {
                let total = e.get_mut();
                *total = total.saturating_add(score);
                (*total, true)
            }
            Entry::Vacant(e) => (*e.insert(score), false),
        }
    }
}
