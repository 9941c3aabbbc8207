//! sv_core: Core types, ordering helpers, deadlines, and deterministic RNG.
//!
//! This crate is **I/O-free**. It defines stable types/APIs used across the
//! engine (`sv_algo`, `sv_pipeline`, `sv_io`, `sv_report`, `sv_cli`).
//!
//! - Candidate / voter ids and ballot aliases
//! - `Vote`: per-voter ballots plus derived positional ratings
//! - Deterministic ordering helpers (score descending, id ascending)
//! - Seedable RNG (ChaCha20) for randomized searches
//! - `Deadline`: monotonic time budget
//! - Rule / strategy selections and `SearchParams`
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod deadline;
pub mod rng;
pub mod variables;
pub mod vote;

pub use deadline::Deadline;
pub use rng::SearchRng;
pub use variables::{RuleKind, SearchParams, StrategyMode};
pub use vote::Vote;

pub mod errors {
    use core::fmt;

    /// Error set for core-domain validation & parsing.
    #[derive(Clone, Debug, Eq, PartialEq)]
    pub enum CoreError {
        /// A vote needs at least one candidate and one voter.
        EmptyElection { num_candidates: usize, num_voters: usize },
        InvalidVoter { voter: usize, num_voters: usize },
        InvalidCandidate { candidate: usize, num_candidates: usize },
        BallotLength { expected: usize, found: usize },
        DuplicateCandidate(usize),
        /// A voter's ballot was never set.
        MissingBallot(usize),
        /// Unknown rule / strategy name (kind, offending token).
        UnknownSelection(&'static str, String),
    }

    impl fmt::Display for CoreError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                CoreError::EmptyElection { num_candidates, num_voters } => write!(
                    f,
                    "empty election: {num_candidates} candidates, {num_voters} voters"
                ),
                CoreError::InvalidVoter { voter, num_voters } => {
                    write!(f, "invalid voter id {voter} (voters: {num_voters})")
                }
                CoreError::InvalidCandidate { candidate, num_candidates } => {
                    write!(f, "invalid candidate id {candidate} (candidates: {num_candidates})")
                }
                CoreError::BallotLength { expected, found } => {
                    write!(f, "ballot length {found}, expected {expected}")
                }
                CoreError::DuplicateCandidate(c) => write!(f, "candidate {c} ranked twice"),
                CoreError::MissingBallot(v) => write!(f, "voter {v} has no ballot"),
                CoreError::UnknownSelection(kind, token) => write!(f, "invalid {kind} {token}"),
            }
        }
    }

    impl std::error::Error for CoreError {}
}

pub mod ids {
    //! Plain integer ids. Candidate ids double as array indices.

    /// Candidate id in `[0, num_candidates)`.
    pub type CandidateId = usize;

    /// Voter id in `[0, num_voters)`.
    pub type VoterId = usize;

    /// Positional (Borda-style) score a ballot assigns to a candidate.
    pub type Rating = usize;

    /// One voter's full ranking, most-preferred first.
    pub type Ballot = Vec<CandidateId>;
}

pub mod determinism {
    //! Stable ordering helpers shared by every rule.
    //!
    //! All rankings order candidates by key descending and break equal keys by
    //! the lower candidate id.

    use core::cmp::Ordering;

    use crate::ids::CandidateId;

    /// Compare `(key, id)` pairs: greater key first, then lower id first.
    #[inline]
    pub fn cmp_key_desc_id_asc<K: Ord>(a: (&K, CandidateId), b: (&K, CandidateId)) -> Ordering {
        b.0.cmp(a.0).then_with(|| a.1.cmp(&b.1))
    }

    /// All candidate ids ranked by `keys[id]` descending, ties → lowest id.
    pub fn rank_by_key_desc<K: Ord>(keys: &[K]) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = (0..keys.len()).collect();
        ids.sort_by(|&a, &b| cmp_key_desc_id_asc((&keys[a], a), (&keys[b], b)));
        ids
    }

    /// Rank only the ids in `subset` by `keys[id]` descending, ties → lowest id.
    pub fn rank_subset_by_key_desc<K: Ord>(keys: &[K], subset: &[CandidateId]) -> Vec<CandidateId> {
        let mut ids = subset.to_vec();
        ids.sort_by(|&a, &b| cmp_key_desc_id_asc((&keys[a], a), (&keys[b], b)));
        ids
    }

    /// Candidate with the greatest key; among equals the lowest id wins.
    /// Returns `None` for an empty slice.
    pub fn top_by_key<K: Ord>(keys: &[K]) -> Option<CandidateId> {
        let mut best: Option<CandidateId> = None;
        for (id, key) in keys.iter().enumerate() {
            match best {
                None => best = Some(id),
                Some(b) if key > &keys[b] => best = Some(id),
                _ => {}
            }
        }
        best
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn equal_keys_rank_lowest_id_first() {
            assert_eq!(rank_by_key_desc(&[1, 3, 3, 0]), vec![1, 2, 0, 3]);
            assert_eq!(rank_by_key_desc(&[0, 0, 0]), vec![0, 1, 2]);
        }

        #[test]
        fn top_prefers_lowest_id_among_max() {
            assert_eq!(top_by_key(&[2, 5, 5, 1]), Some(1));
            assert_eq!(top_by_key::<u32>(&[]), None);
        }

        #[test]
        fn subset_ranking_ignores_other_ids() {
            let keys = [9, 1, 4, 4];
            assert_eq!(rank_subset_by_key_desc(&keys, &[3, 1, 2]), vec![2, 3, 1]);
        }
    }
}
