// crates/sv_core/src/vote.rs
//
// Per-voter ballots plus derived positional ratings.
//
// A ballot ranks every candidate exactly once, most-preferred first. The
// candidate at rank `r` receives rating `num_candidates - r - 1`; ratings are
// recomputed whenever a ballot is set or replaced.

use core::fmt;

use crate::errors::CoreError;
use crate::ids::{Ballot, CandidateId, Rating, VoterId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Ballots of a fixed electorate.
///
/// Constructed with fixed candidate/voter counts; each voter's ballot is then
/// set via [`Vote::add_preference`] (copy) or [`Vote::add_preference_owned`]
/// (move). Once every ballot is set the vote is treated as immutable.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "VoteRepr"))]
pub struct Vote {
    num_candidates: usize,
    num_voters: usize,
    preferences: Vec<Ballot>,
    ratings: Vec<Vec<Rating>>,
}

impl Vote {
    /// # Panics
    /// If either count is zero.
    pub fn new(num_candidates: usize, num_voters: usize) -> Self {
        match Self::try_new(num_candidates, num_voters) {
            Ok(v) => v,
            Err(e) => panic!("Vote::new: {e}"),
        }
    }

    pub fn try_new(num_candidates: usize, num_voters: usize) -> Result<Self, CoreError> {
        if num_candidates == 0 || num_voters == 0 {
            return Err(CoreError::EmptyElection { num_candidates, num_voters });
        }
        Ok(Self {
            num_candidates,
            num_voters,
            preferences: vec![Vec::new(); num_voters],
            ratings: vec![vec![0; num_candidates]; num_voters],
        })
    }

    /// Build a complete vote from ballots (voter id = position in `ballots`).
    pub fn from_ballots(num_candidates: usize, ballots: Vec<Ballot>) -> Result<Self, CoreError> {
        let mut vote = Self::try_new(num_candidates, ballots.len())?;
        for (voter, ballot) in ballots.into_iter().enumerate() {
            vote.try_add_preference(voter, ballot)?;
        }
        Ok(vote)
    }

    #[inline]
    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    #[inline]
    pub fn num_voters(&self) -> usize {
        self.num_voters
    }

    /// Set `voter`'s ballot from a borrowed slice.
    ///
    /// # Panics
    /// If `voter` is out of range or `pref` is not a permutation of
    /// `[0, num_candidates)`.
    pub fn add_preference(&mut self, voter: VoterId, pref: &[CandidateId]) {
        self.add_preference_owned(voter, pref.to_vec());
    }

    /// Set `voter`'s ballot, taking ownership of `pref`.
    ///
    /// # Panics
    /// Same contract as [`Vote::add_preference`].
    pub fn add_preference_owned(&mut self, voter: VoterId, pref: Ballot) {
        if let Err(e) = self.try_add_preference(voter, pref) {
            panic!("Vote::add_preference: {e}");
        }
    }

    /// Validating twin of [`Vote::add_preference_owned`] for untrusted input.
    pub fn try_add_preference(&mut self, voter: VoterId, pref: Ballot) -> Result<(), CoreError> {
        self.check_voter(voter)?;
        check_ballot(self.num_candidates, &pref)?;
        self.ratings[voter] = positional_ratings(&pref);
        self.preferences[voter] = pref;
        Ok(())
    }

    /// # Panics
    /// If `voter` is out of range.
    #[inline]
    pub fn preference(&self, voter: VoterId) -> &[CandidateId] {
        assert!(voter < self.num_voters, "voter {voter} out of range");
        &self.preferences[voter]
    }

    /// Positional ratings of `voter`'s own ballot, indexed by candidate id.
    ///
    /// # Panics
    /// If `voter` is out of range.
    #[inline]
    pub fn ratings(&self, voter: VoterId) -> &[Rating] {
        assert!(voter < self.num_voters, "voter {voter} out of range");
        &self.ratings[voter]
    }

    pub fn check_voter(&self, voter: VoterId) -> Result<(), CoreError> {
        if voter < self.num_voters {
            Ok(())
        } else {
            Err(CoreError::InvalidVoter { voter, num_voters: self.num_voters })
        }
    }

    /// First voter whose ballot was never set, if any.
    pub fn first_missing(&self) -> Option<VoterId> {
        self.preferences.iter().position(|p| p.is_empty())
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.first_missing().is_none()
    }

    /// Iterate `(voter, ballot)` pairs in voter order.
    pub fn ballots(&self) -> impl Iterator<Item = (VoterId, &[CandidateId])> + '_ {
        self.preferences.iter().enumerate().map(|(v, p)| (v, p.as_slice()))
    }

    /// Maximum rating any ballot can assign (`num_candidates - 1`).
    #[inline]
    pub fn max_rating(&self) -> Rating {
        self.num_candidates - 1
    }
}

/// Wire shape accepted on deserialize. Ratings are never trusted from input;
/// every ballot goes back through [`Vote::from_ballots`].
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct VoteRepr {
    num_candidates: usize,
    preferences: Vec<Ballot>,
}

#[cfg(feature = "serde")]
impl TryFrom<VoteRepr> for Vote {
    type Error = CoreError;

    fn try_from(repr: VoteRepr) -> Result<Self, Self::Error> {
        Vote::from_ballots(repr.num_candidates, repr.preferences)
    }
}

/// Header line `"<candidates> <voters>"`, then one ballot per line.
impl fmt::Display for Vote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", self.num_candidates, self.num_voters)?;
        for pref in &self.preferences {
            let mut first = true;
            for c in pref {
                if !first {
                    f.write_str(" ")?;
                }
                write!(f, "{c}")?;
                first = false;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// Ensure `pref` is a permutation of `[0, num_candidates)`.
pub fn check_ballot(num_candidates: usize, pref: &[CandidateId]) -> Result<(), CoreError> {
    if pref.len() != num_candidates {
        return Err(CoreError::BallotLength { expected: num_candidates, found: pref.len() });
    }
    let mut seen = vec![false; num_candidates];
    for &c in pref {
        if c >= num_candidates {
            return Err(CoreError::InvalidCandidate { candidate: c, num_candidates });
        }
        if seen[c] {
            return Err(CoreError::DuplicateCandidate(c));
        }
        seen[c] = true;
    }
    Ok(())
}

/// Ratings indexed by candidate: rank `i` scores `len - i - 1`.
pub fn positional_ratings(pref: &[CandidateId]) -> Vec<Rating> {
    let n = pref.len();
    let mut ratings = vec![0; n];
    for (rank, &c) in pref.iter().enumerate() {
        ratings[c] = n - rank - 1;
    }
    ratings
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ratings_follow_rank_positions() {
        let mut vote = Vote::new(4, 1);
        vote.add_preference(0, &[2, 0, 3, 1]);
        assert_eq!(vote.ratings(0), &[2, 0, 3, 1]);
        assert_eq!(vote.preference(0), &[2, 0, 3, 1]);
    }

    #[test]
    fn replacing_a_ballot_recomputes_ratings() {
        let mut vote = Vote::new(3, 1);
        vote.add_preference(0, &[0, 1, 2]);
        vote.add_preference_owned(0, vec![2, 1, 0]);
        assert_eq!(vote.ratings(0), &[0, 1, 2]);
    }

    #[test]
    fn display_matches_input_format() {
        let vote = Vote::from_ballots(3, vec![vec![0, 1, 2], vec![1, 2, 0]]).unwrap();
        assert_eq!(vote.to_string(), "3 2\n0 1 2\n1 2 0\n");
    }

    #[test]
    fn rejects_non_permutations() {
        let mut vote = Vote::new(3, 2);
        assert_eq!(
            vote.try_add_preference(0, vec![0, 1]),
            Err(CoreError::BallotLength { expected: 3, found: 2 })
        );
        assert_eq!(vote.try_add_preference(0, vec![0, 0, 1]), Err(CoreError::DuplicateCandidate(0)));
        assert_eq!(
            vote.try_add_preference(0, vec![0, 1, 5]),
            Err(CoreError::InvalidCandidate { candidate: 5, num_candidates: 3 })
        );
        assert_eq!(
            vote.try_add_preference(2, vec![0, 1, 2]),
            Err(CoreError::InvalidVoter { voter: 2, num_voters: 2 })
        );
    }

    #[test]
    fn tracks_missing_ballots() {
        let mut vote = Vote::new(2, 2);
        assert_eq!(vote.first_missing(), Some(0));
        vote.add_preference(0, &[1, 0]);
        assert_eq!(vote.first_missing(), Some(1));
        vote.add_preference(1, &[0, 1]);
        assert!(vote.is_complete());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn preference_panics_on_bad_voter() {
        let vote = Vote::new(2, 1);
        let _ = vote.preference(1);
    }

    #[test]
    fn empty_election_is_rejected() {
        assert!(Vote::try_new(0, 3).is_err());
        assert!(Vote::try_new(3, 0).is_err());
    }

    proptest! {
        #[test]
        fn ratings_are_positional(pref in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()) {
            let mut vote = Vote::new(6, 1);
            vote.add_preference(0, &pref);
            let k = pref.len() - 1;
            for (i, &c) in pref.iter().enumerate() {
                prop_assert_eq!(vote.ratings(0)[c], k - i);
            }
        }
    }
}
