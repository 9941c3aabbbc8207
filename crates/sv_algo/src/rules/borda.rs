// crates/sv_algo/src/rules/borda.rs
//
// Borda count: each counted ballot adds its positional ratings.
//
// Deviation strategy: boost the single most promising contender (deficit
// below `num_candidates`) to rank 0 and bury the remaining candidates by
// harmlessness, so a second-choice contender gets as few points as possible.

use sv_core::determinism::{rank_subset_by_key_desc, top_by_key};
use sv_core::ids::{Ballot, CandidateId, Rating, VoterId};
use sv_core::{Deadline, RuleKind, Vote};

use crate::VotingRule;

#[derive(Clone, Copy, Debug, Default)]
pub struct BordaCount;

impl BordaCount {
    /// Contender with the best own rating. The max scorer always qualifies,
    /// so the result is a true contender.
    pub fn boosted_candidate(scores: &[usize], own_ratings: &[Rating]) -> CandidateId {
        let n = scores.len();
        let max_score = scores.iter().copied().max().unwrap_or(0);
        let keys: Vec<Option<Rating>> = scores
            .iter()
            .zip(own_ratings)
            .map(|(&score, &rating)| (max_score - score < n).then_some(rating))
            .collect();
        match top_by_key(&keys) {
            Some(c) => c,
            None => unreachable!("a vote has at least one candidate"),
        }
    }

    /// Deviation against precomputed scores (voter already excluded).
    pub fn deviation_from_scores(scores: &[usize], own_ratings: &[Rating]) -> Ballot {
        let max_score = scores.iter().copied().max().unwrap_or(0);
        let boosted = Self::boosted_candidate(scores, own_ratings);

        // Harmlessness is the inverted chance of winning.
        let harmlessness: Vec<usize> = scores.iter().map(|&s| max_score - s).collect();
        let rest: Vec<CandidateId> = (0..scores.len()).filter(|&c| c != boosted).collect();

        let mut ballot = Vec::with_capacity(scores.len());
        ballot.push(boosted);
        ballot.extend(rank_subset_by_key_desc(&harmlessness, &rest));
        ballot
    }
}

impl VotingRule for BordaCount {
    fn kind(&self) -> RuleKind {
        RuleKind::Borda
    }

    fn scores(&self, vote: &Vote, excluded: Option<VoterId>) -> Vec<usize> {
        let mut scores = vec![0usize; vote.num_candidates()];
        for voter in 0..vote.num_voters() {
            if Some(voter) == excluded {
                continue;
            }
            for (total, &rating) in scores.iter_mut().zip(vote.ratings(voter)) {
                *total += rating;
            }
        }
        scores
    }

    fn winner(&self, vote: &Vote, excluded: Option<VoterId>) -> CandidateId {
        let scores = self.scores(vote, excluded);
        match top_by_key(&scores) {
            Some(c) => c,
            None => unreachable!("a vote has at least one candidate"),
        }
    }

    fn utility(&self, vote: &Vote, voter: VoterId) -> Rating {
        vote.ratings(voter)[self.winner(vote, Some(voter))]
    }

    fn find_best_deviation(&self, vote: &Vote, voter: VoterId, _deadline: &Deadline) -> Ballot {
        let scores = self.scores(vote, Some(voter));
        Self::deviation_from_scores(&scores, vote.ratings(voter))
    }
}
