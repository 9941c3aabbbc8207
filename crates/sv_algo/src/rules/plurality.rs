// crates/sv_algo/src/rules/plurality.rs
//
// Plurality: each counted ballot scores one point for its top choice.
//
// Contract:
// - The manipulating voter is excluded from aggregation.
// - Winner = max score, ties → lowest candidate id.
// - Deviation: front-runners (deficit < 2) ranked by the voter's own rating,
//   everybody else after them (key 0), ties → lowest id.

use sv_core::determinism::{rank_by_key_desc, top_by_key};
use sv_core::ids::{Ballot, CandidateId, Rating, VoterId};
use sv_core::{Deadline, RuleKind, Vote};

use crate::VotingRule;

/// Score deficit below which a candidate still counts as a front-runner.
pub const FRONT_RUNNER_DEFICIT: usize = 2;

#[derive(Clone, Copy, Debug, Default)]
pub struct Plurality;

impl Plurality {
    /// Deviation against precomputed scores (voter already excluded).
    pub fn deviation_from_scores(scores: &[usize], own_ratings: &[Rating]) -> Ballot {
        let max_score = scores.iter().copied().max().unwrap_or(0);
        let keys: Vec<Rating> = scores
            .iter()
            .zip(own_ratings)
            .map(|(&score, &rating)| {
                // Discretise: 1 for a front-runner, 0 for a loser.
                let front_runner = usize::from(max_score - score < FRONT_RUNNER_DEFICIT);
                front_runner * rating
            })
            .collect();
        rank_by_key_desc(&keys)
    }
}

impl VotingRule for Plurality {
    fn kind(&self) -> RuleKind {
        RuleKind::Plurality
    }

    fn scores(&self, vote: &Vote, excluded: Option<VoterId>) -> Vec<usize> {
        let mut scores = vec![0usize; vote.num_candidates()];
        for (voter, pref) in vote.ballots() {
            if Some(voter) == excluded {
                continue;
            }
            // Rate top ranked candidates only.
            if let Some(&top) = pref.first() {
                scores[top] += 1;
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
