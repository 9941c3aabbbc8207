// crates/sv_pipeline/src/lib.rs
//! sv_pipeline: strategic ballot search for one voter.
//!
//! [`StrategicVote::compute`] validates the request, builds the rule, runs the
//! selected strategy under one wall-clock budget and records what the caller
//! needs for reporting. The crate stays I/O-free; loading and rendering live in
//! `sv_io` and `sv_report`.

#![forbid(unsafe_code)]

pub mod coalition;
pub mod sampling;
pub mod single;

use std::fmt;
use std::time::Duration;

use sv_algo::{Rule, VotingRule};
use sv_core::errors::CoreError;
use sv_core::ids::{Ballot, CandidateId, Rating, VoterId};
use sv_core::{Deadline, RuleKind, SearchParams, StrategyMode, Vote};

pub use sampling::SamplingStats;

// ----------------------------- Errors -------------------------------------------------

/// Single error surface for the orchestration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The vote or the requested voter failed core validation.
    Validate(CoreError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Validate(e) => write!(f, "validate: {e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Validate(e) => Some(e),
        }
    }
}

impl From<CoreError> for PipelineError {
    fn from(e: CoreError) -> Self {
        PipelineError::Validate(e)
    }
}

// ----------------------------- Result -------------------------------------------------

/// Outcome of one strategic search.
#[derive(Clone, Debug)]
pub struct StrategicVote {
    voter: VoterId,
    rule: RuleKind,
    strategy: StrategyMode,
    base_ratings: Vec<usize>,
    strategic_preference: Ballot,
    sincere_rating: Rating,
    strategic_rating: Rating,
    sampling: Option<SamplingStats>,
    elapsed: Duration,
}

impl StrategicVote {
    /// Run `strategy` for `voter` under `rule`. The whole call shares one
    /// budget of `params.time_limit`.
    pub fn compute(
        vote: &Vote,
        voter: VoterId,
        rule: RuleKind,
        strategy: StrategyMode,
        params: &SearchParams,
    ) -> Result<Self, PipelineError> {
        vote.check_voter(voter)?;
        if let Some(missing) = vote.first_missing() {
            return Err(CoreError::MissingBallot(missing).into());
        }

        let deadline = Deadline::after(params.time_limit);
        let engine = Rule::new(rule, params);
        let base_ratings = engine.scores(vote, Some(voter));

        let mut sampling = None;
        let strategic_preference = match strategy {
            StrategyMode::Single => single::best_response(&engine, vote, voter, &deadline),
            StrategyMode::FullCoalition => {
                coalition::coalition_response(&engine, vote, voter, &deadline, params)
            }
            StrategyMode::Sampling => {
                let (ballot, stats) =
                    sampling::sampled_response(&engine, vote, voter, &deadline, params);
                sampling = Some(stats);
                ballot
            }
            StrategyMode::Sincere => vote.preference(voter).to_vec(),
        };
        let elapsed = deadline.elapsed();

        let sincere_rating = counted_rating(&engine, vote, voter, vote.preference(voter));
        let strategic_rating = counted_rating(&engine, vote, voter, &strategic_preference);

        tracing::info!(
            voter,
            rule = rule.as_str(),
            strategy = strategy.as_str(),
            sincere_rating,
            strategic_rating,
            elapsed_ms = elapsed.as_millis() as u64,
            "strategic search finished"
        );

        Ok(Self {
            voter,
            rule,
            strategy,
            base_ratings,
            strategic_preference,
            sincere_rating,
            strategic_rating,
            sampling,
            elapsed,
        })
    }

    #[inline]
    pub fn voter(&self) -> VoterId {
        self.voter
    }

    #[inline]
    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    #[inline]
    pub fn strategy(&self) -> StrategyMode {
        self.strategy
    }

    /// Aggregate scores with the selected voter excluded.
    #[inline]
    pub fn base_ratings(&self) -> &[usize] {
        &self.base_ratings
    }

    #[inline]
    pub fn strategic_preference(&self) -> &[CandidateId] {
        &self.strategic_preference
    }

    /// Voter's rating of the winner when the sincere ballot is counted.
    #[inline]
    pub fn sincere_rating(&self) -> Rating {
        self.sincere_rating
    }

    /// Voter's rating of the winner when the strategic ballot is counted.
    #[inline]
    pub fn strategic_rating(&self) -> Rating {
        self.strategic_rating
    }

    /// Loop statistics, present for randomized sampling only.
    #[inline]
    pub fn sampling_stats(&self) -> Option<&SamplingStats> {
        self.sampling.as_ref()
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// `voter`'s sincere rating of the winner of `vote` with `ballot` substituted
/// for (and counted as) that voter's ballot.
pub fn counted_rating(rule: &Rule, vote: &Vote, voter: VoterId, ballot: &[CandidateId]) -> Rating {
    let winner = if ballot == vote.preference(voter) {
        rule.winner(vote, None)
    } else {
        let mut substituted = vote.clone();
        substituted.add_preference(voter, ballot);
        rule.winner(&substituted, None)
    };
    vote.ratings(voter)[winner]
}

/// Copy of `vote` shape with only `voter`'s sincere ballot filled in.
pub(crate) fn seeded_with_voter(vote: &Vote, voter: VoterId) -> Vote {
    let mut synthetic = Vote::new(vote.num_candidates(), vote.num_voters());
    synthetic.add_preference(voter, vote.preference(voter));
    synthetic
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cyclic() -> Vote {
        Vote::from_ballots(3, vec![vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]).unwrap()
    }

    #[test]
    fn rejects_out_of_range_voter() {
        let err = StrategicVote::compute(
            &cyclic(),
            3,
            RuleKind::Plurality,
            StrategyMode::Single,
            &SearchParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::Validate(CoreError::InvalidVoter { voter: 3, num_voters: 3 }));
    }

    #[test]
    fn rejects_incomplete_vote() {
        let mut vote = Vote::new(3, 2);
        vote.add_preference(0, &[0, 1, 2]);
        let err = StrategicVote::compute(
            &vote,
            0,
            RuleKind::Borda,
            StrategyMode::Single,
            &SearchParams::default(),
        )
        .unwrap_err();
        assert_eq!(err, PipelineError::Validate(CoreError::MissingBallot(1)));
        assert_eq!(err.to_string(), "validate: voter 1 has no ballot");
    }

    #[test]
    fn sincere_strategy_echoes_the_ballot() {
        let vote = cyclic();
        let result = StrategicVote::compute(
            &vote,
            1,
            RuleKind::Irv,
            StrategyMode::Sincere,
            &SearchParams::default(),
        )
        .unwrap();
        assert_eq!(result.strategic_preference(), vote.preference(1));
        assert_eq!(result.sincere_rating(), result.strategic_rating());
        assert!(result.sampling_stats().is_none());
    }

    #[test]
    fn base_ratings_exclude_the_voter() {
        let vote = cyclic();
        let result = StrategicVote::compute(
            &vote,
            0,
            RuleKind::Plurality,
            StrategyMode::Single,
            &SearchParams::default(),
        )
        .unwrap();
        assert_eq!(result.base_ratings(), &[0, 1, 1]);
        assert_eq!(result.voter(), 0);
        assert_eq!(result.rule(), RuleKind::Plurality);
        assert_eq!(result.strategy(), StrategyMode::Single);
    }

    #[test]
    fn counted_rating_substitutes_the_ballot() {
        let vote = cyclic();
        let rule = Rule::new(RuleKind::Plurality, &SearchParams::default());
        // Sincere: three-way tie, lowest id 0 wins; voter 1 rates 0 lowest.
        assert_eq!(counted_rating(&rule, &vote, 1, &[1, 2, 0]), 0);
        // Voter 1 backs 2: 2 wins with two votes.
        assert_eq!(counted_rating(&rule, &vote, 1, &[2, 1, 0]), 1);
    }
}
