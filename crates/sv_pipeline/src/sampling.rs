// crates/sv_pipeline/src/sampling.rs
//
// Randomized-sampling response: repeatedly perturb every other voter's ballot
// with a few random swaps, take the selected voter's best deviation against
// each synthetic vote, and keep the deviation with the highest accumulated
// score.
//
// Contract:
// - One RNG seeded with `sampling_seed` drives every perturbation.
// - `C/3` swaps per other ballot; the loop stops after `C * V * (C/3)`
//   consecutive repeated deviations or when the budget expires.
// - A deviation's score is the voter's utility under the true vote, summed
//   over every sample that produced it. Only a strictly higher total replaces
//   the incumbent, which starts as the sincere ballot at total 0.

use sv_algo::{PreferenceMemo, Rule, VotingRule};
use sv_core::ids::{Ballot, VoterId};
use sv_core::{Deadline, RuleKind, SearchParams, SearchRng, Vote};

use crate::seeded_with_voter;

/// What the sampling loop did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SamplingStats {
    /// Synthetic votes evaluated.
    pub samples: u64,
    /// Distinct deviations seen.
    pub unique: usize,
    /// `true` if the repeat bound ended the loop (as opposed to the budget).
    pub stagnated: bool,
}

pub fn sampled_response(
    rule: &Rule,
    vote: &Vote,
    voter: VoterId,
    deadline: &Deadline,
    params: &SearchParams,
) -> (Ballot, SamplingStats) {
    let num_candidates = vote.num_candidates();
    let swaps = num_candidates / 3;
    let max_checked_hits = num_candidates * vote.num_voters() * swaps;

    let mut best = vote.preference(voter).to_vec();
    let mut stats = SamplingStats::default();
    if max_checked_hits == 0 {
        tracing::warn!(
            voter,
            num_candidates,
            "fewer than three candidates: sampling has nothing to perturb, keeping sincere ballot"
        );
        return (best, stats);
    }

    let bounded = rule.kind() == RuleKind::Irv;
    // Scored against the true vote, so constant across samples.
    let true_utility = rule.utility(vote, voter) as u64;

    let mut rng = SearchRng::from_seed_u64(params.sampling_seed);
    let mut memo = PreferenceMemo::<u64>::new();
    let mut best_score = 0u64;
    let mut checked_hits = 0usize;

    while checked_hits < max_checked_hits && !deadline.expired() {
        let mut sample = seeded_with_voter(vote, voter);
        for other in (0..vote.num_voters()).filter(|&v| v != voter) {
            let mut pref = vote.preference(other).to_vec();
            rng.perturb(&mut pref, swaps);
            sample.add_preference_owned(other, pref);
        }

        let pref = if bounded {
            rule.find_best_deviation(&sample, voter, &deadline.share(params.sample_share))
        } else {
            rule.find_best_deviation(&sample, voter, deadline)
        };
        stats.samples += 1;

        let (total, repeat) = memo.accumulate(pref.clone(), true_utility);
        if repeat {
            checked_hits += 1;
        } else {
            checked_hits = 0;
        }
        if total > best_score {
            best_score = total;
            best = pref;
        }
    }

    stats.unique = memo.len();
    stats.stagnated = checked_hits >= max_checked_hits;
    tracing::debug!(
        voter,
        samples = stats.samples,
        unique = stats.unique,
        stagnated = stats.stagnated,
        best_score,
        "sampling loop finished"
    );
    (best, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    fn cyclic() -> Vote {
        Vote::from_ballots(3, vec![vec![0, 1, 2], vec![1, 2, 0], vec![2, 0, 1]]).unwrap()
    }

    fn params() -> SearchParams {
        SearchParams::default().with_time_limit(Duration::from_secs(5))
    }

    #[test]
    fn two_candidates_keep_the_sincere_ballot() {
        let vote = Vote::from_ballots(2, vec![vec![1, 0], vec![0, 1]]).unwrap();
        let params = params();
        let rule = Rule::new(RuleKind::Plurality, &params);
        let deadline = Deadline::after(params.time_limit);
        let (ballot, stats) = sampled_response(&rule, &vote, 0, &deadline, &params);
        assert_eq!(ballot, vec![1, 0]);
        assert_eq!(stats, SamplingStats::default());
    }

    #[test]
    fn zero_true_utility_never_displaces_the_sincere_ballot() {
        // Without voter 1, candidate 0 wins and voter 1 rates 0 lowest.
        let vote = cyclic();
        let params = params();
        let rule = Rule::new(RuleKind::Plurality, &params);
        assert_eq!(rule.utility(&vote, 1), 0);
        let deadline = Deadline::after(params.time_limit);
        let (ballot, stats) = sampled_response(&rule, &vote, 1, &deadline, &params);
        assert_eq!(ballot, vec![1, 2, 0]);
        assert!(stats.samples > 0);
    }

    #[test]
    fn loop_stagnates_and_returns_a_seen_deviation() {
        let vote = cyclic();
        let params = params();
        let rule = Rule::new(RuleKind::Plurality, &params);
        let deadline = Deadline::after(params.time_limit);
        let (ballot, stats) = sampled_response(&rule, &vote, 0, &deadline, &params);
        assert!(sv_core::vote::check_ballot(3, &ballot).is_ok());
        assert!(stats.stagnated);
        // At least the nine consecutive repeats that ended the loop.
        assert!(stats.samples >= 9);
        assert!(stats.unique >= 1 && stats.unique <= 6);
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let vote = cyclic();
        let params = params();
        let rule = Rule::new(RuleKind::Borda, &params);
        let a = sampled_response(&rule, &vote, 2, &Deadline::after(params.time_limit), &params);
        let b = sampled_response(&rule, &vote, 2, &Deadline::after(params.time_limit), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn expired_budget_returns_sincere() {
        let vote = cyclic();
        let params = params();
        let rule = Rule::new(RuleKind::Irv, &params);
        let deadline = Deadline::after(Duration::ZERO);
        let (ballot, stats) = sampled_response(&rule, &vote, 0, &deadline, &params);
        assert_eq!(ballot, vote.preference(0));
        assert_eq!(stats.samples, 0);
        assert!(!stats.stagnated);
    }

    /// Every deviation the loop sees, in order, replayed with the same seed.
    fn deviation_stream(
        rule: &Rule,
        vote: &Vote,
        voter: VoterId,
        params: &SearchParams,
    ) -> Vec<Ballot> {
        let swaps = vote.num_candidates() / 3;
        let bound = vote.num_candidates() * vote.num_voters() * swaps;
        let deadline = Deadline::after(params.time_limit);
        let mut rng = SearchRng::from_seed_u64(params.sampling_seed);
        let mut seen = HashSet::new();
        let mut streak = 0;
        let mut stream = Vec::new();
        while streak < bound {
            let mut sample = seeded_with_voter(vote, voter);
            for other in (0..vote.num_voters()).filter(|&v| v != voter) {
                let mut pref = vote.preference(other).to_vec();
                rng.perturb(&mut pref, swaps);
                sample.add_preference_owned(other, pref);
            }
            let dev = rule.find_best_deviation(&sample, voter, &deadline);
            if seen.insert(dev.clone()) {
                streak = 0;
            } else {
                streak += 1;
            }
            stream.push(dev);
        }
        stream
    }

    fn arb_case() -> impl Strategy<Value = (Vote, VoterId, RuleKind)> {
        (3usize..6, 2usize..6).prop_flat_map(|(c, v)| {
            let ballot = Just((0..c).collect::<Vec<_>>()).prop_shuffle();
            (
                proptest::collection::vec(ballot, v)
                    .prop_map(move |ballots| Vote::from_ballots(c, ballots).unwrap()),
                0..v,
                prop::sample::select(vec![RuleKind::Plurality, RuleKind::Borda]),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn most_frequent_deviation_wins((vote, voter, kind) in arb_case()) {
            let params = params();
            let rule = Rule::new(kind, &params);
            prop_assume!(rule.utility(&vote, voter) > 0);

            let stream = deviation_stream(&rule, &vote, voter, &params);
            // With a constant per-sample score, the summed total is a hit count:
            // the first deviation to reach the highest count is kept.
            let mut counts: HashMap<&Ballot, usize> = HashMap::new();
            let mut expected = &stream[0];
            let mut top = 0;
            for dev in &stream {
                let n = counts.entry(dev).or_insert(0);
                *n += 1;
                if *n > top {
                    top = *n;
                    expected = dev;
                }
            }

            let deadline = Deadline::after(params.time_limit);
            let (ballot, stats) = sampled_response(&rule, &vote, voter, &deadline, &params);
            prop_assert_eq!(&ballot, expected);
            prop_assert_eq!(counts[&ballot], *counts.values().max().unwrap());
            prop_assert_eq!(stats.samples, stream.len() as u64);
            prop_assert_eq!(stats.unique, counts.len());
            prop_assert!(stats.stagnated);
        }
    }
}
