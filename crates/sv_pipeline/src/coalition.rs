// crates/sv_pipeline/src/coalition.rs
//
// Full-coalition response: every other voter first plays their own best
// deviation against the true vote, then the selected voter answers the
// resulting (strategic) vote with their sincere ballot in place.
//
// Budget: for IRV each other voter gets `coalition_share / num_voters` of the
// budget, fixed up front; the final search gets whatever is left.

use sv_algo::{Rule, VotingRule};
use sv_core::ids::{Ballot, VoterId};
use sv_core::{Deadline, RuleKind, SearchParams, Vote};

use crate::seeded_with_voter;

pub fn coalition_response(
    rule: &Rule,
    vote: &Vote,
    voter: VoterId,
    deadline: &Deadline,
    params: &SearchParams,
) -> Ballot {
    let strategic = strategic_vote(rule, vote, voter, deadline, params);
    rule.find_best_deviation(&strategic, voter, deadline)
}

/// The vote in which every voter but `voter` has switched to their deviation.
pub fn strategic_vote(
    rule: &Rule,
    vote: &Vote,
    voter: VoterId,
    deadline: &Deadline,
    params: &SearchParams,
) -> Vote {
    let bounded = rule.kind() == RuleKind::Irv;
    let slice = deadline
        .share_among(params.coalition_share, vote.num_voters())
        .limit();

    let mut strategic = seeded_with_voter(vote, voter);
    for other in (0..vote.num_voters()).filter(|&v| v != voter) {
        let pref = if bounded {
            rule.find_best_deviation(vote, other, &Deadline::after(slice))
        } else {
            rule.find_best_deviation(vote, other, deadline)
        };
        strategic.add_preference_owned(other, pref);
    }

    tracing::debug!(voter, rule = rule.kind().as_str(), "coalition vote assembled");
    strategic
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn other_voters_switch_before_the_final_answer() {
        let vote = Vote::from_ballots(
            3,
            vec![
                vec![2, 1, 0],
                vec![0, 1, 2],
                vec![0, 2, 1],
                vec![0, 1, 2],
                vec![1, 0, 2],
                vec![1, 2, 0],
            ],
        )
        .unwrap();
        let params = SearchParams::default();
        let rule = Rule::new(RuleKind::Plurality, &params);
        let deadline = Deadline::after(Duration::from_secs(1));

        let strategic = strategic_vote(&rule, &vote, 0, &deadline, &params);
        assert_eq!(strategic.preference(0), vote.preference(0));
        // Voters 1..=3 already back the leader.
        for v in 1..=3 {
            assert_eq!(strategic.preference(v), vote.preference(v));
        }
        // Without their own ballot, voters 4 and 5 see 0 leading by two.
        assert_eq!(strategic.preference(4), &[0, 1, 2]);
        assert_eq!(strategic.preference(5), &[0, 1, 2]);

        // Alone against a unanimous field, voter 0 can only rank by id.
        assert_eq!(coalition_response(&rule, &vote, 0, &deadline, &params), vec![0, 1, 2]);
        // Facing the sincere field instead, 1 is still worth backing.
        assert_eq!(rule.find_best_deviation(&vote, 0, &deadline), vec![1, 0, 2]);
    }

    #[test]
    fn single_voter_coalition_is_a_plain_best_response() {
        let vote = Vote::from_ballots(3, vec![vec![1, 0, 2]]).unwrap();
        let params = SearchParams::default();
        let rule = Rule::new(RuleKind::Borda, &params);
        let deadline = Deadline::after(Duration::from_secs(1));
        assert_eq!(
            coalition_response(&rule, &vote, 0, &deadline, &params),
            rule.find_best_deviation(&vote, 0, &deadline)
        );
    }

    #[test]
    fn irv_other_voters_stay_within_their_share() {
        let vote = Vote::from_ballots(
            4,
            vec![
                vec![3, 1, 0, 2],
                vec![2, 1, 0, 3],
                vec![2, 0, 1, 3],
                vec![2, 1, 3, 0],
                vec![1, 2, 0, 3],
            ],
        )
        .unwrap();
        let mut params = SearchParams::default();
        params.detect_stagnation = false;
        let rule = Rule::new(RuleKind::Irv, &params);
        let deadline = Deadline::after(Duration::from_millis(400));

        let strategic = strategic_vote(&rule, &vote, 0, &deadline, &params);
        assert!(strategic.is_complete());
        // At most four slices of 0.66 / 5 each, fixed before the first search.
        let spent = deadline.elapsed();
        assert!(spent <= Duration::from_millis(212 + 50), "{spent:?}");
        assert!(!deadline.expired());
    }
}

