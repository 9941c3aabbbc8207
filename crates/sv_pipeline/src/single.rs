// crates/sv_pipeline/src/single.rs
//
// Single-voter best response: everyone else votes sincerely.

use sv_algo::{Rule, VotingRule};
use sv_core::ids::{Ballot, VoterId};
use sv_core::{Deadline, Vote};

pub fn best_response(rule: &Rule, vote: &Vote, voter: VoterId, deadline: &Deadline) -> Ballot {
    rule.find_best_deviation(vote, voter, deadline)
}
