// crates/sv_algo/src/rules/irv.rs
//
// Instant-runoff voting: multi-round elimination.
//
// Each round tallies every ballot's top still-active choice. A running count
// above half the counted ballots wins immediately (the tally short-circuits).
// Otherwise the active candidate with the fewest first choices is deactivated
// (ties → lowest id; the scan stops at the first zero count) and the next
// round starts. A lone remaining candidate wins outright.
//
// Deviation search is a seeded, deadline-bounded hill-climb over single
// transpositions of the voter's ballot.

use sv_core::ids::{Ballot, CandidateId, Rating, VoterId};
use sv_core::{Deadline, RuleKind, SearchParams, SearchRng, Vote};
use tracing::debug;

use crate::memo::PreferenceSet;
use crate::VotingRule;

/// Audit record of one elimination round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IrvRound {
    /// First-choice counts of this round (partial if a majority cut the tally short).
    pub tallies: Vec<usize>,
    /// Candidate deactivated at the end of the round.
    pub eliminated: Option<CandidateId>,
    /// Set on the final round.
    pub winner: Option<CandidateId>,
}

#[derive(Clone, Debug)]
pub struct InstantRunoff {
    seed: u64,
    detect_stagnation: bool,
}

impl Default for InstantRunoff {
    fn default() -> Self {
        Self::from_params(&SearchParams::default())
    }
}

impl InstantRunoff {
    pub fn new(seed: u64, detect_stagnation: bool) -> Self {
        Self { seed, detect_stagnation }
    }

    pub fn from_params(params: &SearchParams) -> Self {
        Self::new(params.irv_seed, params.detect_stagnation)
    }

    /// Winner with `voter`'s ballot replaced by `ballot`.
    pub fn winner_with(&self, vote: &Vote, voter: VoterId, ballot: &[CandidateId]) -> CandidateId {
        let ballots = vote
            .ballots()
            .map(|(v, pref)| if v == voter { ballot } else { pref });
        run_elimination(vote.num_candidates(), ballots, None)
    }

    /// Sincere rating of the winner when `voter` submits `ballot`.
    pub fn utility_with(&self, vote: &Vote, voter: VoterId, ballot: &[CandidateId]) -> Rating {
        vote.ratings(voter)[self.winner_with(vote, voter, ballot)]
    }

    /// Winner plus the per-round audit log.
    pub fn tabulate(&self, vote: &Vote, excluded: Option<VoterId>) -> (CandidateId, Vec<IrvRound>) {
        let mut rounds = Vec::new();
        let winner = run_elimination(
            vote.num_candidates(),
            counted_ballots(vote, excluded),
            Some(&mut rounds),
        );
        (winner, rounds)
    }
}

impl VotingRule for InstantRunoff {
    fn kind(&self) -> RuleKind {
        RuleKind::Irv
    }

    /// First-round first-choice counts.
    fn scores(&self, vote: &Vote, excluded: Option<VoterId>) -> Vec<usize> {
        let mut tallies = vec![0usize; vote.num_candidates()];
        for pref in counted_ballots(vote, excluded) {
            if let Some(&top) = pref.first() {
                tallies[top] += 1;
            }
        }
        tallies
    }

    fn winner(&self, vote: &Vote, excluded: Option<VoterId>) -> CandidateId {
        run_elimination(vote.num_candidates(), counted_ballots(vote, excluded), None)
    }

    /// The voter's ballot as cast in `vote` takes part in the tally.
    fn utility(&self, vote: &Vote, voter: VoterId) -> Rating {
        vote.ratings(voter)[self.winner(vote, None)]
    }

    fn find_best_deviation(&self, vote: &Vote, voter: VoterId, deadline: &Deadline) -> Ballot {
        let num_candidates = vote.num_candidates();
        let max_utility = vote.max_rating();
        let mut rng = SearchRng::from_seed_u64(self.seed);

        let mut best: Ballot = vote.preference(voter).to_vec();
        let mut best_utility = self.utility_with(vote, voter, &best);
        let mut tried = PreferenceSet::new();
        tried.insert(&best);
        let mut repeats = 0usize;
        let mut iterations = 0u64;

        while best_utility < max_utility && !deadline.expired() {
            iterations += 1;
            let mut candidate = best.clone();
            rng.swap_random(&mut candidate);
            if self.detect_stagnation {
                if !tried.insert(&candidate) {
                    repeats += 1;
                    if repeats > num_candidates {
                        break;
                    }
                    continue;
                }
                repeats = 0;
            }
            let utility = self.utility_with(vote, voter, &candidate);
            if utility > best_utility {
                best_utility = utility;
                best = candidate;
            }
        }

        debug!(
            voter,
            iterations,
            tried = tried.len(),
            best_utility,
            expired = deadline.expired(),
            "irv deviation search finished"
        );
        best
    }
}

fn counted_ballots(
    vote: &Vote,
    excluded: Option<VoterId>,
) -> impl Iterator<Item = &[CandidateId]> + '_ {
    vote.ballots()
        .filter(move |(v, _)| Some(*v) != excluded)
        .map(|(_, pref)| pref)
}

/// Run the elimination rounds over `ballots` (most-preferred first).
///
/// # Panics
/// If a round finds no active candidate to eliminate, which cannot happen for
/// a vote with at least one candidate.
pub fn run_elimination<'a>(
    num_candidates: usize,
    ballots: impl Iterator<Item = &'a [CandidateId]>,
    mut log: Option<&mut Vec<IrvRound>>,
) -> CandidateId {
    // Reversed so the current top choice sits at the back.
    let mut stacks: Vec<Vec<CandidateId>> =
        ballots.map(|b| b.iter().rev().copied().collect()).collect();
    let majority = stacks.len() / 2;
    let mut active = vec![true; num_candidates];
    let mut remaining = num_candidates;

    loop {
        if remaining == 1 {
            if let Some(last) = active.iter().position(|&a| a) {
                if let Some(log) = log.as_deref_mut() {
                    log.push(IrvRound { tallies: vec![0; num_candidates], eliminated: None, winner: Some(last) });
                }
                return last;
            }
        }

        let mut tallies = vec![0usize; num_candidates];
        let mut winner = None;
        for stack in stacks.iter_mut() {
            while let Some(&top) = stack.last() {
                if active[top] {
                    break;
                }
                stack.pop();
            }
            if let Some(&top) = stack.last() {
                tallies[top] += 1;
                if tallies[top] > majority {
                    winner = Some(top);
                    break;
                }
            }
        }

        if let Some(w) = winner {
            if let Some(log) = log.as_deref_mut() {
                log.push(IrvRound { tallies, eliminated: None, winner: Some(w) });
            }
            return w;
        }

        let loser = match weakest_active(&tallies, &active) {
            Some(c) => c,
            None => panic!("irv elimination found no active candidate"),
        };
        active[loser] = false;
        remaining -= 1;
        if let Some(log) = log.as_deref_mut() {
            log.push(IrvRound { tallies, eliminated: Some(loser), winner: None });
        }
    }
}

/// Active candidate with the fewest first choices, scanning ids upward and
/// stopping at the first zero.
fn weakest_active(tallies: &[usize], active: &[bool]) -> Option<CandidateId> {
    let mut min: Option<(usize, CandidateId)> = None;
    for (c, &count) in tallies.iter().enumerate() {
        if !active[c] {
            continue;
        }
        if min.map_or(true, |(m, _)| count < m) {
            min = Some((count, c));
            if count == 0 {
                break;
            }
        }
    }
    min.map(|(_, c)| c)
}
