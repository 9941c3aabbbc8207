// crates/sv_algo/src/lib.rs
//! Rule layer: winner determination, utility, and single-voter best-deviation
//! search for each supported voting rule.
//!
//! Every rule implements [`VotingRule`]; [`Rule`] is the tagged dispatcher the
//! orchestrator holds. Rules are stateless apart from their tuning knobs, so
//! the same instance can be reused across synthetic votes.

#![forbid(unsafe_code)]

pub mod memo;

pub mod rules {
    pub mod borda;
    pub mod irv;
    pub mod plurality;

    pub use borda::BordaCount;
    pub use irv::{InstantRunoff, IrvRound};
    pub use plurality::Plurality;
}

pub use memo::{PreferenceMemo, PreferenceSet};
pub use rules::{BordaCount, InstantRunoff, IrvRound, Plurality};

use sv_core::ids::{Ballot, CandidateId, Rating, VoterId};
use sv_core::{Deadline, RuleKind, SearchParams, Vote};

// ----------------------------- Rule contract -----------------------------------------

/// Shared shape of every voting rule.
pub trait VotingRule {
    fn kind(&self) -> RuleKind;

    /// Aggregate score per candidate over every ballot except `excluded`'s.
    fn scores(&self, vote: &Vote, excluded: Option<VoterId>) -> Vec<usize>;

    /// Deterministic winner over every ballot except `excluded`'s.
    fn winner(&self, vote: &Vote, excluded: Option<VoterId>) -> CandidateId;

    /// Rating `voter`'s own ballot assigns to the outcome the rule evaluates
    /// for that voter.
    fn utility(&self, vote: &Vote, voter: VoterId) -> Rating;

    /// Full ranking for `voter` chosen to make the outcome as favorable as
    /// possible to them. Bounded searches stop at `deadline`.
    fn find_best_deviation(&self, vote: &Vote, voter: VoterId, deadline: &Deadline) -> Ballot;
}

// ----------------------------- Tagged dispatcher -------------------------------------

#[derive(Clone, Debug)]
pub enum Rule {
    Plurality(Plurality),
    Borda(BordaCount),
    Irv(InstantRunoff),
}

impl Rule {
    pub fn new(kind: RuleKind, params: &SearchParams) -> Self {
        match kind {
            RuleKind::Plurality => Rule::Plurality(Plurality),
            RuleKind::Borda => Rule::Borda(BordaCount),
            RuleKind::Irv => Rule::Irv(InstantRunoff::from_params(params)),
        }
    }

    fn as_dyn(&self) -> &dyn VotingRule {
        match self {
            Rule::Plurality(r) => r,
            Rule::Borda(r) => r,
            Rule::Irv(r) => r,
        }
    }
}

impl VotingRule for Rule {
    fn kind(&self) -> RuleKind {
        self.as_dyn().kind()
    }

    fn scores(&self, vote: &Vote, excluded: Option<VoterId>) -> Vec<usize> {
        self.as_dyn().scores(vote, excluded)
    }

    fn winner(&self, vote: &Vote, excluded: Option<VoterId>) -> CandidateId {
        self.as_dyn().winner(vote, excluded)
    }

    fn utility(&self, vote: &Vote, voter: VoterId) -> Rating {
        self.as_dyn().utility(vote, voter)
    }

    fn find_best_deviation(&self, vote: &Vote, voter: VoterId, deadline: &Deadline) -> Ballot {
        self.as_dyn().find_best_deviation(vote, voter, deadline)
    }
}
