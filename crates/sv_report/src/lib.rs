//! sv_report/src/lib.rs: Pure report model + renderers (text/JSON).
//!
//! Rules:
//! - No I/O here. Callers supply the loaded vote and the finished search.
//! - Text output keeps the historical line layout; stdout of the CLI is
//!   exactly what these functions return.
//! - Stable section order and field names in JSON.

#![deny(unsafe_code)]

use std::fmt::Write as _;

use serde::Serialize;
use sv_core::ids::{CandidateId, Rating, VoterId};
use sv_core::{RuleKind, StrategyMode, Vote};
use sv_pipeline::StrategicVote;

// ===== Errors =====
#[derive(Debug)]
pub enum ReportError {
    Template(&'static str),
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportError::Template(what) => write!(f, "report template error: {what}"),
        }
    }
}

impl std::error::Error for ReportError {}

// ===== Model =====
#[derive(Clone, Debug, Serialize)]
pub struct ReportModel {
    pub input: SectionInput,
    /// Vote in preference-file layout.
    pub vote_text: String,
    pub base_ratings: Vec<usize>,
    pub strategic_preference: Vec<CandidateId>,
    pub outcome: SectionOutcome,
    pub sampling: Option<SectionSampling>,
    pub elapsed_ms: u64,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionInput {
    pub file: String,
    pub voter: VoterId,
    pub rule: RuleKind,
    pub strategy: StrategyMode,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionOutcome {
    pub sincere_rating: Rating,
    pub strategic_rating: Rating,
    pub improved: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct SectionSampling {
    pub samples: u64,
    pub unique: usize,
    pub stagnated: bool,
}

// ===== API =====

/// Build the report model from a finished search (pure, offline).
pub fn build_model(input: &str, vote: &Vote, result: &StrategicVote) -> ReportModel {
    ReportModel {
        input: SectionInput {
            file: input.to_string(),
            voter: result.voter(),
            rule: result.rule(),
            strategy: result.strategy(),
        },
        vote_text: vote.to_string(),
        base_ratings: result.base_ratings().to_vec(),
        strategic_preference: result.strategic_preference().to_vec(),
        outcome: SectionOutcome {
            sincere_rating: result.sincere_rating(),
            strategic_rating: result.strategic_rating(),
            improved: result.strategic_rating() > result.sincere_rating(),
        },
        sampling: result.sampling_stats().map(|s| SectionSampling {
            samples: s.samples,
            unique: s.unique,
            stagnated: s.stagnated,
        }),
        elapsed_ms: u64::try_from(result.elapsed().as_millis()).unwrap_or(u64::MAX),
    }
}

// ===== Renderers =====

/// Strategic ballot only, one line.
pub fn render_brief(model: &ReportModel) -> String {
    let mut out = join_ids(&model.strategic_preference);
    out.push('\n');
    out
}

/// Header block, then (with `detail`) the vote dump and ratings, then the ballot.
pub fn render_verbose(model: &ReportModel, detail: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "File: {}", model.input.file);
    let _ = writeln!(out, "Selected voter: {}", model.input.voter);
    let _ = writeln!(out, "Voting system: {}", model.input.rule);
    let _ = writeln!(out, "Voting strategy: {}", model.input.strategy);
    if detail {
        let _ = writeln!(out, "Vote input:\n{}", model.vote_text);
        let _ = writeln!(out, "Ratings: {}", join_ids(&model.base_ratings));
    }
    out.push_str(&render_brief(model));
    out
}

/// Pretty JSON (field order follows struct layout).
pub fn render_json(model: &ReportModel) -> Result<String, ReportError> {
    serde_json::to_string_pretty(model).map_err(|_| ReportError::Template("json_serialize"))
}

// ===== Helpers =====

fn join_ids(ids: &[usize]) -> String {
    let mut out = String::with_capacity(ids.len() * 2);
    for (i, id) in ids.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{id}");
    }
    out
}
