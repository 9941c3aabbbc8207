// crates/sv_cli/src/args.rs
//
// CLI argument surface: raw clap struct, typed errors, validation into a
// `RunConfig` the runner consumes.
//
// Rules:
// - Positionals: <preferences> <voter id> <voting system>
// - Rule and strategy names are checked here, not by clap, so unknown names
//   are validation errors (exit 2) rather than usage errors (exit 1).
// - Seeds accept decimal u64 or 0x-hex (≤16 nybbles).
// - --timelimit is in seconds and may be fractional.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use sv_core::errors::CoreError;
use sv_core::ids::VoterId;
use sv_core::{RuleKind, SearchParams, StrategyMode};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "sv",
    disable_help_subcommand = true,
    about = "Compute a strategic ballot for one voter of a preference file",
    after_help = "<voting system> is one of: plurality, borda, irv"
)]
pub struct Args {
    /// Preferences file in the vote format.
    pub preferences: PathBuf,

    /// Index of the selected voter.
    pub voter: VoterId,

    /// Voting system (plurality, borda, irv).
    pub voting_system: String,

    /// Voting strategy: single (bush), coalition (nixon), sampling (gandhi) or sincere.
    #[arg(long, default_value = "single")]
    pub strategy: String,

    /// Maximum execution time in seconds.
    #[arg(long, value_parser = parse_seconds, default_value = "10")]
    pub timelimit: Duration,

    /// Seed of the IRV hill-climb RNG. Decimal u64 or 0x-hex.
    #[arg(long, value_parser = parse_seed)]
    pub seed_irv: Option<u64>,

    /// Seed of the sampling perturbation RNG. Decimal u64 or 0x-hex.
    #[arg(long, value_parser = parse_seed)]
    pub seed_sampling: Option<u64>,

    /// Let the IRV hill-climb run to the deadline even when it keeps revisiting ballots.
    #[arg(long)]
    pub no_stagnation: bool,

    /// Verbose output: header, vote dump and ratings. Also raises the log level.
    #[arg(long)]
    pub verbose: bool,

    /// Brief output, only the strategic preference (default).
    #[arg(long, overrides_with = "no_brief")]
    pub brief: bool,

    /// Print the header block before the strategic preference.
    #[arg(long, overrides_with = "brief")]
    pub no_brief: bool,

    /// Emit the JSON report instead of text.
    #[arg(long, conflicts_with_all = ["verbose", "no_brief"])]
    pub json: bool,
}

/// How the result is printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputMode {
    Brief,
    Header,
    Verbose,
    Json,
}

/// Validated run configuration.
#[derive(Clone, Debug)]
pub struct RunConfig {
    pub preferences: PathBuf,
    pub voter: VoterId,
    pub rule: RuleKind,
    pub strategy: StrategyMode,
    pub params: SearchParams,
    pub output: OutputMode,
}

/// Errors surfaced by argument validation.
/// Keep messages short/stable (handy for scripts/tests).
#[derive(Debug)]
pub enum CliError {
    Selection(CoreError),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Selection(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for CliError {}

impl From<CoreError> for CliError {
    fn from(e: CoreError) -> Self {
        CliError::Selection(e)
    }
}

impl Args {
    /// Check selections and fold flags into a `RunConfig`.
    pub fn validate(self) -> Result<RunConfig, CliError> {
        let rule: RuleKind = self.voting_system.parse()?;
        let strategy: StrategyMode = self.strategy.parse()?;

        let mut params = SearchParams::default().with_time_limit(self.timelimit);
        if let Some(seed) = self.seed_irv {
            params.irv_seed = seed;
        }
        if let Some(seed) = self.seed_sampling {
            params.sampling_seed = seed;
        }
        params.detect_stagnation = !self.no_stagnation;

        let output = if self.json {
            OutputMode::Json
        } else if self.verbose {
            OutputMode::Verbose
        } else if self.no_brief {
            OutputMode::Header
        } else {
            OutputMode::Brief
        };

        Ok(RunConfig {
            preferences: self.preferences,
            voter: self.voter,
            rule,
            strategy,
            params,
            output,
        })
    }
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Non-negative, finite seconds.
pub fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.trim().parse().map_err(|_| format!("not a number of seconds: {s}"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("time limit must be a non-negative number of seconds: {s}"));
    }
    Duration::try_from_secs_f64(secs).map_err(|e| e.to_string())
}
