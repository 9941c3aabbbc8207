// crates/sv_cli/src/main.rs
//
// Wires up exit codes, logging, CLI parsing and the single run path:
// load → strategic search → render to stdout. Diagnostics go to stderr.

mod args;

mod exitcodes {
    /// Stable exit codes.
    pub const OK: i32 = 0;
    pub const USAGE: i32 = 1;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
}

use std::io::Write as _;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use args::{Args, OutputMode, RunConfig};
use sv_io::IoError;
use sv_pipeline::{PipelineError, StrategicVote};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Bad selections, malformed files, invalid voter ids.
    Validation(String),
    /// Missing/empty/unreadable files, stdout failures.
    Io(String),
}

impl std::fmt::Display for MainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MainError::Validation(m) | MainError::Io(m) => f.write_str(m),
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) => {
            // --help / --version land here too.
            let _ = e.print();
            let rc = if e.use_stderr() { exitcodes::USAGE } else { exitcodes::OK };
            return ExitCode::from(rc as u8);
        }
    };
    init_tracing(args.verbose);

    let outcome = args
        .validate()
        .map_err(|e| MainError::Validation(e.to_string()))
        .and_then(|cfg| run_once(&cfg));
    let rc = match outcome {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            eprintln!("sv: error: {e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise `warn`, or `info` with --verbose. Always stderr.
fn init_tracing(verbose: bool) {
    let fallback = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_once(cfg: &RunConfig) -> Result<(), MainError> {
    let vote = sv_io::load_vote(&cfg.preferences).map_err(map_io_err)?;
    tracing::info!(
        path = %cfg.preferences.display(),
        candidates = vote.num_candidates(),
        voters = vote.num_voters(),
        "vote loaded"
    );

    let result = StrategicVote::compute(&vote, cfg.voter, cfg.rule, cfg.strategy, &cfg.params)
        .map_err(map_pipeline_err)?;

    let input = cfg.preferences.display().to_string();
    let model = sv_report::build_model(&input, &vote, &result);
    let text = match cfg.output {
        OutputMode::Brief => sv_report::render_brief(&model),
        OutputMode::Header => sv_report::render_verbose(&model, false),
        OutputMode::Verbose => sv_report::render_verbose(&model, true),
        OutputMode::Json => {
            let mut json = sv_report::render_json(&model)
                .map_err(|e| MainError::Io(e.to_string()))?;
            json.push('\n');
            json
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout
        .write_all(text.as_bytes())
        .and_then(|()| stdout.flush())
        .map_err(|e| MainError::Io(format!("stdout: {e}")))
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    match e {
        MainError::Validation(_) => exitcodes::VALIDATION,
        MainError::Io(_) => exitcodes::IO,
    }
}

/// Translate sv_io::IoError into MainError buckets for exit-code mapping.
fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(_) | IoError::Empty(_) => MainError::Io(e.to_string()),
        IoError::Parse { .. } | IoError::BallotCount { .. } | IoError::Invalid { .. } => {
            MainError::Validation(e.to_string())
        }
    }
}

/// Translate sv_pipeline::PipelineError into MainError buckets.
fn map_pipeline_err(e: PipelineError) -> MainError {
    MainError::Validation(e.to_string())
}
