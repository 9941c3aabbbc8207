//! crates/sv_io/src/lib.rs
//! Preference-file I/O.
//!
//! - `loader`: text → `Vote` (header line, then one ballot per line).
//! - `writer`: `Vote` → text, byte-identical to `Vote`'s `Display`.
//! - Shared error type (`IoError`) with line numbers for parse failures.

#![forbid(unsafe_code)]

use sv_core::errors::CoreError;
use thiserror::Error;

pub mod loader;
pub mod writer;

pub use loader::{load_vote, parse_vote};
pub use writer::write_vote;

/// Unified error for sv_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem errors (missing file, permissions, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// The file exists but holds no bytes.
    #[error("empty preference file: {0}")]
    Empty(String),

    /// Malformed text at a 1-based line number.
    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },

    /// Ballot count disagrees with the header.
    #[error("expected {expected} ballots, found {found}")]
    BallotCount { expected: usize, found: usize },

    /// Well-formed text describing an invalid vote.
    #[error("invalid vote at line {line}: {source}")]
    Invalid {
        line: usize,
        #[source]
        source: CoreError,
    },
}

pub type IoResult<T> = Result<T, IoError>;

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}
