//! crates/sv_io/src/loader.rs
//! Preference-file loader.
//!
//! Format:
//! ```text
//! <numCandidates> <numVoters>
//! <ballot of voter 0>
//! ...
//! ```
//! Each ballot is a whitespace-separated permutation of `0..numCandidates`,
//! most preferred first. Blank lines are ignored everywhere.

use std::fs;
use std::path::Path;

use sv_core::ids::Ballot;
use sv_core::Vote;

use crate::{IoError, IoResult};

/// Read and parse the preference file at `path`. Missing and empty files are
/// rejected before any parsing.
pub fn load_vote<P: AsRef<Path>>(path: P) -> IoResult<Vote> {
    let path = path.as_ref();
    let meta = fs::metadata(path)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    if meta.len() == 0 {
        return Err(IoError::Empty(path.display().to_string()));
    }
    let text = fs::read_to_string(path)
        .map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    parse_vote(&text)
}

/// Parse preference-file text into a complete `Vote`.
pub fn parse_vote(text: &str) -> IoResult<Vote> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, l)| (i + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (header_line, header) = lines.next().ok_or_else(|| IoError::Parse {
        line: 1,
        msg: "missing header".into(),
    })?;
    let dims = parse_numbers(header_line, header)?;
    let &[num_candidates, num_voters] = dims.as_slice() else {
        return Err(IoError::Parse {
            line: header_line,
            msg: format!("header needs 2 numbers, found {}", dims.len()),
        });
    };
    let mut vote = Vote::try_new(num_candidates, num_voters)
        .map_err(|source| IoError::Invalid { line: header_line, source })?;

    let mut found = 0usize;
    for (line, body) in lines {
        if found == num_voters {
            let found = found + 1 + count_rest(text, line);
            return Err(IoError::BallotCount { expected: num_voters, found });
        }
        let ballot = parse_numbers(line, body)?;
        vote.try_add_preference(found, ballot)
            .map_err(|source| IoError::Invalid { line, source })?;
        found += 1;
    }
    if found != num_voters {
        return Err(IoError::BallotCount { expected: num_voters, found });
    }
    Ok(vote)
}

fn parse_numbers(line: usize, body: &str) -> IoResult<Ballot> {
    body.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>().map_err(|_| IoError::Parse {
                line,
                msg: format!("expected a non-negative integer, found {tok:?}"),
            })
        })
        .collect()
}

/// Non-blank lines strictly after 1-based `line`.
fn count_rest(text: &str, line: usize) -> usize {
    text.lines().skip(line).filter(|l| !l.trim().is_empty()).count()
}
