//! crates/sv_io/src/writer.rs
//! Write a vote in the preference-file format.

use std::fs;
use std::path::Path;

use sv_core::Vote;

use crate::IoResult;

/// Write `vote` to `path`, replacing any existing file.
pub fn write_vote<P: AsRef<Path>>(path: P, vote: &Vote) -> IoResult<()> {
    fs::write(path, vote.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::load_vote;

    #[test]
    fn written_file_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.txt");
        let vote = Vote::from_ballots(3, vec![vec![2, 0, 1], vec![0, 1, 2]]).unwrap();
        write_vote(&path, &vote).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "3 2\n2 0 1\n0 1 2\n");
        assert_eq!(load_vote(&path).unwrap(), vote);
    }
}
