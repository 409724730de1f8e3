//! Errors surfaced to the user.
//!
//! Only operand-level failures and output failures are errors. Problems with a single entry
//! degrade that entry instead and never reach this type.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ListError {
    /// A path given on the command line cannot be stat'd.
    #[error("cannot access '{}': {source}", path.display())]
    Inaccessible { path: PathBuf, source: io::Error },

    /// A directory operand exists but its contents cannot be read.
    #[error("cannot open directory '{}': {source}", path.display())]
    ReadDir { path: PathBuf, source: io::Error },

    /// Writing the listing failed.
    #[error("write error: {0}")]
    Output(#[from] io::Error),
}

impl ListError {
    pub fn inaccessible(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Inaccessible {
            path: path.into(),
            source,
        }
    }

    pub fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    /// True for a closed pipe on stdout, e.g. `lsext | head`.
    pub fn is_broken_pipe(&self) -> bool {
        matches!(self, ListError::Output(e) if e.kind() == io::ErrorKind::BrokenPipe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_path() {
        let err = ListError::inaccessible("missing", io::Error::from(io::ErrorKind::NotFound));
        assert!(err.to_string().starts_with("cannot access 'missing': "));

        let err = ListError::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(err.is_broken_pipe());
    }
}
