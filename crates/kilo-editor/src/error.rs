//! Editor-level errors.
//!
//! Terminal failures pass through unchanged; the only failure the editor
//! core adds on its own is a document that can't be opened or read.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The document path is missing or unreadable.
    #[error("fopen {}: {source}", path.display())]
    FileOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Terminal(#[from] kilo_term::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
