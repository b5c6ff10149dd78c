// SPDX-License-Identifier: MIT
//
// Error taxonomy for terminal-level failures.
//
// Every variant names the operation that failed. Nothing here is retried:
// a terminal that refuses tcgetattr, a read that fails with anything other
// than "no data yet", a frame write that comes up short. All of them are
// fatal at this layer and the binary tears down in order.
//
// Buffer growth failure is intentionally absent. `OutputBuffer::append`
// swallows it (see `output.rs`).

use std::io;

use thiserror::Error;

/// A terminal-level failure.
#[derive(Debug, Error)]
pub enum Error {
    /// Capturing the original terminal attributes failed (`tcgetattr`).
    #[error("tcgetattr: {0}")]
    TerminalQuery(#[source] io::Error),

    /// Applying raw-mode attributes failed (`tcsetattr`).
    #[error("tcsetattr: {0}")]
    TerminalConfigure(#[source] io::Error),

    /// Restoring the original attributes failed (`tcsetattr`).
    #[error("tcsetattr (restore): {0}")]
    TerminalRestore(#[source] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor-position probe produced a size.
    #[error("getWindowSize: terminal size unavailable")]
    SizeUnavailable,

    /// Reading input failed for a reason other than the read timeout.
    #[error("read: {0}")]
    Read(#[source] io::Error),

    /// Writing a frame or control sequence to the terminal failed.
    #[error("write: {0}")]
    Write(#[source] io::Error),
}

/// Shorthand for results carrying a terminal [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
