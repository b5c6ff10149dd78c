// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Byte sources — where the key decoder and the size probe get input from.
//
// Everything upstream of this module reads one byte at a time through the
// `ByteSource` trait, which distinguishes three outcomes:
//
//   Ok(Some(b))  a byte arrived
//   Ok(None)     the bounded wait elapsed with nothing to read
//   Err(e)       a real failure (fatal upstream)
//
// `StdinSource` is the production implementation. It waits on stdin with
// `poll()` for at most `READ_TIMEOUT_MS`, matching the VTIME=1 wait raw mode
// configures, so a lone ESC resolves within a tenth of a second even if the
// terminal driver was left in a blocking configuration. EAGAIN and EINTR
// count as "no data yet". A readable descriptor that returns zero bytes is
// end of input (stdin closed or not a terminal) and is reported as an error
// rather than spun on forever.
//
// The loop is single-threaded: no reader thread, no channel. The bounded
// wait is the only suspension point.

use std::collections::VecDeque;
use std::io;

/// Maximum wait for one byte, in milliseconds.
pub const READ_TIMEOUT_MS: i32 = 100;

/// A source of input bytes with a bounded wait per read.
pub trait ByteSource {
    /// Read a single byte.
    ///
    /// Returns `Ok(None)` when no byte arrived within the source's wait.
    ///
    /// # Errors
    ///
    /// Any failure other than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        (**self).read_byte()
    }
}

/// Stdin as a [`ByteSource`].
#[derive(Debug, Clone, Copy)]
pub struct StdinSource {
    timeout_ms: i32,
}

impl StdinSource {
    /// Stdin with the standard [`READ_TIMEOUT_MS`] wait.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout_ms: READ_TIMEOUT_MS,
        }
    }

}

impl Default for StdinSource {
    fn default() -> Self {
        Self::new()
    }
}

/// Recorded input played back one byte per read.
///
/// `None` entries stand for a read whose wait elapsed with no data. Once
/// the recording is exhausted every read fails with `UnexpectedEof`, the
/// same way a closed stdin does.
#[derive(Debug, Clone, Default)]
pub struct Replay {
    steps: VecDeque<Option<u8>>,
}

impl Replay {
    /// Replay `bytes` back to back with no gaps.
    #[must_use]
    pub fn bytes(bytes: &[u8]) -> Self {
        Self {
            steps: bytes.iter().copied().map(Some).collect(),
        }
    }

    /// Append a read that times out.
    #[must_use]
    pub fn then_timeout(mut self) -> Self {
        self.steps.push_back(None);
        self
    }

    /// Append more bytes.
    #[must_use]
    pub fn then_bytes(mut self, bytes: &[u8]) -> Self {
        self.steps.extend(bytes.iter().copied().map(Some));
        self
    }

    /// Number of reads left before the recording runs out.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl ByteSource for Replay {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        self.steps.pop_front().ok_or_else(|| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "replay exhausted")
        })
    }
}

/// Whether an OS error just means "try again later".
fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

#[cfg(unix)]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut pfd = libc::pollfd {
            fd: libc::STDIN_FILENO,
            events: libc::POLLIN,
            revents: 0,
        };
        let ready = unsafe { libc::poll(&raw mut pfd, 1, self.timeout_ms) };

        if ready < 0 {
            let err = io::Error::last_os_error();
            return if is_transient(&err) { Ok(None) } else { Err(err) };
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input on stdin",
            )),
            _ => {
                let err = io::Error::last_os_error();
                if is_transient(&err) { Ok(None) } else { Err(err) }
            }
        }
    }
}

/// Non-unix fallback: a blocking one-byte read with no timeout.
#[cfg(not(unix))]
impl ByteSource for StdinSource {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte) {
            Ok(0) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "end of input on stdin",
            )),
            Ok(_) => Ok(Some(byte[0])),
            Err(e) if is_transient(&e) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
