// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Viewport size — ask the OS, and if it won't say, ask the terminal.
//
// The primary strategy is `ioctl(TIOCGWINSZ)` on stdout. Some environments
// (serial consoles, odd multiplexers) fail that call or report zero columns.
// For those we fall back to the protocol itself:
//
//   1. `ESC[999C ESC[999B` pushes the cursor right and down; the terminal
//      clamps both moves, so the cursor ends up in the bottom-right cell.
//   2. `ESC[6n` asks for a cursor-position report.
//   3. The reply `ESC [ rows ; cols R` arrives on stdin. We read it a byte
//      at a time until `R` or until 31 bytes have arrived.
//
// The size is queried once at startup and stays fixed for the session.

use std::io::Write;

use tracing::debug;

use crate::ansi;
use crate::error::{Error, Result};
use crate::reader::ByteSource;

/// Upper bound on a cursor-position reply, in bytes.
pub const MAX_REPORT_LEN: usize = 31;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells. Both are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    /// Number of rows (height in character cells).
    pub rows: u16,
    /// Number of columns (width in character cells).
    pub cols: u16,
}

impl Size {
    /// A size, or `None` if either dimension is zero.
    #[must_use]
    pub const fn new(rows: u16, cols: u16) -> Option<Self> {
        if rows == 0 || cols == 0 {
            None
        } else {
            Some(Self { rows, cols })
        }
    }
}

// ─── OS query ───────────────────────────────────────────────────────────────

/// Query the size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if the call fails or reports a zero dimension.
#[cfg(unix)]
#[must_use]
pub fn os_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == -1 {
        return None;
    }
    Size::new(ws.ws_row, ws.ws_col)
}

#[cfg(not(unix))]
#[must_use]
pub fn os_size() -> Option<Size> {
    None
}

// ─── Query ──────────────────────────────────────────────────────────────────

/// Determine the viewport size, falling back to the cursor probe.
///
/// # Errors
///
/// [`Error::SizeUnavailable`] if both strategies fail.
pub fn query_size(input: &mut impl ByteSource, out: &mut impl Write) -> Result<Size> {
    if let Some(size) = os_size() {
        debug!(rows = size.rows, cols = size.cols, "viewport size from TIOCGWINSZ");
        return Ok(size);
    }
    debug!("TIOCGWINSZ unavailable, probing with cursor-position report");
    probe_size(input, out)
}

/// Measure the viewport by parking the cursor in the far corner and asking
/// the terminal where it is.
///
/// # Errors
///
/// [`Error::SizeUnavailable`] if the probe can't be written, the reply
/// can't be read, or the reply is malformed.
pub fn probe_size(input: &mut impl ByteSource, out: &mut impl Write) -> Result<Size> {
    out.write_all(ansi::CURSOR_TO_FAR_CORNER)
        .and_then(|()| out.write_all(ansi::REQUEST_CURSOR_POSITION))
        .and_then(|()| out.flush())
        .map_err(|e| {
            debug!("size probe write failed: {e}");
            Error::SizeUnavailable
        })?;

    let reply = read_report(input)?;
    let size = parse_cursor_report(&reply).ok_or(Error::SizeUnavailable)?;
    debug!(rows = size.rows, cols = size.cols, "viewport size from probe");
    Ok(size)
}

/// Collect the reply up to and including `R`, at most [`MAX_REPORT_LEN`] bytes.
///
/// Stops early on a timed-out read. A read failure is reported as
/// [`Error::SizeUnavailable`]: the size is what failed, not the input loop.
fn read_report(input: &mut impl ByteSource) -> Result<Vec<u8>> {
    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match input.read_byte() {
            Ok(Some(byte)) => {
                reply.push(byte);
                if byte == b'R' {
                    break;
                }
            }
            Ok(None) => break,
            Err(e) => {
                debug!("size probe read failed: {e}");
                return Err(Error::SizeUnavailable);
            }
        }
    }
    Ok(reply)
}

/// Parse a cursor-position report `ESC [ rows ; cols R`.
///
/// The position of the bottom-right cell is the viewport size. Returns
/// `None` for a missing prefix, a missing terminator, non-numeric or
/// zero fields.
#[must_use]
pub fn parse_cursor_report(reply: &[u8]) -> Option<Size> {
    let body = reply.strip_prefix(b"\x1b[")?.strip_suffix(b"R")?;
    let mut fields = body.split(|&b| b == b';');
    let rows = parse_field(fields.next()?)?;
    let cols = parse_field(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Size::new(rows, cols)
}

/// Parse an unsigned decimal field with no sign or whitespace.
fn parse_field(field: &[u8]) -> Option<u16> {
    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(field).ok()?.parse().ok()
}

// ─── Tests ───────────────────────────────────────────────────────────────────
