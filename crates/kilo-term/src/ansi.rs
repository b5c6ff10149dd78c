// SPDX-License-Identifier: MIT
//
// VT100 escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. This module only knows the byte-level
// encoding of the handful of commands a single-write frame renderer needs.
//
// Cursor positions are 0-indexed in our API and converted to 1-indexed for
// the terminal (VT100 CUP uses 1-based coordinates).
//
// All functions return `io::Result` propagated from the underlying writer.
// In practice they never fail when writing to `OutputBuffer` (backed by a Vec).
use std::io::{self, Write};

/// Clear the entire screen (ED 2).
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";

/// Move the cursor to the top-left corner (CUP with no parameters).
pub const CURSOR_HOME: &[u8] = b"\x1b[H";

/// Erase from the cursor to the end of the current line (EL 0).
pub const CLEAR_LINE: &[u8] = b"\x1b[K";

/// Hide the cursor (DECTCEM reset).
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";

/// Show the cursor (DECTCEM set).
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";

/// Push the cursor as far right and down as the terminal allows.
///
/// The terminal clamps both moves at its edges, so the cursor lands in the
/// true bottom-right corner regardless of the real geometry.
pub const CURSOR_TO_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";

/// Device Status Report 6: ask for a cursor-position report.
///
/// The terminal answers on stdin with `ESC [ row ; col R`.
pub const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// Move the cursor to `(x, y)` using the CUP (Cursor Position) sequence.
///
/// Our coordinates are 0-indexed; VT100 CUP is 1-indexed.
#[inline]
pub fn cursor_to(w: &mut impl Write, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", u32::from(y) + 1, u32::from(x) + 1)
}

/// Move the cursor to the top-left corner.
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

#[inline]
pub fn cursor_hide(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HIDE)
}

#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2). Only used on quit and on the error path.
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

/// Erase the rest of the current line.
#[inline]
pub fn clear_line(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_LINE)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
