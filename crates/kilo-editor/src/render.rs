//! Frame composition.
//!
//! A frame is everything the terminal needs to show the current state, from
//! scratch: hide the cursor, home, draw every viewport row, park the cursor,
//! show it again. It is composed into an [`OutputBuffer`] and leaves in one
//! write, so the terminal never displays a half-drawn screen.
//!
//! Rows are drawn as raw bytes truncated to the viewport width. Viewport rows
//! past the end of the document get a `~` marker; an empty document shows the
//! version banner a third of the way down.

use std::io::{self, Write};

use kilo_term::ansi;
use kilo_term::output::OutputBuffer;
use kilo_term::size::Size;

use crate::cursor::Cursor;
use crate::rows::RowStore;

/// Crate version shown in the banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Marker drawn on viewport rows past the end of the document.
const EMPTY_ROW_MARKER: &[u8] = b"~";

/// The banner text for an empty document.
#[must_use]
pub fn banner() -> String {
    format!("Kilo editor -- version {VERSION}")
}

/// Compose one complete frame into `frame`.
///
/// Nothing is written to the terminal here; the caller flushes `frame`.
///
/// # Errors
///
/// Only propagates writer errors, which `OutputBuffer` never produces.
pub fn render_frame(
    frame: &mut OutputBuffer,
    rows: &RowStore,
    cursor: Cursor,
    viewport: Size,
) -> io::Result<()> {
    ansi::cursor_hide(frame)?;
    ansi::cursor_home(frame)?;
    draw_rows(frame, rows, viewport)?;
    ansi::cursor_to(frame, cursor.x(), cursor.y())?;
    ansi::cursor_show(frame)
}

fn draw_rows(frame: &mut OutputBuffer, rows: &RowStore, viewport: Size) -> io::Result<()> {
    let cols = usize::from(viewport.cols);
    let banner_row = viewport.rows / 3;

    for y in 0..viewport.rows {
        if let Some(row) = rows.get(usize::from(y)) {
            let bytes = row.as_bytes();
            frame.append(&bytes[..bytes.len().min(cols)]);
        } else if rows.is_empty() && y == banner_row {
            draw_banner(frame, cols)?;
        } else {
            frame.append(EMPTY_ROW_MARKER);
        }

        ansi::clear_line(frame)?;
        if y + 1 < viewport.rows {
            frame.write_all(b"\r\n")?;
        }
    }
    Ok(())
}

/// Centered banner. The first padding column carries the `~` marker so the
/// left edge stays consistent with the rows around it.
fn draw_banner(frame: &mut OutputBuffer, cols: usize) -> io::Result<()> {
    let text = banner();
    let shown = &text.as_bytes()[..text.len().min(cols)];

    let mut padding = (cols - shown.len()) / 2;
    if padding > 0 {
        frame.append(EMPTY_ROW_MARKER);
        padding -= 1;
    }
    for _ in 0..padding {
        frame.write_all(b" ")?;
    }
    frame.append(shown);
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
