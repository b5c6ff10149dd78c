//! Editor state — the document, the cursor, and the viewport they live in.
//!
//! The loop owns one [`Editor`] value; there is no global state. Key
//! handling mutates it, rendering only reads it.

use std::io;

use kilo_term::event_loop::{Action, App};
use kilo_term::input::{Key, QUIT};
use kilo_term::output::OutputBuffer;
use kilo_term::size::Size;
use tracing::trace;

use crate::cursor::{Cursor, Direction};
use crate::render;
use crate::rows::RowStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    rows: RowStore,
    cursor: Cursor,
    viewport: Size,
}

impl Editor {
    /// An editor showing `rows` in `viewport`, cursor at the top-left.
    #[must_use]
    pub const fn new(rows: RowStore, viewport: Size) -> Self {
        Self {
            rows,
            cursor: Cursor::new(),
            viewport,
        }
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> &RowStore {
        &self.rows
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> Size {
        self.viewport
    }

    /// Apply one key. Arrows move, Page Up/Down move a screenful, Ctrl+Q
    /// quits; everything else is ignored.
    pub fn process_key(&mut self, key: Key) -> Action {
        match key {
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                if let Some(dir) = Direction::from_key(key) {
                    self.cursor.step(dir, self.viewport);
                }
            }
            Key::PageUp => self.cursor.page(Direction::Up, self.viewport.rows, self.viewport),
            Key::PageDown => self.cursor.page(Direction::Down, self.viewport.rows, self.viewport),
            Key::Control(QUIT) => return Action::Quit,
            Key::Char(_) | Key::Control(_) | Key::Delete | Key::Escape => {
                trace!(?key, "ignored");
            }
        }
        Action::Continue
    }
}

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        self.process_key(key)
    }

    fn paint(&mut self, frame: &mut OutputBuffer) -> io::Result<()> {
        render::render_frame(frame, &self.rows, self.cursor, self.viewport)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
