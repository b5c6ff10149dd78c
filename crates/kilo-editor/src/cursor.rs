//! Cursor — a screen position clamped to the viewport.
//!
//! The cursor moves over the visible cells, not over the document: it can
//! sit on any cell of the viewport whether or not text is drawn there.
//! Every move is one cell and stops at the edges.

use kilo_term::input::Key;
use kilo_term::size::Size;

/// One-cell movement direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// The direction an arrow key moves in. Other keys don't move.
    #[must_use]
    pub const fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::ArrowUp => Some(Self::Up),
            Key::ArrowDown => Some(Self::Down),
            Key::ArrowLeft => Some(Self::Left),
            Key::ArrowRight => Some(Self::Right),
            Key::Char(_)
            | Key::Control(_)
            | Key::PageUp
            | Key::PageDown
            | Key::Delete
            | Key::Escape => None,
        }
    }
}

/// Cursor position in viewport cells, 0-indexed.
///
/// Invariant: `x < bounds.cols` and `y < bounds.rows` for the bounds passed
/// to every move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    x: u16,
    y: u16,
}

impl Cursor {
    /// A cursor at the top-left cell.
    #[must_use]
    pub const fn new() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Column.
    #[inline]
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Row.
    #[inline]
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }

    /// Move one cell in `dir`. At an edge this is a no-op.
    pub fn step(&mut self, dir: Direction, bounds: Size) {
        match dir {
            Direction::Left => self.x = self.x.saturating_sub(1),
            Direction::Right => {
                if self.x < bounds.cols.saturating_sub(1) {
                    self.x += 1;
                }
            }
            Direction::Up => self.y = self.y.saturating_sub(1),
            Direction::Down => {
                if self.y < bounds.rows.saturating_sub(1) {
                    self.y += 1;
                }
            }
        }
    }

    /// Repeat [`step`](Self::step) `times` times.
    ///
    /// Page Up / Page Down call this with the viewport height.
    pub fn page(&mut self, dir: Direction, times: u16, bounds: Size) {
        for _ in 0..times {
            self.step(dir, bounds);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
