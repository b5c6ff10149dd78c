// SPDX-License-Identifier: MIT
//
// kilo-term — Terminal control for kilo.
//
// Everything between the editor state and the terminal device: raw mode
// via termios with a guard that always restores, a byte-level key decoder
// for the VT100 sequences terminals send by default, a viewport probe that
// falls back to asking the terminal itself, and an output buffer that
// delivers each frame in exactly one write.
//
// This crate intentionally avoids external TUI frameworks (ratatui,
// crossterm) in favor of direct terminal control via escape sequences and
// raw termios. Every byte sent to the terminal is accounted for.

pub mod ansi;
pub mod error;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod size;
pub mod terminal;

pub use error::{Error, Result};
