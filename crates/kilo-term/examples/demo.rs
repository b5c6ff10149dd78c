// SPDX-License-Identifier: MIT
//
// kilo-term demo — a live key viewer.
//
// Runs the whole terminal pipeline without the editor on top: raw mode →
// size probe → decoder → OutputBuffer → single write(). Press keys to see
// how they decode. Ctrl-Q to quit.
//
// Usage:
//   cargo run -p kilo-term --example demo

use std::collections::VecDeque;
use std::io::{self, Write};

use kilo_term::ansi;
use kilo_term::event_loop::{Action, App, EventLoop};
use kilo_term::input::Key;
use kilo_term::output::OutputBuffer;
use kilo_term::size::Size;
use kilo_term::terminal;

/// Keys kept in the scrolling log.
const MAX_LOG_ENTRIES: usize = 100;

struct Demo {
    size: Size,
    log: VecDeque<Key>,
    key_count: u64,
}

impl Demo {
    fn new(size: Size) -> Self {
        Self {
            size,
            log: VecDeque::with_capacity(MAX_LOG_ENTRIES),
            key_count: 0,
        }
    }
}

impl App for Demo {
    fn on_key(&mut self, key: Key) -> Action {
        if key.is_quit() {
            return Action::Quit;
        }
        self.key_count += 1;
        if self.log.len() == MAX_LOG_ENTRIES {
            self.log.pop_front();
        }
        self.log.push_back(key);
        Action::Continue
    }

    fn paint(&mut self, frame: &mut OutputBuffer) -> io::Result<()> {
        ansi::cursor_hide(frame)?;
        ansi::cursor_home(frame)?;

        let rows = usize::from(self.size.rows);
        write!(
            frame,
            "kilo-term demo  {}x{}  keys: {}  (Ctrl-Q quits)",
            self.size.cols, self.size.rows, self.key_count
        )?;
        ansi::clear_line(frame)?;

        // Newest key at the bottom; older ones scroll off the top.
        let body = rows.saturating_sub(1);
        let skip = self.log.len().saturating_sub(body);
        let mut shown = self.log.iter().skip(skip);
        for _ in 0..body {
            frame.write_all(b"\r\n")?;
            if let Some(key) = shown.next() {
                write!(frame, "{key:?}")?;
            }
            ansi::clear_line(frame)?;
        }

        ansi::cursor_home(frame)?;
        ansi::cursor_show(frame)
    }
}

fn main() {
    if !terminal::is_tty() {
        eprintln!("demo: stdin is not a terminal; run it from an interactive shell");
        std::process::exit(1);
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            eprintln!("demo: {e}");
            std::process::exit(1);
        }
    };

    let mut demo = Demo::new(event_loop.size());
    if let Err(e) = event_loop.run(&mut demo) {
        eprintln!("demo: {e}");
        std::process::exit(1);
    }
}
