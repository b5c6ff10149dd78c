// SPDX-License-Identifier: MIT
//
// Event loop — render, read, repeat.
//
// This is the module that wires everything together. One cycle is:
//
//   1. the application paints a complete frame into the `OutputBuffer`,
//   2. the buffer goes out to the terminal in a single write,
//   3. the decoder reads exactly one key (waiting in ~100ms slices),
//   4. the application handles it and says whether to keep going.
//
// Single-threaded and synchronous. The application's state is only touched
// in step 4 and only read in step 1, so nothing needs a lock.
//
// # Lifecycle
//
// `EventLoop::new` enables raw mode and measures the viewport (the size
// probe needs raw mode so the terminal's reply isn't echoed or
// line-buffered). `run` drives the cycle until the application quits or
// something fails, then `shutdown` runs on either path: restore cooked
// mode, clear the screen, home the cursor. If setup itself fails, the
// same cleanup happens before the error is returned.

use std::io::{self, Write};

use tracing::{debug, info, warn};

use crate::ansi;
use crate::error::{Error, Result};
use crate::input::{Decoder, Key};
use crate::output::{OutputBuffer, TerminalWriter};
use crate::reader::{ByteSource, StdinSource};
use crate::size::{self, Size};
use crate::terminal::RawMode;

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// The loop calls [`paint`](App::paint) before every read and
/// [`on_key`](App::on_key) after it.
pub trait App {
    /// Handle one decoded key.
    ///
    /// Return [`Action::Quit`] to leave the loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Compose the complete frame into `frame`.
    ///
    /// The buffer is empty on entry. Everything written here reaches the
    /// terminal in one write after this returns.
    ///
    /// # Errors
    ///
    /// Propagates writer errors (never produced by `OutputBuffer` itself).
    fn paint(&mut self, frame: &mut OutputBuffer) -> io::Result<()>;
}

/// Drive `app` until it returns [`Action::Quit`].
///
/// Exposed separately from [`EventLoop`] so the cycle can run against any
/// byte source and writer.
///
/// # Errors
///
/// [`Error::Write`] if a frame can't be written, [`Error::Read`] if input
/// fails.
pub fn drive(
    app: &mut impl App,
    decoder: &mut Decoder,
    input: &mut impl ByteSource,
    frame: &mut OutputBuffer,
    out: &mut impl Write,
) -> Result<()> {
    loop {
        frame.clear();
        app.paint(frame).map_err(Error::Write)?;
        frame.flush_to(out).map_err(Error::Write)?;

        let key = decoder.read_key(input)?;
        if app.on_key(key) == Action::Quit {
            debug!("quit requested");
            return Ok(());
        }
    }
}

/// Clear the screen and home the cursor in a single write.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn reset_screen(out: &mut impl Write) -> io::Result<()> {
    let mut buf = OutputBuffer::new();
    ansi::clear_screen(&mut buf)?;
    ansi::cursor_home(&mut buf)?;
    buf.flush_to(out)
}

/// [`reset_screen`] on a path that is already failing. The original error
/// is the one reported, so a clearing failure is only logged.
fn clear_after_failure(out: &mut impl Write) {
    if let Err(e) = reset_screen(out) {
        warn!("failed to clear the screen after a setup error: {e}");
    }
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the raw-mode guard, the decoder, and the frame buffer.
///
/// # Example
///
/// ```no_run
/// use std::io;
/// use kilo_term::event_loop::{Action, App, EventLoop};
/// use kilo_term::input::Key;
/// use kilo_term::output::OutputBuffer;
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: Key) -> Action {
///         if key.is_quit() { Action::Quit } else { Action::Continue }
///     }
///
///     fn paint(&mut self, frame: &mut OutputBuffer) -> io::Result<()> {
///         frame.append(b"hello");
///         Ok(())
///     }
/// }
///
/// let event_loop = EventLoop::new()?;
/// event_loop.run(&mut MyApp)?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct EventLoop {
    raw: RawMode,
    size: Size,
    decoder: Decoder,
    input: StdinSource,
    frame: OutputBuffer,
    out: TerminalWriter,
}

impl EventLoop {
    /// Enable raw mode and measure the viewport.
    ///
    /// # Errors
    ///
    /// Terminal query/configure errors from raw mode, or
    /// [`Error::SizeUnavailable`]. The terminal is restored and the screen
    /// cleared before returning an error.
    pub fn new() -> Result<Self> {
        let raw = RawMode::enable()?;
        let mut input = StdinSource::new();
        let mut out = TerminalWriter;

        let size = match size::query_size(&mut input, &mut out) {
            Ok(size) => size,
            Err(e) => {
                let restored = raw.restore();
                clear_after_failure(&mut out);
                restored?;
                return Err(e);
            }
        };
        info!(rows = size.rows, cols = size.cols, "terminal ready");

        Ok(Self {
            raw,
            size,
            decoder: Decoder::new(),
            input,
            frame: OutputBuffer::new(),
            out,
        })
    }

    /// The viewport size measured at startup.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Run the loop until the application quits, then shut down.
    ///
    /// Shutdown happens on the error path too; the loop's error wins over
    /// a shutdown error.
    ///
    /// # Errors
    ///
    /// Read and write errors from the loop, or [`Error::TerminalRestore`].
    pub fn run(mut self, app: &mut impl App) -> Result<()> {
        let result = drive(
            app,
            &mut self.decoder,
            &mut self.input,
            &mut self.frame,
            &mut self.out,
        );
        let teardown = self.shutdown();
        result.and(teardown)
    }

    /// Restore cooked mode, clear the screen, and home the cursor.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalRestore`] if the attributes can't be restored (the
    /// screen is cleared regardless), [`Error::Write`] if clearing fails.
    pub fn shutdown(self) -> Result<()> {
        let Self { raw, mut out, .. } = self;
        let restored = raw.restore();
        let cleared = reset_screen(&mut out).map_err(Error::Write);
        debug!("terminal restored");
        restored.and(cleared)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::QUIT;
    use crate::reader::Replay;
    use pretty_assertions::assert_eq;

    /// Counts keys, paints the count, quits on Ctrl+Q.
    #[derive(Default)]
    struct Counter {
        keys: Vec<Key>,
        paints: usize,
    }

    impl App for Counter {
        fn on_key(&mut self, key: Key) -> Action {
            self.keys.push(key);
            if key.is_quit() { Action::Quit } else { Action::Continue }
        }

        fn paint(&mut self, frame: &mut OutputBuffer) -> io::Result<()> {
            self.paints += 1;
            write!(frame, "frame {}\r\n", self.paints)
        }
    }

    /// Records every `write` call separately.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<Vec<u8>>,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn run_script(mut input: Replay) -> (Counter, Recorder, Result<()>) {
        let mut app = Counter::default();
        let mut out = Recorder::default();
        let result = drive(
            &mut app,
            &mut Decoder::new(),
            &mut input,
            &mut OutputBuffer::new(),
            &mut out,
        );
        (app, out, result)
    }

    #[test]
    fn action_equality() {
        assert_eq!(Action::Continue, Action::Continue);
        assert_ne!(Action::Continue, Action::Quit);
    }

    #[test]
    fn paints_before_every_read() {
        let (app, out, result) = run_script(Replay::bytes(&[b'a', b'b', QUIT]));
        result.unwrap();
        assert_eq!(app.paints, 3);
        assert_eq!(app.keys, vec![Key::Char(b'a'), Key::Char(b'b'), Key::Control(QUIT)]);
        assert_eq!(out.writes.len(), 3);
    }

    #[test]
    fn each_frame_is_a_single_write() {
        let (_, out, _) = run_script(Replay::bytes(&[b'x', QUIT]));
        assert_eq!(out.writes, vec![b"frame 1\r\n".to_vec(), b"frame 2\r\n".to_vec()]);
    }

    #[test]
    fn quit_stops_before_reading_further() {
        let mut input = Replay::bytes(&[QUIT, b'z']);
        let mut app = Counter::default();
        drive(
            &mut app,
            &mut Decoder::new(),
            &mut input,
            &mut OutputBuffer::new(),
            &mut Recorder::default(),
        )
        .unwrap();
        assert_eq!(input.remaining(), 1);
    }

    #[test]
    fn timeouts_do_not_repaint() {
        let input = Replay::default()
            .then_timeout()
            .then_timeout()
            .then_bytes(&[QUIT]);
        let (app, _, result) = run_script(input);
        result.unwrap();
        assert_eq!(app.paints, 1);
    }

    #[test]
    fn read_failure_ends_the_loop_with_read_error() {
        let (app, _, result) = run_script(Replay::bytes(b"ab"));
        assert!(matches!(result, Err(Error::Read(_))));
        assert_eq!(app.keys.len(), 2);
    }

    /// A writer whose every write fails.
    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failure_ends_the_loop_with_write_error() {
        let mut app = Counter::default();
        let result = drive(
            &mut app,
            &mut Decoder::new(),
            &mut Replay::bytes(&[QUIT]),
            &mut OutputBuffer::new(),
            &mut Closed,
        );
        assert!(matches!(result, Err(Error::Write(_))));
        assert!(app.keys.is_empty());
    }

    #[test]
    fn reset_screen_clears_and_homes_in_one_write() {
        let mut out = Recorder::default();
        reset_screen(&mut out).unwrap();
        assert_eq!(out.writes, vec![b"\x1b[2J\x1b[H".to_vec()]);
    }

    #[test]
    fn clear_after_failure_writes_the_reset() {
        let mut out = Recorder::default();
        clear_after_failure(&mut out);
        assert_eq!(out.writes, vec![b"\x1b[2J\x1b[H".to_vec()]);
    }

    #[test]
    fn clear_after_failure_swallows_write_errors() {
        clear_after_failure(&mut Closed);
    }
}
