// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Output buffering — one frame, one write.
//
// Two pieces work together so a frame reaches the terminal atomically:
//
//   OutputBuffer — accumulates every byte of a frame in memory. `flush`
//   hands the whole thing to the writer in a single `write_all` call and
//   discards it. A half-drawn frame is never visible.
//
//   TerminalWriter — a `Write` over stdout's file descriptor. Rust's
//   `io::stdout()` is line-buffered and would split a frame at its first
//   newline, so frames go straight to fd 1 instead.

use std::io::{self, Write};

use tracing::warn;

// ─── OutputBuffer ────────────────────────────────────────────────────────────

/// A byte buffer that accumulates one frame for a single write.
///
/// Default capacity: 16 KB, enough for a typical frame without reallocation.
pub struct OutputBuffer {
    buf: Vec<u8>,
}

const DEFAULT_CAPACITY: usize = 16_384;

impl OutputBuffer {
    /// Create an empty buffer with default capacity (16 KB).
    #[must_use]
    pub fn new() -> Self {
        Self {
            buf: Vec::with_capacity(DEFAULT_CAPACITY),
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// The accumulated bytes (for testing and debugging).
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `bytes` to the end of the frame.
    ///
    /// If the buffer cannot grow, the bytes are dropped and the frame goes
    /// out without them. Allocation failure is never reported to the caller.
    pub fn append(&mut self, bytes: &[u8]) {
        if self.buf.try_reserve(bytes.len()).is_err() {
            warn!(len = bytes.len(), "output buffer growth failed, dropping bytes");
            return;
        }
        self.buf.extend_from_slice(bytes);
    }

    /// Discard the accumulated bytes (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write the whole frame to `w` in one `write_all`, then discard it.
    ///
    /// An empty buffer issues no write. The contents are discarded even if
    /// the write fails.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.buf.is_empty() {
            return Ok(());
        }
        let result = w.write_all(&self.buf).and_then(|()| w.flush());
        self.buf.clear();
        result
    }
}

impl Write for OutputBuffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Intentionally a no-op. Real flushing goes through flush_to().
        Ok(())
    }
}

impl Default for OutputBuffer {
    fn default() -> Self {
        Self::new()
    }
}

// ─── TerminalWriter ──────────────────────────────────────────────────────────

/// Unbuffered writer on stdout's file descriptor.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalWriter;

#[cfg(unix)]
impl Write for TerminalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        if n < 0 {
            return Err(io::Error::last_os_error());
        }
        #[allow(clippy::cast_sign_loss)] // n >= 0 checked above.
        Ok(n as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(not(unix))]
impl Write for TerminalWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(buf)?;
        stdout.flush()?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Records every `write` call separately.
    #[derive(Default)]
    struct Recorder {
        writes: Vec<Vec<u8>>,
        flushes: usize,
    }

    impl Write for Recorder {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct Failing;

    impl Write for Failing {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn new_buffer_is_empty() {
        let buf = OutputBuffer::new();
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
    }

    #[test]
    fn appends_concatenate_in_call_order() {
        let mut buf = OutputBuffer::new();
        let parts: [&[u8]; 4] = [b"\x1b[?25l", b"", b"hello", b"\x1b[K\r\n"];
        for part in parts {
            buf.append(part);
        }
        assert_eq!(buf.len(), parts.iter().map(|p| p.len()).sum::<usize>());
        assert_eq!(buf.as_bytes(), b"\x1b[?25lhello\x1b[K\r\n");
    }

    #[test]
    fn appends_beyond_default_capacity_are_kept() {
        let mut buf = OutputBuffer::new();
        let chunk = [b'x'; 1000];
        for _ in 0..20 {
            buf.append(&chunk);
        }
        assert_eq!(buf.len(), 20_000);
    }

    #[test]
    fn flush_is_exactly_one_write() {
        let mut buf = OutputBuffer::new();
        buf.append(b"first");
        buf.append(b"\r\n");
        buf.append(b"second");

        let mut out = Recorder::default();
        buf.flush_to(&mut out).unwrap();

        assert_eq!(out.writes, vec![b"first\r\nsecond".to_vec()]);
        assert_eq!(out.flushes, 1);
    }

    #[test]
    fn flush_discards_contents() {
        let mut buf = OutputBuffer::new();
        buf.append(b"frame");
        buf.flush_to(&mut Recorder::default()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn flush_of_empty_buffer_writes_nothing() {
        let mut out = Recorder::default();
        OutputBuffer::new().flush_to(&mut out).unwrap();
        assert!(out.writes.is_empty());
        assert_eq!(out.flushes, 0);
    }

    #[test]
    fn failed_flush_reports_and_still_discards() {
        let mut buf = OutputBuffer::new();
        buf.append(b"frame");
        assert!(buf.flush_to(&mut Failing).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn write_trait_appends() {
        let mut buf = OutputBuffer::new();
        write!(buf, "\x1b[{};{}H", 3, 7).unwrap();
        assert_eq!(buf.as_bytes(), b"\x1b[3;7H");
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = OutputBuffer::new();
        buf.append(b"abc");
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.buf.capacity() >= DEFAULT_CAPACITY);
    }

    #[test]
    fn terminal_writer_empty_write_is_ok() {
        assert_eq!(TerminalWriter.write(b"").unwrap(), 0);
    }
}
