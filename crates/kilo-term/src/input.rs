// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns raw stdin bytes into logical keys. The accepted encodings are the
// VT100 subset every terminal emits in its default mode:
//
//   - plain bytes (printable and control)
//   - CSI arrows: ESC [ A / B / C / D
//   - CSI editing keys: ESC [ 3 ~ (Delete), ESC [ 5 ~ (PageUp), ESC [ 6 ~ (PageDown)
//
// # Design
//
// The decoder is an explicit state machine:
//
//   Start ──ESC──▶ EscapeSeen ──'['──▶ BracketSeen ──digit──▶ Numeric(d)
//                       │
//                       └──other──▶ Unrecognized ──any──▶ Escape
//
// [`Decoder::advance`] is the pure transition function. It takes one read
// outcome (`Some(byte)` or `None` for "the bounded wait elapsed") and
// either emits a key or moves to the next state. [`Decoder::read_key`]
// drives it from a `ByteSource`.
//
// A timeout in `Start` just means nobody typed anything, so the driver
// keeps waiting. A timeout anywhere else means the sequence was never
// completed: the user pressed Escape on its own. That is what keeps a lone
// ESC from blocking forever while we wait for a sequence that isn't coming.
// Unrecognized sequences also collapse to `Escape`; the bytes already
// consumed are discarded. After ESC the decoder always takes two more
// bytes (or a timeout) before giving up, so `ESC O H` is one `Escape`.

use crate::error::{Error, Result};
use crate::reader::ByteSource;

/// The escape byte (0x1B).
pub const ESC: u8 = 0x1B;

/// The byte a terminal sends for Ctrl+`key`.
///
/// Ctrl clears bits 5 and 6 of the key's ASCII code, so Ctrl+Q is `0x11`.
#[inline]
#[must_use]
pub const fn ctrl(key: u8) -> u8 {
    key & 0x1F
}

/// The quit signal: Ctrl+Q.
pub const QUIT: u8 = ctrl(b'q');

// ─── Key ────────────────────────────────────────────────────────────────────

/// A decoded key.
///
/// Closed set: anything the decoder doesn't recognize becomes `Escape`
/// or a plain byte, so consumers can match exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A byte outside any escape sequence that isn't a control code.
    Char(u8),
    /// A C0 control code (0x00–0x1F except ESC) or DEL (0x7F).
    Control(u8),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    PageUp,
    PageDown,
    Delete,
    /// A lone ESC, or an escape sequence we don't understand.
    Escape,
}

impl Key {
    /// Classify a byte that arrived outside an escape sequence.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            ESC => Self::Escape,
            0x00..=0x1F | 0x7F => Self::Control(byte),
            _ => Self::Char(byte),
        }
    }

    /// Whether this key is the quit signal (Ctrl+Q).
    #[inline]
    #[must_use]
    pub const fn is_quit(self) -> bool {
        matches!(self, Self::Control(QUIT))
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Where the decoder is inside an escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Between keys.
    #[default]
    Start,
    /// Saw ESC.
    EscapeSeen,
    /// Saw ESC and a byte other than `[`; one more byte is swallowed.
    Unrecognized,
    /// Saw ESC `[`.
    BracketSeen,
    /// Saw ESC `[` and a digit; waiting for `~`.
    Numeric(u8),
}

/// Escape-sequence decoder.
///
/// # Example
///
/// ```
/// use kilo_term::input::{Decoder, Key};
/// use kilo_term::reader::Replay;
///
/// let mut input = Replay::bytes(b"\x1b[5~x");
/// let mut decoder = Decoder::new();
///
/// assert_eq!(decoder.read_key(&mut input)?, Key::PageUp);
/// assert_eq!(decoder.read_key(&mut input)?, Key::Char(b'x'));
/// # Ok::<(), kilo_term::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    state: State,
}

impl Decoder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: State::Start,
        }
    }

    /// Current position in the state machine.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> State {
        self.state
    }

    /// Feed one read outcome and return the key it completes, if any.
    ///
    /// `None` means the read's bounded wait elapsed with no byte.
    pub fn advance(&mut self, byte: Option<u8>) -> Option<Key> {
        let (next, key) = match (self.state, byte) {
            (State::Start, None) => (State::Start, None),
            (State::Start, Some(ESC)) => (State::EscapeSeen, None),
            (State::Start, Some(b)) => (State::Start, Some(Key::from_byte(b))),

            (State::EscapeSeen, Some(b'[')) => (State::BracketSeen, None),
            (State::EscapeSeen, Some(_)) => (State::Unrecognized, None),
            (State::EscapeSeen, None) => (State::Start, Some(Key::Escape)),

            (State::Unrecognized, _) => (State::Start, Some(Key::Escape)),

            (State::BracketSeen, Some(b'A')) => (State::Start, Some(Key::ArrowUp)),
            (State::BracketSeen, Some(b'B')) => (State::Start, Some(Key::ArrowDown)),
            (State::BracketSeen, Some(b'C')) => (State::Start, Some(Key::ArrowRight)),
            (State::BracketSeen, Some(b'D')) => (State::Start, Some(Key::ArrowLeft)),
            (State::BracketSeen, Some(d @ b'0'..=b'9')) => (State::Numeric(d), None),
            (State::BracketSeen, _) => (State::Start, Some(Key::Escape)),

            (State::Numeric(d), Some(b'~')) => (State::Start, Some(tilde_key(d))),
            (State::Numeric(_), _) => (State::Start, Some(Key::Escape)),
        };
        self.state = next;
        key
    }

    /// Block until a full key has been read from `source`.
    ///
    /// Timeouts before the first byte are waited out. Timeouts inside a
    /// sequence resolve it to [`Key::Escape`].
    ///
    /// # Errors
    ///
    /// [`Error::Read`] if the source fails for any reason other than its
    /// bounded wait elapsing. The decoder is reset so it can be reused.
    pub fn read_key(&mut self, source: &mut impl ByteSource) -> Result<Key> {
        loop {
            let byte = source.read_byte().map_err(|e| {
                self.state = State::Start;
                Error::Read(e)
            })?;
            if let Some(key) = self.advance(byte) {
                return Ok(key);
            }
        }
    }
}

/// Map the digit of an `ESC [ digit ~` sequence to its key.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'3' => Key::Delete,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::Replay;
    use pretty_assertions::assert_eq;

    /// Decode every key in `bytes` (followed by end of input).
    fn decode_all(bytes: &[u8]) -> Vec<Key> {
        let mut input = Replay::bytes(bytes);
        let mut decoder = Decoder::new();
        let mut keys = Vec::new();
        while input.remaining() > 0 {
            keys.push(decoder.read_key(&mut input).unwrap());
        }
        keys
    }

    /// Decode one key where `bytes` is followed by a timed-out read.
    fn decode_then_timeout(bytes: &[u8]) -> Key {
        let mut input = Replay::bytes(bytes).then_timeout();
        Decoder::new().read_key(&mut input).unwrap()
    }

    // ── Plain bytes ─────────────────────────────────────────────────────

    #[test]
    fn printable_bytes_are_chars() {
        assert_eq!(decode_all(b"az~ "), vec![
            Key::Char(b'a'),
            Key::Char(b'z'),
            Key::Char(b'~'),
            Key::Char(b' '),
        ]);
    }

    #[test]
    fn high_bytes_are_chars() {
        assert_eq!(decode_all(&[0xC3, 0xA9]), vec![Key::Char(0xC3), Key::Char(0xA9)]);
    }

    #[test]
    fn control_bytes_are_control() {
        assert_eq!(decode_all(&[0x01, b'\r', 0x7F]), vec![
            Key::Control(0x01),
            Key::Control(b'\r'),
            Key::Control(0x7F),
        ]);
    }

    #[test]
    fn ctrl_q_is_quit() {
        assert_eq!(QUIT, 0x11);
        let keys = decode_all(&[QUIT]);
        assert_eq!(keys, vec![Key::Control(0x11)]);
        assert!(keys[0].is_quit());
        assert!(!Key::Char(b'q').is_quit());
    }

    #[test]
    fn ctrl_masks_case_insensitively() {
        assert_eq!(ctrl(b'q'), ctrl(b'Q'));
        assert_eq!(ctrl(b'a'), 0x01);
    }

    // ── Arrows ──────────────────────────────────────────────────────────

    #[test]
    fn arrow_up() {
        assert_eq!(decode_all(b"\x1b[A"), vec![Key::ArrowUp]);
    }

    #[test]
    fn arrow_down() {
        assert_eq!(decode_all(b"\x1b[B"), vec![Key::ArrowDown]);
    }

    #[test]
    fn arrow_right() {
        assert_eq!(decode_all(b"\x1b[C"), vec![Key::ArrowRight]);
    }

    #[test]
    fn arrow_left() {
        assert_eq!(decode_all(b"\x1b[D"), vec![Key::ArrowLeft]);
    }

    // ── Tilde sequences ─────────────────────────────────────────────────

    #[test]
    fn delete() {
        assert_eq!(decode_all(b"\x1b[3~"), vec![Key::Delete]);
    }

    #[test]
    fn page_up() {
        assert_eq!(decode_all(b"\x1b[5~"), vec![Key::PageUp]);
    }

    #[test]
    fn page_down() {
        assert_eq!(decode_all(b"\x1b[6~"), vec![Key::PageDown]);
    }

    #[test]
    fn unknown_digit_is_escape() {
        assert_eq!(decode_all(b"\x1b[2~"), vec![Key::Escape]);
        assert_eq!(decode_all(b"\x1b[9~"), vec![Key::Escape]);
    }

    #[test]
    fn digit_without_tilde_is_escape() {
        // The byte in the terminator slot is consumed with the sequence.
        assert_eq!(decode_all(b"\x1b[5xy"), vec![Key::Escape, Key::Char(b'y')]);
    }

    // ── Lone ESC and timeouts ───────────────────────────────────────────

    #[test]
    fn lone_escape_resolves_on_timeout() {
        assert_eq!(decode_then_timeout(b"\x1b"), Key::Escape);
    }

    #[test]
    fn escape_bracket_then_timeout_is_escape() {
        assert_eq!(decode_then_timeout(b"\x1b["), Key::Escape);
    }

    #[test]
    fn escape_bracket_digit_then_timeout_is_escape() {
        assert_eq!(decode_then_timeout(b"\x1b[3"), Key::Escape);
    }

    #[test]
    fn timeouts_before_a_key_are_waited_out() {
        let mut input = Replay::default()
            .then_timeout()
            .then_timeout()
            .then_bytes(b"\x1b[B");
        assert_eq!(Decoder::new().read_key(&mut input).unwrap(), Key::ArrowDown);
    }

    #[test]
    fn escape_followed_by_other_byte_is_escape() {
        assert_eq!(decode_all(b"\x1bOHz"), vec![Key::Escape, Key::Char(b'z')]);
    }

    #[test]
    fn escape_other_byte_then_timeout_is_escape() {
        let mut input = Replay::bytes(b"\x1bO").then_timeout().then_bytes(b"z");
        let mut decoder = Decoder::new();
        assert_eq!(decoder.read_key(&mut input).unwrap(), Key::Escape);
        assert_eq!(decoder.read_key(&mut input).unwrap(), Key::Char(b'z'));
    }

    #[test]
    fn unknown_csi_final_is_escape() {
        assert_eq!(decode_all(b"\x1b[Zq"), vec![Key::Escape, Key::Char(b'q')]);
    }

    #[test]
    fn escape_escape_swallows_the_next_two_bytes() {
        // ESC ESC [ A z: the second ESC and the `[` go with the first.
        assert_eq!(decode_all(b"\x1b\x1b[Az"), vec![
            Key::Escape,
            Key::Char(b'A'),
            Key::Char(b'z'),
        ]);
    }

    // ── Streams ─────────────────────────────────────────────────────────

    #[test]
    fn mixed_stream() {
        assert_eq!(decode_all(b"h\x1b[Ci\x1b[6~\x1b[3~\x11"), vec![
            Key::Char(b'h'),
            Key::ArrowRight,
            Key::Char(b'i'),
            Key::PageDown,
            Key::Delete,
            Key::Control(QUIT),
        ]);
    }

    // ── State machine ───────────────────────────────────────────────────

    #[test]
    fn states_progress_through_a_sequence() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.state(), State::Start);
        assert_eq!(decoder.advance(Some(ESC)), None);
        assert_eq!(decoder.state(), State::EscapeSeen);
        assert_eq!(decoder.advance(Some(b'[')), None);
        assert_eq!(decoder.state(), State::BracketSeen);
        assert_eq!(decoder.advance(Some(b'5')), None);
        assert_eq!(decoder.state(), State::Numeric(b'5'));
        assert_eq!(decoder.advance(Some(b'~')), Some(Key::PageUp));
        assert_eq!(decoder.state(), State::Start);
    }

    #[test]
    fn unrecognized_escape_takes_one_more_byte() {
        let mut decoder = Decoder::new();
        decoder.advance(Some(ESC));
        assert_eq!(decoder.advance(Some(b'O')), None);
        assert_eq!(decoder.state(), State::Unrecognized);
        assert_eq!(decoder.advance(Some(b'H')), Some(Key::Escape));
        assert_eq!(decoder.state(), State::Start);
    }

    #[test]
    fn timeout_in_start_emits_nothing() {
        let mut decoder = Decoder::new();
        assert_eq!(decoder.advance(None), None);
        assert_eq!(decoder.state(), State::Start);
    }

    // ── Errors ──────────────────────────────────────────────────────────

    #[test]
    fn read_failure_is_a_read_error() {
        let mut input = Replay::default();
        let err = Decoder::new().read_key(&mut input).unwrap_err();
        assert!(matches!(err, Error::Read(_)));
    }

    #[test]
    fn read_failure_mid_sequence_resets_the_decoder() {
        let mut input = Replay::bytes(b"\x1b[");
        let mut decoder = Decoder::new();
        assert!(decoder.read_key(&mut input).is_err());
        assert_eq!(decoder.state(), State::Start);
    }
}
