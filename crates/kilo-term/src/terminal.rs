// SPDX-License-Identifier: MIT
//
// Terminal mode — raw mode via termios with RAII restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), isatty, and raw fd writes. These are the standard POSIX
// interfaces for terminal control and there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// `RawMode` captures the terminal's original attributes exactly once, then
// switches stdin to byte-at-a-time input with a bounded read wait. The
// snapshot goes back exactly once, on whichever path runs first:
//
//   - `RawMode::restore()` on an orderly exit (errors are reported),
//   - `Drop` on early returns and `?` propagation (errors are swallowed),
//   - the panic hook, which restores from a process-global backup and
//     writes a short cleanup sequence straight to fd 1.
//
// The global backup is the single record of whether a restore is still
// owed. Every path takes it, and the guard skips `tcsetattr` when it finds
// the backup already gone, so the others become no-ops.

#[cfg(unix)]
use std::io;
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use tracing::{debug, warn};

use crate::error::{Error, Result};

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// The [`RawMode`] guard owns its own copy, but the panic hook can't reach
/// it. This backup, behind a [`Mutex`], lets the hook restore cooked mode
/// without the guard.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
        if let Some(original) = guard.take() {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const original);
            }
        }
    }
}

/// Emergency cleanup written on panic: show the cursor, clear, go home.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard: the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Writes [`EMERGENCY_RESTORE`] directly to fd 1 (bypassing the stdout lock,
/// which may be held mid-frame), restores termios, then delegates to the
/// original hook so the message lands on a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            #[cfg(unix)]
            {
                if is_raw_backup_held() {
                    unsafe {
                        let _ = libc::write(
                            libc::STDOUT_FILENO,
                            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
                            EMERGENCY_RESTORE.len(),
                        );
                    }
                }
                restore_termios_from_backup();
            }

            original(info);
        }));
    });
}

#[cfg(unix)]
fn is_raw_backup_held() -> bool {
    TERMIOS_BACKUP.lock().map(|g| g.is_some()).unwrap_or(false)
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Raw Flags ──────────────────────────────────────────────────────────────

/// `VMIN`: a read may return with zero bytes.
pub const READ_MIN_BYTES: u8 = 0;

/// `VTIME`: a read waits at most this many tenths of a second.
pub const READ_TIMEOUT_DECISECONDS: u8 = 1;

/// Derive raw attributes from the captured original.
///
/// Turns off break-to-interrupt, CR→NL translation, parity checking,
/// 8th-bit stripping, and XON/XOFF flow control on input; output
/// post-processing; echo, canonical mode, `IEXTEN` and signal generation.
/// Characters are forced to 8 bits and reads return after at most
/// [`READ_TIMEOUT_DECISECONDS`] with as few as [`READ_MIN_BYTES`].
#[cfg(unix)]
#[must_use]
pub fn make_raw(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = READ_MIN_BYTES;
    raw.c_cc[libc::VTIME] = READ_TIMEOUT_DECISECONDS;
    raw
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Scoped raw-mode guard.
///
/// Created by [`enable`](Self::enable). The original attributes are restored
/// exactly once: by [`restore`](Self::restore), by `Drop`, or by the panic
/// hook, whichever runs first.
///
/// # Example
///
/// ```no_run
/// use kilo_term::terminal::RawMode;
///
/// let raw = RawMode::enable()?;
/// // ... read keys, render frames ...
/// raw.restore()?;
/// # Ok::<(), kilo_term::Error>(())
/// ```
pub struct RawMode {
    /// Original termios captured before switching.
    #[cfg(unix)]
    original: libc::termios,

    /// Whether raw mode is still in effect.
    active: bool,
}

impl RawMode {
    /// Capture the current attributes and switch stdin to raw mode.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalQuery`] if the attributes cannot be read (including
    /// when stdin is not a terminal), [`Error::TerminalConfigure`] if the raw
    /// attributes are rejected.
    #[cfg(unix)]
    pub fn enable() -> Result<Self> {
        install_panic_hook();

        let mut original: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut original) } != 0 {
            return Err(Error::TerminalQuery(io::Error::last_os_error()));
        }

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }

        let raw = make_raw(&original);
        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const raw) } != 0 {
            let err = io::Error::last_os_error();
            // Nothing changed, so there is nothing to restore.
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }
            return Err(Error::TerminalConfigure(err));
        }

        debug!("raw mode enabled");
        Ok(Self {
            original,
            active: true,
        })
    }

    #[cfg(not(unix))]
    pub fn enable() -> Result<Self> {
        install_panic_hook();
        Err(Error::TerminalQuery(std::io::Error::new(
            std::io::ErrorKind::Unsupported,
            "raw mode requires a unix terminal",
        )))
    }

    /// Whether raw mode is still in effect.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Restore the original attributes, consuming the guard.
    ///
    /// # Errors
    ///
    /// [`Error::TerminalRestore`] if `tcsetattr` fails.
    pub fn restore(mut self) -> Result<()> {
        self.disable()
    }

    #[cfg(unix)]
    fn disable(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        // Marked inactive up front: a failed restore is not retried by Drop.
        self.active = false;

        let mut backup = TERMIOS_BACKUP.lock().ok();
        if backup.as_ref().is_some_and(|guard| guard.is_none()) {
            debug!("terminal already restored by the panic hook");
            return Ok(());
        }

        if unsafe { libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const self.original) }
            != 0
        {
            return Err(Error::TerminalRestore(io::Error::last_os_error()));
        }

        if let Some(guard) = backup.as_mut() {
            **guard = None;
        }

        debug!("raw mode disabled");
        Ok(())
    }

    #[cfg(not(unix))]
    fn disable(&mut self) -> Result<()> {
        self.active = false;
        Ok(())
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        if let Err(e) = self.disable() {
            warn!("failed to restore terminal on drop: {e}");
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
