// SPDX-License-Identifier: MIT
//
// kilo — a minimal terminal text viewer.
//
// This is the main binary that wires the two crates together:
//
//   kilo-term   → raw mode, key decoding, size detection, event loop
//   kilo-editor → row store, cursor, frame rendering
//
// The Editor value implements kilo-term's App trait. Each keypress flows
// through:
//
//   stdin → decoder → on_key → cursor move / quit
//   paint → render_frame → OutputBuffer → one write to the terminal
//
// Startup order: raw mode and the size query first (the cursor-report
// probe needs raw mode), then the document. Any failure after raw mode is
// entered goes back through shutdown before the error is reported.

mod logging;

use std::fmt::Display;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{error, info, warn};

use kilo_editor::Editor;
use kilo_editor::rows::{LoadScope, RowStore};
use kilo_term::event_loop::{EventLoop, reset_screen};
use kilo_term::output::TerminalWriter;

#[derive(Parser, Debug)]
#[command(name = "kilo")]
#[command(about = "A minimal terminal text viewer", long_about = None)]
#[command(version)]
struct Args {
    /// File to open. Without one, kilo shows an empty document.
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Load every line of FILE instead of only the first.
    #[arg(long)]
    all_lines: bool,

    /// Write diagnostics to this file (filtered by RUST_LOG).
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

impl Args {
    const fn scope(&self) -> LoadScope {
        if self.all_lines {
            LoadScope::AllLines
        } else {
            LoadScope::FirstLine
        }
    }
}

fn load(args: &Args) -> kilo_editor::Result<RowStore> {
    match &args.file {
        Some(path) => RowStore::open(path, args.scope()),
        None => Ok(RowStore::new()),
    }
}

/// Teardown on a path that is already failing: the original error is the
/// one reported, so a teardown failure is only logged.
fn warn_on_teardown_failure(what: &str, result: Result<(), impl Display>) {
    if let Err(e) = result {
        warn!("{what} failed after an earlier error: {e}");
    }
}

fn run(args: &Args) -> kilo_editor::Result<()> {
    let event_loop = EventLoop::new()?;

    let rows = match load(args) {
        Ok(rows) => rows,
        Err(e) => {
            warn_on_teardown_failure("terminal shutdown", event_loop.shutdown());
            return Err(e);
        }
    };

    let mut editor = Editor::new(rows, event_loop.size());
    event_loop.run(&mut editor)?;
    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        if let Err(e) = logging::init(path) {
            eprintln!("kilo: {}: {e}", path.display());
            process::exit(1);
        }
    }
    info!(?args, "starting");

    if let Err(e) = run(&args) {
        error!("{e}");
        // Every exit path leaves a clean screen, even when the terminal
        // was never switched to raw mode.
        warn_on_teardown_failure("screen reset", reset_screen(&mut TerminalWriter));
        eprintln!("kilo: {e}");
        process::exit(1);
    }
    info!("exiting");
}

// ─── Tests ──────────────────────────────────────────────────────────────────
