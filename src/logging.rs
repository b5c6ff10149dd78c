// SPDX-License-Identifier: MIT
//
// Diagnostics logging.
//
// The terminal is the user interface, so logs never go there. With
// `--log-file` every event is written to that file; without it no
// subscriber is installed and the tracing macros cost a relaxed load.
// `RUST_LOG` narrows what is recorded; the default is `debug`.

use std::fs::File;
use std::io;
use std::path::Path;
use std::sync::Arc;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber, truncating the log file at `path`.
///
/// # Errors
///
/// Returns an error if the log file can't be created.
pub fn init(path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    build_subscriber(file).init();
    Ok(())
}

/// File subscriber filtered by `RUST_LOG`, or at `debug` when it is unset.
pub fn build_subscriber(file: File) -> impl tracing::Subscriber + Send + Sync {
    subscriber_with_filter(file, default_filter().from_env_lossy())
}

pub(crate) fn default_filter() -> tracing_subscriber::filter::Builder {
    EnvFilter::builder().with_default_directive(LevelFilter::DEBUG.into())
}

pub(crate) fn subscriber_with_filter(
    file: File,
    env_filter: EnvFilter,
) -> impl tracing::Subscriber + Send + Sync {
    let fmt_layer = fmt::layer()
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry().with(fmt_layer).with(env_filter)
}
