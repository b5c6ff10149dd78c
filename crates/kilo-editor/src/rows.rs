//! Row store — the document as an ordered list of byte lines.
//!
//! A [`Row`] is one line of the file with its line terminator removed. Rows
//! are raw bytes: nothing here assumes UTF-8, and the renderer truncates by
//! byte count.
//!
//! # Load scope
//!
//! The viewer historically loads only the **first** line of a file. That is
//! kept as the default ([`LoadScope::FirstLine`]) so existing behavior is
//! unchanged; [`LoadScope::AllLines`] loads the whole file.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One line of the document, without its trailing CR/LF.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Row {
    chars: Vec<u8>,
}

impl Row {
    /// Build a row from raw bytes, stripping every trailing `\r` and `\n`.
    #[must_use]
    pub fn new(line: &[u8]) -> Self {
        let end = line
            .iter()
            .rposition(|&b| b != b'\n' && b != b'\r')
            .map_or(0, |i| i + 1);
        Self {
            chars: line[..end].to_vec(),
        }
    }

    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.chars
    }

    /// Length in bytes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

// ---------------------------------------------------------------------------
// RowStore
// ---------------------------------------------------------------------------

/// How much of a file [`RowStore::open`] loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadScope {
    /// Only the first line.
    #[default]
    FirstLine,
    /// Every line.
    AllLines,
}

/// Append-only, ordered collection of rows in file order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowStore {
    rows: Vec<Row>,
}

impl RowStore {
    /// An empty document.
    #[must_use]
    pub const fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Load a document from `path`.
    ///
    /// An empty file yields an empty store. A final line without a newline
    /// is still a row.
    ///
    /// # Errors
    ///
    /// [`Error::FileOpen`] if the file can't be opened or read.
    pub fn open(path: &Path, scope: LoadScope) -> Result<Self> {
        let file_error = |source| Error::FileOpen {
            path: path.to_path_buf(),
            source,
        };

        let file = File::open(path).map_err(file_error)?;
        let mut reader = BufReader::new(file);
        let mut store = Self::new();
        let mut line = Vec::new();

        loop {
            line.clear();
            let n = reader.read_until(b'\n', &mut line).map_err(file_error)?;
            if n == 0 {
                break;
            }
            store.append(&line);
            if scope == LoadScope::FirstLine {
                break;
            }
        }

        info!(path = %path.display(), rows = store.count(), ?scope, "document loaded");
        Ok(store)
    }

    /// Add a row at the end, stripping trailing CR/LF.
    pub fn append(&mut self, line: &[u8]) {
        self.rows.push(Row::new(line));
    }

    /// Number of rows.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.rows.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The row at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.count()`.
    #[inline]
    #[must_use]
    pub fn row_at(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    /// The row at `index`, or `None` past the end.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
