//! # kilo-editor — Editor core for kilo
//!
//! The state the viewer keeps and how it turns into a frame:
//!
//! - **[`rows`]** — `RowStore`, the document as byte lines, and file loading
//! - **[`cursor`]** — `Cursor` clamped to the viewport, one-cell and page moves
//! - **[`render`]** — frame composition into kilo-term's `OutputBuffer`
//! - **[`editor`]** — `Editor`, the state value the event loop drives
//!
//! Terminal handling (raw mode, key decoding, size detection, the loop
//! itself) lives in `kilo-term`.

pub mod cursor;
pub mod editor;
pub mod error;
pub mod render;
pub mod rows;

pub use editor::Editor;
pub use error::{Error, Result};
