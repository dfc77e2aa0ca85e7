//! `durafile` — durable file persistence with streaming bencode.
//!
//! Writes data to disk so that readers never observe a torn file: every save
//! goes to a sibling temporary file first and only replaces the target via an
//! atomic rename once the full write, a byte-count check, and an fsync have
//! succeeded. Structured values are serialized incrementally through a
//! buffered sink, so an encoded payload is never held in memory whole.
//!
//! # Components
//!
//! - `save` — [`save_bytes`] / [`save_entry`] atomic save operations, plus
//!   the [`load_bytes`] / [`load_entry`] read-back counterparts
//! - `sink` — [`BufferedSink`], a byte-at-a-time output sink with a shared
//!   buffer that flushes at capacity and once more on close
//! - `bencode` — the recursive [`Entry`] value type with a streaming encoder
//!   and a strict decoder
//!
//! # Control flow
//!
//! ```text
//! save_entry(path, entry)
//!     → NamedTempFile in target dir
//!     → encode_into(entry, BufferedSink)   (batched physical writes)
//!     → finish() final flush
//!     → size check against encoder count
//!     → fsync → persist (atomic rename)
//! ```

pub mod bencode;
pub mod error;
pub mod save;
pub mod sink;

pub use bencode::Entry;
pub use error::{LoadError, LoadResult, SaveError, SaveResult};
pub use save::{load_bytes, load_entry, save_bytes, save_entry};
pub use sink::BufferedSink;
