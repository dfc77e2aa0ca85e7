//! Error types for the durafile crate.

use std::path::PathBuf;

use crate::bencode::DecodeError;

/// Failure of an atomic save operation.
///
/// One variant per step of the save sequence — open, write, flush, commit —
/// each carrying the target path and the origin step's I/O error so the
/// platform's message survives into the report. Whichever step fails, the
/// target file is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    /// Creating or opening the temporary file failed.
    #[error("failed to open temp file for {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Fewer bytes reached the temp file than the payload/encoder produced.
    ///
    /// For `save_entry` this is how a write error swallowed mid-stream by
    /// the sink surfaces: the final size check catches the shortfall, and
    /// the first recorded error (if any) is attached as the source.
    #[error("incomplete write to {path}: {written} of {expected} bytes")]
    WriteIncomplete {
        path: PathBuf,
        written: u64,
        expected: u64,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Flushing OS-level buffers (fsync) failed.
    #[error("failed to flush {path}: {source}")]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The atomic rename over the target failed.
    #[error("failed to commit {path}: {source}")]
    Commit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience result type for save operations.
pub type SaveResult<T> = Result<T, SaveError>;

/// Failure of a load operation.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File not found at the specified path.
    #[error("file not found: {path}")]
    NotFound { path: PathBuf },

    /// File exceeds the caller's size cap; refused before reading its bulk.
    #[error("file too large: {path} is {size} bytes, limit {limit}")]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// I/O error with context.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file's contents are not valid bencode.
    #[error("bencode decode error: {0}")]
    Decode(#[from] DecodeError),
}

/// Convenience result type for load operations.
pub type LoadResult<T> = Result<T, LoadError>;
