//! Atomic save and load operations.
//!
//! Every save writes to a [`tempfile::NamedTempFile`] in the target's own
//! directory, verifies the byte count, fsyncs, and then atomically renames
//! over the target. A reader of the target path sees either its prior
//! contents or the complete new contents, never anything in between. On any
//! failure the temp file is discarded by its own drop and the target stays
//! untouched.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::bencode::{Entry, encode_into};
use crate::error::{LoadError, LoadResult, SaveError, SaveResult};
use crate::sink::BufferedSink;

/// Atomically write `data` to `path`, creating parent directories as needed.
///
/// Directory creation is best-effort mkpath: an existing chain is not an
/// error, and a genuine failure surfaces a step later when the temp file
/// cannot be opened. The directories may remain even if the write fails.
pub fn save_bytes(path: &Path, data: &[u8]) -> SaveResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            let _ = fs::create_dir_all(parent);
        }
    }

    let mut tmp = open_temp(path)?;
    tmp.write_all(data)
        .map_err(|source| SaveError::WriteIncomplete {
            path: path.to_path_buf(),
            written: temp_len(&tmp),
            expected: data.len() as u64,
            source: Some(source),
        })?;

    verify_and_commit(tmp, path, data.len() as u64, None)
}

/// Atomically write the bencoding of `entry` to `path`.
///
/// The parent directory must already exist (a missing one surfaces as the
/// open error). The entry is streamed byte-by-byte through a [`BufferedSink`]
/// into the temp file; a write error swallowed mid-stream is caught by the
/// final size check and returned as [`SaveError::WriteIncomplete`] with that
/// error attached, and the target is not committed.
pub fn save_entry(path: &Path, entry: &Entry) -> SaveResult<()> {
    let tmp = open_temp(path)?;
    let (expected, sink_error) = write_encoded(tmp.as_file(), entry);
    verify_and_commit(tmp, path, expected, sink_error)
}

/// Stream the bencoding of `entry` into `out` through a [`BufferedSink`],
/// returning the encoder's byte count and the first write error the sink
/// swallowed. The count reflects what the encoder produced, not what reached
/// `out` — comparing it against the destination's size is the caller's check.
pub fn write_encoded<W: Write>(out: W, entry: &Entry) -> (u64, Option<io::Error>) {
    let mut sink = BufferedSink::new(out);
    let count = encode_into(entry, &mut sink);
    (count as u64, sink.finish().err())
}

/// Read the whole file at `path`, refusing files larger than `max_size`
/// (checked against metadata before any bulk read).
pub fn load_bytes(path: &Path, max_size: Option<u64>) -> LoadResult<Vec<u8>> {
    let metadata = fs::metadata(path).map_err(|source| io_to_load(path, source))?;
    if let Some(limit) = max_size {
        if metadata.len() > limit {
            return Err(LoadError::TooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                limit,
            });
        }
    }

    let data = fs::read(path).map_err(|source| io_to_load(path, source))?;
    debug!(path = %path.display(), bytes = data.len(), "loaded");
    Ok(data)
}

/// Read and strictly decode a bencoded file.
pub fn load_entry(path: &Path, max_size: Option<u64>) -> LoadResult<Entry> {
    let data = load_bytes(path, max_size)?;
    Ok(Entry::from_bytes(&data)?)
}

fn open_temp(path: &Path) -> SaveResult<NamedTempFile> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    NamedTempFile::new_in(parent).map_err(|source| SaveError::Open {
        path: path.to_path_buf(),
        source,
    })
}

/// Size check, fsync, atomic rename — in that order, aborting on the first
/// failure with the target untouched.
fn verify_and_commit(
    tmp: NamedTempFile,
    path: &Path,
    expected: u64,
    sink_error: Option<io::Error>,
) -> SaveResult<()> {
    let written = temp_len(&tmp);
    if written != expected {
        return Err(SaveError::WriteIncomplete {
            path: path.to_path_buf(),
            written,
            expected,
            source: sink_error,
        });
    }

    tmp.as_file().sync_all().map_err(|source| SaveError::Flush {
        path: path.to_path_buf(),
        source,
    })?;

    tmp.persist(path).map_err(|err| SaveError::Commit {
        path: path.to_path_buf(),
        source: err.error,
    })?;

    debug!(path = %path.display(), bytes = expected, "saved");
    Ok(())
}

fn temp_len(tmp: &NamedTempFile) -> u64 {
    tmp.as_file().metadata().map_or(0, |m| m.len())
}

fn io_to_load(path: &Path, source: io::Error) -> LoadError {
    if source.kind() == io::ErrorKind::NotFound {
        LoadError::NotFound {
            path: path.to_path_buf(),
        }
    } else {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
