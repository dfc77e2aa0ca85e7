//! Buffered streaming output sink.
//!
//! [`BufferedSink`] accumulates single-byte appends in a shared buffer and
//! writes the buffer through to the underlying writer whenever it reaches
//! capacity. Encoders may clone the sink as they recurse; the clones share
//! one buffer, and only the last surviving handle performs the final flush.
//! [`BufferedSink::finish`] is the preferred way to end a stream — it
//! flushes eagerly and reports the first write error the sink swallowed.
//!
//! A write error does not stop the stream: it is recorded once, subsequent
//! physical writes are skipped, and the buffer keeps getting cleared so
//! appends stay cheap. Callers detect the loss afterwards, either through
//! [`finish`](BufferedSink::finish) or a size check on the destination.

use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use tracing::warn;

use crate::bencode::ByteSink;

/// Default buffer capacity: 64 KiB.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

struct Shared<W: Write> {
    out: W,
    buffer: Vec<u8>,
    capacity: usize,
    /// First write error, kept until the handle owning it is dropped.
    /// While set, physical writes are skipped.
    error: Option<io::Error>,
}

impl<W: Write> Shared<W> {
    /// Write the buffered bytes if no error is recorded, then clear the
    /// buffer regardless of the outcome.
    fn flush_buffer(&mut self) {
        if self.error.is_none() && !self.buffer.is_empty() {
            if let Err(err) = self.out.write_all(&self.buffer) {
                warn!(error = %err, "buffered write failed; stream abandoned");
                self.error = Some(err);
            }
        }
        self.buffer.clear();
    }
}

/// A byte-at-a-time sink over any [`io::Write`], with a fixed-capacity
/// shared buffer. For file saves the writer is a borrowed `&File`.
///
/// Deliberately `!Send`/`!Sync`: the sharing between clones coordinates
/// object lifetimes on one thread, not cross-thread access.
pub struct BufferedSink<W: Write> {
    shared: Rc<RefCell<Shared<W>>>,
}

impl<W: Write> BufferedSink<W> {
    /// Bind to `out` with the default 64 KiB capacity.
    pub fn new(out: W) -> Self {
        Self::with_capacity(out, DEFAULT_CAPACITY)
    }

    /// Bind to `out` with an explicit capacity. Storage is pre-allocated.
    /// A zero capacity degenerates to an unbuffered per-byte writer.
    pub fn with_capacity(out: W, capacity: usize) -> Self {
        Self {
            shared: Rc::new(RefCell::new(Shared {
                out,
                buffer: Vec::with_capacity(capacity),
                capacity,
                error: None,
            })),
        }
    }

    /// End the stream: flush any buffered bytes and report the first write
    /// error the sink swallowed, with its kind and message preserved.
    ///
    /// The buffer is left empty, so clones that outlive this handle write
    /// nothing when they drop.
    pub fn finish(self) -> io::Result<()> {
        let mut shared = self.shared.borrow_mut();
        shared.flush_buffer();
        match &shared.error {
            Some(err) => Err(io::Error::new(err.kind(), err.to_string())),
            None => Ok(()),
        }
    }
}

impl<W: Write> ByteSink for BufferedSink<W> {
    /// Append one byte, writing the whole buffer through once it reaches
    /// capacity. Cheap enough to call at encoder (per-byte) frequency.
    fn put(&mut self, byte: u8) {
        let mut shared = self.shared.borrow_mut();
        shared.buffer.push(byte);
        if shared.buffer.len() >= shared.capacity {
            shared.flush_buffer();
        }
    }
}

impl<W: Write> Clone for BufferedSink<W> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<W: Write> Drop for BufferedSink<W> {
    /// The last surviving handle flushes whatever is still buffered; other
    /// handles do nothing, deferring to whichever clone dies last.
    fn drop(&mut self) {
        if Rc::strong_count(&self.shared) == 1 {
            self.shared.borrow_mut().flush_buffer();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    /// Records every physical write's length into a shared log.
    struct CountingWriter {
        writes: Rc<RefCell<Vec<usize>>>,
    }

    impl Write for CountingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.borrow_mut().push(buf.len());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Fails every write after the first `ok_writes` successes.
    struct FailingWriter {
        ok_writes: Cell<usize>,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.ok_writes.get() == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device full"));
            }
            self.ok_writes.set(self.ok_writes.get() - 1);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_full_buffers_flush_at_capacity() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let writer = CountingWriter {
            writes: Rc::clone(&writes),
        };
        let mut sink = BufferedSink::with_capacity(writer, 4);
        for byte in 0..12u8 {
            sink.put(byte);
        }
        // 12 bytes at capacity 4: exactly 3 full-size writes, buffer empty.
        assert_eq!(*writes.borrow(), vec![4, 4, 4]);
        assert_eq!(sink.shared.borrow().buffer.len(), 0);
    }

    #[test]
    fn test_dropping_clone_defers_flush_to_survivor() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let writer = CountingWriter {
            writes: Rc::clone(&writes),
        };
        let mut sink = BufferedSink::with_capacity(writer, 64);
        sink.put_slice(b"abc");

        let clone = sink.clone();
        drop(clone);
        assert!(writes.borrow().is_empty(), "clone drop must not write");

        drop(sink);
        assert_eq!(*writes.borrow(), vec![3], "last handle flushes once");
    }

    #[test]
    fn test_finish_flushes_and_disarms_drop() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        let writer = CountingWriter {
            writes: Rc::clone(&writes),
        };
        let mut sink = BufferedSink::with_capacity(writer, 64);
        sink.put_slice(b"hello");

        let clone = sink.clone();
        clone.finish().expect("clean stream");
        assert_eq!(*writes.borrow(), vec![5]);

        drop(sink);
        assert_eq!(*writes.borrow(), vec![5], "no duplicate flush after finish");
    }

    #[test]
    fn test_write_error_is_sticky_and_reported_by_finish() {
        let writer = FailingWriter {
            ok_writes: Cell::new(1),
        };
        let mut sink = BufferedSink::with_capacity(writer, 2);
        sink.put_slice(b"okfailfail");

        let err = sink.finish().expect_err("swallowed error must surface");
        assert_eq!(err.kind(), io::ErrorKind::Other);
        assert!(err.to_string().contains("device full"));
    }

    #[test]
    fn test_no_write_after_error() {
        let writes = Rc::new(RefCell::new(Vec::new()));
        struct FailThenCount {
            failed: Cell<bool>,
            writes: Rc<RefCell<Vec<usize>>>,
        }
        impl Write for FailThenCount {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                if !self.failed.get() {
                    self.failed.set(true);
                    return Err(io::Error::new(io::ErrorKind::Other, "first write fails"));
                }
                self.writes.borrow_mut().push(buf.len());
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let writer = FailThenCount {
            failed: Cell::new(false),
            writes: Rc::clone(&writes),
        };
        let mut sink = BufferedSink::with_capacity(writer, 2);
        sink.put_slice(b"abcdef");
        drop(sink);
        assert!(
            writes.borrow().is_empty(),
            "writes after the sticky error must be skipped"
        );
    }
}
