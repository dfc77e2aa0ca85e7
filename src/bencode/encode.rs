//! Streaming bencode encoder.
//!
//! Encoding is driven one byte at a time through the [`ByteSink`] trait, so
//! the encoder never needs the full serialized form in memory — the sink
//! decides how to batch physical output. [`encode_into`] returns the exact
//! number of bytes it emitted, which the save path checks against the file's
//! final size.

use super::Entry;

/// A destination for encoded bytes, fed one byte at a time.
///
/// The encoder appends at per-byte frequency, so implementations should make
/// [`put`](Self::put) cheap; batching to the real output is the sink's job.
pub trait ByteSink {
    /// Append one byte.
    fn put(&mut self, byte: u8);

    /// Append a run of bytes. The default forwards byte-by-byte.
    fn put_slice(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.put(b);
        }
    }
}

impl ByteSink for Vec<u8> {
    fn put(&mut self, byte: u8) {
        self.push(byte);
    }

    fn put_slice(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Encode `entry` into `sink`, returning the number of bytes emitted.
///
/// Dictionary keys come out in sorted raw-byte order because [`Entry::Dict`]
/// is a `BTreeMap`; no sorting pass happens here.
pub fn encode_into(entry: &Entry, sink: &mut impl ByteSink) -> usize {
    match entry {
        Entry::Int(value) => {
            let digits = value.to_string();
            sink.put(b'i');
            sink.put_slice(digits.as_bytes());
            sink.put(b'e');
            digits.len() + 2
        }
        Entry::Bytes(bytes) => encode_bytes(bytes, sink),
        Entry::List(items) => {
            sink.put(b'l');
            let mut count = 2;
            for item in items {
                count += encode_into(item, sink);
            }
            sink.put(b'e');
            count
        }
        Entry::Dict(pairs) => {
            sink.put(b'd');
            let mut count = 2;
            for (key, value) in pairs {
                count += encode_bytes(key, sink);
                count += encode_into(value, sink);
            }
            sink.put(b'e');
            count
        }
    }
}

fn encode_bytes(bytes: &[u8], sink: &mut impl ByteSink) -> usize {
    let len = bytes.len().to_string();
    sink.put_slice(len.as_bytes());
    sink.put(b':');
    sink.put_slice(bytes);
    len.len() + 1 + bytes.len()
}
