//! Bencode values and their streaming encoder/decoder.
//!
//! Bencode is the length-prefixed serialization format used for torrent
//! metadata and resume data. It is deterministic: dictionary keys are
//! ordered by raw byte value, so every value has exactly one encoding.
//!
//! # Format
//!
//! - integer: `i` + ASCII decimal digits + `e` — no leading zeros except
//!   `0` itself, `-` allowed
//! - byte string: decimal length + `:` + raw bytes
//! - list: `l` + concatenated encoded items + `e`
//! - dictionary: `d` + concatenated (key, value) pairs + `e`, keys sorted
//!   by raw byte value
//!
//! # Architecture
//!
//! [`Entry`] is the recursive value type. [`encode_into`] streams an entry
//! one byte at a time into any [`ByteSink`] and returns the exact number
//! of bytes it emitted; [`Entry::from_bytes`] is the strict decoder.
//! Dictionaries live in a `BTreeMap<Vec<u8>, Entry>`, so the sorted-key
//! rule holds by construction rather than by a sorting pass.

pub mod decode;
pub mod encode;

use std::collections::BTreeMap;

pub use decode::DecodeError;
pub use encode::{encode_into, ByteSink};

/// A bencode value: integer, byte string, list, or byte-sorted dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Entry {
    /// `i…e` — signed 64-bit integer.
    Int(i64),
    /// `<len>:…` — raw byte string, not necessarily UTF-8.
    Bytes(Vec<u8>),
    /// `l…e` — ordered list of entries.
    List(Vec<Entry>),
    /// `d…e` — dictionary keyed by raw byte strings.
    Dict(BTreeMap<Vec<u8>, Entry>),
}

impl Entry {
    /// Encode into a fresh buffer.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encode::encode_into(self, &mut out);
        out
    }

    /// Decode a complete bencoded document.
    ///
    /// The input must hold exactly one value; truncated input and trailing
    /// bytes are errors. See [`DecodeError`] for the failure cases.
    pub fn from_bytes(input: &[u8]) -> Result<Self, DecodeError> {
        decode::decode(input)
    }
}

impl From<i64> for Entry {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for Entry {
    fn from(value: &str) -> Self {
        Self::Bytes(value.as_bytes().to_vec())
    }
}

impl From<String> for Entry {
    fn from(value: String) -> Self {
        Self::Bytes(value.into_bytes())
    }
}

impl From<&[u8]> for Entry {
    fn from(value: &[u8]) -> Self {
        Self::Bytes(value.to_vec())
    }
}

impl From<Vec<u8>> for Entry {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<Vec<Entry>> for Entry {
    fn from(value: Vec<Entry>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<Vec<u8>, Entry>> for Entry {
    fn from(value: BTreeMap<Vec<u8>, Entry>) -> Self {
        Self::Dict(value)
    }
}
