//! Strict bencode decoder.
//!
//! Strict where the format is deterministic: integers reject leading zeros,
//! `-0`, empty digit runs, and values outside `i64`; framing rejects
//! truncated input and trailing bytes. Dictionary key order is not verified
//! — keys land in a `BTreeMap`, which normalizes order, and a duplicate key
//! overwrites the earlier value.

use std::collections::BTreeMap;

use super::Entry;

/// Maximum nesting depth for lists and dictionaries.
///
/// The decoder recurses per nesting level, so untrusted input like
/// `llll…` could otherwise exhaust the stack. 128 levels is far beyond any
/// real torrent or resume-data payload.
const MAX_DECODE_DEPTH: usize = 128;

/// A malformed bencode document.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Input ended before the value was complete.
    #[error("truncated input at byte {offset}")]
    Truncated { offset: usize },

    /// A byte that no grammar rule allows at this position.
    #[error("unexpected byte 0x{byte:02x} at offset {offset}")]
    UnexpectedByte { byte: u8, offset: usize },

    /// A non-canonical or out-of-range integer (`i-0e`, `i03e`, `ie`,
    /// or a value outside `i64`).
    #[error("invalid integer at offset {offset}")]
    InvalidInteger { offset: usize },

    /// A byte-string length prefix that is empty or overflows `usize`.
    #[error("invalid string length at offset {offset}")]
    InvalidLength { offset: usize },

    /// A complete value followed by leftover bytes.
    #[error("{count} trailing bytes after value")]
    TrailingBytes { count: usize },

    /// Nesting beyond [`MAX_DECODE_DEPTH`] levels.
    #[error("nesting deeper than {MAX_DECODE_DEPTH} levels")]
    TooDeep,
}

/// Decode a complete bencoded document. Used via [`Entry::from_bytes`].
pub fn decode(input: &[u8]) -> Result<Entry, DecodeError> {
    let mut parser = Parser { input, pos: 0 };
    let entry = parser.value(0)?;
    if parser.pos != input.len() {
        return Err(DecodeError::TrailingBytes {
            count: input.len() - parser.pos,
        });
    }
    Ok(entry)
}

struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.input
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::Truncated { offset: self.pos })
    }

    fn bump(&mut self) -> Result<u8, DecodeError> {
        let byte = self.peek()?;
        self.pos += 1;
        Ok(byte)
    }

    fn value(&mut self, depth: usize) -> Result<Entry, DecodeError> {
        if depth > MAX_DECODE_DEPTH {
            return Err(DecodeError::TooDeep);
        }
        match self.peek()? {
            b'i' => self.integer(),
            b'0'..=b'9' => Ok(Entry::Bytes(self.byte_string()?)),
            b'l' => {
                self.pos += 1;
                let mut items = Vec::new();
                while self.peek()? != b'e' {
                    items.push(self.value(depth + 1)?);
                }
                self.pos += 1;
                Ok(Entry::List(items))
            }
            b'd' => {
                self.pos += 1;
                let mut pairs = BTreeMap::new();
                while self.peek()? != b'e' {
                    let key = self.byte_string()?;
                    let value = self.value(depth + 1)?;
                    pairs.insert(key, value);
                }
                self.pos += 1;
                Ok(Entry::Dict(pairs))
            }
            byte => Err(DecodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            }),
        }
    }

    fn integer(&mut self) -> Result<Entry, DecodeError> {
        let start = self.pos;
        self.pos += 1; // consume 'i'
        let negative = self.peek()? == b'-';
        if negative {
            self.pos += 1;
        }

        let digits_start = self.pos;
        let mut value: i64 = 0;
        while let Ok(byte @ b'0'..=b'9') = self.peek() {
            self.pos += 1;
            value = value
                .checked_mul(10)
                .and_then(|v| {
                    let digit = i64::from(byte - b'0');
                    if negative {
                        v.checked_sub(digit)
                    } else {
                        v.checked_add(digit)
                    }
                })
                .ok_or(DecodeError::InvalidInteger { offset: start })?;
        }

        let digits = &self.input[digits_start..self.pos];
        let canonical = match digits {
            [] => false,
            [b'0'] => !negative, // "i0e" yes, "i-0e" no
            [b'0', ..] => false, // leading zero
            _ => true,
        };
        if !canonical {
            return Err(DecodeError::InvalidInteger { offset: start });
        }

        if self.bump()? != b'e' {
            return Err(DecodeError::InvalidInteger { offset: start });
        }
        Ok(Entry::Int(value))
    }

    fn byte_string(&mut self) -> Result<Vec<u8>, DecodeError> {
        let start = self.pos;
        let mut len: usize = 0;
        let mut saw_digit = false;
        while let Ok(byte @ b'0'..=b'9') = self.peek() {
            self.pos += 1;
            saw_digit = true;
            len = len
                .checked_mul(10)
                .and_then(|l| l.checked_add(usize::from(byte - b'0')))
                .ok_or(DecodeError::InvalidLength { offset: start })?;
        }
        if !saw_digit {
            let byte = self.peek()?;
            return Err(DecodeError::UnexpectedByte {
                byte,
                offset: self.pos,
            });
        }
        if self.bump()? != b':' {
            return Err(DecodeError::InvalidLength { offset: start });
        }
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(DecodeError::Truncated { offset: self.pos })?;
        let bytes = self.input[self.pos..end].to_vec();
        self.pos = end;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalars() {
        assert_eq!(decode(b"i42e"), Ok(Entry::Int(42)));
        assert_eq!(decode(b"i-7e"), Ok(Entry::Int(-7)));
        assert_eq!(decode(b"i0e"), Ok(Entry::Int(0)));
        assert_eq!(decode(b"4:spam"), Ok(Entry::from("spam")));
        assert_eq!(decode(b"0:"), Ok(Entry::from("")));
    }

    #[test]
    fn test_nested() {
        let decoded = decode(b"d1:ai1e1:bli2ei3eee").expect("valid document");
        let Entry::Dict(pairs) = decoded else {
            panic!("expected dict");
        };
        assert_eq!(pairs[&b"a".to_vec()], Entry::Int(1));
        assert_eq!(
            pairs[&b"b".to_vec()],
            Entry::List(vec![Entry::Int(2), Entry::Int(3)])
        );
    }

    #[test]
    fn test_rejects_noncanonical_integers() {
        assert_eq!(
            decode(b"i-0e"),
            Err(DecodeError::InvalidInteger { offset: 0 })
        );
        assert_eq!(
            decode(b"i03e"),
            Err(DecodeError::InvalidInteger { offset: 0 })
        );
        assert_eq!(decode(b"ie"), Err(DecodeError::InvalidInteger { offset: 0 }));
        assert_eq!(
            decode(b"i9223372036854775808e"),
            Err(DecodeError::InvalidInteger { offset: 0 })
        );
    }

    #[test]
    fn test_accepts_i64_extremes() {
        assert_eq!(
            decode(b"i9223372036854775807e"),
            Ok(Entry::Int(i64::MAX))
        );
        assert_eq!(
            decode(b"i-9223372036854775808e"),
            Ok(Entry::Int(i64::MIN))
        );
    }

    #[test]
    fn test_rejects_bad_framing() {
        assert_eq!(decode(b"5:spam"), Err(DecodeError::Truncated { offset: 2 }));
        assert_eq!(decode(b"li1e"), Err(DecodeError::Truncated { offset: 4 }));
        assert_eq!(
            decode(b"i1ei2e"),
            Err(DecodeError::TrailingBytes { count: 3 })
        );
        assert_eq!(decode(b""), Err(DecodeError::Truncated { offset: 0 }));
        assert_eq!(
            decode(b"x"),
            Err(DecodeError::UnexpectedByte {
                byte: b'x',
                offset: 0
            })
        );
    }

    #[test]
    fn test_unsorted_keys_normalized_and_duplicates_overwrite() {
        // Key order is not verified; BTreeMap normalizes it.
        let decoded = decode(b"d1:bi2e1:ai1ee").expect("valid document");
        assert_eq!(decoded.to_vec(), b"d1:ai1e1:bi2ee");

        let decoded = decode(b"d1:ai1e1:ai2ee").expect("valid document");
        assert_eq!(decoded.to_vec(), b"d1:ai2ee");
    }

    #[test]
    fn test_depth_bomb_rejected() {
        let mut bomb = vec![b'l'; 4096];
        bomb.extend(vec![b'e'; 4096]);
        assert_eq!(decode(&bomb), Err(DecodeError::TooDeep));
    }
}
