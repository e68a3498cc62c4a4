//! String Codec: `u32` length + raw bytes
//!
//! String adalah opaque byte sequence (UTF-8 hanya konvensi),
//! tanpa terminator dan tanpa transformasi encoding.

use crate::config::Limits;
use crate::core::{DecodeCursor, Storage, WireWriter};
use crate::error::{Limit, Result, WireError};

/// Ukuran encoded string dengan panjang `len`
#[inline(always)]
pub const fn string_size(len: usize) -> usize {
    4 + len
}

#[inline]
pub(crate) fn write_string(w: &mut WireWriter<'_>, bytes: &[u8]) -> Result<()> {
    w.put_len(bytes.len(), Limit::StringLength)?;
    w.put_bytes(bytes)
}

/// Baca string sebagai view ke buffer
#[inline]
pub(crate) fn read_string<'a>(c: &mut DecodeCursor<'a>) -> Result<&'a [u8]> {
    let len = c.read_string_len()?;
    c.take(len)
}

/// Baca string dan validasi UTF-8 (untuk tipe `String` di reference types)
#[inline]
pub(crate) fn read_utf8(c: &mut DecodeCursor<'_>) -> Result<String> {
    let offset = c.position();
    let bytes = read_string(c)?;
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|_| WireError::InvalidUtf8 { offset })
}

/// Encode string pada `offset`, return offset baru
pub fn encode_string(s: &[u8], buf: &mut [u8], offset: usize) -> Result<usize> {
    let mut w = WireWriter::at(buf, offset);
    write_string(&mut w, s)?;
    Ok(w.position())
}

/// Decode string dari `offset` dengan storage strategy pilihan caller
pub fn decode_string<'a, S: Storage<'a>>(
    buf: &'a [u8],
    offset: usize,
    limits: Limits,
    storage: &mut S,
) -> Result<(S::Bytes, usize)> {
    let mut c = DecodeCursor::with_limits(buf, limits).starting_at(offset);
    let bytes = storage.store(read_string(&mut c)?)?;
    Ok((bytes, c.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DecodeArena, Owned, ZeroCopy};
    use crate::error::ErrorKind;

    #[test]
    fn test_layout() {
        let mut buf = [0u8; 9];
        let next = encode_string(b"hello", &mut buf, 0).unwrap();
        assert_eq!(next, string_size(5));
        assert_eq!(&buf, b"\x05\x00\x00\x00hello");
    }

    #[test]
    fn test_empty_string_keeps_prefix() {
        let mut buf = [0xFFu8; 4];
        assert_eq!(encode_string(b"", &mut buf, 0).unwrap(), 4);
        assert_eq!(buf, [0, 0, 0, 0]);
        let (s, next) = decode_string(&buf, 0, Limits::default(), &mut Owned).unwrap();
        assert!(s.is_empty());
        assert_eq!(next, 4);
    }

    #[test]
    fn test_strategies_agree() {
        let mut buf = vec![0u8; 2 + string_size(3)];
        encode_string(b"abc", &mut buf, 2).unwrap();

        let (view, next) = decode_string(&buf, 2, Limits::default(), &mut ZeroCopy).unwrap();
        assert_eq!(view, b"abc");
        assert_eq!(next, buf.len());

        let arena = DecodeArena::new(8);
        let (copied, _) = decode_string(&buf, 2, Limits::default(), &mut &arena).unwrap();
        assert_eq!(copied.as_slice(), b"abc");
        assert_eq!(arena.used(), 3);
    }

    #[test]
    fn test_truncated_payload() {
        let buf = b"\x05\x00\x00\x00hel";
        let err = decode_string(buf, 0, Limits::default(), &mut ZeroCopy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);

        let err = decode_string(&buf[..2], 0, Limits::default(), &mut ZeroCopy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);
    }

    #[test]
    fn test_length_over_limit() {
        let buf = b"\x05\x00\x00\x00hello";
        let limits = Limits::default().with_max_string_len(4);
        let err = decode_string(buf, 0, limits, &mut ZeroCopy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_invalid_utf8_reports_offset() {
        let buf = b"\x02\x00\x00\x00\xC3\x28";
        let mut c = DecodeCursor::new(buf);
        match read_utf8(&mut c).unwrap_err() {
            WireError::InvalidUtf8 { offset } => assert_eq!(offset, 0),
            other => panic!("unexpected error: {other}"),
        }
    }
}
