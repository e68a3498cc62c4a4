//! Optional Codec: presence byte + payload
//!
//! `0` = absent (tanpa payload), `1` = present diikuti encode(T).
//! Decode lenient seperti bool: byte nonzero apa pun berarti present.

use super::primitive::Primitive;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;

pub const ABSENT: u8 = 0;
pub const PRESENT: u8 = 1;

/// Ukuran encoded optional dengan ukuran payload `inner` (jika present)
#[inline(always)]
pub const fn optional_size(inner: Option<usize>) -> usize {
    match inner {
        Some(size) => 1 + size,
        None => 1,
    }
}

#[inline]
pub(crate) fn write_optional<T: ?Sized>(
    w: &mut WireWriter<'_>,
    value: Option<&T>,
    write_inner: impl FnOnce(&mut WireWriter<'_>, &T) -> Result<()>,
) -> Result<()> {
    match value {
        Some(inner) => {
            w.put(PRESENT)?;
            write_inner(w, inner)
        }
        None => w.put(ABSENT),
    }
}

#[inline]
pub(crate) fn read_optional<'a, T>(
    c: &mut DecodeCursor<'a>,
    read_inner: impl FnOnce(&mut DecodeCursor<'a>) -> Result<T>,
) -> Result<Option<T>> {
    if c.read::<bool>()? {
        read_inner(c).map(Some)
    } else {
        Ok(None)
    }
}

/// Encode optional primitif pada `offset`, return offset baru
pub fn encode_optional<T: Primitive>(
    value: Option<T>,
    buf: &mut [u8],
    offset: usize,
) -> Result<usize> {
    let mut w = WireWriter::at(buf, offset);
    write_optional(&mut w, value.as_ref(), |w, v| w.put(*v))?;
    Ok(w.position())
}

/// Decode optional primitif dari `offset`, return (value, offset baru)
pub fn decode_optional<T: Primitive>(buf: &[u8], offset: usize) -> Result<(Option<T>, usize)> {
    let mut c = DecodeCursor::at(buf, offset);
    let value = read_optional(&mut c, |c| c.read::<T>())?;
    Ok((value, c.position()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_absent_is_single_zero_byte() {
        let mut buf = [0xFFu8; 1];
        assert_eq!(encode_optional::<u64>(None, &mut buf, 0).unwrap(), 1);
        assert_eq!(buf, [ABSENT]);
        assert_eq!(decode_optional::<u64>(&buf, 0).unwrap(), (None, 1));
    }

    #[test]
    fn test_present_layout() {
        let mut buf = [0u8; 5];
        let next = encode_optional(Some(7u32), &mut buf, 0).unwrap();
        assert_eq!(next, optional_size(Some(4)));
        assert_eq!(buf, [PRESENT, 7, 0, 0, 0]);
        assert_eq!(decode_optional::<u32>(&buf, 0).unwrap(), (Some(7), 5));
    }

    #[test]
    fn test_nonzero_presence_is_present() {
        let buf = [0x05u8, 0x2A];
        assert_eq!(decode_optional::<u8>(&buf, 0).unwrap(), (Some(42), 2));
    }

    #[test]
    fn test_present_without_payload() {
        let err = decode_optional::<u16>(&[PRESENT, 0x01], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);
        let err = decode_optional::<u16>(&[], 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedBuffer);
    }
}
