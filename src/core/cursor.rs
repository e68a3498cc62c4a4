//! Decode Cursor: offset + panjang buffer, semua read di-bounds-check
//!
//! Tidak ada pointer arithmetic: setiap akses lewat slice yang
//! sudah divalidasi terhadap sisa buffer.

use crate::config::Limits;
use crate::error::{Limit, Result, WireError};
use crate::protocol::Primitive;

/// Cursor baca sekuensial di atas wire buffer (zero-copy)
#[derive(Debug, Clone)]
pub struct DecodeCursor<'a> {
    buffer: &'a [u8],
    read_pos: usize,
    limits: Limits,
    // Element kumulatif dari semua array yang sudah dibaca
    elements: usize,
}

impl<'a> DecodeCursor<'a> {
    /// Cursor dengan limits default
    #[inline]
    pub fn new(buffer: &'a [u8]) -> Self {
        Self::with_limits(buffer, Limits::default())
    }

    #[inline]
    pub fn with_limits(buffer: &'a [u8], limits: Limits) -> Self {
        Self {
            buffer,
            read_pos: 0,
            limits,
            elements: 0,
        }
    }

    /// Cursor yang mulai dari `offset` (API berbasis offset)
    #[inline]
    pub fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self::new(buffer).starting_at(offset)
    }

    #[inline]
    pub fn starting_at(mut self, offset: usize) -> Self {
        self.read_pos = offset;
        self
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.read_pos
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.read_pos)
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    #[inline(always)]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Sisa buffer tanpa mengonsumsi
    #[inline]
    pub fn rest(&self) -> &'a [u8] {
        self.buffer.get(self.read_pos..).unwrap_or(&[])
    }

    /// Pastikan `n` bytes tersedia
    #[inline(always)]
    pub fn ensure(&self, n: usize) -> Result<()> {
        let available = self.remaining();
        if n > available || self.read_pos > self.buffer.len() {
            return Err(WireError::TruncatedBuffer {
                offset: self.read_pos,
                needed: n,
                available,
            });
        }
        Ok(())
    }

    /// Ambil `n` bytes berikutnya sebagai view ke buffer asli
    #[inline]
    pub fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        self.ensure(n)?;
        let start = self.read_pos;
        self.read_pos += n;
        Ok(&self.buffer[start..self.read_pos])
    }

    #[inline]
    pub fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    #[inline(always)]
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        Ok(T::read_le(self.take(T::WIDTH)?))
    }

    /// Length prefix string (u32), divalidasi terhadap `max_string_len`
    #[inline]
    pub fn read_string_len(&mut self) -> Result<usize> {
        let len = self.read::<u32>()? as usize;
        if len > self.limits.max_string_len {
            return Err(WireError::limit(
                Limit::StringLength,
                self.limits.max_string_len,
                len,
            ));
        }
        Ok(len)
    }

    /// Count prefix array (u32), divalidasi terhadap limit per-array dan kumulatif
    #[inline]
    pub fn read_count(&mut self) -> Result<usize> {
        let count = self.read::<u32>()? as usize;
        if count > self.limits.max_array_len {
            return Err(WireError::limit(
                Limit::ArrayCount,
                self.limits.max_array_len,
                count,
            ));
        }
        let total = self.elements.saturating_add(count);
        if total > self.limits.max_total_elements {
            return Err(WireError::limit(
                Limit::TotalElements,
                self.limits.max_total_elements,
                total,
            ));
        }
        self.elements = total;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_sequential_reads() {
        let buf = [0x2A, 0xE8, 0x03, 0xFF];
        let mut c = DecodeCursor::new(&buf);
        assert_eq!(c.read::<u8>().unwrap(), 42);
        assert_eq!(c.read::<u16>().unwrap(), 1000);
        assert_eq!(c.position(), 3);
        assert_eq!(c.rest(), &[0xFF]);
        assert_eq!(c.take(1).unwrap(), &[0xFF]);
        assert!(c.is_empty());
    }

    #[test]
    fn test_truncated_context() {
        let buf = [1u8, 2];
        let mut c = DecodeCursor::new(&buf);
        c.read::<u8>().unwrap();
        match c.read::<u32>().unwrap_err() {
            WireError::TruncatedBuffer {
                offset,
                needed,
                available,
            } => {
                assert_eq!(offset, 1);
                assert_eq!(needed, 4);
                assert_eq!(available, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Gagal read tidak menggeser posisi
        assert_eq!(c.position(), 1);
    }

    #[test]
    fn test_string_len_limit() {
        let buf = 17u32.to_le_bytes();
        let mut c = DecodeCursor::with_limits(&buf, Limits::default().with_max_string_len(16));
        assert_eq!(c.read_string_len().unwrap_err().kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_total_elements_budget() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&3u32.to_le_bytes());
        buf.extend_from_slice(&3u32.to_le_bytes());
        let limits = Limits::default().with_max_total_elements(5);
        let mut c = DecodeCursor::with_limits(&buf, limits);
        assert_eq!(c.read_count().unwrap(), 3);
        assert_eq!(c.read_count().unwrap_err().kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_offset_past_end() {
        let buf = [0u8; 2];
        let c = DecodeCursor::at(&buf, 10);
        assert_eq!(c.remaining(), 0);
        assert!(c.rest().is_empty());
        assert_eq!(c.ensure(1).unwrap_err().kind(), ErrorKind::TruncatedBuffer);
    }
}
