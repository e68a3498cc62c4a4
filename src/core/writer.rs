//! Wire Writer: encode langsung ke buffer yang sudah dialokasikan
//!
//! Buffer diukur sekali oleh size calculator, lalu writer menulis
//! sekuensial tanpa realokasi.

use crate::error::{Limit, Result, WireError};
use crate::protocol::Primitive;

/// Writer sekuensial di atas buffer milik caller
#[derive(Debug)]
pub struct WireWriter<'a> {
    buffer: &'a mut [u8],
    write_pos: usize,
}

impl<'a> WireWriter<'a> {
    #[inline]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self::at(buffer, 0)
    }

    /// Writer yang mulai dari `offset`
    #[inline]
    pub fn at(buffer: &'a mut [u8], offset: usize) -> Self {
        Self {
            buffer,
            write_pos: offset,
        }
    }

    #[inline(always)]
    pub fn position(&self) -> usize {
        self.write_pos
    }

    #[inline(always)]
    pub fn available(&self) -> usize {
        self.buffer.len().saturating_sub(self.write_pos)
    }

    /// Reserve `n` bytes dan return region-nya untuk ditulis di offset tetap
    #[inline]
    pub fn reserve(&mut self, n: usize) -> Result<&mut [u8]> {
        let available = self.available();
        if n > available || self.write_pos > self.buffer.len() {
            return Err(WireError::BufferTooSmall {
                offset: self.write_pos,
                needed: n,
                available,
            });
        }
        let start = self.write_pos;
        self.write_pos += n;
        Ok(&mut self.buffer[start..self.write_pos])
    }

    #[inline(always)]
    pub fn put<T: Primitive>(&mut self, value: T) -> Result<()> {
        value.write_le(self.reserve(T::WIDTH)?);
        Ok(())
    }

    #[inline]
    pub fn put_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.reserve(bytes.len())?.copy_from_slice(bytes);
        Ok(())
    }

    /// Length/count prefix u32
    #[inline]
    pub fn put_len(&mut self, len: usize, what: Limit) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| WireError::limit(what, u32::MAX as usize, len))?;
        self.put(len)
    }

    /// Bytes yang sudah ditulis sejak offset 0
    #[inline]
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.write_pos.min(self.buffer.len())]
    }
}
