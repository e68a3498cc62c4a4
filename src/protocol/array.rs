//! Array Codec: `u32` count + count × encode(T)
//!
//! Array primitif bisa di-encode/decode sebagai satu memory copy
//! (bulk) bila layout host sama dengan layout wire. Output bulk dan
//! per-element selalu byte-identical.

use super::primitive::{Primitive, PrimitiveKind};
use super::value::{Backing, Value};
use crate::config::{ArrayMode, Limits};
use crate::core::{DecodeCursor, Storage, WireWriter};
use crate::error::{Limit, Result, WireError};

/// Array primitif yang disimpan sebagai wire bytes (little-endian)
///
/// Dengan storage `&[u8]` ini adalah view zero-copy ke buffer asli.
#[derive(Debug, Clone)]
pub struct PrimitiveArray<B> {
    kind: PrimitiveKind,
    len: usize,
    bytes: B,
}

impl<B: AsRef<[u8]>> PrimitiveArray<B> {
    /// Bungkus wire bytes; panjang bytes harus `len * kind.width()`
    pub(crate) fn from_wire(kind: PrimitiveKind, len: usize, bytes: B) -> Self {
        debug_assert_eq!(bytes.as_ref().len(), len * kind.width());
        Self { kind, len, bytes }
    }

    #[inline(always)]
    pub fn kind(&self) -> PrimitiveKind {
        self.kind
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Wire bytes tanpa count prefix
    #[inline(always)]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_ref()
    }

    /// Element ke-`index`, `None` jika tipe tidak cocok atau di luar range
    #[inline]
    pub fn get<T: Primitive>(&self, index: usize) -> Option<T> {
        if T::KIND != self.kind || index >= self.len {
            return None;
        }
        let start = index * T::WIDTH;
        Some(T::read_le(&self.as_bytes()[start..start + T::WIDTH]))
    }

    /// Iterasi element; kosong jika `T` tidak cocok dengan kind
    pub fn iter<T: Primitive>(&self) -> impl Iterator<Item = T> + '_ {
        let bytes = if T::KIND == self.kind {
            self.as_bytes()
        } else {
            &[]
        };
        bytes.chunks_exact(T::WIDTH).map(T::read_le)
    }

    /// Copy ke `Vec<T>` (bulk bila memungkinkan)
    pub fn to_vec<T: Primitive>(&self) -> Option<Vec<T>> {
        if T::KIND != self.kind {
            return None;
        }
        Some(decode_slice(self.as_bytes(), ArrayMode::Bulk))
    }

    /// Element sebagai `Value` primitif
    pub fn value_at<X: Backing>(&self, index: usize) -> Option<Value<X>> {
        if index >= self.len {
            return None;
        }
        let width = self.kind.width();
        let raw = &self.as_bytes()[index * width..(index + 1) * width];
        Some(primitive_value(self.kind, raw))
    }

    pub fn to_owned_array(&self) -> PrimitiveArray<Box<[u8]>> {
        PrimitiveArray::from_wire(self.kind, self.len, Box::from(self.as_bytes()))
    }

    /// Ukuran encoded termasuk count prefix
    #[inline(always)]
    pub fn encoded_size(&self) -> usize {
        4 + self.as_bytes().len()
    }

    pub(crate) fn write(&self, w: &mut WireWriter<'_>) -> Result<()> {
        w.put_len(self.len, Limit::ArrayCount)?;
        if self.kind == PrimitiveKind::Bool {
            // View hasil decode bisa berisi byte non-canonical; encode selalu 0/1
            let out = w.reserve(self.len)?;
            for (dst, src) in out.iter_mut().zip(self.as_bytes()) {
                *dst = (*src != 0) as u8;
            }
            return Ok(());
        }
        w.put_bytes(self.as_bytes())
    }
}

impl PrimitiveArray<Box<[u8]>> {
    /// Bangun array owned dari slice bertipe
    pub fn from_slice<T: Primitive>(items: &[T]) -> Self {
        Self::from_slice_with(items, ArrayMode::Bulk)
    }

    pub fn from_slice_with<T: Primitive>(items: &[T], mode: ArrayMode) -> Self {
        let bytes = match (mode, T::bulk_bytes(items)) {
            (ArrayMode::Bulk, Some(bytes)) => Box::from(bytes),
            _ => {
                let mut bytes = vec![0u8; items.len() * T::WIDTH];
                for (chunk, item) in bytes.chunks_exact_mut(T::WIDTH).zip(items) {
                    item.write_le(chunk);
                }
                bytes.into_boxed_slice()
            }
        };
        Self::from_wire(T::KIND, items.len(), bytes)
    }
}

impl<A: AsRef<[u8]>, B: AsRef<[u8]>> PartialEq<PrimitiveArray<B>> for PrimitiveArray<A> {
    fn eq(&self, other: &PrimitiveArray<B>) -> bool {
        if self.kind != other.kind || self.len != other.len {
            return false;
        }
        if self.kind == PrimitiveKind::Bool {
            return self
                .as_bytes()
                .iter()
                .zip(other.as_bytes())
                .all(|(a, b)| (*a != 0) == (*b != 0));
        }
        // Perbandingan bytes = perbandingan float bit-exact
        self.as_bytes() == other.as_bytes()
    }
}

pub(crate) fn primitive_value<X: Backing>(kind: PrimitiveKind, raw: &[u8]) -> Value<X> {
    match kind {
        PrimitiveKind::U8 => Value::U8(u8::read_le(raw)),
        PrimitiveKind::U16 => Value::U16(u16::read_le(raw)),
        PrimitiveKind::U32 => Value::U32(u32::read_le(raw)),
        PrimitiveKind::U64 => Value::U64(u64::read_le(raw)),
        PrimitiveKind::I8 => Value::I8(i8::read_le(raw)),
        PrimitiveKind::I16 => Value::I16(i16::read_le(raw)),
        PrimitiveKind::I32 => Value::I32(i32::read_le(raw)),
        PrimitiveKind::I64 => Value::I64(i64::read_le(raw)),
        PrimitiveKind::F32 => Value::F32(f32::read_le(raw)),
        PrimitiveKind::F64 => Value::F64(f64::read_le(raw)),
        PrimitiveKind::Bool => Value::Bool(bool::read_le(raw)),
    }
}

/// Decode wire bytes ke Vec bertipe; `bytes.len()` kelipatan `T::WIDTH`
fn decode_slice<T: Primitive>(bytes: &[u8], mode: ArrayMode) -> Vec<T> {
    if mode == ArrayMode::Bulk {
        if let Some(items) = T::bulk_decode(bytes) {
            return items;
        }
    }
    bytes.chunks_exact(T::WIDTH).map(T::read_le).collect()
}

/// Baca count + byte region array primitif, sudah di-bounds-check
#[inline]
pub(crate) fn read_primitive_region<'a>(
    c: &mut DecodeCursor<'a>,
    kind: PrimitiveKind,
) -> Result<(usize, &'a [u8])> {
    let count = c.read_count()?;
    let byte_len = count
        .checked_mul(kind.width())
        .ok_or_else(|| WireError::limit(Limit::ArrayCount, c.limits().max_array_len, count))?;
    Ok((count, c.take(byte_len)?))
}

/// Ukuran encoded array primitif bertipe
#[inline(always)]
pub const fn primitive_array_size<T: Primitive>(len: usize) -> usize {
    4 + len * T::WIDTH
}

#[inline]
pub(crate) fn write_primitive_slice<T: Primitive>(
    w: &mut WireWriter<'_>,
    items: &[T],
    mode: ArrayMode,
) -> Result<()> {
    w.put_len(items.len(), Limit::ArrayCount)?;
    if mode == ArrayMode::Bulk {
        if let Some(bytes) = T::bulk_bytes(items) {
            return w.put_bytes(bytes);
        }
    }
    for item in items {
        w.put(*item)?;
    }
    Ok(())
}

#[inline]
pub(crate) fn read_primitive_vec<T: Primitive>(
    c: &mut DecodeCursor<'_>,
    mode: ArrayMode,
) -> Result<Vec<T>> {
    let (_, bytes) = read_primitive_region(c, T::KIND)?;
    Ok(decode_slice(bytes, mode))
}

/// Array dengan element variable-length: loop per element
pub(crate) fn write_elements<T>(
    w: &mut WireWriter<'_>,
    items: &[T],
    mut write_one: impl FnMut(&mut WireWriter<'_>, &T) -> Result<()>,
) -> Result<()> {
    w.put_len(items.len(), Limit::ArrayCount)?;
    for item in items {
        write_one(w, item)?;
    }
    Ok(())
}

pub(crate) fn read_elements<'a, T>(
    c: &mut DecodeCursor<'a>,
    mut read_one: impl FnMut(&mut DecodeCursor<'a>) -> Result<T>,
) -> Result<Vec<T>> {
    let count = c.read_count()?;
    // Kapasitas dibatasi sisa buffer: count palsu tidak memicu alokasi besar
    let mut items = Vec::with_capacity(count.min(c.remaining()));
    for _ in 0..count {
        items.push(read_one(c)?);
    }
    Ok(items)
}

/// Encode array primitif pada `offset`, return offset baru
pub fn encode_primitive_array<T: Primitive>(
    items: &[T],
    buf: &mut [u8],
    offset: usize,
    mode: ArrayMode,
) -> Result<usize> {
    let mut w = WireWriter::at(buf, offset);
    write_primitive_slice(&mut w, items, mode)?;
    Ok(w.position())
}

/// Decode array primitif dari `offset`, return (items, offset baru)
pub fn decode_primitive_array<T: Primitive>(
    buf: &[u8],
    offset: usize,
    limits: Limits,
    mode: ArrayMode,
) -> Result<(Vec<T>, usize)> {
    let mut c = DecodeCursor::with_limits(buf, limits).starting_at(offset);
    let items = read_primitive_vec(&mut c, mode)?;
    Ok((items, c.position()))
}

/// Decode array primitif sebagai view zero-copy
pub fn decode_primitive_view<T: Primitive>(
    buf: &[u8],
    offset: usize,
    limits: Limits,
) -> Result<(PrimitiveArray<&[u8]>, usize)> {
    let mut c = DecodeCursor::with_limits(buf, limits).starting_at(offset);
    let (count, bytes) = read_primitive_region(&mut c, T::KIND)?;
    Ok((PrimitiveArray::from_wire(T::KIND, count, bytes), c.position()))
}

/// Decode array primitif ke storage pilihan caller
pub(crate) fn read_primitive_array<'a, S: Storage<'a>>(
    c: &mut DecodeCursor<'a>,
    kind: PrimitiveKind,
    storage: &mut S,
) -> Result<PrimitiveArray<S::Bytes>> {
    let (count, bytes) = read_primitive_region(c, kind)?;
    Ok(PrimitiveArray::from_wire(kind, count, storage.store(bytes)?))
}
