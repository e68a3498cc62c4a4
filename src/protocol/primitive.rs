//! Primitive Codec: fixed-width integer, float, bool
//!
//! Layout:
//! - uN/iN: N/8 bytes little-endian, two's complement untuk signed
//! - f32/f64: bit pattern di-reinterpret sebagai u32/u64, lalu sama seperti di atas
//! - bool: 1 byte, encode selalu 0/1, decode lenient (nonzero = true)

use std::fmt;

use zerocopy::IntoBytes;

use super::value::{Backing, Value};
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;

/// Tipe primitif yang dikenal wire format
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    Bool,
}

impl PrimitiveKind {
    /// Lebar di wire dalam bytes
    #[inline(always)]
    pub const fn width(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::F32 => 4,
            Self::U64 | Self::I64 | Self::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Tipe Rust yang punya representasi fixed-width di wire
pub trait Primitive: Copy + sealed::Sealed + 'static {
    const KIND: PrimitiveKind;
    const WIDTH: usize;

    /// Tulis tepat `WIDTH` bytes little-endian ke `out`
    fn write_le(self, out: &mut [u8]);

    /// Baca dari tepat `WIDTH` bytes little-endian
    fn read_le(bytes: &[u8]) -> Self;

    /// Backing storage sebagai wire bytes, jika layout host == layout wire
    fn bulk_bytes(items: &[Self]) -> Option<&[u8]>;

    /// Kebalikan dari `bulk_bytes`: satu memory copy ke Vec baru
    fn bulk_decode(bytes: &[u8]) -> Option<Vec<Self>>;

    fn into_value<B: Backing>(self) -> Value<B>;

    fn from_value<B: Backing>(value: &Value<B>) -> Option<Self>;
}

macro_rules! impl_int_primitive {
    ($($t:ty => $kind:ident),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Primitive for $t {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const WIDTH: usize = std::mem::size_of::<$t>();

            #[inline(always)]
            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            #[inline(always)]
            fn read_le(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$t>()];
                raw.copy_from_slice(bytes);
                <$t>::from_le_bytes(raw)
            }

            #[inline]
            fn bulk_bytes(items: &[Self]) -> Option<&[u8]> {
                cfg!(target_endian = "little").then(|| items.as_bytes())
            }

            #[inline]
            fn bulk_decode(bytes: &[u8]) -> Option<Vec<Self>> {
                if cfg!(target_endian = "big") {
                    return None;
                }
                let mut items = vec![<$t>::default(); bytes.len() / Self::WIDTH];
                items.as_mut_slice().as_mut_bytes().copy_from_slice(bytes);
                Some(items)
            }

            #[inline(always)]
            fn into_value<B: Backing>(self) -> Value<B> {
                Value::$kind(self)
            }

            #[inline(always)]
            fn from_value<B: Backing>(value: &Value<B>) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    )*};
}

macro_rules! impl_float_primitive {
    ($($t:ty => $kind:ident as $bits:ty),* $(,)?) => {$(
        impl sealed::Sealed for $t {}

        impl Primitive for $t {
            const KIND: PrimitiveKind = PrimitiveKind::$kind;
            const WIDTH: usize = std::mem::size_of::<$t>();

            // Bit-cast, bukan konversi numerik: NaN payload dan -0.0 tetap utuh
            #[inline(always)]
            fn write_le(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_bits().to_le_bytes());
            }

            #[inline(always)]
            fn read_le(bytes: &[u8]) -> Self {
                <$t>::from_bits(<$bits as Primitive>::read_le(bytes))
            }

            #[inline]
            fn bulk_bytes(items: &[Self]) -> Option<&[u8]> {
                cfg!(target_endian = "little").then(|| items.as_bytes())
            }

            #[inline]
            fn bulk_decode(bytes: &[u8]) -> Option<Vec<Self>> {
                if cfg!(target_endian = "big") {
                    return None;
                }
                let mut items = vec![0.0 as $t; bytes.len() / Self::WIDTH];
                items.as_mut_slice().as_mut_bytes().copy_from_slice(bytes);
                Some(items)
            }

            #[inline(always)]
            fn into_value<B: Backing>(self) -> Value<B> {
                Value::$kind(self)
            }

            #[inline(always)]
            fn from_value<B: Backing>(value: &Value<B>) -> Option<Self> {
                match value {
                    Value::$kind(v) => Some(*v),
                    _ => None,
                }
            }
        }
    )*};
}

impl_int_primitive! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
}

impl_float_primitive! {
    f32 => F32 as u32,
    f64 => F64 as u64,
}

impl sealed::Sealed for bool {}

impl Primitive for bool {
    const KIND: PrimitiveKind = PrimitiveKind::Bool;
    const WIDTH: usize = 1;

    #[inline(always)]
    fn write_le(self, out: &mut [u8]) {
        out[0] = self as u8;
    }

    // Lenient: byte nonzero apa pun dianggap true
    #[inline(always)]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    #[inline]
    fn bulk_bytes(items: &[Self]) -> Option<&[u8]> {
        Some(items.as_bytes())
    }

    // Tidak ada bulk decode: byte non-canonical harus dinormalisasi per element
    #[inline]
    fn bulk_decode(_bytes: &[u8]) -> Option<Vec<Self>> {
        None
    }

    #[inline(always)]
    fn into_value<B: Backing>(self) -> Value<B> {
        Value::Bool(self)
    }

    #[inline(always)]
    fn from_value<B: Backing>(value: &Value<B>) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// Encode satu primitive pada `offset`, return offset baru
#[inline]
pub fn encode_primitive<T: Primitive>(value: T, buf: &mut [u8], offset: usize) -> Result<usize> {
    let mut w = WireWriter::at(buf, offset);
    w.put(value)?;
    Ok(w.position())
}

/// Decode satu primitive dari `offset`, return (value, offset baru)
#[inline]
pub fn decode_primitive<T: Primitive>(buf: &[u8], offset: usize) -> Result<(T, usize)> {
    let mut c = DecodeCursor::at(buf, offset);
    let value = c.read::<T>()?;
    Ok((value, c.position()))
}
