//! In-memory Value untuk sebuah Schema
//!
//! `Value<B>` generic atas backing `B`, yang menentukan di mana bytes dan
//! node anak (field struct, element array, payload optional) disimpan:
//! - `Value<&'a [u8]>`: zero-copy view, node anak di heap
//! - `Value<ArenaBytes<'a>>`: bytes dan seluruh node anak di `DecodeArena`
//! - `Value<Box<[u8]>>`: owned, setiap field punya allocation sendiri
//!
//! Perbandingan antar value bersifat field-for-field dan float dibandingkan
//! bit-exact, sehingga value dari strategi decode berbeda bisa dibandingkan.

use std::fmt;
use std::ops::Deref;

use super::array::PrimitiveArray;
use super::primitive::{Primitive, PrimitiveKind};
use crate::core::ArenaBytes;

/// Value yang seluruh datanya owned
pub type OwnedValue = Value<Box<[u8]>>;

/// Value yang meminjam bytes dari wire buffer
pub type BorrowedValue<'a> = Value<&'a [u8]>;

/// Value yang seluruhnya tinggal di arena
pub type ArenaValue<'arena> = Value<ArenaBytes<'arena>>;

/// Backing storage sebuah `Value`: bytes plus container untuk node anak
pub trait Backing: AsRef<[u8]> + Sized {
    /// Field struct atau element array
    type Seq: Deref<Target = [Value<Self>]> + Clone + fmt::Debug;
    /// Payload optional yang present
    type Slot: Deref<Target = Value<Self>> + Clone + fmt::Debug;
}

impl<'a> Backing for &'a [u8] {
    type Seq = Vec<Value<Self>>;
    type Slot = Box<Value<Self>>;
}

impl Backing for Box<[u8]> {
    type Seq = Vec<Value<Self>>;
    type Slot = Box<Value<Self>>;
}

impl<'arena> Backing for ArenaBytes<'arena> {
    type Seq = &'arena [Value<Self>];
    type Slot = &'arena Value<Self>;
}

pub enum Value<B: Backing> {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Str(B),
    Array(ArrayValue<B>),
    /// Field dalam urutan deklarasi schema
    Struct(B::Seq),
    Optional(Option<B::Slot>),
}

pub enum ArrayValue<B: Backing> {
    /// Element fixed-width, disimpan sebagai wire bytes
    Primitive(PrimitiveArray<B>),
    /// Element variable-length (string, struct, array, optional)
    Elements(B::Seq),
}

impl<B: Backing + Clone> Clone for Value<B> {
    fn clone(&self) -> Self {
        match self {
            Value::U8(v) => Value::U8(*v),
            Value::U16(v) => Value::U16(*v),
            Value::U32(v) => Value::U32(*v),
            Value::U64(v) => Value::U64(*v),
            Value::I8(v) => Value::I8(*v),
            Value::I16(v) => Value::I16(*v),
            Value::I32(v) => Value::I32(*v),
            Value::I64(v) => Value::I64(*v),
            Value::F32(v) => Value::F32(*v),
            Value::F64(v) => Value::F64(*v),
            Value::Bool(v) => Value::Bool(*v),
            Value::Str(bytes) => Value::Str(bytes.clone()),
            Value::Array(array) => Value::Array(array.clone()),
            Value::Struct(fields) => Value::Struct(fields.clone()),
            Value::Optional(inner) => Value::Optional(inner.clone()),
        }
    }
}

impl<B: Backing + Clone> Clone for ArrayValue<B> {
    fn clone(&self) -> Self {
        match self {
            ArrayValue::Primitive(array) => ArrayValue::Primitive(array.clone()),
            ArrayValue::Elements(items) => ArrayValue::Elements(items.clone()),
        }
    }
}

impl<B: Backing + fmt::Debug> fmt::Debug for Value<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => f.debug_tuple("U8").field(v).finish(),
            Value::U16(v) => f.debug_tuple("U16").field(v).finish(),
            Value::U32(v) => f.debug_tuple("U32").field(v).finish(),
            Value::U64(v) => f.debug_tuple("U64").field(v).finish(),
            Value::I8(v) => f.debug_tuple("I8").field(v).finish(),
            Value::I16(v) => f.debug_tuple("I16").field(v).finish(),
            Value::I32(v) => f.debug_tuple("I32").field(v).finish(),
            Value::I64(v) => f.debug_tuple("I64").field(v).finish(),
            Value::F32(v) => f.debug_tuple("F32").field(v).finish(),
            Value::F64(v) => f.debug_tuple("F64").field(v).finish(),
            Value::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Value::Str(bytes) => f.debug_tuple("Str").field(bytes).finish(),
            Value::Array(array) => f.debug_tuple("Array").field(array).finish(),
            Value::Struct(fields) => f.debug_tuple("Struct").field(fields).finish(),
            Value::Optional(inner) => f.debug_tuple("Optional").field(inner).finish(),
        }
    }
}

impl<B: Backing + fmt::Debug> fmt::Debug for ArrayValue<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayValue::Primitive(array) => f.debug_tuple("Primitive").field(array).finish(),
            ArrayValue::Elements(items) => f.debug_tuple("Elements").field(items).finish(),
        }
    }
}

impl<B: Backing> ArrayValue<B> {
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Primitive(array) => array.len(),
            ArrayValue::Elements(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn to_owned_array(&self) -> ArrayValue<Box<[u8]>> {
        match self {
            ArrayValue::Primitive(array) => ArrayValue::Primitive(array.to_owned_array()),
            ArrayValue::Elements(items) => {
                ArrayValue::Elements(items.iter().map(Value::to_owned_value).collect())
            }
        }
    }
}

impl OwnedValue {
    pub fn str(s: &str) -> Self {
        Value::Str(Box::from(s.as_bytes()))
    }

    pub fn bytes(b: &[u8]) -> Self {
        Value::Str(Box::from(b))
    }

    /// Array primitif dari slice bertipe (bulk copy)
    pub fn primitive_array<T: Primitive>(items: &[T]) -> Self {
        Value::Array(ArrayValue::Primitive(PrimitiveArray::from_slice(items)))
    }
}

impl<B> Value<B>
where
    B: Backing<Seq = Vec<Value<B>>, Slot = Box<Value<B>>>,
{
    pub fn elements(items: Vec<Value<B>>) -> Self {
        Value::Array(ArrayValue::Elements(items))
    }

    pub fn some(value: Value<B>) -> Self {
        Value::Optional(Some(Box::new(value)))
    }
}

impl<B: Backing> Value<B> {
    pub fn primitive<T: Primitive>(value: T) -> Self {
        value.into_value()
    }

    pub fn none() -> Self {
        Value::Optional(None)
    }

    /// Kind primitif, jika value ini primitif
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        let kind = match self {
            Value::U8(_) => PrimitiveKind::U8,
            Value::U16(_) => PrimitiveKind::U16,
            Value::U32(_) => PrimitiveKind::U32,
            Value::U64(_) => PrimitiveKind::U64,
            Value::I8(_) => PrimitiveKind::I8,
            Value::I16(_) => PrimitiveKind::I16,
            Value::I32(_) => PrimitiveKind::I32,
            Value::I64(_) => PrimitiveKind::I64,
            Value::F32(_) => PrimitiveKind::F32,
            Value::F64(_) => PrimitiveKind::F64,
            Value::Bool(_) => PrimitiveKind::Bool,
            _ => return None,
        };
        Some(kind)
    }

    #[inline]
    pub fn as_primitive<T: Primitive>(&self) -> Option<T> {
        T::from_value(self)
    }

    pub fn fields(&self) -> Option<&[Value<B>]> {
        match self {
            Value::Struct(fields) => Some(&**fields),
            _ => None,
        }
    }

    pub fn field(&self, index: usize) -> Option<&Value<B>> {
        self.fields()?.get(index)
    }

    pub fn as_array(&self) -> Option<&ArrayValue<B>> {
        match self {
            Value::Array(array) => Some(array),
            _ => None,
        }
    }

    /// `Some(None)` untuk optional absent, `None` jika bukan optional
    pub fn as_optional(&self) -> Option<Option<&Value<B>>> {
        match self {
            Value::Optional(inner) => Some(inner.as_deref()),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Str(bytes) => Some(bytes.as_ref()),
            _ => None,
        }
    }

    /// String sebagai `&str`, `None` jika bukan string atau bukan UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(self.as_bytes()?).ok()
    }

    /// Copy seluruh data variable-length ke storage owned
    pub fn to_owned_value(&self) -> OwnedValue {
        match self {
            Value::U8(v) => Value::U8(*v),
            Value::U16(v) => Value::U16(*v),
            Value::U32(v) => Value::U32(*v),
            Value::U64(v) => Value::U64(*v),
            Value::I8(v) => Value::I8(*v),
            Value::I16(v) => Value::I16(*v),
            Value::I32(v) => Value::I32(*v),
            Value::I64(v) => Value::I64(*v),
            Value::F32(v) => Value::F32(*v),
            Value::F64(v) => Value::F64(*v),
            Value::Bool(v) => Value::Bool(*v),
            Value::Str(bytes) => Value::Str(Box::from(bytes.as_ref())),
            Value::Array(array) => Value::Array(array.to_owned_array()),
            Value::Struct(fields) => {
                Value::Struct(fields.iter().map(Value::to_owned_value).collect())
            }
            Value::Optional(inner) => {
                Value::Optional(inner.as_ref().map(|v| Box::new(v.to_owned_value())))
            }
        }
    }
}

impl<A: Backing, B: Backing> PartialEq<Value<B>> for Value<A> {
    fn eq(&self, other: &Value<B>) -> bool {
        match (self, other) {
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::U64(a), Value::U64(b)) => a == b,
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::I64(a), Value::I64(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a.to_bits() == b.to_bits(),
            (Value::F64(a), Value::F64(b)) => a.to_bits() == b.to_bits(),
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a.as_ref() == b.as_ref(),
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Struct(a), Value::Struct(b)) => elements_match::<A, B>(a, b),
            (Value::Optional(a), Value::Optional(b)) => match (a, b) {
                (None, None) => true,
                (Some(x), Some(y)) => **x == **y,
                _ => false,
            },
            _ => false,
        }
    }
}

impl<A: Backing, B: Backing> PartialEq<ArrayValue<B>> for ArrayValue<A> {
    fn eq(&self, other: &ArrayValue<B>) -> bool {
        match (self, other) {
            (ArrayValue::Primitive(a), ArrayValue::Primitive(b)) => a == b,
            (ArrayValue::Elements(a), ArrayValue::Elements(b)) => elements_match::<A, B>(a, b),
            (ArrayValue::Primitive(p), ArrayValue::Elements(e)) => primitive_matches::<A, B>(p, e),
            (ArrayValue::Elements(e), ArrayValue::Primitive(p)) => primitive_matches::<B, A>(p, e),
        }
    }
}

fn elements_match<A: Backing, B: Backing>(a: &[Value<A>], b: &[Value<B>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x == y)
}

fn primitive_matches<A: Backing, B: Backing>(
    array: &PrimitiveArray<A>,
    items: &[Value<B>],
) -> bool {
    array.len() == items.len()
        && items.iter().enumerate().all(|(i, item)| {
            array
                .value_at::<B>(i)
                .is_some_and(|value| value == *item)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_storage_equality() {
        let owned: OwnedValue = Value::Struct(vec![OwnedValue::str("abc"), Value::U32(7)]);
        let bytes = b"abc".to_vec();
        let borrowed: BorrowedValue<'_> = Value::Struct(vec![Value::Str(&bytes[..]), Value::U32(7)]);
        assert!(owned == borrowed);
        assert!(borrowed == owned);
    }

    #[test]
    fn test_float_equality_is_bitwise() {
        let nan: OwnedValue = Value::F64(f64::NAN);
        assert!(nan == Value::<Box<[u8]>>::F64(f64::NAN));
        let pos: OwnedValue = Value::F32(0.0);
        assert!(pos != Value::<Box<[u8]>>::F32(-0.0));
    }

    #[test]
    fn test_primitive_array_equals_elements() {
        let packed = OwnedValue::primitive_array(&[true, false]);
        let spelled: OwnedValue = Value::elements(vec![Value::Bool(true), Value::Bool(false)]);
        assert!(packed == spelled);
        assert!(spelled == packed);

        let empty_packed = OwnedValue::primitive_array::<u32>(&[]);
        let empty_spelled: OwnedValue = Value::elements(vec![]);
        assert!(empty_packed == empty_spelled);
    }

    #[test]
    fn test_accessors() {
        let value: OwnedValue = Value::Struct(vec![
            Value::U16(1000),
            OwnedValue::str("hello"),
            Value::some(Value::I8(-1)),
            Value::none(),
        ]);
        assert_eq!(value.field(0).and_then(Value::as_primitive::<u16>), Some(1000));
        assert_eq!(value.field(1).and_then(Value::as_str), Some("hello"));
        assert!(value.field(2).and_then(Value::as_optional).unwrap().is_some());
        assert!(value.field(3).and_then(Value::as_optional).unwrap().is_none());
        assert_eq!(value.field(0).unwrap().primitive_kind(), Some(PrimitiveKind::U16));
        assert!(value.field(4).is_none());
    }

    #[test]
    fn test_to_owned_preserves_content() {
        let bytes = b"xyz".to_vec();
        let borrowed: BorrowedValue<'_> = Value::some(Value::Str(&bytes[..]));
        let owned = borrowed.to_owned_value();
        drop(bytes);
        assert_eq!(owned.as_optional().unwrap().unwrap().as_str(), Some("xyz"));
    }
}
