//! Struct Codec: field berurutan, nested struct inline
//!
//! Encode bersifat schema-free: `Value` sudah self-describing, sehingga
//! size dan encode cukup menelusuri value. Decode digerakkan oleh
//! `Schema` dan storage strategy yang dipilih caller.
//!
//! Alur: `size_value` → alokasi buffer tepat → `encode_value` → bytes.

use tracing::debug;

use super::array::{read_primitive_array, write_elements};
use super::optional::{read_optional, write_optional};
use super::primitive::PrimitiveKind;
use super::schema::{FieldKind, Schema};
use super::string::{read_string, string_size, write_string};
use super::value::{ArenaValue, ArrayValue, Backing, BorrowedValue, OwnedValue, Value};
use crate::config::DecodeOptions;
use crate::core::{slot_bytes, DecodeArena, DecodeCursor, Owned, Seq, Storage, WireWriter, ZeroCopy};
use crate::error::{Result, WireError};

/// Ukuran encoded persis dari sebuah value
pub fn size_value<B: Backing>(value: &Value<B>) -> usize {
    match value {
        Value::U8(_) | Value::I8(_) | Value::Bool(_) => 1,
        Value::U16(_) | Value::I16(_) => 2,
        Value::U32(_) | Value::I32(_) | Value::F32(_) => 4,
        Value::U64(_) | Value::I64(_) | Value::F64(_) => 8,
        Value::Str(bytes) => string_size(bytes.as_ref().len()),
        Value::Array(ArrayValue::Primitive(array)) => array.encoded_size(),
        Value::Array(ArrayValue::Elements(items)) => 4 + items.iter().map(size_value).sum::<usize>(),
        Value::Struct(fields) => fields.iter().map(size_value).sum(),
        Value::Optional(inner) => 1 + inner.as_deref().map_or(0, size_value),
    }
}

/// Alias untuk top-level struct
#[inline]
pub fn size_struct<B: Backing>(value: &Value<B>) -> usize {
    size_value(value)
}

/// Kapasitas `DecodeArena` yang dipakai arena decode untuk `value`
pub fn arena_size<B: Backing>(value: &Value<B>) -> usize {
    match value {
        Value::Str(bytes) => bytes.as_ref().len(),
        Value::Array(ArrayValue::Primitive(array)) => array.as_bytes().len(),
        Value::Array(ArrayValue::Elements(items)) | Value::Struct(items) => {
            slot_bytes::<ArenaValue<'_>>(items.len()) + items.iter().map(arena_size).sum::<usize>()
        }
        Value::Optional(Some(inner)) => slot_bytes::<ArenaValue<'_>>(1) + arena_size(&**inner),
        _ => 0,
    }
}

/// Tulis value ke writer
pub fn encode_value<B: Backing>(value: &Value<B>, w: &mut WireWriter<'_>) -> Result<()> {
    match value {
        Value::U8(v) => w.put(*v),
        Value::U16(v) => w.put(*v),
        Value::U32(v) => w.put(*v),
        Value::U64(v) => w.put(*v),
        Value::I8(v) => w.put(*v),
        Value::I16(v) => w.put(*v),
        Value::I32(v) => w.put(*v),
        Value::I64(v) => w.put(*v),
        Value::F32(v) => w.put(*v),
        Value::F64(v) => w.put(*v),
        Value::Bool(v) => w.put(*v),
        Value::Str(bytes) => write_string(w, bytes.as_ref()),
        Value::Array(ArrayValue::Primitive(array)) => array.write(w),
        Value::Array(ArrayValue::Elements(items)) => write_elements(w, &**items, |w, item| encode_value(item, w)),
        Value::Struct(fields) => fields.iter().try_for_each(|field| encode_value(field, w)),
        Value::Optional(inner) => write_optional(w, inner.as_deref(), |w, v| encode_value(v, w)),
    }
}

/// Encode struct pada `offset` di buffer milik caller, return offset baru
pub fn encode_struct<B: Backing>(value: &Value<B>, buf: &mut [u8], offset: usize) -> Result<usize> {
    let mut w = WireWriter::at(buf, offset);
    encode_value(value, &mut w)?;
    Ok(w.position())
}

/// Size → alokasi sekali → encode
pub fn encode_to_vec<B: Backing>(value: &Value<B>) -> Result<Vec<u8>> {
    let size = size_value(value);
    let mut buf = vec![0u8; size];
    let mut w = WireWriter::new(&mut buf);
    encode_value(value, &mut w)?;
    debug_assert_eq!(w.position(), size, "size_value and encode_value disagree");
    Ok(buf)
}

/// Validasi value terhadap schema, lalu encode
pub fn encode<B: Backing>(schema: &Schema, value: &Value<B>) -> Result<Vec<u8>> {
    schema.check(value)?;
    encode_to_vec(value)
}

/// Baca satu struct sesuai schema; gagal di field pertama yang rusak
pub(crate) fn read_struct<'a, S: Storage<'a>>(
    schema: &Schema,
    c: &mut DecodeCursor<'a>,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    let mut fields = storage.builder(schema.fields().len())?;
    for field in schema.fields() {
        let value = read_kind(&field.kind, c, storage)?;
        storage.push(&mut fields, value)?;
    }
    Ok(Value::Struct(storage.finish(fields)))
}

pub(crate) fn read_kind<'a, S: Storage<'a>>(
    kind: &FieldKind,
    c: &mut DecodeCursor<'a>,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    let value = match kind {
        FieldKind::Primitive(kind) => read_primitive(*kind, c)?,
        FieldKind::String => Value::Str(storage.store(read_string(c)?)?),
        FieldKind::Struct(schema) => read_struct(schema, c, storage)?,
        FieldKind::Array(element) => match element.as_ref() {
            FieldKind::Primitive(kind) => {
                Value::Array(ArrayValue::Primitive(read_primitive_array(c, *kind, storage)?))
            }
            element => Value::Array(ArrayValue::Elements(read_element_seq(element, c, storage)?)),
        },
        FieldKind::Optional(inner) => match read_optional(c, |c| read_kind(inner, c, storage))? {
            Some(value) => Value::Optional(Some(storage.slot(value)?)),
            None => Value::Optional(None),
        },
    };
    Ok(value)
}

fn read_element_seq<'a, S: Storage<'a>>(
    element: &FieldKind,
    c: &mut DecodeCursor<'a>,
    storage: &mut S,
) -> Result<Seq<S::Bytes>> {
    let count = c.read_count()?;
    // Kapasitas dibatasi sisa buffer: count palsu tidak memicu alokasi besar
    let mut items = storage.builder(count.min(c.remaining()))?;
    for _ in 0..count {
        let item = read_kind(element, c, storage)?;
        storage.push(&mut items, item)?;
    }
    Ok(storage.finish(items))
}

#[inline]
fn read_primitive<X: Backing>(kind: PrimitiveKind, c: &mut DecodeCursor<'_>) -> Result<Value<X>> {
    Ok(super::array::primitive_value(kind, c.take(kind.width())?))
}

/// Decode struct dari `offset`, return (value, offset baru)
///
/// Bytes setelah struct diabaikan (API berbasis offset).
pub fn decode_struct<'a, S: Storage<'a>>(
    schema: &Schema,
    buf: &'a [u8],
    offset: usize,
    opts: DecodeOptions,
    storage: &mut S,
) -> Result<(Value<S::Bytes>, usize)> {
    let mut c = DecodeCursor::with_limits(buf, opts.limits).starting_at(offset);
    let value = read_struct(schema, &mut c, storage)?;
    Ok((value, c.position()))
}

/// Top-level decode: seluruh buffer harus berisi tepat satu struct
pub fn decode<'a, S: Storage<'a>>(
    schema: &Schema,
    buf: &'a [u8],
    opts: DecodeOptions,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    let result = decode_exact(schema, buf, opts, storage);
    if let Err(err) = &result {
        debug!(schema = schema.name(), len = buf.len(), error = %err, "decode rejected");
    }
    result
}

pub(crate) fn decode_exact<'a, S: Storage<'a>>(
    schema: &Schema,
    buf: &'a [u8],
    opts: DecodeOptions,
    storage: &mut S,
) -> Result<Value<S::Bytes>> {
    opts.limits.check_message_size(buf.len())?;
    let mut c = DecodeCursor::with_limits(buf, opts.limits);
    let value = read_struct(schema, &mut c, storage)?;
    if !c.is_empty() {
        return Err(WireError::PayloadLengthMismatch {
            declared: buf.len(),
            consumed: c.position(),
        });
    }
    Ok(value)
}

/// Zero-copy decode: string dan array primitif adalah view ke `buf`
#[inline]
pub fn decode_borrowed<'a>(schema: &Schema, buf: &'a [u8]) -> Result<BorrowedValue<'a>> {
    decode(schema, buf, DecodeOptions::default(), &mut ZeroCopy)
}

/// Owned decode: setiap field variable-length punya allocation sendiri
#[inline]
pub fn decode_owned(schema: &Schema, buf: &[u8]) -> Result<OwnedValue> {
    decode(schema, buf, DecodeOptions::default(), &mut Owned)
}

/// Arena decode: seluruh value, termasuk field dan element, tinggal di `arena`
#[inline]
pub fn decode_in<'arena>(
    schema: &Schema,
    buf: &[u8],
    arena: &'arena DecodeArena,
    opts: DecodeOptions,
) -> Result<ArenaValue<'arena>> {
    let mut storage = arena;
    decode(schema, buf, opts, &mut storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Limits;
    use crate::error::ErrorKind;
    use crate::protocol::schema::FieldKind;
    use std::sync::Arc;

    fn named_point() -> (Arc<Schema>, OwnedValue) {
        let schema = Schema::new("NamedPoint")
            .field("name", FieldKind::String)
            .field("x", FieldKind::I32)
            .field("tags", FieldKind::array(FieldKind::String))
            .field("weights", FieldKind::array(FieldKind::F32))
            .field("note", FieldKind::optional(FieldKind::String))
            .build();
        let value = Value::Struct(vec![
            OwnedValue::str("origin"),
            Value::I32(-5),
            Value::elements(vec![OwnedValue::str("a"), OwnedValue::str("bc")]),
            OwnedValue::primitive_array(&[0.5f32, -0.0]),
            Value::none(),
        ]);
        (schema, value)
    }

    #[test]
    fn test_size_matches_encode() {
        let (schema, value) = named_point();
        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(bytes.len(), size_struct(&value));
        // 4+6 | 4 | 4+(4+1)+(4+2) | 4+8 | 1
        assert_eq!(bytes.len(), 10 + 4 + 15 + 12 + 1);
    }

    #[test]
    fn test_roundtrip_every_strategy() {
        let (schema, value) = named_point();
        let bytes = encode_to_vec(&value).unwrap();

        let borrowed = decode_borrowed(&schema, &bytes).unwrap();
        assert!(borrowed == value);

        let owned = decode_owned(&schema, &bytes).unwrap();
        assert!(owned == value);

        let arena = DecodeArena::new(1024);
        let in_arena = decode_in(&schema, &bytes, &arena, DecodeOptions::default()).unwrap();
        assert!(in_arena == value);
        // 5 field + 2 tag, ditambah bytes "origin", "a", "bc", dan 2 x f32
        let nodes = slot_bytes::<ArenaValue<'_>>(5) + slot_bytes::<ArenaValue<'_>>(2);
        assert_eq!(arena.used(), nodes + 6 + 1 + 2 + 8);
        assert_eq!(arena.used(), arena_size(&value));
    }

    #[test]
    fn test_zero_copy_borrows_buffer() {
        let (schema, value) = named_point();
        let bytes = encode_to_vec(&value).unwrap();
        let view = decode_borrowed(&schema, &bytes).unwrap();
        let name = view.field(0).and_then(Value::as_bytes).unwrap();
        assert_eq!(name.as_ptr(), bytes[4..].as_ptr());
    }

    #[test]
    fn test_encode_at_offset() {
        let (schema, value) = named_point();
        let size = size_struct(&value);
        let mut buf = vec![0u8; 3 + size];
        let next = encode_struct(&value, &mut buf, 3).unwrap();
        assert_eq!(next, 3 + size);

        let (decoded, end) =
            decode_struct(&schema, &buf, 3, DecodeOptions::default(), &mut ZeroCopy).unwrap();
        assert_eq!(end, next);
        assert!(decoded == value);
    }

    #[test]
    fn test_encode_into_small_buffer() {
        let (_, value) = named_point();
        let mut buf = vec![0u8; size_struct(&value) - 1];
        let err = encode_struct(&value, &mut buf, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BufferTooSmall);
    }

    #[test]
    fn test_encode_checks_schema() {
        let (schema, _) = named_point();
        let err = encode(&schema, &Value::<Box<[u8]>>::Struct(vec![])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SchemaMismatch);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let (schema, value) = named_point();
        let mut bytes = encode_to_vec(&value).unwrap();
        bytes.push(0);
        let err = decode_owned(&schema, &bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PayloadLengthMismatch);
    }

    #[test]
    fn test_every_prefix_truncated() {
        let (schema, value) = named_point();
        let bytes = encode_to_vec(&value).unwrap();
        for cut in 0..bytes.len() {
            let err = decode_borrowed(&schema, &bytes[..cut]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::TruncatedBuffer, "prefix {cut}");
        }
    }

    #[test]
    fn test_arena_exhausted() {
        let (schema, value) = named_point();
        let bytes = encode_to_vec(&value).unwrap();
        let arena = DecodeArena::new(4);
        let err = decode_in(&schema, &bytes, &arena, DecodeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailure);

        // Satu byte kurang dari kebutuhan tetap gagal, pas kebutuhan berhasil
        let exact = DecodeArena::new(arena_size(&value) - 1);
        let err = decode_in(&schema, &bytes, &exact, DecodeOptions::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailure);
        let exact = DecodeArena::new(arena_size(&value));
        assert!(decode_in(&schema, &bytes, &exact, DecodeOptions::default()).is_ok());
        assert_eq!(exact.remaining(), 0);
    }

    #[test]
    fn test_message_size_cap() {
        let (schema, value) = named_point();
        let bytes = encode_to_vec(&value).unwrap();
        let opts = DecodeOptions::with_limits(Limits::default().with_max_message_size(8));
        let err = decode(&schema, &bytes, opts, &mut ZeroCopy).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::LimitExceeded);
    }

    #[test]
    fn test_nested_arrays_and_optionals() {
        let schema = Schema::new("Grid")
            .field("rows", FieldKind::array(FieldKind::array(FieldKind::U16)))
            .field(
                "label",
                FieldKind::optional(FieldKind::optional(FieldKind::String)),
            )
            .build();
        let value: OwnedValue = Value::Struct(vec![
            Value::elements(vec![
                OwnedValue::primitive_array(&[1u16, 2]),
                OwnedValue::primitive_array::<u16>(&[]),
            ]),
            Value::some(Value::some(OwnedValue::str("x"))),
        ]);
        let bytes = encode(&schema, &value).unwrap();
        assert_eq!(bytes.len(), 4 + (4 + 4) + 4 + 1 + 1 + 5);
        assert!(decode_owned(&schema, &bytes).unwrap() == value);
    }
}
