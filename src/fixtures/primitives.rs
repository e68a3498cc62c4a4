//! AllPrimitives: setiap primitive type + satu string
//!
//! Bagian fixed-width (43 bytes) ditulis ke satu region dengan
//! offset konstan, lalu string di belakangnya.

use std::sync::Arc;

use super::{cached_schema, WireStruct};
use crate::config::ArrayMode;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;
use crate::protocol::{
    read_utf8, string_size, write_string, FieldKind, OwnedValue, Primitive, Schema, Value,
};

// Offset field di region fixed
const U16_AT: usize = 1;
const U32_AT: usize = 3;
const U64_AT: usize = 7;
const I8_AT: usize = 15;
const I16_AT: usize = 16;
const I32_AT: usize = 18;
const I64_AT: usize = 22;
const F32_AT: usize = 30;
const F64_AT: usize = 34;
const BOOL_AT: usize = 42;
const FIXED: usize = 43;

#[derive(Debug, Clone, PartialEq)]
pub struct AllPrimitives {
    pub u8_field: u8,
    pub u16_field: u16,
    pub u32_field: u32,
    pub u64_field: u64,
    pub i8_field: i8,
    pub i16_field: i16,
    pub i32_field: i32,
    pub i64_field: i64,
    pub f32_field: f32,
    pub f64_field: f64,
    pub bool_field: bool,
    pub str_field: String,
}

impl AllPrimitives {
    #[allow(clippy::approx_constant)]
    pub fn sample() -> Self {
        Self {
            u8_field: 42,
            u16_field: 1000,
            u32_field: 100_000,
            u64_field: 1_234_567_890_123,
            i8_field: -10,
            i16_field: -1000,
            i32_field: -100_000,
            i64_field: -9_876_543_210,
            f32_field: 3.14159,
            f64_field: 2.71828,
            bool_field: true,
            str_field: "hello".to_string(),
        }
    }
}

#[inline(always)]
fn put<T: Primitive>(out: &mut [u8], at: usize, value: T) {
    value.write_le(&mut out[at..at + T::WIDTH]);
}

#[inline(always)]
fn get<T: Primitive>(raw: &[u8], at: usize) -> T {
    T::read_le(&raw[at..at + T::WIDTH])
}

impl WireStruct for AllPrimitives {
    const NAME: &'static str = "AllPrimitives";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("u8_field", FieldKind::U8)
            .field("u16_field", FieldKind::U16)
            .field("u32_field", FieldKind::U32)
            .field("u64_field", FieldKind::U64)
            .field("i8_field", FieldKind::I8)
            .field("i16_field", FieldKind::I16)
            .field("i32_field", FieldKind::I32)
            .field("i64_field", FieldKind::I64)
            .field("f32_field", FieldKind::F32)
            .field("f64_field", FieldKind::F64)
            .field("bool_field", FieldKind::BOOL)
            .field("str_field", FieldKind::String)
            .build())
    }

    #[inline]
    fn encoded_size(&self) -> usize {
        FIXED + string_size(self.str_field.len())
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        let out = w.reserve(FIXED)?;
        out[0] = self.u8_field;
        put(out, U16_AT, self.u16_field);
        put(out, U32_AT, self.u32_field);
        put(out, U64_AT, self.u64_field);
        put(out, I8_AT, self.i8_field);
        put(out, I16_AT, self.i16_field);
        put(out, I32_AT, self.i32_field);
        put(out, I64_AT, self.i64_field);
        put(out, F32_AT, self.f32_field);
        put(out, F64_AT, self.f64_field);
        put(out, BOOL_AT, self.bool_field);
        write_string(w, self.str_field.as_bytes())
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        let raw = c.take(FIXED)?;
        Ok(Self {
            u8_field: raw[0],
            u16_field: get(raw, U16_AT),
            u32_field: get(raw, U32_AT),
            u64_field: get(raw, U64_AT),
            i8_field: get(raw, I8_AT),
            i16_field: get(raw, I16_AT),
            i32_field: get(raw, I32_AT),
            i64_field: get(raw, I64_AT),
            f32_field: get(raw, F32_AT),
            f64_field: get(raw, F64_AT),
            bool_field: get(raw, BOOL_AT),
            str_field: read_utf8(c)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            Value::U8(self.u8_field),
            Value::U16(self.u16_field),
            Value::U32(self.u32_field),
            Value::U64(self.u64_field),
            Value::I8(self.i8_field),
            Value::I16(self.i16_field),
            Value::I32(self.i32_field),
            Value::I64(self.i64_field),
            Value::F32(self.f32_field),
            Value::F64(self.f64_field),
            Value::Bool(self.bool_field),
            OwnedValue::str(&self.str_field),
        ])
    }
}
