//! Array fixtures: array primitif (jalur bulk) dan array struct (per element)

use std::sync::Arc;

use super::{
    cached_schema, read_str_array, read_struct_array, str_array_size, strings_value,
    struct_array_size, structs_value, write_str_array, write_struct_array, WireStruct,
};
use crate::config::ArrayMode;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;
use crate::protocol::{
    primitive_array_size, read_primitive_vec, read_utf8, string_size, write_primitive_slice,
    write_string, FieldKind, OwnedValue, Schema, Value,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraysOfPrimitives {
    pub u8_array: Vec<u8>,
    pub u32_array: Vec<u32>,
    pub f64_array: Vec<f64>,
    pub str_array: Vec<String>,
    pub bool_array: Vec<bool>,
}

impl ArraysOfPrimitives {
    pub fn sample() -> Self {
        Self {
            u8_array: vec![1, 2, 3, 255],
            u32_array: vec![100, 200, 300],
            f64_array: vec![1.5, -2.25, 1e-300],
            str_array: vec!["alpha".into(), String::new(), "gamma".into()],
            bool_array: vec![true, false, true],
        }
    }
}

impl WireStruct for ArraysOfPrimitives {
    const NAME: &'static str = "ArraysOfPrimitives";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("u8_array", FieldKind::array(FieldKind::U8))
            .field("u32_array", FieldKind::array(FieldKind::U32))
            .field("f64_array", FieldKind::array(FieldKind::F64))
            .field("str_array", FieldKind::array(FieldKind::String))
            .field("bool_array", FieldKind::array(FieldKind::BOOL))
            .build())
    }

    fn encoded_size(&self) -> usize {
        primitive_array_size::<u8>(self.u8_array.len())
            + primitive_array_size::<u32>(self.u32_array.len())
            + primitive_array_size::<f64>(self.f64_array.len())
            + str_array_size(&self.str_array)
            + primitive_array_size::<bool>(self.bool_array.len())
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        write_primitive_slice(w, &self.u8_array, mode)?;
        write_primitive_slice(w, &self.u32_array, mode)?;
        write_primitive_slice(w, &self.f64_array, mode)?;
        write_str_array(w, &self.str_array)?;
        write_primitive_slice(w, &self.bool_array, mode)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            u8_array: read_primitive_vec(c, mode)?,
            u32_array: read_primitive_vec(c, mode)?,
            f64_array: read_primitive_vec(c, mode)?,
            str_array: read_str_array(c)?,
            bool_array: read_primitive_vec(c, mode)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            OwnedValue::primitive_array(&self.u8_array),
            OwnedValue::primitive_array(&self.u32_array),
            OwnedValue::primitive_array(&self.f64_array),
            strings_value(&self.str_array),
            OwnedValue::primitive_array(&self.bool_array),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    pub id: u32,
    pub name: String,
}

impl WireStruct for Item {
    const NAME: &'static str = "Item";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("id", FieldKind::U32)
            .field("name", FieldKind::String)
            .build())
    }

    #[inline]
    fn encoded_size(&self) -> usize {
        4 + string_size(self.name.len())
    }

    #[inline]
    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        w.put(self.id)?;
        write_string(w, self.name.as_bytes())
    }

    #[inline]
    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            id: c.read()?,
            name: read_utf8(c)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::U32(self.id), OwnedValue::str(&self.name)])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraysOfStructs {
    pub items: Vec<Item>,
    pub count: u32,
}

impl ArraysOfStructs {
    pub fn sample() -> Self {
        let items: Vec<Item> = (1..=3)
            .map(|id| Item {
                id,
                name: format!("item-{id}"),
            })
            .collect();
        Self {
            count: items.len() as u32,
            items,
        }
    }
}

impl WireStruct for ArraysOfStructs {
    const NAME: &'static str = "ArraysOfStructs";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("items", FieldKind::array(FieldKind::of(&Item::schema())))
            .field("count", FieldKind::U32)
            .build())
    }

    fn encoded_size(&self) -> usize {
        struct_array_size(&self.items) + 4
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        write_struct_array(w, &self.items, mode)?;
        w.put(self.count)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            items: read_struct_array(c, mode)?,
            count: c.read()?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![structs_value(&self.items), Value::U32(self.count)])
    }
}
