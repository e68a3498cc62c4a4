//! Nested fixtures: struct di dalam struct, di-encode inline
//!
//! `Rectangle` seluruhnya fixed-width, jadi ditulis sebagai satu region
//! 20 bytes dengan offset Point yang sudah diratakan.

use std::sync::Arc;

use super::{cached_schema, WireStruct};
use crate::config::ArrayMode;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;
use crate::protocol::{
    read_utf8, string_size, write_string, FieldKind, OwnedValue, Primitive, Schema, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const SIZE: usize = 8;

    #[inline(always)]
    fn write_at(&self, out: &mut [u8]) {
        self.x.write_le(&mut out[0..4]);
        self.y.write_le(&mut out[4..8]);
    }

    #[inline(always)]
    fn read_at(raw: &[u8]) -> Self {
        Self {
            x: f32::read_le(&raw[0..4]),
            y: f32::read_le(&raw[4..8]),
        }
    }
}

impl WireStruct for Point {
    const NAME: &'static str = "Point";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("x", FieldKind::F32)
            .field("y", FieldKind::F32)
            .build())
    }

    #[inline(always)]
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    #[inline]
    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        self.write_at(w.reserve(Self::SIZE)?);
        Ok(())
    }

    #[inline]
    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self::read_at(c.take(Self::SIZE)?))
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::F32(self.x), Value::F32(self.y)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rectangle {
    pub top_left: Point,
    pub bottom_right: Point,
    pub color: u32,
}

impl Rectangle {
    pub const SIZE: usize = 2 * Point::SIZE + 4;

    // top_left @0, bottom_right @8, color @16
    #[inline(always)]
    fn write_at(&self, out: &mut [u8]) {
        self.top_left.write_at(&mut out[0..8]);
        self.bottom_right.write_at(&mut out[8..16]);
        self.color.write_le(&mut out[16..20]);
    }

    #[inline(always)]
    fn read_at(raw: &[u8]) -> Self {
        Self {
            top_left: Point::read_at(&raw[0..8]),
            bottom_right: Point::read_at(&raw[8..16]),
            color: u32::read_le(&raw[16..20]),
        }
    }
}

impl WireStruct for Rectangle {
    const NAME: &'static str = "Rectangle";

    fn schema() -> Arc<Schema> {
        cached_schema!({
            let point = Point::schema();
            Schema::new(Self::NAME)
                .field("top_left", FieldKind::of(&point))
                .field("bottom_right", FieldKind::of(&point))
                .field("color", FieldKind::U32)
                .build()
        })
    }

    #[inline(always)]
    fn encoded_size(&self) -> usize {
        Self::SIZE
    }

    #[inline]
    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        self.write_at(w.reserve(Self::SIZE)?);
        Ok(())
    }

    #[inline]
    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self::read_at(c.take(Self::SIZE)?))
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            self.top_left.to_value(),
            self.bottom_right.to_value(),
            Value::U32(self.color),
        ])
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub name: String,
    pub main_rect: Rectangle,
    pub count: u32,
}

impl Scene {
    pub fn sample() -> Self {
        Self {
            name: "main scene".to_string(),
            main_rect: Rectangle {
                top_left: Point { x: -1.5, y: 2.0 },
                bottom_right: Point { x: 640.0, y: 480.0 },
                color: 0xFF00_80FF,
            },
            count: 3,
        }
    }
}

impl WireStruct for Scene {
    const NAME: &'static str = "Scene";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("name", FieldKind::String)
            .field("main_rect", FieldKind::of(&Rectangle::schema()))
            .field("count", FieldKind::U32)
            .build())
    }

    fn encoded_size(&self) -> usize {
        string_size(self.name.len()) + Rectangle::SIZE + 4
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        write_string(w, self.name.as_bytes())?;
        // Rectangle + count: satu region fixed 24 bytes
        let out = w.reserve(Rectangle::SIZE + 4)?;
        self.main_rect.write_at(&mut out[..Rectangle::SIZE]);
        self.count.write_le(&mut out[Rectangle::SIZE..]);
        Ok(())
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        let name = read_utf8(c)?;
        let raw = c.take(Rectangle::SIZE + 4)?;
        Ok(Self {
            name,
            main_rect: Rectangle::read_at(&raw[..Rectangle::SIZE]),
            count: u32::read_le(&raw[Rectangle::SIZE..]),
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            OwnedValue::str(&self.name),
            self.main_rect.to_value(),
            Value::U32(self.count),
        ])
    }
}
