//! Optional fixtures: field struct opsional dengan presence byte

use std::sync::Arc;

use super::{
    cached_schema, read_str_array, str_array_size, strings_value, write_str_array, WireStruct,
};
use crate::config::ArrayMode;
use crate::core::{DecodeCursor, WireWriter};
use crate::error::Result;
use crate::protocol::{
    optional_size, read_optional, read_utf8, string_size, write_optional, write_string, FieldKind,
    OwnedValue, Schema, Value,
};

/// Size, encode, decode, dan `Value` untuk `Option<T>` bertipe
fn opt_size<T: WireStruct>(value: &Option<T>) -> usize {
    optional_size(value.as_ref().map(WireStruct::encoded_size))
}

fn write_opt<T: WireStruct>(w: &mut WireWriter<'_>, value: &Option<T>, mode: ArrayMode) -> Result<()> {
    write_optional(w, value.as_ref(), |w, inner| inner.encode_flat(w, mode))
}

fn read_opt<T: WireStruct>(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Option<T>> {
    read_optional(c, |c| T::decode_flat(c, mode))
}

fn opt_value<T: WireStruct>(value: &Option<T>) -> OwnedValue {
    match value {
        Some(inner) => Value::some(inner.to_value()),
        None => Value::none(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    pub user_id: u64,
    pub username: String,
}

impl WireStruct for Metadata {
    const NAME: &'static str = "Metadata";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("user_id", FieldKind::U64)
            .field("username", FieldKind::String)
            .build())
    }

    fn encoded_size(&self) -> usize {
        8 + string_size(self.username.len())
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        w.put(self.user_id)?;
        write_string(w, self.username.as_bytes())
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            user_id: c.read()?,
            username: read_utf8(c)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::U64(self.user_id), OwnedValue::str(&self.username)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    pub id: u32,
    pub metadata: Option<Metadata>,
}

impl Request {
    pub fn sample() -> Self {
        Self {
            id: 1,
            metadata: Some(Metadata {
                user_id: 12345,
                username: "alice".to_string(),
            }),
        }
    }
}

impl WireStruct for Request {
    const NAME: &'static str = "Request";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("id", FieldKind::U32)
            .field("metadata", FieldKind::optional(FieldKind::of(&Metadata::schema())))
            .build())
    }

    fn encoded_size(&self) -> usize {
        4 + opt_size(&self.metadata)
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        w.put(self.id)?;
        write_opt(w, &self.metadata, mode)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            id: c.read()?,
            metadata: read_opt(c, mode)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::U32(self.id), opt_value(&self.metadata)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagList {
    pub items: Vec<String>,
}

impl WireStruct for TagList {
    const NAME: &'static str = "TagList";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("items", FieldKind::array(FieldKind::String))
            .build())
    }

    fn encoded_size(&self) -> usize {
        str_array_size(&self.items)
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        write_str_array(w, &self.items)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            items: read_str_array(c)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![strings_value(&self.items)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub id: u32,
    pub tags: Option<TagList>,
}

impl Document {
    pub fn sample() -> Self {
        Self {
            id: 7,
            tags: Some(TagList {
                items: vec!["draft".to_string(), "internal".to_string()],
            }),
        }
    }
}

impl WireStruct for Document {
    const NAME: &'static str = "Document";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("id", FieldKind::U32)
            .field("tags", FieldKind::optional(FieldKind::of(&TagList::schema())))
            .build())
    }

    fn encoded_size(&self) -> usize {
        4 + opt_size(&self.tags)
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        w.put(self.id)?;
        write_opt(w, &self.tags, mode)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            id: c.read()?,
            tags: read_opt(c, mode)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::U32(self.id), opt_value(&self.tags)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
}

impl WireStruct for DatabaseConfig {
    const NAME: &'static str = "DatabaseConfig";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("host", FieldKind::String)
            .field("port", FieldKind::U16)
            .build())
    }

    fn encoded_size(&self) -> usize {
        string_size(self.host.len()) + 2
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        write_string(w, self.host.as_bytes())?;
        w.put(self.port)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            host: read_utf8(c)?,
            port: c.read()?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![OwnedValue::str(&self.host), Value::U16(self.port)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig {
    pub size_mb: u32,
    pub ttl_seconds: u32,
}

impl WireStruct for CacheConfig {
    const NAME: &'static str = "CacheConfig";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("size_mb", FieldKind::U32)
            .field("ttl_seconds", FieldKind::U32)
            .build())
    }

    fn encoded_size(&self) -> usize {
        8
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, _mode: ArrayMode) -> Result<()> {
        w.put(self.size_mb)?;
        w.put(self.ttl_seconds)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, _mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            size_mb: c.read()?,
            ttl_seconds: c.read()?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![Value::U32(self.size_mb), Value::U32(self.ttl_seconds)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Config {
    pub name: String,
    pub database: Option<DatabaseConfig>,
    pub cache: Option<CacheConfig>,
}

impl Config {
    pub fn sample() -> Self {
        Self {
            name: "production".to_string(),
            database: Some(DatabaseConfig {
                host: "db.local".to_string(),
                port: 5432,
            }),
            cache: None,
        }
    }
}

impl WireStruct for Config {
    const NAME: &'static str = "Config";

    fn schema() -> Arc<Schema> {
        cached_schema!(Schema::new(Self::NAME)
            .field("name", FieldKind::String)
            .field("database", FieldKind::optional(FieldKind::of(&DatabaseConfig::schema())))
            .field("cache", FieldKind::optional(FieldKind::of(&CacheConfig::schema())))
            .build())
    }

    fn encoded_size(&self) -> usize {
        string_size(self.name.len()) + opt_size(&self.database) + opt_size(&self.cache)
    }

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
        write_string(w, self.name.as_bytes())?;
        write_opt(w, &self.database, mode)?;
        write_opt(w, &self.cache, mode)
    }

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
        Ok(Self {
            name: read_utf8(c)?,
            database: read_opt(c, mode)?,
            cache: read_opt(c, mode)?,
        })
    }

    fn to_value(&self) -> OwnedValue {
        Value::Struct(vec![
            OwnedValue::str(&self.name),
            opt_value(&self.database),
            opt_value(&self.cache),
        ])
    }
}
