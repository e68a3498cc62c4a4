//! Reference Fixtures: tipe bertipe dengan encoder/decoder flattened
//!
//! Setiap tipe punya:
//! - `schema()`: definisi yang dipakai codec generik
//! - `encode_flat`/`decode_flat`: jalur inline dengan offset yang dihitung di depan
//! - `to_value()`: konversi ke `Value` untuk dibandingkan dengan codec generik
//!
//! Ketiga jalur (generik, flattened bulk, flattened per-element) harus
//! menghasilkan bytes yang identik.

mod arrays;
mod audiounit;
mod nested;
mod optional;
mod primitives;

use std::sync::Arc;

pub use arrays::{ArraysOfPrimitives, ArraysOfStructs, Item};
pub use audiounit::{Parameter, Plugin, PluginRegistry};
pub use nested::{Point, Rectangle, Scene};
pub use optional::{CacheConfig, Config, DatabaseConfig, Document, Metadata, Request, TagList};
pub use primitives::AllPrimitives;

use tracing::debug;

use crate::config::{ArrayMode, DecodeOptions};
use crate::core::{DecodeCursor, WireWriter};
use crate::error::{Result, WireError};
use crate::protocol::{
    parse_envelope, read_elements, read_utf8, write_elements, write_string, MessageHeader,
    OwnedValue, Registry, Schema, Value, HEADER_SIZE,
};

/// Struct dengan encoder/decoder flattened yang cocok dengan `schema()`
pub trait WireStruct: Sized {
    const NAME: &'static str;

    fn schema() -> Arc<Schema>;

    /// Ukuran encoded persis
    fn encoded_size(&self) -> usize;

    fn encode_flat(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()>;

    fn decode_flat(c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self>;

    fn to_value(&self) -> OwnedValue;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_bytes_with(ArrayMode::Bulk)
    }

    fn to_bytes_with(&self, mode: ArrayMode) -> Result<Vec<u8>> {
        let size = self.encoded_size();
        let mut buf = vec![0u8; size];
        let mut w = WireWriter::new(&mut buf);
        self.encode_flat(&mut w, mode)?;
        debug_assert_eq!(w.position(), size, "{} size mismatch", Self::NAME);
        Ok(buf)
    }

    fn from_bytes(buf: &[u8]) -> Result<Self> {
        Self::from_bytes_with(buf, DecodeOptions::default())
    }

    /// Decode seluruh buffer; sisa bytes ditolak
    fn from_bytes_with(buf: &[u8], opts: DecodeOptions) -> Result<Self> {
        opts.limits.check_message_size(buf.len())?;
        let mut c = DecodeCursor::with_limits(buf, opts.limits);
        let value = Self::decode_flat(&mut c, opts.array_mode)?;
        finish(&c, buf.len())?;
        Ok(value)
    }
}

fn finish(c: &DecodeCursor<'_>, declared: usize) -> Result<()> {
    if !c.is_empty() {
        return Err(WireError::PayloadLengthMismatch {
            declared,
            consumed: c.position(),
        });
    }
    Ok(())
}

/// Cache schema per tipe; nested schema di-share lewat `Arc`
macro_rules! cached_schema {
    ($build:expr) => {{
        static SCHEMA: std::sync::OnceLock<std::sync::Arc<crate::protocol::Schema>> =
            std::sync::OnceLock::new();
        std::sync::Arc::clone(SCHEMA.get_or_init(|| $build))
    }};
}
pub(crate) use cached_schema;

pub(crate) fn str_array_size(items: &[String]) -> usize {
    4 + items.iter().map(|s| 4 + s.len()).sum::<usize>()
}

pub(crate) fn write_str_array(w: &mut WireWriter<'_>, items: &[String]) -> Result<()> {
    write_elements(w, items, |w, s| write_string(w, s.as_bytes()))
}

pub(crate) fn read_str_array(c: &mut DecodeCursor<'_>) -> Result<Vec<String>> {
    read_elements(c, read_utf8)
}

pub(crate) fn struct_array_size<T: WireStruct>(items: &[T]) -> usize {
    4 + items.iter().map(WireStruct::encoded_size).sum::<usize>()
}

pub(crate) fn write_struct_array<T: WireStruct>(
    w: &mut WireWriter<'_>,
    items: &[T],
    mode: ArrayMode,
) -> Result<()> {
    write_elements(w, items, |w, item| item.encode_flat(w, mode))
}

pub(crate) fn read_struct_array<T: WireStruct>(
    c: &mut DecodeCursor<'_>,
    mode: ArrayMode,
) -> Result<Vec<T>> {
    read_elements(c, |c| T::decode_flat(c, mode))
}

pub(crate) fn strings_value(items: &[String]) -> OwnedValue {
    Value::elements(items.iter().map(|s| OwnedValue::str(s)).collect())
}

pub(crate) fn structs_value<T: WireStruct>(items: &[T]) -> OwnedValue {
    Value::elements(items.iter().map(WireStruct::to_value).collect())
}

macro_rules! fixture_messages {
    ($($id:literal => $ty:ident),* $(,)?) => {
        /// Tagged union semua reference type, di-dispatch dari `type_id`
        #[derive(Debug, Clone, PartialEq)]
        pub enum FixtureMessage {
            $($ty($ty)),*
        }

        $(
            impl From<$ty> for FixtureMessage {
                fn from(value: $ty) -> Self {
                    FixtureMessage::$ty(value)
                }
            }
        )*

        impl FixtureMessage {
            pub fn type_id(&self) -> u16 {
                match self {
                    $(FixtureMessage::$ty(_) => $id),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(FixtureMessage::$ty(_) => <$ty as WireStruct>::NAME),*
                }
            }

            pub fn to_value(&self) -> OwnedValue {
                match self {
                    $(FixtureMessage::$ty(inner) => inner.to_value()),*
                }
            }

            /// Ukuran payload (tanpa header)
            pub fn payload_size(&self) -> usize {
                match self {
                    $(FixtureMessage::$ty(inner) => inner.encoded_size()),*
                }
            }

            fn encode_payload(&self, w: &mut WireWriter<'_>, mode: ArrayMode) -> Result<()> {
                match self {
                    $(FixtureMessage::$ty(inner) => inner.encode_flat(w, mode)),*
                }
            }

            fn decode_payload(type_id: u16, c: &mut DecodeCursor<'_>, mode: ArrayMode) -> Result<Self> {
                match type_id {
                    $($id => $ty::decode_flat(c, mode).map(FixtureMessage::$ty),)*
                    _ => Err(WireError::UnknownTypeId { type_id }),
                }
            }
        }

        /// Registry semua reference schema; type id mengikuti urutan di atas
        pub fn registry() -> Result<Registry> {
            let mut registry = Registry::new();
            $(
                let type_id = registry.register(<$ty as WireStruct>::schema())?;
                debug_assert_eq!(type_id, $id);
            )*
            Ok(registry)
        }
    };
}

fixture_messages! {
    1 => AllPrimitives,
    2 => ArraysOfPrimitives,
    3 => Item,
    4 => ArraysOfStructs,
    5 => Point,
    6 => Rectangle,
    7 => Scene,
    8 => Parameter,
    9 => Plugin,
    10 => PluginRegistry,
    11 => Metadata,
    12 => Request,
    13 => TagList,
    14 => Document,
    15 => DatabaseConfig,
    16 => CacheConfig,
    17 => Config,
}

impl FixtureMessage {
    /// Encode envelope lengkap lewat jalur flattened
    pub fn to_message(&self) -> Result<Vec<u8>> {
        self.to_message_with(ArrayMode::Bulk)
    }

    pub fn to_message_with(&self, mode: ArrayMode) -> Result<Vec<u8>> {
        let payload_len = self.payload_size();
        let mut buf = vec![0u8; HEADER_SIZE + payload_len];
        let mut w = WireWriter::new(&mut buf);
        let header_len = u32::try_from(payload_len).map_err(|_| {
            WireError::limit(crate::error::Limit::MessageSize, u32::MAX as usize, payload_len)
        })?;
        MessageHeader::new(self.type_id(), header_len).write(&mut w)?;
        self.encode_payload(&mut w, mode)?;
        Ok(buf)
    }

    /// Dispatcher bertipe: parse envelope, `match` pada `type_id`
    pub fn from_message(buf: &[u8]) -> Result<Self> {
        Self::from_message_with(buf, DecodeOptions::default())
    }

    pub fn from_message_with(buf: &[u8], opts: DecodeOptions) -> Result<Self> {
        let envelope = parse_envelope(buf, opts.limits)?;
        let mut c = DecodeCursor::with_limits(envelope.payload, opts.limits);
        let message = Self::decode_payload(envelope.type_id(), &mut c, opts.array_mode)
            .and_then(|message| finish(&c, envelope.payload.len()).map(|_| message));
        if let Err(err) = &message {
            debug!(type_id = envelope.type_id(), error = %err, "fixture message rejected");
        }
        message
    }

    /// Satu sample per reference type, dengan nama file fixture
    pub fn samples() -> Vec<(&'static str, FixtureMessage)> {
        vec![
            ("primitives", AllPrimitives::sample().into()),
            ("arrays_of_primitives", ArraysOfPrimitives::sample().into()),
            ("arrays_of_structs", ArraysOfStructs::sample().into()),
            ("scene", Scene::sample().into()),
            ("plugin_registry", PluginRegistry::sample(4, 8).into()),
            ("request_with_metadata", Request::sample().into()),
            ("request_without_metadata", Request { id: 2, metadata: None }.into()),
            ("document", Document::sample().into()),
            ("config", Config::sample().into()),
        ]
    }
}
