//! Protocol Layer: schema-driven binary encoding
//!
//! Prinsip desain:
//! - Little-endian eksplisit: layout wire tidak bergantung pada host
//! - Length-prefixed: setiap string/array membawa `u32` di depannya
//! - Exact size: ukuran encoded dihitung sebelum alokasi
//! - Satu codec, storage strategy dipilih per decode call

mod array;
mod codec;
mod encoder;
mod message;
mod optional;
mod primitive;
mod schema;
mod string;
mod value;

pub use array::{
    decode_primitive_array, decode_primitive_view, encode_primitive_array, primitive_array_size,
    PrimitiveArray,
};
pub use codec::{
    arena_size, decode, decode_borrowed, decode_in, decode_owned, decode_struct, encode, encode_struct,
    encode_to_vec, encode_value, size_struct, size_value,
};
pub use encoder::{read_message, write_message, Decoder, Encoder, OwnedMessage};
pub use message::{
    decode_message_as, encode_message, encode_message_into, message_size, parse_envelope,
    Dispatched, Envelope, EnvelopeReader, EnvelopeState, MessageHeader, HEADER_SIZE, MAGIC,
    SUPPORTED_VERSIONS, VERSION,
};
pub use optional::{decode_optional, encode_optional, optional_size, ABSENT, PRESENT};
pub use primitive::{decode_primitive, encode_primitive, Primitive, PrimitiveKind};
pub use schema::{Field, FieldKind, Registry, Schema};
pub use string::{decode_string, encode_string, string_size};
pub use value::{ArenaValue, ArrayValue, Backing, BorrowedValue, OwnedValue, Value};

pub(crate) use array::{read_elements, read_primitive_vec, write_elements, write_primitive_slice};
pub(crate) use optional::{read_optional, write_optional};
pub(crate) use string::{read_utf8, write_string};
