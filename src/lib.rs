//! SDP - Schema-Driven Binary Wire Codec
//!
//! Arsitektur:
//! - Explicit Layout: little-endian, length-prefixed, tanpa padding
//! - Exact Size: ukuran dihitung dulu, buffer dialokasikan sekali
//! - Pluggable Ownership: zero-copy, arena, atau owned per decode call
//! - Message Envelope: header 10 bytes + dispatch berdasarkan type id

pub mod config;
pub mod core;
pub mod error;
pub mod fixtures;
pub mod protocol;

pub use crate::config::{ArrayMode, DecodeOptions, Limits};
pub use crate::core::{ArenaBytes, DecodeArena, DecodeCursor, Owned, Storage, WireWriter, ZeroCopy};
pub use crate::error::{ErrorKind, Limit, Result, WireError};
pub use crate::protocol::{
    decode, decode_borrowed, decode_in, decode_owned, encode, encode_message, encode_to_vec,
    parse_envelope, size_struct, ArenaValue, Backing, BorrowedValue, FieldKind, OwnedValue, Registry,
    Schema, Value,
};
