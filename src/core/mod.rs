//! Core module: buffer access dan ownership decoded data
//!
//! Prinsip desain:
//! - Bounds-checked: Cursor/Writer eksplisit, tanpa pointer arithmetic
//! - Sized once: Buffer dialokasikan sekali dari size calculator
//! - Pluggable ownership: zero-copy, arena, atau owned per decode call

mod arena;
mod cursor;
mod fixture_file;
mod storage;
mod writer;

pub use arena::{ArenaBytes, DecodeArena, DEFAULT_ARENA_CAPACITY};
pub use cursor::DecodeCursor;
pub use fixture_file::{fixture_path, write_fixture, FixtureFile, FIXTURE_EXTENSION};
pub use storage::{Owned, Seq, Slot, Storage, ZeroCopy};
pub use writer::WireWriter;

pub(crate) use arena::slot_bytes;
