//! Storage strategy untuk hasil decode
//!
//! Satu codec, tiga strategi yang dipilih per decode call:
//! - `ZeroCopy`: view ke buffer asli (lifetime value ⊆ lifetime buffer)
//! - `&DecodeArena`: bytes dan node anak di-copy ke bump arena batch
//! - `Owned`: setiap field punya heap allocation sendiri
//!
//! Strategy juga menentukan container untuk field struct, element array,
//! dan payload optional, sehingga arena decode tidak menyentuh heap.

use bumpalo::collections::Vec as BumpVec;

use super::arena::{ArenaBytes, DecodeArena};
use crate::error::Result;
use crate::protocol::{ArenaValue, Backing, Value};

/// Urutan node anak yang sudah selesai dibangun
pub type Seq<S> = <S as Backing>::Seq;

/// Payload optional yang sudah dipindah ke storage
pub type Slot<S> = <S as Backing>::Slot;

/// Cara menyimpan hasil decode dari buffer `'src`
pub trait Storage<'src> {
    type Bytes: Backing;

    /// Builder untuk field struct atau element array
    type Builder;

    fn store(&mut self, bytes: &'src [u8]) -> Result<Self::Bytes>;

    /// Builder kosong dengan ruang untuk `capacity` value
    fn builder(&mut self, capacity: usize) -> Result<Self::Builder>;

    fn push(&mut self, builder: &mut Self::Builder, value: Value<Self::Bytes>) -> Result<()>;

    fn finish(&mut self, builder: Self::Builder) -> Seq<Self::Bytes>;

    /// Pindahkan payload optional ke storage
    fn slot(&mut self, value: Value<Self::Bytes>) -> Result<Slot<Self::Bytes>>;
}

/// Container heap untuk strategy yang node anaknya tinggal di `Vec`/`Box`
macro_rules! heap_containers {
    () => {
        type Builder = Vec<Value<Self::Bytes>>;

        #[inline]
        fn builder(&mut self, capacity: usize) -> Result<Self::Builder> {
            Ok(Vec::with_capacity(capacity))
        }

        #[inline]
        fn push(&mut self, builder: &mut Self::Builder, value: Value<Self::Bytes>) -> Result<()> {
            builder.push(value);
            Ok(())
        }

        #[inline(always)]
        fn finish(&mut self, builder: Self::Builder) -> Seq<Self::Bytes> {
            builder
        }

        #[inline]
        fn slot(&mut self, value: Value<Self::Bytes>) -> Result<Slot<Self::Bytes>> {
            Ok(Box::new(value))
        }
    };
}

/// Borrow langsung dari wire buffer
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroCopy;

impl<'src> Storage<'src> for ZeroCopy {
    type Bytes = &'src [u8];

    #[inline(always)]
    fn store(&mut self, bytes: &'src [u8]) -> Result<Self::Bytes> {
        Ok(bytes)
    }

    heap_containers!();
}

/// Heap allocation per field
#[derive(Debug, Clone, Copy, Default)]
pub struct Owned;

impl<'src> Storage<'src> for Owned {
    type Bytes = Box<[u8]>;

    #[inline]
    fn store(&mut self, bytes: &'src [u8]) -> Result<Self::Bytes> {
        Ok(Box::from(bytes))
    }

    heap_containers!();
}

impl<'src, 'arena> Storage<'src> for &'arena DecodeArena {
    type Bytes = ArenaBytes<'arena>;
    type Builder = BumpVec<'arena, ArenaValue<'arena>>;

    #[inline]
    fn store(&mut self, bytes: &'src [u8]) -> Result<Self::Bytes> {
        let arena: &'arena DecodeArena = *self;
        arena.alloc_bytes(bytes)
    }

    #[inline]
    fn builder(&mut self, capacity: usize) -> Result<Self::Builder> {
        let arena: &'arena DecodeArena = *self;
        arena.vec_with_capacity(capacity)
    }

    #[inline]
    fn push(&mut self, builder: &mut Self::Builder, value: ArenaValue<'arena>) -> Result<()> {
        let arena: &'arena DecodeArena = *self;
        arena.push_to(builder, value)
    }

    #[inline(always)]
    fn finish(&mut self, builder: Self::Builder) -> &'arena [ArenaValue<'arena>] {
        builder.into_bump_slice()
    }

    #[inline]
    fn slot(&mut self, value: ArenaValue<'arena>) -> Result<&'arena ArenaValue<'arena>> {
        let arena: &'arena DecodeArena = *self;
        arena.alloc(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::slot_bytes;

    #[test]
    fn test_zero_copy_points_into_source() {
        let buf = b"payload".to_vec();
        let stored = ZeroCopy.store(&buf[2..5]).unwrap();
        assert_eq!(stored.as_ptr(), buf[2..].as_ptr());
    }

    #[test]
    fn test_owned_outlives_source() {
        let stored = {
            let buf = b"temporary".to_vec();
            Owned.store(&buf).unwrap()
        };
        assert_eq!(&*stored, b"temporary");
    }

    #[test]
    fn test_arena_copies() {
        let arena = DecodeArena::new(64);
        let stored = {
            let buf = b"batch".to_vec();
            let mut storage = &arena;
            storage.store(&buf).unwrap()
        };
        assert_eq!(stored.as_slice(), b"batch");
        assert_eq!(arena.used(), 5);
    }

    #[test]
    fn test_arena_containers_live_in_arena() {
        let arena = DecodeArena::new(1024);
        let mut storage = &arena;
        let mut fields = storage.builder(2).unwrap();
        storage.push(&mut fields, Value::U8(1)).unwrap();
        let inner = storage.slot(Value::U16(2)).unwrap();
        storage.push(&mut fields, Value::Optional(Some(inner))).unwrap();
        let fields = storage.finish(fields);

        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].as_primitive::<u8>(), Some(1));
        let payload = fields[1].as_optional().unwrap().unwrap();
        assert_eq!(payload.as_primitive::<u16>(), Some(2));
        assert_eq!(
            arena.used(),
            slot_bytes::<ArenaValue<'_>>(2) + slot_bytes::<ArenaValue<'_>>(1)
        );
    }

    #[test]
    fn test_heap_containers_are_vec_and_box() {
        let mut storage = Owned;
        let mut items = storage.builder(0).unwrap();
        storage.push(&mut items, Value::Bool(true)).unwrap();
        let items: Vec<_> = storage.finish(items);
        let slot: Box<_> = storage.slot(Value::I8(-1)).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(slot.as_primitive::<i8>(), Some(-1));
    }
}
