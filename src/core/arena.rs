//! Decode Arena: bump allocator per decode batch
//!
//! Seluruh hasil decode tinggal di satu region bumpalo: bytes variable-length
//! (string, array primitif), field struct, element array, dan payload
//! optional. Free dilakukan sekaligus via `reset()`, bukan per node.
//!
//! Setiap alokasi dihitung terhadap `capacity` sebelum menyentuh bump,
//! termasuk padding alignment, jadi decode yang muat tidak pernah meminta
//! chunk baru ke global allocator.
//!
//! Arena bukan `Sync`: satu arena per batch, jangan di-share antar
//! thread yang decode bersamaan.

use std::cell::Cell;
use std::fmt;
use std::mem::{align_of, size_of};
use std::ops::Deref;

use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;

use crate::error::{Result, WireError};

/// Kapasitas default satu batch (1MB)
pub const DEFAULT_ARENA_CAPACITY: usize = 1024 * 1024;

/// Bump arena dengan kapasitas terbatas
pub struct DecodeArena {
    bump: Bump,
    capacity: usize,
    used: Cell<usize>,
}

/// Bytes variable-length yang di-copy ke `DecodeArena`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaBytes<'arena>(&'arena [u8]);

impl<'arena> ArenaBytes<'arena> {
    #[inline(always)]
    pub fn as_slice(&self) -> &'arena [u8] {
        self.0
    }
}

impl AsRef<[u8]> for ArenaBytes<'_> {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        self.0
    }
}

impl Deref for ArenaBytes<'_> {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        self.0
    }
}

impl Default for DecodeArena {
    fn default() -> Self {
        Self::new(DEFAULT_ARENA_CAPACITY)
    }
}

impl DecodeArena {
    /// Alokasi region sekali saat inisialisasi
    pub fn new(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
            capacity,
            used: Cell::new(0),
        }
    }

    /// Copy `src` ke arena
    ///
    /// Gagal dengan `AllocationFailure` jika kapasitas batch habis.
    #[inline]
    pub fn alloc_bytes(&self, src: &[u8]) -> Result<ArenaBytes<'_>> {
        self.charge(src.len())?;
        Ok(ArenaBytes(self.bump.alloc_slice_copy(src)))
    }

    /// Pindahkan satu value ke arena
    #[inline]
    pub fn alloc<T>(&self, value: T) -> Result<&T> {
        self.charge(slot_bytes::<T>(1))?;
        Ok(self.bump.alloc(value))
    }

    /// Vec di dalam arena dengan ruang untuk `capacity` item
    pub fn vec_with_capacity<T>(&self, capacity: usize) -> Result<BumpVec<'_, T>> {
        self.charge(slot_bytes::<T>(capacity))?;
        Ok(BumpVec::with_capacity_in(capacity, &self.bump))
    }

    /// Push ke Vec arena; pertumbuhan buffer ikut dihitung
    #[inline]
    pub fn push_to<'a, T>(&'a self, vec: &mut BumpVec<'a, T>, item: T) -> Result<()> {
        if vec.len() == vec.capacity() {
            let additional = vec.capacity().max(1);
            self.charge(slot_bytes::<T>(vec.capacity() + additional))?;
            vec.reserve_exact(additional);
        }
        vec.push(item);
        Ok(())
    }

    fn charge(&self, requested: usize) -> Result<()> {
        let used = self.used.get();
        let remaining = self.capacity - used;
        if requested > remaining {
            return Err(WireError::AllocationFailure {
                requested,
                remaining,
            });
        }
        self.used.set(used + requested);
        Ok(())
    }

    #[inline(always)]
    pub fn used(&self) -> usize {
        self.used.get()
    }

    #[inline(always)]
    pub fn remaining(&self) -> usize {
        self.capacity - self.used.get()
    }

    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reset seluruh batch; `&mut self` menjamin tidak ada value yang masih meminjam
    pub fn reset(&mut self) {
        self.bump.reset();
        self.used.set(0);
    }
}

/// Bytes yang dihitung untuk `count` item bertipe `T`, termasuk padding terburuk
#[inline(always)]
pub(crate) fn slot_bytes<T>(count: usize) -> usize {
    if count == 0 || size_of::<T>() == 0 {
        return 0;
    }
    count
        .saturating_mul(size_of::<T>())
        .saturating_add(align_of::<T>() - 1)
}

impl fmt::Debug for DecodeArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeArena")
            .field("capacity", &self.capacity)
            .field("used", &self.used.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_alloc_and_account() {
        let arena = DecodeArena::new(16);
        let a = arena.alloc_bytes(b"hello").unwrap();
        let b = arena.alloc_bytes(b"world!").unwrap();
        assert_eq!(&*a, b"hello");
        assert_eq!(b.as_slice(), b"world!");
        assert_eq!(arena.used(), 11);
        assert_eq!(arena.remaining(), 5);
    }

    #[test]
    fn test_exhaustion() {
        let arena = DecodeArena::new(4);
        arena.alloc_bytes(b"abc").unwrap();
        let err = arena.alloc_bytes(b"de").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailure);
    }

    #[test]
    fn test_reset_reuses_capacity() {
        let mut arena = DecodeArena::new(4);
        arena.alloc_bytes(b"abcd").unwrap();
        assert_eq!(arena.remaining(), 0);
        arena.reset();
        assert_eq!(arena.used(), 0);
        assert_eq!(arena.alloc_bytes(b"wxyz").unwrap().as_slice(), b"wxyz");
    }

    #[test]
    fn test_typed_allocations_are_charged() {
        let arena = DecodeArena::new(256);
        let slot = arena.alloc(7u64).unwrap();
        assert_eq!(*slot, 7);
        assert_eq!(arena.used(), slot_bytes::<u64>(1));

        let before = arena.used();
        let mut vec = arena.vec_with_capacity::<u32>(2).unwrap();
        assert_eq!(arena.used() - before, slot_bytes::<u32>(2));
        for i in 0..3 {
            arena.push_to(&mut vec, i).unwrap();
        }
        // Tumbuh dari 2 ke 4 slot
        assert_eq!(arena.used() - before, slot_bytes::<u32>(2) + slot_bytes::<u32>(4));
        assert_eq!(vec.into_bump_slice(), &[0u32, 1, 2]);
    }

    #[test]
    fn test_typed_exhaustion() {
        let arena = DecodeArena::new(8);
        let err = arena.vec_with_capacity::<u64>(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AllocationFailure);
        assert_eq!(arena.used(), 0);

        let mut vec = arena.vec_with_capacity::<u8>(0).unwrap();
        for i in 0..4u8 {
            arena.push_to(&mut vec, i).unwrap();
        }
        assert!(arena.push_to(&mut vec, 4).is_err());
    }
}
