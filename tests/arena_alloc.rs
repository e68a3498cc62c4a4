//! Arena Allocation Test - arena decode tidak menyentuh global allocator
//!
//! Global allocator di binary test ini menghitung alokasi per thread,
//! sehingga test lain yang jalan paralel tidak ikut terhitung.
//!
//! Usage:
//!   cargo test --test arena_alloc

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use sdp::core::DecodeArena;
use sdp::fixtures::{registry, FixtureMessage, PluginRegistry, WireStruct};
use sdp::protocol::{arena_size, decode_in, decode_owned, encode_to_vec};
use sdp::DecodeOptions;

struct CountingAlloc;

thread_local! {
    static TRACKING: Cell<bool> = const { Cell::new(false) };
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

fn record() {
    if TRACKING.try_with(Cell::get).unwrap_or(false) {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
    }
}

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        record();
        System.alloc(layout)
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        record();
        System.alloc_zeroed(layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        record();
        System.realloc(ptr, layout, new_size)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

/// Jalankan `f` dan hitung alokasi heap di thread ini
fn heap_allocations<T>(f: impl FnOnce() -> T) -> (T, usize) {
    ALLOCATIONS.with(|n| n.set(0));
    TRACKING.with(|t| t.set(true));
    let out = f();
    TRACKING.with(|t| t.set(false));
    (out, ALLOCATIONS.with(Cell::get))
}

#[test]
fn test_arena_decode_stays_off_the_heap() {
    let sample = PluginRegistry::sample(2, 3);
    let expected = sample.to_value();
    let bytes = sample.to_bytes().unwrap();
    let schema = PluginRegistry::schema();
    let arena = DecodeArena::default();

    let (decoded, count) =
        heap_allocations(|| decode_in(&schema, &bytes, &arena, DecodeOptions::default()));
    let decoded = decoded.unwrap();
    assert_eq!(count, 0, "arena decode allocated on the heap");
    assert!(decoded == expected);
    assert_eq!(arena.used(), arena_size(&expected));

    // Counter memang melihat alokasi: owned decode wajib ke heap
    let (owned, count) = heap_allocations(|| decode_owned(&schema, &bytes));
    assert!(owned.unwrap() == expected);
    assert!(count > 0);
}

#[test]
fn test_every_fixture_decodes_in_arena_without_heap() {
    let registry = registry().unwrap();
    let mut arena = DecodeArena::default();
    for (name, sample) in FixtureMessage::samples() {
        let schema = registry.get(sample.type_id()).unwrap();
        let expected = sample.to_value();
        let bytes = encode_to_vec(&expected).unwrap();
        {
            let (decoded, count) =
                heap_allocations(|| decode_in(schema, &bytes, &arena, DecodeOptions::default()));
            assert_eq!(count, 0, "{name}");
            assert!(decoded.unwrap() == expected, "{name}");
        }
        arena.reset();
    }
}
