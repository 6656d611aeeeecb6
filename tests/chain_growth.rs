//! Integration tests for the chain managers

use core::ptr::NonNull;

use bumpstack::{BumpChain, ChainConfig, MemoryError, TaggedChain};

fn addr(region: NonNull<[u8]>) -> usize {
    region.cast::<u8>().as_ptr() as usize
}

#[test]
fn chain_grows_when_block_exhausted() {
    let mut chain = BumpChain::with_initial_capacity(35).unwrap();

    let x = chain.allocate(8).unwrap();
    let y = chain.allocate(8).unwrap();
    chain.allocate(2).unwrap();
    chain.allocate(8).unwrap();
    chain.allocate(2).unwrap();
    assert_eq!(addr(y) - addr(x), 8);
    assert_eq!(chain.block_count(), 1);
    assert_eq!(chain.used(), 28);

    // Another 8 bytes does not fit the first block; a 70-byte block is
    // appended and serves the request.
    chain.allocate(8).unwrap();
    assert_eq!(chain.block_count(), 2);
    assert_eq!(chain.capacity(), 35 + 70);
    assert_eq!(chain.used(), 36);
}

#[test]
fn capacity_doubles_per_appended_block() {
    let mut chain = BumpChain::with_initial_capacity(16).unwrap();
    chain.allocate(16).unwrap(); // fills block 1
    chain.allocate(32).unwrap(); // appends and fills a 32-byte block
    chain.allocate(64).unwrap(); // appends and fills a 64-byte block
    chain.allocate(128).unwrap(); // appends a 128-byte block

    assert_eq!(chain.block_count(), 4);
    assert_eq!(chain.capacity(), 16 + 32 + 64 + 128);
}

#[test]
fn oversized_request_fails_without_appending() {
    let mut chain = TaggedChain::<u8>::with_initial_capacity(16).unwrap();

    // 32 object bytes plus the tag exceed even a freshly doubled block.
    assert!(matches!(
        chain.allocate(32),
        Err(MemoryError::OutOfMemory { .. })
    ));
    assert_eq!(chain.block_count(), 1);
    assert_eq!(chain.capacity(), 16);
    assert_eq!(chain.used(), 0);

    // The widest fitting request still grows and succeeds.
    chain.allocate(31).unwrap();
    assert_eq!(chain.block_count(), 2);
}

#[test]
fn growth_is_rejected_beyond_max_blocks() {
    let mut chain = BumpChain::with_config(
        ChainConfig::default()
            .with_initial_capacity(16)
            .with_max_blocks(2),
    )
    .unwrap();

    chain.allocate(16).unwrap(); // fills block 1
    chain.allocate(32).unwrap(); // appends and fills block 2
    assert_eq!(chain.block_count(), 2);

    let err = chain.allocate(1).unwrap_err();
    assert_eq!(err, MemoryError::budget_exceeded(2, 3));
    assert_eq!(chain.block_count(), 2);
}

#[test]
fn growth_is_rejected_beyond_total_bytes() {
    let mut chain = BumpChain::with_config(
        ChainConfig::default()
            .with_initial_capacity(16)
            .with_max_total_bytes(40),
    )
    .unwrap();

    chain.allocate(16).unwrap();
    let err = chain.allocate(1).unwrap_err();
    assert_eq!(err, MemoryError::budget_exceeded(40, 48));
    assert_eq!(chain.capacity(), 16);
}

#[test]
fn tagged_chain_grow_and_unwind() {
    let mut chain = TaggedChain::<u8>::with_initial_capacity(36).unwrap();

    let x = chain.allocate(8).unwrap();
    let y = chain.allocate(8).unwrap();
    let z = chain.allocate(2).unwrap();
    let a = chain.allocate(4).unwrap();
    let c = chain.allocate(2).unwrap();
    assert_eq!(addr(y) - addr(x), 9);
    assert_eq!(addr(z) - addr(y), 9);
    assert_eq!(addr(a) - addr(z), 3);
    assert_eq!(addr(c) - addr(a), 5);
    assert_eq!(chain.used(), 29);

    let _b = chain.allocate(8).unwrap(); // appends a 72-byte block
    assert_eq!(chain.block_count(), 2);

    chain.pop(); // undoes b; the emptied block is released
    assert_eq!(chain.block_count(), 1);
    chain.pop(); // undoes c
    chain.pop(); // undoes a
    assert_eq!(chain.used(), 21);

    let a2 = chain.allocate(4).unwrap();
    assert_eq!(addr(a2), addr(a));
}

#[test]
fn one_block_released_per_pop_call() {
    let mut chain = TaggedChain::<u8>::with_initial_capacity(8).unwrap();
    chain.allocate(7).unwrap(); // fills block 1
    chain.allocate(15).unwrap(); // appends and fills a 16-byte block
    chain.allocate(31).unwrap(); // appends and fills a 32-byte block
    assert_eq!(chain.block_count(), 3);

    chain.pop();
    assert_eq!(chain.block_count(), 2);
    chain.pop();
    assert_eq!(chain.block_count(), 1);
    chain.pop();
    assert_eq!(chain.block_count(), 1);
    assert!(chain.is_empty());
}

#[test]
fn first_block_survives_any_number_of_pops() {
    let mut chain = TaggedChain::<u8>::with_initial_capacity(36).unwrap();
    let x = chain.allocate(8).unwrap();
    chain.allocate(4).unwrap();
    chain.allocate(8).unwrap();

    for _ in 0..100 {
        chain.pop();
    }
    assert_eq!(chain.block_count(), 1);
    assert!(chain.is_empty());

    // The emptied block still serves allocations in place.
    let x2 = chain.allocate(1).unwrap();
    let y2 = chain.allocate(4).unwrap();
    assert_eq!(addr(x2), addr(x));
    assert_eq!(addr(y2) - addr(x2), 2);
}

#[test]
fn typed_allocation_equals_sizeof() {
    let mut chain = BumpChain::with_initial_capacity(64).unwrap();
    let p = chain.allocate_uninit::<u64>().unwrap();
    assert_eq!(chain.used(), core::mem::size_of::<u64>());

    unsafe { p.as_ptr().write_unaligned(42) };
}

#[test]
fn stats_record_growth_and_pops() {
    let mut chain =
        TaggedChain::<u8>::with_config(ChainConfig::debug().with_initial_capacity(8)).unwrap();

    chain.allocate(7).unwrap();
    chain.allocate(7).unwrap(); // grows to 16
    assert_eq!(chain.stats().allocations(), 2);
    assert_eq!(chain.stats().blocks_grown(), 1);
    assert_eq!(chain.stats().peak_used(), 16);

    chain.pop(); // releases the grown block
    chain.pop();
    assert_eq!(chain.stats().pops(), 2);
    assert_eq!(chain.stats().blocks_released(), 1);

    assert!(chain.allocate(300).is_err());
    assert_eq!(chain.stats().failed_allocations(), 1);
}
