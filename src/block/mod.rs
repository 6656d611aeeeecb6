//! Block-level allocators
//!
//! A block is a single fixed-capacity arena: one contiguous storage
//! allocation and a bump offset. Two flavours are provided:
//!
//! - [`BumpBlock`] - allocate-only; the offset never moves backwards
//! - [`TaggedBlock`] - records a size tag after every allocation so the most
//!   recent one can be popped off again
//!
//! Blocks never relocate their storage: a region returned by allocation
//! stays at the same address for the life of the block.

use core::ptr::NonNull;
use std::alloc::{alloc, Layout};

use crate::error::{MemoryError, Result};

mod bump;
mod tagged;

pub use bump::BumpBlock;
pub use tagged::TaggedBlock;

/// Common surface the chain managers are generic over.
///
/// The growth and shrink policy in [`Chain`](crate::chain::Chain) is written
/// once against this trait rather than per block flavour.
pub trait BlockAlloc {
    /// Per-allocation bookkeeping bytes (the tag width for tagged blocks).
    const OVERHEAD: usize;

    /// Largest single request the block flavour can record, if bounded.
    const MAX_REQUEST: Option<usize>;

    /// Creates a block owning `capacity` bytes of storage.
    fn with_capacity(capacity: usize) -> Result<Self>
    where
        Self: Sized;

    /// Bump-allocates `size` object bytes, or `None` on exhaustion.
    ///
    /// Exhaustion leaves the block untouched; no partial advance occurs.
    fn try_alloc(&mut self, size: usize) -> Option<NonNull<[u8]>>;

    /// True when no allocation is live in the block.
    fn is_empty(&self) -> bool;

    /// Total storage in bytes.
    fn capacity(&self) -> usize;

    /// Bytes consumed so far, bookkeeping included.
    fn used(&self) -> usize;
}

/// Blocks that can undo their most recent allocation.
pub trait PopBlock: BlockAlloc {
    /// Removes the most recent still-live allocation; no-op when empty.
    fn pop(&mut self);
}

/// Allocates `capacity` bytes of byte-aligned raw storage.
///
/// Callers guarantee `capacity > 0`; the matching release happens in the
/// owning block's `Drop` with the same layout.
pub(crate) fn raw_storage(capacity: usize) -> Result<NonNull<u8>> {
    debug_assert!(capacity > 0);

    let layout = Layout::from_size_align(capacity, 1)
        .map_err(|_| MemoryError::invalid_size(capacity, "layout creation failed"))?;

    // SAFETY: Allocating storage via the global allocator.
    // - layout has non-zero size (callers guarantee capacity > 0)
    // - align of 1 is always valid
    // - alloc returns null on failure (handled below)
    let ptr = unsafe { alloc(layout) };
    NonNull::new(ptr).ok_or_else(|| MemoryError::out_of_memory(capacity, 0))
}
