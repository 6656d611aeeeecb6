//! Fixed-capacity bump block
//!
//! # Safety
//!
//! This module implements the allocate-only block:
//! - Storage is one contiguous allocation, created in `new` and released
//!   exactly once in `Drop`
//! - Addressing is index-based: the offset is the single source of truth,
//!   pointers are derived from it on demand
//!
//! ## Invariants
//!
//! - `0 <= offset <= capacity` at all times
//! - Failure paths never advance the offset
//! - Storage never relocates; returned regions stay valid for the life of
//!   the block

use core::ptr::NonNull;
use std::alloc::{dealloc, Layout};

use crate::error::{MemoryError, Result};

use super::{raw_storage, BlockAlloc};

/// A single fixed-capacity arena with a bump offset.
///
/// Allocation advances a monotonic offset; individual regions are never
/// reclaimed. Exhaustion is reported as an error value, keeping the
/// try-then-grow path of the chain managers free of unwinding.
///
/// # Memory layout
/// ```text
/// [start]--[alloc 1]--[alloc 2]--[offset]----free----[capacity]
/// ```
///
/// The type is move-only and single-threaded: it cannot be cloned, and the
/// owning raw pointer keeps it `!Send + !Sync`.
pub struct BumpBlock {
    /// Owned storage, sized exactly to `capacity`.
    ptr: NonNull<u8>,
    capacity: usize,
    /// Bytes consumed; only ever grows.
    offset: usize,
}

impl BumpBlock {
    /// Creates a block owning `capacity` bytes.
    ///
    /// Fails on a zero capacity or when the system allocator cannot provide
    /// the storage.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(MemoryError::invalid_size(0, "capacity cannot be zero"));
        }

        let ptr = raw_storage(capacity)?;
        Ok(Self {
            ptr,
            capacity,
            offset: 0,
        })
    }

    /// Allocates `size` bytes of raw storage.
    ///
    /// The returned region is uninitialized and byte-aligned only; placing
    /// a typed value there, including any alignment handling, is the
    /// caller's responsibility. The region stays valid until the block is
    /// dropped.
    ///
    /// Fails with [`MemoryError::OutOfMemory`] when `size` exceeds the
    /// remaining capacity and with [`MemoryError::InvalidSize`] for a
    /// zero-sized request; neither failure consumes any capacity.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<[u8]>> {
        if size == 0 {
            return Err(MemoryError::invalid_size(
                0,
                "zero-sized requests are not supported",
            ));
        }

        self.try_alloc(size)
            .ok_or_else(|| MemoryError::out_of_memory(size, self.available()))
    }

    /// Allocates storage sized for a `T`.
    ///
    /// Equivalent to `allocate(size_of::<T>())`. The storage is
    /// uninitialized and not necessarily aligned for `T`; constructing a
    /// value there is the caller's job. Zero-sized types are rejected.
    pub fn allocate_uninit<T>(&mut self) -> Result<NonNull<T>> {
        self.allocate(core::mem::size_of::<T>()).map(NonNull::cast)
    }

    /// Hot-path allocation: `None` on exhaustion, no error construction.
    #[inline]
    pub(crate) fn try_alloc(&mut self, size: usize) -> Option<NonNull<[u8]>> {
        debug_assert!(size > 0);

        if size > self.capacity - self.offset {
            return None;
        }

        // SAFETY: Deriving the region pointer from the offset.
        // - offset + size <= capacity (checked above), so the region lies
        //   inside the block's storage
        // - ptr is valid for the whole capacity (allocated in new())
        // - The result of add() is therefore non-null
        let region = unsafe { NonNull::new_unchecked(self.ptr.as_ptr().add(self.offset)) };
        self.offset += size;

        Some(NonNull::slice_from_raw_parts(region, size))
    }

    /// True when nothing has been allocated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.offset == 0
    }

    /// Total storage in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes consumed so far.
    #[inline]
    pub fn used(&self) -> usize {
        self.offset
    }

    /// Bytes still allocatable.
    #[inline]
    pub fn available(&self) -> usize {
        self.capacity - self.offset
    }
}

impl BlockAlloc for BumpBlock {
    const OVERHEAD: usize = 0;
    const MAX_REQUEST: Option<usize> = None;

    fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(capacity)
    }

    fn try_alloc(&mut self, size: usize) -> Option<NonNull<[u8]>> {
        BumpBlock::try_alloc(self, size)
    }

    fn is_empty(&self) -> bool {
        BumpBlock::is_empty(self)
    }

    fn capacity(&self) -> usize {
        BumpBlock::capacity(self)
    }

    fn used(&self) -> usize {
        BumpBlock::used(self)
    }
}

impl Drop for BumpBlock {
    fn drop(&mut self) {
        // SAFETY: Releasing the block's storage.
        // - ptr was allocated in new() via raw_storage with this exact
        //   size and align of 1
        // - Drop runs exactly once; the type is move-only, so the storage
        //   has a single owner
        unsafe {
            dealloc(
                self.ptr.as_ptr(),
                Layout::from_size_align_unchecked(self.capacity, 1),
            );
        }
    }
}
