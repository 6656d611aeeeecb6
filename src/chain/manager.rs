//! Chain managers: growable stacks of blocks
//!
//! A chain owns an ordered sequence of blocks and always allocates from the
//! last one. When the tail is exhausted the chain appends one new block of
//! double the capacity of the previous one and satisfies the request there.
//! Popping chains additionally release the tail block once a pop empties it,
//! halving the capacity counter back, so grow/shrink sequences stay
//! symmetric.
//!
//! ## Invariants
//!
//! - The block list is never empty; the first block is never released
//! - Allocation never re-enters an earlier block
//! - The capacity counter always equals the capacity the current tail block
//!   was created with: it doubles on growth and halves when an emptied tail
//!   is released
//! - A failed allocation leaves the chain byte-for-byte unchanged

use core::ptr::NonNull;

use tracing::{debug, trace};

use crate::block::{BlockAlloc, BumpBlock, PopBlock, TaggedBlock};
use crate::error::{MemoryError, Result};

use super::{ChainConfig, ChainStats};

/// Growable bump allocator without deallocation support.
pub type BumpChain = Chain<BumpBlock>;

/// Growable stack allocator with LIFO pop, tagged with encoding `S`.
pub type TaggedChain<S = u16> = Chain<TaggedBlock<S>>;

/// A stack-discipline allocator chaining progressively larger blocks.
///
/// The growth policy is written once, generic over the block flavour;
/// [`BumpChain`] and [`TaggedChain`] are the two instantiations. Regions
/// returned by earlier allocations are never moved by growth - only a
/// shrink (popping chains) or dropping the chain invalidates them.
///
/// Move-only and single-threaded, like the blocks it manages.
pub struct Chain<B: BlockAlloc> {
    /// Blocks in creation order; allocation targets the last.
    blocks: Vec<B>,
    /// Capacity the tail block was created with.
    block_capacity: usize,
    config: ChainConfig,
    stats: ChainStats,
}

impl<B: BlockAlloc> Chain<B> {
    /// Creates a chain whose first block has the default capacity.
    pub fn new() -> Result<Self> {
        Self::with_config(ChainConfig::default())
    }

    /// Creates a chain whose first block has `capacity` bytes.
    pub fn with_initial_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(ChainConfig::default().with_initial_capacity(capacity))
    }

    /// Creates a chain with custom configuration.
    pub fn with_config(config: ChainConfig) -> Result<Self> {
        if config.initial_capacity == 0 {
            return Err(MemoryError::invalid_size(0, "initial capacity cannot be zero"));
        }

        let block_capacity = config.initial_capacity;
        let first = B::with_capacity(block_capacity)?;

        Ok(Self {
            blocks: vec![first],
            block_capacity,
            config,
            stats: ChainStats::default(),
        })
    }

    /// Allocates `size` bytes of raw storage, growing the chain on demand.
    ///
    /// The tail block is tried first; on exhaustion one new block of double
    /// the current capacity counter is appended and the request is satisfied
    /// there. Growth is one-shot per call: a request that cannot fit even a
    /// freshly doubled empty block fails with [`MemoryError::OutOfMemory`]
    /// without appending anything. Requests beyond a configured
    /// [`max_blocks`](ChainConfig::max_blocks) or
    /// [`max_total_bytes`](ChainConfig::max_total_bytes) ceiling fail with
    /// [`MemoryError::BudgetExceeded`], and requests a tagged chain cannot
    /// record fail with [`MemoryError::TagOverflow`] before any growth.
    pub fn allocate(&mut self, size: usize) -> Result<NonNull<[u8]>> {
        if size == 0 {
            let err = MemoryError::invalid_size(0, "zero-sized requests are not supported");
            return Err(self.reject(err));
        }
        if let Some(max) = B::MAX_REQUEST {
            if size > max {
                return Err(self.reject(MemoryError::tag_overflow(size, max)));
            }
        }

        if let Some(region) = self.tail().try_alloc(size) {
            self.note_allocation();
            return Ok(region);
        }

        match self.grow(size) {
            Ok(()) => {}
            Err(err) => return Err(self.reject(err)),
        }

        match self.tail().try_alloc(size) {
            Some(region) => {
                self.note_allocation();
                Ok(region)
            }
            // Unreachable given the pre-flight check in grow(), but surfaced
            // as a failure rather than a panic.
            None => {
                let err = MemoryError::out_of_memory(size, self.available());
                Err(self.reject(err))
            }
        }
    }

    /// Allocates storage sized for a `T`.
    ///
    /// Equivalent to `allocate(size_of::<T>())`; the storage is
    /// uninitialized and byte-aligned only, and zero-sized types are
    /// rejected.
    pub fn allocate_uninit<T>(&mut self) -> Result<NonNull<T>> {
        self.allocate(core::mem::size_of::<T>()).map(NonNull::cast)
    }

    /// True when no allocation is live in any block.
    pub fn is_empty(&self) -> bool {
        self.blocks.iter().all(|block| block.is_empty())
    }

    /// Summed capacity of all blocks in bytes.
    pub fn capacity(&self) -> usize {
        self.blocks.iter().map(|block| block.capacity()).sum()
    }

    /// Summed bytes consumed across all blocks, bookkeeping included.
    pub fn used(&self) -> usize {
        self.blocks.iter().map(|block| block.used()).sum()
    }

    /// Bytes still allocatable in the active block, before any growth.
    pub fn available(&self) -> usize {
        self.blocks
            .last()
            .map(|block| block.capacity() - block.used())
            .unwrap_or(0)
    }

    /// Number of blocks currently chained.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the recorded statistics.
    pub fn stats(&self) -> &ChainStats {
        &self.stats
    }

    /// Appends one block of double the current capacity counter.
    fn grow(&mut self, size: usize) -> Result<()> {
        let required = size + B::OVERHEAD;
        let grown = self
            .block_capacity
            .checked_mul(2)
            .ok_or_else(|| MemoryError::out_of_memory(required, self.available()))?;

        // Growth is one-shot: a request that cannot fit a freshly doubled
        // empty block fails here, before any block is appended.
        if required > grown {
            debug!(
                requested = size,
                grown_capacity = grown,
                "request exceeds even a freshly grown block"
            );
            return Err(MemoryError::out_of_memory(required, grown));
        }

        if let Some(max) = self.config.max_blocks {
            let attempted = self.blocks.len() + 1;
            if attempted > max {
                debug!(max_blocks = max, "growth ceiling reached");
                return Err(MemoryError::budget_exceeded(max, attempted));
            }
        }
        if let Some(max) = self.config.max_total_bytes {
            let attempted = self.capacity().saturating_add(grown);
            if attempted > max {
                debug!(max_total_bytes = max, attempted, "growth ceiling reached");
                return Err(MemoryError::budget_exceeded(max, attempted));
            }
        }

        self.blocks.push(B::with_capacity(grown)?);
        self.block_capacity = grown;

        if self.config.track_stats {
            self.stats.record_growth();
        }
        trace!(
            capacity = grown,
            blocks = self.blocks.len(),
            "appended block"
        );
        Ok(())
    }

    #[inline]
    fn tail(&mut self) -> &mut B {
        // Constructed with one block and shrink never removes the last one,
        // so the list is never empty.
        self.blocks.last_mut().expect("chain holds at least one block")
    }

    fn note_allocation(&mut self) {
        if self.config.track_stats {
            let used = self.used();
            self.stats.record_allocation(used);
        }
    }

    fn reject(&mut self, err: MemoryError) -> MemoryError {
        if self.config.track_stats {
            self.stats.record_failure();
        }
        err
    }
}

impl<B: PopBlock> Chain<B> {
    /// Removes the most recent still-live allocation.
    ///
    /// Delegates to the tail block, then releases that block if the pop
    /// emptied it and more than one block remains, halving the capacity
    /// counter back. At most one block is released per call; the first
    /// block is never released, so an emptied chain still serves subsequent
    /// allocations in place. Always safe to call, including on an empty
    /// chain.
    pub fn pop(&mut self) {
        let tail = self.tail();
        let was_empty = tail.is_empty();
        tail.pop();

        if !was_empty && self.config.track_stats {
            self.stats.record_pop();
        }

        self.release_tail_if_empty();
    }

    /// Releases the tail block if a pop just emptied it.
    fn release_tail_if_empty(&mut self) {
        if self.blocks.len() < 2 {
            return;
        }
        if self.blocks.last().is_some_and(|block| block.is_empty()) {
            self.blocks.pop();
            self.block_capacity /= 2;

            if self.config.track_stats {
                self.stats.record_release();
            }
            trace!(
                capacity = self.block_capacity,
                blocks = self.blocks.len(),
                "released emptied tail block"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_appends_one_doubled_block() {
        let mut chain = BumpChain::with_initial_capacity(16).unwrap();
        chain.allocate(16).unwrap();
        assert_eq!(chain.block_count(), 1);

        chain.allocate(4).unwrap();
        assert_eq!(chain.block_count(), 2);
        assert_eq!(chain.capacity(), 16 + 32);
    }

    #[test]
    fn oversized_request_fails_without_growth() {
        let mut chain = BumpChain::with_initial_capacity(16).unwrap();

        let err = chain.allocate(100).unwrap_err();
        assert_eq!(err, MemoryError::out_of_memory(100, 32));
        assert_eq!(chain.block_count(), 1);
        assert_eq!(chain.capacity(), 16);
    }

    #[test]
    fn pop_releases_at_most_one_block() {
        let mut chain = TaggedChain::<u8>::with_initial_capacity(8).unwrap();
        chain.allocate(7).unwrap(); // fills block 1
        chain.allocate(15).unwrap(); // grows to 16, fills block 2
        chain.allocate(31).unwrap(); // grows to 32, fills block 3
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
    fn counter_regrows_to_released_capacity() {
        let mut chain = TaggedChain::<u8>::with_initial_capacity(8).unwrap();
        chain.allocate(7).unwrap();
        chain.allocate(15).unwrap();
        assert_eq!(chain.capacity(), 8 + 16);

        chain.pop(); // empties and releases the 16-byte block
        assert_eq!(chain.capacity(), 8);

        // The next growth recreates the same capacity it released.
        chain.allocate(15).unwrap();
        assert_eq!(chain.capacity(), 8 + 16);
    }
}
