//! Error types for allocator operations

/// Result type for allocator operations
pub type Result<T> = core::result::Result<T, MemoryError>;

/// Errors reported by blocks and chain managers.
///
/// Allocation failure is reported as a value rather than a panic: the chain
/// managers probe the active block, possibly grow, and retry, so the failing
/// path must stay cheap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// Insufficient remaining capacity for the request, tag overhead
    /// included, even after any growth the allocator was allowed to perform.
    #[error("out of memory: requested {requested} bytes, {available} available")]
    OutOfMemory {
        /// Bytes the caller asked for.
        requested: usize,
        /// Bytes still allocatable without further growth.
        available: usize,
    },

    /// The request is larger than the size tag can record.
    #[error("size tag too narrow: {requested} bytes exceeds tag maximum of {max}")]
    TagOverflow {
        /// Bytes the caller asked for.
        requested: usize,
        /// Largest byte length the tag encoding can represent.
        max: usize,
    },

    /// A configured growth ceiling would be exceeded.
    #[error("memory budget exceeded: limit {limit}, attempted {attempted}")]
    BudgetExceeded {
        /// The configured ceiling.
        limit: usize,
        /// The value the operation would have reached.
        attempted: usize,
    },

    /// Invalid size
    #[error("invalid size {size}: {reason}")]
    InvalidSize {
        /// The offending size.
        size: usize,
        /// Why the size was rejected.
        reason: &'static str,
    },
}

impl MemoryError {
    /// Create an out of memory error
    pub fn out_of_memory(requested: usize, available: usize) -> Self {
        Self::OutOfMemory {
            requested,
            available,
        }
    }

    /// Create a tag overflow error
    pub fn tag_overflow(requested: usize, max: usize) -> Self {
        Self::TagOverflow { requested, max }
    }

    /// Create a budget exceeded error
    pub fn budget_exceeded(limit: usize, attempted: usize) -> Self {
        Self::BudgetExceeded { limit, attempted }
    }

    /// Create an invalid size error
    pub fn invalid_size(size: usize, reason: &'static str) -> Self {
        Self::InvalidSize { size, reason }
    }
}
