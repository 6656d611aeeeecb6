//! Stack-discipline bump allocators with chained growth and LIFO pop
//!
//! This crate provides a small family of allocators built from three
//! composable pieces:
//!
//! - [`BumpBlock`] - a fixed-capacity arena that allocates by advancing a
//!   monotonic offset and reports exhaustion as a failure value
//! - [`TaggedBlock`] - the same block with a size tag written after every
//!   allocation, so the most recent one can be popped off again
//! - [`Chain`] - a manager owning an ordered sequence of blocks that grows
//!   by appending a block of double the previous capacity, instantiated as
//!   [`BumpChain`] (growth only) and [`TaggedChain`] (growth plus pop with
//!   shrink-on-empty)
//!
//! All types hand out raw, uninitialized, byte-aligned storage: no
//! constructors or destructors are run on allocated regions, and any
//! alignment a caller needs is the caller's business. Everything is
//! single-threaded and move-only by construction.
//!
//! # Example
//!
//! ```
//! use bumpstack::{ChainConfig, TaggedChain};
//!
//! # fn main() -> bumpstack::Result<()> {
//! let mut stack = TaggedChain::<u16>::with_config(
//!     ChainConfig::default().with_initial_capacity(64),
//! )?;
//!
//! let _a = stack.allocate(16)?;
//! let _b = stack.allocate(16)?;
//! assert!(!stack.is_empty());
//!
//! stack.pop(); // undoes b
//! stack.pop(); // undoes a
//! assert!(stack.is_empty());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod block;
pub mod chain;
pub mod error;
pub mod tag;

// Re-export common types for convenience
pub use block::{BlockAlloc, BumpBlock, PopBlock, TaggedBlock};
pub use chain::{BumpChain, Chain, ChainConfig, ChainStats, TaggedChain, DEFAULT_BLOCK_CAPACITY};
pub use error::{MemoryError, Result};
pub use tag::SizeTag;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
