//! Chain manager configuration

/// Capacity in bytes of the first block when none is configured.
pub const DEFAULT_BLOCK_CAPACITY: usize = 128;

/// Configuration for chain managers
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Capacity of the first block in bytes.
    pub initial_capacity: usize,

    /// Maximum number of blocks the chain may hold, growth included.
    pub max_blocks: Option<usize>,

    /// Ceiling on the summed capacity of all blocks in bytes.
    pub max_total_bytes: Option<usize>,

    /// Enable statistics tracking
    pub track_stats: bool,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_BLOCK_CAPACITY,
            max_blocks: None,
            max_total_bytes: None,
            track_stats: cfg!(debug_assertions),
        }
    }
}

impl ChainConfig {
    /// Production configuration - no tracking overhead, unbounded growth
    pub fn production() -> Self {
        Self {
            track_stats: false,
            ..Self::default()
        }
    }

    /// Debug configuration - full statistics
    pub fn debug() -> Self {
        Self {
            track_stats: true,
            ..Self::default()
        }
    }

    /// Sets the capacity of the first block
    #[must_use = "builder methods must be chained or built"]
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    /// Caps the number of blocks the chain may grow to
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_blocks(mut self, blocks: usize) -> Self {
        self.max_blocks = Some(blocks);
        self
    }

    /// Caps the summed capacity of all blocks
    #[must_use = "builder methods must be chained or built"]
    pub fn with_max_total_bytes(mut self, bytes: usize) -> Self {
        self.max_total_bytes = Some(bytes);
        self
    }

    /// Enables/disables statistics tracking
    #[must_use = "builder methods must be chained or built"]
    pub fn with_stats(mut self, enabled: bool) -> Self {
        self.track_stats = enabled;
        self
    }
}
