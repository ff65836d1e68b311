/// Progress update interval (tick every N pages)
pub const PROGRESS_INTERVAL: u64 = 1000;

/// Maximum depth for following redirect chains during finalization
pub const REDIRECT_MAX_DEPTH: u32 = 5;

/// Buffer size for the edge-list and node-title writers
pub const WRITER_BUFFER_SIZE: usize = 128 * 1024;

/// Pre-size hint for the title registry
pub const TITLE_CAPACITY_HINT: usize = 1 << 20;
