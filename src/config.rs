/// Default initial buffer capacity
pub const DEFAULT_BUFFER_CAP: usize = 35000;

/// Default number of bytes requested from the source per read.
pub const DEFAULT_READ_CHUNK: usize = 4 * 1024;

/// Default upper bound for the buffered bytes of a single part.
pub const DEFAULT_MAX_PART_SIZE: usize = 64 * 1024 * 1024;

/// Default lookahead for the blank line ending a part's header block.
pub const DEFAULT_MAX_HEADER_SIZE: usize = 8 * 1024;

/// Tuning and safety limits for a [`MultipartStreamReader`](crate::MultipartStreamReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderConfig {
    pub buffer_capacity: usize,
    pub read_chunk_size: usize,
    /// Exceeding this while assembling a part fails with `Error::PartTooLarge`.
    pub max_part_size: usize,
    /// A header block must end within this many bytes of the part start.
    pub max_header_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAP,
            read_chunk_size: DEFAULT_READ_CHUNK,
            max_part_size: DEFAULT_MAX_PART_SIZE,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
        }
    }
}

impl ReaderConfig {
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// A chunk size of zero is treated as one byte.
    pub fn with_read_chunk_size(mut self, size: usize) -> Self {
        self.read_chunk_size = size.max(1);
        self
    }

    pub fn with_max_part_size(mut self, limit: usize) -> Self {
        self.max_part_size = limit;
        self
    }

    pub fn with_max_header_size(mut self, limit: usize) -> Self {
        self.max_header_size = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ReaderConfig::default();
        assert_eq!(DEFAULT_BUFFER_CAP, cfg.buffer_capacity);
        assert_eq!(4096, cfg.read_chunk_size);
        assert_eq!(8 * 1024, cfg.max_header_size);
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let cfg = ReaderConfig::default().with_read_chunk_size(0);
        assert_eq!(1, cfg.read_chunk_size);
    }
}
