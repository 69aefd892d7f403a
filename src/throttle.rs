// Chunk throttle - pacing for bounded scatter-gather batches
//
// Batch entry points split work into fixed-size chunks, run each chunk's
// items concurrently, and sleep between chunks as a courtesy to upstream
// rate limits. The pacing lives here, decoupled from classification logic,
// so batch runners receive it as an injected component.

use std::time::Duration;
use tokio::time::sleep;

/// Configuration for batch fan-out
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Items dispatched concurrently per chunk
    pub chunk_size: usize,
    /// Delay inserted between chunks
    pub chunk_delay_ms: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 8,
            chunk_delay_ms: 200,
        }
    }
}

/// Courtesy throttle between chunks of a batch operation
#[derive(Debug, Clone)]
pub struct ChunkThrottle {
    config: BatchConfig,
}

impl ChunkThrottle {
    pub fn new(config: BatchConfig) -> Self {
        // A zero chunk size would make every batch a no-op loop.
        let config = BatchConfig {
            chunk_size: config.chunk_size.max(1),
            ..config
        };
        Self { config }
    }

    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size
    }

    /// Split items into dispatch chunks, preserving input order
    pub fn chunks<T>(&self, items: Vec<T>) -> Vec<Vec<T>> {
        let mut chunks = Vec::new();
        let mut current = Vec::with_capacity(self.config.chunk_size);
        for item in items {
            current.push(item);
            if current.len() == self.config.chunk_size {
                chunks.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Sleep between chunks; no delay after the final chunk
    pub async fn pace(&self, chunk_index: usize, chunk_count: usize) {
        if chunk_index + 1 < chunk_count && self.config.chunk_delay_ms > 0 {
            sleep(Duration::from_millis(self.config.chunk_delay_ms)).await;
        }
    }
}

impl Default for ChunkThrottle {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_preserve_order_and_size() {
        let throttle = ChunkThrottle::new(BatchConfig {
            chunk_size: 5,
            chunk_delay_ms: 0,
        });
        let chunks = throttle.chunks((0..12).collect::<Vec<_>>());
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], vec![0, 1, 2, 3, 4]);
        assert_eq!(chunks[2], vec![10, 11]);
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let throttle = ChunkThrottle::default();
        assert!(throttle.chunks(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn zero_chunk_size_is_clamped() {
        let throttle = ChunkThrottle::new(BatchConfig {
            chunk_size: 0,
            chunk_delay_ms: 0,
        });
        assert_eq!(throttle.chunk_size(), 1);
    }
}
