//! Splits an object into copy parts

use s3shift_core::config::TransferConfig;
use s3shift_core::types::{PartPlan, PartSpec};
use s3shift_core::{Error, Result, MAX_PARTS};

/// Chunk size selection by object size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPolicy {
    pub default_chunk_size: u64,
    pub large_chunk_size: u64,
    pub large_object_threshold: u64,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            default_chunk_size: s3shift_core::DEFAULT_CHUNK_SIZE,
            large_chunk_size: s3shift_core::LARGE_CHUNK_SIZE,
            large_object_threshold: s3shift_core::LARGE_OBJECT_THRESHOLD,
        }
    }
}

impl From<&TransferConfig> for ChunkPolicy {
    fn from(config: &TransferConfig) -> Self {
        Self {
            default_chunk_size: config.default_chunk_size,
            large_chunk_size: config.large_chunk_size,
            large_object_threshold: config.large_object_threshold,
        }
    }
}

impl ChunkPolicy {
    /// Same chunk size regardless of object size
    pub fn fixed(chunk_size: u64) -> Self {
        Self {
            default_chunk_size: chunk_size,
            large_chunk_size: chunk_size,
            large_object_threshold: u64::MAX,
        }
    }

    pub fn chunk_size_for(&self, size: u64) -> u64 {
        if size > self.large_object_threshold {
            self.large_chunk_size
        } else {
            self.default_chunk_size
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChunkPlanner {
    policy: ChunkPolicy,
}

impl ChunkPlanner {
    pub fn new(policy: ChunkPolicy) -> Self {
        Self { policy }
    }

    /// Parts covering `[0, size)` with inclusive byte ranges
    ///
    /// A size that fits in one chunk yields a single part. An exact multiple
    /// of the chunk size yields no empty trailing part. Size 0 yields an
    /// empty plan.
    pub fn plan(&self, size: u64) -> Result<PartPlan> {
        let chunk_size = self.policy.chunk_size_for(size);
        if chunk_size == 0 {
            return Err(Error::InvalidArgument(
                "chunk size must be greater than zero".into(),
            ));
        }

        let total_chunks = size / chunk_size;
        let remainder = size % chunk_size;
        let part_count = total_chunks + u64::from(remainder > 0);
        if part_count > u64::from(MAX_PARTS) {
            return Err(Error::TooManyParts {
                parts: part_count,
                limit: MAX_PARTS,
            });
        }

        let parts = (0..part_count)
            .map(|i| PartSpec {
                part_number: i as u32 + 1,
                range_start: i * chunk_size,
                range_end: (i + 1).saturating_mul(chunk_size).min(size) - 1,
            })
            .collect();

        Ok(PartPlan {
            total_size: size,
            chunk_size,
            parts,
        })
    }
}
