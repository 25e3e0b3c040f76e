//! s3shift Core Library
//!
//! Core types, error taxonomy and configuration shared by the s3shift
//! object-copy crates.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use config::ShiftConfig;
pub use error::{Error, Result};

/// s3shift version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default S3 region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Maximum number of parts in multipart upload
pub const MAX_PARTS: u32 = 10_000;

/// Minimum part size (5 MiB)
pub const MIN_PART_SIZE: u64 = 5 * 1024 * 1024;

/// Default chunk size for objects below the large-object threshold (5 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = MIN_PART_SIZE;

/// Chunk size used once an object exceeds [`LARGE_OBJECT_THRESHOLD`]
pub const LARGE_CHUNK_SIZE: u64 = 1_000_000_000;

/// Objects strictly larger than this are split into [`LARGE_CHUNK_SIZE`] parts
pub const LARGE_OBJECT_THRESHOLD: u64 = 1_000_000_000;
