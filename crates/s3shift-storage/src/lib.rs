//! s3shift Storage - object-store gateways
//!
//! [`StorageGateway`] is the capability set the transfer orchestrator drives.
//! [`MemoryGateway`] keeps objects in process for tests; [`S3Gateway`] talks
//! to an S3-compatible provider.

pub mod gateway;

pub use gateway::{GatewayCall, MemoryGateway, Operation, S3Gateway, StorageGateway};
