//! Storage gateway implementations

mod memory;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use s3shift_core::types::{MultipartSession, ObjectLocation, ObjectMetadata, PartResult, PartSpec};
use s3shift_core::Result;
use std::fmt;

pub use memory::{GatewayCall, MemoryGateway};
pub use s3::S3Gateway;

/// Object-store operations used by a transfer
///
/// Every method except `head_object` mutates remote state. A session returned
/// by `begin_multipart_copy` leaks on the provider until it is passed to
/// `complete_multipart_copy` or `abort_multipart_copy`; both take it by value.
#[async_trait]
pub trait StorageGateway: Send + Sync {
    /// Read object metadata
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata>;

    /// Open a multipart upload on the destination
    async fn begin_multipart_copy(
        &self,
        destination: &ObjectLocation,
        total_parts: u32,
    ) -> Result<MultipartSession>;

    /// Copy one byte range of `source` into a part of the session
    async fn copy_part(
        &self,
        session: &MultipartSession,
        part: &PartSpec,
        source: &ObjectLocation,
    ) -> Result<PartResult>;

    /// Finalize the session; `parts` must be in ascending part-number order
    async fn complete_multipart_copy(
        &self,
        session: MultipartSession,
        parts: Vec<PartResult>,
    ) -> Result<()>;

    /// Discard the session and any parts already copied
    async fn abort_multipart_copy(&self, session: MultipartSession) -> Result<()>;

    /// Copy a whole object in one request
    async fn copy_whole_object(
        &self,
        source: &ObjectLocation,
        destination: &ObjectLocation,
    ) -> Result<()>;

    /// Store `body` at `destination`, returning the new object's ETag
    async fn put_object(&self, destination: &ObjectLocation, body: Bytes) -> Result<String>;
}

/// Gateway operation names, as used in logs and provider errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    HeadObject,
    CreateMultipartUpload,
    UploadPartCopy,
    CompleteMultipartUpload,
    AbortMultipartUpload,
    CopyObject,
    PutObject,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::HeadObject => "HeadObject",
            Operation::CreateMultipartUpload => "CreateMultipartUpload",
            Operation::UploadPartCopy => "UploadPartCopy",
            Operation::CompleteMultipartUpload => "CompleteMultipartUpload",
            Operation::AbortMultipartUpload => "AbortMultipartUpload",
            Operation::CopyObject => "CopyObject",
            Operation::PutObject => "PutObject",
        }
    }

    /// Everything but `HeadObject` changes provider state
    pub fn is_mutation(&self) -> bool {
        !matches!(self, Operation::HeadObject)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
