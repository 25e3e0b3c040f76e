//! Gateway backed by an S3-compatible provider

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::head_object::HeadObjectOutput;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    CompletedMultipartUpload, CompletedPart, ObjectCannedAcl, RequestPayer, ServerSideEncryption,
};
use aws_sdk_s3::Client;
use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use s3shift_core::config::DestinationOptions;
use s3shift_core::types::{MultipartSession, ObjectLocation, ObjectMetadata, PartResult, PartSpec};
use s3shift_core::{Error, Result};
use std::error::Error as StdError;
use tracing::debug;

use super::{Operation, StorageGateway};

/// Characters left as-is in the key part of `x-amz-copy-source`
const COPY_SOURCE_KEY: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// `bucket/key` with the key percent-encoded
pub fn copy_source(location: &ObjectLocation) -> String {
    format!(
        "{}/{}",
        location.bucket,
        utf8_percent_encode(&location.key, COPY_SOURCE_KEY)
    )
}

fn provider_error<E>(operation: Operation, err: SdkError<E>) -> Error
where
    E: StdError + 'static,
{
    Error::transient(operation.as_str(), DisplayErrorContext(&err).to_string())
}

/// A HEAD response without a length cannot be told apart from an empty object
fn head_metadata(out: &HeadObjectOutput) -> Result<ObjectMetadata> {
    let content_length = out.content_length().ok_or_else(|| {
        Error::transient(
            Operation::HeadObject.as_str(),
            "response carried no content length",
        )
    })?;
    Ok(ObjectMetadata {
        content_length,
        e_tag: out.e_tag().map(|s| s.to_string()),
        content_type: out.content_type().map(|s| s.to_string()),
    })
}

pub struct S3Gateway {
    client: Client,
    options: DestinationOptions,
}

impl S3Gateway {
    pub fn new(client: Client, options: DestinationOptions) -> Self {
        Self { client, options }
    }

    fn sse(&self) -> Option<ServerSideEncryption> {
        self.options
            .server_side_encryption
            .as_deref()
            .map(ServerSideEncryption::from)
    }

    fn acl(&self) -> Option<ObjectCannedAcl> {
        self.options.acl.as_deref().map(ObjectCannedAcl::from)
    }
}

#[async_trait]
impl StorageGateway for S3Gateway {
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata> {
        let resp = self
            .client
            .head_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await;

        match resp {
            Ok(out) => head_metadata(&out),
            Err(err) => {
                let not_found = err
                    .as_service_error()
                    .map(|e| e.is_not_found())
                    .unwrap_or(false);
                if not_found {
                    Err(Error::NotFound(location.to_string()))
                } else {
                    Err(provider_error(Operation::HeadObject, err))
                }
            }
        }
    }

    async fn begin_multipart_copy(
        &self,
        destination: &ObjectLocation,
        total_parts: u32,
    ) -> Result<MultipartSession> {
        let out = self
            .client
            .create_multipart_upload()
            .bucket(&destination.bucket)
            .key(&destination.key)
            .set_server_side_encryption(self.sse())
            .set_acl(self.acl())
            .send()
            .await
            .map_err(|e| provider_error(Operation::CreateMultipartUpload, e))?;

        let upload_id = out.upload_id().ok_or_else(|| {
            Error::transient(
                Operation::CreateMultipartUpload.as_str(),
                "response carried no upload id",
            )
        })?;
        debug!(upload_id = upload_id, destination = %destination, "Created multipart upload");

        Ok(MultipartSession::new(
            upload_id,
            destination.clone(),
            total_parts,
        ))
    }

    async fn copy_part(
        &self,
        session: &MultipartSession,
        part: &PartSpec,
        source: &ObjectLocation,
    ) -> Result<PartResult> {
        let part_number = i32::try_from(part.part_number)
            .map_err(|_| Error::InvalidPart(format!("part number {} out of range", part.part_number)))?;

        let out = self
            .client
            .upload_part_copy()
            .bucket(&session.destination.bucket)
            .key(&session.destination.key)
            .upload_id(&session.upload_id)
            .part_number(part_number)
            .copy_source(copy_source(source))
            .copy_source_range(part.copy_source_range())
            .send()
            .await
            .map_err(|e| provider_error(Operation::UploadPartCopy, e))?;

        let e_tag = out
            .copy_part_result()
            .and_then(|r| r.e_tag())
            .ok_or_else(|| {
                Error::transient(
                    Operation::UploadPartCopy.as_str(),
                    format!("part {} returned no ETag", part.part_number),
                )
            })?;

        Ok(PartResult::new(part.part_number, e_tag))
    }

    async fn complete_multipart_copy(
        &self,
        session: MultipartSession,
        parts: Vec<PartResult>,
    ) -> Result<()> {
        let completed: Vec<CompletedPart> = parts
            .into_iter()
            .map(|p| {
                CompletedPart::builder()
                    .e_tag(p.e_tag)
                    .part_number(p.part_number as i32)
                    .build()
            })
            .collect();

        self.client
            .complete_multipart_upload()
            .bucket(&session.destination.bucket)
            .key(&session.destination.key)
            .upload_id(&session.upload_id)
            .multipart_upload(
                CompletedMultipartUpload::builder()
                    .set_parts(Some(completed))
                    .build(),
            )
            .set_request_payer(
                self.options
                    .request_payer
                    .as_deref()
                    .map(RequestPayer::from),
            )
            .send()
            .await
            .map_err(|e| provider_error(Operation::CompleteMultipartUpload, e))?;

        Ok(())
    }

    async fn abort_multipart_copy(&self, session: MultipartSession) -> Result<()> {
        self.client
            .abort_multipart_upload()
            .bucket(&session.destination.bucket)
            .key(&session.destination.key)
            .upload_id(&session.upload_id)
            .send()
            .await
            .map_err(|e| provider_error(Operation::AbortMultipartUpload, e))?;

        Ok(())
    }

    async fn copy_whole_object(
        &self,
        source: &ObjectLocation,
        destination: &ObjectLocation,
    ) -> Result<()> {
        self.client
            .copy_object()
            .bucket(&destination.bucket)
            .key(&destination.key)
            .copy_source(copy_source(source))
            .set_server_side_encryption(self.sse())
            .set_acl(self.acl())
            .send()
            .await
            .map_err(|e| provider_error(Operation::CopyObject, e))?;

        Ok(())
    }

    async fn put_object(&self, destination: &ObjectLocation, body: Bytes) -> Result<String> {
        let out = self
            .client
            .put_object()
            .bucket(&destination.bucket)
            .key(&destination.key)
            .body(ByteStream::from(body))
            .set_server_side_encryption(self.sse())
            .set_acl(self.acl())
            .send()
            .await
            .map_err(|e| provider_error(Operation::PutObject, e))?;

        Ok(out.e_tag().unwrap_or_default().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_encoding() {
        assert_eq!(
            copy_source(&ObjectLocation::new("src", "yyyy/test.mov")),
            "src/yyyy/test.mov"
        );
        assert_eq!(
            copy_source(&ObjectLocation::new("src", "my file+1.mov")),
            "src/my%20file%2B1.mov"
        );
        assert_eq!(
            copy_source(&ObjectLocation::new("src", "a_b-c~d.e")),
            "src/a_b-c~d.e"
        );
    }

    #[test]
    fn test_head_metadata() {
        let out = HeadObjectOutput::builder()
            .content_length(42)
            .e_tag("\"abc\"")
            .content_type("video/quicktime")
            .build();
        let metadata = head_metadata(&out).unwrap();
        assert_eq!(metadata.data_size(), Some(42));
        assert_eq!(metadata.e_tag.as_deref(), Some("\"abc\""));
        assert_eq!(metadata.content_type.as_deref(), Some("video/quicktime"));
    }

    #[test]
    fn test_head_without_length_is_not_empty() {
        let err = head_metadata(&HeadObjectOutput::builder().build()).unwrap_err();
        assert_eq!(err.code(), "TransientIOError");
    }
}
