//! In-process gateway backed by a hash map
//!
//! Byte ranges are really sliced and reassembled, so a finished copy can be
//! compared byte-for-byte with its source. Every call is journaled, and faults
//! or delays can be injected per operation or per part.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;
use s3shift_core::types::{MultipartSession, ObjectLocation, ObjectMetadata, PartResult, PartSpec};
use s3shift_core::utils::{generate_etag, md5_hash, multipart_etag};
use s3shift_core::{Error, Result};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{Operation, StorageGateway};

/// A recorded gateway call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    HeadObject(ObjectLocation),
    BeginMultipartCopy {
        destination: ObjectLocation,
        total_parts: u32,
    },
    CopyPart {
        upload_id: String,
        part_number: u32,
    },
    CompleteMultipartCopy {
        upload_id: String,
        part_numbers: Vec<u32>,
    },
    AbortMultipartCopy {
        upload_id: String,
    },
    CopyWholeObject {
        source: ObjectLocation,
        destination: ObjectLocation,
    },
    PutObject(ObjectLocation),
}

impl GatewayCall {
    pub fn operation(&self) -> Operation {
        match self {
            GatewayCall::HeadObject(_) => Operation::HeadObject,
            GatewayCall::BeginMultipartCopy { .. } => Operation::CreateMultipartUpload,
            GatewayCall::CopyPart { .. } => Operation::UploadPartCopy,
            GatewayCall::CompleteMultipartCopy { .. } => Operation::CompleteMultipartUpload,
            GatewayCall::AbortMultipartCopy { .. } => Operation::AbortMultipartUpload,
            GatewayCall::CopyWholeObject { .. } => Operation::CopyObject,
            GatewayCall::PutObject(_) => Operation::PutObject,
        }
    }
}

struct StoredObject {
    data: Bytes,
    e_tag: String,
}

struct PendingUpload {
    destination: ObjectLocation,
    parts: BTreeMap<u32, (String, Bytes)>,
}

#[derive(Default)]
struct MemoryState {
    objects: HashMap<ObjectLocation, StoredObject>,
    uploads: HashMap<String, PendingUpload>,
    journal: Vec<GatewayCall>,
}

#[derive(Default)]
struct Faults {
    operations: HashSet<Operation>,
    parts: HashSet<u32>,
    part_delays: HashMap<u32, Duration>,
    renumbered: HashMap<u32, u32>,
}

/// In-memory object store
#[derive(Default)]
pub struct MemoryGateway {
    state: Mutex<MemoryState>,
    faults: Mutex<Faults>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object directly, bypassing the journal
    pub fn insert(&self, location: ObjectLocation, data: impl Into<Bytes>) {
        let data = data.into();
        let e_tag = generate_etag(&md5_hash(&data));
        self.state
            .lock()
            .objects
            .insert(location, StoredObject { data, e_tag });
    }

    /// Object contents, if present
    pub fn object(&self, location: &ObjectLocation) -> Option<Bytes> {
        self.state
            .lock()
            .objects
            .get(location)
            .map(|o| o.data.clone())
    }

    pub fn object_etag(&self, location: &ObjectLocation) -> Option<String> {
        self.state
            .lock()
            .objects
            .get(location)
            .map(|o| o.e_tag.clone())
    }

    /// Upload ids of sessions neither completed nor aborted
    pub fn open_uploads(&self) -> Vec<String> {
        self.state.lock().uploads.keys().cloned().collect()
    }

    /// Every call made so far, in order
    pub fn journal(&self) -> Vec<GatewayCall> {
        self.state.lock().journal.clone()
    }

    /// Number of journaled calls of one kind
    pub fn calls(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|c| c.operation() == operation)
            .count()
    }

    /// Make every call of `operation` fail with a transient error
    pub fn fail_operation(&self, operation: Operation) {
        self.faults.lock().operations.insert(operation);
    }

    /// Make the copy of one part number fail with a transient error
    pub fn fail_part(&self, part_number: u32) {
        self.faults.lock().parts.insert(part_number);
    }

    /// Hold the copy of one part number for `delay` before answering
    pub fn delay_part(&self, part_number: u32, delay: Duration) {
        self.faults.lock().part_delays.insert(part_number, delay);
    }

    /// Report the copy of `part_number` back as part `reported_as`
    pub fn misnumber_part(&self, part_number: u32, reported_as: u32) {
        self.faults.lock().renumbered.insert(part_number, reported_as);
    }

    fn record(&self, call: GatewayCall) {
        self.state.lock().journal.push(call);
    }

    fn check_fault(&self, operation: Operation) -> Result<()> {
        if self.faults.lock().operations.contains(&operation) {
            return Err(Error::transient(operation.as_str(), "injected failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl StorageGateway for MemoryGateway {
    async fn head_object(&self, location: &ObjectLocation) -> Result<ObjectMetadata> {
        self.record(GatewayCall::HeadObject(location.clone()));
        self.check_fault(Operation::HeadObject)?;

        let state = self.state.lock();
        let object = state
            .objects
            .get(location)
            .ok_or_else(|| Error::NotFound(location.to_string()))?;

        Ok(ObjectMetadata {
            content_length: object.data.len() as i64,
            e_tag: Some(object.e_tag.clone()),
            content_type: None,
        })
    }

    async fn begin_multipart_copy(
        &self,
        destination: &ObjectLocation,
        total_parts: u32,
    ) -> Result<MultipartSession> {
        self.record(GatewayCall::BeginMultipartCopy {
            destination: destination.clone(),
            total_parts,
        });
        self.check_fault(Operation::CreateMultipartUpload)?;

        let upload_id = Uuid::new_v4().to_string();
        self.state.lock().uploads.insert(
            upload_id.clone(),
            PendingUpload {
                destination: destination.clone(),
                parts: BTreeMap::new(),
            },
        );
        debug!(upload_id = %upload_id, destination = %destination, "Opened in-memory upload");

        Ok(MultipartSession::new(upload_id, destination.clone(), total_parts))
    }

    async fn copy_part(
        &self,
        session: &MultipartSession,
        part: &PartSpec,
        source: &ObjectLocation,
    ) -> Result<PartResult> {
        self.record(GatewayCall::CopyPart {
            upload_id: session.upload_id.clone(),
            part_number: part.part_number,
        });

        let (delay, fail, reported) = {
            let faults = self.faults.lock();
            (
                faults.part_delays.get(&part.part_number).copied(),
                faults.operations.contains(&Operation::UploadPartCopy)
                    || faults.parts.contains(&part.part_number),
                faults
                    .renumbered
                    .get(&part.part_number)
                    .copied()
                    .unwrap_or(part.part_number),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(Error::transient(
                Operation::UploadPartCopy.as_str(),
                format!("injected failure on part {}", part.part_number),
            ));
        }

        let mut state = self.state.lock();
        let data = {
            let object = state
                .objects
                .get(source)
                .ok_or_else(|| Error::NotFound(source.to_string()))?;
            let len = object.data.len() as u64;
            if part.range_start > part.range_end || part.range_end >= len {
                return Err(Error::InvalidArgument(format!(
                    "range {} outside object of {} bytes",
                    part.copy_source_range(),
                    len
                )));
            }
            object
                .data
                .slice(part.range_start as usize..=part.range_end as usize)
        };

        let upload = state
            .uploads
            .get_mut(&session.upload_id)
            .ok_or_else(|| Error::NoSuchUpload(session.upload_id.clone()))?;
        let e_tag = generate_etag(&md5_hash(&data));
        upload
            .parts
            .insert(part.part_number, (e_tag.clone(), data));

        Ok(PartResult::new(reported, e_tag))
    }

    async fn complete_multipart_copy(
        &self,
        session: MultipartSession,
        parts: Vec<PartResult>,
    ) -> Result<()> {
        self.record(GatewayCall::CompleteMultipartCopy {
            upload_id: session.upload_id.clone(),
            part_numbers: parts.iter().map(|p| p.part_number).collect(),
        });
        self.check_fault(Operation::CompleteMultipartUpload)?;

        if parts.is_empty() {
            return Err(Error::InvalidPart("no parts supplied".into()));
        }
        if parts.windows(2).any(|w| w[0].part_number >= w[1].part_number) {
            return Err(Error::InvalidPart(
                "parts must be in strictly ascending order".into(),
            ));
        }

        let mut state = self.state.lock();
        let upload = state
            .uploads
            .get(&session.upload_id)
            .ok_or_else(|| Error::NoSuchUpload(session.upload_id.clone()))?;

        let mut body = BytesMut::new();
        for part in &parts {
            match upload.parts.get(&part.part_number) {
                Some((e_tag, data)) if *e_tag == part.e_tag => body.extend_from_slice(data),
                Some(_) => {
                    return Err(Error::InvalidPart(format!(
                        "ETag mismatch for part {}",
                        part.part_number
                    )))
                }
                None => {
                    return Err(Error::InvalidPart(format!(
                        "part {} was never uploaded",
                        part.part_number
                    )))
                }
            }
        }

        let e_tags: Vec<String> = parts.iter().map(|p| p.e_tag.clone()).collect();
        let upload = state
            .uploads
            .remove(&session.upload_id)
            .ok_or_else(|| Error::NoSuchUpload(session.upload_id.clone()))?;
        state.objects.insert(
            upload.destination,
            StoredObject {
                data: body.freeze(),
                e_tag: multipart_etag(&e_tags),
            },
        );

        Ok(())
    }

    async fn abort_multipart_copy(&self, session: MultipartSession) -> Result<()> {
        self.record(GatewayCall::AbortMultipartCopy {
            upload_id: session.upload_id.clone(),
        });
        self.check_fault(Operation::AbortMultipartUpload)?;

        self.state
            .lock()
            .uploads
            .remove(&session.upload_id)
            .map(|_| ())
            .ok_or(Error::NoSuchUpload(session.upload_id))
    }

    async fn copy_whole_object(
        &self,
        source: &ObjectLocation,
        destination: &ObjectLocation,
    ) -> Result<()> {
        self.record(GatewayCall::CopyWholeObject {
            source: source.clone(),
            destination: destination.clone(),
        });
        self.check_fault(Operation::CopyObject)?;

        let mut state = self.state.lock();
        let (data, e_tag) = state
            .objects
            .get(source)
            .map(|o| (o.data.clone(), o.e_tag.clone()))
            .ok_or_else(|| Error::NotFound(source.to_string()))?;
        state
            .objects
            .insert(destination.clone(), StoredObject { data, e_tag });

        Ok(())
    }

    async fn put_object(&self, destination: &ObjectLocation, body: Bytes) -> Result<String> {
        self.record(GatewayCall::PutObject(destination.clone()));
        self.check_fault(Operation::PutObject)?;

        let e_tag = generate_etag(&md5_hash(&body));
        self.state.lock().objects.insert(
            destination.clone(),
            StoredObject {
                data: body,
                e_tag: e_tag.clone(),
            },
        );

        Ok(e_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(key: &str) -> ObjectLocation {
        ObjectLocation::new("bucket", key)
    }

    fn spec(part_number: u32, range_start: u64, range_end: u64) -> PartSpec {
        PartSpec {
            part_number,
            range_start,
            range_end,
        }
    }

    #[tokio::test]
    async fn test_head_missing_object() {
        let gateway = MemoryGateway::new();
        let err = gateway.head_object(&loc("missing")).await.unwrap_err();
        assert_eq!(err.code(), "NotFound");
        assert_eq!(gateway.calls(Operation::HeadObject), 1);
    }

    #[tokio::test]
    async fn test_multipart_roundtrip() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"hello world"));

        let session = gateway.begin_multipart_copy(&loc("dst"), 2).await.unwrap();
        let first = gateway
            .copy_part(&session, &spec(1, 0, 5), &loc("src"))
            .await
            .unwrap();
        let second = gateway
            .copy_part(&session, &spec(2, 6, 10), &loc("src"))
            .await
            .unwrap();
        gateway
            .complete_multipart_copy(session, vec![first, second])
            .await
            .unwrap();

        assert_eq!(gateway.object(&loc("dst")).unwrap(), "hello world");
        assert!(gateway.object_etag(&loc("dst")).unwrap().ends_with("-2\""));
        assert!(gateway.open_uploads().is_empty());
    }

    #[tokio::test]
    async fn test_complete_rejects_unordered_parts() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"abcdef"));

        let session = gateway.begin_multipart_copy(&loc("dst"), 2).await.unwrap();
        let first = gateway
            .copy_part(&session, &spec(1, 0, 2), &loc("src"))
            .await
            .unwrap();
        let second = gateway
            .copy_part(&session, &spec(2, 3, 5), &loc("src"))
            .await
            .unwrap();

        let err = gateway
            .complete_multipart_copy(session, vec![second, first])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "InvalidPart");
        assert!(gateway.object(&loc("dst")).is_none());
    }

    #[tokio::test]
    async fn test_copy_part_range_outside_object() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"abc"));

        let session = gateway.begin_multipart_copy(&loc("dst"), 1).await.unwrap();
        let err = gateway
            .copy_part(&session, &spec(1, 0, 3), &loc("src"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "InvalidArgument");
    }

    #[tokio::test]
    async fn test_abort_discards_upload() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"abc"));

        let session = gateway.begin_multipart_copy(&loc("dst"), 1).await.unwrap();
        let upload_id = session.upload_id.clone();
        assert_eq!(gateway.open_uploads(), vec![upload_id.clone()]);

        gateway.abort_multipart_copy(session).await.unwrap();
        assert!(gateway.open_uploads().is_empty());

        let err = gateway
            .abort_multipart_copy(MultipartSession::new(upload_id, loc("dst"), 1))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "NoSuchUpload");
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"abcdef"));
        gateway.fail_part(2);
        gateway.fail_operation(Operation::CopyObject);

        let session = gateway.begin_multipart_copy(&loc("dst"), 2).await.unwrap();
        assert!(gateway
            .copy_part(&session, &spec(1, 0, 2), &loc("src"))
            .await
            .is_ok());
        let err = gateway
            .copy_part(&session, &spec(2, 3, 5), &loc("src"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TransientIOError");

        let err = gateway
            .copy_whole_object(&loc("src"), &loc("copy"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "TransientIOError");
        assert!(gateway.object(&loc("copy")).is_none());
    }

    #[tokio::test]
    async fn test_misnumbered_part_result() {
        let gateway = MemoryGateway::new();
        gateway.insert(loc("src"), Bytes::from_static(b"abcdef"));
        gateway.misnumber_part(2, 1);

        let session = gateway.begin_multipart_copy(&loc("dst"), 2).await.unwrap();
        let first = gateway
            .copy_part(&session, &spec(1, 0, 2), &loc("src"))
            .await
            .unwrap();
        let second = gateway
            .copy_part(&session, &spec(2, 3, 5), &loc("src"))
            .await
            .unwrap();
        assert_eq!(first.part_number, 1);
        assert_eq!(second.part_number, 1);
        assert_ne!(first.e_tag, second.e_tag);
    }

    #[tokio::test]
    async fn test_put_and_copy_whole_object() {
        let gateway = MemoryGateway::new();
        let e_tag = gateway
            .put_object(&loc("src"), Bytes::from_static(b"payload"))
            .await
            .unwrap();
        assert_eq!(e_tag, generate_etag(&md5_hash(b"payload")));

        gateway
            .copy_whole_object(&loc("src"), &loc("dst"))
            .await
            .unwrap();
        assert_eq!(gateway.object(&loc("dst")).unwrap(), "payload");
        assert_eq!(gateway.object_etag(&loc("dst")), Some(e_tag));

        let ops: Vec<Operation> = gateway.journal().iter().map(|c| c.operation()).collect();
        assert_eq!(ops, vec![Operation::PutObject, Operation::CopyObject]);
    }
}
