//! Drives one object copy end to end

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use s3shift_core::config::TransferConfig;
use s3shift_core::types::{
    CopyMode, MultipartSession, ObjectLocation, PartPlan, PartResult, PartSpec, TransferOutcome,
    TransferRequest, TransferSummary,
};
use s3shift_core::{Error, Result};
use s3shift_storage::StorageGateway;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::planner::{ChunkPlanner, ChunkPolicy};
use crate::tracker::{CompletionTracker, RecordOutcome};

/// Copies objects through a [`StorageGateway`]
///
/// Objects that fit in one chunk are copied with a single request; larger
/// ones go through a multipart session whose parts are copied concurrently.
/// A session is either completed with every part or aborted.
pub struct TransferOrchestrator {
    gateway: Arc<dyn StorageGateway>,
    planner: ChunkPlanner,
    max_concurrent_parts: usize,
    part_timeout: Option<Duration>,
}

impl TransferOrchestrator {
    pub fn new(gateway: Arc<dyn StorageGateway>, config: &TransferConfig) -> Self {
        Self {
            gateway,
            planner: ChunkPlanner::new(ChunkPolicy::from(config)),
            max_concurrent_parts: config.max_concurrent_parts.max(1),
            part_timeout: config.part_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn with_chunk_policy(mut self, policy: ChunkPolicy) -> Self {
        self.planner = ChunkPlanner::new(policy);
        self
    }

    pub fn with_max_concurrent_parts(mut self, max: usize) -> Self {
        self.max_concurrent_parts = max.max(1);
        self
    }

    pub fn with_part_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.part_timeout = timeout;
        self
    }

    /// Copy `request.source` to `request.destination`
    pub async fn transfer(&self, request: &TransferRequest) -> TransferOutcome {
        info!(
            source_bucket = %request.source.bucket,
            source_key = %request.source.key,
            destination_bucket = %request.destination.bucket,
            destination_key = %request.destination.key,
            "Starting transfer"
        );

        match self.run(request).await {
            Ok(Some(summary)) => {
                info!(
                    source = %request.source,
                    destination = %request.destination,
                    bytes = summary.bytes,
                    parts = summary.part_count(),
                    "Transfer finished"
                );
                TransferOutcome::Success(summary)
            }
            Ok(None) => TransferOutcome::NoData,
            Err(e) => {
                error!(
                    source = %request.source,
                    destination = %request.destination,
                    code = e.code(),
                    error = %e,
                    "Transfer failed"
                );
                TransferOutcome::Failure(e)
            }
        }
    }

    /// Store `body` at `destination`, returning its ETag
    pub async fn upload(&self, destination: &ObjectLocation, body: Bytes) -> Result<String> {
        destination.validate()?;
        let bytes = body.len();
        info!(
            bucket = %destination.bucket,
            key = %destination.key,
            bytes,
            "Uploading object"
        );

        match self.gateway.put_object(destination, body).await {
            Ok(e_tag) => {
                info!(destination = %destination, e_tag = %e_tag, "Upload finished");
                Ok(e_tag)
            }
            Err(e) => {
                error!(
                    destination = %destination,
                    code = e.code(),
                    error = %e,
                    "Upload failed"
                );
                Err(e)
            }
        }
    }

    async fn run(&self, request: &TransferRequest) -> Result<Option<TransferSummary>> {
        request.validate()?;

        let metadata = self.gateway.head_object(&request.source).await?;
        let Some(size) = metadata.data_size() else {
            warn!(
                bucket = %request.source.bucket,
                key = %request.source.key,
                content_length = metadata.content_length,
                "Source object holds no data, nothing to copy"
            );
            return Ok(None);
        };

        let plan = self.planner.plan(size)?;
        debug!(
            size,
            e_tag = metadata.e_tag.as_deref().unwrap_or("-"),
            content_type = metadata.content_type.as_deref().unwrap_or("-"),
            chunk_size = plan.chunk_size,
            parts = plan.len(),
            "Planned copy"
        );

        if plan.is_single_part() {
            self.copy_whole(request, size).await.map(Some)
        } else {
            self.copy_multipart(request, &plan).await.map(Some)
        }
    }

    async fn copy_whole(&self, request: &TransferRequest, size: u64) -> Result<TransferSummary> {
        info!(
            source = %request.source,
            destination = %request.destination,
            size,
            "Object fits in one chunk, copying directly"
        );
        self.gateway
            .copy_whole_object(&request.source, &request.destination)
            .await?;

        Ok(TransferSummary {
            bytes: size,
            mode: CopyMode::SingleShot,
        })
    }

    async fn copy_multipart(
        &self,
        request: &TransferRequest,
        plan: &PartPlan,
    ) -> Result<TransferSummary> {
        let total_parts = u32::try_from(plan.len()).map_err(|_| Error::TooManyParts {
            parts: plan.len() as u64,
            limit: s3shift_core::MAX_PARTS,
        })?;

        let session = self
            .gateway
            .begin_multipart_copy(&request.destination, total_parts)
            .await?;
        info!(
            upload_id = %session.upload_id,
            bucket = %request.destination.bucket,
            key = %request.destination.key,
            total_parts,
            chunk_size = plan.chunk_size,
            "Multipart session created"
        );

        let (tracker, mut failures) = self.copy_parts(&session, &request.source, plan).await;

        if failures.is_empty() && !tracker.is_done() {
            let missing = tracker.missing();
            failures = missing
                .into_iter()
                .map(|n| {
                    (
                        n,
                        Error::InternalError(format!("part {} produced no result", n)),
                    )
                })
                .collect();
        }
        if !failures.is_empty() {
            return Err(self.abort(session, failures).await);
        }

        let parts = tracker.into_ordered()?;
        let upload_id = session.upload_id.clone();
        self.complete(session, parts).await?;

        Ok(TransferSummary {
            bytes: plan.total_size,
            mode: CopyMode::Multipart {
                upload_id,
                parts: total_parts,
            },
        })
    }

    /// Fan out every part copy, then fan in all results
    ///
    /// Results are fed to the tracker from this loop only, so it has a
    /// single writer. Failures are collected rather than short-circuiting so
    /// that no copy is still in flight when the session is closed.
    async fn copy_parts(
        &self,
        session: &MultipartSession,
        source: &ObjectLocation,
        plan: &PartPlan,
    ) -> (CompletionTracker, Vec<(u32, Error)>) {
        let mut tracker = CompletionTracker::new(session.total_parts);
        let mut failures = Vec::new();

        let mut copies = stream::iter(plan.iter())
            .map(move |part| async move {
                (part.part_number, self.copy_one(session, part, source).await)
            })
            .buffer_unordered(self.max_concurrent_parts);

        while let Some((part_number, result)) = copies.next().await {
            let recorded = result.and_then(|part| tracker.record_result(part));
            match recorded {
                Ok(RecordOutcome::Pending { done, total }) => {
                    debug!(
                        upload_id = %session.upload_id,
                        part_number,
                        done,
                        total,
                        "Part copied"
                    );
                }
                Ok(RecordOutcome::Done) => {
                    info!(
                        upload_id = %session.upload_id,
                        parts = tracker.total(),
                        "All parts copied"
                    );
                }
                Ok(outcome) => {
                    warn!(
                        upload_id = %session.upload_id,
                        part_number,
                        ?outcome,
                        "Ignored repeated part result"
                    );
                }
                Err(e) => {
                    warn!(
                        upload_id = %session.upload_id,
                        bucket = %session.destination.bucket,
                        key = %session.destination.key,
                        part_number,
                        code = e.code(),
                        error = %e,
                        "Part copy failed"
                    );
                    failures.push((part_number, e));
                }
            }
        }

        (tracker, failures)
    }

    async fn copy_one(
        &self,
        session: &MultipartSession,
        part: &PartSpec,
        source: &ObjectLocation,
    ) -> Result<PartResult> {
        let copy = self.gateway.copy_part(session, part, source);
        match self.part_timeout {
            Some(limit) => tokio::time::timeout(limit, copy)
                .await
                .map_err(|_| Error::Timeout {
                    operation: "UploadPartCopy",
                    after_ms: limit.as_millis() as u64,
                })?,
            None => copy.await,
        }
    }

    async fn complete(&self, session: MultipartSession, parts: Vec<PartResult>) -> Result<()> {
        let upload_id = session.upload_id.clone();
        let destination = session.destination.clone();
        let total_parts = session.total_parts;
        info!(upload_id = %upload_id, parts = parts.len(), "Completing multipart copy");

        match self.gateway.complete_multipart_copy(session, parts).await {
            Ok(()) => {
                info!(
                    upload_id = %upload_id,
                    destination = %destination,
                    "Multipart copy completed"
                );
                Ok(())
            }
            Err(e) => {
                // The provider keeps the upload open when completion is rejected
                let leftover = MultipartSession::new(upload_id, destination, total_parts);
                self.abort_quietly(leftover).await;
                Err(e)
            }
        }
    }

    /// Abort after part failures and build the error to report
    async fn abort(&self, session: MultipartSession, mut failures: Vec<(u32, Error)>) -> Error {
        failures.sort_by_key(|(n, _)| *n);
        let upload_id = session.upload_id.clone();
        let failed_parts: Vec<u32> = failures.iter().map(|(n, _)| *n).collect();
        warn!(upload_id = %upload_id, ?failed_parts, "Aborting multipart copy");

        self.abort_quietly(session).await;

        let first = failures
            .into_iter()
            .next()
            .map(|(_, e)| e)
            .unwrap_or_else(|| Error::InternalError("abort without a failed part".into()));
        Error::PartialMultipart {
            upload_id,
            failed_parts,
            first: Box::new(first),
        }
    }

    async fn abort_quietly(&self, session: MultipartSession) {
        let upload_id = session.upload_id.clone();
        match self.gateway.abort_multipart_copy(session).await {
            Ok(()) => info!(upload_id = %upload_id, "Multipart copy aborted"),
            Err(e) => error!(
                upload_id = %upload_id,
                code = e.code(),
                error = %e,
                "Failed to abort multipart copy, upload may be left open"
            ),
        }
    }
}
