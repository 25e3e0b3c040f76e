//! s3shift Transfer - chunked object copy
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  TransferOrchestrator                    │
//! │                                                          │
//! │   head source ──► ChunkPlanner ──► 1 part?               │
//! │                                     │        │           │
//! │                                   yes        no          │
//! │                                     │        │           │
//! │                           CopyObject   CreateMultipart   │
//! │                                              │           │
//! │                               fan-out UploadPartCopy     │
//! │                                              │           │
//! │                         fan-in ──► CompletionTracker     │
//! │                                              │           │
//! │                         all ok: Complete / else: Abort   │
//! └──────────────────────────┬───────────────────────────────┘
//!                            │
//!                   ┌────────┴────────┐
//!                   │ StorageGateway  │
//!                   │ (memory / S3)   │
//!                   └─────────────────┘
//! ```
//!
//! Every transfer ends in exactly one [`TransferOutcome`]: `Success`,
//! `NoData` for an empty source, or `Failure` carrying the error. Errors never
//! escape [`TransferOrchestrator::transfer`].

mod orchestrator;
mod planner;
mod tracker;

pub use orchestrator::TransferOrchestrator;
pub use planner::{ChunkPlanner, ChunkPolicy};
pub use tracker::{CompletionTracker, RecordOutcome};

pub use s3shift_core::types::{
    CopyMode, ObjectLocation, PartPlan, PartResult, PartSpec, TransferOutcome, TransferRequest,
    TransferSummary,
};
