//! cp command - server-side copy between S3 locations

use super::CommandContext;
use crate::s3_client::{file_name, S3Uri};
use crate::utils::{format_bytes, format_duration};
use anyhow::Result;
use colored::Colorize;
use s3shift_core::types::{CopyMode, TransferOutcome, TransferRequest};
use serde_json::json;
use std::process::ExitCode;
use std::time::Instant;

pub async fn execute(ctx: &CommandContext, source: &str, destination: &str) -> Result<ExitCode> {
    let source = S3Uri::parse(source)?.location()?;
    let destination = S3Uri::parse(destination)?.location_or(file_name(&source.key))?;
    let request = TransferRequest::new(source, destination);

    let orchestrator = ctx.orchestrator().await?;
    let started = Instant::now();
    let outcome = orchestrator.transfer(&request).await;
    let elapsed = started.elapsed();

    if ctx.is_json() {
        let mut report = json!({
            "outcome": outcome.as_str(),
            "source": request.source.to_string(),
            "destination": request.destination.to_string(),
            "elapsed_ms": elapsed.as_millis() as u64,
        });
        match &outcome {
            TransferOutcome::Success(summary) => report["summary"] = json!(summary),
            TransferOutcome::Failure(e) => {
                report["error"] = json!({ "code": e.code(), "message": e.to_string() })
            }
            TransferOutcome::NoData => {}
        }
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &outcome {
            TransferOutcome::Success(summary) => {
                let how = match &summary.mode {
                    CopyMode::SingleShot => "single request".to_string(),
                    CopyMode::Multipart { parts, .. } => format!("{} parts", parts),
                };
                ctx.info(&format!(
                    "{} {} -> {} ({}, {}, {})",
                    "copied".green(),
                    request.source,
                    request.destination,
                    format_bytes(summary.bytes),
                    how,
                    format_duration(elapsed)
                ));
            }
            TransferOutcome::NoData => {
                ctx.info(&format!(
                    "{} {} holds no data, nothing copied",
                    "skipped".yellow(),
                    request.source
                ));
            }
            TransferOutcome::Failure(e) => {
                eprintln!(
                    "{} {} -> {}: {}",
                    "failed".red(),
                    request.source,
                    request.destination,
                    e
                );
            }
        }
    }

    Ok(if outcome.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
