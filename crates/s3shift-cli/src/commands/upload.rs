//! upload command - put a local file into S3

use super::CommandContext;
use crate::s3_client::S3Uri;
use crate::utils::format_bytes;
use anyhow::{Context, Result};
use bytes::Bytes;
use colored::Colorize;
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;

pub async fn execute(ctx: &CommandContext, file: &str, destination: &str) -> Result<ExitCode> {
    let path = Path::new(file);
    if !path.is_file() {
        anyhow::bail!("Source is not a file: {}", file);
    }
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let destination = S3Uri::parse(destination)?.location_or(name)?;

    let body = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let size = body.len() as u64;

    let orchestrator = ctx.orchestrator().await?;
    let e_tag = orchestrator.upload(&destination, Bytes::from(body)).await?;

    if ctx.is_json() {
        let report = json!({
            "destination": destination.to_string(),
            "bytes": size,
            "e_tag": e_tag,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        ctx.info(&format!(
            "{} {} -> {} ({}, ETag {})",
            "uploaded".green(),
            path.display(),
            destination,
            format_bytes(size),
            e_tag
        ));
    }

    Ok(ExitCode::SUCCESS)
}
