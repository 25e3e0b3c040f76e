//! CLI command implementations

pub mod configure;
pub mod cp;
pub mod plan;
pub mod upload;

use crate::config::Profile;
use crate::OutputFormat;
use anyhow::Result;
use s3shift_core::ShiftConfig;
use s3shift_storage::S3Gateway;
use s3shift_transfer::TransferOrchestrator;
use std::sync::Arc;

/// Context passed to all commands
pub struct CommandContext {
    pub config: ShiftConfig,
    pub profile_name: Option<String>,
    pub output_format: OutputFormat,
    pub quiet: bool,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }

    /// Print info message if not quiet
    pub fn info(&self, msg: &str) {
        if !self.quiet && !self.is_json() {
            println!("{}", msg);
        }
    }

    pub fn profile(&self) -> Result<Profile> {
        Profile::load(self.profile_name.as_deref())
    }

    /// Orchestrator over the S3 gateway for the selected profile
    pub async fn orchestrator(&self) -> Result<TransferOrchestrator> {
        let client = crate::s3_client::create_client(&self.profile()?).await?;
        let gateway = S3Gateway::new(client, self.config.transfer.destination.clone());
        Ok(TransferOrchestrator::new(
            Arc::new(gateway),
            &self.config.transfer,
        ))
    }
}
