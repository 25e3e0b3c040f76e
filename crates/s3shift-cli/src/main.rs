//! s3shift - chunked object copies between S3 locations
//!
//! Copies an object server-side, splitting it into multipart ranges when it
//! does not fit into a single chunk.

mod commands;
mod config;
mod s3_client;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use s3shift_core::config::ShiftConfig;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::commands::CommandContext;

#[derive(Parser)]
#[command(name = "s3shift")]
#[command(version = s3shift_core::VERSION)]
#[command(about = "Chunked server-side copies between S3 locations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Transfer configuration file (TOML)
    #[arg(short, long, global = true, env = "S3SHIFT_CONFIG")]
    config: Option<String>,

    /// Connection profile from ~/.s3shift/config.toml
    #[arg(short, long, global = true, env = "S3SHIFT_PROFILE")]
    profile: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum)]
    log_format: Option<LogFormat>,

    /// Output format for command results
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy an object to another S3 location
    Cp {
        /// Source object (s3://bucket/key)
        source: String,
        /// Destination object (s3://bucket/key, or a prefix ending in /)
        destination: String,
    },

    /// Upload a local file
    Upload {
        /// Local file path
        file: String,
        /// Destination object (s3://bucket/key, or a prefix ending in /)
        destination: String,
    },

    /// Show how an object of the given size would be split
    Plan {
        /// Object size in bytes (accepts K/M/G and Ki/Mi/Gi suffixes)
        size: String,
    },

    /// Manage connection profiles
    Configure {
        #[command(subcommand)]
        action: Option<ConfigureAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigureAction {
    /// Set a profile value
    Set { key: String, value: String },
    /// Print a profile value
    Get { key: String },
    /// List the current profile and all profile names
    List,
    /// Delete a profile
    RemoveProfile { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

impl LogFormat {
    fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = ShiftConfig::from_file(path)?;
            config.apply_env();
            config
        }
        None => ShiftConfig::from_env(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format.as_str().to_string();
    }
    config.validate()?;

    init_logging(&config);
    debug!(config = ?cli.config, profile = ?cli.profile, "Configuration loaded");

    let ctx = CommandContext {
        config,
        profile_name: cli.profile,
        output_format: cli.output,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Cp {
            source,
            destination,
        } => commands::cp::execute(&ctx, &source, &destination).await,
        Commands::Upload { file, destination } => {
            commands::upload::execute(&ctx, &file, &destination).await
        }
        Commands::Plan { size } => commands::plan::execute(&ctx, &size),
        Commands::Configure { action } => {
            commands::configure::execute(&ctx, action)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so command output on stdout stays parseable
fn init_logging(config: &ShiftConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.is_json() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
