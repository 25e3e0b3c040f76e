//! Configuration for s3shift

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftConfig {
    #[serde(default)]
    pub transfer: TransferConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShiftConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| crate::Error::InvalidArgument(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `S3SHIFT_*` environment variables
    pub fn apply_env(&mut self) {
        if let Some(size) = env_parse("S3SHIFT_CHUNK_SIZE") {
            self.transfer.default_chunk_size = size;
        }
        if let Some(size) = env_parse("S3SHIFT_LARGE_CHUNK_SIZE") {
            self.transfer.large_chunk_size = size;
        }
        if let Some(threshold) = env_parse("S3SHIFT_LARGE_OBJECT_THRESHOLD") {
            self.transfer.large_object_threshold = threshold;
        }
        if let Some(n) = env_parse("S3SHIFT_MAX_CONCURRENT_PARTS") {
            self.transfer.max_concurrent_parts = n;
        }
        if let Some(secs) = env_parse("S3SHIFT_PART_TIMEOUT_SECS") {
            self.transfer.part_timeout_secs = Some(secs);
        }
        if let Ok(sse) = std::env::var("S3SHIFT_SERVER_SIDE_ENCRYPTION") {
            self.transfer.destination.server_side_encryption = non_empty(sse);
        }
        if let Ok(acl) = std::env::var("S3SHIFT_ACL") {
            self.transfer.destination.acl = non_empty(acl);
        }
        if let Ok(level) = std::env::var("S3SHIFT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("S3SHIFT_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.transfer.validate()?;
        self.logging.validate()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Chunking, concurrency and destination settings for one transfer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransferConfig {
    /// Chunk size for objects up to `large_object_threshold` (bytes)
    pub default_chunk_size: u64,
    /// Chunk size for objects above `large_object_threshold` (bytes)
    pub large_chunk_size: u64,
    /// Size above which `large_chunk_size` is used (bytes)
    pub large_object_threshold: u64,
    /// Maximum part copies in flight at once
    pub max_concurrent_parts: usize,
    /// Deadline for a single part copy, unbounded when unset
    pub part_timeout_secs: Option<u64>,
    /// Options applied to the object being written
    pub destination: DestinationOptions,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            default_chunk_size: crate::DEFAULT_CHUNK_SIZE,
            large_chunk_size: crate::LARGE_CHUNK_SIZE,
            large_object_threshold: crate::LARGE_OBJECT_THRESHOLD,
            max_concurrent_parts: 16,
            part_timeout_secs: None,
            destination: DestinationOptions::default(),
        }
    }
}

impl TransferConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.default_chunk_size == 0 || self.large_chunk_size == 0 {
            return Err(crate::Error::InvalidArgument(
                "chunk sizes must be greater than zero".into(),
            ));
        }
        if self.max_concurrent_parts == 0 {
            return Err(crate::Error::InvalidArgument(
                "max_concurrent_parts must be at least 1".into(),
            ));
        }
        if self.part_timeout_secs == Some(0) {
            return Err(crate::Error::InvalidArgument(
                "part_timeout_secs must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

/// Server-side settings for the destination object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DestinationOptions {
    /// Server-side encryption algorithm (e.g. `AES256`)
    pub server_side_encryption: Option<String>,
    /// Canned ACL (e.g. `public-read`)
    pub acl: Option<String>,
    /// Request payer sent when finalizing a multipart copy (e.g. `requester`)
    pub request_payer: Option<String>,
}

impl Default for DestinationOptions {
    fn default() -> Self {
        Self {
            server_side_encryption: Some("AES256".to_string()),
            acl: None,
            request_payer: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    pub fn validate(&self) -> crate::Result<()> {
        match self.format.to_ascii_lowercase().as_str() {
            "pretty" | "json" => Ok(()),
            other => Err(crate::Error::InvalidArgument(format!(
                "Unknown log format: {} (expected pretty or json)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShiftConfig::default();
        assert_eq!(config.transfer.default_chunk_size, 5 * 1024 * 1024);
        assert_eq!(config.transfer.large_chunk_size, 1_000_000_000);
        assert_eq!(config.transfer.max_concurrent_parts, 16);
        assert_eq!(
            config.transfer.destination.server_side_encryption.as_deref(),
            Some("AES256")
        );
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let config = ShiftConfig::from_toml(
            r#"
            [transfer]
            max_concurrent_parts = 4
            part_timeout_secs = 30

            [transfer.destination]
            acl = "public-read"
            request_payer = "requester"

            [logging]
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.transfer.max_concurrent_parts, 4);
        assert_eq!(config.transfer.part_timeout_secs, Some(30));
        assert_eq!(config.transfer.default_chunk_size, 5 * 1024 * 1024);
        assert_eq!(config.transfer.destination.acl.as_deref(), Some("public-read"));
        assert_eq!(
            config.transfer.destination.request_payer.as_deref(),
            Some("requester")
        );
        assert!(config.logging.is_json());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(ShiftConfig::from_toml("[transfer]\ndefault_chunk_size = 0\n").is_err());
        assert!(ShiftConfig::from_toml("[transfer]\nmax_concurrent_parts = 0\n").is_err());
        assert!(ShiftConfig::from_toml("[logging]\nformat = \"xml\"\n").is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s3shift.toml");
        std::fs::write(&path, "[transfer]\nlarge_chunk_size = 2000000000\n").unwrap();

        let config = ShiftConfig::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.transfer.large_chunk_size, 2_000_000_000);

        let err = ShiftConfig::from_file("/nonexistent/s3shift.toml").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
