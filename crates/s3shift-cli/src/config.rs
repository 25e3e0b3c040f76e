//! Connection profiles for the s3shift CLI
//!
//! Config file location: ~/.s3shift/config.toml
//!
//! Example config:
//! ```toml
//! [default]
//! region = "us-east-1"
//!
//! [local]
//! endpoint = "http://localhost:9000"
//! access_key = "minioadmin"
//! secret_key = "minioadmin"
//! path_style = true
//! ```
//!
//! A profile without keys falls back to the AWS SDK provider chain.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_PROFILE: &str = "default";

/// One named connection profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Custom endpoint URL for S3-compatible providers
    pub endpoint: Option<String>,

    /// Access key ID
    pub access_key: Option<String>,

    /// Secret access key
    pub secret_key: Option<String>,

    #[serde(default = "default_region")]
    pub region: String,

    /// Path style access (use path instead of virtual hosted style)
    #[serde(default)]
    pub path_style: bool,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: None,
            access_key: None,
            secret_key: None,
            region: default_region(),
            path_style: false,
        }
    }
}

fn default_region() -> String {
    s3shift_core::DEFAULT_REGION.to_string()
}

/// Configuration file with multiple profiles
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFile {
    #[serde(flatten)]
    pub profiles: BTreeMap<String, Profile>,
}

impl ProfileFile {
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

impl Profile {
    /// Get config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let home = directories::BaseDirs::new()
            .context("Could not determine home directory")?
            .home_dir()
            .to_path_buf();

        Ok(home.join(".s3shift"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load a profile from the default file, then apply environment overrides
    pub fn load(profile: Option<&str>) -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?, profile)?;
        config.apply_env();
        Ok(config)
    }

    /// Load a profile from `path`; a missing file or profile yields defaults
    pub fn load_from(path: &Path, profile: Option<&str>) -> Result<Self> {
        let name = profile.unwrap_or(DEFAULT_PROFILE);
        Ok(ProfileFile::read(path)?
            .profiles
            .get(name)
            .cloned()
            .unwrap_or_default())
    }

    pub fn save_to(&self, path: &Path, profile: Option<&str>) -> Result<()> {
        let name = profile.unwrap_or(DEFAULT_PROFILE);
        let mut file = ProfileFile::read(path)?;
        file.profiles.insert(name.to_string(), self.clone());
        file.write(path)
    }

    pub fn list_profiles() -> Result<Vec<String>> {
        let file = ProfileFile::read(&Self::config_path()?)?;
        Ok(file.profiles.into_keys().collect())
    }

    pub fn delete_profile(profile: &str) -> Result<bool> {
        let path = Self::config_path()?;
        let mut file = ProfileFile::read(&path)?;
        let removed = file.profiles.remove(profile).is_some();
        if removed {
            file.write(&path)?;
        }
        Ok(removed)
    }

    /// `S3SHIFT_*` variables win over `AWS_*` ones
    fn apply_env(&mut self) {
        if let Some(endpoint) = env_first(&["S3SHIFT_ENDPOINT", "AWS_ENDPOINT_URL"]) {
            self.endpoint = Some(endpoint);
        }
        if let Some(access_key) = env_first(&["S3SHIFT_ACCESS_KEY", "AWS_ACCESS_KEY_ID"]) {
            self.access_key = Some(access_key);
        }
        if let Some(secret_key) = env_first(&["S3SHIFT_SECRET_KEY", "AWS_SECRET_ACCESS_KEY"]) {
            self.secret_key = Some(secret_key);
        }
        if let Some(region) = env_first(&["S3SHIFT_REGION", "AWS_REGION"]) {
            self.region = region;
        }
        if let Some(path_style) = env_first(&["S3SHIFT_PATH_STYLE"]) {
            self.path_style = matches!(path_style.as_str(), "1" | "true" | "yes");
        }
    }

    /// Static credentials, when both halves are configured
    pub fn static_credentials(&self) -> Result<Option<(&str, &str)>> {
        match (self.access_key.as_deref(), self.secret_key.as_deref()) {
            (Some(access), Some(secret)) => Ok(Some((access, secret))),
            (None, None) => Ok(None),
            (Some(_), None) => anyhow::bail!(
                "Secret key not configured. Set S3SHIFT_SECRET_KEY or use 's3shift configure'"
            ),
            (None, Some(_)) => anyhow::bail!(
                "Access key not configured. Set S3SHIFT_ACCESS_KEY or use 's3shift configure'"
            ),
        }
    }

    /// Get a config value by key name
    pub fn get_value(&self, key: &str) -> Option<String> {
        match key {
            "endpoint" => self.endpoint.clone(),
            "access_key" => self.access_key.clone(),
            "secret_key" => self.secret_key.as_ref().map(|_| "***".to_string()), // Hide secret
            "region" => Some(self.region.clone()),
            "path_style" => Some(self.path_style.to_string()),
            _ => None,
        }
    }

    /// Set a config value by key name
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "endpoint" => self.endpoint = Some(value.to_string()),
            "access_key" => self.access_key = Some(value.to_string()),
            "secret_key" => self.secret_key = Some(value.to_string()),
            "region" => self.region = value.to_string(),
            "path_style" => {
                self.path_style = value
                    .parse()
                    .with_context(|| format!("path_style must be true or false, got {}", value))?
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    pub fn keys() -> &'static [&'static str] {
        &["endpoint", "access_key", "secret_key", "region", "path_style"]
    }
}

/// Value of the first set variable among `names`
fn env_first(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| std::env::var(name).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile() {
        let profile = Profile::default();
        assert_eq!(profile.region, "us-east-1");
        assert!(!profile.path_style);
        assert!(profile.static_credentials().unwrap().is_none());
    }

    #[test]
    fn test_profile_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut local = Profile::default();
        local.set_value("endpoint", "http://localhost:9000").unwrap();
        local.set_value("access_key", "minioadmin").unwrap();
        local.set_value("secret_key", "minioadmin").unwrap();
        local.set_value("path_style", "true").unwrap();
        local.save_to(&path, Some("local")).unwrap();
        Profile::default().save_to(&path, None).unwrap();

        let loaded = Profile::load_from(&path, Some("local")).unwrap();
        assert_eq!(loaded, local);
        assert_eq!(
            loaded.static_credentials().unwrap(),
            Some(("minioadmin", "minioadmin"))
        );

        let file = ProfileFile::read(&path).unwrap();
        let names: Vec<&String> = file.profiles.keys().collect();
        assert_eq!(names, vec!["default", "local"]);
    }

    #[test]
    fn test_missing_file_and_profile_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(
            Profile::load_from(&path, Some("nope")).unwrap(),
            Profile::default()
        );
    }

    #[test]
    fn test_half_configured_credentials() {
        let mut profile = Profile::default();
        profile.access_key = Some("key".into());
        assert!(profile.static_credentials().is_err());
    }

    #[test]
    fn test_set_value_rejects_unknown_key() {
        let mut profile = Profile::default();
        assert!(profile.set_value("storage_class", "GLACIER").is_err());
        assert!(profile.set_value("path_style", "maybe").is_err());
        assert_eq!(profile.get_value("secret_key"), None);
        profile.set_value("secret_key", "s").unwrap();
        assert_eq!(profile.get_value("secret_key").as_deref(), Some("***"));
    }
}
