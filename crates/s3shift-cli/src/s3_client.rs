//! S3 client construction and `s3://` URI handling

use crate::config::Profile;
use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder as S3ConfigBuilder;
use aws_sdk_s3::Client;
use s3shift_core::types::ObjectLocation;
use std::fmt;

/// Create an S3 client from a connection profile
pub async fn create_client(profile: &Profile) -> Result<Client> {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(profile.region.clone()));

    if let Some((access_key, secret_key)) = profile.static_credentials()? {
        let credentials = Credentials::new(access_key, secret_key, None, None, "s3shift-cli");
        loader = loader.credentials_provider(credentials);
    }

    let shared = loader.load().await;
    let mut s3_config = S3ConfigBuilder::from(&shared).force_path_style(profile.path_style);
    if let Some(endpoint) = &profile.endpoint {
        s3_config = s3_config.endpoint_url(endpoint);
    }

    Ok(Client::from_conf(s3_config.build()))
}

/// Parsed `s3://bucket/key` or `s3://bucket`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Uri {
    pub bucket: String,
    pub key: Option<String>,
}

impl S3Uri {
    pub fn parse(uri: &str) -> Result<Self> {
        let path = uri
            .strip_prefix("s3://")
            .with_context(|| format!("Invalid S3 URI: {}. Must start with s3://", uri))?;

        let (bucket, key) = match path.split_once('/') {
            Some((b, k)) if !k.is_empty() => (b, Some(k.to_string())),
            Some((b, _)) => (b, None),
            None => (path, None),
        };

        if bucket.is_empty() {
            anyhow::bail!("Invalid S3 URI: bucket name cannot be empty");
        }

        Ok(Self {
            bucket: bucket.to_string(),
            key,
        })
    }

    /// Key is absent or ends with `/`
    pub fn is_prefix(&self) -> bool {
        self.key.as_ref().map_or(true, |k| k.ends_with('/'))
    }

    /// The object this URI names; a key is required
    pub fn location(&self) -> Result<ObjectLocation> {
        match &self.key {
            Some(key) if !self.is_prefix() => Ok(ObjectLocation::new(&self.bucket, key)),
            _ => anyhow::bail!("{} does not name an object", self),
        }
    }

    /// Like [`S3Uri::location`], but a prefix gets `file_name` appended
    pub fn location_or(&self, file_name: &str) -> Result<ObjectLocation> {
        if !self.is_prefix() {
            return self.location();
        }
        if file_name.is_empty() {
            anyhow::bail!("{} is a prefix and no file name is available", self);
        }
        let prefix = self.key.as_deref().unwrap_or("");
        Ok(ObjectLocation::new(
            &self.bucket,
            format!("{}{}", prefix, file_name),
        ))
    }
}

impl fmt::Display for S3Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.key {
            Some(k) => write!(f, "s3://{}/{}", self.bucket, k),
            None => write!(f, "s3://{}", self.bucket),
        }
    }
}

/// Last path segment of a key
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_s3_uri() {
        let uri = S3Uri::parse("s3://mybucket").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert!(uri.key.is_none());

        let uri = S3Uri::parse("s3://mybucket/").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert!(uri.key.is_none());

        let uri = S3Uri::parse("s3://mybucket/path/to/key").unwrap();
        assert_eq!(uri.bucket, "mybucket");
        assert_eq!(uri.key.as_deref(), Some("path/to/key"));
        assert_eq!(uri.to_string(), "s3://mybucket/path/to/key");

        let uri = S3Uri::parse("s3://mybucket/path/to/").unwrap();
        assert!(uri.is_prefix());
    }

    #[test]
    fn test_invalid_s3_uri() {
        assert!(S3Uri::parse("mybucket").is_err());
        assert!(S3Uri::parse("http://mybucket").is_err());
        assert!(S3Uri::parse("s3://").is_err());
        assert!(S3Uri::parse("s3:///key").is_err());
    }

    #[test]
    fn test_location_requires_key() {
        let uri = S3Uri::parse("s3://media/yyyy/test.mov").unwrap();
        assert_eq!(
            uri.location().unwrap(),
            ObjectLocation::new("media", "yyyy/test.mov")
        );

        assert!(S3Uri::parse("s3://media").unwrap().location().is_err());
        assert!(S3Uri::parse("s3://media/yyyy/").unwrap().location().is_err());
    }

    #[test]
    fn test_prefix_destination_takes_file_name() {
        let uri = S3Uri::parse("s3://archive/2024/").unwrap();
        assert_eq!(
            uri.location_or("test.mov").unwrap(),
            ObjectLocation::new("archive", "2024/test.mov")
        );

        let bucket_only = S3Uri::parse("s3://archive").unwrap();
        assert_eq!(
            bucket_only.location_or("test.mov").unwrap(),
            ObjectLocation::new("archive", "test.mov")
        );
        assert!(bucket_only.location_or("").is_err());

        let exact = S3Uri::parse("s3://archive/copy.mov").unwrap();
        assert_eq!(exact.location_or("test.mov").unwrap().key, "copy.mov");
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("yyyy/test.mov"), "test.mov");
        assert_eq!(file_name("test.mov"), "test.mov");
    }
}
