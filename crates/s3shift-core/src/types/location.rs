//! Object locations and transfer requests

use serde::{Deserialize, Serialize};
use std::fmt;

/// A bucket + key pair addressing one object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectLocation {
    pub bucket: String,
    pub key: String,
}

impl ObjectLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        if self.bucket.is_empty() {
            return Err(crate::Error::InvalidArgument(
                "bucket name cannot be empty".into(),
            ));
        }
        if self.key.is_empty() {
            return Err(crate::Error::InvalidArgument(format!(
                "object key cannot be empty (bucket {})",
                self.bucket
            )));
        }
        Ok(())
    }
}

impl fmt::Display for ObjectLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

/// One object copy from `source` to `destination`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub source: ObjectLocation,
    pub destination: ObjectLocation,
}

impl TransferRequest {
    pub fn new(source: ObjectLocation, destination: ObjectLocation) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.source.validate()?;
        self.destination.validate()?;
        if self.source == self.destination {
            return Err(crate::Error::InvalidArgument(format!(
                "source and destination are the same object: {}",
                self.source
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_display() {
        let loc = ObjectLocation::new("media", "2024/clip.mov");
        assert_eq!(loc.to_string(), "s3://media/2024/clip.mov");
    }

    #[test]
    fn test_request_validation() {
        let src = ObjectLocation::new("src", "a.mov");
        let dst = ObjectLocation::new("dst", "b/a.mov");
        assert!(TransferRequest::new(src.clone(), dst).validate().is_ok());

        assert!(TransferRequest::new(src.clone(), src.clone()).validate().is_err());
        assert!(TransferRequest::new(src.clone(), ObjectLocation::new("", "k"))
            .validate()
            .is_err());
        assert!(TransferRequest::new(ObjectLocation::new("src", ""), src)
            .validate()
            .is_err());
    }
}
