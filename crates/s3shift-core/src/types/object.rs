//! Object metadata

use serde::{Deserialize, Serialize};

/// Metadata read from the source object before a transfer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    /// Size reported by the provider; non-positive means "no data"
    pub content_length: i64,
    pub e_tag: Option<String>,
    pub content_type: Option<String>,
}

impl ObjectMetadata {
    /// Size in bytes when the object holds any data
    pub fn data_size(&self) -> Option<u64> {
        u64::try_from(self.content_length).ok().filter(|n| *n > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sized(content_length: i64) -> ObjectMetadata {
        ObjectMetadata {
            content_length,
            ..Default::default()
        }
    }

    #[test]
    fn test_data_size() {
        assert_eq!(sized(0).data_size(), None);
        assert_eq!(sized(-1).data_size(), None);
        assert_eq!(sized(42).data_size(), Some(42));
    }
}
