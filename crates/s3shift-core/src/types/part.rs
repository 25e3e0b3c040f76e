//! Multipart copy types

use serde::{Deserialize, Serialize};

use super::ObjectLocation;

/// One byte range of the source object, copied as a single part
///
/// Both bounds are inclusive, matching the HTTP `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartSpec {
    /// 1-based, contiguous within a plan
    pub part_number: u32,
    pub range_start: u64,
    pub range_end: u64,
}

impl PartSpec {
    pub fn len(&self) -> u64 {
        self.range_end - self.range_start + 1
    }

    /// `x-amz-copy-source-range` value for this part
    pub fn copy_source_range(&self) -> String {
        format!("bytes={}-{}", self.range_start, self.range_end)
    }
}

/// Ordered parts covering `[0, total_size)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartPlan {
    pub total_size: u64,
    pub chunk_size: u64,
    pub parts: Vec<PartSpec>,
}

impl PartPlan {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Small enough to skip multipart entirely
    pub fn is_single_part(&self) -> bool {
        self.parts.len() == 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PartSpec> {
        self.parts.iter()
    }
}

/// Provider-side upload grouping the parts of one destination object
///
/// Not `Clone`: completing or aborting consumes the session, so each
/// session is closed exactly once.
#[derive(Debug, PartialEq, Eq)]
pub struct MultipartSession {
    pub upload_id: String,
    pub destination: ObjectLocation,
    pub total_parts: u32,
}

impl MultipartSession {
    pub fn new(upload_id: impl Into<String>, destination: ObjectLocation, total_parts: u32) -> Self {
        Self {
            upload_id: upload_id.into(),
            destination,
            total_parts,
        }
    }
}

/// A successfully copied part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartResult {
    pub part_number: u32,
    pub e_tag: String,
}

impl PartResult {
    pub fn new(part_number: u32, e_tag: impl Into<String>) -> Self {
        Self {
            part_number,
            e_tag: e_tag.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_range_header() {
        let part = PartSpec {
            part_number: 2,
            range_start: 5_242_880,
            range_end: 10_485_759,
        };
        assert_eq!(part.copy_source_range(), "bytes=5242880-10485759");
        assert_eq!(part.len(), 5_242_880);
    }

    #[test]
    fn test_single_byte_part() {
        let part = PartSpec {
            part_number: 1,
            range_start: 0,
            range_end: 0,
        };
        assert_eq!(part.len(), 1);
        assert_eq!(part.copy_source_range(), "bytes=0-0");
    }
}
