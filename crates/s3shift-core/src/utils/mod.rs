//! Utility functions

use md5::{Digest, Md5};

/// Hex-encoded MD5 of a byte slice
pub fn md5_hash(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Generate an ETag from content hash
pub fn generate_etag(md5_hash: &str) -> String {
    format!("\"{}\"", md5_hash)
}

/// Parse ETag (remove quotes)
pub fn parse_etag(etag: &str) -> String {
    etag.trim_matches('"').to_string()
}

/// ETag of an object assembled from parts: MD5 over the binary part
/// digests, suffixed with the part count
pub fn multipart_etag(part_etags: &[String]) -> String {
    let mut hasher = Md5::new();
    for etag in part_etags {
        if let Ok(bytes) = hex::decode(parse_etag(etag)) {
            hasher.update(&bytes);
        }
    }
    format!(
        "\"{}-{}\"",
        hex::encode(hasher.finalize()),
        part_etags.len()
    )
}
