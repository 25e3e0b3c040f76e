//! Formatting and parsing helpers for the s3shift CLI

use anyhow::{Context, Result};
use std::time::Duration;

/// Format bytes as human readable string
pub fn format_bytes(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format duration as human readable string
pub fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs == 0 {
        format!("{}ms", elapsed.as_millis())
    } else if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Parse a byte count such as `12582912`, `12Mi` or `2.5G`
///
/// Decimal suffixes (`K`, `M`, `G`, `T`) are powers of 1000, binary ones
/// (`Ki`, `Mi`, `Gi`, `Ti`) powers of 1024. A trailing `B` is ignored.
pub fn parse_size(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    let without_b = trimmed
        .strip_suffix('B')
        .or_else(|| trimmed.strip_suffix('b'))
        .unwrap_or(trimmed);
    let split = without_b
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(without_b.len());
    let (number, unit) = without_b.split_at(split);

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" => 1,
        "k" => 1_000,
        "m" => 1_000_000,
        "g" => 1_000_000_000,
        "t" => 1_000_000_000_000,
        "ki" => 1 << 10,
        "mi" => 1 << 20,
        "gi" => 1 << 30,
        "ti" => 1 << 40,
        other => anyhow::bail!("Unknown size unit '{}' in {}", other, input),
    };

    if !number.contains('.') {
        let n: u64 = number
            .parse()
            .with_context(|| format!("Invalid size: {}", input))?;
        return n
            .checked_mul(multiplier)
            .with_context(|| format!("Size out of range: {}", input));
    }

    let n: f64 = number
        .parse()
        .with_context(|| format!("Invalid size: {}", input))?;
    let bytes = n * multiplier as f64;
    if !bytes.is_finite() || bytes < 0.0 || bytes > u64::MAX as f64 {
        anyhow::bail!("Size out of range: {}", input);
    }
    Ok(bytes.round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1024), "1 KiB");
        assert_eq!(format_bytes(1024 * 1024), "1 MiB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(30)), "30s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m 1s");
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("12582912").unwrap(), 12 * 1024 * 1024);
        assert_eq!(parse_size("12Mi").unwrap(), 12 * 1024 * 1024);
        assert_eq!(parse_size("12MiB").unwrap(), 12 * 1024 * 1024);
        assert_eq!(parse_size("3M").unwrap(), 3_000_000);
        assert_eq!(parse_size("2.5G").unwrap(), 2_500_000_000);
        assert_eq!(parse_size(" 5 Gi ").unwrap(), 5 << 30);
        assert_eq!(parse_size("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_size_rejects_garbage() {
        assert!(parse_size("").is_err());
        assert!(parse_size("12X").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("99999999999Ti").is_err());
    }
}
