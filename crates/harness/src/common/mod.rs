//! Shared helpers used across the harness.

pub mod error;

/// A single sampled value; `None` marks a read that returned nothing usable.
pub type Sample = Option<u32>;

/// Parses a hexadecimal token as printed by the DUT or found in data files.
///
/// Accepts an optional `0x`/`0X` prefix and surrounding whitespace. Anything
/// else (empty input, several tokens, non-hex digits, overflow) yields `None`.
pub fn parse_hex(token: &str) -> Option<u32> {
    let token = token.trim();
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Formats a sample for reports, spelling out the absent case.
pub fn format_sample(sample: Sample) -> String {
    match sample {
        Some(v) => format!("{:#x}", v),
        None => "unavailable".to_string(),
    }
}
