//! Utility functions.

/// Parses a hexadecimal address with an optional `0x`/`0X` prefix.
pub fn parse_hex_u32(text: &str) -> Option<u32> {
    let digits = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Whether `text` is a non-empty run of decimal digits.
pub fn is_decimal(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Parses a decimal byte count.
pub fn parse_dec_u32(text: &str) -> Option<u32> {
    if !is_decimal(text) {
        return None;
    }
    text.parse().ok()
}
