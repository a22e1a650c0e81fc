/// Check if string is 64-character hexadecimal (SHA-256 hex digest shape)
pub fn is_64_char_hex(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Truncate a string to a maximum length, matching the display-truncation
/// convention used by output sections and narrative lines.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "...(truncated)"
    }
}
