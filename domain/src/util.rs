//! Small shared helpers

/// Truncate a string to `max_chars` characters, appending an ellipsis when
/// anything was cut. Safe on multi-byte input.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
