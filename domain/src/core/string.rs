//! String helpers for log lines and transcripts.

/// Collapse a completion into a single line and cut it to `max_len` bytes
/// (UTF-8 safe), appending an ellipsis when cut.
///
/// Used when a raw model completion has to appear in a log line.
pub fn preview(s: &str, max_len: usize) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.len() <= max_len {
        return flat;
    }
    let mut end = max_len.saturating_sub(3).min(flat.len());
    while end > 0 && !flat.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &flat[..end])
}
