//! Download file name sanitization.

use chrono::Utc;

/// Longest accepted base name, in characters.
const MAX_LEN: usize = 200;

/// Sanitizes a requested file name into a safe base name (no extension).
///
/// Path traversal sequences and separators are replaced, characters that
/// are special on common filesystems are replaced, control characters are
/// stripped, and the result is capped at 200 characters. A name with no
/// alphanumeric character left falls back to a timestamped default, so
/// the caller always gets something usable.
#[must_use]
pub fn sanitize_file_name(requested: &str) -> String {
    let replaced = requested.replace("..", "_");
    let mut sanitized = String::with_capacity(replaced.len());
    for c in replaced.chars() {
        if c.is_control() {
            continue;
        }
        match c {
            '/' | '\\' | '<' | '>' | ':' | '"' | '|' | '?' | '*' => sanitized.push('_'),
            other => sanitized.push(other),
        }
    }

    let trimmed: String = sanitized.trim().chars().take(MAX_LEN).collect();
    if trimmed.chars().any(char::is_alphanumeric) {
        trimmed
    } else {
        default_file_name()
    }
}

/// Timestamped fallback base name.
fn default_file_name() -> String {
    Utc::now().format("report_%Y%m%d_%H%M%S").to_string()
}
