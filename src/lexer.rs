//! Line expansion and tokenization.
//!
//! The shell language is deliberately flat: the only expansion is the `$$`
//! marker, which becomes the shell's process id, and words are separated by
//! runs of spaces. There is no quoting and no escaping.

/// The two-character marker replaced by the shell's process id.
pub const PID_MARKER: &str = "$$";

/// Replace every `$$` in `line` with the decimal form of `pid`.
///
/// Markers are matched left to right and never overlap, so `$$$` becomes
/// `<pid>$`. A `$` that is not followed by another `$` is copied as-is.
pub fn expand_pid(line: &str, pid: i32) -> String {
    let pid = pid.to_string();
    let marker_count = line.matches(PID_MARKER).count();
    let mut out = String::with_capacity(line.len() + marker_count * pid.len());

    let mut chars = line.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '$' && chars.peek() == Some(&'$') {
            chars.next();
            out.push_str(&pid);
        } else {
            out.push(ch);
        }
    }
    out
}

/// Whether an expanded line should be skipped without parsing.
///
/// Blank lines and comment lines (first non-blank character is `#`) produce
/// no command.
pub fn is_noop_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Split a line into words separated by runs of spaces.
///
/// Only `' '` separates words; a tab is part of the word it appears in.
pub fn split_into_tokens(line: &str) -> Vec<&str> {
    line.split(' ').filter(|word| !word.is_empty()).collect()
}
