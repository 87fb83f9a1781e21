//! Split raw log lines into whitespace-separated tokens.

/// Tokenize one log line.
///
/// Newlines and other control characters (except tabs) are removed first, so a
/// line read with its terminator, or a record the simulator wrapped across a
/// `\r`, yields the same tokens as the clean line. Empty input gives no tokens.
pub fn tokenize_line(line: &str) -> Vec<String> {
    let cleaned: String = line.chars().filter(|c| !c.is_control() || *c == '\t').collect();
    cleaned.split_whitespace().map(str::to_owned).collect()
}

/// Strip the separator punctuation the simulator appends to numeric fields (`7,`, `5.000000,`).
pub fn strip_trailing_punctuation(token: &str) -> &str {
    token.trim_end_matches([',', ';', ':'])
}
