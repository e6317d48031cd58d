//! The dotenv file format: `KEY=VALUE` one per line, no interpolation, blank
//! lines and `#` comments permitted.

/// Parse a dotenv file's contents into an ordered list of key/value pairs.
/// Malformed lines (no `=`) are skipped, matching the permissive behavior of
/// the rest of this system's parsers — a corrupt line never aborts the run.
pub fn parse(contents: &str) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    for line in contents.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let Some((key, value)) = trimmed.split_once('=') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        pairs.push((key.to_string(), value.trim().to_string()));
    }
    pairs
}
