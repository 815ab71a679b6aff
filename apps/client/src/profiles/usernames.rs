//! Username extraction for linked coding profiles.
//!
//! The two platforms use different URL conventions, so the extraction rules
//! differ on purpose: LeetCode inspects the *first* path segment for a
//! `u`/`profile` prefix, HackerRank looks for a literal `profile` segment
//! anywhere and otherwise takes the *last* segment. Neither function ever
//! returns an error — a string the parser cannot make sense of is sanitized
//! and used as-is.

use url::Url;

/// Extracts a LeetCode username from a pasted URL or raw string.
///
/// `https://leetcode.com/u/johndoe/` → `johndoe`, `johndoe` → `johndoe`.
pub fn extract_leetcode_username(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if !trimmed.to_lowercase().contains("leetcode.com") {
        return sanitize(trimmed);
    }
    let Some(url) = parse_lenient(trimmed) else {
        return sanitize(trimmed);
    };
    let segments = path_segments(&url);
    if segments.is_empty() {
        return String::new();
    }
    let first = segments[0].to_lowercase();
    let candidate = if first == "u" || first == "profile" {
        segments.get(1).map(String::as_str).unwrap_or("")
    } else {
        segments[0].as_str()
    };
    sanitize(candidate)
}

/// Extracts a HackerRank username from a pasted URL or raw string.
///
/// `https://www.hackerrank.com/profile/jane_99` → `jane_99`,
/// `https://www.hackerrank.com/jane_99` → `jane_99`.
pub fn extract_hackerrank_username(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if !trimmed.to_lowercase().contains("hackerrank.com") {
        return sanitize(trimmed);
    }
    let Some(url) = parse_lenient(trimmed) else {
        return sanitize(trimmed);
    };
    let segments = path_segments(&url);
    if segments.is_empty() {
        return String::new();
    }
    let candidate = match segments.iter().position(|s| s.as_str() == "profile") {
        Some(idx) => segments.get(idx + 1).map(String::as_str).unwrap_or(""),
        None => segments.last().map(String::as_str).unwrap_or(""),
    };
    sanitize(candidate)
}

/// Keeps only `[a-zA-Z0-9_-]`.
fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .collect()
}

/// Parses a URL, defaulting the scheme to https when none is present.
fn parse_lenient(trimmed: &str) -> Option<Url> {
    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    Url::parse(&with_scheme).ok()
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path()
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
