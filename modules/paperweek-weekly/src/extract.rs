//! URL extraction from free-form search output.

use std::sync::LazyLock;

use regex::Regex;

/// Maximal runs of non-whitespace, non-close-paren characters starting with
/// http(s). Close-parens are excluded so markdown-style `(url)` wrappers do
/// not leak into the match.
static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://[^\s)]+").expect("valid regex"));

/// Max URLs considered per search result.
pub const MAX_URLS: usize = 5;

pub const FALLBACK_DESCRIPTION: &str = "Recent scientific article";

/// A candidate article pulled out of search text. Lives for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub url: String,
    pub description: String,
}

/// Extract up to [`MAX_URLS`] URL-shaped substrings in order of appearance.
pub fn extract_urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .take(MAX_URLS)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Strip one trailing punctuation character left over from prose context.
pub fn clean_url(url: &str) -> String {
    url.strip_suffix([')', ']', '.', ','])
        .unwrap_or(url)
        .to_string()
}

/// Derive a one-line description: the line containing the URL, prefixed with
/// the preceding line when there is one, with the URL itself removed.
pub fn describe(text: &str, url: &str) -> String {
    let lines: Vec<&str> = text.lines().collect();
    for (i, line) in lines.iter().enumerate() {
        if line.contains(url) {
            let description = if i > 0 {
                format!("{} {}", lines[i - 1], line)
            } else {
                (*line).to_string()
            };
            return description.replace(url, "").trim().to_string();
        }
    }
    FALLBACK_DESCRIPTION.to_string()
}
