// src/utils/url.rs

//! URL canonicalization.
//!
//! The same logical board or thread is reachable through several URLs: with
//! query strings attached, and for threads through numbered pagination pages
//! (`topic-t5-s20.html` is page two of `topic-t5.html`). Canonical keys strip
//! both so every route to an entity maps to one identity.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

/// Pagination suffix on thread/board pages: `-s<offset>.html`.
fn pagination_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-s\d+\.html$").unwrap())
}

/// Board page URLs end with `-f<id>/`.
fn board_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-f\d+/$").unwrap())
}

/// Thread first-page URLs end with `-t<id>.html`; continuation pages carry an
/// additional `-s<offset>` and deliberately do not match.
fn thread_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-t\d+\.html$").unwrap())
}

/// Strip query string and fragment; malformed input passes through unchanged.
fn strip_query(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Canonicalize a URL into a stable identity key.
///
/// Strips the query string and fragment, then collapses a pagination suffix
/// down to the first-page form. Idempotent; malformed input is returned
/// unchanged.
pub fn canonicalize(url: &str) -> String {
    pagination_suffix()
        .replace(&strip_query(url), ".html")
        .into_owned()
}

/// Whether a URL looks like a board page.
pub fn is_board_url(url: &str) -> bool {
    board_pattern().is_match(&strip_query(url))
}

/// Whether a URL looks like the first page of a thread. Continuation pages
/// do not count: a thread is only ever started from its first page.
pub fn is_thread_first_page(url: &str) -> bool {
    thread_pattern().is_match(&strip_query(url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_strips_query() {
        assert_eq!(
            canonicalize("https://example.com/groups/223/topic-t5.html?sid=abc123"),
            "https://example.com/groups/223/topic-t5.html"
        );
    }

    #[test]
    fn test_canonicalize_collapses_pagination() {
        assert_eq!(
            canonicalize("https://example.com/groups/223/topic-t5-s2.html"),
            "https://example.com/groups/223/topic-t5.html"
        );
        assert_eq!(
            canonicalize("https://example.com/groups/223/topic-t5-s20.html?x=1#p9"),
            "https://example.com/groups/223/topic-t5.html"
        );
    }

    #[test]
    fn test_canonicalize_idempotent() {
        let urls = [
            "https://example.com/groups/223/topic-t5-s2.html?sid=1",
            "https://example.com/groups/223/general-f1/",
            "not a url at all",
        ];
        for url in urls {
            let once = canonicalize(url);
            assert_eq!(canonicalize(&once), once);
        }
    }

    #[test]
    fn test_canonicalize_all_pages_share_key() {
        let first = canonicalize("https://example.com/groups/223/topic-t5.html");
        let second = canonicalize("https://example.com/groups/223/topic-t5-s2.html");
        let third = canonicalize("https://example.com/groups/223/topic-t5-s4.html");
        assert_eq!(first, second);
        assert_eq!(first, third);
    }

    #[test]
    fn test_canonicalize_malformed_unchanged() {
        assert_eq!(canonicalize("::not-a-url::"), "::not-a-url::");
    }

    #[test]
    fn test_is_board_url() {
        assert!(is_board_url("https://example.com/groups/223/general-f1/"));
        assert!(is_board_url("https://example.com/groups/223/general-f1/?sid=abc"));
        assert!(!is_board_url("https://example.com/groups/223/"));
        assert!(!is_board_url("https://example.com/groups/223/topic-t5.html"));
    }

    #[test]
    fn test_is_thread_first_page() {
        assert!(is_thread_first_page(
            "https://example.com/groups/223/topic-t5.html"
        ));
        assert!(is_thread_first_page(
            "https://example.com/groups/223/topic-t5.html?sid=9"
        ));
        // Pagination pages must never be treated as thread starts.
        assert!(!is_thread_first_page(
            "https://example.com/groups/223/topic-t5-s2.html"
        ));
        assert!(!is_thread_first_page(
            "https://example.com/groups/223/general-f1/"
        ));
    }
}
