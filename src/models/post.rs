//! Post record construction.

use serde::{Deserialize, Serialize};

/// Author recorded when none could be extracted.
pub const DEFAULT_AUTHOR: &str = "Anonymous";

/// Raw post fields pulled off a thread page, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ExtractedPost {
    /// Page-local element id, e.g. `p_12345`
    pub id: Option<String>,
    /// Author display name, if resolvable
    pub author: Option<String>,
    /// Concatenated text nodes of the post body
    pub text: String,
    /// Original markup snippet of the post body
    pub html: Option<String>,
    /// Timestamp string, preserved verbatim
    pub date: Option<String>,
}

/// One archived post within a thread. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// 0-based position within the owning thread
    pub post_index: usize,
    pub post_id: Option<String>,
    pub author: String,
    /// Whitespace-collapsed text content
    pub content: String,
    pub content_html: Option<String>,
    pub post_date: Option<String>,
}

impl Post {
    /// Build a post record at the given position within its thread.
    pub fn from_extracted(index: usize, raw: ExtractedPost) -> Self {
        let author = raw
            .author
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        Self {
            post_index: index,
            post_id: raw.id,
            author,
            content: collapse_whitespace(&raw.text),
            content_html: raw.html,
            post_date: raw
                .date
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
        }
    }
}

/// Collapse whitespace runs into single spaces and trim the ends.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  hello \n\t world  "), "hello world");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_author_defaults_to_anonymous() {
        let post = Post::from_extracted(0, ExtractedPost::default());
        assert_eq!(post.author, DEFAULT_AUTHOR);

        let post = Post::from_extracted(
            0,
            ExtractedPost {
                author: Some("   ".to_string()),
                ..ExtractedPost::default()
            },
        );
        assert_eq!(post.author, DEFAULT_AUTHOR);
    }

    #[test]
    fn test_fields_normalized() {
        let post = Post::from_extracted(
            3,
            ExtractedPost {
                id: Some("p_42".to_string()),
                author: Some(" alice \n".to_string()),
                text: "first  line\nsecond".to_string(),
                html: Some("<div>first  line\nsecond</div>".to_string()),
                date: Some(" 2024-01-01T10:00:00 ".to_string()),
            },
        );
        assert_eq!(post.post_index, 3);
        assert_eq!(post.post_id.as_deref(), Some("p_42"));
        assert_eq!(post.author, "alice");
        assert_eq!(post.content, "first line second");
        // Raw markup is preserved untouched.
        assert_eq!(
            post.content_html.as_deref(),
            Some("<div>first  line\nsecond</div>")
        );
        assert_eq!(post.post_date.as_deref(), Some("2024-01-01T10:00:00"));
    }

    #[test]
    fn test_empty_date_becomes_null() {
        let post = Post::from_extracted(
            0,
            ExtractedPost {
                date: Some("  ".to_string()),
                ..ExtractedPost::default()
            },
        );
        assert_eq!(post.post_date, None);
    }
}
