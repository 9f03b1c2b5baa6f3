//! HTML field extraction.
//!
//! Turns a fetched page into link lists and raw post records. Selector
//! strings target phpBB-style forum markup (Tapatalk), with fallback chains
//! for the elements that vary between skins. Everything is extracted in one
//! pass per page; the parser itself holds no crawl state.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::ExtractedPost;
use crate::services::FetchedPage;
use crate::utils::resolve_url;
use crate::utils::url::{is_board_url, is_thread_first_page};

/// A board link with its display text.
#[derive(Debug, Clone)]
pub struct BoardLink {
    pub url: String,
    /// Link text; `None` when empty or unresolvable
    pub name: Option<String>,
}

/// Everything extractable from one page. Links are absolute.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Thread title, when the page is a thread page
    pub title: Option<String>,
    /// Links to board pages
    pub board_links: Vec<BoardLink>,
    /// Links to thread first pages (pagination pages are filtered out)
    pub thread_links: Vec<String>,
    /// Posts on this page, in document order
    pub posts: Vec<ExtractedPost>,
    /// Continuation ("next page") link, if any
    pub next_page: Option<String>,
    /// Board URL from the deepest matching breadcrumb link
    pub breadcrumb_board: Option<String>,
}

/// CSS-selector based page parser.
pub struct PageParser {
    board_link: Selector,
    any_link: Selector,
    thread_link: Selector,
    html_link: Selector,
    next_link: Selector,
    post_row: Selector,
    title_primary: Selector,
    title_fallback: Selector,
    author_primary: Selector,
    author_fallback: Selector,
    content: Selector,
    date_time: Selector,
    date_fallback: Selector,
    breadcrumb: Selector,
}

impl PageParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            board_link: parse_selector("a.forumtitle")?,
            any_link: parse_selector("a[href]")?,
            thread_link: parse_selector("a.topictitle")?,
            html_link: parse_selector(r#"a[href*=".html"]"#)?,
            next_link: parse_selector(r#"li.arrow.next a, a[rel="next"], li.next a"#)?,
            post_row: parse_selector(r#"div.post.postrow, div[id^="p_"]"#)?,
            title_primary: parse_selector(
                r#"h2.topic-title a, h1[itemprop="headline"], .topic-title"#,
            )?,
            title_fallback: parse_selector("h1, h2")?,
            author_primary: parse_selector(r#"span[itemprop="name"]"#)?,
            author_fallback: parse_selector(
                ".username-coloured span, .username span, .display_username, .username, .author a",
            )?,
            content: parse_selector(".content.noskim")?,
            date_time: parse_selector("time")?,
            date_fallback: parse_selector(".timespan")?,
            breadcrumb: parse_selector(".nav-breadcrumbs .crumb a")?,
        })
    }

    /// Extract all link lists and post records from a page.
    pub fn extract(&self, page: &FetchedPage) -> PageContent {
        let document = Html::parse_document(&page.html);
        let base = Url::parse(&page.url).ok();

        PageContent {
            title: self.extract_title(&document),
            board_links: self.extract_board_links(&document, base.as_ref()),
            thread_links: self.extract_thread_links(&document, base.as_ref()),
            posts: self.extract_posts(&document),
            next_page: self.extract_next_page(&document, base.as_ref()),
            breadcrumb_board: self.extract_breadcrumb_board(&document, base.as_ref()),
        }
    }

    fn extract_title(&self, document: &Html) -> Option<String> {
        document
            .select(&self.title_primary)
            .next()
            .or_else(|| document.select(&self.title_fallback).next())
            .map(element_text)
            .filter(|t| !t.is_empty())
    }

    fn extract_board_links(&self, document: &Html, base: Option<&Url>) -> Vec<BoardLink> {
        let mut links: Vec<BoardLink> = document
            .select(&self.board_link)
            .filter_map(|el| self.board_link_from(el, base))
            .collect();

        // Fallback for skins without the forumtitle class: any link whose
        // resolved URL matches the board pattern.
        if links.is_empty() {
            links = document
                .select(&self.any_link)
                .filter_map(|el| self.board_link_from(el, base))
                .collect();
        }

        links
    }

    fn board_link_from(&self, el: ElementRef<'_>, base: Option<&Url>) -> Option<BoardLink> {
        let href = el.value().attr("href")?;
        let url = absolutize(base, href);
        if !is_board_url(&url) {
            return None;
        }
        let name = Some(element_text(el)).filter(|t| !t.is_empty());
        Some(BoardLink { url, name })
    }

    fn extract_thread_links(&self, document: &Html, base: Option<&Url>) -> Vec<String> {
        let mut links: Vec<String> = document
            .select(&self.thread_link)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| absolutize(base, href))
            .filter(|url| is_thread_first_page(url))
            .collect();

        if links.is_empty() {
            links = document
                .select(&self.html_link)
                .filter_map(|el| el.value().attr("href"))
                .map(|href| absolutize(base, href))
                .filter(|url| is_thread_first_page(url))
                .collect();
        }

        links
    }

    fn extract_posts(&self, document: &Html) -> Vec<ExtractedPost> {
        document
            .select(&self.post_row)
            .map(|row| self.extract_post(row))
            .collect()
    }

    fn extract_post(&self, row: ElementRef<'_>) -> ExtractedPost {
        let author = row
            .select(&self.author_primary)
            .next()
            .or_else(|| row.select(&self.author_fallback).next())
            .map(element_text)
            .filter(|a| !a.is_empty());

        let content_el = row.select(&self.content).next();
        let text = content_el
            .map(|el| el.text().collect::<Vec<_>>().join(" "))
            .unwrap_or_default();
        let html = content_el.map(|el| el.html());

        let date = row
            .select(&self.date_time)
            .next()
            .and_then(|el| el.value().attr("datetime"))
            .or_else(|| {
                row.select(&self.date_fallback)
                    .next()
                    .and_then(|el| el.value().attr("title"))
            })
            .map(|d| d.to_string());

        ExtractedPost {
            id: row.value().attr("id").map(|id| id.to_string()),
            author,
            text,
            html,
            date,
        }
    }

    fn extract_next_page(&self, document: &Html, base: Option<&Url>) -> Option<String> {
        document
            .select(&self.next_link)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(|href| absolutize(base, href))
    }

    fn extract_breadcrumb_board(&self, document: &Html, base: Option<&Url>) -> Option<String> {
        // The last matching crumb is the deepest (most specific) board.
        document
            .select(&self.breadcrumb)
            .filter_map(|el| el.value().attr("href"))
            .map(|href| absolutize(base, href))
            .filter(|url| is_board_url(url))
            .last()
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn absolutize(base: Option<&Url>, href: &str) -> String {
    match base {
        Some(base) => resolve_url(base, href),
        None => href.to_string(),
    }
}
