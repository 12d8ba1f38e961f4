//! HTML helpers - visible text, titles, links and sitemap entries.
//!
//! Text extraction is deliberately regex-based: pages are reduced to a flat
//! run of words for the summarizer, so structure does not need to survive.
//! Link discovery uses a real parser because attribute quoting varies.

use lazy_static::lazy_static;
use html_escape::decode_html_entities;
use regex::Regex;
use scraper::{Html, Selector};
use url::Url;

/// Elements whose text never counts as page content.
const STRIPPED_ELEMENTS: &[&str] = &[
    "head", "script", "style", "noscript", "nav", "header", "footer",
];

lazy_static! {
    static ref ELEMENT_PATTERNS: Vec<Regex> = STRIPPED_ELEMENTS
        .iter()
        .map(|tag| Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>")).unwrap())
        .collect();
    static ref COMMENT: Regex = Regex::new(r"(?s)<!--.*?-->").unwrap();
    static ref TAG: Regex = Regex::new(r"(?s)<[^>]*>").unwrap();
    static ref TITLE: Regex = Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>").unwrap();
    static ref HEADING: Regex = Regex::new(r"(?is)<h[1-6]\b[^>]*>(.*?)</h[1-6]\s*>").unwrap();
    static ref LOC: Regex = Regex::new(r"(?is)<loc>\s*(?:<!\[CDATA\[)?(.*?)(?:\]\]>)?\s*</loc>").unwrap();
}

/// Page text and title pulled from raw HTML.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub title: String,
    pub text: String,
}

/// Reduce an HTML document to its title and visible text.
pub fn extract_page(html: &str) -> PageText {
    PageText {
        title: extract_title(html).unwrap_or_else(|| "Untitled".to_string()),
        text: html_to_text(html),
    }
}

/// Strip non-content elements and tags, decode entities, collapse whitespace.
pub fn html_to_text(html: &str) -> String {
    let mut text = COMMENT.replace_all(html, " ").into_owned();
    for pattern in ELEMENT_PATTERNS.iter() {
        text = pattern.replace_all(&text, " ").into_owned();
    }
    let text = TAG.replace_all(&text, " ");
    collapse_whitespace(&decode_entities(&text))
}

/// Page `<title>`, else the first heading.
pub fn extract_title(html: &str) -> Option<String> {
    [&*TITLE, &*HEADING].into_iter().find_map(|pattern| {
        pattern
            .captures(html)
            .and_then(|cap| cap.get(1))
            .map(|m| inline_text(m.as_str()))
            .filter(|t| !t.is_empty())
    })
}

fn inline_text(fragment: &str) -> String {
    collapse_whitespace(&decode_entities(&TAG.replace_all(fragment, " ")))
}

/// Collapse every run of whitespace to one space and trim.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Decode named and numeric character references in a single pass.
pub fn decode_entities(text: &str) -> String {
    decode_html_entities(text).into_owned()
}

/// Same-origin links on a page, resolved against `base`.
///
/// Fragment-only and non-http(s) links are dropped, fragments removed, one
/// trailing slash normalized away. Order of first appearance is kept.
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("a[href]") {
        Ok(s) => s,
        Err(_) => return vec![],
    };

    let mut seen = std::collections::HashSet::new();
    document
        .select(&selector)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter_map(|href| base.join(href).ok())
        .filter(|url| {
            (url.scheme() == "http" || url.scheme() == "https") && url.origin() == base.origin()
        })
        .map(|mut url| {
            url.set_fragment(None);
            strip_trailing_slash(url.as_str()).to_string()
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// Drop a single trailing slash.
pub fn strip_trailing_slash(url: &str) -> &str {
    url.strip_suffix('/').unwrap_or(url)
}

/// `<loc>` entries of a sitemap document.
pub fn parse_sitemap(xml: &str) -> Vec<String> {
    LOC.captures_iter(xml)
        .filter_map(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str().trim()))
        .filter(|loc| !loc.is_empty())
        .collect()
}
