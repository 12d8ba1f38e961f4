//! URL identity - classification, canonical keys and slugs.
//!
//! Two URLs refer to the same source when their canonical keys are equal:
//!
//! - Videos collapse to `video:<id>` whatever the hostname shape or query noise.
//! - Web pages drop their fragment and one trailing slash; scheme and host are
//!   compared as written, so `http://` and `https://` stay distinct.
//! - Sites collapse to `scheme://host`, the origin being the dedup granularity.

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

use crate::error::IdentityError;
use crate::types::content::ContentKind;

lazy_static! {
    static ref VIDEO_ID: Regex = Regex::new(
        r"(?:(?:www\.|m\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/)|youtu\.be/)([A-Za-z0-9_-]{11})"
    )
    .unwrap();
}

/// Extract the 11-character video id, if this is a video URL.
pub fn video_id(url: &str) -> Option<String> {
    VIDEO_ID
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Decide which extractor handles a URL.
///
/// Video detection runs first; everything else is a single web page unless
/// the caller asked for the whole site.
pub fn classify(url: &str, whole_site: bool) -> ContentKind {
    if whole_site {
        ContentKind::Site
    } else if video_id(url).is_some() {
        ContentKind::Video
    } else {
        ContentKind::Web
    }
}

/// Compute the canonical key of a URL for the given kind.
pub fn canonical_key(url: &str, kind: ContentKind) -> Result<String, IdentityError> {
    match kind {
        ContentKind::Video => video_id(url)
            .map(|id| format!("video:{id}"))
            .ok_or_else(|| IdentityError::NoVideoId { url: url.to_string() }),
        ContentKind::Web => {
            parse(url)?;
            let without_fragment = url.split('#').next().unwrap_or(url);
            Ok(without_fragment
                .strip_suffix('/')
                .unwrap_or(without_fragment)
                .to_string())
        }
        ContentKind::Site => site_root(url),
    }
}

/// Classify and key in one step.
pub fn normalize(url: &str, whole_site: bool) -> Result<(ContentKind, String), IdentityError> {
    let kind = classify(url, whole_site);
    Ok((kind, canonical_key(url, kind)?))
}

/// `scheme://host` of a URL.
pub fn site_root(url: &str) -> Result<String, IdentityError> {
    let parsed = parse(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| IdentityError::NoHost { url: url.to_string() })?;
    Ok(format!("{}://{}", parsed.scheme(), host))
}

fn parse(url: &str) -> Result<Url, IdentityError> {
    Url::parse(url).map_err(|_| IdentityError::InvalidUrl { url: url.to_string() })
}

/// Lowercase, hyphen-separated form of a title, at most `max_len` characters.
pub fn slugify(title: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(title.len());
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    slug.truncate(max_len);
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "untitled".to_string()
    } else {
        slug.to_string()
    }
}

/// Date-prefixed slug for a new artifact. Collisions are possible and accepted.
pub fn make_slug(title: &str, date: NaiveDate, max_len: usize) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), slugify(title, max_len))
}

/// Recognizes URLs that point back into this tool's own rendered output.
#[derive(Debug, Clone, Default)]
pub struct ViewerUrls {
    prefixes: Vec<String>,
}

impl ViewerUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a prefix under which rendered artifacts live.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let mut prefix = prefix.into();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        self.prefixes.push(prefix);
        self
    }

    /// Slug of the artifact a viewer URL shows, if it is one.
    pub fn slug_for(&self, url: &str) -> Option<String> {
        let rest = self
            .prefixes
            .iter()
            .find_map(|prefix| url.strip_prefix(prefix.as_str()))?;
        let name = rest
            .split(['?', '#', '/'])
            .next()
            .unwrap_or_default();
        let slug = name.strip_suffix(".html").unwrap_or(name);
        (!slug.is_empty()).then(|| slug.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_shapes_share_a_key() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ?si=tracking",
        ];
        for url in urls {
            assert_eq!(
                canonical_key(url, ContentKind::Video).unwrap(),
                "video:dQw4w9WgXcQ",
                "{url}"
            );
        }
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ", false), ContentKind::Video);
        assert_eq!(classify("https://example.com/post", false), ContentKind::Web);
        assert_eq!(classify("https://youtu.be/dQw4w9WgXcQ", true), ContentKind::Site);
    }

    #[test]
    fn test_web_key_ignores_fragment_and_trailing_slash() {
        let expected = "https://example.com/docs/page";
        for url in [
            "https://example.com/docs/page",
            "https://example.com/docs/page/",
            "https://example.com/docs/page#intro",
            "https://example.com/docs/page/#intro",
        ] {
            assert_eq!(canonical_key(url, ContentKind::Web).unwrap(), expected, "{url}");
        }
    }

    #[test]
    fn test_web_key_keeps_scheme_and_query() {
        let http = canonical_key("http://example.com/a", ContentKind::Web).unwrap();
        let https = canonical_key("https://example.com/a", ContentKind::Web).unwrap();
        assert_ne!(http, https);
        assert_eq!(
            canonical_key("https://example.com/a?x=1", ContentKind::Web).unwrap(),
            "https://example.com/a?x=1"
        );
    }

    #[test]
    fn test_site_key_is_origin() {
        assert_eq!(
            canonical_key("https://docs.example.com/guide/intro?x=1#y", ContentKind::Site).unwrap(),
            "https://docs.example.com"
        );
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            canonical_key("not a url", ContentKind::Web),
            Err(IdentityError::InvalidUrl { .. })
        ));
        assert!(matches!(
            canonical_key("https://example.com/no-video", ContentKind::Video),
            Err(IdentityError::NoVideoId { .. })
        ));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World! Rust & You", 60), "hello-world-rust-you");
        assert_eq!(slugify("  --  ", 60), "untitled");
        assert_eq!(slugify("abc def ghi", 5), "abc-d");
        assert_eq!(slugify("abc def", 4), "abc");
    }

    #[test]
    fn test_make_slug() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(make_slug("My Page", date, 60), "2024-03-09-my-page");
    }

    #[test]
    fn test_viewer_urls() {
        let viewer = ViewerUrls::new()
            .with_prefix("file:///home/me/.recap/html")
            .with_prefix("http://localhost:8080/view/");

        assert_eq!(
            viewer.slug_for("file:///home/me/.recap/html/2024-01-01-post.html"),
            Some("2024-01-01-post".to_string())
        );
        assert_eq!(
            viewer.slug_for("http://localhost:8080/view/2024-01-01-post.html#top"),
            Some("2024-01-01-post".to_string())
        );
        assert_eq!(viewer.slug_for("https://example.com/2024-01-01-post.html"), None);
        assert_eq!(viewer.slug_for("http://localhost:8080/view/"), None);
    }
}
