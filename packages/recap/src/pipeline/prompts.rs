//! System prompts for the summarization oracle, one per [`PromptKind`].

use crate::traits::summarizer::{PromptKind, SummaryMeta};

/// Prompt for a single rendered web page.
pub const WEB_PROMPT: &str = r#"You summarize web pages for a personal reading archive.

Write a concise summary in Markdown:
- One paragraph stating what the page is and its main point
- The key facts, arguments or instructions as bullet points
- Any notable numbers, names, dates or links worth keeping

Ignore navigation, cookie notices and advertising that slipped into the text.
Do not invent details that are not in the page."#;

/// Prompt for a video transcript.
pub const VIDEO_PROMPT: &str = r#"You summarize video transcripts for a personal reading archive.

The transcript comes from captions and may lack punctuation or contain
recognition errors. Write a concise summary in Markdown:
- One paragraph stating what the video covers
- The main points in the order they are presented, as bullet points
- Concrete takeaways, recommendations or conclusions

Do not describe the speaker's delivery. Do not invent details."#;

/// Prompt for a whole site, or one contiguous part of it.
pub const SITE_PROMPT: &str = r#"You summarize entire websites for a personal reading archive.

The input is a sequence of pages, each starting with a level-two heading
holding its title and a URL line, separated by horizontal rules. Write a
structured Markdown summary:
- What the site is and who it is for
- A section per major topic or area of the site, citing the page URLs it draws on
- Key facts, offerings, prices, contacts or dates found across the pages

Group related pages together rather than summarizing page by page."#;

/// Prompt for merging per-part site summaries into one.
pub const SITE_MERGE_PROMPT: &str = r#"You merge partial summaries of one website into a single summary.

The input is several summaries, each labelled "Part i of N", each covering a
different group of the site's pages. Do not summarize them again. Instead:
- Remove duplicated points that appear in more than one part
- Reorganize everything into one coherent structure by topic
- Keep every distinct fact, URL and detail from the parts

Output a single structured Markdown summary of the whole site."#;

/// System prompt for a kind of content.
pub fn system_prompt(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::Web => WEB_PROMPT,
        PromptKind::Video => VIDEO_PROMPT,
        PromptKind::Site => SITE_PROMPT,
        PromptKind::SiteMerge => SITE_MERGE_PROMPT,
    }
}

/// User message: source header followed by the content.
pub fn format_user_content(content: &str, meta: &SummaryMeta) -> String {
    format!("Title: {}\nURL: {}\n\n{}", meta.title, meta.url, content)
}

/// Label each part summary and join them for the merge call.
pub fn format_merge_input(parts: &[String]) -> String {
    let total = parts.len();
    parts
        .iter()
        .enumerate()
        .map(|(i, part)| format!("# Part {} of {}\n\n{}", i + 1, total, part.trim()))
        .collect::<Vec<_>>()
        .join("\n\n")
}
