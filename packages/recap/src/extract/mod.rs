//! Extractors - turning a URL into text.

pub mod boilerplate;
pub mod html;
pub mod page;
pub mod site;
pub mod video;

pub use boilerplate::{BoilerplateFilter, KeepAll, WindowFrequencyFilter};
pub use html::{extract_page, html_to_text, PageText};
pub use page::LivePageExtractor;
pub use site::SiteCrawler;
pub use video::CaptionExtractor;
