pub mod browser;
pub mod fetcher;
pub mod session;
pub mod store;
pub mod summarizer;
