//! Summarizer implementations backed by hosted language models.

pub mod openai;

pub use openai::OpenAiSummarizer;
