//! Cross-page boilerplate removal.
//!
//! Navigation, sidebars and footers repeat on every page of a site and would
//! otherwise dominate a site summary. Detection is a replaceable policy so it
//! can be tuned without touching the crawler.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::config::BoilerplateConfig;

/// A policy for removing text shared across a site's pages.
pub trait BoilerplateFilter: Send + Sync {
    /// Return the page texts with boilerplate removed, same order and length.
    fn strip(&self, texts: &[String]) -> Vec<String>;
}

/// Leaves every page untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepAll;

impl BoilerplateFilter for KeepAll {
    fn strip(&self, texts: &[String]) -> Vec<String> {
        texts.to_vec()
    }
}

/// Sliding-window frequency filter.
///
/// Every distinct run of `window_words` words is counted once per page. A run
/// found on at least `floor(pages * min_share)` pages is boilerplate, and every
/// occurrence of it is cut from every page. Legitimately repeated content can
/// be cut too.
#[derive(Debug, Clone)]
pub struct WindowFrequencyFilter {
    window_words: usize,
    min_share: f64,
    min_pages: usize,
}

impl Default for WindowFrequencyFilter {
    fn default() -> Self {
        Self::from_config(&BoilerplateConfig::default())
    }
}

impl WindowFrequencyFilter {
    pub fn from_config(config: &BoilerplateConfig) -> Self {
        Self {
            window_words: config.window_words.max(1),
            min_share: config.min_share,
            min_pages: config.min_pages,
        }
    }

    /// Page count a window must reach to be boilerplate.
    fn threshold(&self, pages: usize) -> usize {
        ((pages as f64 * self.min_share).floor() as usize).max(1)
    }

    /// Windows shared by enough pages to count as boilerplate.
    pub fn detect(&self, pages: &[Vec<&str>]) -> HashSet<String> {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for words in pages {
            let distinct: HashSet<String> = words
                .windows(self.window_words)
                .map(|w| w.join(" "))
                .collect();
            for window in distinct {
                *counts.entry(window).or_default() += 1;
            }
        }

        let threshold = self.threshold(pages.len());
        counts
            .into_iter()
            .filter(|(_, count)| *count >= threshold)
            .map(|(window, _)| window)
            .collect()
    }

    fn remove(&self, words: &[&str], boilerplate: &HashSet<String>) -> String {
        let mut cut = vec![false; words.len()];
        for (start, window) in words.windows(self.window_words).enumerate() {
            if boilerplate.contains(&window.join(" ")) {
                cut[start..start + self.window_words].fill(true);
            }
        }
        words
            .iter()
            .zip(cut)
            .filter(|(_, cut)| !cut)
            .map(|(word, _)| *word)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl BoilerplateFilter for WindowFrequencyFilter {
    fn strip(&self, texts: &[String]) -> Vec<String> {
        if texts.len() < self.min_pages {
            return texts.to_vec();
        }

        let pages: Vec<Vec<&str>> = texts
            .iter()
            .map(|t| t.split_whitespace().collect())
            .collect();
        let boilerplate = self.detect(&pages);

        debug!(
            pages = texts.len(),
            boilerplate_windows = boilerplate.len(),
            threshold = self.threshold(texts.len()),
            "Detected cross-page boilerplate"
        );

        if boilerplate.is_empty() {
            return texts.to_vec();
        }

        pages
            .iter()
            .map(|words| self.remove(words, &boilerplate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FOOTER: &str = "Copyright 2024 All Rights Reserved Privacy Policy Terms";

    fn pages(bodies: &[&str]) -> Vec<String> {
        bodies.iter().map(|b| format!("{b} {FOOTER}")).collect()
    }

    #[test]
    fn test_fewer_than_three_pages_is_noop() {
        let filter = WindowFrequencyFilter::default();

        let one = pages(&["alpha beta"]);
        assert_eq!(filter.strip(&one), one);

        let two = pages(&["alpha beta", "gamma delta"]);
        assert_eq!(filter.strip(&two), two);
    }

    #[test]
    fn test_shared_footer_removed_from_all_pages() {
        let filter = WindowFrequencyFilter::default();
        let input = pages(&[
            "Rust ownership explained with borrowing examples",
            "Async runtimes compared in depth today",
            "Error handling patterns for libraries and binaries",
        ]);

        let output = filter.strip(&input);

        assert_eq!(output.len(), 3);
        for text in &output {
            assert!(!text.contains("Copyright 2024"), "{text}");
            assert!(!text.contains("Privacy Policy Terms"), "{text}");
        }
        assert_eq!(output[0], "Rust ownership explained with borrowing examples");
    }

    #[test]
    fn test_threshold_rounds_down() {
        // 4 pages * 0.8 = 3.2 -> 3 pages suffice
        let filter = WindowFrequencyFilter::default();
        let mut input = pages(&["one", "two", "three"]);
        input.push("a page without the shared footer at all".to_string());

        let output = filter.strip(&input);
        assert_eq!(output[0], "one");
        assert_eq!(output[3], input[3]);
    }

    #[test]
    fn test_repeats_within_one_page_count_once() {
        let filter = WindowFrequencyFilter::default();
        let input = vec![
            format!("{FOOTER} {FOOTER} {FOOTER}"),
            "completely different words live on this second page here".to_string(),
            "and the third page also has its own unrelated content".to_string(),
        ];
        assert_eq!(filter.strip(&input), input);
    }

    #[test]
    fn test_overlapping_windows_remove_longer_runs() {
        let filter = WindowFrequencyFilter::default();
        let nav = "Home Docs Blog About Pricing Careers Contact Login Signup";
        let input: Vec<String> = ["first body", "second body", "third body"]
            .iter()
            .map(|b| format!("{nav} {b}"))
            .collect();

        assert_eq!(
            filter.strip(&input),
            vec!["first body", "second body", "third body"]
        );
    }

    #[test]
    fn test_keep_all() {
        let input = pages(&["a", "b", "c"]);
        assert_eq!(KeepAll.strip(&input), input);
    }
}
