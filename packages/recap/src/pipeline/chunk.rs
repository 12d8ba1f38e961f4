//! Greedy partitioning of a site's pages into budget-sized chunks.

use crate::types::site::{SitePage, SummaryChunk};

/// Split `pages` into contiguous chunks of at most `budget` words.
///
/// Pages are never split or reordered. A page larger than the budget gets a
/// chunk to itself.
pub fn partition_pages(pages: &[SitePage], budget: usize) -> Vec<SummaryChunk<'_>> {
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut words = 0;

    for (i, page) in pages.iter().enumerate() {
        if i > start && words + page.word_count > budget {
            chunks.push(SummaryChunk::new(&pages[start..i]));
            start = i;
            words = 0;
        }
        words += page.word_count;
    }
    if start < pages.len() {
        chunks.push(SummaryChunk::new(&pages[start..]));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sized(counts: &[usize]) -> Vec<SitePage> {
        counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                SitePage::new(format!("https://example.com/{i}"), format!("P{i}"), vec!["w"; n].join(" "))
            })
            .collect()
    }

    fn shape(chunks: &[SummaryChunk<'_>]) -> Vec<usize> {
        chunks.iter().map(|c| c.pages.len()).collect()
    }

    #[test]
    fn test_greedy_packing() {
        let pages = sized(&[40, 30, 20, 50, 10]);
        let chunks = partition_pages(&pages, 100);
        assert_eq!(shape(&chunks), vec![3, 2]);
        assert_eq!(chunks[0].word_count, 90);
        assert_eq!(chunks[1].word_count, 60);
    }

    #[test]
    fn test_oversized_page_stands_alone() {
        let pages = sized(&[10, 150, 10]);
        let chunks = partition_pages(&pages, 100);
        assert_eq!(shape(&chunks), vec![1, 1, 1]);
        assert_eq!(chunks[1].word_count, 150);
    }

    #[test]
    fn test_empty_input() {
        assert!(partition_pages(&[], 100).is_empty());
    }

    proptest! {
        #[test]
        fn prop_partition_preserves_order_and_budget(
            counts in prop::collection::vec(0usize..200, 0..40),
            budget in 1usize..400,
        ) {
            let pages = sized(&counts);
            let chunks = partition_pages(&pages, budget);

            let urls: Vec<&str> = chunks
                .iter()
                .flat_map(|c| c.pages.iter().map(|p| p.page_url.as_str()))
                .collect();
            let expected: Vec<&str> = pages.iter().map(|p| p.page_url.as_str()).collect();
            prop_assert_eq!(urls, expected);

            for chunk in &chunks {
                prop_assert!(!chunk.pages.is_empty());
                prop_assert!(chunk.word_count <= budget || chunk.pages.len() == 1);
            }
        }
    }
}
