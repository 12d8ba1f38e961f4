//! Caption types - tracks offered for a video and the transcript built from one.

use serde::{Deserialize, Serialize};

use crate::types::content::count_words;

/// A caption track listed by the player endpoint.
///
/// Tracks are ranked and one is consumed; they are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionTrack {
    pub language_code: String,
    pub is_auto_generated: bool,
    pub track_url: String,
}

impl CaptionTrack {
    pub fn new(
        language_code: impl Into<String>,
        is_auto_generated: bool,
        track_url: impl Into<String>,
    ) -> Self {
        Self {
            language_code: language_code.into(),
            is_auto_generated,
            track_url: track_url.into(),
        }
    }

    /// `en` and regional variants like `en-GB`.
    pub fn is_english(&self) -> bool {
        let code = self.language_code.to_ascii_lowercase();
        code == "en" || code.starts_with("en-")
    }

    /// Lower is better: manual English, manual any, auto English, auto any.
    pub fn priority(&self) -> u8 {
        match (self.is_auto_generated, self.is_english()) {
            (false, true) => 0,
            (false, false) => 1,
            (true, true) => 2,
            (true, false) => 3,
        }
    }
}

/// Pick exactly one track; ties go to the earliest in list order.
pub fn select_track(tracks: &[CaptionTrack]) -> Option<&CaptionTrack> {
    // min_by_key keeps the first of equal minima
    tracks.iter().min_by_key(|t| t.priority())
}

/// The text of a video, built from one caption track.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    pub title: String,
    /// Non-empty segments joined by newlines, in time order
    pub text: String,
    pub segment_count: usize,
    pub word_count: usize,
}

impl Transcript {
    /// Build from raw segments, dropping empty ones.
    pub fn from_segments(title: impl Into<String>, segments: Vec<String>) -> Self {
        let kept: Vec<String> = segments
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let text = kept.join("\n");
        Self {
            title: title.into(),
            word_count: count_words(&text),
            segment_count: kept.len(),
            text,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segment_count == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(lang: &str, auto: bool) -> CaptionTrack {
        CaptionTrack::new(lang, auto, format!("https://captions/{lang}/{auto}"))
    }

    #[test]
    fn test_manual_english_wins_regardless_of_order() {
        let orders = [
            vec![track("en", false), track("en", true), track("fr", false)],
            vec![track("en", true), track("fr", false), track("en", false)],
            vec![track("fr", false), track("en", false), track("en", true)],
        ];
        for tracks in &orders {
            let chosen = select_track(tracks).unwrap();
            assert_eq!(chosen, &track("en", false));
        }
    }

    #[test]
    fn test_manual_other_language_beats_auto_english() {
        let tracks = vec![track("en", true), track("de", false)];
        assert_eq!(select_track(&tracks).unwrap().language_code, "de");
    }

    #[test]
    fn test_auto_english_beats_auto_other() {
        let tracks = vec![track("es", true), track("en-US", true)];
        assert_eq!(select_track(&tracks).unwrap().language_code, "en-US");
    }

    #[test]
    fn test_ties_keep_list_order() {
        let tracks = vec![track("de", false), track("fr", false)];
        assert_eq!(select_track(&tracks).unwrap().language_code, "de");
    }

    #[test]
    fn test_no_tracks() {
        assert!(select_track(&[]).is_none());
    }

    #[test]
    fn test_transcript_drops_empty_segments() {
        let t = Transcript::from_segments("T", vec!["hello".into(), "  ".into(), "world".into()]);
        assert_eq!(t.text, "hello\nworld");
        assert_eq!(t.segment_count, 2);
        assert_eq!(t.word_count, 2);
        assert!(!t.is_empty());
    }
}
