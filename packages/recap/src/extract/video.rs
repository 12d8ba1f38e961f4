//! Video caption extractor.
//!
//! Protocol:
//! 1. Fetch the watch page for the title and the embedded player API key.
//! 2. Ask the player endpoint for caption tracks, identifying as the mobile
//!    client (browser clients get bot checks).
//! 3. Pick one track: manual English, manual any, auto English, auto any.
//! 4. Read the track as json3 timed text, falling back to XML.
//!
//! Every failure is terminal; nothing is retried.

use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};
use url::Url;

use crate::config::VideoConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::extract::html::{collapse_whitespace, decode_entities};
use crate::traits::fetcher::Fetcher;
use crate::types::caption::{select_track, CaptionTrack, Transcript};

lazy_static! {
    static ref API_KEY: Regex =
        Regex::new(r#""(?:INNERTUBE_API_KEY|innertubeApiKey)"\s*:\s*"([^"]+)""#).unwrap();
    static ref META_TITLE: Regex =
        Regex::new(r#"(?i)<meta\s+name="title"\s+content="([^"]*)""#).unwrap();
    static ref PAGE_TITLE: Regex = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").unwrap();
    static ref XML_CUE: Regex =
        Regex::new(r"(?is)<(text|p)\b[^>]*>(.*?)</(?:text|p)>").unwrap();
    static ref XML_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
    video_details: Option<VideoDetails>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: String,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TrackList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackList {
    #[serde(default)]
    caption_tracks: Vec<RawTrack>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoDetails {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TimedText {
    #[serde(default)]
    events: Vec<TimedEvent>,
}

#[derive(Debug, Deserialize)]
struct TimedEvent {
    #[serde(default)]
    segs: Vec<TimedSeg>,
}

#[derive(Debug, Deserialize)]
struct TimedSeg {
    #[serde(default)]
    utf8: String,
}

/// Fetches a video's transcript from its captions.
pub struct CaptionExtractor<F: Fetcher> {
    fetcher: Arc<F>,
    config: VideoConfig,
}

impl<F: Fetcher> CaptionExtractor<F> {
    pub fn new(fetcher: Arc<F>, config: VideoConfig) -> Self {
        Self { fetcher, config }
    }

    /// Fetch and assemble the transcript for a video id.
    pub async fn fetch_captions(&self, video_id: &str) -> ExtractionResult<Transcript> {
        let watch_url = format!("{}{}", self.config.watch_base, video_id);
        debug!(video_id = %video_id, "Fetching watch page");
        let page = self.fetcher.get_text(&watch_url).await?;

        let api_key = extract_api_key(&page).ok_or_else(|| ExtractionError::MissingApiKey {
            video_id: video_id.to_string(),
        })?;
        let page_title = extract_video_title(&page);

        let player = self.fetch_player(video_id, &api_key).await?;

        let playability = player.playability_status.as_ref();
        if playability.map(|s| s.status.as_str()) != Some("OK") {
            return Err(ExtractionError::Unplayable {
                video_id: video_id.to_string(),
                status: playability
                    .map(|s| s.status.clone())
                    .unwrap_or_else(|| "UNKNOWN".to_string()),
                reason: playability.and_then(|s| s.reason.clone()),
            });
        }

        let title = page_title
            .or_else(|| player.video_details.as_ref().and_then(|d| d.title.clone()))
            .unwrap_or_else(|| "Untitled".to_string());

        let tracks = caption_tracks(&player);
        let track = select_track(&tracks).ok_or_else(|| ExtractionError::NoCaptions {
            video_id: video_id.to_string(),
        })?;
        info!(
            video_id = %video_id,
            language = %track.language_code,
            auto_generated = track.is_auto_generated,
            available = tracks.len(),
            "Selected caption track"
        );

        let segments = self.fetch_track(track).await?;
        let transcript = Transcript::from_segments(title, segments);
        if transcript.is_empty() {
            return Err(ExtractionError::EmptyCaptions {
                video_id: video_id.to_string(),
            });
        }

        info!(
            video_id = %video_id,
            segments = transcript.segment_count,
            words = transcript.word_count,
            "Transcript assembled"
        );
        Ok(transcript)
    }

    async fn fetch_player(&self, video_id: &str, api_key: &str) -> ExtractionResult<PlayerResponse> {
        let url = format!("{}?key={}", self.config.player_endpoint, api_key);
        let body = json!({
            "context": {
                "client": {
                    "clientName": self.config.client_name,
                    "clientVersion": self.config.client_version,
                    "androidSdkVersion": self.config.android_sdk_version,
                    "hl": self.config.language,
                }
            },
            "videoId": video_id,
        });

        let text = self.fetcher.post_json(&url, &body).await?.into_body()?;
        serde_json::from_str(&text).map_err(|e| ExtractionError::PlayerResponse {
            video_id: video_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Structured json3 first; unparseable bodies are read as XML, empty
    /// bodies trigger a refetch of the raw track URL.
    async fn fetch_track(&self, track: &CaptionTrack) -> ExtractionResult<Vec<String>> {
        let json_url = with_format(&track.track_url, "json3");
        let body = self.fetcher.get_text(&json_url).await?;

        if body.trim().is_empty() {
            debug!(url = %track.track_url, "Structured captions empty, fetching raw track");
            let raw = self.fetcher.get_text(&track.track_url).await?;
            return Ok(parse_timed_text_xml(&raw));
        }

        match parse_json3(&body) {
            Ok(segments) => Ok(segments),
            Err(e) => {
                debug!(error = %e, "Captions are not json3, parsing as XML");
                Ok(parse_timed_text_xml(&body))
            }
        }
    }
}

fn extract_api_key(page: &str) -> Option<String> {
    API_KEY
        .captures(page)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// `<meta name="title">`, else `<title>` without the site suffix.
fn extract_video_title(page: &str) -> Option<String> {
    let from_meta = META_TITLE
        .captures(page)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str()));
    let from_title = || {
        PAGE_TITLE.captures(page).and_then(|cap| cap.get(1)).map(|m| {
            let title = decode_entities(m.as_str());
            let title = title.trim();
            title.strip_suffix("- YouTube").unwrap_or(title).trim().to_string()
        })
    };
    from_meta
        .filter(|t| !t.trim().is_empty())
        .or_else(from_title)
        .filter(|t| !t.is_empty())
}

fn caption_tracks(player: &PlayerResponse) -> Vec<CaptionTrack> {
    player
        .captions
        .as_ref()
        .and_then(|c| c.player_captions_tracklist_renderer.as_ref())
        .map(|list| {
            list.caption_tracks
                .iter()
                .map(|t| {
                    CaptionTrack::new(
                        t.language_code.clone(),
                        t.kind.as_deref() == Some("asr"),
                        t.base_url.clone(),
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Set the `fmt` query parameter, replacing any existing one.
fn with_format(track_url: &str, fmt: &str) -> String {
    match Url::parse(track_url) {
        Ok(mut url) => {
            let pairs: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "fmt")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(pairs)
                .append_pair("fmt", fmt);
            url.to_string()
        }
        Err(_) => format!("{track_url}&fmt={fmt}"),
    }
}

/// Segments of a json3 timed-text document, one per event.
pub fn parse_json3(body: &str) -> Result<Vec<String>, serde_json::Error> {
    let timed: TimedText = serde_json::from_str(body)?;
    Ok(timed
        .events
        .into_iter()
        .map(|event| {
            let text: String = event.segs.into_iter().map(|s| s.utf8).collect();
            collapse_whitespace(&text)
        })
        .collect())
}

/// Segments of an XML timed-text document (`<text>` or `<p>` cues).
pub fn parse_timed_text_xml(body: &str) -> Vec<String> {
    XML_CUE
        .captures_iter(body)
        .filter_map(|cap| cap.get(2))
        .map(|m| {
            let text = XML_TAG.replace_all(m.as_str(), "");
            // cue text is HTML-escaped inside the XML escaping
            collapse_whitespace(&decode_entities(&decode_entities(&text)))
        })
        .collect()
}
