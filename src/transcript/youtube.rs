use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;
use url::Url;

use super::{CaptionRecord, CaptionSource, FetchError};
use crate::config::TranscriptConfig;

/// Fragments of yt-dlp diagnostics that mean the video itself cannot be read
const UNAVAILABLE_MARKERS: &[&str] = &[
    "private video",
    "video unavailable",
    "not available in your country",
    "blocked it in your country",
    "sign in to confirm your age",
    "members-only",
];

/// A caption track chosen from yt-dlp metadata
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub language: String,
    pub url: String,
    pub automatic: bool,
}

/// Caption source backed by yt-dlp metadata and YouTube's json3 caption format
pub struct YtDlpCaptionSource {
    yt_dlp_path: String,
    languages: Vec<String>,
    client: Client,
}

impl YtDlpCaptionSource {
    pub fn new(config: &TranscriptConfig) -> Self {
        Self {
            yt_dlp_path: config.yt_dlp_path.clone(),
            languages: config.languages.clone(),
            client: Client::new(),
        }
    }

    /// Get video metadata, including caption track listings
    async fn video_info(&self, video_id: &str) -> Result<Value, FetchError> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        tracing::debug!("Reading caption listings for: {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-json", "--skip-download", "--no-playlist", "--no-warnings", &url])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => FetchError::ToolMissing {
                    tool: self.yt_dlp_path.clone(),
                },
                _ => FetchError::Service(format!("failed to run {}: {}", self.yt_dlp_path, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_yt_dlp_failure(video_id, &stderr));
        }

        serde_json::from_slice(&output.stdout)
            .map_err(|e| FetchError::Service(format!("unreadable yt-dlp output: {}", e)))
    }

    async fn download_track(&self, track: &CaptionTrack) -> Result<Vec<CaptionRecord>, FetchError> {
        tracing::debug!(
            "Downloading {} captions ({})",
            track.language,
            if track.automatic { "automatic" } else { "manual" }
        );

        let response = self
            .client
            .get(&track.url)
            .send()
            .await
            .map_err(|e| FetchError::Service(format!("caption download failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(FetchError::Service(format!(
                "caption download failed: HTTP {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Service(format!("caption download failed: {}", e)))?;

        parse_json3(&body)
    }
}

#[async_trait]
impl CaptionSource for YtDlpCaptionSource {
    async fn captions(&self, video_id: &str) -> Result<Vec<CaptionRecord>, FetchError> {
        let info = self.video_info(video_id).await?;

        let track = select_caption_track(&info, &self.languages).ok_or_else(|| {
            FetchError::NoCaptions {
                video_id: video_id.to_string(),
            }
        })?;

        self.download_track(&track).await
    }

    fn name(&self) -> &'static str {
        "yt-dlp"
    }
}

/// Map a failed yt-dlp run to a fetch error
pub fn classify_yt_dlp_failure(video_id: &str, stderr: &str) -> FetchError {
    let reason = stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("unknown error")
        .trim_start_matches("ERROR:")
        .trim()
        .to_string();

    let lowered = stderr.to_lowercase();
    if UNAVAILABLE_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        FetchError::Unavailable {
            video_id: video_id.to_string(),
            reason,
        }
    } else {
        FetchError::Service(format!("yt-dlp failed: {}", reason))
    }
}

/// Pick a caption track from yt-dlp metadata.
///
/// Preference: manual subtitles in a preferred language, automatic captions
/// in a preferred language, any manual track, then the automatic track in
/// the video's original language.
pub fn select_caption_track(info: &Value, languages: &[String]) -> Option<CaptionTrack> {
    let manual = info.get("subtitles").and_then(Value::as_object);
    let automatic = info.get("automatic_captions").and_then(Value::as_object);

    for (tracks, is_automatic) in [(manual, false), (automatic, true)] {
        let Some(tracks) = tracks else { continue };
        for language in languages {
            let prefix = format!("{}-", language);
            let exact = tracks.iter().filter(|(code, _)| code.as_str() == language);
            let prefixed = tracks.iter().filter(|(code, _)| code.starts_with(&prefix));

            // A listed code without a usable format does not end the search
            let found = exact
                .chain(prefixed)
                .find_map(|(code, formats)| Some((code, json3_url(formats)?)));

            if let Some((code, url)) = found {
                return Some(CaptionTrack {
                    language: code.clone(),
                    url,
                    automatic: is_automatic,
                });
            }
        }
    }

    let any_manual = manual.and_then(|tracks| {
        tracks
            .iter()
            .find_map(|(code, formats)| Some((code, json3_url(formats)?)))
            .map(|(code, url)| CaptionTrack {
                language: code.clone(),
                url,
                automatic: false,
            })
    });

    any_manual.or_else(|| {
        automatic?
            .iter()
            .filter(|(code, _)| code.ends_with("-orig"))
            .find_map(|(code, formats)| {
                Some(CaptionTrack {
                    language: code.clone(),
                    url: json3_url(formats)?,
                    automatic: true,
                })
            })
    })
}

/// URL of the json3 rendition of a track, rewriting another format if needed
fn json3_url(formats: &Value) -> Option<String> {
    let formats = formats.as_array()?;

    if let Some(url) = formats
        .iter()
        .find(|f| f["ext"].as_str() == Some("json3"))
        .and_then(|f| f["url"].as_str())
    {
        return Some(url.to_string());
    }

    let mut url = Url::parse(formats.first()?["url"].as_str()?).ok()?;
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "fmt")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("fmt", "json3");

    Some(url.to_string())
}

#[derive(Debug, Deserialize)]
struct Json3Captions {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Segment>,
}

#[derive(Debug, Deserialize)]
struct Json3Segment {
    #[serde(default)]
    utf8: String,
}

/// Convert a json3 caption document into caption records
pub fn parse_json3(body: &str) -> Result<Vec<CaptionRecord>, FetchError> {
    let captions: Json3Captions = serde_json::from_str(body)
        .map_err(|e| FetchError::Service(format!("unreadable caption data: {}", e)))?;

    let records = captions
        .events
        .into_iter()
        .filter_map(|event| {
            let text = event
                .segs
                .iter()
                .map(|seg| seg.utf8.as_str())
                .collect::<String>()
                .replace('\n', " ");
            let text = text.trim();

            (!text.is_empty()).then(|| CaptionRecord {
                text: text.to_string(),
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
            })
        })
        .collect();

    Ok(records)
}
