use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

pub mod youtube;

pub use youtube::YtDlpCaptionSource;

/// Length of a YouTube video identifier
pub const VIDEO_ID_LEN: usize = 11;

/// URL shapes a video identifier can be pulled from, tried in order.
static VIDEO_ID_PATTERNS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    [
        ("query", r"[?&]v=([A-Za-z0-9_-]{11})"),
        ("short-link", r"youtu\.be/([A-Za-z0-9_-]{11})"),
        ("embed", r"/embed/([A-Za-z0-9_-]{11})"),
        ("legacy", r"/v/([A-Za-z0-9_-]{11})"),
        ("shorts", r"/shorts/([A-Za-z0-9_-]{11})"),
        ("live", r"/live/([A-Za-z0-9_-]{11})"),
    ]
    .into_iter()
    .map(|(name, pattern)| (name, Regex::new(pattern).expect("valid video id pattern")))
    .collect()
});

/// Extract the 11-character video identifier from a YouTube URL.
///
/// Returns `None` when no accepted URL shape matches.
pub fn extract_video_id(url: &str) -> Option<String> {
    VIDEO_ID_PATTERNS.iter().find_map(|(name, pattern)| {
        let id = pattern.captures(url)?.get(1)?.as_str().to_string();
        tracing::trace!("Matched {} URL form: {}", name, id);
        Some(id)
    })
}

/// Errors raised while retrieving a transcript
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("Invalid YouTube URL: {0}")]
    InvalidUrl(String),

    #[error("{tool} is not available. Please install it: https://github.com/yt-dlp/yt-dlp")]
    ToolMissing { tool: String },

    #[error("No captions found for video {video_id} (common causes: no captions, subtitles disabled)")]
    NoCaptions { video_id: String },

    #[error("Video {video_id} is unavailable: {reason}")]
    Unavailable { video_id: String, reason: String },

    #[error("Transcript service error: {0}")]
    Service(String),
}

/// A single time-coded caption fragment
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionRecord {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Duration in seconds
    pub duration: f64,
}

/// Flattened transcript of one video
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    video_id: String,
    text: String,
}

impl Transcript {
    pub fn new(video_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            text: text.into(),
        }
    }

    /// Join caption texts with single spaces, in record order
    pub fn from_captions(video_id: impl Into<String>, captions: &[CaptionRecord]) -> Self {
        let text = captions
            .iter()
            .map(|caption| caption.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        Self::new(video_id, text)
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }

    /// Character length of the trimmed text
    pub fn char_len(&self) -> usize {
        self.text.trim().chars().count()
    }

    pub fn is_usable(&self, min_chars: usize) -> bool {
        self.char_len() >= min_chars
    }
}

/// A service that returns the captions of a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionSource: Send + Sync {
    /// Fetch captions for `video_id` in temporal order
    async fn captions(&self, video_id: &str) -> Result<Vec<CaptionRecord>, FetchError>;

    /// Name used in log output
    fn name(&self) -> &'static str;
}

/// Turns a URL into a flattened transcript
pub struct TranscriptFetcher {
    source: Box<dyn CaptionSource>,
}

impl TranscriptFetcher {
    pub fn new(source: Box<dyn CaptionSource>) -> Self {
        Self { source }
    }

    pub async fn fetch(&self, url: &str) -> Result<Transcript, FetchError> {
        let video_id =
            extract_video_id(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))?;

        tracing::info!("Fetching captions for {} via {}", video_id, self.source.name());
        let captions = self.source.captions(&video_id).await?;

        if captions.is_empty() {
            return Err(FetchError::NoCaptions { video_id });
        }

        tracing::debug!("Received {} caption records", captions.len());
        Ok(Transcript::from_captions(video_id, &captions))
    }
}
