use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::http::{HttpError, RequestOptions, get_text_with_retries};

/// Shown for every resolution failure; causes are only logged.
pub(crate) const RESOLUTION_FAILED_MESSAGE: &str =
    "Could not load this video. Please try again later.";

const SAMPLE_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

#[derive(Debug, Error)]
pub(crate) enum SourceError {
    #[error("episode must be 1 or greater")]
    InvalidEpisode,
    #[error("source request failed: {0}")]
    Request(#[from] HttpError),
    #[error("source response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no playable source for {title_id} episode {episode}")]
    Empty { title_id: String, episode: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct QualitySource {
    pub(crate) quality: String,
    pub(crate) url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Subtitle {
    #[serde(default)]
    pub(crate) lang: String,
    #[serde(default)]
    pub(crate) label: String,
    pub(crate) url: String,
}

/// Playable URLs for one episode, best quality first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub(crate) struct VideoSource {
    #[serde(default)]
    pub(crate) url: String,
    #[serde(default)]
    pub(crate) sources: Vec<QualitySource>,
    #[serde(default)]
    pub(crate) subtitles: Vec<Subtitle>,
}

impl VideoSource {
    /// Quality variants, falling back to the bare `url` as a single "auto" entry.
    /// Entries with blank URLs are dropped.
    pub(crate) fn playable(&self) -> Vec<QualitySource> {
        let mut playable: Vec<QualitySource> = self
            .sources
            .iter()
            .filter(|source| !source.url.trim().is_empty())
            .cloned()
            .collect();
        if playable.is_empty() && !self.url.trim().is_empty() {
            playable.push(QualitySource {
                quality: "auto".to_string(),
                url: self.url.clone(),
            });
        }
        playable
    }
}

pub(crate) trait SourceResolver {
    fn resolve(&self, title_id: &str, episode: u32) -> Result<VideoSource, SourceError>;
}

/// Fetches `GET {base}/api/video/{title}/{episode}`.
#[derive(Debug, Clone)]
pub(crate) struct HttpSourceResolver {
    base_url: String,
    options: RequestOptions,
}

impl HttpSourceResolver {
    pub(crate) fn new(base_url: impl Into<String>, options: RequestOptions) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            options,
        }
    }

    fn endpoint(&self, title_id: &str, episode: u32) -> String {
        format!("{}/api/video/{title_id}/{episode}", self.base_url)
    }
}

impl SourceResolver for HttpSourceResolver {
    fn resolve(&self, title_id: &str, episode: u32) -> Result<VideoSource, SourceError> {
        if episode == 0 {
            return Err(SourceError::InvalidEpisode);
        }
        let url = self.endpoint(title_id, episode);
        debug!(%url, "resolving video source");
        let body = get_text_with_retries(&url, &self.options)?;
        let source = parse_video_source(&body)?;
        if source.playable().is_empty() {
            return Err(SourceError::Empty {
                title_id: title_id.to_string(),
                episode,
            });
        }
        info!(
            title_id,
            episode,
            qualities = source.sources.len(),
            "video source resolved"
        );
        Ok(source)
    }
}

pub(crate) fn parse_video_source(raw: &str) -> Result<VideoSource, serde_json::Error> {
    serde_json::from_str(raw)
}

/// In-process stand-in for the catalog backend: every episode resolves to the
/// same sample clip in three labelled qualities.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct MockSourceResolver;

impl SourceResolver for MockSourceResolver {
    fn resolve(&self, _title_id: &str, episode: u32) -> Result<VideoSource, SourceError> {
        if episode == 0 {
            return Err(SourceError::InvalidEpisode);
        }
        let sources = ["1080p", "720p", "360p"]
            .into_iter()
            .map(|quality| QualitySource {
                quality: quality.to_string(),
                url: SAMPLE_VIDEO_URL.to_string(),
            })
            .collect();
        Ok(VideoSource {
            url: SAMPLE_VIDEO_URL.to_string(),
            sources,
            subtitles: Vec::new(),
        })
    }
}

impl<R: SourceResolver + ?Sized> SourceResolver for Box<R> {
    fn resolve(&self, title_id: &str, episode: u32) -> Result<VideoSource, SourceError> {
        (**self).resolve(title_id, episode)
    }
}
