use std::fmt;
use std::str::FromStr;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Length of a canonical hosted-video identifier.
pub const VIDEO_ID_LEN: usize = 11;

/// Canonical 11-character video identifier (`[A-Za-z0-9_-]{11}`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct VideoId(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a canonical video id: {0:?}")]
pub struct InvalidVideoId(pub String);

impl VideoId {
    /// Accepts only an already-canonical identifier; use [`resolve_video_id`]
    /// for URLs.
    pub fn parse(candidate: &str) -> Option<Self> {
        is_canonical(candidate).then(|| Self(candidate.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }

    /// Embed URL with the JS API enabled for the given page origin.
    pub fn embed_url(&self, origin: Option<&str>) -> String {
        let origin = utf8_percent_encode(origin.unwrap_or_default(), NON_ALPHANUMERIC);
        format!(
            "https://www.youtube.com/embed/{}?enablejsapi=1&origin={}",
            self.0, origin
        )
    }

    pub fn thumbnail_url(&self, quality: ThumbnailQuality) -> String {
        format!("https://img.youtube.com/vi/{}/{}", self.0, quality.file_name())
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for VideoId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for VideoId {
    type Err = InvalidVideoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| InvalidVideoId(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThumbnailQuality {
    Default,
    Medium,
    #[default]
    High,
    Standard,
    MaxRes,
}

impl ThumbnailQuality {
    pub fn file_name(&self) -> &'static str {
        match self {
            ThumbnailQuality::Default => "default.jpg",
            ThumbnailQuality::Medium => "mqdefault.jpg",
            ThumbnailQuality::High => "hqdefault.jpg",
            ThumbnailQuality::Standard => "sddefault.jpg",
            ThumbnailQuality::MaxRes => "maxresdefault.jpg",
        }
    }
}

fn is_canonical(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn is_watch_host(host: &str) -> bool {
    ["youtube.com", "youtube-nocookie.com"]
        .iter()
        .any(|domain| host == *domain || host.ends_with(&format!(".{}", domain)))
}

fn is_short_link_host(host: &str) -> bool {
    host == "youtu.be" || host.ends_with(".youtu.be")
}

fn segment_after<'a>(segments: &[&'a str], marker: &str) -> Option<&'a str> {
    let index = segments.iter().position(|segment| *segment == marker)?;
    segments.get(index + 1).copied()
}

/// Extracts a canonical video identifier from a raw ID or a watch, short,
/// embed or shorts URL.
///
/// Surrounding whitespace and double quotes are ignored. Recognized URL forms
/// are tried in order: `v` query parameter on a youtube.com host, the segment
/// after `embed/`, the segment after `shorts/`, and the last segment of a
/// youtu.be link. The first candidate that is itself canonical wins.
pub fn resolve_video_id(input: Option<&str>) -> Option<VideoId> {
    let trimmed = input?.trim().trim_matches('"');
    if trimmed.is_empty() {
        return None;
    }
    if let Some(id) = VideoId::parse(trimmed) {
        return Some(id);
    }

    let url = Url::parse(trimmed).ok()?;
    let host = url.host_str()?.to_ascii_lowercase();
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if is_watch_host(&host)
        && let Some((_, v)) = url.query_pairs().find(|(key, _)| key == "v")
        && let Some(id) = VideoId::parse(&v)
    {
        return Some(id);
    }

    for marker in ["embed", "shorts"] {
        if let Some(id) = segment_after(&segments, marker).and_then(VideoId::parse) {
            return Some(id);
        }
    }

    if is_short_link_host(&host) {
        return segments.last().copied().and_then(VideoId::parse);
    }

    None
}

/// Parses an ISO-8601 time duration such as `PT1H2M3S` into whole seconds.
///
/// Components must appear in H, M, S order; each is optional.
pub fn parse_iso8601_duration(value: &str) -> Option<u64> {
    let mut rest = value.trim().strip_prefix("PT")?;
    let mut total = 0u64;
    let mut last_rank = 0;

    while !rest.is_empty() {
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        let amount: u64 = rest[..digits].parse().ok()?;
        let (rank, multiplier) = match rest[digits..].chars().next()? {
            'H' => (1, 3600),
            'M' => (2, 60),
            'S' => (3, 1),
            _ => return None,
        };
        if rank <= last_rank {
            return None;
        }
        last_rank = rank;
        total = total.checked_add(amount.checked_mul(multiplier)?)?;
        rest = &rest[digits + 1..];
    }

    Some(total)
}
