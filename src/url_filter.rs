/// Decides which URL changes are worth reporting
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use url::Url;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlFilter {
    /// Report every URL change
    #[default]
    All,
    /// Report only YouTube video pages
    Youtube,
}

impl UrlFilter {
    pub fn accepts(self, url: &str) -> bool {
        match self {
            UrlFilter::All => true,
            UrlFilter::Youtube => video_id(url).is_some(),
        }
    }
}

/// Extract the 11-character video id from a YouTube URL
///
/// Recognised forms:
/// - https://www.youtube.com/watch?v=<id>
/// - https://youtu.be/<id>
/// - https://www.youtube.com/shorts/<id> and /embed/<id>
pub fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }

    let host = parsed.host_str()?.to_lowercase();
    let candidate = if host == "youtu.be" {
        parsed.path_segments()?.next().map(str::to_string)
    } else if host == "youtube.com" || host.ends_with(".youtube.com") {
        let mut segments = parsed.path_segments()?;
        match segments.next() {
            Some("watch") => parsed
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            Some("shorts") | Some("embed") => segments.next().map(str::to_string),
            _ => None,
        }
    } else {
        None
    };

    candidate.filter(|id| VIDEO_ID.is_match(id))
}
