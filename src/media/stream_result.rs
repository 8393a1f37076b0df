use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical, quality-selected stream descriptor produced by every resolver.
///
/// When `is_live` is `false` only `anchor_name` may be set; title and all URL
/// fields stay empty so an offline channel never leaks a stale URL.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamResult {
    pub anchor_name: Option<String>,
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Canonical tier name actually delivered, e.g. "OD", "HD".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m3u8_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flv_url: Option<String>,
    /// The URL the recording/playback layer should use. HLS preferred over
    /// FLV unless the platform's policy says otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_url: Option<String>,
}

impl StreamResult {
    /// Minimal result for a channel that is not currently live.
    pub fn offline(anchor_name: Option<String>) -> Self {
        Self {
            anchor_name,
            is_live: false,
            ..Default::default()
        }
    }
}

impl fmt::Display for StreamResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let anchor = self.anchor_name.as_deref().unwrap_or("<unknown>");
        if self.is_live {
            write!(
                f,
                "{} [live, {}] {}",
                anchor,
                self.quality.as_deref().unwrap_or("-"),
                self.record_url.as_deref().unwrap_or("-"),
            )
        } else {
            write!(f, "{anchor} [offline]")
        }
    }
}
