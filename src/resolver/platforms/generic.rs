//! Generic resolver for platforms whose fetcher already returns a pre-ranked
//! `play_url_list` (one record per rank, highest quality first).
//!
//! A record is either a bare URL string or a per-format object; an optional
//! key picks the URL out of the record. The `use_prefetched` flag substitutes
//! the payload's top-level `m3u8_url`/`flv_url` fields when the upstream
//! fetcher already performed selection and this call should only repackage.

use serde::Deserialize;
use serde_json::Value;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::pad_to_rank_range;
use crate::resolver::error::ResolverError;
use crate::resolver::quality::resolve_quality;

/// Which URL kinds to extract from the selected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    All,
    Hls,
    Flv,
}

/// Key into a per-rank record: an object field or a list position.
#[derive(Debug, Clone)]
pub enum PlayUrlKey {
    Name(String),
    Index(usize),
}

#[derive(Debug, Clone)]
pub struct GenericOptions {
    pub url_kind: UrlKind,
    /// Substitute the payload's pre-selected top-level URL fields.
    pub use_prefetched: bool,
    pub hls_key: Option<PlayUrlKey>,
    pub flv_key: Option<PlayUrlKey>,
}

impl Default for GenericOptions {
    fn default() -> Self {
        Self {
            url_kind: UrlKind::Hls,
            use_prefetched: false,
            hls_key: None,
            flv_key: None,
        }
    }
}

#[derive(Deserialize, Debug)]
struct GenericPayload {
    #[serde(default)]
    is_live: bool,
    anchor_name: Option<String>,
    title: Option<String>,
    m3u8_url: Option<String>,
    flv_url: Option<String>,
    #[serde(default)]
    play_url_list: Vec<Value>,
}

fn extract_url(record: &Value, key: Option<&PlayUrlKey>) -> Result<String, ResolverError> {
    let value = match key {
        None => record,
        Some(PlayUrlKey::Name(name)) => record.get(name).ok_or_else(|| {
            ResolverError::MalformedPayload(format!("play_url_list record missing {name:?}"))
        })?,
        Some(PlayUrlKey::Index(index)) => record.get(*index).ok_or_else(|| {
            ResolverError::MalformedPayload(format!("play_url_list record missing index {index}"))
        })?,
    };
    value.as_str().map(str::to_string).ok_or_else(|| {
        ResolverError::MalformedPayload("play_url_list entry is not a url string".to_string())
    })
}

fn prefetched(payload_url: &Option<String>, field: &str) -> Result<String, ResolverError> {
    payload_url.clone().ok_or_else(|| {
        ResolverError::MalformedPayload(format!("{field} missing for a pre-selected payload"))
    })
}

pub fn resolve(
    raw: &Value,
    quality: Option<&str>,
    options: &GenericOptions,
) -> Result<StreamResult, ResolverError> {
    let payload: GenericPayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if !payload.is_live {
        return Ok(result);
    }

    if payload.play_url_list.is_empty() {
        return Err(ResolverError::MalformedPayload(
            "empty play_url_list".to_string(),
        ));
    }
    let play_url_list = pad_to_rank_range(payload.play_url_list.clone());

    let (quality_name, rank) = resolve_quality(quality);
    let record = &play_url_list[rank];

    match options.url_kind {
        UrlKind::All => {
            let m3u8_url = extract_url(record, options.hls_key.as_ref())?;
            let flv_url = extract_url(record, options.flv_key.as_ref())?;
            result.record_url = Some(m3u8_url.clone());
            result.m3u8_url = Some(if options.use_prefetched {
                prefetched(&payload.m3u8_url, "m3u8_url")?
            } else {
                m3u8_url
            });
            result.flv_url = Some(if options.use_prefetched {
                prefetched(&payload.flv_url, "flv_url")?
            } else {
                flv_url
            });
        }
        UrlKind::Hls => {
            let m3u8_url = extract_url(record, options.hls_key.as_ref())?;
            result.record_url = Some(m3u8_url.clone());
            result.m3u8_url = Some(if options.use_prefetched {
                prefetched(&payload.m3u8_url, "m3u8_url")?
            } else {
                m3u8_url
            });
        }
        UrlKind::Flv => {
            let flv_url = extract_url(record, options.flv_key.as_ref())?;
            result.record_url = Some(flv_url.clone());
            result.flv_url = Some(flv_url);
        }
    }

    result.is_live = true;
    result.title = payload.title.clone();
    result.quality = Some(quality_name);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn keyed_payload() -> Value {
        json!({
            "is_live": true,
            "anchor_name": "anchor",
            "title": "room title",
            "play_url_list": [
                {"hls": "https://hls.example.com/od.m3u8", "flv": "https://flv.example.com/od.flv"},
                {"hls": "https://hls.example.com/hd.m3u8", "flv": "https://flv.example.com/hd.flv"},
            ],
        })
    }

    #[test]
    fn offline_payload_short_circuits() {
        let payload = json!({"anchor_name": "anchor", "is_live": false});
        let result = resolve(&payload, None, &GenericOptions::default()).unwrap();
        assert_eq!(result, StreamResult::offline(Some("anchor".to_string())));
    }

    #[test]
    fn bare_string_records_need_no_key() {
        let payload = json!({
            "is_live": true,
            "anchor_name": "anchor",
            "title": "t",
            "play_url_list": ["https://hls.example.com/od.m3u8"],
        });
        let result = resolve(&payload, Some("LD"), &GenericOptions::default()).unwrap();
        // single record padded across all ranks
        assert_eq!(
            result.m3u8_url.as_deref(),
            Some("https://hls.example.com/od.m3u8")
        );
        assert_eq!(result.record_url, result.m3u8_url);
    }

    #[test]
    fn extracts_both_kinds_with_named_keys() {
        let options = GenericOptions {
            url_kind: UrlKind::All,
            hls_key: Some(PlayUrlKey::Name("hls".to_string())),
            flv_key: Some(PlayUrlKey::Name("flv".to_string())),
            ..Default::default()
        };
        let result = resolve(&keyed_payload(), Some("BD"), &options).unwrap();
        assert_eq!(
            result.m3u8_url.as_deref(),
            Some("https://hls.example.com/od.m3u8")
        );
        assert_eq!(
            result.flv_url.as_deref(),
            Some("https://flv.example.com/od.flv")
        );
        // HLS is the recording choice for the combined kind
        assert_eq!(
            result.record_url.as_deref(),
            Some("https://hls.example.com/od.m3u8")
        );
        assert_eq!(result.quality.as_deref(), Some("BD"));
    }

    #[test]
    fn index_keys_address_list_records() {
        let payload = json!({
            "is_live": true,
            "anchor_name": "anchor",
            "play_url_list": [
                ["https://flv.example.com/od.flv", "https://hls.example.com/od.m3u8"],
            ],
        });
        let options = GenericOptions {
            url_kind: UrlKind::Flv,
            flv_key: Some(PlayUrlKey::Index(0)),
            ..Default::default()
        };
        let result = resolve(&payload, None, &options).unwrap();
        assert_eq!(
            result.flv_url.as_deref(),
            Some("https://flv.example.com/od.flv")
        );
        assert_eq!(result.record_url, result.flv_url);
        assert!(result.title.is_none());
    }

    #[test]
    fn prefetched_fields_substitute_the_displayed_urls() {
        let mut payload = keyed_payload();
        payload["m3u8_url"] = json!("https://hls.example.com/preselected.m3u8");
        payload["flv_url"] = json!("https://flv.example.com/preselected.flv");
        let options = GenericOptions {
            url_kind: UrlKind::All,
            use_prefetched: true,
            hls_key: Some(PlayUrlKey::Name("hls".to_string())),
            flv_key: Some(PlayUrlKey::Name("flv".to_string())),
        };
        let result = resolve(&payload, Some("HD"), &options).unwrap();
        assert_eq!(
            result.m3u8_url.as_deref(),
            Some("https://hls.example.com/preselected.m3u8")
        );
        assert_eq!(
            result.flv_url.as_deref(),
            Some("https://flv.example.com/preselected.flv")
        );
        // the recording URL still comes from the indexed record
        assert_eq!(
            result.record_url.as_deref(),
            Some("https://hls.example.com/hd.m3u8")
        );
    }

    #[test]
    fn empty_play_url_list_is_malformed() {
        let payload = json!({
            "is_live": true,
            "anchor_name": "anchor",
            "play_url_list": [],
        });
        assert!(matches!(
            resolve(&payload, None, &GenericOptions::default()),
            Err(ResolverError::MalformedPayload(_))
        ));
    }
}
