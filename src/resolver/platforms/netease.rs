//! Netease CC resolver.
//!
//! Qualities arrive as named resolution buckets. A fixed priority order is
//! intersected with whatever the payload actually carries, padded, and
//! rank-indexed; the first CDN of the selected bucket wins.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::pad_to_rank_range;
use crate::resolver::error::ResolverError;
use crate::resolver::quality::resolve_quality;

/// Bucket names, highest quality first.
const BUCKET_ORDER: [&str; 4] = ["blueray", "ultra", "high", "standard"];

#[derive(Deserialize, Debug)]
struct NeteasePayload {
    #[serde(default)]
    is_live: bool,
    anchor_name: Option<String>,
    title: Option<String>,
    m3u8_url: Option<String>,
    stream_list: Option<StreamList>,
}

#[derive(Deserialize, Debug)]
struct StreamList {
    resolution: Map<String, Value>,
}

fn first_cdn_url(bucket: &Value) -> Result<String, ResolverError> {
    bucket
        .get("cdn")
        .and_then(Value::as_object)
        .and_then(|cdns| cdns.values().next())
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ResolverError::MalformedPayload("resolution bucket carries no cdn url".to_string())
        })
}

pub fn resolve(raw: &Value, quality: Option<&str>) -> Result<StreamResult, ResolverError> {
    let payload: NeteasePayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if !payload.is_live {
        return Ok(result);
    }

    let anchor_name = payload.anchor_name.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("anchor_name missing for a live room".to_string())
    })?;
    let title = payload.title.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("title missing for a live room".to_string())
    })?;
    let m3u8_url = payload.m3u8_url.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("m3u8_url missing for a live room".to_string())
    })?;

    let (quality_name, rank) = resolve_quality(quality);

    let mut flv_url = None;
    if let Some(stream_list) = &payload.stream_list {
        let buckets: Vec<&str> = BUCKET_ORDER
            .iter()
            .copied()
            .filter(|name| stream_list.resolution.contains_key(*name))
            .collect();
        if buckets.is_empty() {
            return Err(ResolverError::MalformedPayload(
                "no known resolution buckets".to_string(),
            ));
        }
        let buckets = pad_to_rank_range(buckets);
        let selected = buckets[rank];
        flv_url = Some(first_cdn_url(&stream_list.resolution[selected])?);
    }

    result.is_live = true;
    result.anchor_name = Some(anchor_name);
    result.title = Some(title);
    result.quality = Some(quality_name);
    result.record_url = Some(
        flv_url
            .clone()
            .unwrap_or_else(|| m3u8_url.clone()),
    );
    result.m3u8_url = Some(m3u8_url);
    result.flv_url = flv_url;
    Ok(result)
}
