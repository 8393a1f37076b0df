//! Douyin resolver.
//!
//! The room payload carries one CDN-keyed URL map per protocol; map insertion
//! order is the platform's quality order, highest first. Manifest URLs are
//! known to expire for individual tiers, so the selected tier is probed once
//! and shifted by one rank when unreachable.

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::{fallback_rank, pad_to_rank_range};
use crate::resolver::error::ResolverError;
use crate::resolver::probe::Prober;
use crate::resolver::quality::resolve_quality;

const STATUS_LIVE: i64 = 2;
const STATUS_OFFLINE: i64 = 4;

#[derive(Deserialize, Debug)]
struct DouyinPayload {
    anchor_name: Option<String>,
    #[serde(default = "offline_status")]
    status: i64,
    title: Option<String>,
    stream_url: Option<DouyinStreamUrl>,
}

fn offline_status() -> i64 {
    STATUS_OFFLINE
}

#[derive(Deserialize, Debug)]
struct DouyinStreamUrl {
    flv_pull_url: Map<String, Value>,
    hls_pull_url_map: Map<String, Value>,
}

fn collect_urls(map: &Map<String, Value>, what: &str) -> Result<Vec<String>, ResolverError> {
    if map.is_empty() {
        return Err(ResolverError::MalformedPayload(format!("empty {what}")));
    }
    map.values()
        .map(|v| {
            v.as_str().map(str::to_string).ok_or_else(|| {
                ResolverError::MalformedPayload(format!("non-string url in {what}"))
            })
        })
        .collect()
}

pub async fn resolve(
    raw: &Value,
    quality: Option<&str>,
    prober: &dyn Prober,
    proxy: Option<&str>,
) -> Result<StreamResult, ResolverError> {
    let payload: DouyinPayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if payload.status != STATUS_LIVE {
        return Ok(result);
    }

    let stream_url = payload.stream_url.as_ref().ok_or_else(|| {
        ResolverError::MalformedPayload("stream_url missing for a live room".to_string())
    })?;
    let title = payload.title.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("title missing for a live room".to_string())
    })?;

    let flv_urls = pad_to_rank_range(collect_urls(&stream_url.flv_pull_url, "flv_pull_url")?);
    let m3u8_urls = pad_to_rank_range(collect_urls(&stream_url.hls_pull_url_map, "hls_pull_url_map")?);

    let (quality_name, mut rank) = resolve_quality(quality);

    if !prober.probe(&m3u8_urls[rank], proxy, true).await {
        rank = fallback_rank(rank);
        debug!(rank, "douyin manifest unreachable, shifting quality rank");
    }

    let m3u8_url = m3u8_urls[rank].clone();
    let flv_url = flv_urls[rank].clone();
    let record_url = if m3u8_url.is_empty() {
        flv_url.clone()
    } else {
        m3u8_url.clone()
    };

    result.is_live = true;
    result.title = Some(title);
    result.quality = Some(quality_name);
    result.m3u8_url = Some(m3u8_url);
    result.flv_url = Some(flv_url);
    result.record_url = Some(record_url);
    Ok(result)
}
