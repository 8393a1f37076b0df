//! Douyu resolver.
//!
//! The room payload only identifies the room; the rate-selected stream record
//! comes from a second lookup through the [`DouyuStreamFetcher`]
//! collaborator. Quality maps onto Douyu's own rate ids before the lookup.

use serde::Deserialize;
use serde_json::Value;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::error::ResolverError;
use crate::resolver::fetch::DouyuStreamFetcher;
use crate::resolver::quality::resolve_quality;

fn rate_for(quality_name: &str) -> &'static str {
    match quality_name {
        "OD" | "BD" => "0",
        "UHD" => "3",
        "HD" => "2",
        "SD" | "LD" => "1",
        // unknown tiers fall back to origin quality
        _ => "0",
    }
}

#[derive(Deserialize, Debug)]
struct DouyuPayload {
    anchor_name: Option<String>,
    #[serde(default)]
    is_live: bool,
    title: Option<String>,
    room_id: Option<Value>,
}

fn room_id_string(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

pub async fn resolve(
    raw: &Value,
    quality: Option<&str>,
    fetcher: &dyn DouyuStreamFetcher,
    cookies: Option<&str>,
    proxy: Option<&str>,
) -> Result<StreamResult, ResolverError> {
    let payload: DouyuPayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if !payload.is_live {
        return Ok(result);
    }

    let room_id = payload
        .room_id
        .as_ref()
        .and_then(room_id_string)
        .ok_or_else(|| {
            ResolverError::MalformedPayload("room_id missing for a live room".to_string())
        })?;

    let (quality_name, _) = resolve_quality(quality);
    let rate = rate_for(&quality_name);

    let stream_data = fetcher
        .fetch_stream_data(&room_id, rate, cookies, proxy)
        .await?;
    let data = stream_data.get("data").ok_or_else(|| {
        ResolverError::MalformedPayload("douyu stream response missing data".to_string())
    })?;

    result.is_live = true;
    result.title = payload.title.clone();

    let rtmp_url = data.get("rtmp_url").and_then(Value::as_str).unwrap_or("");
    let rtmp_live = data.get("rtmp_live").and_then(Value::as_str);
    if let Some(rtmp_live) = rtmp_live.filter(|s| !s.is_empty()) {
        let flv_url = format!("{rtmp_url}/{rtmp_live}");
        result.quality = Some(quality_name);
        result.flv_url = Some(flv_url.clone());
        result.record_url = Some(flv_url);
    }
    Ok(result)
}
