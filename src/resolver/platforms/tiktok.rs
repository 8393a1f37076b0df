//! TikTok resolver.
//!
//! Stream candidates are buried two JSON-string levels deep: the room payload
//! embeds `stream_data` as a string, and every candidate embeds its own
//! `sdk_params` string carrying bitrate and resolution. Candidates are sorted
//! by bitrate then resolution; zero-bitrate or resolution-less entries are
//! dropped. Manifests expire per tier, so the selection is probed once over
//! plain HTTP/1.1 (the edge rejects multiplexed probes) with a one-rank shift
//! on failure.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, de};
use serde_json::Value;
use tracing::debug;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::{fallback_rank, pad_to_rank_range};
use crate::resolver::error::ResolverError;
use crate::resolver::probe::Prober;
use crate::resolver::quality::resolve_quality;

const STATUS_LIVE: i64 = 2;

#[derive(Deserialize, Debug)]
struct TiktokPayload {
    #[serde(rename = "LiveRoom")]
    live_room: LiveRoomWrapper,
}

#[derive(Deserialize, Debug)]
struct LiveRoomWrapper {
    #[serde(rename = "liveRoomUserInfo")]
    user_info: LiveRoomUserInfo,
}

#[derive(Deserialize, Debug)]
struct LiveRoomUserInfo {
    user: TiktokUser,
    #[serde(rename = "liveRoom")]
    live_room: Option<LiveRoomDetail>,
}

#[derive(Deserialize, Debug)]
struct TiktokUser {
    nickname: String,
    #[serde(rename = "uniqueId")]
    unique_id: String,
    #[serde(default = "offline_status")]
    status: i64,
}

fn offline_status() -> i64 {
    4
}

#[derive(Deserialize, Debug)]
struct LiveRoomDetail {
    title: String,
    #[serde(rename = "streamData")]
    stream_data: StreamDataWrapper,
}

#[derive(Deserialize, Debug)]
struct StreamDataWrapper {
    pull_data: PullData,
}

#[derive(Deserialize, Debug)]
struct PullData {
    /// JSON document serialized as a string by the platform.
    stream_data: String,
}

#[derive(Deserialize, Debug)]
struct StreamDataDoc {
    #[serde(default)]
    data: FxHashMap<String, StreamOption>,
}

#[derive(Deserialize, Debug)]
struct StreamOption {
    main: MainUrls,
}

#[derive(Deserialize, Debug)]
struct MainUrls {
    flv: Option<String>,
    hls: Option<String>,
    sdk_params: String,
}

#[derive(Deserialize, Debug)]
struct SdkParams {
    #[serde(deserialize_with = "flexible_u64")]
    vbitrate: u64,
    #[serde(rename = "VCodec", default)]
    v_codec: String,
    #[serde(default)]
    resolution: String,
}

/// The platform serializes `vbitrate` sometimes as a number, sometimes as a
/// numeric string.
fn flexible_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| de::Error::custom("negative or fractional bitrate")),
        Value::String(s) => s.parse().map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "unexpected bitrate value: {other}"
        ))),
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    url: String,
    vbitrate: u64,
    resolution: (u32, u32),
}

fn parse_resolution(raw: &str) -> Result<(u32, u32), ResolverError> {
    let (width, height) = raw.split_once('x').ok_or_else(|| {
        ResolverError::MalformedPayload(format!("unparsable resolution {raw:?}"))
    })?;
    let parse = |s: &str| {
        s.parse::<u32>()
            .map_err(|_| ResolverError::MalformedPayload(format!("unparsable resolution {raw:?}")))
    };
    Ok((parse(width)?, parse(height)?))
}

/// Collect and rank the candidates for one URL kind ("flv" or "hls").
fn ranked_candidates(
    doc: &StreamDataDoc,
    kind: UrlKind,
) -> Result<Vec<Candidate>, ResolverError> {
    let mut list = Vec::new();
    for option in doc.data.values() {
        let url_info = &option.main;
        let sdk_params: SdkParams = serde_json::from_str(&url_info.sdk_params)
            .map_err(|e| ResolverError::MalformedPayload(format!("bad sdk_params: {e}")))?;

        let raw_url = match kind {
            UrlKind::Flv => url_info.flv.as_deref(),
            UrlKind::Hls => url_info.hls.as_deref(),
        };
        let url = match raw_url.filter(|u| !u.is_empty()) {
            Some(u) if u.ends_with(".flv") || u.ends_with(".m3u8") => {
                format!("{u}?codec={}", sdk_params.v_codec)
            }
            Some(u) => format!("{u}&codec={}", sdk_params.v_codec),
            None => String::new(),
        };

        if sdk_params.vbitrate == 0 || sdk_params.resolution.is_empty() {
            continue;
        }
        let resolution = parse_resolution(&sdk_params.resolution)?;
        list.push(Candidate {
            url,
            vbitrate: sdk_params.vbitrate,
            resolution,
        });
    }

    // highest bitrate first, resolution breaks ties
    list.sort_by(|a, b| {
        b.vbitrate
            .cmp(&a.vbitrate)
            .then(b.resolution.0.cmp(&a.resolution.0))
            .then(b.resolution.1.cmp(&a.resolution.1))
    });
    Ok(list)
}

#[derive(Debug, Clone, Copy)]
enum UrlKind {
    Flv,
    Hls,
}

pub async fn resolve(
    raw: &Value,
    quality: Option<&str>,
    prober: &dyn Prober,
    proxy: Option<&str>,
) -> Result<StreamResult, ResolverError> {
    if raw.is_null() {
        return Ok(StreamResult::offline(None));
    }

    let payload: TiktokPayload = decode(raw)?;
    let user_info = &payload.live_room.user_info;
    let user = &user_info.user;
    let anchor_name = format!("{}-{}", user.nickname, user.unique_id);

    let mut result = StreamResult::offline(Some(anchor_name));
    if user.status != STATUS_LIVE {
        return Ok(result);
    }

    let live_room = user_info.live_room.as_ref().ok_or_else(|| {
        ResolverError::MalformedPayload("liveRoom missing for a live user".to_string())
    })?;
    let doc: StreamDataDoc = serde_json::from_str(&live_room.stream_data.pull_data.stream_data)
        .map_err(|e| ResolverError::MalformedPayload(format!("bad stream_data: {e}")))?;

    let flv_list = pad_to_rank_range(ranked_candidates(&doc, UrlKind::Flv)?);
    let m3u8_list = pad_to_rank_range(ranked_candidates(&doc, UrlKind::Hls)?);
    if flv_list.is_empty() || m3u8_list.is_empty() {
        return Err(ResolverError::MalformedPayload(
            "no playable candidates".to_string(),
        ));
    }

    let (quality_name, mut rank) = resolve_quality(quality);

    let selected = &m3u8_list[rank];
    let check_url = if selected.url.is_empty() {
        &flv_list[rank].url
    } else {
        &selected.url
    };
    if !prober.probe(check_url, proxy, false).await {
        rank = fallback_rank(rank);
        debug!(rank, "tiktok manifest unreachable, shifting quality rank");
    }

    let flv_url = flv_list[rank].url.clone();
    let m3u8_url = m3u8_list[rank].url.clone();
    let record_url = if m3u8_url.is_empty() {
        flv_url.clone()
    } else {
        m3u8_url.clone()
    };

    result.is_live = true;
    result.title = Some(live_room.title.clone());
    result.quality = Some(quality_name);
    result.m3u8_url = Some(m3u8_url);
    result.flv_url = Some(flv_url);
    result.record_url = Some(record_url);
    Ok(result)
}
