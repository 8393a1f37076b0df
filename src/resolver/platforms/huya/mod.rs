//! Huya resolver.
//!
//! The first CDN record of the room payload supplies URL templates plus a
//! stale anti-code; playback needs a freshly signed one (see [`anti_code`]).
//! When the stale anti-code advertises resolution alternatives (`exsphd`),
//! the numeric ratio suffixes map onto the four lower tiers; `OD`/`BD` always
//! use the unsuffixed base URL.

pub mod anti_code;

pub use anti_code::SignerSeed;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::pad_to_rank_range;
use crate::resolver::error::ResolverError;
use crate::resolver::quality::resolve_quality;

static RATIO_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"264_(\d+)").unwrap());

const RATIO_TIERS: [&str; 4] = ["UHD", "HD", "SD", "LD"];

#[derive(Deserialize, Debug)]
struct HuyaPayload {
    data: Vec<HuyaRoom>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct HuyaRoom {
    game_live_info: GameLiveInfo,
    #[serde(default)]
    game_stream_info_list: Vec<CdnStreamInfo>,
}

#[derive(Deserialize, Debug)]
struct GameLiveInfo {
    #[serde(default)]
    introduction: String,
    #[serde(default)]
    nick: String,
}

#[derive(Deserialize, Debug)]
struct CdnStreamInfo {
    #[serde(rename = "sFlvUrl", default)]
    flv_url: String,
    #[serde(rename = "sStreamName", default)]
    stream_name: String,
    #[serde(rename = "sFlvUrlSuffix", default)]
    flv_url_suffix: String,
    #[serde(rename = "sHlsUrl", default)]
    hls_url: String,
    #[serde(rename = "sHlsUrlSuffix", default)]
    hls_url_suffix: String,
    #[serde(rename = "sFlvAntiCode", default)]
    flv_anti_code: String,
}

/// Ratio suffixes advertised in the stale anti-code, reversed and padded so
/// the four lower tiers are always indexable.
fn ratio_options(exsphd: &str) -> Result<Vec<String>, ResolverError> {
    let ratios: Vec<String> = RATIO_REGEX
        .captures_iter(exsphd)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().to_string()))
        .collect();
    if ratios.is_empty() {
        return Err(ResolverError::MalformedPayload(
            "exsphd advertises no ratios".to_string(),
        ));
    }
    let reversed: Vec<String> = ratios.into_iter().rev().collect();
    Ok(pad_to_rank_range(reversed))
}

pub fn resolve(raw: &Value, quality: Option<&str>) -> Result<StreamResult, ResolverError> {
    resolve_with_seed(raw, quality, SignerSeed::generate())
}

/// Like [`resolve`] but with an explicit signer seed, for deterministic
/// resolution.
pub fn resolve_with_seed(
    raw: &Value,
    quality: Option<&str>,
    seed: SignerSeed,
) -> Result<StreamResult, ResolverError> {
    let payload: HuyaPayload = decode(raw)?;
    let room = payload
        .data
        .first()
        .ok_or_else(|| ResolverError::MalformedPayload("empty data list".to_string()))?;

    let mut result = StreamResult::offline(Some(room.game_live_info.nick.clone()));
    let Some(cdn) = room.game_stream_info_list.first() else {
        return Ok(result);
    };

    let signed = anti_code::sign(&cdn.flv_anti_code, &cdn.stream_name, seed)?;
    let mut flv_url = format!(
        "{}/{}.{}?{}&ratio=",
        cdn.flv_url, cdn.stream_name, cdn.flv_url_suffix, signed
    );
    let mut m3u8_url = format!(
        "{}/{}.{}?{}&ratio=",
        cdn.hls_url, cdn.stream_name, cdn.hls_url_suffix, signed
    );

    let (quality_name, _) = resolve_quality(quality);

    if let Some((_, exsphd)) = cdn.flv_anti_code.split_once("&exsphd=") {
        if quality_name != "OD" && quality_name != "BD" {
            let ratios = ratio_options(exsphd)?;
            let ratio = RATIO_TIERS
                .iter()
                .position(|tier| *tier == quality_name)
                .map(|i| &ratios[i])
                .ok_or_else(|| ResolverError::InvalidQuality {
                    given: quality_name.clone(),
                    options: RATIO_TIERS.join(", "),
                })?;
            flv_url.push_str(ratio);
            m3u8_url.push_str(ratio);
        }
    }

    let record_url = if flv_url.is_empty() {
        m3u8_url.clone()
    } else {
        flv_url.clone()
    };

    result.is_live = true;
    result.title = Some(room.game_live_info.introduction.clone());
    result.quality = Some(quality_name);
    result.m3u8_url = Some(m3u8_url);
    result.flv_url = Some(flv_url);
    result.record_url = Some(record_url);
    Ok(result)
}
