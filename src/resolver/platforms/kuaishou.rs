//! Kuaishou resolver.
//!
//! FLV candidates sometimes carry explicit bitrates; selection is then
//! threshold-based against a per-tier bitrate ceiling instead of
//! rank-indexed. Lists without bitrates arrive lowest-quality first and are
//! reversed before the usual rank lookup.

use serde::Deserialize;
use serde_json::Value;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::candidates::pad_to_rank_range;
use crate::resolver::error::ResolverError;
use crate::resolver::quality::resolve_quality;

/// Per-tier bitrate ceilings, declaration order matches the tier list so
/// digit specs index it the same way.
const BITRATE_CEILINGS: [(&str, u64); 6] = [
    ("OD", 99999),
    ("BD", 4000),
    ("UHD", 2000),
    ("HD", 1000),
    ("SD", 800),
    ("LD", 600),
];

/// Resolve a quality spec against the bitrate ceiling table. Unknown names
/// (and digits past the table) fall back to the unbounded ceiling, keeping
/// the permissive default of the tier model.
fn resolve_bitrate_ceiling(spec: Option<&str>) -> (String, u64) {
    let spec = spec.unwrap_or("");
    if spec.is_empty() {
        let (name, ceiling) = BITRATE_CEILINGS[0];
        return (name.to_string(), ceiling);
    }

    let name = spec.to_uppercase();
    if name.bytes().all(|b| b.is_ascii_digit()) {
        let index = (name.as_bytes()[0] - b'0') as usize;
        if let Some((name, ceiling)) = BITRATE_CEILINGS.get(index) {
            return ((*name).to_string(), *ceiling);
        }
    }

    let ceiling = BITRATE_CEILINGS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .unwrap_or(BITRATE_CEILINGS[0].1);
    (name, ceiling)
}

#[derive(Deserialize, Debug)]
struct KuaishouPayload {
    anchor_name: Option<String>,
    #[serde(default)]
    is_live: bool,
    m3u8_url_list: Option<Vec<UrlEntry>>,
    flv_url_list: Option<Vec<FlvEntry>>,
}

#[derive(Deserialize, Debug, Clone)]
struct UrlEntry {
    url: String,
}

#[derive(Deserialize, Debug, Clone)]
struct FlvEntry {
    url: String,
    bitrate: Option<u64>,
}

/// First candidate (highest first) whose bitrate fits under the ceiling,
/// else the lowest-bitrate one.
fn threshold_select(sorted_desc: &[FlvEntry], ceiling: u64) -> &FlvEntry {
    sorted_desc
        .iter()
        .find(|entry| entry.bitrate.unwrap_or(0) <= ceiling)
        .unwrap_or(&sorted_desc[sorted_desc.len() - 1])
}

pub fn resolve(raw: &Value, quality: Option<&str>) -> Result<StreamResult, ResolverError> {
    let payload: KuaishouPayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if !payload.is_live {
        return Ok(result);
    }

    let (mut quality_name, rank) = resolve_quality(quality);

    if let Some(m3u8_list) = &payload.m3u8_url_list {
        if m3u8_list.is_empty() {
            return Err(ResolverError::MalformedPayload(
                "empty m3u8_url_list".to_string(),
            ));
        }
        // lowest quality first upstream
        let list: Vec<UrlEntry> = m3u8_list.iter().rev().cloned().collect();
        let list = pad_to_rank_range(list);
        result.m3u8_url = Some(list[rank].url.clone());
    }

    if let Some(flv_list) = &payload.flv_url_list {
        if flv_list.is_empty() {
            return Err(ResolverError::MalformedPayload(
                "empty flv_url_list".to_string(),
            ));
        }
        if flv_list[0].bitrate.is_some() {
            let mut sorted = flv_list.clone();
            sorted.sort_by(|a, b| b.bitrate.unwrap_or(0).cmp(&a.bitrate.unwrap_or(0)));
            let (name, ceiling) = resolve_bitrate_ceiling(quality);
            quality_name = name;
            result.flv_url = Some(threshold_select(&sorted, ceiling).url.clone());
        } else {
            let list: Vec<FlvEntry> = flv_list.iter().rev().cloned().collect();
            let list = pad_to_rank_range(list);
            result.flv_url = Some(list[rank].url.clone());
        }
    }

    result.is_live = true;
    result.quality = Some(quality_name);
    // FLV preferred on this platform
    result.record_url = result.flv_url.clone().or_else(|| result.m3u8_url.clone());
    Ok(result)
}
