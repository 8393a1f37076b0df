//! YY resolver. Single CDN, origin quality only: the pre-fetched
//! `stream_line_addr` lookup already carries the final FLV URL.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::decode;
use crate::media::StreamResult;
use crate::resolver::error::ResolverError;

#[derive(Deserialize, Debug)]
struct YyPayload {
    #[serde(default)]
    anchor_name: String,
    title: Option<String>,
    avp_info_res: Option<AvpInfoRes>,
}

#[derive(Deserialize, Debug)]
struct AvpInfoRes {
    stream_line_addr: Map<String, Value>,
}

pub fn resolve(raw: &Value) -> Result<StreamResult, ResolverError> {
    let payload: YyPayload = decode(raw)?;

    let mut result = StreamResult::offline(Some(payload.anchor_name.clone()));
    let Some(avp_info) = &payload.avp_info_res else {
        return Ok(result);
    };

    let flv_url = avp_info
        .stream_line_addr
        .values()
        .next()
        .and_then(|line| line.get("cdn_info"))
        .and_then(|cdn| cdn.get("url"))
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ResolverError::MalformedPayload("stream_line_addr carries no cdn url".to_string())
        })?
        .to_string();
    let title = payload.title.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("title missing for a live room".to_string())
    })?;

    result.is_live = true;
    result.title = Some(title);
    result.quality = Some("OD".to_string());
    result.flv_url = Some(flv_url.clone());
    result.record_url = Some(flv_url);
    Ok(result)
}
