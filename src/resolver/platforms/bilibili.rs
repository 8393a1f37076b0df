//! Bilibili resolver.
//!
//! Quality maps onto Bilibili's `qn` numbers and the final play URL comes
//! from the [`BilibiliStreamFetcher`] collaborator. `OD` and `BD` share a
//! rank but not a `qn`: origin is 10000, bluray 400.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::decode;
use crate::media::StreamResult;
use crate::resolver::error::ResolverError;
use crate::resolver::fetch::BilibiliStreamFetcher;
use crate::resolver::quality::resolve_quality;

fn qn_for(quality_name: &str) -> &'static str {
    match quality_name {
        "BD" => "400",
        "UHD" => "250",
        "HD" => "150",
        "SD" | "LD" => "80",
        // OD and unknown tiers request origin quality
        _ => "10000",
    }
}

/// The platform reports `live_status` as 0/1 or as a bool depending on the
/// endpoint.
fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_i64().unwrap_or(0) != 0,
        Value::Null => false,
        _ => true,
    })
}

#[derive(Deserialize, Debug)]
struct BilibiliPayload {
    anchor_name: Option<String>,
    #[serde(default, deserialize_with = "truthy")]
    live_status: bool,
    room_url: Option<String>,
    title: Option<String>,
}

pub async fn resolve(
    raw: &Value,
    quality: Option<&str>,
    fetcher: &dyn BilibiliStreamFetcher,
    proxy: Option<&str>,
    cookies: Option<&str>,
) -> Result<StreamResult, ResolverError> {
    let payload: BilibiliPayload = decode(raw)?;

    let mut result = StreamResult::offline(payload.anchor_name.clone());
    if !payload.live_status {
        return Ok(result);
    }

    let room_url = payload.room_url.as_deref().ok_or_else(|| {
        ResolverError::MalformedPayload("room_url missing for a live room".to_string())
    })?;
    let title = payload.title.clone().ok_or_else(|| {
        ResolverError::MalformedPayload("title missing for a live room".to_string())
    })?;

    let (quality_name, _) = resolve_quality(quality);
    let qn = qn_for(&quality_name);

    let play_url = fetcher
        .fetch_play_url(room_url, qn, "web", proxy, cookies)
        .await?;

    result.is_live = true;
    result.title = Some(title);
    result.quality = Some(quality_name);
    result.record_url = Some(play_url);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    struct StubFetcher {
        calls: Mutex<Vec<(String, String, String)>>,
    }

    impl StubFetcher {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl BilibiliStreamFetcher for StubFetcher {
        async fn fetch_play_url(
            &self,
            room_url: &str,
            qn: &str,
            platform: &str,
            _proxy: Option<&str>,
            _cookies: Option<&str>,
        ) -> Result<String, ResolverError> {
            self.calls.lock().unwrap().push((
                room_url.to_string(),
                qn.to_string(),
                platform.to_string(),
            ));
            Ok(format!("https://cn-live.example.com/live.flv?qn={qn}"))
        }
    }

    fn live_payload() -> Value {
        json!({
            "anchor_name": "anchor",
            "live_status": 1,
            "room_url": "https://live.bilibili.com/1234",
            "title": "room title",
        })
    }

    #[tokio::test]
    async fn numeric_live_status_zero_is_offline() {
        let payload = json!({"anchor_name": "anchor", "live_status": 0});
        let fetcher = StubFetcher::new();
        let result = resolve(&payload, None, &fetcher, None, None).await.unwrap();
        assert_eq!(result, StreamResult::offline(Some("anchor".to_string())));
        assert!(fetcher.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delegates_the_play_url_lookup() {
        let fetcher = StubFetcher::new();
        let result = resolve(&live_payload(), Some("BD"), &fetcher, None, None)
            .await
            .unwrap();
        assert!(result.is_live);
        assert_eq!(result.quality.as_deref(), Some("BD"));
        assert_eq!(
            result.record_url.as_deref(),
            Some("https://cn-live.example.com/live.flv?qn=400")
        );
        // no direct flv/m3u8 fields on this platform
        assert!(result.flv_url.is_none());
        assert!(result.m3u8_url.is_none());
        assert_eq!(
            fetcher.calls.lock().unwrap().as_slice(),
            &[(
                "https://live.bilibili.com/1234".to_string(),
                "400".to_string(),
                "web".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn quality_names_map_to_qn_numbers() {
        for (quality, qn) in [
            ("OD", "10000"),
            ("UHD", "250"),
            ("HD", "150"),
            ("SD", "80"),
            ("LD", "80"),
            ("1", "400"),
        ] {
            let fetcher = StubFetcher::new();
            resolve(&live_payload(), Some(quality), &fetcher, None, None)
                .await
                .unwrap();
            assert_eq!(fetcher.calls.lock().unwrap()[0].1, qn, "{quality}");
        }
    }
}
