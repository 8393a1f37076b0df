//! The stream resolution engine.
//!
//! A [`Resolver`] owns the external collaborators (reachability prober,
//! optional mid-resolution fetchers, opaque proxy/cookie pass-through) and
//! dispatches payloads over the closed [`Platform`] set. Every resolution is
//! an independent, stateless computation over its inputs; nothing is shared
//! between calls.

pub mod candidates;
pub mod error;
pub mod fetch;
pub mod platforms;
pub mod probe;
pub mod quality;

use std::sync::Arc;

use serde_json::Value;

use crate::media::StreamResult;
use error::ResolverError;
use fetch::{BilibiliStreamFetcher, DouyuStreamFetcher};
use platforms::generic::GenericOptions;
use probe::{HttpProber, Prober};

/// The closed set of supported platforms.
///
/// Platforms whose fetcher already returns a pre-ranked `play_url_list`
/// share [`Platform::Generic`] with their extraction knobs attached.
#[derive(Debug, Clone)]
pub enum Platform {
    Douyin,
    Tiktok,
    Kuaishou,
    Huya,
    Douyu,
    Yy,
    Bilibili,
    Netease,
    Generic(GenericOptions),
}

pub struct Resolver {
    prober: Arc<dyn Prober>,
    douyu_fetcher: Option<Arc<dyn DouyuStreamFetcher>>,
    bilibili_fetcher: Option<Arc<dyn BilibiliStreamFetcher>>,
    proxy: Option<String>,
    cookies: Option<String>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::with_prober(Arc::new(HttpProber))
    }

    pub fn with_prober(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            douyu_fetcher: None,
            bilibili_fetcher: None,
            proxy: None,
            cookies: None,
        }
    }

    pub fn douyu_fetcher(mut self, fetcher: Arc<dyn DouyuStreamFetcher>) -> Self {
        self.douyu_fetcher = Some(fetcher);
        self
    }

    pub fn bilibili_fetcher(mut self, fetcher: Arc<dyn BilibiliStreamFetcher>) -> Self {
        self.bilibili_fetcher = Some(fetcher);
        self
    }

    pub fn proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn cookies(mut self, cookies: impl Into<String>) -> Self {
        self.cookies = Some(cookies.into());
        self
    }

    /// Resolve one platform payload into a canonical [`StreamResult`].
    pub async fn resolve(
        &self,
        platform: &Platform,
        payload: &Value,
        quality: Option<&str>,
    ) -> Result<StreamResult, ResolverError> {
        let proxy = self.proxy.as_deref();
        let cookies = self.cookies.as_deref();
        match platform {
            Platform::Douyin => {
                platforms::douyin::resolve(payload, quality, self.prober.as_ref(), proxy).await
            }
            Platform::Tiktok => {
                platforms::tiktok::resolve(payload, quality, self.prober.as_ref(), proxy).await
            }
            Platform::Kuaishou => platforms::kuaishou::resolve(payload, quality),
            Platform::Huya => platforms::huya::resolve(payload, quality),
            Platform::Douyu => {
                let fetcher = self
                    .douyu_fetcher
                    .as_deref()
                    .ok_or(ResolverError::MissingFetcher("douyu"))?;
                platforms::douyu::resolve(payload, quality, fetcher, cookies, proxy).await
            }
            Platform::Yy => platforms::yy::resolve(payload),
            Platform::Bilibili => {
                let fetcher = self
                    .bilibili_fetcher
                    .as_deref()
                    .ok_or(ResolverError::MissingFetcher("bilibili"))?;
                platforms::bilibili::resolve(payload, quality, fetcher, proxy, cookies).await
            }
            Platform::Netease => platforms::netease::resolve(payload, quality),
            Platform::Generic(options) => platforms::generic::resolve(payload, quality, options),
        }
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe::stub::StubProber;
    use serde_json::json;

    #[tokio::test]
    async fn dispatches_to_the_platform_resolver() {
        let resolver = Resolver::with_prober(Arc::new(StubProber::new(true)));
        let payload = json!({
            "anchor_name": "anchor",
            "is_live": true,
            "flv_url_list": [
                {"url": "https://flv.example.com/a.flv", "bitrate": 5000},
                {"url": "https://flv.example.com/b.flv", "bitrate": 900},
            ],
        });
        let result = resolver
            .resolve(&Platform::Kuaishou, &payload, Some("HD"))
            .await
            .unwrap();
        assert_eq!(
            result.record_url.as_deref(),
            Some("https://flv.example.com/b.flv")
        );
    }

    #[tokio::test]
    async fn douyu_without_a_fetcher_is_an_error() {
        let resolver = Resolver::with_prober(Arc::new(StubProber::new(true)));
        let payload = json!({"anchor_name": "anchor", "is_live": true, "room_id": 1});
        let err = resolver
            .resolve(&Platform::Douyu, &payload, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ResolverError::MissingFetcher("douyu")));
    }

    #[tokio::test]
    async fn generic_platform_carries_its_options() {
        let resolver = Resolver::with_prober(Arc::new(StubProber::new(true)));
        let payload = json!({
            "is_live": true,
            "anchor_name": "anchor",
            "title": "t",
            "play_url_list": ["https://hls.example.com/od.m3u8"],
        });
        let platform = Platform::Generic(GenericOptions::default());
        let result = resolver.resolve(&platform, &payload, None).await.unwrap();
        assert_eq!(
            result.m3u8_url.as_deref(),
            Some("https://hls.example.com/od.m3u8")
        );
    }
}
