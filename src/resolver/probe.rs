use async_trait::async_trait;
use reqwest::Client;
use rustls::{ClientConfig, crypto::ring};
use rustls_platform_verifier::BuilderVerifierExt;
use std::sync::Arc;
use tracing::debug;

pub(crate) const DEFAULT_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// Reachability check against a candidate playback URL.
///
/// Implemented by the transport layer; resolvers call it at most once per
/// resolution and never retry. Timeouts and cancellation belong to the
/// implementation, not to the resolvers.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Returns whether `url` currently answers with a success status.
    /// `http2 = false` asks for a plain HTTP/1.1 attempt; some CDN edges
    /// reject a multiplexed handshake on manifest URLs.
    async fn probe(&self, url: &str, proxy: Option<&str>, http2: bool) -> bool;
}

/// Default `Prober` backed by reqwest with platform-verified rustls.
pub struct HttpProber;

impl HttpProber {
    fn build_client(proxy: Option<&str>, http2: bool) -> Client {
        let provider = Arc::new(ring::default_provider());
        let tls_config = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .expect("Failed to configure default TLS protocol versions")
            .with_platform_verifier()
            .expect("Failed to configure platform certificate verifier")
            .with_no_client_auth();

        let mut builder = Client::builder()
            .use_preconfigured_tls(tls_config)
            .user_agent(DEFAULT_UA)
            .timeout(std::time::Duration::from_secs(30));

        if !http2 {
            builder = builder.http1_only();
        }

        if let Some(proxy) = proxy {
            match reqwest::Proxy::all(proxy) {
                Ok(proxy) => builder = builder.proxy(proxy),
                Err(e) => {
                    debug!("failed to configure proxy '{proxy}': {e}");
                }
            }
        }

        builder.build().expect("Failed to create HTTP client")
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str, proxy: Option<&str>, http2: bool) -> bool {
        let client = Self::build_client(proxy, http2);
        match client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!("probe of {url} failed: {e}");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod stub {
    use super::*;
    use std::sync::Mutex;

    /// Scripted prober for tests, records every probed URL.
    pub(crate) struct StubProber {
        pub reachable: bool,
        pub calls: Mutex<Vec<(String, bool)>>,
    }

    impl StubProber {
        pub(crate) fn new(reachable: bool) -> Self {
            Self {
                reachable,
                calls: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        pub(crate) fn probed_urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|(url, _)| url.clone())
                .collect()
        }
    }

    #[async_trait]
    impl Prober for StubProber {
        async fn probe(&self, url: &str, _proxy: Option<&str>, http2: bool) -> bool {
            self.calls.lock().unwrap().push((url.to_string(), http2));
            self.reachable
        }
    }
}
