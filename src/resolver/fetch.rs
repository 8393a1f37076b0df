//! Mid-resolution fetcher collaborators.
//!
//! Two platforms cannot hand over a final URL in their room payload: the
//! quality-selected stream record has to be looked up with a second request.
//! Those lookups live behind these traits so the resolvers stay pure over
//! their inputs. Cookie strings and proxy addresses are passed through
//! opaquely, the resolvers never interpret them.

use async_trait::async_trait;
use serde_json::Value;

use super::error::ResolverError;

/// Fetches the rate-selected stream record for a Douyu room.
#[async_trait]
pub trait DouyuStreamFetcher: Send + Sync {
    /// `rate` is Douyu's own rate id ("0" = origin, "3" = ultra, ...).
    async fn fetch_stream_data(
        &self,
        room_id: &str,
        rate: &str,
        cookies: Option<&str>,
        proxy: Option<&str>,
    ) -> Result<Value, ResolverError>;
}

/// Fetches the final play URL for a Bilibili room at a given quality number.
#[async_trait]
pub trait BilibiliStreamFetcher: Send + Sync {
    async fn fetch_play_url(
        &self,
        room_url: &str,
        qn: &str,
        platform: &str,
        proxy: Option<&str>,
        cookies: Option<&str>,
    ) -> Result<String, ResolverError>;
}
