pub mod bilibili;
pub mod douyin;
pub mod douyu;
pub mod generic;
pub mod huya;
pub mod kuaishou;
pub mod netease;
pub mod tiktok;
pub mod yy;

use serde::Deserialize;
use serde_json::Value;

use super::error::ResolverError;

/// Decode a platform payload into its typed model. Shape mismatches surface
/// as malformed-payload errors, the platform's API likely changed upstream.
pub(crate) fn decode<'de, T: Deserialize<'de>>(raw: &'de Value) -> Result<T, ResolverError> {
    T::deserialize(raw).map_err(|e| ResolverError::MalformedPayload(e.to_string()))
}
