//! Engine configuration.

use serde::{Deserialize, Serialize};

/// What happens when an existing member joins a game again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejoinPolicy {
    /// Re-join is a no-op; the existing sheet is untouched.
    Preserve,
    /// Re-join rewrites the member's sheet to a fresh default character.
    Reset,
}

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum operations per write set (fan-outs are chunked to this).
    pub max_transact_items: usize,
    /// Mime types accepted by requestAssetUpload.
    pub allowed_asset_mime_types: Vec<String>,
    /// Upper bound on declared asset size.
    pub max_asset_size_bytes: i64,
    /// Pending uploads older than this are fair game for the sweeper.
    pub asset_cleanup_timeout_ms: u64,
    /// Lifetime of issued upload URLs.
    pub upload_url_expires_secs: u64,
    /// Blob bucket that receives asset uploads.
    pub asset_bucket: String,
    /// Behavior of joinGame for an existing member.
    pub rejoin_policy: RejoinPolicy,
    /// When true the GM may delete assets on any member's section, not
    /// only NPC-owned ones.
    pub gm_asset_override: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_transact_items: 100,
            allowed_asset_mime_types: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "image/gif".into(),
                "image/webp".into(),
            ],
            max_asset_size_bytes: 20 * 1024 * 1024,
            asset_cleanup_timeout_ms: 60 * 60 * 1000,
            upload_url_expires_secs: 900,
            asset_bucket: "fireside-assets".into(),
            rejoin_policy: RejoinPolicy::Preserve,
            gm_asset_override: false,
        }
    }
}

impl EngineConfig {
    /// Small limits for tests.
    pub fn for_testing() -> Self {
        Self {
            max_asset_size_bytes: 1024,
            asset_cleanup_timeout_ms: 1000,
            ..Default::default()
        }
    }
}
