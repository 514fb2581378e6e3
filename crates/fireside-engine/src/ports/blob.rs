//! Blob-store port.
//!
//! Asset bytes never pass through the core; the blob store issues a
//! time-limited upload URL and the client uploads directly.

use async_trait::async_trait;
use shared_types::CoreError;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Issues a presigned upload URL for one object key.
    async fn issue_upload_url(
        &self,
        bucket: &str,
        key: &str,
        mime_type: &str,
        expires_secs: u64,
    ) -> Result<String, CoreError>;
}
