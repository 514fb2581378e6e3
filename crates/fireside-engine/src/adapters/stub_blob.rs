//! Stub blob store issuing deterministic URLs.

use crate::ports::BlobStore;
use async_trait::async_trait;
use shared_types::CoreError;

/// Local adapter: no signing, just a predictable URL shape.
#[derive(Debug, Default, Clone)]
pub struct StubBlobStore;

#[async_trait]
impl BlobStore for StubBlobStore {
    async fn issue_upload_url(
        &self,
        bucket: &str,
        key: &str,
        _mime_type: &str,
        expires_secs: u64,
    ) -> Result<String, CoreError> {
        Ok(format!(
            "https://{bucket}.blob.local/{key}?expires={expires_secs}"
        ))
    }
}
