use async_trait::async_trait;

use crate::CoreResult;

/// Blob store used for guide photos and uploads.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` and return the public URL.
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> CoreResult<String>;
}
