use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use chrono::Utc;
use savannah_core::storage::ObjectStore;
use savannah_core::{CoreError, CoreResult};
use serde::Serialize;

use crate::app_config::StorageConfig;

/// Cache header applied to every uploaded object.
pub const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// S3 bucket behind the `ObjectStore` seam.
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStore {
    /// Uses default AWS credentials from the environment or instance role.
    pub async fn new(config: &StorageConfig) -> Self {
        let aws = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()))
            .load()
            .await;
        let public_base_url = config
            .public_base_url
            .clone()
            .unwrap_or_else(|| format!("https://{}.s3.{}.amazonaws.com", config.bucket, config.region));

        Self {
            client: Client::new(&aws),
            bucket: config.bucket.clone(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put_object(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
        cache_control: &str,
    ) -> CoreResult<String> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .cache_control(cache_control)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(key, error = %e, "S3 upload failed");
                CoreError::Internal(format!("upload failed: {e}"))
            })?;
        Ok(format!("{}/{}", self.public_base_url, key))
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UploadedObject {
    pub key: String,
    pub url: String,
    pub content_type: String,
}

/// Names, types and stores uploaded files.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    base_prefix: String,
}

impl Uploader {
    pub fn new(store: Arc<dyn ObjectStore>, base_prefix: impl Into<String>) -> Self {
        Self {
            store,
            base_prefix: base_prefix.into(),
        }
    }

    pub async fn upload(
        &self,
        file_name: &str,
        folder: Option<&str>,
        bytes: Vec<u8>,
    ) -> CoreResult<UploadedObject> {
        let prefix = folder
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(&self.base_prefix);
        let key = object_key(
            prefix,
            file_name,
            Utc::now().timestamp_millis(),
            rand::random::<u16>(),
        );
        let content_type = content_type_for(file_name);
        let size = bytes.len();
        let url = self
            .store
            .put_object(&key, bytes, content_type, CACHE_CONTROL)
            .await?;
        tracing::info!(%key, size, content_type, "Object uploaded");

        Ok(UploadedObject {
            key,
            url,
            content_type: content_type.to_string(),
        })
    }
}

/// `{prefix}/{safe_base}{millis}{4 hex}{ext}`, with an empty prefix dropped.
pub fn object_key(prefix: &str, file_name: &str, millis: i64, salt: u16) -> String {
    let (base, ext) = split_extension(file_name);
    let safe_base: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let name = format!("{safe_base}{millis}{salt:04x}{ext}");
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        name
    } else {
        format!("{prefix}/{name}")
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let (_, ext) = split_extension(file_name);
    match ext.to_ascii_lowercase().as_str() {
        ".png" => "image/png",
        ".jpg" | ".jpeg" => "image/jpeg",
        ".gif" => "image/gif",
        ".webp" => "image/webp",
        ".svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Splits `photo.final.png` into `("photo.final", ".png")`. Dotfiles have no extension.
fn split_extension(file_name: &str) -> (&str, &str) {
    let file_name = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    match file_name.rfind('.') {
        Some(0) | None => (file_name, ""),
        Some(idx) => file_name.split_at(idx),
    }
}
