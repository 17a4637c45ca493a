use log::info;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::RecordId;
use crate::services::logged;
use crate::storage::FileOptions;
use crate::Marketplace;

/// Where an uploaded photo ended up
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedPhoto {
    pub public_url: String,
    /// Path inside the bucket, used to remove it later
    pub path: String,
}

/// Product and profile photos in object storage
pub struct PhotoService<'a> {
    market: &'a Marketplace,
}

/// `productos/<user>/<uuid>-<file>`, so uploads never collide
pub fn product_photo_path(user_id: &RecordId, file_name: &str) -> String {
    let file_name: String = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let file_name = if file_name.is_empty() { "foto".to_string() } else { file_name };
    format!("productos/{}/{}-{}", user_id, Uuid::new_v4(), file_name)
}

impl<'a> PhotoService<'a> {
    pub(crate) fn new(market: &'a Marketplace) -> Self {
        Self { market }
    }

    /// Upload without overwriting and return the public URL
    pub async fn upload(
        &self,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<UploadedPhoto> {
        let mut options = FileOptions::default().with_upsert(false);
        if let Some(content_type) = content_type {
            options = options.with_content_type(content_type);
        }

        let storage = self.market.storage();
        let bucket_client = storage.from(bucket);
        let result = bucket_client.upload(path, bytes, options).await;
        let uploaded = logged("uploading photo", result)?;

        let stored_path = uploaded
            .key
            .strip_prefix(&format!("{}/", bucket))
            .unwrap_or(path.trim_start_matches('/'))
            .to_string();
        let public_url = bucket_client.get_public_url(&stored_path);
        info!("uploaded {}", public_url);

        Ok(UploadedPhoto {
            public_url,
            path: stored_path,
        })
    }

    /// Upload a product photo for `user_id` into the configured bucket
    pub async fn upload_product_photo(
        &self,
        user_id: &RecordId,
        file_name: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<UploadedPhoto> {
        let path = product_photo_path(user_id, file_name);
        let bucket = self.market.config().photo_bucket.clone();
        self.upload(&bucket, &path, bytes, content_type).await
    }

    pub async fn remove(&self, bucket: &str, path: &str) -> Result<()> {
        if path.trim().is_empty() {
            return Err(Error::validation("path", "no file to remove"));
        }
        let storage = self.market.storage();
        let result = storage.from(bucket).remove(&[path]).await;
        logged("removing photo", result)?;
        Ok(())
    }
}
