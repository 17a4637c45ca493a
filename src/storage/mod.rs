//! Object storage: uploads, public URLs and removal

mod types;

use std::path::Path;

use log::debug;
use reqwest::{multipart, Client};
use serde_json::json;

use crate::config::CLIENT_INFO;
use crate::error::Error;
use crate::fetch::{check_status, Fetch};

pub use types::*;

/// Client for the storage API
pub struct StorageClient {
    /// The base URL for the project
    url: String,

    /// The anonymous API key for the project
    key: String,

    /// Bearer token: the session token or the anon key
    token: String,

    /// HTTP client used for requests
    client: Client,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    storage: &'a StorageClient,
    bucket_id: String,
}

impl StorageClient {
    pub(crate) fn new(url: &str, key: &str, token: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            key: key.to_string(),
            token: token.to_string(),
            client,
        }
    }

    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }
}

impl<'a> BucketClient<'a> {
    /// Upload a file to the bucket as multipart form data
    pub async fn upload(
        &self,
        path: &str,
        file_data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadedObject, Error> {
        let path = clean_path(path)?;
        let url = self
            .storage
            .get_url(&format!("/object/{}/{}", self.bucket_id, path));

        let file_name = Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mut part = multipart::Part::bytes(file_data).file_name(file_name);
        if let Some(content_type) = &options.content_type {
            part = part.mime_str(content_type).map_err(Error::Http)?;
        }
        let form = multipart::Form::new()
            .text("cacheControl", options.cache_control.clone())
            .part("", part);

        debug!("POST {} (upsert: {})", url, options.upsert);
        let response = self
            .storage
            .client
            .post(&url)
            .header("apikey", &self.storage.key)
            .bearer_auth(&self.storage.token)
            .header("X-Client-Info", CLIENT_INFO)
            .header("x-upsert", options.upsert.to_string())
            .multipart(form)
            .send()
            .await?;

        let response = check_status(response).await.map_err(storage_error)?;
        Ok(response.json::<UploadedObject>().await?)
    }

    /// URL of an object in a public bucket. No request is made.
    pub fn get_public_url(&self, path: &str) -> String {
        self.storage.get_url(&format!(
            "/object/public/{}/{}",
            self.bucket_id,
            path.trim_start_matches('/')
        ))
    }

    /// Remove objects from the bucket
    pub async fn remove(&self, paths: &[&str]) -> Result<Vec<FileObject>, Error> {
        let paths = paths
            .iter()
            .map(|path| clean_path(path))
            .collect::<Result<Vec<_>, _>>()?;
        let url = self.storage.get_url(&format!("/object/{}", self.bucket_id));

        Fetch::delete(&self.storage.client, &url)
            .api_key(&self.storage.key, &self.storage.token)
            .json(&json!({ "prefixes": paths }))?
            .execute::<Vec<FileObject>>()
            .await
            .map_err(storage_error)
    }
}

fn clean_path(path: &str) -> Result<String, Error> {
    let path = path.trim().trim_start_matches('/');
    if path.is_empty() {
        return Err(Error::validation("path", "object path cannot be empty"));
    }
    Ok(path.to_string())
}

fn storage_error(err: Error) -> Error {
    match err {
        Error::Api { status: 404, message } => Error::NotFound(message),
        Error::Api { message, .. } => Error::Storage(message),
        other => other,
    }
}
