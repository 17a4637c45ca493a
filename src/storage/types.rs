//! Types for storage operations

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A stored object, as listed or removed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    /// The object name, relative to the bucket
    pub name: String,

    #[serde(default)]
    pub bucket_id: Option<String>,

    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub metadata: Option<HashMap<String, serde_json::Value>>,
}

/// Answer to a successful upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedObject {
    /// `{bucket}/{path}`
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

/// Options for uploading a file
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Cache control max-age, in seconds
    pub cache_control: String,

    /// MIME type of the upload
    pub content_type: Option<String>,

    /// Overwrite an existing object at the same path
    pub upsert: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            cache_control: "3600".to_string(),
            content_type: None,
            upsert: false,
        }
    }
}

impl FileOptions {
    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_upsert(mut self, upsert: bool) -> Self {
        self.upsert = upsert;
        self
    }
}
