//! Types for storage operations

use serde::{Deserialize, Serialize};

/// A storage bucket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bucket {
    /// The bucket ID
    pub id: String,

    /// The bucket name
    pub name: String,

    /// Whether the bucket is public
    pub public: Option<bool>,
}

/// Response to an object upload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// `<bucket>/<path>` of the stored object
    #[serde(rename = "Key")]
    pub key: String,

    /// Object ID, not returned by every server version
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
}

/// Options for uploading a file
#[derive(Debug, Clone)]
pub struct FileOptions {
    /// Cache control header
    pub cache_control: Option<String>,

    /// Content type of the file part
    pub content_type: Option<String>,

    /// Whether to upsert the file
    pub upsert: bool,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            cache_control: None,
            content_type: None,
            upsert: false,
        }
    }
}

impl FileOptions {
    /// Set the content type
    pub fn with_content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }
}
