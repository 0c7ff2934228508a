//! Blob storage for listing images

mod types;

use log::debug;
use reqwest::{multipart, Client, StatusCode};
use std::path::Path;

use crate::error::Error;
use crate::fetch::{ensure_success, Fetch, ServiceCredentials};

pub use types::*;

/// Client for object storage
#[derive(Clone)]
pub struct StorageClient {
    /// The base URL for the backend project
    url: String,

    /// Headers sent with every request
    credentials: ServiceCredentials,

    /// HTTP client used for requests
    client: Client,

    /// Session access token, the anon key is used when absent
    token: Option<String>,
}

/// Client for a specific storage bucket
pub struct BucketClient<'a> {
    /// Reference to the storage client
    storage: &'a StorageClient,

    /// The bucket ID
    bucket_id: String,
}

impl StorageClient {
    /// Create a new StorageClient
    pub fn new(url: &str, credentials: ServiceCredentials, client: Client) -> Self {
        Self {
            url: url.to_string(),
            credentials,
            client,
            token: None,
        }
    }

    /// Send requests as the given session
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Get the base URL for storage operations
    fn get_url(&self, path: &str) -> String {
        format!("{}/storage/v1{}", self.url, path)
    }

    fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or(&self.credentials.key)
    }

    /// Get a client for a specific bucket
    pub fn from(&self, bucket_id: &str) -> BucketClient<'_> {
        BucketClient {
            storage: self,
            bucket_id: bucket_id.to_string(),
        }
    }

    /// Get a bucket by ID; `None` when the service reports no such bucket
    pub async fn get_bucket(&self, id: &str) -> Result<Option<Bucket>, Error> {
        let url = self.get_url(&format!("/bucket/{}", id));

        let response = Fetch::get(&self.client, &url)
            .credentials(&self.credentials)
            .bearer_auth(self.bearer())
            .execute_raw()
            .await?;

        // storage answers 400 as well as 404 for an unknown bucket
        if matches!(response.status(), StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST) {
            debug!("Bucket {} not found", id);
            return Ok(None);
        }

        let bucket = ensure_success(response).await?.json::<Bucket>().await?;
        Ok(Some(bucket))
    }
}

impl<'a> BucketClient<'a> {
    /// Upload a file to the bucket
    pub async fn upload(&self, path: &str, file_data: Vec<u8>, options: FileOptions) -> Result<UploadResponse, Error> {
        let url = self.storage.get_url(&format!("/object/{}/{}", self.bucket_id, path));
        debug!("Uploading {} bytes to {}/{}", file_data.len(), self.bucket_id, path);

        let file_name = Path::new(path)
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "file".to_string());
        let mut part = multipart::Part::bytes(file_data).file_name(file_name);
        if let Some(content_type) = options.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let form = multipart::Form::new().part("file", part);

        let response = self.storage.client.post(&url)
            .header("apikey", &self.storage.credentials.key)
            .header("X-Client-Info", &self.storage.credentials.client_info)
            .bearer_auth(self.storage.bearer())
            .header("Cache-Control", options.cache_control.unwrap_or_else(|| "3600".to_string()))
            .header("x-upsert", options.upsert.to_string())
            .multipart(form)
            .send()
            .await?;

        let response = ensure_success(response)
            .await
            .map_err(|e| Error::remote(format!("Upload of {} failed: {}", path, e)))?;

        let uploaded = response.json::<UploadResponse>().await?;
        Ok(uploaded)
    }

    /// Get the public URL for a file
    pub fn get_public_url(&self, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.storage.url, self.bucket_id, path)
    }
}
