//! Configuration options for the marketplace client

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable holding the backend project URL
pub const URL_ENV: &str = "MARKETPLACE_URL";

/// Environment variable holding the anonymous API key
pub const KEY_ENV: &str = "MARKETPLACE_ANON_KEY";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_ENV: &str = "MARKETPLACE_TIMEOUT_SECS";

/// Configuration options for the marketplace client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Collection holding account profiles
    pub users_collection: String,

    /// Collection holding listings
    pub listings_collection: String,

    /// Storage bucket for listing images
    pub image_bucket: String,

    /// Value sent in the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            users_collection: "users".to_string(),
            listings_collection: "products".to_string(),
            image_bucket: "products".to_string(),
            client_info: format!("marketplace-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Set the profile collection name
    pub fn with_users_collection(mut self, value: &str) -> Self {
        self.users_collection = value.to_string();
        self
    }

    /// Set the listing collection name
    pub fn with_listings_collection(mut self, value: &str) -> Self {
        self.listings_collection = value.to_string();
        self
    }

    /// Set the image bucket name
    pub fn with_image_bucket(mut self, value: &str) -> Self {
        self.image_bucket = value.to_string();
        self
    }

    /// Set the client info header value
    pub fn with_client_info(mut self, value: &str) -> Self {
        self.client_info = value.to_string();
        self
    }
}

/// Connection settings for a marketplace backend project
#[derive(Debug, Clone)]
pub struct MarketplaceConfig {
    /// The base URL for the backend project
    pub url: String,

    /// The anonymous API key
    pub key: String,

    /// Client options
    pub options: ClientOptions,
}

impl MarketplaceConfig {
    /// Create a config with default options
    pub fn new(url: &str, key: &str) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            options: ClientOptions::default(),
        }
    }

    /// Replace the client options
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Read the config from `MARKETPLACE_URL`, `MARKETPLACE_ANON_KEY` and
    /// the optional `MARKETPLACE_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self> {
        let url = env::var(URL_ENV).map_err(|_| Error::config(format!("{} must be set", URL_ENV)))?;
        let key = env::var(KEY_ENV).map_err(|_| Error::config(format!("{} must be set", KEY_ENV)))?;

        let mut config = Self::new(&url, &key);
        if let Ok(raw) = env::var(TIMEOUT_ENV) {
            let secs = raw
                .trim()
                .parse::<u64>()
                .map_err(|_| Error::config(format!("{} must be a number of seconds, got {:?}", TIMEOUT_ENV, raw)))?;
            config.options = config
                .options
                .with_request_timeout(Some(Duration::from_secs(secs)));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_document_schema() {
        let options = ClientOptions::default();
        assert_eq!(options.users_collection, "users");
        assert_eq!(options.listings_collection, "products");
        assert_eq!(options.image_bucket, "products");
        assert!(options.client_info.starts_with("marketplace-rust/"));
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let config = MarketplaceConfig::new("https://example.test/", "anon");
        assert_eq!(config.url, "https://example.test");
    }
}
