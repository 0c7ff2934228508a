//! Marketplace client library
//!
//! Accounts, product listings and reviews for a small marketplace app, backed
//! by a managed identity service, document store and blob store. The same
//! operations are available against an in-memory store for tests and offline use.

pub mod app;
pub mod auth;
pub mod config;
pub mod diagnostics;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod gateway;
pub mod models;
pub mod postgrest;
pub mod storage;

use log::debug;
use reqwest::Client;
use std::sync::Arc;

use crate::app::Shell;
use crate::config::{ClientOptions, MarketplaceConfig};
use crate::diagnostics::ServiceReport;
use crate::directory::{LocalAccounts, LocalListings, RemoteAccounts, RemoteListings};
use crate::error::Result;
use crate::gateway::RemoteGateway;

/// The main entry point for the marketplace client
pub struct Marketplace {
    /// The base URL for the backend project
    pub url: String,
    /// The anonymous API key for the backend project
    pub key: String,
    /// Client options
    pub options: ClientOptions,
    gateway: Arc<RemoteGateway>,
}

impl Marketplace {
    /// Create a client with default options
    ///
    /// # Example
    ///
    /// ```
    /// use marketplace_rust::Marketplace;
    ///
    /// let marketplace = Marketplace::new("https://your-project.example.com", "your-anon-key").unwrap();
    /// let listings = marketplace.listings();
    /// ```
    pub fn new(url: &str, key: &str) -> Result<Self> {
        Self::from_config(MarketplaceConfig::new(url, key))
    }

    /// Create a client from a full configuration
    pub fn from_config(config: MarketplaceConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.options.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build()?;

        debug!("Connecting marketplace client to {}", config.url);
        let gateway = RemoteGateway::new(&config.url, &config.key, config.options.clone(), http_client);

        Ok(Self {
            url: config.url,
            key: config.key,
            options: config.options,
            gateway: Arc::new(gateway),
        })
    }

    /// Create a client from `MARKETPLACE_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(MarketplaceConfig::from_env()?)
    }

    /// The gateway shared by the remote directories
    pub fn gateway(&self) -> &RemoteGateway {
        &self.gateway
    }

    /// Account directory backed by the identity service
    pub fn accounts(&self) -> RemoteAccounts {
        RemoteAccounts::new(Arc::clone(&self.gateway))
    }

    /// Listing directory backed by the document and blob stores
    pub fn listings(&self) -> RemoteListings {
        RemoteListings::new(Arc::clone(&self.gateway))
    }

    /// An application shell over the remote directories
    pub fn shell(&self) -> Shell<RemoteAccounts, RemoteListings> {
        Shell::new(Arc::new(self.accounts()), Arc::new(self.listings()))
    }

    /// Probe every backend service
    pub async fn check_services(&self) -> ServiceReport {
        diagnostics::check_services(&self.gateway).await
    }
}

/// An application shell over in-memory directories
pub fn local_shell() -> Shell<LocalAccounts, LocalListings> {
    let accounts = Arc::new(LocalAccounts::new());
    let listings = Arc::new(LocalListings::new(Arc::clone(&accounts)));
    Shell::new(accounts, listings)
}

/// A convenience module for common imports
pub mod prelude {
    pub use crate::app::forms::{ListingForm, LoginForm, RegistrationForm};
    pub use crate::app::{AppState, Screen, Shell};
    pub use crate::config::{ClientOptions, MarketplaceConfig};
    pub use crate::directory::{AccountDirectory, ListingDirectory};
    pub use crate::error::{Error, Result};
    pub use crate::models::{Account, ImageUpload, Listing, NewListing, NewReview, Review};
    pub use crate::Marketplace;
}
