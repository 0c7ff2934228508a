//! Remote gateway: directory operations expressed as calls to the identity
//! service, the document store and the blob store

pub mod mapping;

use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{json, Value};

use crate::auth::{Auth, Session};
use crate::config::ClientOptions;
use crate::error::{Error, Result};
use crate::fetch::ServiceCredentials;
use crate::models::{now_millis, Account, ImageUpload, Listing, Review};
use crate::postgrest::{Direction, PostgrestClient};
use crate::storage::{FileOptions, StorageClient};

use mapping::{
    account_from_profile, listing_from_document, listing_to_document, listings_from_documents,
    profile_document, review_to_document,
};

/// Stored procedure appending one review to a listing's `ratings` array
pub const APPEND_REVIEW_RPC: &str = "append_review";

/// Typed access to the three managed services
#[derive(Clone)]
pub struct RemoteGateway {
    auth: Auth,
    users: PostgrestClient,
    listings: PostgrestClient,
    storage: StorageClient,
    options: ClientOptions,
}

impl RemoteGateway {
    /// Create a gateway for a backend project
    pub fn new(url: &str, key: &str, options: ClientOptions, http_client: Client) -> Self {
        let credentials = ServiceCredentials::new(key, &options.client_info);

        Self {
            auth: Auth::new(url, credentials.clone(), http_client.clone()),
            users: PostgrestClient::new(url, credentials.clone(), &options.users_collection, http_client.clone()),
            listings: PostgrestClient::new(url, credentials.clone(), &options.listings_collection, http_client.clone()),
            storage: StorageClient::new(url, credentials, http_client),
            options,
        }
    }

    /// The identity service client
    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    /// Client options in effect
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    fn users(&self) -> PostgrestClient {
        self.users.clone().with_auth(self.auth.access_token())
    }

    fn listings(&self) -> PostgrestClient {
        self.listings.clone().with_auth(self.auth.access_token())
    }

    pub(crate) fn storage(&self) -> StorageClient {
        self.storage.clone().with_auth(self.auth.access_token())
    }

    pub(crate) fn document_store(&self) -> &PostgrestClient {
        &self.listings
    }

    /// Create an identity and return its user ID
    pub async fn create_identity(&self, account: &Account) -> Result<String> {
        let metadata = json!({
            "firstName": account.first_name,
            "secondName": account.second_name,
        });

        let response = self
            .auth
            .sign_up(&account.email, &account.password, Some(metadata))
            .await?;

        response
            .user_id()
            .map(str::to_string)
            .ok_or_else(|| Error::remote("Sign-up response did not contain a user"))
    }

    /// Verify a credential, open a session and return the user ID
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<String> {
        let response = self.auth.sign_in(email, password).await?;

        response
            .user_id()
            .map(str::to_string)
            .ok_or_else(|| Error::remote("Sign-in response did not contain a user"))
    }

    /// The live session, if any
    pub fn session(&self) -> Option<Session> {
        self.auth.get_session()
    }

    /// End the session
    pub async fn sign_out(&self) -> Result<()> {
        self.auth.sign_out().await
    }

    /// Write the profile document for a user
    pub async fn save_profile(&self, user_id: &str, account: &Account) -> Result<()> {
        debug!("Saving profile for {}", user_id);
        self.users()
            .insert(profile_document(user_id, account, now_millis()))
            .execute()
            .await
    }

    /// Load the profile document for a user
    pub async fn load_profile(&self, user_id: &str) -> Result<Option<Account>> {
        let doc: Option<Value> = self.users().select("*").eq("id", user_id).execute_one().await?;

        Ok(doc.and_then(|doc| match account_from_profile(&doc) {
            Ok(account) => Some(account),
            Err(e) => {
                warn!("Profile document {} is unreadable: {}", user_id, e);
                None
            }
        }))
    }

    /// Whether a profile document exists for an email
    pub async fn profile_exists(&self, email: &str) -> Result<bool> {
        let doc: Option<Value> = self.users().select("id").eq("email", email).execute_one().await?;
        Ok(doc.is_some())
    }

    /// Write a listing document
    pub async fn put_listing(&self, listing: &Listing) -> Result<()> {
        debug!("Saving listing {}", listing.id);
        self.listings()
            .insert(listing_to_document(listing))
            .execute()
            .await?;
        info!("Listing {} saved with {} images", listing.id, listing.images.len());
        Ok(())
    }

    /// Listings that are not deleted, newest first, optionally for one seller
    pub async fn query_listings(&self, seller_id: Option<&str>) -> Result<Vec<Listing>> {
        let mut query = self
            .listings()
            .select("*")
            .eq("isDeleted", false)
            .order("createdAt", Direction::Descending);
        if let Some(seller_id) = seller_id {
            query = query.eq("sellerId", seller_id);
        }

        let docs: Vec<Value> = query.execute().await?;
        debug!("Fetched {} listing documents", docs.len());
        Ok(listings_from_documents(&docs))
    }

    /// One listing by ID, including deleted ones
    pub async fn get_listing(&self, listing_id: &str) -> Result<Option<Listing>> {
        let doc: Option<Value> = self
            .listings()
            .select("*")
            .eq("id", listing_id)
            .execute_one()
            .await?;

        Ok(doc.and_then(|doc| match listing_from_document(&doc) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Listing document {} is unreadable: {}", listing_id, e);
                None
            }
        }))
    }

    /// Atomically append a review to a listing
    pub async fn append_review(&self, listing_id: &str, review: &Review) -> Result<()> {
        let params = json!({
            "listing_id": listing_id,
            "review": review_to_document(review),
        });

        let result: Value = self
            .listings()
            .rpc(APPEND_REVIEW_RPC, params)
            .execute()
            .await?;

        let appended = match &result {
            Value::Bool(found) => *found,
            Value::Number(rows) => rows.as_i64() != Some(0),
            _ => true,
        };
        if !appended {
            return Err(Error::not_found(format!("Listing {}", listing_id)));
        }
        Ok(())
    }

    /// Set the soft-delete flag and timestamp
    pub async fn mark_deleted(&self, listing_id: &str, deleted_at: i64) -> Result<()> {
        let updated: Vec<Value> = self
            .listings()
            .update(json!({ "isDeleted": true, "deletedAt": deleted_at }))
            .eq("id", listing_id)
            .execute()
            .await?;

        if updated.is_empty() {
            return Err(Error::not_found(format!("Listing {}", listing_id)));
        }
        Ok(())
    }

    /// Upload one listing image and return its public URL
    pub async fn upload_image(&self, listing_id: &str, index: usize, image: &ImageUpload) -> Result<String> {
        let path = image.object_path(listing_id, index, now_millis());
        let storage = self.storage();
        let bucket = storage.from(&self.options.image_bucket);

        let mut options = FileOptions::default();
        if !image.content_type.is_empty() {
            options = options.with_content_type(&image.content_type);
        }

        bucket.upload(&path, image.bytes.clone(), options).await?;

        Ok(bucket.get_public_url(&path))
    }
}
