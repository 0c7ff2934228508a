//! Directories backed by the managed services
//!
//! Nothing is cached: every call reads or writes the remote store.

use async_trait::async_trait;
use futures_util::future::join_all;
use log::{debug, error, info, warn};
use std::sync::Arc;

use super::{AccountDirectory, ListingDirectory, NOT_OWNER};
use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::models::{
    average_score, new_id, now_millis, Account, ImageUpload, Listing, NewListing, NewReview, Review,
};

/// Accounts held by the identity service plus a profile document per user
#[derive(Clone)]
pub struct RemoteAccounts {
    gateway: Arc<RemoteGateway>,
}

impl RemoteAccounts {
    pub fn new(gateway: Arc<RemoteGateway>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl AccountDirectory for RemoteAccounts {
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        second_name: &str,
    ) -> Result<Account> {
        let account = Account {
            email: email.to_string(),
            first_name: first_name.to_string(),
            second_name: second_name.to_string(),
            password: password.to_string(),
        };

        let user_id = self.gateway.create_identity(&account).await.map_err(|e| {
            error!("Registration of {} failed: {}", email, e);
            e
        })?;
        info!("Registered {} as {}", email, user_id);

        self.gateway.save_profile(&user_id, &account).await?;
        Ok(account)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let user_id = self.gateway.authenticate(email, password).await?;

        match self.gateway.load_profile(&user_id).await? {
            Some(account) => Ok(account),
            None => {
                warn!("Authenticated {} but no profile document exists", email);
                Err(Error::not_found("User data"))
            }
        }
    }

    async fn current_account(&self) -> Result<Option<Account>> {
        let session = match self.gateway.session() {
            Some(session) => session,
            None => return Ok(None),
        };

        let profile = self.gateway.load_profile(&session.user_id).await?;
        if profile.is_none() {
            warn!("Session for {} has no profile document", session.user_id);
        }
        Ok(profile)
    }

    async fn logout(&self) {
        if let Err(e) = self.gateway.sign_out().await {
            warn!("Remote sign-out failed, session cleared locally: {}", e);
        }
    }
}

/// Listings stored as documents, images in the blob store
#[derive(Clone)]
pub struct RemoteListings {
    gateway: Arc<RemoteGateway>,
}

impl RemoteListings {
    pub fn new(gateway: Arc<RemoteGateway>) -> Self {
        Self { gateway }
    }

    /// Upload all images concurrently and keep the URLs of those that succeeded
    async fn upload_images(&self, listing_id: &str, images: &[ImageUpload]) -> Vec<String> {
        if images.is_empty() {
            debug!("No images to upload for {}", listing_id);
            return Vec::new();
        }

        let uploads = images
            .iter()
            .enumerate()
            .map(|(index, image)| self.gateway.upload_image(listing_id, index, image));
        let results = join_all(uploads).await;

        let total = results.len();
        let urls: Vec<String> = results
            .into_iter()
            .enumerate()
            .filter_map(|(index, result)| match result {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!("Failed to upload image {}/{} for {}: {}", index + 1, total, listing_id, e);
                    None
                }
            })
            .collect();

        debug!("Uploaded {}/{} images for {}", urls.len(), total, listing_id);
        urls
    }
}

#[async_trait]
impl ListingDirectory for RemoteListings {
    async fn add_listing(&self, listing: NewListing, images: Vec<ImageUpload>) -> Result<String> {
        listing.validate()?;
        if !self.gateway.profile_exists(&listing.seller_id).await? {
            return Err(Error::not_found(format!("Seller account {}", listing.seller_id)));
        }

        let id = new_id();
        let urls = self.upload_images(&id, &images).await;
        let listing = listing.into_listing(id.clone(), urls);

        self.gateway.put_listing(&listing).await.map_err(|e| {
            error!("Failed to add listing {}: {}", id, e);
            e
        })?;
        Ok(id)
    }

    async fn all_listings(&self) -> Result<Vec<Listing>> {
        self.gateway.query_listings(None).await
    }

    async fn listings_by_seller(&self, seller_id: &str) -> Result<Vec<Listing>> {
        self.gateway.query_listings(Some(seller_id)).await
    }

    async fn listing(&self, listing_id: &str) -> Result<Option<Listing>> {
        let listing = self.gateway.get_listing(listing_id).await?;
        Ok(listing.filter(|l| !l.is_deleted))
    }

    async fn add_review(&self, listing_id: &str, review: NewReview) -> Result<Review> {
        review.validate()?;

        let review = review.into_review();
        self.gateway.append_review(listing_id, &review).await?;
        Ok(review)
    }

    async fn average_rating(&self, listing_id: &str) -> f32 {
        match self.gateway.get_listing(listing_id).await {
            Ok(Some(listing)) => average_score(&listing.reviews),
            Ok(None) => 0.0,
            Err(e) => {
                warn!("Could not read ratings of {}: {}", listing_id, e);
                0.0
            }
        }
    }

    async fn soft_delete(&self, listing_id: &str, requester_id: &str) -> Result<()> {
        debug!("Soft deleting listing {}", listing_id);

        let listing = self
            .gateway
            .get_listing(listing_id)
            .await?
            .ok_or_else(|| Error::not_found(format!("Listing {}", listing_id)))?;

        if listing.seller_id != requester_id {
            return Err(Error::forbidden(NOT_OWNER));
        }

        self.gateway.mark_deleted(listing_id, now_millis()).await?;
        info!("Listing {} soft deleted", listing_id);
        Ok(())
    }
}
