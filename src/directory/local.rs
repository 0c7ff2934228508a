//! In-memory directories
//!
//! The whole collection lives in process memory and is lost on exit. Used for
//! tests and offline demos.

use async_trait::async_trait;
use log::{debug, info};
use std::sync::{Arc, Mutex, MutexGuard};

use super::{sort_newest_first, AccountDirectory, ListingDirectory, NOT_OWNER};
use crate::error::{Error, Result};
use crate::models::{
    average_score, new_id, now_millis, Account, ImageUpload, Listing, NewListing, NewReview, Review,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Accounts kept in a list, keyed by email
#[derive(Default)]
pub struct LocalAccounts {
    accounts: Mutex<Vec<Account>>,
    current: Mutex<Option<String>>,
}

impl LocalAccounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look an account up by email
    pub fn find(&self, email: &str) -> Option<Account> {
        lock(&self.accounts).iter().find(|a| a.email == email).cloned()
    }
}

#[async_trait]
impl AccountDirectory for LocalAccounts {
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        second_name: &str,
    ) -> Result<Account> {
        let mut accounts = lock(&self.accounts);
        if accounts.iter().any(|a| a.email == email) {
            return Err(Error::DuplicateAccount(email.to_string()));
        }

        let account = Account {
            email: email.to_string(),
            first_name: first_name.to_string(),
            second_name: second_name.to_string(),
            password: password.to_string(),
        };
        accounts.push(account.clone());
        info!("Registered {}", email);
        Ok(account)
    }

    async fn login(&self, email: &str, password: &str) -> Result<Account> {
        let account = self
            .find(email)
            .filter(|a| a.password == password)
            .ok_or(Error::InvalidCredential)?;

        *lock(&self.current) = Some(account.email.clone());
        Ok(account)
    }

    async fn current_account(&self) -> Result<Option<Account>> {
        let current = lock(&self.current).clone();
        Ok(current.and_then(|email| self.find(&email)))
    }

    async fn logout(&self) {
        *lock(&self.current) = None;
    }
}

/// Listings kept in a list; sellers must be registered in `accounts`
pub struct LocalListings {
    accounts: Arc<LocalAccounts>,
    listings: Mutex<Vec<Listing>>,
}

impl LocalListings {
    pub fn new(accounts: Arc<LocalAccounts>) -> Self {
        Self {
            accounts,
            listings: Mutex::new(Vec::new()),
        }
    }

    fn live(&self, filter: impl Fn(&Listing) -> bool) -> Vec<Listing> {
        let mut found: Vec<Listing> = lock(&self.listings)
            .iter()
            .filter(|l| !l.is_deleted && filter(l))
            .cloned()
            .collect();
        sort_newest_first(&mut found);
        found
    }
}

#[async_trait]
impl ListingDirectory for LocalListings {
    async fn add_listing(&self, listing: NewListing, images: Vec<ImageUpload>) -> Result<String> {
        listing.validate()?;
        if self.accounts.find(&listing.seller_id).is_none() {
            return Err(Error::not_found(format!("Seller account {}", listing.seller_id)));
        }

        let id = new_id();
        let millis = now_millis();
        let references = images
            .iter()
            .enumerate()
            .map(|(index, image)| format!("local://{}", image.object_path(&id, index, millis)))
            .collect();

        lock(&self.listings).push(listing.into_listing(id.clone(), references));
        debug!("Stored listing {} in memory", id);
        Ok(id)
    }

    async fn all_listings(&self) -> Result<Vec<Listing>> {
        Ok(self.live(|_| true))
    }

    async fn listings_by_seller(&self, seller_id: &str) -> Result<Vec<Listing>> {
        Ok(self.live(|l| l.seller_id == seller_id))
    }

    async fn listing(&self, listing_id: &str) -> Result<Option<Listing>> {
        Ok(self.live(|l| l.id == listing_id).into_iter().next())
    }

    async fn add_review(&self, listing_id: &str, review: NewReview) -> Result<Review> {
        review.validate()?;

        let mut listings = lock(&self.listings);
        let listing = listings
            .iter_mut()
            .find(|l| l.id == listing_id)
            .ok_or_else(|| Error::not_found(format!("Listing {}", listing_id)))?;

        let review = review.into_review();
        listing.reviews.push(review.clone());
        Ok(review)
    }

    async fn average_rating(&self, listing_id: &str) -> f32 {
        lock(&self.listings)
            .iter()
            .find(|l| l.id == listing_id)
            .map(|l| average_score(&l.reviews))
            .unwrap_or(0.0)
    }

    async fn soft_delete(&self, listing_id: &str, requester_id: &str) -> Result<()> {
        let mut listings = lock(&self.listings);
        let listing = listings
            .iter_mut()
            .find(|l| l.id == listing_id)
            .ok_or_else(|| Error::not_found(format!("Listing {}", listing_id)))?;

        if listing.seller_id != requester_id {
            return Err(Error::forbidden(NOT_OWNER));
        }

        listing.is_deleted = true;
        listing.deleted_at = Some(now_millis());
        info!("Soft deleted listing {}", listing_id);
        Ok(())
    }
}
