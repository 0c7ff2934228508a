//! Directories: the access points for account and listing operations
//!
//! Each directory is a trait with an in-memory implementation ([`local`]) and
//! one backed by the managed services ([`remote`]). Callers hold an injected
//! instance, so the in-memory variant can stand in for the remote one.

pub mod local;
pub mod remote;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Account, ImageUpload, Listing, NewListing, NewReview, Review};

pub use local::{LocalAccounts, LocalListings};
pub use remote::{RemoteAccounts, RemoteListings};

/// Registration, login and the current session
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Create an account
    ///
    /// Fails with `DuplicateAccount` when the email is taken.
    async fn register(
        &self,
        email: &str,
        password: &str,
        first_name: &str,
        second_name: &str,
    ) -> Result<Account>;

    /// Verify a credential and open a session
    ///
    /// Fails with `InvalidCredential` on a mismatch and `NotFound` when the
    /// credential is valid but no profile exists.
    async fn login(&self, email: &str, password: &str) -> Result<Account>;

    /// The account of the open session, if any
    async fn current_account(&self) -> Result<Option<Account>>;

    /// Close the session; never fails
    async fn logout(&self);
}

/// Listing storage, queries and reviews
#[async_trait]
pub trait ListingDirectory: Send + Sync {
    /// Store a listing with whichever images could be stored; returns its ID
    async fn add_listing(&self, listing: NewListing, images: Vec<ImageUpload>) -> Result<String>;

    /// Listings not soft-deleted, newest first
    async fn all_listings(&self) -> Result<Vec<Listing>>;

    /// Listings of one seller not soft-deleted, newest first
    async fn listings_by_seller(&self, seller_id: &str) -> Result<Vec<Listing>>;

    /// One listing that has not been soft-deleted
    async fn listing(&self, listing_id: &str) -> Result<Option<Listing>>;

    /// Append a review to a listing
    async fn add_review(&self, listing_id: &str, review: NewReview) -> Result<Review>;

    /// Mean review score; 0 when there are no reviews or no such listing
    async fn average_rating(&self, listing_id: &str) -> f32;

    /// Hide a listing; only its seller may do so
    async fn soft_delete(&self, listing_id: &str, requester_id: &str) -> Result<()>;
}

/// Message used when a non-owner tries to delete a listing
pub(crate) const NOT_OWNER: &str = "You can only delete your own products";

/// Newest first
pub(crate) fn sort_newest_first(listings: &mut [Listing]) {
    listings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
