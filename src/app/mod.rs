//! Application shell: screen state and the handlers that move between screens
//!
//! [`AppState`] is a plain value owned by the caller. Each handler runs one
//! directory operation, updates the state from its result and queues a
//! toast-style notice. Handlers never return errors; failures become notices.

pub mod forms;

use log::{debug, warn};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::directory::{AccountDirectory, ListingDirectory};
use crate::error::Error;
use crate::models::{Account, ImageUpload, Listing, NewReview};

use forms::{ListingForm, LoginForm, RegistrationForm};

/// Shown when a seller tries to rate their own listing
pub const NOT_OWN_LISTING: &str = "You cannot rate your own product";

/// The screens of the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    Home,
    ListingList,
    AddListing,
    ListingDetail,
}

impl Screen {
    /// Whether the screen is only reachable with an account
    pub fn requires_account(&self) -> bool {
        matches!(self, Screen::Home | Screen::AddListing)
    }
}

/// UI state shared by all screens
#[derive(Debug, Clone)]
pub struct AppState {
    pub screen: Screen,
    pub account: Option<Account>,
    pub selected: Option<Listing>,
    notices: VecDeque<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            screen: Screen::Login,
            account: None,
            selected: None,
            notices: VecDeque::new(),
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a notice for display
    pub fn notify(&mut self, message: impl Into<String>) {
        self.notices.push_back(message.into());
    }

    /// Take all queued notices, oldest first
    pub fn drain_notices(&mut self) -> Vec<String> {
        self.notices.drain(..).collect()
    }
}

/// What the detail screen shows about a listing
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDetail {
    pub listing: Listing,
    pub average_rating: f32,
    pub review_count: usize,
}

impl ListingDetail {
    /// Category, or "General" when none was given
    pub fn category_label(&self) -> &str {
        if self.listing.category.is_empty() {
            "General"
        } else {
            &self.listing.category
        }
    }

    /// "No ratings", or the average with one decimal
    pub fn rating_label(&self) -> String {
        if self.average_rating > 0.0 {
            format!("{:.1}", self.average_rating)
        } else {
            "No ratings".to_string()
        }
    }
}

/// Dispatches screen events to the directories
pub struct Shell<A, L> {
    accounts: Arc<A>,
    listings: Arc<L>,
}

impl<A, L> Clone for Shell<A, L> {
    fn clone(&self) -> Self {
        Self {
            accounts: Arc::clone(&self.accounts),
            listings: Arc::clone(&self.listings),
        }
    }
}

impl<A: AccountDirectory, L: ListingDirectory> Shell<A, L> {
    pub fn new(accounts: Arc<A>, listings: Arc<L>) -> Self {
        Self { accounts, listings }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn listings(&self) -> &L {
        &self.listings
    }

    /// Resume an existing session on start
    pub async fn restore(&self, state: &mut AppState) {
        match self.accounts.current_account().await {
            Ok(Some(account)) => {
                debug!("Resuming session for {}", account.email);
                state.account = Some(account);
                state.screen = Screen::ListingList;
            }
            Ok(None) => {}
            Err(e) => warn!("Could not restore session: {}", e),
        }
    }

    /// Move to a screen; account-only screens fall back to login
    pub fn navigate(&self, state: &mut AppState, screen: Screen) {
        if screen.requires_account() && state.account.is_none() {
            state.screen = Screen::Login;
            return;
        }
        if screen == Screen::ListingDetail && state.selected.is_none() {
            state.screen = Screen::ListingList;
            return;
        }
        state.screen = screen;
    }

    pub async fn login(&self, state: &mut AppState, form: LoginForm) {
        if let Err(e) = form.validate() {
            state.notify(e.to_string());
            return;
        }

        match self.accounts.login(&form.email, &form.password).await {
            Ok(account) => {
                state.account = Some(account);
                state.screen = Screen::ListingList;
                state.notify("Login successful!");
            }
            Err(e) => state.notify(failure_message(&e, "Login failed")),
        }
    }

    pub async fn register(&self, state: &mut AppState, form: RegistrationForm) {
        if let Err(e) = form.validate() {
            state.notify(e.to_string());
            return;
        }

        let result = self
            .accounts
            .register(&form.email, &form.password, &form.first_name, &form.second_name)
            .await;
        match result {
            Ok(_) => {
                state.screen = Screen::Login;
                state.notify("Registration successful! Please login.");
            }
            Err(e) => state.notify(failure_message(&e, "Registration failed")),
        }
    }

    pub async fn logout(&self, state: &mut AppState) {
        self.accounts.logout().await;
        state.account = None;
        state.selected = None;
        state.screen = Screen::Login;
        state.notify("Logged out successfully");
    }

    /// Listings for the list screen; a failure yields an empty list and a notice
    pub async fn load_listings(&self, state: &mut AppState) -> Vec<Listing> {
        match self.listings.all_listings().await {
            Ok(listings) => {
                debug!("Loaded {} listings", listings.len());
                listings
            }
            Err(e) => {
                state.notify(format!("Error loading products: {}", e));
                Vec::new()
            }
        }
    }

    pub async fn add_listing(&self, state: &mut AppState, form: ListingForm, images: Vec<ImageUpload>) {
        let seller = match &state.account {
            Some(account) => account.clone(),
            None => {
                state.screen = Screen::Login;
                return;
            }
        };

        let listing = match form.into_new_listing(&seller) {
            Ok(listing) => listing,
            Err(e) => {
                state.notify(e.to_string());
                return;
            }
        };

        match self.listings.add_listing(listing, images).await {
            Ok(_) => {
                state.screen = Screen::ListingList;
                state.notify("Product added successfully!");
            }
            Err(e) => state.notify(failure_message(&e, "Failed to add product")),
        }
    }

    pub fn open_listing(&self, state: &mut AppState, listing: Listing) {
        state.selected = Some(listing);
        state.screen = Screen::ListingDetail;
    }

    pub async fn listing_detail(&self, listing: &Listing) -> ListingDetail {
        ListingDetail {
            average_rating: self.listings.average_rating(&listing.id).await,
            review_count: listing.reviews.len(),
            listing: listing.clone(),
        }
    }

    /// Rate the selected listing as the current account; sellers cannot rate their own
    pub async fn submit_review(&self, state: &mut AppState, score: f32, comment: &str) {
        let (account, listing_id) = match (&state.account, &state.selected) {
            (Some(account), Some(listing)) if account.email == listing.seller_id => {
                let e = Error::forbidden(NOT_OWN_LISTING);
                state.notify(format!("Failed to submit rating: {}", e));
                return;
            }
            (Some(account), Some(listing)) => (account.clone(), listing.id.clone()),
            _ => {
                state.notify("Failed to submit rating");
                return;
            }
        };

        let review = NewReview {
            reviewer_id: account.email.clone(),
            reviewer_name: account.display_name(),
            score,
            comment: comment.to_string(),
        };

        match self.listings.add_review(&listing_id, review).await {
            Ok(review) => {
                if let Some(selected) = state.selected.as_mut() {
                    selected.reviews.push(review);
                }
                state.notify("Rating submitted successfully!");
            }
            Err(e) => state.notify(format!("Failed to submit rating: {}", e)),
        }
    }

    /// Soft delete the selected listing as the current account
    pub async fn delete_listing(&self, state: &mut AppState) {
        let (requester, listing_id) = match (&state.account, &state.selected) {
            (Some(account), Some(listing)) => (account.email.clone(), listing.id.clone()),
            _ => {
                state.notify("Failed to delete product");
                return;
            }
        };

        match self.listings.soft_delete(&listing_id, &requester).await {
            Ok(()) => {
                state.selected = None;
                state.screen = Screen::ListingList;
                state.notify("Product deleted");
            }
            Err(e) => state.notify(failure_message(&e, "Failed to delete product")),
        }
    }
}

/// Domain errors carry a readable message; backend failures get a prefix
fn failure_message(error: &Error, prefix: &str) -> String {
    if error.is_remote() {
        format!("{}: {}", prefix, error)
    } else {
        error.to_string()
    }
}
