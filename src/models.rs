//! Marketplace records

use chrono::Utc;
use uuid::Uuid;

/// Lowest score a review may carry
pub const MIN_SCORE: f32 = 1.0;

/// Highest score a review may carry
pub const MAX_SCORE: f32 = 5.0;

/// Current time in epoch milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Generate a fresh record identity
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A registered user
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Email address, also the account key
    pub email: String,

    /// First name
    pub first_name: String,

    /// Second name
    pub second_name: String,

    /// Credential, empty for accounts loaded from the remote store
    pub password: String,
}

impl Account {
    /// "First Second"
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.second_name)
    }

    /// Copy of the account with the credential cleared
    pub fn without_credential(&self) -> Self {
        Self {
            password: String::new(),
            ..self.clone()
        }
    }
}

/// A single score/comment attached to a listing
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    pub id: String,
    pub reviewer_id: String,
    pub reviewer_name: String,
    /// 1.0 to 5.0
    pub score: f32,
    pub comment: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// Review input before an identity and timestamp are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub reviewer_id: String,
    pub reviewer_name: String,
    pub score: f32,
    pub comment: String,
}

impl NewReview {
    /// Score must lie within 1.0..=5.0
    pub fn validate(&self) -> crate::error::Result<()> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&self.score) {
            return Err(crate::error::Error::validation(format!(
                "Rating must be between {:.1} and {:.1}",
                MIN_SCORE, MAX_SCORE
            )));
        }
        Ok(())
    }

    /// Stamp the review with an identity and the current time
    pub fn into_review(self) -> Review {
        Review {
            id: new_id(),
            reviewer_id: self.reviewer_id,
            reviewer_name: self.reviewer_name,
            score: self.score,
            comment: self.comment,
            created_at: now_millis(),
        }
    }
}

/// A sellable item
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// Email of the owning account
    pub seller_id: String,
    pub seller_name: String,
    pub seller_phone: String,
    pub category: String,
    /// Image URLs or local references, in upload order
    pub images: Vec<String>,
    pub reviews: Vec<Review>,
    /// Epoch milliseconds
    pub created_at: i64,
    pub is_deleted: bool,
    pub deleted_at: Option<i64>,
}

impl Listing {
    /// Mean review score, 0 when there are no reviews
    pub fn average_rating(&self) -> f32 {
        average_score(&self.reviews)
    }
}

/// Arithmetic mean of review scores, 0 for an empty slice
pub fn average_score(reviews: &[Review]) -> f32 {
    if reviews.is_empty() {
        return 0.0;
    }
    let total: f64 = reviews.iter().map(|r| f64::from(r.score)).sum();
    (total / reviews.len() as f64) as f32
}

/// Listing input as entered by a seller
#[derive(Debug, Clone, PartialEq)]
pub struct NewListing {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub seller_id: String,
    pub seller_name: String,
    pub seller_phone: String,
    pub category: String,
}

impl NewListing {
    /// Price must be positive and the seller known
    pub fn validate(&self) -> crate::error::Result<()> {
        if !self.price.is_finite() || self.price <= 0.0 {
            return Err(crate::error::Error::validation("Please enter a valid price"));
        }
        if self.seller_id.trim().is_empty() {
            return Err(crate::error::Error::validation("Listing must have a seller"));
        }
        Ok(())
    }

    /// Build the stored record
    pub fn into_listing(self, id: String, images: Vec<String>) -> Listing {
        Listing {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            seller_id: self.seller_id,
            seller_name: self.seller_name,
            seller_phone: self.seller_phone,
            category: self.category,
            images,
            reviews: Vec::new(),
            created_at: now_millis(),
            is_deleted: false,
            deleted_at: None,
        }
    }
}

/// Raw image bytes picked by the seller
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    /// Original file name, used for the extension and local references
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: &str, content_type: &str, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        }
    }

    /// File extension, "jpg" when the name has none
    pub fn extension(&self) -> &str {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or("jpg")
    }

    /// Storage path for the `index`-th image of a listing
    pub fn object_path(&self, listing_id: &str, index: usize, millis: i64) -> String {
        format!("products/{}/image_{}_{}.{}", listing_id, millis, index, self.extension())
    }
}
