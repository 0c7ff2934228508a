//! Field-by-field mapping between records and store documents
//!
//! Documents are untyped JSON objects. Reading is lenient: optional fields
//! fall back to defaults, numbers are narrowed explicitly, and a document that
//! cannot be read is reported as a [`MappingError`] so the caller can skip it.

use log::warn;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::models::{Account, Listing, Review};

/// Why a document could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MappingError {
    #[error("document is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{0}` has the wrong type")]
    WrongType(&'static str),
}

type Fields = Map<String, Value>;

fn fields(doc: &Value) -> Result<&Fields, MappingError> {
    doc.as_object().ok_or(MappingError::NotAnObject)
}

/// Present and not null
fn present<'a>(fields: &'a Fields, key: &'static str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn required_str(fields: &Fields, key: &'static str) -> Result<String, MappingError> {
    present(fields, key)
        .ok_or(MappingError::MissingField(key))?
        .as_str()
        .map(str::to_string)
        .ok_or(MappingError::WrongType(key))
}

fn optional_str(fields: &Fields, key: &'static str) -> Result<String, MappingError> {
    match present(fields, key) {
        None => Ok(String::new()),
        Some(value) => value
            .as_str()
            .map(str::to_string)
            .ok_or(MappingError::WrongType(key)),
    }
}

fn required_f64(fields: &Fields, key: &'static str) -> Result<f64, MappingError> {
    present(fields, key)
        .ok_or(MappingError::MissingField(key))?
        .as_f64()
        .ok_or(MappingError::WrongType(key))
}

/// Integral JSON number, accepting floats with no fractional part
fn as_millis(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.is_finite())
            .map(|f| f as i64)
    })
}

fn required_millis(fields: &Fields, key: &'static str) -> Result<i64, MappingError> {
    as_millis(present(fields, key).ok_or(MappingError::MissingField(key))?)
        .ok_or(MappingError::WrongType(key))
}

fn optional_millis(fields: &Fields, key: &'static str) -> Result<Option<i64>, MappingError> {
    match present(fields, key) {
        None => Ok(None),
        Some(value) => as_millis(value).map(Some).ok_or(MappingError::WrongType(key)),
    }
}

/// Document written to the listing collection
pub fn listing_to_document(listing: &Listing) -> Value {
    json!({
        "id": listing.id,
        "name": listing.name,
        "description": listing.description,
        "price": listing.price,
        "sellerId": listing.seller_id,
        "sellerName": listing.seller_name,
        "sellerPhone": listing.seller_phone,
        "category": listing.category,
        "images": listing.images,
        "ratings": listing.reviews.iter().map(review_to_document).collect::<Vec<_>>(),
        "createdAt": listing.created_at,
        "isDeleted": listing.is_deleted,
        "deletedAt": listing.deleted_at,
    })
}

/// Document appended to a listing's `ratings` array
pub fn review_to_document(review: &Review) -> Value {
    json!({
        "id": review.id,
        "userId": review.reviewer_id,
        "userName": review.reviewer_name,
        "rating": review.score,
        "comment": review.comment,
        "createdAt": review.created_at,
    })
}

/// Read a review document
pub fn review_from_document(doc: &Value) -> Result<Review, MappingError> {
    let f = fields(doc)?;

    Ok(Review {
        id: required_str(f, "id")?,
        reviewer_id: required_str(f, "userId")?,
        reviewer_name: required_str(f, "userName")?,
        score: required_f64(f, "rating")? as f32,
        comment: optional_str(f, "comment")?,
        created_at: required_millis(f, "createdAt")?,
    })
}

/// Read a listing document
///
/// Reviews that cannot be read are dropped from the listing rather than
/// failing it.
pub fn listing_from_document(doc: &Value) -> Result<Listing, MappingError> {
    let f = fields(doc)?;

    let images = match present(f, "images") {
        None => Vec::new(),
        Some(value) => value
            .as_array()
            .ok_or(MappingError::WrongType("images"))?
            .iter()
            .filter_map(|image| match image.as_str() {
                Some(url) => Some(url.to_string()),
                None => {
                    warn!("Skipping image reference that is not a string: {}", image);
                    None
                }
            })
            .collect(),
    };

    let reviews = match present(f, "ratings") {
        None => Vec::new(),
        Some(value) => value
            .as_array()
            .ok_or(MappingError::WrongType("ratings"))?
            .iter()
            .filter_map(|review| match review_from_document(review) {
                Ok(review) => Some(review),
                Err(e) => {
                    warn!("Skipping unreadable review: {}", e);
                    None
                }
            })
            .collect(),
    };

    let is_deleted = match present(f, "isDeleted") {
        None => false,
        Some(value) => value.as_bool().ok_or(MappingError::WrongType("isDeleted"))?,
    };

    Ok(Listing {
        id: required_str(f, "id")?,
        name: required_str(f, "name")?,
        description: required_str(f, "description")?,
        price: required_f64(f, "price")?,
        seller_id: required_str(f, "sellerId")?,
        seller_name: required_str(f, "sellerName")?,
        seller_phone: required_str(f, "sellerPhone")?,
        category: optional_str(f, "category")?,
        images,
        reviews,
        created_at: required_millis(f, "createdAt")?,
        is_deleted,
        deleted_at: optional_millis(f, "deletedAt")?,
    })
}

/// Read a batch of listing documents, skipping the ones that fail
pub fn listings_from_documents(docs: &[Value]) -> Vec<Listing> {
    docs.iter()
        .filter_map(|doc| match listing_from_document(doc) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!(
                    "Skipping listing document {}: {}",
                    doc.get("id").and_then(Value::as_str).unwrap_or("<unknown>"),
                    e
                );
                None
            }
        })
        .collect()
}

/// Profile document stored next to an identity-service user; never holds the password
pub fn profile_document(user_id: &str, account: &Account, created_at: i64) -> Value {
    json!({
        "id": user_id,
        "email": account.email,
        "firstName": account.first_name,
        "secondName": account.second_name,
        "createdAt": created_at,
    })
}

/// Read a profile document into an account with an empty credential
pub fn account_from_profile(doc: &Value) -> Result<Account, MappingError> {
    let f = fields(doc)?;

    Ok(Account {
        email: required_str(f, "email")?,
        first_name: required_str(f, "firstName")?,
        second_name: required_str(f, "secondName")?,
        password: String::new(),
    })
}
