use marketplace_rust::directory::{AccountDirectory, ListingDirectory, LocalAccounts, LocalListings};
use marketplace_rust::error::Error;
use marketplace_rust::models::{NewListing, NewReview};
use std::sync::Arc;

fn chair(seller: &str) -> NewListing {
    NewListing {
        name: "Oak chair".to_string(),
        description: "Solid oak, slight wear".to_string(),
        price: 3500.0,
        seller_id: seller.to_string(),
        seller_name: "Sam Seller".to_string(),
        seller_phone: "0712345678".to_string(),
        category: "Furniture".to_string(),
    }
}

async fn listings_for(sellers: &[&str]) -> LocalListings {
    let accounts = Arc::new(LocalAccounts::new());
    for email in sellers {
        accounts.register(email, "password1", "Sam", "Seller").await.unwrap();
    }
    LocalListings::new(accounts)
}

fn review(score: f32) -> NewReview {
    NewReview {
        reviewer_id: "buyer@example.com".to_string(),
        reviewer_name: "Bea Buyer".to_string(),
        score,
        comment: "Good".to_string(),
    }
}

#[tokio::test]
async fn test_login_with_correct_and_wrong_password() {
    let accounts = LocalAccounts::new();
    accounts
        .register("ada@example.com", "password1", "Ada", "Lovelace")
        .await
        .unwrap();

    let account = accounts.login("ada@example.com", "password1").await.unwrap();
    assert_eq!(account.display_name(), "Ada Lovelace");

    let wrong = accounts.login("ada@example.com", "password2").await;
    assert!(matches!(wrong, Err(Error::InvalidCredential)));
}

#[tokio::test]
async fn test_duplicate_registration_leaves_account_unchanged() {
    let accounts = LocalAccounts::new();
    accounts
        .register("ada@example.com", "password1", "Ada", "Lovelace")
        .await
        .unwrap();

    let again = accounts
        .register("ada@example.com", "other-pass", "Someone", "Else")
        .await;
    assert!(matches!(again, Err(Error::DuplicateAccount(email)) if email == "ada@example.com"));

    let kept = accounts.find("ada@example.com").unwrap();
    assert_eq!(kept.first_name, "Ada");
    assert_eq!(kept.password, "password1");
}

#[tokio::test]
async fn test_soft_deleted_listing_is_hidden_everywhere() {
    let listings = listings_for(&["sam@example.com"]).await;
    let kept = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();
    let gone = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();

    listings.soft_delete(&gone, "sam@example.com").await.unwrap();

    let all = listings.all_listings().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, kept);

    let by_seller = listings.listings_by_seller("sam@example.com").await.unwrap();
    assert_eq!(by_seller.len(), 1);
    assert!(listings.listing(&gone).await.unwrap().is_none());
}

#[tokio::test]
async fn test_only_the_seller_may_delete() {
    let listings = listings_for(&["sam@example.com"]).await;
    let id = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();

    let result = listings.soft_delete(&id, "mallory@example.com").await;
    match result {
        Err(Error::Forbidden(msg)) => assert_eq!(msg, "You can only delete your own products"),
        other => panic!("expected forbidden, got {:?}", other),
    }
    assert!(listings.listing(&id).await.unwrap().is_some());

    let missing = listings.soft_delete("no-such-listing", "sam@example.com").await;
    assert!(matches!(missing, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_average_rating() {
    let listings = listings_for(&["sam@example.com"]).await;
    let id = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();
    assert_eq!(listings.average_rating(&id).await, 0.0);

    listings.add_review(&id, review(5.0)).await.unwrap();
    listings.add_review(&id, review(3.0)).await.unwrap();
    assert_eq!(listings.average_rating(&id).await, 4.0);

    let stored = listings.listing(&id).await.unwrap().unwrap();
    assert_eq!(stored.reviews.len(), 2);
    assert_eq!(stored.reviews[0].score, 5.0);
}

#[tokio::test]
async fn test_listings_by_seller_and_order() {
    let listings = listings_for(&["sam@example.com", "other@example.com"]).await;
    let first = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = listings.add_listing(chair("sam@example.com"), vec![]).await.unwrap();
    listings.add_listing(chair("other@example.com"), vec![]).await.unwrap();

    let mine = listings.listings_by_seller("sam@example.com").await.unwrap();
    let ids: Vec<&str> = mine.iter().map(|l| l.id.as_str()).collect();
    assert_eq!(ids, vec![second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn test_invalid_listing_is_rejected() {
    let listings = listings_for(&["sam@example.com"]).await;
    let mut listing = chair("sam@example.com");
    listing.price = 0.0;

    let result = listings.add_listing(listing, vec![]).await;
    assert!(matches!(result, Err(Error::Validation(_))));
    assert!(listings.all_listings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_listing_needs_registered_seller() {
    let listings = listings_for(&["sam@example.com"]).await;

    let result = listings.add_listing(chair("ghost@nowhere.example"), vec![]).await;

    assert!(matches!(result, Err(Error::NotFound(_))));
    assert!(listings.all_listings().await.unwrap().is_empty());
    assert!(listings
        .listings_by_seller("ghost@nowhere.example")
        .await
        .unwrap()
        .is_empty());
}
