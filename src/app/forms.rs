//! Form input and validation for the login, registration and add-listing screens

use crate::error::{Error, Result};
use crate::models::{Account, NewListing};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

fn check(failed: bool, message: &str) -> Result<()> {
    if failed {
        Err(Error::validation(message))
    } else {
        Ok(())
    }
}

fn check_email(email: &str) -> Result<()> {
    check(email.trim().is_empty(), "Email is required")?;
    check(!email.contains('@'), "Please enter a valid email address")
}

/// Login screen fields
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_email(&self.email)?;
        check(self.password.trim().is_empty(), "Password is required")
    }
}

/// Registration screen fields
#[derive(Debug, Clone, Default)]
pub struct RegistrationForm {
    pub first_name: String,
    pub second_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl RegistrationForm {
    pub fn validate(&self) -> Result<()> {
        check(self.first_name.trim().is_empty(), "First name is required")?;
        check(self.second_name.trim().is_empty(), "Second name is required")?;
        check_email(&self.email)?;
        check(self.password.trim().is_empty(), "Password is required")?;
        check(
            self.password.chars().count() < MIN_PASSWORD_LEN,
            "Password must be at least 6 characters",
        )?;
        check(self.password != self.confirm_password, "Passwords do not match")
    }
}

/// Add-listing screen fields; price is the raw text typed by the seller
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub name: String,
    pub description: String,
    pub price: String,
    pub phone: String,
    pub category: String,
}

impl ListingForm {
    /// Validate and parse the price
    pub fn validate(&self) -> Result<f64> {
        check(self.name.trim().is_empty(), "Product name is required")?;
        check(self.description.trim().is_empty(), "Description is required")?;
        check(self.price.trim().is_empty(), "Price is required")?;

        let price = self
            .price
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite() && *p > 0.0)
            .ok_or_else(|| Error::validation("Please enter a valid price"))?;

        check(self.phone.trim().is_empty(), "Phone number is required")?;
        Ok(price)
    }

    /// Build the listing input for a seller
    pub fn into_new_listing(self, seller: &Account) -> Result<NewListing> {
        let price = self.validate()?;

        Ok(NewListing {
            name: self.name,
            description: self.description,
            price,
            seller_id: seller.email.clone(),
            seller_name: seller.display_name(),
            seller_phone: self.phone,
            category: self.category,
        })
    }
}
