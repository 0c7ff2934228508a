//! Types for the identity service

use serde::{Deserialize, Serialize};

use super::Session;

/// Authentication response
///
/// Sign-in always returns tokens plus a nested `user`. Sign-up returns the
/// same shape when the project auto-confirms, or the bare user object when
/// email confirmation is pending.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The access token
    pub access_token: Option<String>,

    /// The refresh token
    pub refresh_token: Option<String>,

    /// The token type
    pub token_type: Option<String>,

    /// The expiry time in seconds
    pub expires_in: Option<i64>,

    /// The user data
    pub user: Option<User>,

    /// User ID when the response is a bare user
    pub id: Option<String>,

    /// Email when the response is a bare user
    pub email: Option<String>,
}

impl AuthResponse {
    /// The identity-service user ID, wherever the response carried it
    pub fn user_id(&self) -> Option<&str> {
        self.user
            .as_ref()
            .map(|user| user.id.as_str())
            .or(self.id.as_deref())
    }

    /// The session described by this response, if tokens were issued
    pub fn session(&self) -> Option<Session> {
        let access_token = self.access_token.clone()?;
        let user_id = self.user_id()?.to_string();
        let email = self
            .user
            .as_ref()
            .and_then(|user| user.email.clone())
            .or_else(|| self.email.clone());

        Some(
            Session::new(
                access_token,
                self.refresh_token.clone().unwrap_or_default(),
                user_id,
                self.expires_in.unwrap_or(3600),
            )
            .with_email(email),
        )
    }
}

/// The user an auth response was issued for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The user's email address
    pub email: Option<String>,
}

/// Error body returned by the identity service
///
/// Different endpoints and versions use different field names for the same
/// information, so every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthErrorBody {
    pub error: Option<String>,
    pub error_description: Option<String>,
    pub error_code: Option<String>,
    pub msg: Option<String>,
    pub message: Option<String>,
}

impl AuthErrorBody {
    /// The most specific human readable message available
    pub fn message(&self) -> Option<&str> {
        self.error_description
            .as_deref()
            .or(self.msg.as_deref())
            .or(self.message.as_deref())
            .or(self.error.as_deref())
    }

    /// Sign-in rejected because email and password do not match
    pub fn is_invalid_credentials(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
            || self.error_code.as_deref() == Some("invalid_credentials")
            || self
                .message()
                .map(|m| m.to_ascii_lowercase().contains("invalid login credentials"))
                .unwrap_or(false)
    }

    /// Sign-up rejected because the email is taken
    pub fn is_duplicate_user(&self) -> bool {
        matches!(
            self.error_code.as_deref(),
            Some("user_already_exists") | Some("email_exists")
        ) || self
            .message()
            .map(|m| {
                let m = m.to_ascii_lowercase();
                m.contains("already registered") || m.contains("already in use")
            })
            .unwrap_or(false)
    }
}
