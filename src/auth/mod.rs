//! Identity service client: sign-up, password sign-in and session handling

mod types;
mod session;

use log::{debug, warn};
use reqwest::{Client, Response};
use serde_json::json;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::Error;
use crate::fetch::{Fetch, ServiceCredentials};

pub use types::*;
pub use session::*;

/// Client for the identity service
#[derive(Clone)]
pub struct Auth {
    /// The base URL for the backend project
    url: String,

    /// Headers sent with every request
    credentials: ServiceCredentials,

    /// HTTP client used for requests
    client: Client,

    /// The current session
    session: Arc<Mutex<Option<Session>>>,
}

impl Auth {
    /// Create a new Auth client
    pub fn new(url: &str, credentials: ServiceCredentials, client: Client) -> Self {
        Self {
            url: url.to_string(),
            credentials,
            client,
            session: Arc::new(Mutex::new(None)),
        }
    }

    fn get_auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.url, path)
    }

    fn lock_session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sign up a new user with email and password
    ///
    /// `data` is stored as user metadata by the identity service.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        data: Option<serde_json::Value>,
    ) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/signup");
        debug!("Signing up {}", email);

        let mut body = json!({ "email": email, "password": password });
        if let Some(data) = data {
            body["data"] = data;
        }

        let response = Fetch::post(&self.client, &url)
            .credentials(&self.credentials)
            .json(&body)?
            .execute_raw()
            .await?;

        if !response.status().is_success() {
            return Err(classify_failure(response, |body| {
                body.is_duplicate_user()
                    .then(|| Error::DuplicateAccount(email.to_string()))
            })
            .await);
        }

        let result = response.json::<AuthResponse>().await?;
        if let Some(session) = result.session() {
            *self.lock_session() = Some(session);
        }

        Ok(result)
    }

    /// Sign in a user with email and password
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, Error> {
        let url = self.get_auth_url("/token");
        debug!("Signing in {}", email);

        let body = json!({ "email": email, "password": password });
        let params = vec![("grant_type".to_string(), "password".to_string())];

        let response = Fetch::post(&self.client, &url)
            .credentials(&self.credentials)
            .query(&params)
            .json(&body)?
            .execute_raw()
            .await?;

        if !response.status().is_success() {
            return Err(classify_failure(response, |body| {
                body.is_invalid_credentials().then_some(Error::InvalidCredential)
            })
            .await);
        }

        let result = response.json::<AuthResponse>().await?;
        let session = result
            .session()
            .ok_or_else(|| Error::remote("Sign-in response did not contain a session"))?;
        *self.lock_session() = Some(session);

        Ok(result)
    }

    /// Sign out the current user
    ///
    /// The local session is cleared even when the remote call fails.
    pub async fn sign_out(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/logout");

        let token = match self.lock_session().take() {
            Some(session) => session.access_token,
            None => return Ok(()),
        };

        Fetch::post(&self.client, &url)
            .credentials(&self.credentials)
            .bearer_auth(&token)
            .execute_no_content()
            .await
    }

    /// Probe the identity service health endpoint
    pub async fn health(&self) -> Result<(), Error> {
        let url = self.get_auth_url("/health");

        Fetch::get(&self.client, &url)
            .credentials(&self.credentials)
            .execute_no_content()
            .await
    }

    /// Get the current session, dropping it if it has expired
    pub fn get_session(&self) -> Option<Session> {
        let mut current_session = self.lock_session();
        if current_session.as_ref().map(Session::is_expired).unwrap_or(false) {
            warn!("Discarding expired session");
            *current_session = None;
        }
        current_session.clone()
    }

    /// Set the session
    pub fn set_session(&self, session: Session) {
        *self.lock_session() = Some(session);
    }

    /// Access token of the live session
    pub fn access_token(&self) -> Option<String> {
        self.get_session().map(|session| session.access_token)
    }
}

/// Map a failed identity response to a domain error, falling back to `Remote`
async fn classify_failure<F>(response: Response, specific: F) -> Error
where
    F: FnOnce(&AuthErrorBody) -> Option<Error>,
{
    let status = response.status();
    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => return Error::Http(e),
    };

    let body: AuthErrorBody = serde_json::from_str(&text).unwrap_or_default();
    if let Some(error) = specific(&body) {
        return error;
    }

    match body.message() {
        Some(message) => Error::remote(message),
        None => Error::remote(format!("Request failed with status {}: {}", status, text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_client(uri: &str) -> Auth {
        Auth::new(uri, ServiceCredentials::new("test_anon_key", "marketplace-rust/test"), Client::new())
    }

    fn token_response() -> serde_json::Value {
        json!({
            "access_token": "test_access_token",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "test_refresh_token",
            "user": {
                "id": "test_user_id",
                "email": "test@example.com"
            }
        })
    }

    #[tokio::test]
    async fn test_sign_in_stores_session() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "test_anon_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
            .mount(&mock_server)
            .await;

        let auth = auth_client(&mock_server.uri());
        let result = auth.sign_in("test@example.com", "password123").await.unwrap();

        assert_eq!(result.user_id(), Some("test_user_id"));
        let session = auth.get_session().unwrap();
        assert_eq!(session.access_token, "test_access_token");
        assert_eq!(session.email.as_deref(), Some("test@example.com"));
    }

    #[tokio::test]
    async fn test_sign_in_with_wrong_password() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&mock_server)
            .await;

        let auth = auth_client(&mock_server.uri());
        let result = auth.sign_in("test@example.com", "wrong").await;

        assert!(matches!(result, Err(Error::InvalidCredential)));
        assert!(auth.get_session().is_none());
    }

    #[tokio::test]
    async fn test_sign_up_sends_metadata_and_maps_duplicates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({ "email": "new@example.com", "data": { "firstName": "Ada" } })))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_response()))
            .mount(&mock_server)
            .await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/signup"))
            .and(body_partial_json(json!({ "email": "taken@example.com" })))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "code": 422,
                "error_code": "user_already_exists",
                "msg": "User already registered"
            })))
            .mount(&mock_server)
            .await;

        let auth = auth_client(&mock_server.uri());
        let created = auth
            .sign_up("new@example.com", "secret1", Some(json!({ "firstName": "Ada" })))
            .await
            .unwrap();
        assert_eq!(created.user_id(), Some("test_user_id"));

        let duplicate = auth.sign_up("taken@example.com", "secret1", None).await;
        match duplicate {
            Err(Error::DuplicateAccount(email)) => assert_eq!(email, "taken@example.com"),
            other => panic!("expected duplicate account, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_on_failure() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let auth = auth_client(&mock_server.uri());
        auth.set_session(Session::new("t".into(), "r".into(), "u".into(), 3600));

        assert!(auth.sign_out().await.is_err());
        assert!(auth.get_session().is_none());
        assert!(auth.sign_out().await.is_ok());
    }
}
