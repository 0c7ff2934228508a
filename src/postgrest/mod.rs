//! Document store operations through the PostgREST API

mod query;
mod types;
mod filter;

use reqwest::Client;
use serde::Serialize;

use crate::error::Error;
use crate::fetch::{Fetch, ServiceCredentials};

pub use query::*;
pub use types::*;

/// Client for one document collection
#[derive(Clone)]
pub struct PostgrestClient {
    /// The base URL for the backend project
    url: String,

    /// Headers sent with every request
    credentials: ServiceCredentials,

    /// The collection (table) name
    table: String,

    /// HTTP client
    client: Client,

    /// Session access token, the anon key is used when absent
    token: Option<String>,
}

impl PostgrestClient {
    /// Create a new PostgrestClient
    pub fn new(url: &str, credentials: ServiceCredentials, table: &str, client: Client) -> Self {
        Self {
            url: url.to_string(),
            credentials,
            table: table.to_string(),
            client,
            token: None,
        }
    }

    /// Send requests as the given session
    pub fn with_auth(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    fn target(&self, url: String) -> Target {
        Target {
            url,
            credentials: self.credentials.clone(),
            client: self.client.clone(),
            token: self.token.clone(),
        }
    }

    /// Get the base URL for REST API requests
    fn get_url(&self) -> String {
        format!("{}/rest/v1/{}", self.url, self.table)
    }

    /// Select specific columns from the collection
    pub fn select(&self, columns: &str) -> SelectBuilder {
        SelectBuilder::new(self.target(self.get_url()), columns)
    }

    /// Insert a document into the collection
    pub fn insert<T: Serialize>(&self, values: T) -> InsertBuilder<T> {
        InsertBuilder::new(self.target(self.get_url()), values)
    }

    /// Merge fields into matching documents
    pub fn update<T: Serialize>(&self, values: T) -> UpdateBuilder<T> {
        UpdateBuilder::new(self.target(self.get_url()), values)
    }

    /// Call a stored procedure or function
    pub fn rpc<T: Serialize>(&self, function: &str, params: T) -> RpcBuilder<T> {
        let url = format!("{}/rest/v1/rpc/{}", self.url, function);
        RpcBuilder::new(self.target(url), params)
    }

    /// Probe the REST root
    pub async fn health(&self) -> Result<(), Error> {
        let url = format!("{}/rest/v1/", self.url);

        Fetch::get(&self.client, &url)
            .credentials(&self.credentials)
            .bearer_auth(&self.credentials.key)
            .execute_no_content()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn products(uri: &str) -> PostgrestClient {
        PostgrestClient::new(
            uri,
            ServiceCredentials::new("anon", "marketplace-rust/test"),
            "products",
            Client::new(),
        )
    }

    #[tokio::test]
    async fn test_select_with_filter_and_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/rest/v1/products"))
            .and(query_param("select", "*"))
            .and(query_param("sellerId", "eq.s@example.com"))
            .and(query_param("order", "createdAt.desc"))
            .and(header("Authorization", "Bearer anon"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "1" }])))
            .mount(&mock_server)
            .await;

        let rows: Vec<Value> = products(&mock_server.uri())
            .select("*")
            .eq("sellerId", "s@example.com")
            .order("createdAt", Direction::Descending)
            .execute()
            .await
            .unwrap();

        assert_eq!(rows, vec![json!({ "id": "1" })]);
    }

    #[tokio::test]
    async fn test_update_uses_session_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/products"))
            .and(query_param("id", "eq.42"))
            .and(header("Authorization", "Bearer session-token"))
            .and(header("Prefer", "return=representation"))
            .and(body_json(json!({ "isDeleted": true })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": "42" }])))
            .mount(&mock_server)
            .await;

        let updated: Vec<Value> = products(&mock_server.uri())
            .with_auth(Some("session-token".to_string()))
            .update(json!({ "isDeleted": true }))
            .eq("id", "42")
            .execute()
            .await
            .unwrap();

        assert_eq!(updated.len(), 1);
    }

    #[tokio::test]
    async fn test_insert_failure_is_reported() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/rest/v1/products"))
            .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
            .mount(&mock_server)
            .await;

        let result = products(&mock_server.uri())
            .insert(json!({ "id": "1" }))
            .execute()
            .await;

        assert!(matches!(result, Err(Error::Remote(_))));
    }
}
