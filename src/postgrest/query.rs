//! Query builders for the document store

use reqwest::Client;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::Error;
use crate::fetch::{Fetch, FetchBuilder, ServiceCredentials};
use crate::postgrest::filter;
use crate::postgrest::types::{Direction, ReturnOption};

/// Base query builder
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    /// Query parameters, in insertion order
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    /// Create a new QueryBuilder
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Add a parameter to the query, replacing an earlier one with the same key
    pub fn add_param(&mut self, key: &str, value: &str) {
        self.params.retain(|(k, _)| k != key);
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Get the query parameters
    pub fn get_params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// Where a request goes and who it is sent as
#[derive(Clone)]
pub(crate) struct Target {
    pub(crate) url: String,
    pub(crate) credentials: ServiceCredentials,
    pub(crate) client: Client,
    pub(crate) token: Option<String>,
}

impl Target {
    /// Attach credentials and the bearer token (the anon key when signed out)
    fn authorize<'a>(&self, fetch: FetchBuilder<'a>) -> FetchBuilder<'a> {
        let token = self.token.as_deref().unwrap_or(&self.credentials.key);
        fetch.credentials(&self.credentials).bearer_auth(token)
    }
}

/// Builder for SELECT queries
pub struct SelectBuilder {
    target: Target,
    query: QueryBuilder,
}

impl SelectBuilder {
    pub(crate) fn new(target: Target, columns: &str) -> Self {
        let mut query = QueryBuilder::new();
        query.add_param("select", columns);

        Self { target, query }
    }

    /// Filter rows where column equals a value
    pub fn eq<T: ToString>(mut self, column: &str, value: T) -> Self {
        self.query.add_param(column, &filter::eq(value));
        self
    }

    /// Order the results by a column
    pub fn order(mut self, column: &str, direction: Direction) -> Self {
        self.query
            .add_param("order", &format!("{}.{}", column, direction.as_str()));
        self
    }

    /// Limit the number of rows returned
    pub fn limit(mut self, count: usize) -> Self {
        self.query.add_param("limit", &count.to_string());
        self
    }

    /// Execute the query and return the results
    pub async fn execute<T: DeserializeOwned>(&self) -> Result<Vec<T>, Error> {
        let fetch = Fetch::get(&self.target.client, &self.target.url).query(self.query.get_params());

        self.target.authorize(fetch).execute::<Vec<T>>().await
    }

    /// Execute the query and return the first row
    pub async fn execute_one<T: DeserializeOwned>(self) -> Result<Option<T>, Error> {
        let results = self.limit(1).execute::<T>().await?;
        Ok(results.into_iter().next())
    }
}

/// Builder for INSERT queries
pub struct InsertBuilder<T: Serialize> {
    target: Target,
    values: T,
}

impl<T: Serialize> InsertBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self { target, values }
    }

    /// Execute the insert without returning the written data
    pub async fn execute(&self) -> Result<(), Error> {
        let fetch = Fetch::post(&self.target.client, &self.target.url)
            .header("Prefer", ReturnOption::Minimal.as_str())
            .json(&self.values)?;

        self.target.authorize(fetch).execute_no_content().await
    }
}

/// Builder for UPDATE queries (PATCH merges the given fields into each row)
pub struct UpdateBuilder<T: Serialize> {
    target: Target,
    values: T,
    query: QueryBuilder,
}

impl<T: Serialize> UpdateBuilder<T> {
    pub(crate) fn new(target: Target, values: T) -> Self {
        Self {
            target,
            values,
            query: QueryBuilder::new(),
        }
    }

    /// Filter rows where column equals a value
    pub fn eq<V: ToString>(mut self, column: &str, value: V) -> Self {
        self.query.add_param(column, &filter::eq(value));
        self
    }

    /// Execute the update and return the updated rows
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<Vec<R>, Error> {
        let fetch = Fetch::patch(&self.target.client, &self.target.url)
            .header("Prefer", ReturnOption::Representation.as_str())
            .query(self.query.get_params())
            .json(&self.values)?;

        self.target.authorize(fetch).execute::<Vec<R>>().await
    }
}

/// Builder for stored procedure calls
pub struct RpcBuilder<T: Serialize> {
    target: Target,
    params: T,
}

impl<T: Serialize> RpcBuilder<T> {
    pub(crate) fn new(target: Target, params: T) -> Self {
        Self { target, params }
    }

    /// Call the function and parse its result
    pub async fn execute<R: DeserializeOwned>(&self) -> Result<R, Error> {
        let fetch = Fetch::post(&self.target.client, &self.target.url).json(&self.params)?;

        self.target.authorize(fetch).execute::<R>().await
    }
}
