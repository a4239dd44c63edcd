//! HTTP client for the hosted table API (PostgREST dialect).
//!
//! `{base_url}/rest/v1/{table}` with `apikey` and bearer headers on
//! every request.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::error_message;
use crate::{ApiError, DataStore, Query, TokenSource};

/// Ask the server to echo written rows back.
const RETURN_REPRESENTATION: &str = "return=representation";

pub struct RestStore {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    token_source: Arc<dyn TokenSource>,
}

impl RestStore {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        token_source: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            token_source,
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Build a request with the key and bearer headers.
    ///
    /// Without a session the public key doubles as the bearer token.
    async fn authed(&self, method: Method, table: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let bearer = self
            .token_source
            .token()
            .await?
            .unwrap_or_else(|| self.anon_key.clone());
        Ok(self
            .http
            .request(method, self.table_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer))
    }

    /// Parse an API response, mapping HTTP errors to `ApiError`.
    async fn parse<R: DeserializeOwned>(resp: reqwest::Response) -> Result<R, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let code = status.as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: code,
                message: error_message(&body),
            });
        }
        resp.json::<R>()
            .await
            .map_err(|e| ApiError::Decode(format!("response body: {}", e)))
    }
}

#[async_trait::async_trait]
impl DataStore for RestStore {
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ApiError> {
        debug!(table, ?query, "select");
        let req = self.authed(Method::GET, table).await?.query(&query.to_params());
        let resp = req.send().await?;
        Self::parse(resp).await
    }

    async fn insert(&self, table: &str, row: &Value) -> Result<Value, ApiError> {
        debug!(table, "insert");
        let req = self
            .authed(Method::POST, table)
            .await?
            .header("Prefer", RETURN_REPRESENTATION)
            .json(row);
        let resp = req.send().await?;
        let rows: Vec<Value> = Self::parse(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ApiError> {
        debug!(table, id, "update");
        let req = self
            .authed(Method::PATCH, table)
            .await?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION)
            .json(patch);
        let resp = req.send().await?;
        let rows: Vec<Value> = Self::parse(resp).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound(format!("{}/{}", table, id)))
    }

    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError> {
        debug!(table, id, "delete");
        let req = self
            .authed(Method::DELETE, table)
            .await?
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", RETURN_REPRESENTATION);
        let resp = req.send().await?;
        let rows: Vec<Value> = Self::parse(resp).await?;
        if rows.is_empty() {
            return Err(ApiError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }
}
