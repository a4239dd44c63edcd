//! HTTP client for the hosted auth API (GoTrue dialect).

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::error_message;
use crate::{ApiError, AuthProvider, Identity, Session, SessionToken};

pub struct RestAuth {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    token: Arc<SessionToken>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: Identity,
}

impl RestAuth {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>, token: Arc<SessionToken>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl AuthProvider for RestAuth {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        debug!(email, "sign in");
        let resp = self
            .http
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.anon_key)
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Auth(format!("sign in failed ({}): {}", status, error_message(&body))));
        }

        let tr: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("token response: {}", e)))?;

        let expires_at = tr
            .expires_at
            .unwrap_or_else(|| chrono::Utc::now().timestamp() + tr.expires_in as i64);

        self.token.set(tr.access_token.clone()).await;

        Ok(Session {
            access_token: tr.access_token,
            expires_at,
            identity: tr.user,
        })
    }

    async fn sign_out(&self) -> Result<(), ApiError> {
        let Some(token) = self.token.get().await else {
            return Ok(());
        };
        self.token.clear().await;

        let resp = self
            .http
            .post(self.url("logout"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            warn!("sign out rejected ({}): {}", status, body);
            return Err(ApiError::Server {
                status,
                message: error_message(&body),
            });
        }
        Ok(())
    }

    async fn current_identity(&self) -> Result<Option<Identity>, ApiError> {
        let Some(token) = self.token.get().await else {
            return Ok(None);
        };

        let resp = self
            .http
            .get(self.url("user"))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            debug!("session token rejected, treating as signed out");
            return Ok(None);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let identity: Identity = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(format!("user response: {}", e)))?;
        Ok(Some(identity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn sign_in_stores_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "password".into()))
            .match_header("apikey", "anon")
            .with_status(200)
            .with_body(
                r#"{"access_token":"jwt-1","token_type":"bearer","expires_in":3600,
                    "refresh_token":"r","user":{"id":"u1","email":"admin@example.com"}}"#,
            )
            .create_async()
            .await;

        let token = Arc::new(SessionToken::new());
        let auth = RestAuth::new(server.url(), "anon", token.clone());
        let session = auth.sign_in_with_password("admin@example.com", "pw").await.unwrap();

        assert_eq!(session.identity.id, "u1");
        assert_eq!(session.access_token, "jwt-1");
        assert!(session.expires_at > chrono::Utc::now().timestamp());
        assert_eq!(token.get().await, Some("jwt-1".to_string()));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn bad_credentials_are_auth_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_body(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
            .create_async()
            .await;

        let token = Arc::new(SessionToken::new());
        let auth = RestAuth::new(server.url(), "anon", token.clone());
        let err = auth.sign_in_with_password("x@example.com", "bad").await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(ref m) if m.contains("Invalid login credentials")));
        assert!(token.get().await.is_none());
    }

    #[tokio::test]
    async fn current_identity_without_token_is_none() {
        let auth = RestAuth::new("http://127.0.0.1:9", "anon", Arc::new(SessionToken::new()));
        assert!(auth.current_identity().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn expired_token_reads_as_signed_out() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/auth/v1/user")
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        let auth = RestAuth::new(server.url(), "anon", Arc::new(SessionToken::restored("old")));
        assert!(auth.current_identity().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn sign_out_clears_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/logout")
            .match_header("authorization", "Bearer jwt-1")
            .with_status(204)
            .create_async()
            .await;

        let token = Arc::new(SessionToken::restored("jwt-1"));
        let auth = RestAuth::new(server.url(), "anon", token.clone());
        auth.sign_out().await.unwrap();
        assert!(token.get().await.is_none());
        mock.assert_async().await;
    }
}
