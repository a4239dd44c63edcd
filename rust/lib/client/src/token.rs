//! Bearer token providers.

use crate::ApiError;

/// Supplies the bearer for each table request.
///
/// Returns `Ok(None)` when there is no signed-in user; the request then
/// goes out with the public key as bearer.
#[async_trait::async_trait]
pub trait TokenSource: Send + Sync + 'static {
    async fn token(&self) -> Result<Option<String>, ApiError>;
}

/// Always anonymous: requests carry only the public key.
pub struct NoAuth;

#[async_trait::async_trait]
impl TokenSource for NoAuth {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(None)
    }
}

/// A fixed access token, e.g. one issued to a service account.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait::async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(Some(self.0.clone()))
    }
}

/// The access token of the current session.
///
/// Shared between the auth client (which sets and clears it) and the
/// data client (which sends it).
#[derive(Default)]
pub struct SessionToken {
    current: tokio::sync::RwLock<Option<String>>,
}

impl SessionToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token restored from a saved session.
    pub fn restored(token: impl Into<String>) -> Self {
        Self {
            current: tokio::sync::RwLock::new(Some(token.into())),
        }
    }

    pub async fn set(&self, token: impl Into<String>) {
        *self.current.write().await = Some(token.into());
    }

    pub async fn clear(&self) {
        *self.current.write().await = None;
    }

    pub async fn get(&self) -> Option<String> {
        self.current.read().await.clone()
    }
}

#[async_trait::async_trait]
impl TokenSource for SessionToken {
    async fn token(&self) -> Result<Option<String>, ApiError> {
        Ok(self.get().await)
    }
}
