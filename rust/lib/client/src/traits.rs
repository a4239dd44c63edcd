use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::{ApiError, Query};

/// Table-shaped remote storage.
///
/// Rows travel as JSON objects; typed models live in the business
/// modules. Every call is a single request with no retry.
#[async_trait::async_trait]
pub trait DataStore: Send + Sync {
    /// Read rows matching the query.
    async fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, ApiError>;

    /// Insert one row and return it as stored (with generated columns).
    async fn insert(&self, table: &str, row: &Value) -> Result<Value, ApiError>;

    /// Patch the row with the given `id`. `ApiError::NotFound` if no row matched.
    async fn update(&self, table: &str, id: &str, patch: &Value) -> Result<Value, ApiError>;

    /// Delete the row with the given `id`. `ApiError::NotFound` if no row matched.
    async fn delete(&self, table: &str, id: &str) -> Result<(), ApiError>;
}

/// An authenticated identity as the auth service reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    /// Absolute expiry (seconds since epoch).
    pub expires_at: i64,
    pub identity: Identity,
}

/// Sign-in, sign-out and current-identity lookup.
#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ApiError>;

    /// End the session. The local token is dropped even if the remote call fails.
    async fn sign_out(&self) -> Result<(), ApiError>;

    /// The identity behind the current token; `None` when signed out or expired.
    async fn current_identity(&self) -> Result<Option<Identity>, ApiError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
    /// Something changed; the source cannot tell what.
    Changed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub table: String,
    pub kind: ChangeKind,
}

/// Live change notifications for one table.
///
/// Dropping the subscription (or cancelling its token) stops delivery.
pub struct Subscription {
    rx: mpsc::Receiver<ChangeEvent>,
    cancel: CancellationToken,
}

impl Subscription {
    pub fn new(rx: mpsc::Receiver<ChangeEvent>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }

    /// Wait for the next change. `None` once the feed has stopped.
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        self.rx.recv().await
    }

    /// Token that stops this subscription when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Source of change notifications. Must be called inside a tokio runtime.
pub trait ChangeFeed: Send + Sync {
    fn subscribe(&self, table: &str) -> Subscription;
}
