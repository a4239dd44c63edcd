//! Resolves who is signed in and what they may see.

use std::sync::Arc;

use epaket_client::{ApiError, AuthProvider, Backend, DataStore, Identity, Query};
use epaket_core::{AppError, Route};
use tracing::{debug, warn};

use crate::model::{Profile, UserSession};

/// Identity + profile lookup shared by the layout and the login form.
#[derive(Clone)]
pub struct SessionGate {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DataStore>,
    profiles_table: String,
}

impl SessionGate {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn DataStore>, profiles_table: impl Into<String>) -> Self {
        Self {
            auth,
            store,
            profiles_table: profiles_table.into(),
        }
    }

    pub fn from_backend(backend: &Backend) -> Self {
        Self::new(
            backend.auth.clone(),
            backend.store.clone(),
            backend.config.tables.profiles.clone(),
        )
    }

    /// Fetch the profile row for an identity. `None` if there is no row.
    pub async fn profile(&self, user_id: &str) -> Result<Option<Profile>, AppError> {
        debug!(user_id, "fetch profile");
        let rows = self
            .store
            .select(&self.profiles_table, &Query::new().eq("id", user_id).limit(1))
            .await?;
        match rows.into_iter().next() {
            Some(row) => {
                let profile = serde_json::from_value(row)
                    .map_err(|e| AppError::Internal(format!("profile row: {}", e)))?;
                Ok(Some(profile))
            }
            None => Ok(None),
        }
    }

    /// Session for an identity. A failed profile read degrades to the
    /// default name and the `user` role.
    async fn session_for(&self, identity: Identity) -> UserSession {
        let profile = match self.profile(&identity.id).await {
            Ok(p) => p,
            Err(e) => {
                warn!(user_id = %identity.id, "profile lookup failed: {}", e);
                None
            }
        };
        UserSession::new(identity, profile)
    }

    /// The current session, or `None` when nobody is signed in.
    pub async fn resolve(&self) -> Result<Option<UserSession>, AppError> {
        let Some(identity) = self.auth.current_identity().await? else {
            return Ok(None);
        };
        Ok(Some(self.session_for(identity).await))
    }

    /// Sign in and resolve the role in one step.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AppError> {
        let session = self
            .auth
            .sign_in_with_password(email, password)
            .await
            .map_err(|e| match e {
                ApiError::Network(_) => AppError::from(e),
                other => AppError::Unauthorized(other.to_string()),
            })?;
        Ok(self.session_for(session.identity).await)
    }

    /// Sign out and return where to go next. The local session is
    /// dropped even if the remote call fails.
    pub async fn sign_out(&self) -> Route {
        if let Err(e) = self.auth.sign_out().await {
            warn!("sign out failed: {}", e);
        }
        Route::Login
    }

    /// Where a request for `route` ends up given the current session.
    /// Private routes without a session go to the login page.
    pub async fn guard(&self, route: Route) -> Result<Route, AppError> {
        if route.is_public() {
            return Ok(route);
        }
        match self.auth.current_identity().await? {
            Some(_) => Ok(route),
            None => Ok(Route::Login),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;
    use epaket_client::MemoryStore;
    use serde_json::json;

    fn gate() -> (SessionGate, Arc<MemoryStore>) {
        let (backend, store, auth) = Backend::in_memory();
        auth.add_user("u-admin", "admin@example.com", "secret");
        auth.add_user("u-res", "resident@example.com", "secret");
        store.seed(
            "profiles",
            vec![
                json!({"id": "u-admin", "username": "Sari", "role": "admin"}),
                json!({"id": "u-res", "username": "Budi", "role": "user"}),
            ],
        );
        (SessionGate::from_backend(&backend), store)
    }

    #[tokio::test]
    async fn nobody_signed_in() {
        let (gate, _) = gate();
        assert!(gate.resolve().await.unwrap().is_none());
        assert_eq!(gate.guard(Route::Listing).await.unwrap(), Route::Login);
        assert_eq!(gate.guard(Route::Landing).await.unwrap(), Route::Landing);
    }

    #[tokio::test]
    async fn admin_session() {
        let (gate, _) = gate();
        let s = gate.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(s.role, Role::Admin);
        assert_eq!(s.display_name, "Sari");
        assert_eq!(s.landing(), Route::Dashboard);

        let resolved = gate.resolve().await.unwrap().unwrap();
        assert_eq!(resolved, s);
        assert_eq!(gate.guard(Route::Listing).await.unwrap(), Route::Listing);
    }

    #[tokio::test]
    async fn resident_lands_on_search() {
        let (gate, _) = gate();
        let s = gate.sign_in("resident@example.com", "secret").await.unwrap();
        assert_eq!(s.role, Role::User);
        assert_eq!(s.landing(), Route::Search);
    }

    #[tokio::test]
    async fn profile_read_failure_degrades_to_user() {
        let (gate, store) = gate();
        store.set_fail_reads(true);
        let s = gate.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(s.role, Role::User);
        assert_eq!(s.display_name, "Admin");
    }

    #[tokio::test]
    async fn bad_password_is_unauthorized() {
        let (gate, _) = gate();
        let err = gate.sign_in("admin@example.com", "nope").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn sign_out_goes_to_login() {
        let (gate, _) = gate();
        gate.sign_in("admin@example.com", "secret").await.unwrap();
        assert_eq!(gate.sign_out().await, Route::Login);
        assert!(gate.resolve().await.unwrap().is_none());
    }
}
