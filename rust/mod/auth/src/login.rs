//! Login form state.

use std::sync::LazyLock;

use epaket_core::{FieldErrors, Route};
use regex::Regex;
use tracing::{info, warn};

use crate::session::SessionGate;

/// Single message shown for any failed sign-in.
pub const LOGIN_FAILED: &str = "invalid email or password";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("valid email regex"));

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub errors: FieldErrors,
    /// Message for a rejected sign-in, separate from field errors.
    pub login_error: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Editing a field clears its error and the sign-in message.
    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
        self.errors.clear("email");
        self.login_error = None;
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
        self.errors.clear("password");
        self.login_error = None;
    }

    /// Check the fields locally. Replaces any previous field errors.
    pub fn validate(&mut self) -> bool {
        let mut errors = FieldErrors::new();
        if self.email.is_empty() {
            errors.add("email", "email is required");
        } else if !EMAIL_PATTERN.is_match(&self.email) {
            errors.add("email", "invalid email format");
        }
        if self.password.is_empty() {
            errors.add("password", "password is required");
        }
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Validate, then sign in. Returns the route to navigate to on
    /// success; on failure the form carries the messages to show.
    pub async fn submit(&mut self, gate: &SessionGate) -> Option<Route> {
        self.login_error = None;
        if !self.validate() {
            return None;
        }

        self.busy = true;
        let result = gate.sign_in(&self.email, &self.password).await;
        self.busy = false;

        match result {
            Ok(session) => {
                info!(user_id = %session.identity.id, role = %session.role, "signed in");
                self.password.clear();
                Some(session.landing())
            }
            Err(e) => {
                warn!("sign in failed: {}", e);
                self.login_error = Some(LOGIN_FAILED.to_string());
                None
            }
        }
    }
}
