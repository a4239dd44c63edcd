//! Auth module: login form, user profiles and the role gate.
//!
//! Credentials are checked by the hosted auth service; this module only
//! validates input, looks up the profile row behind an identity and
//! decides the landing page and menu for its role.
//!
//! # Usage
//!
//! ```ignore
//! let gate = auth::SessionGate::from_backend(&backend);
//! let mut form = auth::LoginForm::new();
//! form.set_email("staff@example.com");
//! form.set_password(password);
//! if let Some(route) = form.submit(&gate).await {
//!     navigate(route);
//! }
//! ```

pub mod login;
pub mod model;
pub mod session;

pub use login::{LoginForm, LOGIN_FAILED};
pub use model::{MenuItem, Profile, Role, UserSession, DEFAULT_DISPLAY_NAME};
pub use session::SessionGate;
