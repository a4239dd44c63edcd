//! Confirmation seam for destructive actions.
//!
//! Views never decide on their own whether a delete goes ahead. They ask
//! a `Confirm` implementation injected by the front end (a terminal
//! prompt, a modal dialog, a test double).

/// Asks the user to acknowledge a destructive action.
pub trait Confirm: Send + Sync {
    /// Return `true` only on explicit acknowledgement.
    fn confirm(&self, prompt: &str) -> bool;
}

/// Acknowledges everything. Used by `--yes` flags and tests.
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything. Used for testing.
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
