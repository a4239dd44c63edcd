//! Client-side context management.
//!
//! Reads/writes `~/.epaket/config.toml`.

use std::path::{Path, PathBuf};

use epaket_core::BackendConfig;
use serde::{Deserialize, Serialize};

/// A single context: one hosted backend plus the session signed in to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Context {
    /// Context name (e.g. "asrama-putra").
    pub name: String,

    /// Service URL (e.g. "https://abc.supabase.co").
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    /// Public API key sent with every request.
    #[serde(rename = "anon-key", default, skip_serializing_if = "String::is_empty")]
    pub anon_key: String,

    /// Access token (set by `epaket login`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,

    /// Email of the signed-in account.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

impl Context {
    /// Backend settings for this context, before environment overrides.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig::new(&self.server, &self.anon_key)
    }
}

/// Saved backends and sessions of the CLI.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Context used when no other is selected.
    #[serde(rename = "current-context", default)]
    pub current_context: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl ClientConfig {
    /// `~/.epaket/config.toml`.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }

    /// Read the context file. A missing file is an empty configuration.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Write the context file, creating its directory.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn current(&self) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == self.current_context)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    pub fn current_mut(&mut self) -> Option<&mut Context> {
        let name = self.current_context.clone();
        self.get_mut(&name)
    }

    /// Insert a context or replace the one with the same name.
    pub fn upsert_context(&mut self, ctx: Context) {
        if let Some(existing) = self.get_mut(&ctx.name) {
            *existing = ctx;
        } else {
            self.contexts.push(ctx);
        }
    }

    /// Drop a context; clears `current-context` if it pointed there.
    pub fn remove_context(&mut self, name: &str) -> bool {
        let len = self.contexts.len();
        self.contexts.retain(|c| c.name != name);
        if self.current_context == name {
            self.current_context = String::new();
        }
        self.contexts.len() < len
    }

    /// Backend settings for the current context with `EPAKET_URL` /
    /// `EPAKET_ANON_KEY` applied on top. Works without any context.
    pub fn backend_config(&self) -> BackendConfig {
        self.current()
            .map(Context::backend_config)
            .unwrap_or_default()
            .with_env()
    }
}

/// `~/.epaket`, falling back to the working directory without a home.
fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".epaket")
}
