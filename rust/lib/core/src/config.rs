use std::time::Duration;

use crate::AppError;

/// Environment variable overriding the backend URL.
pub const ENV_URL: &str = "EPAKET_URL";
/// Environment variable overriding the public (anon) API key.
pub const ENV_ANON_KEY: &str = "EPAKET_ANON_KEY";

/// Remote table names. Defaults match the hosted project schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub parcels: String,
    pub categories: String,
    pub profiles: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            parcels: "pakages".to_string(),
            categories: "master_kode_kategori".to_string(),
            profiles: "profiles".to_string(),
        }
    }
}

/// Optional overrides for the behaviour settings. `None` keeps the value
/// already configured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tuning {
    pub page_size: Option<usize>,
    pub pickup_fee: Option<u64>,
    pub poll_secs: Option<u64>,
}

/// Connection and behaviour settings for the hosted data/auth service.
///
/// Built explicitly at process start (from a CLI context, tuning flags and
/// environment) and handed to `Backend::remote`. Credentials are never
/// compiled in.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,

    /// Public API key sent as `apikey` on every request.
    pub anon_key: String,

    pub tables: TableNames,

    /// Rows per listing page.
    pub page_size: usize,

    /// Fee charged per picked-up parcel, shown as dashboard revenue.
    pub pickup_fee: u64,

    /// Change feed polling interval for the HTTP backend.
    pub poll_interval: Duration,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            tables: TableNames::default(),
            page_size: 10,
            pickup_fee: 2000,
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            anon_key: anon_key.into(),
            ..Default::default()
        }
    }

    /// Apply the command-line tuning flags on top of the current values.
    pub fn with_tuning(mut self, tuning: &Tuning) -> Self {
        if let Some(n) = tuning.page_size {
            self.page_size = n;
        }
        if let Some(fee) = tuning.pickup_fee {
            self.pickup_fee = fee;
        }
        if let Some(secs) = tuning.poll_secs {
            self.poll_interval = Duration::from_secs(secs);
        }
        self
    }

    /// Apply `EPAKET_URL` / `EPAKET_ANON_KEY` overrides from the process environment.
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (environment in production).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_URL).filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(key) = lookup(ENV_ANON_KEY).filter(|v| !v.is_empty()) {
            self.anon_key = key;
        }
        self
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Check that the settings are usable before any network call.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.url.is_empty() {
            return Err(AppError::Validation(format!(
                "backend url is not set (use a context server or {})",
                ENV_URL
            )));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(AppError::Validation(format!(
                "backend url must start with http:// or https://: {}",
                self.url
            )));
        }
        if self.anon_key.is_empty() {
            return Err(AppError::Validation(format!(
                "anon key is not set (use a context anon-key or {})",
                ENV_ANON_KEY
            )));
        }
        if self.page_size == 0 {
            return Err(AppError::Validation("page size must be at least 1".into()));
        }
        Ok(())
    }
}
