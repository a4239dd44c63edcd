//! Client-side routes. Each path maps to exactly one view.

use std::fmt;

/// A navigable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `/`: welcome page.
    Landing,
    /// `/login`
    Login,
    /// `/dashboard`: stats, recent activity, per-category chart.
    Dashboard,
    /// `/dashboard/input` (create) or `/dashboard/input/:id` (edit).
    ParcelForm { id: Option<String> },
    /// `/dashboard/data`: full listing with status/delete actions.
    Listing,
    /// `/dashboard/search`: read-only search.
    Search,
    /// `/dashboard/master-kode-kategori`: category master table.
    CategoryMaster,
}

impl Route {
    /// Resolve a path. Trailing slashes and a query string are ignored;
    /// matching is case-insensitive on the static segments.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let lower: Vec<String> = segments.iter().map(|s| s.to_ascii_lowercase()).collect();
        let lower: Vec<&str> = lower.iter().map(String::as_str).collect();

        match lower.as_slice() {
            [] => Some(Route::Landing),
            ["login"] => Some(Route::Login),
            ["dashboard"] => Some(Route::Dashboard),
            ["dashboard", "input"] => Some(Route::ParcelForm { id: None }),
            ["dashboard", "input", _] => Some(Route::ParcelForm {
                id: Some(segments[2].to_string()),
            }),
            ["dashboard", "data"] => Some(Route::Listing),
            ["dashboard", "search"] => Some(Route::Search),
            ["dashboard", "master-kode-kategori"] => Some(Route::CategoryMaster),
            _ => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Landing => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::ParcelForm { id: None } => "/dashboard/input".to_string(),
            Route::ParcelForm { id: Some(id) } => format!("/dashboard/input/{}", id),
            Route::Listing => "/dashboard/data".to_string(),
            Route::Search => "/dashboard/search".to_string(),
            Route::CategoryMaster => "/dashboard/master-kode-kategori".to_string(),
        }
    }

    /// Routes reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Route::Landing | Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
