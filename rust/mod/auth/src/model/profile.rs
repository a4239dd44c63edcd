use epaket_client::Identity;
use epaket_core::Route;
use serde::{Deserialize, Serialize};

/// Display name used when a profile row is missing or has no username.
pub const DEFAULT_DISPLAY_NAME: &str = "Admin";

/// Role stored on the profile row. Anything unrecognised reads as `User`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    #[serde(other)]
    User,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row of the profiles table, keyed by the auth identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
}

fn null_as_default<'de, D>(deserializer: D) -> Result<Role, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let role: Option<Role> = Option::deserialize(deserializer)?;
    Ok(role.unwrap_or_default())
}

/// One entry of the navigation menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub title: &'static str,
    pub route: Route,
}

/// The signed-in user as the layout sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub identity: Identity,
    pub display_name: String,
    pub role: Role,
}

impl UserSession {
    pub fn new(identity: Identity, profile: Option<Profile>) -> Self {
        let (display_name, role) = match profile {
            Some(p) => (
                p.username
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
                p.role,
            ),
            None => (DEFAULT_DISPLAY_NAME.to_string(), Role::User),
        };
        Self {
            identity,
            display_name,
            role,
        }
    }

    /// Where to go right after sign-in.
    pub fn landing(&self) -> Route {
        match self.role {
            Role::Admin => Route::Dashboard,
            Role::User => Route::Search,
        }
    }

    /// Menu entries for this role. Hiding entries is presentation only;
    /// the hosted service enforces access.
    pub fn menu(&self) -> Vec<MenuItem> {
        let mut items = vec![MenuItem {
            title: "Dashboard",
            route: Route::Dashboard,
        }];
        if self.role.is_admin() {
            items.push(MenuItem {
                title: "Add parcel",
                route: Route::ParcelForm { id: None },
            });
            items.push(MenuItem {
                title: "Parcel data",
                route: Route::Listing,
            });
        }
        items.push(MenuItem {
            title: "Search parcels",
            route: Route::Search,
        });
        if self.role.is_admin() {
            items.push(MenuItem {
                title: "Category codes",
                route: Route::CategoryMaster,
            });
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> Identity {
        Identity {
            id: "u1".into(),
            email: Some("staff@example.com".into()),
        }
    }

    #[test]
    fn role_parsing() {
        let p: Profile = serde_json::from_value(json!({"id": "u1", "username": "Sari", "role": "admin"})).unwrap();
        assert_eq!(p.role, Role::Admin);

        let p: Profile = serde_json::from_value(json!({"id": "u1", "role": "staff"})).unwrap();
        assert_eq!(p.role, Role::User);

        let p: Profile = serde_json::from_value(json!({"id": "u1", "role": null})).unwrap();
        assert_eq!(p.role, Role::User);

        let p: Profile = serde_json::from_value(json!({"id": "u1"})).unwrap();
        assert_eq!(p.role, Role::User);
        assert!(p.username.is_none());
    }

    #[test]
    fn missing_profile_falls_back() {
        let s = UserSession::new(identity(), None);
        assert_eq!(s.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(s.role, Role::User);
        assert_eq!(s.landing(), Route::Search);
    }

    #[test]
    fn blank_username_falls_back() {
        let profile = Profile {
            id: "u1".into(),
            username: Some("  ".into()),
            role: Role::Admin,
        };
        let s = UserSession::new(identity(), Some(profile));
        assert_eq!(s.display_name, DEFAULT_DISPLAY_NAME);
        assert_eq!(s.landing(), Route::Dashboard);
    }

    #[test]
    fn menu_by_role() {
        let admin = UserSession {
            identity: identity(),
            display_name: "Sari".into(),
            role: Role::Admin,
        };
        let routes: Vec<Route> = admin.menu().into_iter().map(|m| m.route).collect();
        assert_eq!(
            routes,
            vec![
                Route::Dashboard,
                Route::ParcelForm { id: None },
                Route::Listing,
                Route::Search,
                Route::CategoryMaster,
            ]
        );

        let user = UserSession { role: Role::User, ..admin };
        let routes: Vec<Route> = user.menu().into_iter().map(|m| m.route).collect();
        assert_eq!(routes, vec![Route::Dashboard, Route::Search]);
    }
}
