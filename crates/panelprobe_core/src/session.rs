//! Authenticated sessions held by a run.
//!
//! A session is a bearer token plus the identity snapshot the panel returned
//! at login. Permissions are baked into the token at login time, so a
//! permission change on the server only takes effect for a session after a
//! fresh login replaces it.

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Role string the panel uses for the undeletable account.
pub const SUPER_ADMIN_ROLE: &str = "super_admin";

/// Name of the session logged in with the configured credentials.
pub const SUPER_SESSION: &str = "super admin";

/// Per-account permission flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Permissions {
    pub can_manage_admins: bool,
    pub can_view_private_projects: bool,
    pub can_access_private_storage: bool,
    pub can_access_chat: bool,
}

impl Permissions {
    /// Every flag set, as held by the super admin.
    pub const fn all() -> Self {
        Self {
            can_manage_admins: true,
            can_view_private_projects: true,
            can_access_private_storage: true,
            can_access_chat: true,
        }
    }

    /// Nothing but private storage, the baseline for a restricted admin.
    pub const fn storage_only() -> Self {
        Self {
            can_manage_admins: false,
            can_view_private_projects: false,
            can_access_private_storage: true,
            can_access_chat: false,
        }
    }

    pub const fn with_chat(mut self, enabled: bool) -> Self {
        self.can_access_chat = enabled;
        self
    }

    pub fn to_json(self) -> Value {
        json!({
            "canManageAdmins": self.can_manage_admins,
            "canViewPrivateProjects": self.can_view_private_projects,
            "canAccessPrivateStorage": self.can_access_private_storage,
            "canAccessChat": self.can_access_chat,
        })
    }

    /// Parse a `permissions` object. Missing flags read as false; a missing
    /// or non-object value yields `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        serde_json::from_value(value.clone()).ok()
    }
}

/// Identity snapshot returned with a login token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentity {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub role: String,
    #[serde(default)]
    pub permissions: Permissions,
}

impl AdminIdentity {
    pub fn is_super_admin(&self) -> bool {
        self.role == SUPER_ADMIN_ROLE
    }
}

/// One authenticated identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub admin: AdminIdentity,
}

impl Session {
    /// Extract a session from a login response, if it carries a token and an
    /// admin identity with a role.
    pub fn from_login(response: &ApiResponse) -> Option<Self> {
        if !response.success {
            return None;
        }
        let token = response.str_field("token").filter(|t| !t.is_empty())?;
        let admin: AdminIdentity = serde_json::from_value(response.field("admin")?.clone()).ok()?;
        if admin.role.is_empty() {
            return None;
        }
        Some(Self {
            token: token.to_string(),
            admin,
        })
    }
}

/// POST /auth/login. Returns the raw response so callers can assert on it.
pub fn login(client: &ApiClient, username: &str, password: &str) -> ApiResponse {
    client.send(
        ApiRequest::post("/auth/login").json(json!({
            "username": username,
            "password": password,
        })),
    )
}

/// Named sessions for a run. Inserting under an existing name replaces it.
#[derive(Debug, Default)]
pub struct Sessions {
    by_name: BTreeMap<String, Session>,
}

impl Sessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, session: Session) {
        self.by_name.insert(name.to_string(), session);
    }

    pub fn get(&self, name: &str) -> Option<&Session> {
        self.by_name.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Session> {
        self.by_name.remove(name)
    }

    /// Token of a named session.
    pub fn token(&self, name: &str) -> Option<&str> {
        self.get(name).map(|s| s.token.as_str())
    }

    /// Token of the configured super admin, if logged in.
    pub fn super_token(&self) -> Option<&str> {
        self.token(SUPER_SESSION)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
