//! Mutable state shared by the sequences of one run.
//!
//! Everything one sequence leaves behind for another (sessions, created
//! entities, the restricted admin, the chat conversation) lives here, so the
//! dependencies between sequences are visible in one place.

use crate::client::{ApiClient, ApiRequest, ApiResponse};
use crate::config::Config;
use crate::error::Result;
use crate::report::{ReportSink, Reporter};
use crate::session::{self, Permissions, Session, Sessions};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use tracing::debug;
use uuid::Uuid;

/// Session name of the low-privilege admin shared by several sequences.
pub const RESTRICTED_SESSION: &str = "restricted admin";

/// Kinds of entity the harness creates and must clean up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureKind {
    Admin,
    Project,
    StorageItem,
    Skill,
    Service,
}

impl FixtureKind {
    /// Collection path the entity is created under and deleted from.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Admin => "/admins",
            Self::Project => "/projects",
            Self::StorageItem => "/storage",
            Self::Skill => "/skills",
            Self::Service => "/services",
        }
    }

    pub fn item_path(self, id: &str) -> String {
        format!("{}/{}", self.collection(), id)
    }
}

impl fmt::Display for FixtureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Admin => "admin",
            Self::Project => "project",
            Self::StorageItem => "storage item",
            Self::Skill => "skill",
            Self::Service => "service",
        };
        f.write_str(name)
    }
}

/// Something created for test purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fixture {
    pub kind: FixtureKind,
    pub id: String,
    /// Human-readable name used in cleanup output.
    pub label: String,
}

/// An admin account created by the harness, with the password needed to log
/// back in after its permissions change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedAdmin {
    pub id: String,
    pub username: String,
    pub password: String,
    pub permissions: Permissions,
}

/// State for one conformance run.
pub struct RunContext {
    pub config: Config,
    pub client: ApiClient,
    pub sessions: Sessions,
    pub reporter: Reporter,
    /// Low-privilege admin, created on first use.
    pub restricted: Option<ManagedAdmin>,
    /// Conversation opened by the chat sequence.
    pub chat_id: Option<String>,
    fixtures: Vec<Fixture>,
    run_tag: String,
    name_counter: u32,
}

impl RunContext {
    /// Validate `config` and build the client.
    pub fn new(config: Config, sink: Box<dyn ReportSink>) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(&config.target.base_url, config.target.timeout())?;
        let run_tag = Uuid::new_v4().simple().to_string()[..8].to_string();

        Ok(Self {
            config,
            client,
            sessions: Sessions::new(),
            reporter: Reporter::new(sink),
            restricted: None,
            chat_id: None,
            fixtures: Vec::new(),
            run_tag,
            name_counter: 0,
        })
    }

    /// Tag shared by every name this run generates.
    pub fn run_tag(&self) -> &str {
        &self.run_tag
    }

    /// Unique, recognizable name for a created entity.
    pub fn unique_name(&mut self, label: &str) -> String {
        self.name_counter += 1;
        format!(
            "{}_{}_{}_{}",
            self.config.run.fixture_prefix, label, self.run_tag, self.name_counter
        )
    }

    pub fn send(&self, request: ApiRequest) -> ApiResponse {
        self.client.send(request)
    }

    /// Owned copy of the super-admin token.
    pub fn super_token(&self) -> Option<String> {
        self.sessions.super_token().map(str::to_string)
    }

    pub fn session_token(&self, name: &str) -> Option<String> {
        self.sessions.token(name).map(str::to_string)
    }

    // ===== Fixtures =====

    pub fn track(&mut self, kind: FixtureKind, id: &str, label: &str) {
        debug!(%kind, id, "tracking fixture");
        self.fixtures.push(Fixture {
            kind,
            id: id.to_string(),
            label: label.to_string(),
        });
    }

    /// Forget a fixture after a successful delete. Returns whether it was tracked.
    pub fn untrack(&mut self, kind: FixtureKind, id: &str) -> bool {
        let before = self.fixtures.len();
        self.fixtures.retain(|f| !(f.kind == kind && f.id == id));
        before != self.fixtures.len()
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn is_tracked(&self, kind: FixtureKind, id: &str) -> bool {
        self.fixtures.iter().any(|f| f.kind == kind && f.id == id)
    }

    /// Delete a tracked fixture with the super-admin session, untracking it
    /// on success.
    pub fn delete_fixture(&mut self, kind: FixtureKind, id: &str) -> ApiResponse {
        let token = self.super_token();
        let response = self.send(ApiRequest::delete(kind.item_path(id)).bearer(token.as_deref()));
        if response.success {
            self.untrack(kind, id);
        }
        response
    }

    // ===== Admins and sessions =====

    /// POST /admins as the super admin, tracking the account on success.
    pub fn create_admin(
        &mut self,
        username: &str,
        password: &str,
        permissions: Permissions,
    ) -> (ApiResponse, Option<ManagedAdmin>) {
        let token = self.super_token();
        let response = self.send(
            ApiRequest::post("/admins")
                .bearer(token.as_deref())
                .json(json!({
                    "username": username,
                    "password": password,
                    "role": "admin",
                    "permissions": permissions.to_json(),
                })),
        );

        let id = response
            .field("admin")
            .and_then(|a| a.get("id"))
            .and_then(|id| id.as_str())
            .filter(|id| !id.is_empty());

        let managed = match (response.success, id) {
            (true, Some(id)) => {
                let admin = ManagedAdmin {
                    id: id.to_string(),
                    username: username.to_string(),
                    password: password.to_string(),
                    permissions,
                };
                self.track(FixtureKind::Admin, id, username);
                Some(admin)
            }
            _ => None,
        };
        (response, managed)
    }

    /// PUT /admins/{id} with a new permission set, as the super admin.
    pub fn update_permissions(&self, admin_id: &str, permissions: Permissions) -> ApiResponse {
        let token = self.super_token();
        self.send(
            ApiRequest::put(format!("/admins/{}", admin_id))
                .bearer(token.as_deref())
                .json(json!({ "permissions": permissions.to_json() })),
        )
    }

    /// Log in and store the session under `name`, replacing any previous one.
    pub fn login_as(&mut self, name: &str, username: &str, password: &str) -> (ApiResponse, Option<Session>) {
        let response = session::login(&self.client, username, password);
        let session = Session::from_login(&response);
        if let Some(session) = &session {
            self.sessions.insert(name, session.clone());
        }
        (response, session)
    }

    /// Token of the shared low-privilege admin, creating and logging it in on
    /// first use. Records one result for each step it has to perform.
    pub fn restricted_token(&mut self) -> Option<String> {
        if let Some(token) = self.session_token(RESTRICTED_SESSION) {
            return Some(token);
        }

        let admin = match self.restricted.clone() {
            Some(admin) => admin,
            None => {
                let username = self.unique_name("restricted");
                let password = format!("pw-{}", Uuid::new_v4().simple());
                let (response, admin) =
                    self.create_admin(&username, &password, Permissions::storage_only());
                let created = self.reporter.record(
                    "Create restricted admin",
                    admin.is_some(),
                    match &admin {
                        Some(a) => format!("Created {}", a.username),
                        None => response.describe(),
                    },
                );
                if !created {
                    return None;
                }
                let admin = admin?;
                self.restricted = Some(admin.clone());
                admin
            }
        };

        let (response, session) = self.login_as(RESTRICTED_SESSION, &admin.username, &admin.password);
        self.reporter.record(
            "Restricted admin login",
            session.is_some(),
            if session.is_some() {
                format!("Logged in as {}", admin.username)
            } else {
                response.describe()
            },
        );
        session.map(|s| s.token)
    }
}
