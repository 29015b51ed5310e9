//! Feature test sequences.
//!
//! Each sequence is an ordered list of dependent calls against one feature
//! area. Sequences read and write shared state only through [`RunContext`].

use crate::context::RunContext;
use crate::error::ProbeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

mod admins;
mod auth;
mod chat;
mod contact;
mod content;
mod projects;
mod services;
mod skills;
mod storage;
mod upload;

/// A feature area of the panel API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceKind {
    Auth,
    Admins,
    Storage,
    Projects,
    Skills,
    Services,
    Contact,
    Content,
    Upload,
    Chat,
}

impl SequenceKind {
    /// Every sequence, in execution order.
    pub const ALL: [SequenceKind; 10] = [
        Self::Auth,
        Self::Admins,
        Self::Storage,
        Self::Projects,
        Self::Skills,
        Self::Services,
        Self::Contact,
        Self::Content,
        Self::Upload,
        Self::Chat,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Admins => "admins",
            Self::Storage => "storage",
            Self::Projects => "projects",
            Self::Skills => "skills",
            Self::Services => "services",
            Self::Contact => "contact",
            Self::Content => "content",
            Self::Upload => "upload",
            Self::Chat => "chat",
        }
    }

    /// Heading shown when the sequence starts.
    pub fn title(self) -> &'static str {
        match self {
            Self::Auth => "Authentication",
            Self::Admins => "Admin management",
            Self::Storage => "Private storage",
            Self::Projects => "Project visibility",
            Self::Skills => "Skills",
            Self::Services => "Services",
            Self::Contact => "Contact",
            Self::Content => "Site content",
            Self::Upload => "File upload",
            Self::Chat => "Chat",
        }
    }

    /// One-line description for `panelprobe sequences`.
    pub fn description(self) -> &'static str {
        match self {
            Self::Auth => "login, token verification, 401 on bad credentials",
            Self::Admins => "admin listing, permission create/update, 403 and super-admin protection",
            Self::Storage => "private item CRUD and visibility lists",
            Self::Projects => "private flag visibility for public, creator and restricted sessions",
            Self::Skills => "skill CRUD without level or percentage fields",
            Self::Services => "service CRUD",
            Self::Contact => "contact info read/update and expected send failure",
            Self::Content => "site content read/update",
            Self::Upload => "multipart upload returning an /uploads/ URL",
            Self::Chat => "customer conversations, admin replies and chat permission",
        }
    }

    /// Whether the sequence needs the super-admin session from authentication.
    pub fn requires_session(self) -> bool {
        !matches!(self, Self::Auth)
    }

    fn run(self, ctx: &mut RunContext) {
        match self {
            Self::Auth => auth::run(ctx),
            Self::Admins => admins::run(ctx),
            Self::Storage => storage::run(ctx),
            Self::Projects => projects::run(ctx),
            Self::Skills => skills::run(ctx),
            Self::Services => services::run(ctx),
            Self::Contact => contact::run(ctx),
            Self::Content => content::run(ctx),
            Self::Upload => upload::run(ctx),
            Self::Chat => chat::run(ctx),
        }
    }
}

impl fmt::Display for SequenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SequenceKind {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| ProbeError::InvalidSequence(s.to_string()))
    }
}

/// Run every selected sequence in order.
///
/// A sequence that needs the super-admin session is skipped, with a visible
/// failed result, when authentication did not produce one.
pub fn run_sequences(ctx: &mut RunContext) {
    for kind in ctx.config.selected_sequences() {
        ctx.reporter.begin_sequence(kind.title());

        if kind.requires_session() && ctx.super_token().is_none() {
            warn!(sequence = %kind, "skipping sequence without an authenticated session");
            ctx.reporter.skip(
                &format!("{}: skipped", kind.title()),
                "no authenticated super-admin session (login failed)",
            );
            continue;
        }

        kind.run(ctx);
    }
}

// ===== Helpers shared by the sequences =====

/// The `id` string of an entity.
pub(crate) fn id_of(entity: &Value) -> Option<String> {
    entity
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

/// Find an entity by id in a listing.
pub(crate) fn find_by_id<'a>(items: &'a [Value], id: &str) -> Option<&'a Value> {
    items
        .iter()
        .find(|item| item.get("id").and_then(Value::as_str) == Some(id))
}

pub(crate) fn contains_id(items: &[Value], id: &str) -> bool {
    find_by_id(items, id).is_some()
}

/// Boolean field of an entity, false when missing.
pub(crate) fn flag(entity: &Value, key: &str) -> bool {
    entity.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub(crate) fn str_of<'a>(entity: &'a Value, key: &str) -> Option<&'a str> {
    entity.get(key).and_then(Value::as_str)
}
