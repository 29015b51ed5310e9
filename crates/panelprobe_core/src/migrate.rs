//! Skills migration: strip retired proficiency fields from stored skills.
//!
//! Skills used to carry a numeric `level` (or `percentage`). The migration
//! finds skills that still have one and rewrites them over HTTP, either by an
//! update that resends only name, icon and order, or by recreating the skill
//! and deleting the old record. A panel that merges updates into the stored
//! document keeps the old field, which [`SkillMigrator::verify`] reports.

use crate::client::{ApiClient, ApiRequest};
use crate::error::{ProbeError, Result};
use serde::Serialize;
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

/// Fields a skill must no longer carry.
pub const LEGACY_SKILL_FIELDS: [&str; 2] = ["level", "percentage"];

/// Order assigned to skills that have none.
pub const DEFAULT_SKILL_ORDER: i64 = 999;

/// Legacy fields present on a skill record.
pub fn legacy_fields(skill: &Value) -> Vec<&'static str> {
    LEGACY_SKILL_FIELDS
        .iter()
        .copied()
        .filter(|field| skill.get(*field).is_some())
        .collect()
}

/// Number of skills in a listing that still carry a legacy field.
pub fn legacy_skill_count(skills: &[Value]) -> usize {
    skills.iter().filter(|s| !legacy_fields(s).is_empty()).count()
}

/// How legacy skills are rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStrategy {
    /// PUT name, icon and order onto the existing id.
    #[default]
    Update,
    /// POST a clean copy, then DELETE the original.
    Recreate,
}

impl fmt::Display for MigrationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Update => f.write_str("update"),
            Self::Recreate => f.write_str("recreate"),
        }
    }
}

impl FromStr for MigrationStrategy {
    type Err = ProbeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "update" => Ok(Self::Update),
            "recreate" => Ok(Self::Recreate),
            other => Err(ProbeError::Migration(format!(
                "unknown strategy '{}', expected update or recreate",
                other
            ))),
        }
    }
}

/// A stored skill that still carries a legacy field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegacySkill {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub order: i64,
    pub fields: Vec<&'static str>,
}

impl LegacySkill {
    fn from_value(skill: &Value) -> Option<Self> {
        let fields = legacy_fields(skill);
        if fields.is_empty() {
            return None;
        }
        Some(Self {
            id: skill.get("id")?.as_str()?.to_string(),
            name: skill
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            icon: skill
                .get("icon")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            order: skill
                .get("order")
                .and_then(Value::as_i64)
                .unwrap_or(DEFAULT_SKILL_ORDER),
            fields,
        })
    }

    /// Body written back to the panel: everything but the legacy fields.
    fn clean_body(&self) -> Value {
        json!({
            "name": self.name,
            "icon": self.icon,
            "order": self.order,
        })
    }
}

/// What happened to one legacy skill.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SkillOutcome {
    Rewritten,
    Recreated { new_id: String },
    Failed { reason: String },
}

/// Result of one migration pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub strategy: MigrationStrategy,
    pub dry_run: bool,
    pub total_skills: usize,
    pub outcomes: Vec<(LegacySkill, SkillOutcome)>,
    /// Skills still carrying a legacy field after the pass.
    pub remaining: Vec<LegacySkill>,
}

impl MigrationReport {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, SkillOutcome::Failed { .. }))
            .count()
    }

    /// Every skill is clean and no write failed.
    pub fn is_clean(&self) -> bool {
        self.remaining.is_empty() && self.failed() == 0
    }
}

/// Migrates skills with an authenticated super-admin token.
pub struct SkillMigrator<'a> {
    client: &'a ApiClient,
    token: &'a str,
}

impl<'a> SkillMigrator<'a> {
    pub fn new(client: &'a ApiClient, token: &'a str) -> Self {
        Self { client, token }
    }

    /// All skills plus those still carrying legacy fields.
    pub fn scan(&self) -> Result<(usize, Vec<LegacySkill>)> {
        let response = self.client.send(ApiRequest::get("/skills"));
        if !response.success || !response.has_list("skills") {
            return Err(ProbeError::Migration(format!(
                "could not list skills: {}",
                response.describe()
            )));
        }
        let skills = response.list("skills");
        let legacy = skills.iter().filter_map(LegacySkill::from_value).collect();
        Ok((skills.len(), legacy))
    }

    /// Rewrite every legacy skill, then rescan. With `dry_run`, only scans.
    pub fn run(&self, strategy: MigrationStrategy, dry_run: bool) -> Result<MigrationReport> {
        let (total_skills, legacy) = self.scan()?;
        info!(total_skills, legacy = legacy.len(), %strategy, dry_run, "scanned skills");

        let mut report = MigrationReport {
            strategy,
            dry_run,
            total_skills,
            ..MigrationReport::default()
        };
        if dry_run {
            report.remaining = legacy;
            return Ok(report);
        }

        for skill in legacy {
            let outcome = match strategy {
                MigrationStrategy::Update => self.rewrite(&skill),
                MigrationStrategy::Recreate => self.recreate(&skill),
            };
            if let SkillOutcome::Failed { reason } = &outcome {
                warn!(skill = %skill.name, id = %skill.id, %reason, "skill migration failed");
            }
            report.outcomes.push((skill, outcome));
        }

        report.remaining = self.verify()?;
        Ok(report)
    }

    /// Skills that still carry legacy fields.
    pub fn verify(&self) -> Result<Vec<LegacySkill>> {
        self.scan().map(|(_, legacy)| legacy)
    }

    fn rewrite(&self, skill: &LegacySkill) -> SkillOutcome {
        let response = self.client.send(
            ApiRequest::put(format!("/skills/{}", skill.id))
                .bearer(Some(self.token))
                .json(skill.clean_body()),
        );
        if response.success {
            SkillOutcome::Rewritten
        } else {
            SkillOutcome::Failed {
                reason: response.describe(),
            }
        }
    }

    fn recreate(&self, skill: &LegacySkill) -> SkillOutcome {
        let created = self.client.send(
            ApiRequest::post("/skills")
                .bearer(Some(self.token))
                .json(skill.clean_body()),
        );
        let new_id = created
            .field("skill")
            .and_then(|s| s.get("id"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let Some(new_id) = new_id.filter(|_| created.success) else {
            return SkillOutcome::Failed {
                reason: format!("create failed: {}", created.describe()),
            };
        };

        let deleted = self.client.send(
            ApiRequest::delete(format!("/skills/{}", skill.id)).bearer(Some(self.token)),
        );
        if deleted.success {
            SkillOutcome::Recreated { new_id }
        } else {
            SkillOutcome::Failed {
                reason: format!(
                    "created {} but old record kept: {}",
                    new_id,
                    deleted.describe()
                ),
            }
        }
    }
}
