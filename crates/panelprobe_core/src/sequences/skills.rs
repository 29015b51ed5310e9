//! Skills: CRUD, and no skill ever carries a proficiency level.

use super::{contains_id, find_by_id, id_of, str_of};
use crate::client::ApiRequest;
use crate::context::{FixtureKind, RunContext};
use crate::migrate::{legacy_fields, DEFAULT_SKILL_ORDER};
use serde_json::json;

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();

    let listing = ctx.send(ApiRequest::get("/skills"));
    let skills = listing.list("skills");
    ctx.reporter.record_with_payload(
        "List skills",
        listing.success && listing.has_list("skills"),
        format!("Found {} skills", skills.len()),
        &listing.body,
    );

    let legacy: Vec<&str> = skills
        .iter()
        .filter(|s| !legacy_fields(s).is_empty())
        .map(|s| str_of(s, "name").unwrap_or("<unnamed>"))
        .collect();
    ctx.reporter.record(
        "No stored skill has level or percentage",
        legacy.is_empty(),
        if legacy.is_empty() {
            "all skills clean".to_string()
        } else {
            format!("legacy fields on: {}", legacy.join(", "))
        },
    );

    let name = ctx.unique_name("skill");
    let created = ctx.send(
        ApiRequest::post("/skills")
            .bearer(token.as_deref())
            .json(json!({ "name": name, "icon": "⚡", "order": DEFAULT_SKILL_ORDER })),
    );
    let skill = created.field("skill");
    let skill_id = skill.and_then(id_of);
    let legacy = skill.map(legacy_fields).unwrap_or_default();
    ctx.reporter.record_with_payload(
        "Create skill without level",
        created.success
            && skill_id.is_some()
            && legacy.is_empty()
            && skill.is_some_and(|s| str_of(s, "name") == Some(name.as_str())),
        if legacy.is_empty() {
            created.describe()
        } else {
            format!("Stored with legacy fields: {}", legacy.join(", "))
        },
        &created.body,
    );

    let Some(skill_id) = skill_id else {
        ctx.reporter.skip("Skill lifecycle", "skill was not created");
        return;
    };
    ctx.track(FixtureKind::Skill, &skill_id, &name);

    let new_name = format!("{} updated", name);
    let updated = ctx.send(
        ApiRequest::put(format!("/skills/{}", skill_id))
            .bearer(token.as_deref())
            .json(json!({ "name": new_name, "icon": "🔧", "order": DEFAULT_SKILL_ORDER })),
    );
    ctx.reporter.record_with_payload(
        "Update skill",
        updated.success,
        updated.describe(),
        &updated.body,
    );

    let listing = ctx.send(ApiRequest::get("/skills"));
    let stored = find_by_id(listing.list("skills"), &skill_id);
    ctx.reporter.record_with_payload(
        "Skill update read back without level",
        stored.is_some_and(|s| {
            str_of(s, "name") == Some(new_name.as_str()) && legacy_fields(s).is_empty()
        }),
        match stored {
            Some(s) => format!("stored fields: {:?}", legacy_fields(s)),
            None => "skill missing from listing".to_string(),
        },
        stored.unwrap_or(&listing.body),
    );

    let deleted = ctx.delete_fixture(FixtureKind::Skill, &skill_id);
    ctx.reporter.record("Delete skill", deleted.success, deleted.describe());

    let listing = ctx.send(ApiRequest::get("/skills"));
    ctx.reporter.record(
        "Deleted skill no longer listed",
        listing.success && !contains_id(listing.list("skills"), &skill_id),
        listing.describe(),
    );
}
