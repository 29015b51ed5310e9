//! Services: CRUD with read-back after update.

use super::{contains_id, find_by_id, id_of, str_of};
use crate::client::ApiRequest;
use crate::context::{FixtureKind, RunContext};
use serde_json::json;

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();

    let listing = ctx.send(ApiRequest::get("/services"));
    ctx.reporter.record_with_payload(
        "List services",
        listing.success && listing.has_list("services"),
        format!("Found {} services", listing.list("services").len()),
        &listing.body,
    );

    let title = ctx.unique_name("service");
    let created = ctx.send(
        ApiRequest::post("/services")
            .bearer(token.as_deref())
            .json(json!({
                "title": title,
                "description": "Conformance probe service",
                "icon": "🛠",
                "order": 999,
            })),
    );
    let service_id = created.field("service").and_then(id_of);
    ctx.reporter.record_with_payload(
        "Create service",
        created.success && service_id.is_some(),
        created.describe(),
        &created.body,
    );

    let Some(service_id) = service_id else {
        ctx.reporter.skip("Service lifecycle", "service was not created");
        return;
    };
    ctx.track(FixtureKind::Service, &service_id, &title);

    let description = format!("Updated by run {}", ctx.run_tag());
    let updated = ctx.send(
        ApiRequest::put(format!("/services/{}", service_id))
            .bearer(token.as_deref())
            .json(json!({ "title": title, "description": description })),
    );
    ctx.reporter.record_with_payload(
        "Update service",
        updated.success,
        updated.describe(),
        &updated.body,
    );

    let listing = ctx.send(ApiRequest::get("/services"));
    let stored = find_by_id(listing.list("services"), &service_id);
    ctx.reporter.record(
        "Service update read back",
        stored.is_some_and(|s| str_of(s, "description") == Some(description.as_str())),
        stored
            .and_then(|s| str_of(s, "description"))
            .unwrap_or("service missing from listing"),
    );

    let deleted = ctx.delete_fixture(FixtureKind::Service, &service_id);
    ctx.reporter.record("Delete service", deleted.success, deleted.describe());

    let listing = ctx.send(ApiRequest::get("/services"));
    ctx.reporter.record(
        "Deleted service no longer listed",
        listing.success && !contains_id(listing.list("services"), &service_id),
        listing.describe(),
    );
}
