//! Private storage: CRUD and who can see an item.

use super::{contains_id, find_by_id, id_of, str_of};
use crate::client::ApiRequest;
use crate::context::{FixtureKind, RunContext};
use serde_json::{json, Value};

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();
    let title = ctx.unique_name("note");

    let created = ctx.send(
        ApiRequest::post("/storage")
            .bearer(token.as_deref())
            .json(json!({
                "title": title,
                "content": "Conformance probe storage content",
                "type": "note",
                "tags": ["probe", "storage"],
                "visibleTo": [],
            })),
    );
    let item_id = created.field("item").and_then(id_of);
    ctx.reporter.record_with_payload(
        "Create storage item",
        created.success && item_id.is_some(),
        created.describe(),
        &created.body,
    );

    let Some(item_id) = item_id else {
        ctx.reporter.skip("Storage item lifecycle", "item was not created");
        return;
    };
    ctx.track(FixtureKind::StorageItem, &item_id, &title);

    let listing = ctx.send(ApiRequest::get("/storage").bearer(token.as_deref()));
    let creator_count = listing.list("items").len();
    ctx.reporter.record(
        "Storage item listed for its creator",
        listing.success && contains_id(listing.list("items"), &item_id),
        format!("{} items visible", creator_count),
    );

    let new_title = format!("{} (updated)", title);
    let updated = ctx.send(
        ApiRequest::put(format!("/storage/{}", item_id))
            .bearer(token.as_deref())
            .json(json!({
                "title": new_title,
                "content": "Updated probe content",
                "tags": ["probe", "updated"],
            })),
    );
    ctx.reporter.record_with_payload(
        "Update storage item",
        updated.success,
        updated.describe(),
        &updated.body,
    );

    let listing = ctx.send(ApiRequest::get("/storage").bearer(token.as_deref()));
    let stored = find_by_id(listing.list("items"), &item_id);
    let read_back = stored.is_some_and(|item| {
        str_of(item, "title") == Some(new_title.as_str()) && has_tag(item, "updated")
    });
    ctx.reporter.record(
        "Storage update read back",
        read_back,
        stored
            .and_then(|item| str_of(item, "title"))
            .unwrap_or("item missing from listing"),
    );

    check_visibility(ctx, &item_id, creator_count);

    let deleted = ctx.delete_fixture(FixtureKind::StorageItem, &item_id);
    ctx.reporter.record("Delete storage item", deleted.success, deleted.describe());

    let listing = ctx.send(ApiRequest::get("/storage").bearer(token.as_deref()));
    ctx.reporter.record(
        "Deleted storage item no longer listed",
        listing.success && !contains_id(listing.list("items"), &item_id),
        listing.describe(),
    );
}

/// A second admin must not see the private item, but must see one that names
/// them in its visibility list.
fn check_visibility(ctx: &mut RunContext, private_id: &str, creator_count: usize) {
    let Some(restricted) = ctx.restricted_token() else {
        ctx.reporter.skip(
            "Private storage item hidden from other admins",
            "restricted admin unavailable",
        );
        return;
    };

    let listing = ctx.send(ApiRequest::get("/storage").bearer(Some(&restricted)));
    let visible = listing.list("items");
    ctx.reporter.record(
        "Private storage item hidden from other admins",
        listing.success && !contains_id(visible, private_id) && visible.len() < creator_count,
        format!(
            "restricted admin sees {}, creator sees {}",
            visible.len(),
            creator_count
        ),
    );

    let Some(shared_with) = ctx.restricted.as_ref().map(|a| a.username.clone()) else {
        return;
    };
    let token = ctx.super_token();
    let title = ctx.unique_name("shared");
    let shared = ctx.send(
        ApiRequest::post("/storage")
            .bearer(token.as_deref())
            .json(json!({
                "title": title,
                "content": "Shared probe content",
                "type": "note",
                "tags": ["probe"],
                "visibleTo": [shared_with],
            })),
    );
    let Some(shared_id) = shared.field("item").and_then(id_of) else {
        ctx.reporter.record_with_payload(
            "Shared storage item visible to named admin",
            false,
            shared.describe(),
            &shared.body,
        );
        return;
    };
    ctx.track(FixtureKind::StorageItem, &shared_id, &title);

    let listing = ctx.send(ApiRequest::get("/storage").bearer(Some(&restricted)));
    ctx.reporter.record(
        "Shared storage item visible to named admin",
        contains_id(listing.list("items"), &shared_id),
        listing.describe(),
    );

    ctx.delete_fixture(FixtureKind::StorageItem, &shared_id);
}

fn has_tag(item: &Value, tag: &str) -> bool {
    item.get("tags")
        .and_then(Value::as_array)
        .is_some_and(|tags| tags.iter().any(|t| t.as_str() == Some(tag)))
}
