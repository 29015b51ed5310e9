//! Site content: public read and authenticated write of the hero section.

use crate::client::ApiRequest;
use crate::context::RunContext;
use serde_json::{json, Value};

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();

    let response = ctx.send(ApiRequest::get("/content"));
    let content = response.field("content");
    let hero = content.and_then(|c| c.get("hero")).filter(|h| h.is_object()).cloned();
    let has_about = content
        .and_then(|c| c.get("about"))
        .is_some_and(Value::is_object);
    ctx.reporter.record_with_payload(
        "Get site content",
        response.success && hero.is_some() && has_about,
        response.describe(),
        &response.body,
    );

    let anonymous = ctx.send(ApiRequest::put("/content").json(json!({ "hero": {} })));
    ctx.reporter.record(
        "Content update requires authentication",
        anonymous.status == 401,
        format!("{}, expected 401", anonymous.describe()),
    );

    // Write the hero section back unchanged so the site is left as found.
    let Some(hero) = hero else {
        ctx.reporter.skip("Update site content", "no hero section to write back");
        return;
    };
    let updated = ctx.send(
        ApiRequest::put("/content")
            .bearer(token.as_deref())
            .json(json!({ "hero": hero })),
    );
    ctx.reporter.record_with_payload(
        "Update site content",
        updated.success,
        updated.describe(),
        &updated.body,
    );
}
