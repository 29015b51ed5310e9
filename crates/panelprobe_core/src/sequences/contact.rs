//! Contact info and the contact form.
//!
//! The form has no mail credential configured in test environments, so the
//! expected send status is configurable rather than assumed to be success.

use super::str_of;
use crate::client::ApiRequest;
use crate::context::RunContext;
use serde_json::{json, Value};
use tracing::warn;

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();

    let info = ctx.send(ApiRequest::get("/contact/info"));
    let original = info.field("contact").cloned();
    let has_fields = original
        .as_ref()
        .is_some_and(|c| str_of(c, "email").is_some() && str_of(c, "phone").is_some());
    ctx.reporter.record_with_payload(
        "Get contact info",
        info.success && has_fields,
        info.describe(),
        &info.body,
    );

    let probe_email = format!("{}-{}@example.com", ctx.config.run.fixture_prefix, ctx.run_tag());
    let change = json!({ "email": probe_email, "phone": "+1 555 0100" });

    let anonymous = ctx.send(ApiRequest::put("/contact/info").json(change.clone()));
    ctx.reporter.record(
        "Contact update requires authentication",
        anonymous.status == 401,
        format!("{}, expected 401", anonymous.describe()),
    );

    let updated = ctx.send(
        ApiRequest::put("/contact/info")
            .bearer(token.as_deref())
            .json(change),
    );
    let applied = ctx.reporter.record_with_payload(
        "Update contact info",
        updated.success,
        updated.describe(),
        &updated.body,
    );

    if applied {
        let info = ctx.send(ApiRequest::get("/contact/info"));
        let email = info.field("contact").and_then(|c| str_of(c, "email"));
        ctx.reporter.record(
            "Contact update read back",
            email == Some(probe_email.as_str()),
            email.unwrap_or("no email in contact info"),
        );

        if let Some(original) = original {
            restore(ctx, token.as_deref(), original);
        }
    }

    let expected = ctx.config.run.contact_send_expected_status;
    let sent = ctx.send(ApiRequest::post("/contact/send").json(json!({
        "name": "Probe Visitor",
        "email": probe_email,
        "message": "Conformance probe message",
    })));
    ctx.reporter.record_with_payload(
        "Contact form send status",
        sent.status == expected,
        format!("expected {}, got {}", expected, sent.describe()),
        &sent.body,
    );
}

/// Put the contact info back the way the run found it.
fn restore(ctx: &mut RunContext, token: Option<&str>, mut original: Value) {
    if let Some(fields) = original.as_object_mut() {
        fields.remove("id");
        fields.remove("_id");
    }
    let response = ctx.send(ApiRequest::put("/contact/info").bearer(token).json(original));
    if !response.success {
        warn!(status = response.status, "could not restore contact info");
    }
    ctx.reporter.record(
        "Restore original contact info",
        response.success,
        response.describe(),
    );
}
