//! File upload over multipart, with and without a session.

use crate::client::{ApiRequest, FilePayload};
use crate::context::RunContext;

/// Stored files are served from this path prefix.
const UPLOADS_PREFIX: &str = "/uploads/";

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();
    let file_name = format!("{}.txt", ctx.unique_name("upload"));
    let file = FilePayload::text(&file_name, "conformance probe upload\n");

    let uploaded = ctx.send(
        ApiRequest::post("/upload")
            .bearer(token.as_deref())
            .file(file.clone()),
    );
    let url = uploaded.str_field("url").unwrap_or_default();
    ctx.reporter.record_with_payload(
        "Upload file",
        uploaded.success && url.starts_with(UPLOADS_PREFIX),
        if uploaded.success {
            format!("URL: {}", url)
        } else {
            uploaded.describe()
        },
        &uploaded.body,
    );

    let anonymous = ctx.send(ApiRequest::post("/upload").file(file));
    ctx.reporter.record(
        "Upload requires authentication",
        anonymous.status == 401,
        format!("{}, expected 401", anonymous.describe()),
    );
}
