//! Project visibility under the private flag.

use super::{contains_id, flag, id_of, str_of};
use crate::client::{ApiRequest, ApiResponse};
use crate::context::{FixtureKind, RunContext};
use crate::session::Permissions;
use serde_json::json;
use uuid::Uuid;

const VIEWER_SESSION: &str = "private project viewer";

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();
    let (created, project_id) = create_project(ctx, token.as_deref(), "private", true);
    let project = created.field("project");
    ctx.reporter.record_with_payload(
        "Create private project",
        created.success
            && project_id.is_some()
            && project.is_some_and(|p| flag(p, "isPrivate") && str_of(p, "createdBy").is_some()),
        created.describe(),
        &created.body,
    );

    let Some(project_id) = project_id else {
        ctx.reporter.skip("Project visibility", "project was not created");
        return;
    };

    let own = list(ctx, token.as_deref());
    ctx.reporter.record(
        "Private project visible to its creator",
        contains_id(own.list("projects"), &project_id),
        own.describe(),
    );

    let public = list(ctx, None);
    let leaked = public
        .list("projects")
        .iter()
        .filter(|p| flag(p, "isPrivate"))
        .count();
    ctx.reporter.record_with_payload(
        "Public listing hides private projects",
        public.success && leaked == 0 && !contains_id(public.list("projects"), &project_id),
        format!("{} private projects in public listing", leaked),
        &public.body,
    );

    check_permission_holder(ctx, &project_id);

    // A public project by someone else, which a restricted admin must not list either.
    let (created, public_id) = create_project(ctx, token.as_deref(), "public", false);
    ctx.reporter.record_with_payload(
        "Create public project",
        created.success && public_id.is_some(),
        created.describe(),
        &created.body,
    );

    check_restricted_admin(ctx, &project_id, public_id.as_deref());
    toggle_privacy(ctx, &project_id);
}

fn create_project(
    ctx: &mut RunContext,
    token: Option<&str>,
    label: &str,
    private: bool,
) -> (ApiResponse, Option<String>) {
    let title = ctx.unique_name(label);
    let response = ctx.send(ApiRequest::post("/projects").bearer(token).json(json!({
        "title": title,
        "description": "Conformance probe project",
        "technologies": ["Rust"],
        "isPrivate": private,
        "order": 999,
    })));
    let id = response.field("project").and_then(id_of);
    if let Some(id) = &id {
        ctx.track(FixtureKind::Project, id, &title);
    }
    (response, id)
}

fn list(ctx: &RunContext, token: Option<&str>) -> ApiResponse {
    ctx.send(ApiRequest::get("/projects").bearer(token))
}

/// An admin holding canViewPrivateProjects sees other admins' private projects.
fn check_permission_holder(ctx: &mut RunContext, project_id: &str) {
    let username = ctx.unique_name("viewer");
    let password = format!("pw-{}", Uuid::new_v4().simple());
    let permissions = Permissions {
        can_view_private_projects: true,
        ..Permissions::default()
    };
    let (created, admin) = ctx.create_admin(&username, &password, permissions);
    let Some(admin) = admin else {
        ctx.reporter.record_with_payload(
            "Private project visible with canViewPrivateProjects",
            false,
            format!("viewer admin not created: {}", created.describe()),
            &created.body,
        );
        return;
    };

    let (login, session) = ctx.login_as(VIEWER_SESSION, &admin.username, &admin.password);
    let Some(session) = session else {
        ctx.reporter.record(
            "Private project visible with canViewPrivateProjects",
            false,
            format!("viewer login failed: {}", login.describe()),
        );
        return;
    };

    let listing = list(ctx, Some(&session.token));
    ctx.reporter.record(
        "Private project visible with canViewPrivateProjects",
        contains_id(listing.list("projects"), project_id),
        listing.describe(),
    );
}

/// A restricted admin sees only projects it created, public or private.
fn check_restricted_admin(ctx: &mut RunContext, foreign_id: &str, foreign_public_id: Option<&str>) {
    let Some(restricted) = ctx.restricted_token() else {
        ctx.reporter.skip(
            "Private project hidden from other admins",
            "restricted admin unavailable",
        );
        return;
    };
    let owner = ctx
        .restricted
        .as_ref()
        .map(|a| a.username.clone())
        .unwrap_or_default();

    let (created, own_id) = create_project(ctx, Some(&restricted), "restricted", true);
    ctx.reporter.record_with_payload(
        "Restricted admin creates own project",
        created.success && own_id.is_some(),
        created.describe(),
        &created.body,
    );

    let listing = list(ctx, Some(&restricted));
    let projects = listing.list("projects");
    let foreign = projects
        .iter()
        .filter(|p| str_of(p, "createdBy") != Some(owner.as_str()))
        .count();
    let sees_foreign_public = foreign_public_id.is_some_and(|id| contains_id(projects, id));
    ctx.reporter.record_with_payload(
        "Private project hidden from other admins",
        listing.success && !contains_id(projects, foreign_id) && !sees_foreign_public && foreign == 0,
        format!("{} projects by other admins visible", foreign),
        &listing.body,
    );

    if let Some(own_id) = own_id {
        ctx.reporter.record(
            "Own private project visible to restricted admin",
            contains_id(projects, &own_id),
            format!("{} projects visible", projects.len()),
        );
    }
}

fn toggle_privacy(ctx: &mut RunContext, project_id: &str) {
    let token = ctx.super_token();
    let set_private = |ctx: &RunContext, private: bool| {
        ctx.send(
            ApiRequest::put(format!("/projects/{}", project_id))
                .bearer(token.as_deref())
                .json(json!({ "isPrivate": private })),
        )
    };

    let opened = set_private(ctx, false);
    ctx.reporter.record_with_payload(
        "Make project public",
        opened.success,
        opened.describe(),
        &opened.body,
    );
    let public = list(ctx, None);
    ctx.reporter.record(
        "Public project appears in public listing",
        contains_id(public.list("projects"), project_id),
        public.describe(),
    );

    let closed = set_private(ctx, true);
    let public = list(ctx, None);
    ctx.reporter.record(
        "Re-private project hidden again",
        closed.success && !contains_id(public.list("projects"), project_id),
        closed.describe(),
    );
}
