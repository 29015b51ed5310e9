//! Admin management and permission enforcement.

use super::{find_by_id, id_of, str_of};
use crate::client::ApiRequest;
use crate::context::RunContext;
use crate::session::{Permissions, SUPER_ADMIN_ROLE};
use serde_json::Value;
use uuid::Uuid;

const MANAGED_SESSION: &str = "managed admin";

pub(super) fn run(ctx: &mut RunContext) {
    let token = ctx.super_token();

    let listing = ctx.send(ApiRequest::get("/admins").bearer(token.as_deref()));
    let admins = listing.list("admins");
    let all_carry_permissions = admins
        .iter()
        .all(|a| a.get("permissions").is_some_and(Value::is_object));
    ctx.reporter.record_with_payload(
        "List admins with permissions",
        listing.success && listing.has_list("admins") && all_carry_permissions,
        if listing.success {
            format!("Found {} admins", admins.len())
        } else {
            listing.describe()
        },
        &listing.body,
    );

    let super_id = admins
        .iter()
        .find(|a| str_of(a, "role") == Some(SUPER_ADMIN_ROLE))
        .and_then(id_of);
    ctx.reporter.record(
        "Super admin present in listing",
        super_id.is_some(),
        super_id.as_deref().unwrap_or("no admin with role super_admin"),
    );

    manage_permissions(ctx);

    match ctx.restricted_token() {
        Some(restricted) => {
            let denied = ctx.send(ApiRequest::get("/admins").bearer(Some(&restricted)));
            ctx.reporter.record(
                "Admin listing forbidden without canManageAdmins",
                denied.status == 403,
                format!("{}, expected 403", denied.describe()),
            );
        }
        None => ctx.reporter.skip(
            "Admin listing forbidden without canManageAdmins",
            "restricted admin unavailable",
        ),
    }

    // Last, so a panel that wrongly allows it breaks as little as possible.
    match super_id {
        Some(id) => protect_super_admin(ctx, &id),
        None => ctx.reporter.skip("Super admin cannot be deleted", "super admin id unknown"),
    }
}

/// Create an admin, change its permissions, and check both the stored record
/// and a fresh login reflect the change.
fn manage_permissions(ctx: &mut RunContext) {
    let username = ctx.unique_name("admin");
    let password = format!("pw-{}", Uuid::new_v4().simple());
    let initial = Permissions {
        can_manage_admins: false,
        can_view_private_projects: true,
        can_access_private_storage: true,
        can_access_chat: false,
    };

    let (created, admin) = ctx.create_admin(&username, &password, initial);
    let echoed = created
        .field("admin")
        .and_then(|a| a.get("permissions"))
        .and_then(Permissions::from_json);
    ctx.reporter.record_with_payload(
        "Create admin with permissions",
        admin.is_some() && echoed == Some(initial),
        match (&admin, echoed) {
            (Some(_), Some(p)) => format!("Created {} with {:?}", username, p),
            _ => created.describe(),
        },
        &created.body,
    );

    let Some(admin) = admin else {
        ctx.reporter.skip("Update admin permissions", "admin was not created");
        return;
    };

    let updated = initial.with_chat(true);
    let response = ctx.update_permissions(&admin.id, updated);
    ctx.reporter.record_with_payload(
        "Update admin permissions",
        response.success,
        response.describe(),
        &response.body,
    );

    let token = ctx.super_token();
    let listing = ctx.send(ApiRequest::get("/admins").bearer(token.as_deref()));
    let stored = find_by_id(listing.list("admins"), &admin.id)
        .and_then(|a| a.get("permissions"))
        .and_then(Permissions::from_json);
    ctx.reporter.record(
        "Permission update read back",
        stored == Some(updated),
        format!("stored {:?}, expected {:?}", stored, updated),
    );

    let (login, session) = ctx.login_as(MANAGED_SESSION, &admin.username, &admin.password);
    let embedded = session.as_ref().map(|s| s.admin.permissions);
    ctx.reporter.record_with_payload(
        "Re-login carries updated permissions",
        embedded == Some(updated),
        match embedded {
            Some(p) => format!("token permissions {:?}", p),
            None => login.describe(),
        },
        &login.body,
    );
}

fn protect_super_admin(ctx: &mut RunContext, super_id: &str) {
    let token = ctx.super_token();
    let response = ctx.send(
        ApiRequest::delete(format!("/admins/{}", super_id)).bearer(token.as_deref()),
    );
    ctx.reporter.record_with_payload(
        "Super admin cannot be deleted",
        response.status == 400,
        format!("{}, expected 400", response.describe()),
        &response.body,
    );

    let listing = ctx.send(ApiRequest::get("/admins").bearer(token.as_deref()));
    ctx.reporter.record(
        "Super admin still listed after delete attempt",
        find_by_id(listing.list("admins"), super_id).is_some(),
        listing.describe(),
    );
}
