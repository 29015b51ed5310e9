//! Authentication: login, token verification, bad credentials.

use crate::client::ApiRequest;
use crate::context::RunContext;
use crate::session::{self, Permissions, SUPER_SESSION};
use uuid::Uuid;

pub(super) fn run(ctx: &mut RunContext) {
    let username = ctx.config.credentials.username.clone();
    let password = ctx.config.credentials.password.clone();

    let (response, session) = ctx.login_as(SUPER_SESSION, &username, &password);
    match &session {
        Some(session) if response.status == 200 => {
            ctx.reporter.record(
                "Super admin login",
                true,
                format!("Token received, role: {}", session.admin.role),
            );
            let admin = &session.admin;
            ctx.reporter.record(
                "Super admin holds every permission",
                admin.is_super_admin() && admin.permissions == Permissions::all(),
                format!("role {}, permissions {:?}", admin.role, admin.permissions),
            );
        }
        _ => {
            ctx.sessions.remove(SUPER_SESSION);
            ctx.reporter.record_with_payload(
                "Super admin login",
                false,
                format!("{}, expected 200 with token and admin role", response.describe()),
                &response.body,
            );
        }
    }

    match ctx.super_token() {
        Some(token) => {
            let verify = ctx.send(ApiRequest::get("/auth/verify").bearer(Some(&token)));
            let user = verify.field("user");
            let verified_name = user
                .and_then(|u| u.get("username"))
                .and_then(|n| n.as_str())
                .unwrap_or_default();
            let has_role = user.and_then(|u| u.get("role")).is_some_and(|r| r.is_string());
            ctx.reporter.record_with_payload(
                "Token verification",
                verify.status == 200 && verified_name == username && has_role,
                if verify.success {
                    format!("User: {}", verified_name)
                } else {
                    verify.describe()
                },
                &verify.body,
            );
        }
        None => ctx.reporter.skip("Token verification", "no token from login"),
    }

    let bogus_user = format!("{}_nobody_{}", ctx.config.run.fixture_prefix, ctx.run_tag());
    let bogus_password = Uuid::new_v4().to_string();
    let rejected = session::login(&ctx.client, &bogus_user, &bogus_password);
    let leaked_token = rejected.str_field("token").is_some_and(|t| !t.is_empty());
    ctx.reporter.record_with_payload(
        "Invalid credentials rejected with 401",
        rejected.status == 401 && !leaked_token,
        format!("{}{}", rejected.describe(), if leaked_token { ", token returned" } else { "" }),
        &rejected.body,
    );
}
