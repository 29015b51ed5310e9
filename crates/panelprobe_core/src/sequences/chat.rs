//! Customer chat: conversations, replies, read state and chat permission.

use super::{contains_id, id_of, str_of};
use crate::client::{ApiRequest, ApiResponse};
use crate::context::RunContext;
use crate::session::Permissions;
use serde_json::{json, Value};
use uuid::Uuid;

const CHAT_ADMIN_SESSION: &str = "chat admin";

/// Customer identity used for every send in one run.
struct Customer {
    name: String,
    email: String,
    phone: String,
}

pub(super) fn run(ctx: &mut RunContext) {
    let tag = ctx.run_tag().to_string();
    let customer = Customer {
        name: format!("Probe Customer {}", tag),
        email: format!("{}-chat-{}@example.com", ctx.config.run.fixture_prefix, tag),
        phone: format!("+1-555-{}", tag),
    };

    let first = send_message(ctx, &customer, "Hello, I have a question");
    let chat_id = first.str_field("chatId").map(str::to_string);
    let first_count = message_count(first.field("conversation"));
    ctx.reporter.record_with_payload(
        "Customer sends chat message",
        first.success && chat_id.is_some(),
        first.describe(),
        &first.body,
    );
    let has_unread = first
        .field("conversation")
        .and_then(|c| c.get("unreadCount"))
        .is_some_and(Value::is_number);
    ctx.reporter.record(
        "Conversation carries messages and unread counter",
        first_count > 0 && has_unread,
        format!("{} messages, unreadCount present: {}", first_count, has_unread),
    );

    let Some(chat_id) = chat_id else {
        ctx.reporter.skip("Chat conversation lifecycle", "no chatId returned");
        return;
    };
    ctx.chat_id = Some(chat_id.clone());

    let second = send_message(ctx, &customer, "Following up on my question");
    let second_count = message_count(second.field("conversation"));
    ctx.reporter.record(
        "Repeat message reuses conversation",
        second.str_field("chatId") == Some(chat_id.as_str()) && second_count > first_count,
        format!("{} -> {} messages", first_count, second_count),
    );

    for (label, key, value) in [
        ("History lookup by email", "email", customer.email.as_str()),
        ("History lookup by phone", "phone", customer.phone.as_str()),
    ] {
        let history = ctx.send(ApiRequest::get("/chat/history").query(key, value));
        let found = history.field("conversation").and_then(id_of);
        ctx.reporter.record(
            label,
            found.as_deref() == Some(chat_id.as_str()),
            found.unwrap_or_else(|| history.describe()),
        );
    }

    list_and_reply(ctx, &chat_id, second_count);
    mark_read(ctx, &chat_id, &customer.email);
    check_chat_permission(ctx, &chat_id);
}

fn send_message(ctx: &RunContext, customer: &Customer, message: &str) -> ApiResponse {
    ctx.send(ApiRequest::post("/chat/send").json(json!({
        "customerName": customer.name,
        "customerEmail": customer.email,
        "customerPhone": customer.phone,
        "message": message,
    })))
}

fn message_count(conversation: Option<&Value>) -> usize {
    conversation
        .and_then(|c| c.get("messages"))
        .and_then(Value::as_array)
        .map_or(0, Vec::len)
}

fn list_and_reply(ctx: &mut RunContext, chat_id: &str, count_before: usize) {
    let token = ctx.super_token();

    let listing = ctx.send(ApiRequest::get("/chat/conversations").bearer(token.as_deref()));
    let conversations = listing.list("conversations");
    let well_formed = conversations
        .iter()
        .all(|c| id_of(c).is_some() && c.get("unreadCount").is_some_and(Value::is_number));
    let has_total = listing.field("totalUnread").is_some_and(Value::is_number);
    ctx.reporter.record_with_payload(
        "List conversations",
        listing.success && well_formed && has_total && contains_id(conversations, chat_id),
        format!(
            "{} conversations, totalUnread present: {}",
            conversations.len(),
            has_total
        ),
        &listing.body,
    );

    let reply = ctx.send(
        ApiRequest::post(format!("/chat/{}/reply", chat_id))
            .bearer(token.as_deref())
            .json(json!({ "message": "Thanks for reaching out" })),
    );
    let conversation = reply.field("conversation");
    let last_sender = conversation
        .and_then(|c| c.get("messages"))
        .and_then(Value::as_array)
        .and_then(|m| m.last())
        .and_then(|m| str_of(m, "sender"));
    ctx.reporter.record_with_payload(
        "Admin reply appended",
        reply.success && last_sender == Some("admin") && message_count(conversation) > count_before,
        format!("last sender: {}", last_sender.unwrap_or("none")),
        &reply.body,
    );
}

fn mark_read(ctx: &mut RunContext, chat_id: &str, email: &str) {
    let token = ctx.super_token();
    let marked = ctx.send(
        ApiRequest::put(format!("/chat/{}/read", chat_id)).bearer(token.as_deref()),
    );
    ctx.reporter.record(
        "Mark conversation read",
        marked.success,
        marked.describe(),
    );

    let history = ctx.send(ApiRequest::get("/chat/history").query("email", email));
    let unread = history
        .field("conversation")
        .and_then(|c| c.get("unreadCount"))
        .and_then(Value::as_u64);
    ctx.reporter.record(
        "Unread counter cleared",
        unread == Some(0),
        format!("unreadCount: {:?}", unread),
    );
}

/// A fresh admin without canAccessChat is refused until granted the flag and
/// logged in again.
fn check_chat_permission(ctx: &mut RunContext, chat_id: &str) {
    let username = ctx.unique_name("chatless");
    let password = format!("pw-{}", Uuid::new_v4().simple());
    let (created, admin) =
        ctx.create_admin(&username, &password, Permissions::storage_only().with_chat(false));
    ctx.reporter.record_with_payload(
        "Create admin without chat access",
        admin.is_some(),
        created.describe(),
        &created.body,
    );
    let Some(admin) = admin else {
        return;
    };

    let (login, session) = ctx.login_as(CHAT_ADMIN_SESSION, &admin.username, &admin.password);
    let Some(session) = session else {
        ctx.reporter.record(
            "Conversation listing forbidden without canAccessChat",
            false,
            format!("login failed: {}", login.describe()),
        );
        return;
    };

    let listing = ctx.send(ApiRequest::get("/chat/conversations").bearer(Some(&session.token)));
    ctx.reporter.record(
        "Conversation listing forbidden without canAccessChat",
        listing.status == 403,
        format!("{}, expected 403", listing.describe()),
    );

    let reply = ctx.send(
        ApiRequest::post(format!("/chat/{}/reply", chat_id))
            .bearer(Some(&session.token))
            .json(json!({ "message": "should be refused" })),
    );
    ctx.reporter.record(
        "Reply forbidden without canAccessChat",
        reply.status == 403,
        format!("{}, expected 403", reply.describe()),
    );

    let granted = ctx.update_permissions(&admin.id, admin.permissions.with_chat(true));
    ctx.reporter.record("Grant chat access", granted.success, granted.describe());

    let (login, session) = ctx.login_as(CHAT_ADMIN_SESSION, &admin.username, &admin.password);
    let restored = match session {
        Some(session) => {
            ctx.send(ApiRequest::get("/chat/conversations").bearer(Some(&session.token)))
        }
        None => login,
    };
    ctx.reporter.record(
        "Chat access restored after re-login",
        restored.status == 200 && restored.has_list("conversations"),
        restored.describe(),
    );
}
