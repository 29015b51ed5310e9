use crate::harness::{Fault, Scenario};
use panelprobe_core::SequenceKind;

#[test]
fn test_wrong_password_skips_dependent_sequences() {
    Scenario::new("wrong_password")
        .probe_credentials("admin", "not-the-password")
        .run_probe()
        .assert_failed("Super admin login")
        .assert_skipped("Token verification")
        .assert_passed("Invalid credentials rejected with 401")
        .assert_skipped("Admin management: skipped")
        .assert_skipped("Chat: skipped")
        // login, verification, then one skip per remaining sequence
        .assert_failed_count(2 + SequenceKind::ALL.len() - 1)
        .assert_exit_code(1)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_panel_rejecting_every_login() {
    Scenario::new("reject_all_logins")
        .with_fault(Fault::RejectAllLogins)
        .run_only(&[SequenceKind::Storage])
        .assert_failed("Super admin login")
        .assert_message_contains("Super admin login", "401")
        .assert_skipped("Private storage: skipped")
        .assert_not_recorded("Create storage item")
        .assert_exit_code(1)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_unreachable_panel_reports_transport_failure() {
    Scenario::new("panel_offline")
        .panel_offline()
        .run_only(&[SequenceKind::Skills])
        .assert_failed("Super admin login")
        .assert_message_contains("Super admin login", "No response")
        .assert_failed("Invalid credentials rejected with 401")
        .assert_skipped("Skills: skipped")
        .assert_failed_count(4)
        .assert_exit_code(1)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_cleanup_without_session_keeps_nothing_to_delete() {
    Scenario::new("cleanup_without_login")
        .probe_credentials("admin", "wrong")
        .run_probe()
        .cleanup()
        .assert_cleanup_clean()
        .assert_leftovers(0)
        .assert_results_unchanged_by_cleanup()
        .run()
        .expect("scenario should pass");
}
