use crate::harness::Scenario;
use panelprobe_core::SequenceKind;
use anyhow::ensure;

#[test]
fn test_full_run_passes_against_conforming_panel() {
    Scenario::new("full_run")
        .run_probe()
        .assert_all_passed()
        .assert_exit_code(0)
        .assert_passed("Super admin login")
        .assert_passed("Re-login carries updated permissions")
        .assert_passed("Private storage item hidden from other admins")
        .assert_passed("Private project visible with canViewPrivateProjects")
        .assert_passed("Public listing hides private projects")
        .assert_passed("Skill update read back without level")
        .assert_passed("Contact form send status")
        .assert_passed("Chat access restored after re-login")
        .assert_contact_restored()
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_cleanup_leaves_panel_as_found() {
    Scenario::new("full_run_cleanup")
        .run_probe()
        .cleanup()
        .assert_cleanup_clean()
        .assert_results_unchanged_by_cleanup()
        .assert_panel_cleaned()
        .assert_exit_code(0)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_probe_exercises_every_surface() {
    Scenario::new("every_surface")
        .run_probe()
        .assert_request_seen("POST /api/auth/login")
        .assert_request_seen("GET /api/auth/verify")
        .assert_request_seen("DELETE /api/admins/admin-1")
        .assert_request_seen("POST /api/upload")
        .assert_request_seen("POST /api/contact/send")
        .assert_request_seen("PUT /api/content")
        .assert_panel(|panel| {
            ensure!(panel.upload_count() == 1, "expected one upload");
            ensure!(panel.chat_count() == 1, "repeat messages should share a conversation");
            Ok(())
        })
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_only_selected_sequences_run() {
    Scenario::new("only_skills")
        .run_only(&[SequenceKind::Skills])
        .assert_all_passed()
        .assert_passed("Super admin login")
        .assert_passed("Create skill without level")
        .assert_not_recorded("List admins with permissions")
        .assert_not_recorded("Create restricted admin")
        .assert_panel(|panel| {
            ensure!(panel.admin_usernames().len() == 1, "no admin should be created");
            Ok(())
        })
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_skipped_sequences_do_not_run() {
    Scenario::new("skip_chat_and_upload")
        .run_skipping(&[SequenceKind::Chat, SequenceKind::Upload])
        .assert_all_passed()
        .assert_not_recorded("Upload file")
        .assert_not_recorded("Customer sends chat message")
        .assert_panel(|panel| {
            ensure!(panel.upload_count() == 0, "upload ran");
            ensure!(panel.chat_count() == 0, "chat ran");
            Ok(())
        })
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_authentication_cannot_be_skipped() {
    Scenario::new("skip_auth")
        .run_skipping(&[SequenceKind::Auth])
        .assert_passed("Super admin login")
        .assert_exit_code(0)
        .run()
        .expect("scenario should pass");
}

#[test]
fn test_custom_fixture_prefix() {
    Scenario::new("fixture_prefix")
        .fixture_prefix("zz_probe")
        .run_only(&[SequenceKind::Admins])
        .assert_all_passed()
        .assert_panel(|panel| {
            let usernames = panel.admin_usernames();
            ensure!(
                usernames.iter().skip(1).all(|u| u.starts_with("zz_probe")),
                "fixture admins not prefixed: {:?}",
                usernames
            );
            Ok(())
        })
        .run()
        .expect("scenario should pass");
}
