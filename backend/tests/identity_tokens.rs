//! Registration, credentials, API tokens, and password reset end to end.

mod support;

use backend::domain::ErrorCode;
use backend::domain::ports::ProfileUpdate;
use backend::domain::user::{Email, Username};
use rstest::rstest;
use support::TestBackend;
use zeroize::Zeroizing;

#[rstest]
fn registration_enforces_unique_handles_and_addresses() {
    let backend = TestBackend::new();
    backend.register("alice");

    let same_handle = backend.identity.register(
        Username::new("alice").expect("valid"),
        Email::new("other@example.test").expect("valid"),
        Zeroizing::new("another password".to_owned()),
    );
    let err = same_handle.expect_err("duplicate handle");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().expect("details")["field"], "username");

    let same_address = backend.identity.register(
        Username::new("alice2").expect("valid"),
        Email::new("alice@example.test").expect("valid"),
        Zeroizing::new("another password".to_owned()),
    );
    let err = same_address.expect_err("duplicate address");
    assert_eq!(err.details().expect("details")["field"], "email");
}

#[rstest]
fn credentials_verify_without_leaking_which_part_failed() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    let found = backend
        .identity
        .verify_credentials("alice", "correct horse battery")
        .expect("queried");
    assert_eq!(found.map(|user| user.id), Some(alice.id));

    assert_eq!(
        backend
            .identity
            .verify_credentials("alice", "wrong password")
            .expect("queried"),
        None
    );
    assert_eq!(
        backend
            .identity
            .verify_credentials("mallory", "correct horse battery")
            .expect("queried"),
        None
    );
}

#[rstest]
fn api_tokens_round_trip_and_are_reused_while_fresh() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    let issued = backend.identity.issue_api_token(alice.id).expect("issued");
    let resolved = backend
        .identity
        .check_token(&issued.token)
        .expect("queried")
        .expect("token resolves");
    assert_eq!(resolved.id, alice.id);

    // A token with nearly an hour left is reused, not replaced.
    let second = backend.identity.issue_api_token(alice.id).expect("issued");
    assert_eq!(second.token, issued.token);
}

#[rstest]
fn revoked_tokens_stop_resolving() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    let issued = backend.identity.issue_api_token(alice.id).expect("issued");
    backend.identity.revoke_api_token(alice.id).expect("revoked");

    assert_eq!(
        backend.identity.check_token(&issued.token).expect("queried"),
        None
    );
}

#[rstest]
fn unknown_tokens_fail_closed() {
    let backend = TestBackend::new();
    backend.register("alice");

    assert_eq!(
        backend
            .identity
            .check_token("never-issued")
            .expect("queried"),
        None
    );
}

#[rstest]
fn password_reset_flows_through_the_emailed_token() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    backend
        .identity
        .request_password_reset("alice@example.test")
        .expect("requested");

    let outbox = backend.mailer.take();
    assert_eq!(outbox.len(), 1);
    assert_eq!(outbox[0].recipients, vec!["alice@example.test".to_owned()]);

    let token = outbox[0]
        .text_body
        .lines()
        .find(|line| line.starts_with("v1."))
        .expect("token line present")
        .trim()
        .to_owned();

    let reset_user = backend
        .identity
        .reset_password(&token, Zeroizing::new("a brand new password".to_owned()))
        .expect("reset");
    assert_eq!(reset_user.id, alice.id);

    assert_eq!(
        backend
            .identity
            .verify_credentials("alice", "correct horse battery")
            .expect("queried"),
        None
    );
    let found = backend
        .identity
        .verify_credentials("alice", "a brand new password")
        .expect("queried");
    assert_eq!(found.map(|user| user.id), Some(alice.id));
}

#[rstest]
fn password_reset_is_silent_for_unknown_addresses() {
    let backend = TestBackend::new();
    backend.register("alice");

    backend
        .identity
        .request_password_reset("stranger@example.test")
        .expect("silently ok");
    assert!(backend.mailer.sent().is_empty());
}

#[rstest]
fn tampered_reset_tokens_are_rejected() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    let token = backend
        .identity
        .issue_password_reset_token(alice.id)
        .expect("issued");
    let tampered = format!("{token}x");

    let err = backend
        .identity
        .reset_password(&tampered, Zeroizing::new("whatever".to_owned()))
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn profile_updates_respect_handle_uniqueness() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    backend.register("bob");

    let updated = backend
        .identity
        .update_profile(
            alice.id,
            &ProfileUpdate {
                username: None,
                about_me: Some("I write things.".to_owned()),
            },
        )
        .expect("updated");
    assert_eq!(updated.about_me.as_deref(), Some("I write things."));

    let err = backend
        .identity
        .update_profile(
            alice.id,
            &ProfileUpdate {
                username: Some(Username::new("bob").expect("valid")),
                about_me: None,
            },
        )
        .expect_err("taken handle");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);

    // Keeping your own handle is not a collision.
    let kept = backend
        .identity
        .update_profile(
            alice.id,
            &ProfileUpdate {
                username: Some(Username::new("alice").expect("valid")),
                about_me: None,
            },
        )
        .expect("unchanged handle is fine");
    assert_eq!(kept.username.as_str(), "alice");
}

#[rstest]
fn touch_last_seen_records_activity() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    assert_eq!(alice.last_seen, None);

    backend.identity.touch_last_seen(alice.id).expect("touched");

    let refreshed = backend
        .identity
        .verify_credentials("alice", "correct horse battery")
        .expect("queried")
        .expect("still resolves");
    assert!(refreshed.last_seen.is_some());
}
