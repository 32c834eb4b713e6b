//! Private messaging and the unread counter notification.

mod support;

use backend::domain::UNREAD_COUNT_NOTIFICATION;
use pagination::PageRequest;
use rstest::rstest;
use serde_json::json;
use support::TestBackend;

#[rstest]
fn sending_bumps_the_recipients_unread_counter() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend
        .messaging
        .send(alice.id, bob.id, "lunch tomorrow?")
        .expect("delivered");
    backend
        .messaging
        .send(alice.id, bob.id, "or thursday?")
        .expect("delivered");

    assert_eq!(backend.messaging.unread_count(bob.id).expect("counted"), 2);

    let ledger = backend.notifications.poll(bob.id, 0.0).expect("polled");
    assert_eq!(ledger.len(), 1);
    assert_eq!(ledger[0].name, UNREAD_COUNT_NOTIFICATION);
    assert_eq!(ledger[0].payload, json!(2));
}

#[rstest]
fn reading_the_inbox_marks_everything_read() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend
        .messaging
        .send(alice.id, bob.id, "lunch tomorrow?")
        .expect("delivered");

    let inbox = backend
        .messaging
        .inbox(bob.id, PageRequest::first())
        .expect("read");
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox.items()[0].body, "lunch tomorrow?");

    assert_eq!(backend.messaging.unread_count(bob.id).expect("counted"), 0);
    let ledger = backend.notifications.poll(bob.id, 0.0).expect("polled");
    assert_eq!(ledger[0].payload, json!(0));
}

#[rstest]
fn messages_after_a_read_count_again() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend
        .messaging
        .send(alice.id, bob.id, "first")
        .expect("delivered");
    backend
        .messaging
        .inbox(bob.id, PageRequest::first())
        .expect("read");
    backend
        .messaging
        .send(alice.id, bob.id, "second")
        .expect("delivered");

    assert_eq!(backend.messaging.unread_count(bob.id).expect("counted"), 1);
}

#[rstest]
fn sent_and_received_are_separate_views() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend
        .messaging
        .send(alice.id, bob.id, "to bob")
        .expect("delivered");
    backend
        .messaging
        .send(bob.id, alice.id, "to alice")
        .expect("delivered");

    let alice_sent = backend
        .messaging
        .sent(alice.id, PageRequest::first())
        .expect("listed");
    assert_eq!(alice_sent.len(), 1);
    assert_eq!(alice_sent.items()[0].body, "to bob");

    let alice_inbox = backend
        .messaging
        .inbox(alice.id, PageRequest::first())
        .expect("listed");
    assert_eq!(alice_inbox.len(), 1);
    assert_eq!(alice_inbox.items()[0].body, "to alice");
}
