//! Follow graph behaviour over the real SQLite adapters.

mod support;

use backend::domain::ErrorCode;
use pagination::PageRequest;
use rstest::rstest;
use support::TestBackend;

#[rstest]
fn follow_is_idempotent() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend.social.follow(bob.id, alice.id).expect("followed");
    backend.social.follow(bob.id, alice.id).expect("still fine");

    assert!(backend.social.is_following(bob.id, alice.id).expect("queried"));
    assert_eq!(backend.social.follower_count(alice.id).expect("counted"), 1);
    assert_eq!(backend.social.following_count(bob.id).expect("counted"), 1);
}

#[rstest]
fn unfollow_removes_the_edge_and_tolerates_absence() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend.social.follow(bob.id, alice.id).expect("followed");
    backend.social.unfollow(bob.id, alice.id).expect("unfollowed");
    backend
        .social
        .unfollow(bob.id, alice.id)
        .expect("absent edge is a no-op");

    assert!(!backend.social.is_following(bob.id, alice.id).expect("queried"));
    assert_eq!(backend.social.follower_count(alice.id).expect("counted"), 0);
}

#[rstest]
fn self_follow_is_rejected() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    let err = backend
        .social
        .follow(alice.id, alice.id)
        .expect_err("rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(backend.social.follower_count(alice.id).expect("counted"), 0);
}

#[rstest]
fn follower_listings_are_ordered_by_handle() {
    let backend = TestBackend::new();
    let celebrity = backend.register("celebrity");
    let zed = backend.register("zed");
    let ann = backend.register("ann");
    let mia = backend.register("mia");

    for fan in [zed.id, ann.id, mia.id] {
        backend.social.follow(fan, celebrity.id).expect("followed");
    }

    let fans = backend
        .social
        .followers(celebrity.id, PageRequest::first())
        .expect("listed");
    let handles: Vec<String> = fans
        .items()
        .iter()
        .map(|user| user.username.to_string())
        .collect();
    assert_eq!(
        handles,
        vec!["ann".to_owned(), "mia".to_owned(), "zed".to_owned()]
    );
    assert_eq!(fans.total_items(), 3);

    let following = backend
        .social
        .following(ann.id, PageRequest::first())
        .expect("listed");
    assert_eq!(following.items().len(), 1);
    assert_eq!(following.items()[0].id, celebrity.id);
}

#[rstest]
fn edges_are_directional() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let bob = backend.register("bob");

    backend.social.follow(bob.id, alice.id).expect("followed");

    assert!(backend.social.is_following(bob.id, alice.id).expect("queried"));
    assert!(!backend.social.is_following(alice.id, bob.id).expect("queried"));
}
