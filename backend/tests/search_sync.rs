//! Search index synchronisation against the real store.

mod support;

use pagination::PageRequest;
use rstest::rstest;
use support::TestBackend;

#[rstest]
fn published_posts_become_searchable() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    backend.publish(alice.id, "rust makes me happy");
    backend.publish(alice.id, "gardening sunday");

    let hits = backend
        .content
        .search_posts("rust", PageRequest::first())
        .expect("searched");
    assert_eq!(hits.total_items(), 1);
    assert_eq!(hits.items()[0].body.as_str(), "rust makes me happy");
}

#[rstest]
fn deleted_posts_leave_the_index() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let post = backend.publish(alice.id, "fleeting thought");

    let before = backend
        .content
        .search_posts("fleeting", PageRequest::first())
        .expect("searched");
    assert_eq!(before.total_items(), 1);

    backend
        .content
        .delete_post(alice.id, post.id)
        .expect("deleted");

    let after = backend
        .content
        .search_posts("fleeting", PageRequest::first())
        .expect("searched");
    assert!(after.is_empty());
    assert_eq!(after.total_items(), 0);
}

#[rstest]
fn search_on_an_empty_index_soft_fails_to_no_results() {
    let backend = TestBackend::new();
    backend.register("alice");

    // Nothing was ever indexed; the posts index does not exist yet.
    let hits = backend
        .content
        .search_posts("anything", PageRequest::first())
        .expect("soft-failed");
    assert!(hits.is_empty());
}

#[rstest]
fn an_offline_index_never_fails_the_relational_write() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    backend.index.set_offline(true);
    let post = backend.publish(alice.id, "written while the index was down");
    backend.index.set_offline(false);

    // The store has the post; the index lags it.
    assert_eq!(
        backend.content.get_post(post.id).expect("stored").id,
        post.id
    );
    let hits = backend
        .content
        .search_posts("written", PageRequest::first())
        .expect("searched");
    assert!(hits.is_empty());
}

#[rstest]
fn reindex_rebuilds_the_lagging_index() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");

    backend.index.set_offline(true);
    backend.publish(alice.id, "lost to the outage");
    backend.index.set_offline(false);
    backend.publish(alice.id, "indexed normally");

    let reindexed = backend.content.reindex_posts().expect("reindexed");
    assert_eq!(reindexed, 2);

    let hits = backend
        .content
        .search_posts("outage", PageRequest::first())
        .expect("searched");
    assert_eq!(hits.total_items(), 1);
}

#[rstest]
fn results_rank_by_relevance_not_recency() {
    let backend = TestBackend::new();
    let alice = backend.register("alice");
    let relevant = backend.publish(alice.id, "tea tea tea");
    backend.publish(alice.id, "tea once, coffee mostly");

    let hits = backend
        .content
        .search_posts("tea", PageRequest::first())
        .expect("searched");
    assert_eq!(hits.total_items(), 2);
    assert_eq!(hits.items()[0].id, relevant.id);
}
