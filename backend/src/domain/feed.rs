//! Feed composition over the post store.
//!
//! All feeds are newest-first and computed at read time by the repository's
//! join queries; nothing is fanned out on write. Paging past the end of a
//! feed yields an empty page, except for the strict variant used by
//! serving layers that want out-of-range pages to read as missing.

use std::sync::Arc;

use pagination::{Page, PageRequest};

use super::error::Error;
use super::ports::PostRepository;
use super::post::Post;
use super::user::UserId;

/// Application service composing post feeds.
pub struct FeedService<P> {
    posts: Arc<P>,
}

impl<P> FeedService<P>
where
    P: PostRepository,
{
    /// Create the service over the post repository.
    pub fn new(posts: Arc<P>) -> Self {
        Self { posts }
    }

    /// The user's own posts interleaved with posts from followed authors,
    /// deduplicated, newest first.
    pub fn home_timeline(&self, user: UserId, page: PageRequest) -> Result<Page<Post>, Error> {
        Ok(self.posts.home_timeline(user, page)?)
    }

    /// [`FeedService::home_timeline`], but an empty page beyond the first
    /// is reported as not found rather than returned empty.
    pub fn home_timeline_strict(
        &self,
        user: UserId,
        page: PageRequest,
    ) -> Result<Page<Post>, Error> {
        strict(self.posts.home_timeline(user, page)?)
    }

    /// Every post on the site, newest first.
    pub fn explore(&self, page: PageRequest) -> Result<Page<Post>, Error> {
        Ok(self.posts.explore(page)?)
    }

    /// Posts written by one author, newest first.
    pub fn by_author(&self, author: UserId, page: PageRequest) -> Result<Page<Post>, Error> {
        Ok(self.posts.by_author(author, page)?)
    }
}

fn strict(page: Page<Post>) -> Result<Page<Post>, Error> {
    if page.is_empty() && page.page() > 1 {
        return Err(Error::not_found("page is out of range"));
    }
    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockPostRepository;
    use rstest::rstest;

    fn service(posts: MockPostRepository) -> FeedService<MockPostRepository> {
        FeedService::new(Arc::new(posts))
    }

    #[rstest]
    fn strict_timeline_turns_late_empty_pages_into_not_found() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_home_timeline()
            .returning(|_, page| Ok(Page::new(Vec::new(), page, 25)));

        let request = PageRequest::new(3, 10);
        let err = service(posts)
            .home_timeline_strict(UserId(1), request)
            .expect_err("out of range");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[rstest]
    fn strict_timeline_allows_an_empty_first_page() {
        let mut posts = MockPostRepository::new();
        posts
            .expect_home_timeline()
            .returning(|_, page| Ok(Page::new(Vec::new(), page, 0)));

        let page = service(posts)
            .home_timeline_strict(UserId(1), PageRequest::first())
            .expect("empty feed is fine");
        assert!(page.is_empty());
    }
}
