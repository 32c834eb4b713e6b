//! Post authoring and full-text search.
//!
//! Writes go to the relational store first; the matching index changes are
//! staged in an [`IndexBatch`] and flushed only once the store write has
//! succeeded, so the index can lag but never leads. Search resolves ranked
//! ids from the index and rehydrates them from the store, dropping ids
//! whose rows have since disappeared.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use pagination::{Page, PageRequest};

use super::error::Error;
use super::ports::{NewPostRecord, PostRepository, SearchIndex};
use super::post::{Post, PostBody, PostId};
use super::search::{IndexBatch, SearchService};
use super::user::UserId;

/// Application service for authoring and searching posts.
pub struct ContentService<P, I> {
    posts: Arc<P>,
    search: SearchService<I>,
    clock: Arc<dyn Clock>,
}

impl<P, I> ContentService<P, I>
where
    P: PostRepository,
    I: SearchIndex,
{
    /// Create the service over the post repository and search index.
    pub fn new(posts: Arc<P>, search: SearchService<I>, clock: Arc<dyn Clock>) -> Self {
        Self {
            posts,
            search,
            clock,
        }
    }

    /// Publish a new post and mirror it into the search index.
    ///
    /// `language` is the detected language of the body, when the caller ran
    /// detection; it is stored verbatim for translation features.
    pub fn create_post(
        &self,
        author: UserId,
        body: PostBody,
        language: Option<String>,
    ) -> Result<Post, Error> {
        let record = NewPostRecord {
            author,
            body,
            timestamp: self.clock.utc(),
            language,
        };
        let post = self.posts.insert(&record)?;

        let mut batch = IndexBatch::new();
        batch.stage_upsert(&post);
        self.search.flush(batch);

        info!(post = %post.id, author = %author, "published post");
        Ok(post)
    }

    /// Fetch a single post.
    pub fn get_post(&self, id: PostId) -> Result<Post, Error> {
        self.posts
            .find_by_id(id)?
            .ok_or_else(|| Error::not_found(format!("post {id} does not exist")))
    }

    /// Delete one of the requester's posts and drop it from the index.
    pub fn delete_post(&self, requester: UserId, id: PostId) -> Result<(), Error> {
        let post = self.get_post(id)?;
        if post.author != requester {
            return Err(Error::unauthorized("only the author may delete a post"));
        }
        self.posts.delete(id)?;

        let mut batch = IndexBatch::new();
        batch.stage_remove::<Post>(id.0);
        self.search.flush(batch);
        Ok(())
    }

    /// Rank-ordered full-text search over post bodies.
    ///
    /// The index returns ranked ids and the total match count; the rows are
    /// rehydrated from the store in rank order. Ids the store no longer
    /// knows are silently dropped, which covers the window where the index
    /// lags a deletion.
    pub fn search_posts(&self, text: &str, page: PageRequest) -> Result<Page<Post>, Error> {
        let ranked = self.search.query::<Post>(text, page);
        let ids: Vec<PostId> = ranked.ids.iter().copied().map(PostId).collect();
        let mut rows = self.posts.find_by_ids(&ids)?;

        let mut ordered = Vec::with_capacity(rows.len());
        for id in &ids {
            if let Some(position) = rows.iter().position(|post| post.id == *id) {
                ordered.push(rows.swap_remove(position));
            }
        }
        Ok(Page::new(ordered, page, ranked.total))
    }

    /// Rebuild the posts index from the relational store.
    pub fn reindex_posts(&self) -> Result<usize, Error> {
        let posts = self.posts.all_for_reindex()?;
        self.search.reindex(&posts)?;
        info!(count = posts.len(), "rebuilt post search index");
        Ok(posts.len())
    }
}
