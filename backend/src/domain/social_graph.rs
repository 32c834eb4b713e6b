//! Directed follow graph between users.
//!
//! Edges live in a join table whose composite primary key makes repeated
//! follows idempotent at the storage layer; the service only adds the
//! self-follow rejection and counting conveniences on top.

use std::sync::Arc;

use pagination::{Page, PageRequest};

use super::error::Error;
use super::ports::SocialGraphRepository;
use super::user::{User, UserId};

/// Application service for the follow graph.
pub struct SocialGraphService<G> {
    graph: Arc<G>,
}

impl<G> SocialGraphService<G>
where
    G: SocialGraphRepository,
{
    /// Create the service over the graph repository.
    pub fn new(graph: Arc<G>) -> Self {
        Self { graph }
    }

    /// Make `follower` follow `followed`.
    ///
    /// Following yourself is rejected; following someone you already follow
    /// is a no-op.
    pub fn follow(&self, follower: UserId, followed: UserId) -> Result<(), Error> {
        if follower == followed {
            return Err(Error::invalid_request("you cannot follow yourself"));
        }
        self.graph.insert_edge(follower, followed)?;
        Ok(())
    }

    /// Make `follower` stop following `followed`; a no-op when no edge
    /// exists.
    pub fn unfollow(&self, follower: UserId, followed: UserId) -> Result<(), Error> {
        if follower == followed {
            return Err(Error::invalid_request("you cannot unfollow yourself"));
        }
        self.graph.delete_edge(follower, followed)?;
        Ok(())
    }

    /// Whether `follower` currently follows `followed`.
    pub fn is_following(&self, follower: UserId, followed: UserId) -> Result<bool, Error> {
        Ok(self.graph.edge_exists(follower, followed)?)
    }

    /// Number of users following `user`.
    pub fn follower_count(&self, user: UserId) -> Result<u64, Error> {
        Ok(self.graph.follower_count(user)?)
    }

    /// Number of users `user` follows.
    pub fn following_count(&self, user: UserId) -> Result<u64, Error> {
        Ok(self.graph.following_count(user)?)
    }

    /// Users following `user`, ordered by handle.
    pub fn followers(&self, user: UserId, page: PageRequest) -> Result<Page<User>, Error> {
        Ok(self.graph.followers(user, page)?)
    }

    /// Users `user` follows, ordered by handle.
    pub fn following(&self, user: UserId, page: PageRequest) -> Result<Page<User>, Error> {
        Ok(self.graph.following(user, page)?)
    }
}
