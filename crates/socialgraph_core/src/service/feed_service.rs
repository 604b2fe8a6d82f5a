//! Feed composer. Owns no state; every call is one read query.

use crate::model::account::AccountId;
use crate::model::post::PostView;
use crate::repo::feed_repo::FeedRepository;
use crate::service::error::ServiceResult;

/// Maximum posts returned by one feed read.
pub const FEED_LIMIT: u32 = 50;

/// Feed facade over a feed repository.
pub struct FeedService<R: FeedRepository> {
    repo: R,
}

impl<R: FeedRepository> FeedService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Newest posts from everyone `user_id` follows, capped at `FEED_LIMIT`.
    pub fn get_feed(&self, user_id: AccountId) -> ServiceResult<Vec<PostView>> {
        Ok(self.repo.feed_for(user_id, FEED_LIMIT)?)
    }
}
