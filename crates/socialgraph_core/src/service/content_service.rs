//! Content use-case service: posts and likes.
//!
//! # Invariants
//! - Post content is validated before the store is touched.
//! - Repeated like/unlike converge without error.

use crate::model::account::AccountId;
use crate::model::post::{PostId, PostView};
use crate::repo::post_repo::PostRepository;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::validation::validate_post_content;
use log::info;

/// Posts and likes facade over a post repository.
pub struct ContentService<R: PostRepository> {
    repo: R,
}

impl<R: PostRepository> ContentService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a post and its authorship edge in one transaction.
    pub fn create_post(&self, author_id: AccountId, content: &str) -> ServiceResult<PostView> {
        validate_post_content(content)?;
        let post = self.repo.create_post(author_id, content)?;
        info!(
            "event=post_create module=content status=ok author_id={} post_id={}",
            author_id, post.id
        );
        Ok(post)
    }

    /// Likes `post_id` as `actor_id`. Idempotent.
    pub fn like_post(&self, actor_id: AccountId, post_id: PostId) -> ServiceResult<()> {
        let created = self.repo.like_post(actor_id, post_id)?;
        info!(
            "event=like module=content status=ok actor_id={} post_id={} created={}",
            actor_id, post_id, created
        );
        Ok(())
    }

    /// Removes the like if present. Absent edge is a no-op.
    pub fn unlike_post(&self, actor_id: AccountId, post_id: PostId) -> ServiceResult<()> {
        let removed = self.repo.unlike_post(actor_id, post_id)?;
        info!(
            "event=unlike module=content status=ok actor_id={} post_id={} removed={}",
            actor_id, post_id, removed
        );
        Ok(())
    }

    /// Posts authored by `user_id`, newest first. Unknown users have none.
    pub fn get_user_posts(&self, user_id: AccountId) -> ServiceResult<Vec<PostView>> {
        Ok(self.repo.list_posts_by_author(user_id)?)
    }

    pub fn get_post_by_id(&self, post_id: PostId) -> ServiceResult<PostView> {
        self.repo
            .get_post(post_id)?
            .ok_or(ServiceError::PostNotFound(post_id))
    }
}
