//! Social graph use-case service.
//!
//! # Invariants
//! - `follow(a, a)` fails with `SelfReference` before any store access, so
//!   it fails even when `a` does not exist.
//! - Repeated follow/unfollow converge without error.

use crate::model::account::{AccountId, UserSummary};
use crate::repo::follow_repo::{FollowCounts, FollowRepository};
use crate::service::error::{ServiceError, ServiceResult};
use log::info;

/// Follow-graph facade over a follow repository.
pub struct GraphService<R: FollowRepository> {
    repo: R,
}

impl<R: FollowRepository> GraphService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Makes `actor_id` follow `target_id`. Idempotent.
    pub fn follow(&self, actor_id: AccountId, target_id: AccountId) -> ServiceResult<()> {
        if actor_id == target_id {
            return Err(ServiceError::SelfReference(actor_id));
        }

        let created = self.repo.follow(actor_id, target_id)?;
        info!(
            "event=follow module=graph status=ok actor_id={} target_id={} created={}",
            actor_id, target_id, created
        );
        Ok(())
    }

    /// Removes the edge if present. Absent edge is a no-op.
    pub fn unfollow(&self, actor_id: AccountId, target_id: AccountId) -> ServiceResult<()> {
        let removed = self.repo.unfollow(actor_id, target_id)?;
        info!(
            "event=unfollow module=graph status=ok actor_id={} target_id={} removed={}",
            actor_id, target_id, removed
        );
        Ok(())
    }

    pub fn list_followers(&self, user_id: AccountId) -> ServiceResult<Vec<UserSummary>> {
        Ok(self.repo.list_followers(user_id)?)
    }

    pub fn list_following(&self, user_id: AccountId) -> ServiceResult<Vec<UserSummary>> {
        Ok(self.repo.list_following(user_id)?)
    }

    pub fn is_following(&self, actor_id: AccountId, target_id: AccountId) -> ServiceResult<bool> {
        Ok(self.repo.is_following(actor_id, target_id)?)
    }

    pub fn follow_counts(&self, user_id: AccountId) -> ServiceResult<FollowCounts> {
        Ok(self.repo.follow_counts(user_id)?)
    }
}
