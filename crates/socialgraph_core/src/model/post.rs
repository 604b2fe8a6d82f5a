//! Post domain model.
//!
//! # Invariants
//! - A post is owned by exactly one user account.
//! - Posts are immutable after creation.

use crate::model::account::AccountId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for posts.
pub type PostId = Uuid;

/// Post read model annotated with its author and like count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
    pub id: PostId,
    pub content: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub author_id: AccountId,
    /// Author username.
    pub username: String,
    /// Count of incoming LIKES edges.
    pub likes_count: u64,
}
