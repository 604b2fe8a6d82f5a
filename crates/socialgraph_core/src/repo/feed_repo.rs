//! Feed read repository.
//!
//! The feed is `following(user) ⋈ posts`, globally ordered and capped in one
//! query; it is not capped per followee.

use crate::db::ensure_schema_current;
use crate::model::account::AccountId;
use crate::model::post::PostView;
use crate::repo::post_repo::{collect_post_views, POST_VIEW_ORDER_SQL, POST_VIEW_SELECT_SQL};
use crate::repo::RepoResult;
use rusqlite::{params, Connection};

/// Read-only repository for feed composition.
pub trait FeedRepository {
    /// Posts authored by everyone `user_id` follows, newest first, at most `limit`.
    fn feed_for(&self, user_id: AccountId, limit: u32) -> RepoResult<Vec<PostView>>;
}

/// SQLite-backed feed repository.
pub struct SqliteFeedRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFeedRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl FeedRepository for SqliteFeedRepository<'_> {
    fn feed_for(&self, user_id: AccountId, limit: u32) -> RepoResult<Vec<PostView>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_VIEW_SELECT_SQL}
             INNER JOIN follows f ON f.followee_id = p.author_id
             WHERE f.follower_id = ?1
             {POST_VIEW_ORDER_SQL}
             LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![user_id.to_string(), i64::from(limit)])?;
        collect_post_views(&mut rows)
    }
}
