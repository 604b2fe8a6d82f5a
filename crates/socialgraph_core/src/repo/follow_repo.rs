//! Follow-edge repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the directed `User --FOLLOWS--> User` relation.
//! - Answer follower/following adjacency queries.
//!
//! # Invariants
//! - At most one edge per ordered pair (edge primary key).
//! - Both endpoints must be existing users; admins are never endpoints.
//! - Self edges are rejected by a table `CHECK` as a last line; callers are
//!   expected to reject them before reaching the store.

use crate::db::{ensure_schema_current, now_epoch_ms};
use crate::model::account::{AccountId, UserSummary};
use crate::repo::{parse_uuid, user_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use serde::{Deserialize, Serialize};

/// Follower/following totals for one user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowCounts {
    pub followers: u64,
    pub following: u64,
}

/// Repository interface for follow edges.
pub trait FollowRepository {
    /// Creates the edge if absent. Returns `true` when a new edge was written.
    fn follow(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool>;
    /// Removes the edge if present. Returns `true` when an edge was removed.
    fn unfollow(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool>;
    /// Users with an edge pointing at `user_id`.
    fn list_followers(&self, user_id: AccountId) -> RepoResult<Vec<UserSummary>>;
    /// Users `user_id` points at.
    fn list_following(&self, user_id: AccountId) -> RepoResult<Vec<UserSummary>>;
    fn is_following(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool>;
    fn follow_counts(&self, user_id: AccountId) -> RepoResult<FollowCounts>;
}

/// SQLite-backed follow repository.
pub struct SqliteFollowRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteFollowRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl FollowRepository for SqliteFollowRepository<'_> {
    fn follow(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        ensure_user_in_tx(&tx, follower_id)?;
        ensure_user_in_tx(&tx, followee_id)?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at)
             VALUES (?1, ?2, ?3);",
            params![
                follower_id.to_string(),
                followee_id.to_string(),
                now_epoch_ms()
            ],
        )?;

        tx.commit()?;
        Ok(inserted == 1)
    }

    fn unfollow(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM follows WHERE follower_id = ?1 AND followee_id = ?2;",
            params![follower_id.to_string(), followee_id.to_string()],
        )?;
        tx.commit()?;
        Ok(removed == 1)
    }

    fn list_followers(&self, user_id: AccountId) -> RepoResult<Vec<UserSummary>> {
        list_adjacent(
            self.conn,
            "SELECT u.id, u.username, u.email
             FROM follows f
             INNER JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = ?1;",
            user_id,
        )
    }

    fn list_following(&self, user_id: AccountId) -> RepoResult<Vec<UserSummary>> {
        list_adjacent(
            self.conn,
            "SELECT u.id, u.username, u.email
             FROM follows f
             INNER JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ?1;",
            user_id,
        )
    }

    fn is_following(&self, follower_id: AccountId, followee_id: AccountId) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM follows WHERE follower_id = ?1 AND followee_id = ?2
            );",
            params![follower_id.to_string(), followee_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn follow_counts(&self, user_id: AccountId) -> RepoResult<FollowCounts> {
        let id = user_id.to_string();
        let (followers, following): (i64, i64) = self.conn.query_row(
            "SELECT
                (SELECT COUNT(*) FROM follows WHERE followee_id = ?1),
                (SELECT COUNT(*) FROM follows WHERE follower_id = ?1);",
            [id.as_str()],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(FollowCounts {
            followers: followers.max(0) as u64,
            following: following.max(0) as u64,
        })
    }
}

fn ensure_user_in_tx(tx: &Transaction<'_>, user_id: AccountId) -> RepoResult<()> {
    if user_exists(tx, user_id)? {
        Ok(())
    } else {
        Err(RepoError::UserNotFound(user_id))
    }
}

fn list_adjacent(conn: &Connection, sql: &str, user_id: AccountId) -> RepoResult<Vec<UserSummary>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([user_id.to_string()])?;
    let mut users = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get("id")?;
        users.push(UserSummary {
            id: parse_uuid(&id_text, "users.id")?,
            username: row.get("username")?,
            email: row.get("email")?,
        });
    }
    Ok(users)
}
