//! Post and like repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist posts together with their authorship edge.
//! - Own the `User --LIKES--> Post` relation and like counts.
//!
//! # Invariants
//! - A post row always carries its author (`posts.author_id NOT NULL`), so
//!   the post and its POSTED edge are one write.
//! - Post lists are ordered `created_at DESC`, later insertion first on ties.
//! - At most one like per (user, post) pair.

use crate::db::{ensure_schema_current, now_epoch_ms};
use crate::model::account::AccountId;
use crate::model::post::{PostId, PostView};
use crate::repo::{parse_uuid, post_exists, user_exists, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

/// Shared projection for every post read path. Callers append joins,
/// filters and ordering.
pub(crate) const POST_VIEW_SELECT_SQL: &str = "SELECT
    p.id,
    p.content,
    p.created_at,
    p.author_id,
    u.username,
    (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count
FROM posts p
INNER JOIN users u ON u.id = p.author_id";

/// Newest first; rowid breaks timestamp ties by insertion order.
pub(crate) const POST_VIEW_ORDER_SQL: &str = "ORDER BY p.created_at DESC, p.rowid DESC";

/// Repository interface for posts and likes.
pub trait PostRepository {
    /// Creates one post authored by `author_id`.
    fn create_post(&self, author_id: AccountId, content: &str) -> RepoResult<PostView>;
    fn get_post(&self, post_id: PostId) -> RepoResult<Option<PostView>>;
    /// All posts authored by `author_id`, newest first.
    fn list_posts_by_author(&self, author_id: AccountId) -> RepoResult<Vec<PostView>>;
    /// Creates the like edge if absent. Returns `true` when a new edge was written.
    fn like_post(&self, user_id: AccountId, post_id: PostId) -> RepoResult<bool>;
    /// Removes the like edge if present. Returns `true` when an edge was removed.
    fn unlike_post(&self, user_id: AccountId, post_id: PostId) -> RepoResult<bool>;
}

/// SQLite-backed post repository.
pub struct SqlitePostRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqlitePostRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl PostRepository for SqlitePostRepository<'_> {
    fn create_post(&self, author_id: AccountId, content: &str) -> RepoResult<PostView> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let username: Option<String> = tx
            .query_row(
                "SELECT username FROM users WHERE id = ?1;",
                [author_id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(username) = username else {
            return Err(RepoError::UserNotFound(author_id));
        };

        let post_id = Uuid::new_v4();
        let created_at = now_epoch_ms();
        tx.execute(
            "INSERT INTO posts (id, author_id, content, created_at)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                post_id.to_string(),
                author_id.to_string(),
                content,
                created_at
            ],
        )?;
        tx.commit()?;

        Ok(PostView {
            id: post_id,
            content: content.to_string(),
            created_at,
            author_id,
            username,
            likes_count: 0,
        })
    }

    fn get_post(&self, post_id: PostId) -> RepoResult<Option<PostView>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{POST_VIEW_SELECT_SQL} WHERE p.id = ?1;"))?;
        let mut rows = stmt.query([post_id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_post_view_row(row)?));
        }
        Ok(None)
    }

    fn list_posts_by_author(&self, author_id: AccountId) -> RepoResult<Vec<PostView>> {
        let mut stmt = self.conn.prepare(&format!(
            "{POST_VIEW_SELECT_SQL}
             WHERE p.author_id = ?1
             {POST_VIEW_ORDER_SQL};"
        ))?;
        let mut rows = stmt.query([author_id.to_string()])?;
        collect_post_views(&mut rows)
    }

    fn like_post(&self, user_id: AccountId, post_id: PostId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if !user_exists(&tx, user_id)? {
            return Err(RepoError::UserNotFound(user_id));
        }
        if !post_exists(&tx, post_id)? {
            return Err(RepoError::PostNotFound(post_id));
        }

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO likes (user_id, post_id, created_at)
             VALUES (?1, ?2, ?3);",
            params![user_id.to_string(), post_id.to_string(), now_epoch_ms()],
        )?;
        tx.commit()?;
        Ok(inserted == 1)
    }

    fn unlike_post(&self, user_id: AccountId, post_id: PostId) -> RepoResult<bool> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let removed = tx.execute(
            "DELETE FROM likes WHERE user_id = ?1 AND post_id = ?2;",
            params![user_id.to_string(), post_id.to_string()],
        )?;
        tx.commit()?;
        Ok(removed == 1)
    }
}

pub(crate) fn collect_post_views(rows: &mut rusqlite::Rows<'_>) -> RepoResult<Vec<PostView>> {
    let mut posts = Vec::new();
    while let Some(row) = rows.next()? {
        posts.push(parse_post_view_row(row)?);
    }
    Ok(posts)
}

fn parse_post_view_row(row: &Row<'_>) -> RepoResult<PostView> {
    let id_text: String = row.get("id")?;
    let author_text: String = row.get("author_id")?;
    let likes_count: i64 = row.get("likes_count")?;
    if likes_count < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative like count `{likes_count}` for post `{id_text}`"
        )));
    }

    Ok(PostView {
        id: parse_uuid(&id_text, "posts.id")?,
        content: row.get("content")?,
        created_at: row.get("created_at")?,
        author_id: parse_uuid(&author_text, "posts.author_id")?,
        username: row.get("username")?,
        likes_count: likes_count as u64,
    })
}
