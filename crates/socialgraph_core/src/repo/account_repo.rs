//! Account repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist user and admin accounts into their separate collections.
//! - Look up accounts by id or username within one collection.
//!
//! # Invariants
//! - `id` and `username` uniqueness is enforced per collection by the store.
//! - Creation checks and inserts inside one `IMMEDIATE` transaction; a
//!   concurrent duplicate still surfaces as `DuplicateUsername`.

use crate::db::ensure_schema_current;
use crate::model::account::{Account, AccountId, Role};
use crate::repo::{is_unique_violation, parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

/// Repository interface for the two account collections.
pub trait AccountRepository {
    /// Inserts one account into the collection selected by `account.role`.
    fn create_account(&self, account: &Account) -> RepoResult<()>;
    /// Loads the full record (hash included) by username.
    fn find_by_username(&self, role: Role, username: &str) -> RepoResult<Option<Account>>;
    /// Loads the full record (hash included) by id.
    fn find_by_id(&self, role: Role, id: AccountId) -> RepoResult<Option<Account>>;
}

/// SQLite-backed account repository.
pub struct SqliteAccountRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAccountRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_current(conn)?;
        Ok(Self { conn })
    }
}

impl AccountRepository for SqliteAccountRepository<'_> {
    fn create_account(&self, account: &Account) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if username_taken(&tx, account.role, &account.username)? {
            return Err(RepoError::DuplicateUsername {
                role: account.role,
                username: account.username.clone(),
            });
        }

        let inserted = tx.execute(
            &format!(
                "INSERT INTO {} (id, username, email, password_hash, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                account.role.table()
            ),
            params![
                account.id.to_string(),
                account.username.as_str(),
                account.email.as_str(),
                account.password_hash.as_str(),
                account.created_at,
            ],
        );

        match inserted {
            Ok(_) => {}
            Err(err) if is_unique_violation(&err) => {
                return Err(RepoError::DuplicateUsername {
                    role: account.role,
                    username: account.username.clone(),
                });
            }
            Err(err) => return Err(err.into()),
        }

        tx.commit()?;
        Ok(())
    }

    fn find_by_username(&self, role: Role, username: &str) -> RepoResult<Option<Account>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, username, email, password_hash, created_at
                     FROM {}
                     WHERE username = ?1;",
                    role.table()
                ),
                [username],
                read_account_row,
            )
            .optional()?;
        row.map(|raw| raw.into_account(role)).transpose()
    }

    fn find_by_id(&self, role: Role, id: AccountId) -> RepoResult<Option<Account>> {
        let row = self
            .conn
            .query_row(
                &format!(
                    "SELECT id, username, email, password_hash, created_at
                     FROM {}
                     WHERE id = ?1;",
                    role.table()
                ),
                [id.to_string()],
                read_account_row,
            )
            .optional()?;
        row.map(|raw| raw.into_account(role)).transpose()
    }
}

struct RawAccountRow {
    id: String,
    username: String,
    email: String,
    password_hash: String,
    created_at: i64,
}

impl RawAccountRow {
    fn into_account(self, role: Role) -> RepoResult<Account> {
        let column = match role {
            Role::User => "users.id",
            Role::Admin => "admins.id",
        };
        Ok(Account {
            id: parse_uuid(&self.id, column)?,
            role,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at: self.created_at,
        })
    }
}

fn read_account_row(row: &Row<'_>) -> rusqlite::Result<RawAccountRow> {
    Ok(RawAccountRow {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        created_at: row.get("created_at")?,
    })
}

fn username_taken(tx: &Transaction<'_>, role: Role, username: &str) -> RepoResult<bool> {
    let exists: i64 = tx.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE username = ?1);",
            role.table()
        ),
        [username],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

#[cfg(test)]
mod tests {
    use super::{AccountRepository, SqliteAccountRepository};
    use crate::db::open_db_in_memory;
    use crate::model::account::{Account, Role};
    use crate::repo::RepoError;
    use uuid::Uuid;

    fn account(role: Role, username: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            role,
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "hash".to_string(),
            created_at: 1_000,
        }
    }

    #[test]
    fn duplicate_username_in_same_collection_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteAccountRepository::try_new(&conn).unwrap();

        repo.create_account(&account(Role::User, "alice")).unwrap();
        let err = repo
            .create_account(&account(Role::User, "alice"))
            .unwrap_err();
        assert!(matches!(
            err,
            RepoError::DuplicateUsername { role: Role::User, ref username } if username == "alice"
        ));
    }

    #[test]
    fn collections_are_disjoint() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteAccountRepository::try_new(&conn).unwrap();

        let user = account(Role::User, "alice");
        let admin = account(Role::Admin, "alice");
        repo.create_account(&user).unwrap();
        repo.create_account(&admin).unwrap();

        let loaded_user = repo.find_by_username(Role::User, "alice").unwrap().unwrap();
        let loaded_admin = repo.find_by_username(Role::Admin, "alice").unwrap().unwrap();
        assert_eq!(loaded_user.id, user.id);
        assert_eq!(loaded_admin.id, admin.id);
        assert!(repo.find_by_id(Role::Admin, user.id).unwrap().is_none());
    }

    #[test]
    fn unique_violation_from_store_maps_to_duplicate() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteAccountRepository::try_new(&conn).unwrap();
        let existing = account(Role::Admin, "root");
        repo.create_account(&existing).unwrap();

        let err = conn
            .execute(
                "INSERT INTO admins (id, username, email, password_hash, created_at)
                 VALUES ('x', 'root', 'e', 'h', 1);",
                [],
            )
            .unwrap_err();
        assert!(crate::repo::is_unique_violation(&err));
    }
}
