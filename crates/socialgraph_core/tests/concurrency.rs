use socialgraph_core::db::open_db;
use socialgraph_core::{
    AccountService, ContentService, CredentialHasher, ErrorKind, GraphService, NewAccount,
    PasswordHasherConfig, Role, SqliteAccountRepository, SqliteFollowRepository,
    SqlitePostRepository,
};
use std::path::Path;
use std::sync::{Arc, Barrier};
use std::thread;

const WORKERS: usize = 8;

fn register(db_path: &Path, username: &str) -> Result<uuid::Uuid, ErrorKind> {
    let conn = open_db(db_path).unwrap();
    let hasher = CredentialHasher::new(PasswordHasherConfig::low_cost()).unwrap();
    AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher)
        .create_account(
            Role::User,
            &NewAccount {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password: "password-123".to_string(),
            },
        )
        .map(|account| account.id)
        .map_err(|err| err.kind())
}

#[test]
fn concurrent_follows_of_same_pair_write_one_edge() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("graph.sqlite3");
    let alice = register(&db_path, "alice").unwrap();
    let bob = register(&db_path, "bob").unwrap();

    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let db_path = db_path.clone();
            thread::spawn(move || {
                let conn = open_db(&db_path).unwrap();
                let service = GraphService::new(SqliteFollowRepository::try_new(&conn).unwrap());
                barrier.wait();
                service.follow(alice, bob)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let conn = open_db(&db_path).unwrap();
    let edges: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM follows WHERE follower_id = ?1 AND followee_id = ?2;",
            [alice.to_string(), bob.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(edges, 1);
}

#[test]
fn concurrent_likes_of_same_pair_write_one_edge() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("likes.sqlite3");
    let alice = register(&db_path, "alice").unwrap();
    let bob = register(&db_path, "bob").unwrap();
    let post_id = {
        let conn = open_db(&db_path).unwrap();
        ContentService::new(SqlitePostRepository::try_new(&conn).unwrap())
            .create_post(bob, "hello")
            .unwrap()
            .id
    };

    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let db_path = db_path.clone();
            thread::spawn(move || {
                let conn = open_db(&db_path).unwrap();
                let service = ContentService::new(SqlitePostRepository::try_new(&conn).unwrap());
                barrier.wait();
                service.like_post(alice, post_id)
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }

    let conn = open_db(&db_path).unwrap();
    let likes: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM likes WHERE user_id = ?1 AND post_id = ?2;",
            [alice.to_string(), post_id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(likes, 1);
    let post = ContentService::new(SqlitePostRepository::try_new(&conn).unwrap())
        .get_post_by_id(post_id)
        .unwrap();
    assert_eq!(post.likes_count, 1);
}

#[test]
fn concurrent_registrations_of_one_username_admit_exactly_one() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("accounts.sqlite3");
    drop(open_db(&db_path).unwrap());

    let barrier = Arc::new(Barrier::new(WORKERS));
    let handles: Vec<_> = (0..WORKERS)
        .map(|_| {
            let barrier = Arc::clone(&barrier);
            let db_path = db_path.clone();
            thread::spawn(move || {
                barrier.wait();
                register(&db_path, "alice")
            })
        })
        .collect();

    let results: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();
    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);
    assert!(results
        .iter()
        .filter_map(|result| result.as_ref().err())
        .all(|kind| *kind == ErrorKind::Conflict));

    let conn = open_db(&db_path).unwrap();
    let users: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM users WHERE username = 'alice';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(users, 1);
}
