use socialgraph_core::db::open_db_in_memory;
use socialgraph_core::{
    AccountService, CredentialHasher, ErrorKind, NewAccount, PasswordHasherConfig, Role,
    ServiceError, SqliteAccountRepository,
};

fn hasher() -> CredentialHasher {
    CredentialHasher::new(PasswordHasherConfig::low_cost()).unwrap()
}

fn new_account(username: &str) -> NewAccount {
    NewAccount {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: "password-123".to_string(),
    }
}

#[test]
fn create_account_returns_public_shape_and_stores_only_hash() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher());

    let created = service
        .create_account(Role::User, &new_account("alice"))
        .unwrap();
    assert_eq!(created.username, "alice");
    assert_eq!(created.email, "alice@example.com");
    assert_eq!(created.role, Role::User);

    let stored_hash: String = conn
        .query_row(
            "SELECT password_hash FROM users WHERE id = ?1;",
            [created.id.to_string()],
            |row| row.get(0),
        )
        .unwrap();
    assert!(stored_hash.starts_with("$argon2id$"));
    assert!(!stored_hash.contains("password-123"));

    let full = service
        .find_by_username(Role::User, "alice")
        .unwrap()
        .unwrap();
    assert_eq!(full.password_hash, stored_hash);
}

#[test]
fn duplicate_username_in_same_collection_conflicts() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher());

    service
        .create_account(Role::User, &new_account("alice"))
        .unwrap();
    let err = service
        .create_account(Role::User, &new_account("alice"))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict { role: Role::User, .. }));
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM users;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn same_username_as_user_and_admin_both_succeed() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher());

    let user = service
        .create_account(Role::User, &new_account("alice"))
        .unwrap();
    let admin = service
        .create_account(Role::Admin, &new_account("alice"))
        .unwrap();

    assert_ne!(user.id, admin.id);
    assert_eq!(admin.role, Role::Admin);
    assert_eq!(
        service.find_by_id(Role::User, user.id).unwrap().unwrap().role,
        Role::User
    );
    assert!(service.find_by_id(Role::User, admin.id).unwrap().is_none());
}

#[test]
fn lookups_report_absence_without_error() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher());

    assert!(service
        .find_by_username(Role::Admin, "ghost")
        .unwrap()
        .is_none());
    let missing = uuid::Uuid::new_v4();
    assert!(service.find_by_id(Role::User, missing).unwrap().is_none());

    let err = service.get_profile(Role::User, missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn invalid_input_persists_nothing() {
    let conn = open_db_in_memory().unwrap();
    let service = AccountService::new(SqliteAccountRepository::try_new(&conn).unwrap(), hasher());

    let mut bad_email = new_account("alice");
    bad_email.email = "not-an-email".to_string();
    let mut short_password = new_account("bob");
    short_password.password = "short".to_string();

    for (role, input) in [
        (Role::User, new_account("a b")),
        (Role::User, bad_email),
        (Role::Admin, short_password),
    ] {
        let err = service.create_account(role, &input).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "{err}");
    }

    let total: i64 = conn
        .query_row(
            "SELECT (SELECT COUNT(*) FROM users) + (SELECT COUNT(*) FROM admins);",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(total, 0);
}
