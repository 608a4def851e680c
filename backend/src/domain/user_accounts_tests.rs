//! Tests for the user account service.

use std::sync::Arc;

use mockall::predicate::eq;
use rstest::rstest;

use super::*;
use crate::domain::ports::{
    MockPasswordHasher, MockUserRepository, PasswordHashError, UserRepositoryError,
};
use crate::domain::{ErrorCode, PasswordHash, Revision};

type Service = UserAccounts<MockUserRepository, MockPasswordHasher>;

fn service(repo: MockUserRepository, hasher: MockPasswordHasher) -> Service {
    UserAccounts::new(Arc::new(repo), Arc::new(hasher))
}

fn account(username: &str, hash: &str) -> UserAccount {
    UserAccount::try_new(username, PasswordHash::new(hash)).expect("valid account")
}

fn stored(id: &str, revision: u64, record: UserAccount) -> Stored<UserAccount> {
    Stored::new(RecordId::new(id), Revision::new(revision), record)
}

fn creds(username: &str, password: &str) -> Credentials {
    Credentials::try_from_parts(username, password).expect("valid credentials")
}

/// Hasher double that prefixes plaintext with `hashed:`.
fn prefix_hasher() -> MockPasswordHasher {
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .returning(|password| Ok(PasswordHash::new(format!("hashed:{}", password.expose()))));
    hasher
        .expect_verify()
        .returning(|password, hash| Ok(hash.as_str() == format!("hashed:{}", password.expose())));
    hasher
}

#[tokio::test]
async fn authenticate_returns_the_matching_account() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .with(eq("admin"))
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:secret")))));

    let user = service(repo, prefix_hasher())
        .authenticate(&creds("admin", "secret"))
        .await
        .expect("login succeeds");
    assert_eq!(user.id, RecordId::new("u-1"));
    assert_eq!(user.username, "admin");
}

#[rstest]
#[case::unknown_user(None)]
#[case::wrong_password(Some(stored("u-1", 1, account("admin", "hashed:other"))))]
#[tokio::test]
async fn authenticate_failures_are_indistinguishable(#[case] found: Option<Stored<UserAccount>>) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(move |_| Ok(found));

    let err = service(repo, prefix_hasher())
        .authenticate(&creds("admin", "secret"))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);
}

#[tokio::test]
async fn unknown_usernames_still_pay_for_a_hash() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("hashed:decoy")));
    hasher.expect_verify().never();

    let err = service(repo, hasher)
        .authenticate(&creds("ghost", "secret"))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn unknown_username_hash_failures_stay_unauthorized() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Err(PasswordHashError::hash("worker lost")));

    let err = service(repo, hasher)
        .authenticate(&creds("ghost", "secret"))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
    assert_eq!(err.message(), UNAUTHORIZED_MESSAGE);
}

#[rstest]
#[case::present(Some(stored("u-1", 2, account("renamed", "hashed:x"))), Some("renamed"))]
#[case::deleted(None, None)]
#[tokio::test]
async fn resolve_reports_the_current_account(
    #[case] found: Option<Stored<UserAccount>>,
    #[case] expected: Option<&str>,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .with(eq(RecordId::new("u-1")))
        .return_once(move |_| Ok(found));

    let user = service(repo, MockPasswordHasher::new())
        .resolve(&RecordId::new("u-1"))
        .await
        .expect("lookup succeeds");
    assert_eq!(user.as_ref().map(|u| u.username.as_str()), expected);
}

#[tokio::test]
async fn resolve_lookup_failure_is_a_store_error() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Err(UserRepositoryError::connection("refused")));

    let err = service(repo, MockPasswordHasher::new())
        .resolve(&RecordId::new("u-1"))
        .await
        .expect_err("lookup fails");
    assert_eq!(err.message(), StoreOperation::FindUser.message());
}

#[tokio::test]
async fn authenticate_treats_unverifiable_hashes_as_mismatch() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "garbage")))));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .return_once(|_, _| Err(PasswordHashError::malformed_hash("invalid prefix")));

    let err = service(repo, hasher)
        .authenticate(&creds("admin", "secret"))
        .await
        .expect_err("login fails");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticate_lookup_failure_is_a_store_error() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(|_| Err(UserRepositoryError::connection("refused")));

    let err = service(repo, MockPasswordHasher::new())
        .authenticate(&creds("admin", "secret"))
        .await
        .expect_err("lookup fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), StoreOperation::FindUser.message());
}

#[tokio::test]
async fn list_users_projects_id_and_username() {
    let mut repo = MockUserRepository::new();
    repo.expect_list().return_once(|| {
        Ok(vec![
            stored("u-1", 1, account("alice", "hashed:a")),
            stored("u-2", 3, account("bob", "hashed:b")),
        ])
    });

    let users = service(repo, MockPasswordHasher::new())
        .list_users()
        .await
        .expect("list succeeds");
    assert_eq!(
        users,
        vec![
            UserSummary {
                id: RecordId::new("u-1"),
                username: "alice".into()
            },
            UserSummary {
                id: RecordId::new("u-2"),
                username: "bob".into()
            },
        ]
    );
}

#[tokio::test]
async fn initialize_creates_the_first_user_with_a_hashed_password() {
    let mut repo = MockUserRepository::new();
    repo.expect_count().return_once(|| Ok(0));
    repo.expect_insert().never();
    repo.expect_insert_first()
        .withf(|account| {
            account.username() == "admin" && account.password_hash().as_str() == "hashed:secret"
        })
        .times(1)
        .return_once(|account| Ok(Some(stored("u-1", 1, account.clone()))));

    let id = service(repo, prefix_hasher())
        .initialize(Some(creds("admin", "secret")))
        .await
        .expect("initialize succeeds");
    assert_eq!(id, RecordId::new("u-1"));
}

#[rstest]
#[case::with_credentials(Some(creds("admin", "secret")))]
#[case::without_credentials(None)]
#[tokio::test]
async fn initialize_rejects_populated_stores_before_checking_input(
    #[case] credentials: Option<Credentials>,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_count().return_once(|| Ok(1));
    repo.expect_insert_first().never();

    let err = service(repo, MockPasswordHasher::new())
        .initialize(credentials)
        .await
        .expect_err("already initialised");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), ALREADY_INITIALIZED_MESSAGE);
}

#[tokio::test]
async fn initialize_loses_to_a_concurrent_first_user() {
    let mut repo = MockUserRepository::new();
    repo.expect_count().return_once(|| Ok(0));
    repo.expect_insert_first().times(1).return_once(|_| Ok(None));

    let err = service(repo, prefix_hasher())
        .initialize(Some(creds("admin", "secret")))
        .await
        .expect_err("already initialised");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), ALREADY_INITIALIZED_MESSAGE);
}

#[tokio::test]
async fn initialize_requires_credentials_on_an_empty_store() {
    let mut repo = MockUserRepository::new();
    repo.expect_count().return_once(|| Ok(0));

    let err = service(repo, MockPasswordHasher::new())
        .initialize(None)
        .await
        .expect_err("credentials missing");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.message(), INITIALIZE_MANDATORY_MESSAGE);
}

#[tokio::test]
async fn initialize_count_failure_is_a_store_error() {
    let mut repo = MockUserRepository::new();
    repo.expect_count()
        .return_once(|| Err(UserRepositoryError::query("relation missing")));

    let err = service(repo, MockPasswordHasher::new())
        .initialize(Some(creds("admin", "secret")))
        .await
        .expect_err("count fails");
    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), StoreOperation::ListUsers.message());
}

#[tokio::test]
async fn create_skips_uniqueness_by_default() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().never();
    repo.expect_insert()
        .times(1)
        .return_once(|account| Ok(stored("u-2", 1, account.clone())));

    service(repo, prefix_hasher())
        .create_user(creds("admin", "again"))
        .await
        .expect("duplicate usernames are allowed");
}

#[tokio::test]
async fn create_rejects_taken_usernames_when_enforced() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:x")))));
    repo.expect_insert().never();

    let err = service(repo, prefix_hasher())
        .with_unique_usernames(true)
        .create_user(creds("admin", "again"))
        .await
        .expect_err("username taken");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(
        err.details(),
        Some(&serde_json::json!([
            {"field": "username", "message": USERNAME_TAKEN_MESSAGE}
        ]))
    );
}

#[tokio::test]
async fn create_hash_failure_is_a_save_error() {
    let mut repo = MockUserRepository::new();
    repo.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Err(PasswordHashError::hash("worker lost")));

    let err = service(repo, hasher)
        .create_user(creds("admin", "secret"))
        .await
        .expect_err("hash fails");
    assert_eq!(err.message(), StoreOperation::SaveUser.message());
}

#[tokio::test]
async fn rename_keeps_the_password_hash() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(stored("u-1", 2, account("admin", "hashed:secret")))));
    repo.expect_save()
        .withf(|s| {
            s.revision == Revision::new(2)
                && s.record.username() == "root"
                && s.record.password_hash().as_str() == "hashed:secret"
        })
        .times(1)
        .return_once(|s| Ok(s.clone()));

    service(repo, MockPasswordHasher::new())
        .rename_user(&RecordId::new("u-1"), "root")
        .await
        .expect("rename succeeds");
}

#[tokio::test]
async fn rename_to_own_username_passes_uniqueness() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:x")))));
    repo.expect_find_by_username()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:x")))));
    repo.expect_save().times(1).return_once(|s| Ok(s.clone()));

    service(repo, MockPasswordHasher::new())
        .with_unique_usernames(true)
        .rename_user(&RecordId::new("u-1"), "admin")
        .await
        .expect("keeping the same name is allowed");
}

#[tokio::test]
async fn rename_of_unknown_user_fails_at_fetch() {
    let mut repo = MockUserRepository::new();
    repo.expect_find().return_once(|_| Ok(None));
    repo.expect_save().never();

    let err = service(repo, MockPasswordHasher::new())
        .rename_user(&RecordId::new("missing"), "root")
        .await
        .expect_err("unknown id");
    assert_eq!(err.message(), StoreOperation::FindUser.message());
}

#[tokio::test]
async fn change_password_rehashes_and_saves() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:old")))));
    repo.expect_save()
        .withf(|s| s.record.password_hash().as_str() == "hashed:new")
        .times(1)
        .return_once(|s| Ok(s.clone()));

    service(repo, prefix_hasher())
        .change_password(
            &RecordId::new("u-1"),
            Password::try_new("new").expect("valid password"),
        )
        .await
        .expect("change succeeds");
}

#[tokio::test]
async fn change_password_save_failure_names_the_operation() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(stored("u-1", 1, account("admin", "hashed:old")))));
    repo.expect_save()
        .return_once(|_| Err(UserRepositoryError::revision_mismatch(1_u64, 2_u64)));

    let err = service(repo, prefix_hasher())
        .change_password(
            &RecordId::new("u-1"),
            Password::try_new("new").expect("valid password"),
        )
        .await
        .expect_err("stale save");
    assert_eq!(err.message(), StoreOperation::ChangePassword.message());
}

#[tokio::test]
async fn delete_uses_the_fetched_revision() {
    let mut repo = MockUserRepository::new();
    repo.expect_find()
        .return_once(|_| Ok(Some(stored("u-7", 5, account("temp", "hashed:x")))));
    repo.expect_delete()
        .with(eq(RecordId::new("u-7")), eq(Revision::new(5)))
        .times(1)
        .return_once(|_, _| Ok(()));

    service(repo, MockPasswordHasher::new())
        .delete_user(&RecordId::new("u-7"))
        .await
        .expect("delete succeeds");
}
