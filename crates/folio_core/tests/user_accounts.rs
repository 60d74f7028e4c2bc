use folio_core::db::open_db_in_memory;
use folio_core::repo::user_repo::set_user_active;
use folio_core::{
    check_credentials, AuthError, AuthService, NewAccount, Profile, RegisterRequest, Role,
    ServiceError, SqliteUserRepository, TokenSigner, UserRepository,
};
use rusqlite::Connection;

const TEST_COST: u32 = 4;

fn service(conn: &Connection) -> AuthService<SqliteUserRepository<'_>> {
    let signer = TokenSigner::new("test-secret", 7).unwrap();
    AuthService::new(SqliteUserRepository::new(conn), signer, TEST_COST)
}

fn register_request(username: &str, email: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: email.to_string(),
        password: "s3cret-pass".to_string(),
        first_name: Some("Jane".to_string()),
        last_name: None,
    }
}

#[test]
fn register_creates_regular_user_with_hashed_password() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);

    let result = auth
        .register(register_request("jane", "Jane@Example.com"))
        .unwrap();
    assert_eq!(result.user.role, Role::User);
    assert_eq!(result.user.email, "jane@example.com");
    assert_ne!(result.user.password_hash, "s3cret-pass");
    assert!(result.user.password_hash.starts_with("$2"));
    assert!(!result.token.is_empty());
}

#[test]
fn register_rejects_duplicate_username_or_email() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    auth.register(register_request("jane", "jane@example.com"))
        .unwrap();

    let same_email = auth
        .register(register_request("other", "JANE@example.com"))
        .unwrap_err();
    assert!(matches!(same_email, ServiceError::Conflict(_)));

    let same_username = auth
        .register(register_request("JANE", "new@example.com"))
        .unwrap_err();
    assert!(matches!(same_username, ServiceError::Conflict(_)));
}

#[test]
fn register_rejects_short_password() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let mut request = register_request("jane", "jane@example.com");
    request.password = "123".to_string();

    let err = auth.register(request).unwrap_err();
    match err {
        ServiceError::Validation(validation) => assert_eq!(validation.field, "password"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn login_succeeds_and_records_last_login() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let admin = auth
        .create_admin("admin", "admin@portfolio.com", "admin123", Profile::default())
        .unwrap();
    assert!(admin.last_login.is_none());

    let login = auth.login(" ADMIN@portfolio.com ", "admin123").unwrap();
    assert_eq!(login.user.id, admin.id);
    assert_eq!(login.user.role, Role::Admin);
    assert!(login.user.last_login.is_some());

    let authenticated = auth.authenticate(&login.token).unwrap();
    assert_eq!(authenticated.id, admin.id);
}

#[test]
fn login_failures_are_indistinguishable() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let user = auth
        .register(register_request("jane", "jane@example.com"))
        .unwrap()
        .user;

    let unknown = auth.login("nobody@example.com", "s3cret-pass").unwrap_err();
    let wrong = auth.login("jane@example.com", "wrong-pass").unwrap_err();
    assert!(matches!(unknown, ServiceError::InvalidCredentials));
    assert!(matches!(wrong, ServiceError::InvalidCredentials));

    set_user_active(&conn, user.id, false).unwrap();
    let inactive = auth.login("jane@example.com", "s3cret-pass").unwrap_err();
    assert!(matches!(inactive, ServiceError::InvalidCredentials));
}

#[test]
fn unknown_email_still_runs_a_bcrypt_verification() {
    // Cost 3 is below bcrypt's minimum, so reaching bcrypt surfaces as a
    // hashing error instead of a plain credential failure.
    let err = check_credentials(None, "s3cret-pass", 3).unwrap_err();
    assert!(matches!(err, ServiceError::Auth(AuthError::Hashing(_))));

    let err = check_credentials(None, "s3cret-pass", TEST_COST).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));
}

#[test]
fn staged_login_matches_single_call_login() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let account = NewAccount::from_registration(
        register_request("jane", "jane@example.com"),
        TEST_COST,
    )
    .unwrap();
    let registered = auth.register_prepared(account).unwrap();
    assert_eq!(registered.user.role, Role::User);

    let candidate = auth.login_candidate("JANE@example.com ").unwrap();
    let user_id = check_credentials(candidate.as_ref(), "s3cret-pass", TEST_COST).unwrap();
    assert_eq!(user_id, registered.user.id);

    let logged_in = auth.complete_login(user_id).unwrap();
    assert!(logged_in.user.last_login.is_some());
    assert_eq!(auth.authenticate(&logged_in.token).unwrap().id, user_id);
}

#[test]
fn staged_login_refuses_an_account_deactivated_after_the_password_check() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    auth.register(register_request("jane", "jane@example.com"))
        .unwrap();

    let candidate = auth.login_candidate("jane@example.com").unwrap();
    let user_id = check_credentials(candidate.as_ref(), "s3cret-pass", TEST_COST).unwrap();
    set_user_active(&conn, user_id, false).unwrap();

    let err = auth.complete_login(user_id).unwrap_err();
    assert!(matches!(err, ServiceError::InvalidCredentials));
}

#[test]
fn authenticate_rejects_tokens_for_deactivated_users() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let registered = auth
        .register(register_request("jane", "jane@example.com"))
        .unwrap();

    set_user_active(&conn, registered.user.id, false).unwrap();
    let err = auth.authenticate(&registered.token).unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Unauthorized(AuthError::InvalidToken)
    ));
}

#[test]
fn update_profile_replaces_fields() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    let user = auth
        .register(register_request("jane", "jane@example.com"))
        .unwrap()
        .user;

    let updated = auth
        .update_profile(
            user.id,
            Profile {
                first_name: Some("Janet".to_string()),
                last_name: Some(" Doe ".to_string()),
                bio: Some("Rust developer".to_string()),
            },
        )
        .unwrap();
    assert_eq!(updated.profile.first_name.as_deref(), Some("Janet"));
    assert_eq!(updated.profile.last_name.as_deref(), Some("Doe"));
    assert_eq!(updated.profile.bio.as_deref(), Some("Rust developer"));

    let too_long = auth
        .update_profile(
            user.id,
            Profile {
                bio: Some("x".repeat(501)),
                ..Profile::default()
            },
        )
        .unwrap_err();
    assert!(matches!(too_long, ServiceError::Validation(_)));
}

#[test]
fn repository_counts_users() {
    let conn = open_db_in_memory().unwrap();
    let auth = service(&conn);
    auth.register(register_request("one", "one@example.com"))
        .unwrap();
    auth.register(register_request("two", "two@example.com"))
        .unwrap();

    let repo = SqliteUserRepository::new(&conn);
    assert_eq!(repo.count_users().unwrap(), 2);
    assert!(repo.find_by_email("ONE@example.com").unwrap().is_some());
}
