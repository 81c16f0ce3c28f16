use nexin_api::error::ApiError;
use nexin_api::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};
use nexin_api::usecase::token::{RefreshTokenUseCase, validate_access_token};

use crate::helpers::{MockUserRepo, TEST_JWT_SECRET, test_user};

// ── Login ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_login_with_username_and_record_last_login() {
    let user = test_user("alice", "hunter2");
    let before_update = user.updated_at;

    let users = MockUserRepo::new(vec![user.clone()]);
    let users_handle = users.users_handle();

    let uc = LoginUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc
        .execute(LoginInput {
            username: "alice".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
    assert!(out.user.last_login_at.is_some());
    assert_eq!(validate_access_token(&out.tokens.access, TEST_JWT_SECRET).unwrap(), user.id);

    // A login stamps last_login_at but is not a profile edit.
    let stored = users_handle.lock().unwrap();
    let stored = stored.iter().find(|u| u.id == user.id).unwrap();
    assert!(stored.last_login_at.is_some());
    assert_eq!(stored.updated_at, before_update, "updated_at must not move on login");
}

#[tokio::test]
async fn should_login_with_email() {
    let user = test_user("bob", "hunter2");

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc
        .execute(LoginInput {
            username: "bob@example.com".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert_eq!(out.user.id, user.id);
}

#[tokio::test]
async fn should_reject_wrong_password() {
    let user = test_user("alice", "hunter2");

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: "alice".to_owned(),
            password: "wrong".to_owned(),
        })
        .await;

    assert!(
        matches!(result, Err(ApiError::InvalidCredentials)),
        "expected InvalidCredentials, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_unknown_user() {
    let uc = LoginUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: "nobody".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidCredentials)));
}

#[tokio::test]
async fn should_reveal_disabled_account_only_with_correct_password() {
    let mut user = test_user("carol", "hunter2");
    user.is_active = false;

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: "carol".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::AccountDisabled)),
        "correct password against a disabled account must say so, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_reveal_disabled_account_on_wrong_password() {
    let mut user = test_user("carol", "hunter2");
    user.is_active = false;

    let uc = LoginUseCase {
        users: MockUserRepo::new(vec![user]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(LoginInput {
            username: "carol".to_owned(),
            password: "wrong".to_owned(),
        })
        .await;
    assert!(
        matches!(result, Err(ApiError::InvalidCredentials)),
        "wrong password must not leak the disabled state, got {result:?}"
    );
}

// ── Register ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_register_new_user_with_hashed_password() {
    let users = MockUserRepo::empty();
    let users_handle = users.users_handle();

    let uc = RegisterUseCase {
        users,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let out = uc
        .execute(RegisterInput {
            email: "dave@example.com".to_owned(),
            username: "dave".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    assert!(out.user.is_active);
    assert!(out.user.last_login_at.is_none());

    let stored = users_handle.lock().unwrap();
    assert_eq!(stored.len(), 1);
    assert_ne!(stored[0].password_hash, "hunter2", "password must never be stored raw");
    assert!(stored[0].password_hash.starts_with("$argon2"));
}

#[tokio::test]
async fn should_reject_duplicate_email() {
    let existing = test_user("eve", "hunter2");

    let uc = RegisterUseCase {
        users: MockUserRepo::new(vec![existing]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(RegisterInput {
            email: "eve@example.com".to_owned(),
            username: "eve2".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::EmailTaken)));
}

#[tokio::test]
async fn should_reject_duplicate_username() {
    let existing = test_user("eve", "hunter2");

    let uc = RegisterUseCase {
        users: MockUserRepo::new(vec![existing]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(RegisterInput {
            email: "other@example.com".to_owned(),
            username: "eve".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::UsernameTaken)));
}

#[tokio::test]
async fn should_reject_register_without_at_sign_in_email() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(RegisterInput {
            email: "not-an-email".to_owned(),
            username: "frank".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::InvalidEmail)));
}

#[tokio::test]
async fn should_reject_register_with_empty_password() {
    let uc = RegisterUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };

    let result = uc
        .execute(RegisterInput {
            email: "gina@example.com".to_owned(),
            username: "gina".to_owned(),
            password: String::new(),
        })
        .await;

    assert!(matches!(result, Err(ApiError::MissingData)));
}

// ── Refresh ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_exchange_refresh_token_for_new_access_token() {
    let user = test_user("henry", "hunter2");

    let login = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let session = login
        .execute(LoginInput {
            username: "henry".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    let refresh = RefreshTokenUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let out = refresh.execute(&session.tokens.refresh).await.unwrap();

    assert_eq!(
        validate_access_token(&out.access_token, TEST_JWT_SECRET).unwrap(),
        user.id
    );
}

#[tokio::test]
async fn should_reject_garbage_refresh_token() {
    let refresh = RefreshTokenUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let result = refresh.execute("not-a-jwt").await;
    assert!(matches!(result, Err(ApiError::InvalidRefreshToken)));
}

#[tokio::test]
async fn should_reject_refresh_for_deleted_user() {
    let user = test_user("iris", "hunter2");

    let login = LoginUseCase {
        users: MockUserRepo::new(vec![user.clone()]),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let session = login
        .execute(LoginInput {
            username: "iris".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    // User is gone by the time the refresh arrives.
    let refresh = RefreshTokenUseCase {
        users: MockUserRepo::empty(),
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let result = refresh.execute(&session.tokens.refresh).await;
    assert!(matches!(result, Err(ApiError::InvalidRefreshToken)));
}
