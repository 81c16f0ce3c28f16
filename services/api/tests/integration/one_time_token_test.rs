use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use nexin_api::domain::types::OneTimeToken;
use nexin_api::error::ApiError;
use nexin_api::usecase::one_time_token::{
    IssueOneTimeTokenUseCase, OneTimeTokenClaims, ValidateOneTimeTokenUseCase,
};

use crate::helpers::{
    MockAppRepo, MockOneTimeTokenRepo, MockUserRepo, TEST_JWT_SECRET, test_app, test_user,
};

fn issue_uc(
    apps: MockAppRepo,
    tokens: MockOneTimeTokenRepo,
) -> IssueOneTimeTokenUseCase<MockAppRepo, MockOneTimeTokenRepo> {
    IssueOneTimeTokenUseCase {
        apps,
        tokens,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

fn validate_uc(
    users: MockUserRepo,
    tokens: MockOneTimeTokenRepo,
) -> ValidateOneTimeTokenUseCase<MockUserRepo, MockOneTimeTokenRepo> {
    ValidateOneTimeTokenUseCase {
        users,
        tokens,
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    }
}

/// Sign claims directly, bypassing the issue flow, for expiry edge cases.
fn sign_claims(claims: &OneTimeTokenClaims, secret: &str) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

// ── Issue ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_issue_token_with_sixty_second_window() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let tokens = MockOneTimeTokenRepo::empty();
    let rows = tokens.rows_handle();

    let uc = issue_uc(MockAppRepo::new(vec![app.clone()], vec![]), tokens);
    let out = uc.execute(user.id, app.id).await.unwrap();

    assert_eq!(out.expires_in, 60);
    assert!(!out.token.is_empty());

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1, "expected exactly one outstanding row");
    assert_eq!(rows[0].user_id, user.id);
    assert_eq!(rows[0].app_id, app.id);
    assert!(rows[0].expires_at > Utc::now());
    assert!(rows[0].expires_at <= Utc::now() + Duration::seconds(61));
}

#[tokio::test]
async fn should_reject_issue_for_unknown_app() {
    let user = test_user("alice", "hunter2");

    let uc = issue_uc(MockAppRepo::empty(), MockOneTimeTokenRepo::empty());
    let result = uc.execute(user.id, Uuid::new_v4()).await;

    assert!(matches!(result, Err(ApiError::AppNotFound)));
}

#[tokio::test]
async fn should_supersede_outstanding_token_for_same_user_and_app() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let tokens = MockOneTimeTokenRepo::empty();
    let rows = tokens.rows_handle();

    let uc = issue_uc(MockAppRepo::new(vec![app.clone()], vec![]), tokens);
    uc.execute(user.id, app.id).await.unwrap();
    uc.execute(user.id, app.id).await.unwrap();

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 1, "reissue must leave exactly one row, never two");
}

#[tokio::test]
async fn should_keep_tokens_for_distinct_apps_independent() {
    let user = test_user("alice", "hunter2");
    let app_a = test_app("game-a", user.id);
    let app_b = test_app("game-b", user.id);

    let tokens = MockOneTimeTokenRepo::empty();
    let rows = tokens.rows_handle();

    let uc = issue_uc(
        MockAppRepo::new(vec![app_a.clone(), app_b.clone()], vec![]),
        tokens,
    );
    uc.execute(user.id, app_a.id).await.unwrap();
    uc.execute(user.id, app_b.id).await.unwrap();

    let rows = rows.lock().unwrap();
    assert_eq!(rows.len(), 2, "one outstanding token per (user, app) pair");
}

// ── Validate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_validate_token_exactly_once() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let store = MockOneTimeTokenRepo::empty();
    let rows = store.rows_handle();

    // Issue and validate share the same row store.
    let issue = issue_uc(MockAppRepo::new(vec![app.clone()], vec![]), store);
    let out = issue.execute(user.id, app.id).await.unwrap();

    let validate = validate_uc(
        MockUserRepo::new(vec![user.clone()]),
        MockOneTimeTokenRepo { rows: rows.clone() },
    );

    let first = validate.execute(&out.token).await.unwrap();
    assert_eq!(first.user_id, user.id);
    assert_eq!(first.username, "alice");
    assert_eq!(first.app_id, app.id);
    assert!(rows.lock().unwrap().is_empty(), "row must be consumed");

    let second = validate.execute(&out.token).await;
    assert!(
        matches!(second, Err(ApiError::TokenAlreadyUsed)),
        "replay must fail, got {second:?}"
    );
}

#[tokio::test]
async fn should_invalidate_superseded_token_and_honor_replacement() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let store = MockOneTimeTokenRepo::empty();
    let rows = store.rows_handle();

    let issue = issue_uc(
        MockAppRepo::new(vec![app.clone()], vec![]),
        MockOneTimeTokenRepo { rows: rows.clone() },
    );
    let first = issue.execute(user.id, app.id).await.unwrap();
    let second = issue.execute(user.id, app.id).await.unwrap();

    let validate = validate_uc(
        MockUserRepo::new(vec![user.clone()]),
        MockOneTimeTokenRepo { rows: rows.clone() },
    );

    // The superseded token's row is gone even though its signature is valid.
    let result = validate.execute(&first.token).await;
    assert!(
        matches!(result, Err(ApiError::TokenAlreadyUsed)),
        "superseded token must be dead, got {result:?}"
    );

    // The replacement still works.
    let out = validate.execute(&second.token).await.unwrap();
    assert_eq!(out.user_id, user.id);
}

#[tokio::test]
async fn should_reject_empty_token() {
    let validate = validate_uc(MockUserRepo::empty(), MockOneTimeTokenRepo::empty());
    let result = validate.execute("").await;
    assert!(matches!(result, Err(ApiError::MissingToken)));
}

#[tokio::test]
async fn should_reject_garbage_token() {
    let validate = validate_uc(MockUserRepo::empty(), MockOneTimeTokenRepo::empty());
    let result = validate.execute("not-a-jwt").await;
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn should_reject_token_signed_with_other_secret() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let now = Utc::now();
    let claims = OneTimeTokenClaims {
        jti: "a".repeat(43),
        user_id: user.id,
        app_id: app.id,
        iat: now.timestamp() as u64,
        exp: (now + Duration::seconds(60)).timestamp() as u64,
    };
    let forged = sign_claims(&claims, "other-secret");

    let validate = validate_uc(
        MockUserRepo::new(vec![user]),
        MockOneTimeTokenRepo::empty(),
    );
    let result = validate.execute(&forged).await;
    assert!(matches!(result, Err(ApiError::InvalidToken)));
}

#[tokio::test]
async fn should_report_expired_signature_as_expired() {
    let user = test_user("alice", "hunter2");

    let now = Utc::now();
    let claims = OneTimeTokenClaims {
        jti: "a".repeat(43),
        user_id: user.id,
        app_id: Uuid::new_v4(),
        iat: (now - Duration::seconds(120)).timestamp() as u64,
        exp: (now - Duration::seconds(60)).timestamp() as u64,
    };
    let stale = sign_claims(&claims, TEST_JWT_SECRET);

    let validate = validate_uc(
        MockUserRepo::new(vec![user]),
        MockOneTimeTokenRepo::empty(),
    );
    let result = validate.execute(&stale).await;
    assert!(
        matches!(result, Err(ApiError::TokenExpired)),
        "an expired signature must not report as already-used, got {result:?}"
    );
}

#[tokio::test]
async fn should_reap_expired_row_and_report_expired() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    // Signature still live, backing row past its expiry.
    let now = Utc::now();
    let jti = "b".repeat(43);
    let claims = OneTimeTokenClaims {
        jti: jti.clone(),
        user_id: user.id,
        app_id: app.id,
        iat: now.timestamp() as u64,
        exp: (now + Duration::seconds(60)).timestamp() as u64,
    };
    let token = sign_claims(&claims, TEST_JWT_SECRET);

    let store = MockOneTimeTokenRepo::new(vec![OneTimeToken {
        jti,
        user_id: user.id,
        app_id: app.id,
        expires_at: now - Duration::seconds(1),
    }]);
    let rows = store.rows_handle();

    let validate = validate_uc(MockUserRepo::new(vec![user]), store);
    let result = validate.execute(&token).await;

    assert!(matches!(result, Err(ApiError::TokenExpired)));
    assert!(
        rows.lock().unwrap().is_empty(),
        "expired row must be reaped by the failed validation"
    );
}

// ── End to end ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_run_full_register_login_issue_validate_flow() {
    use nexin_api::usecase::auth::{LoginInput, LoginUseCase, RegisterInput, RegisterUseCase};

    let user_store = MockUserRepo::empty();
    let users = user_store.users_handle();

    let register = RegisterUseCase {
        users: MockUserRepo { users: users.clone() },
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let registered = register
        .execute(RegisterInput {
            email: "player@example.com".to_owned(),
            username: "player".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();

    let login = LoginUseCase {
        users: MockUserRepo { users: users.clone() },
        jwt_secret: TEST_JWT_SECRET.to_owned(),
    };
    let session = login
        .execute(LoginInput {
            username: "player".to_owned(),
            password: "hunter2".to_owned(),
        })
        .await
        .unwrap();
    assert_eq!(session.user.id, registered.user.id);

    let app = test_app("game", session.user.id);
    let token_store = MockOneTimeTokenRepo::empty();
    let rows = token_store.rows_handle();

    let issue = issue_uc(MockAppRepo::new(vec![app.clone()], vec![]), token_store);
    let t1 = issue.execute(session.user.id, app.id).await.unwrap();
    let t2 = issue.execute(session.user.id, app.id).await.unwrap();

    let validate = validate_uc(
        MockUserRepo { users: users.clone() },
        MockOneTimeTokenRepo { rows: rows.clone() },
    );

    let stale = validate.execute(&t1.token).await;
    assert!(matches!(stale, Err(ApiError::TokenAlreadyUsed)));

    let out = validate.execute(&t2.token).await.unwrap();
    assert_eq!(out.user_id, session.user.id);
    assert_eq!(out.username, "player");
    assert_eq!(out.app_id, app.id);

    let replay = validate.execute(&t2.token).await;
    assert!(matches!(replay, Err(ApiError::TokenAlreadyUsed)));
    assert!(rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_reject_token_whose_user_is_gone() {
    let user = test_user("alice", "hunter2");
    let app = test_app("game", user.id);

    let store = MockOneTimeTokenRepo::empty();
    let rows = store.rows_handle();

    let issue = issue_uc(MockAppRepo::new(vec![app.clone()], vec![]), store);
    let out = issue.execute(user.id, app.id).await.unwrap();

    // The account was deleted between issuance and validation.
    let validate = validate_uc(
        MockUserRepo::empty(),
        MockOneTimeTokenRepo { rows: rows.clone() },
    );
    let result = validate.execute(&out.token).await;
    assert!(matches!(result, Err(ApiError::TokenAlreadyUsed)));
}
