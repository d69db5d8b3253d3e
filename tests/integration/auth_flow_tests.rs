use std::time::Duration;

use axum::http::{Method, StatusCode};
use kokupocket_backend_lib::auth::{
    AuthService, DefaultAuth, LockoutTracker, PasswordHasher, TokenError, TokenIssuer,
};
use kokupocket_backend_lib::error::AppError;
use kokupocket_backend_lib::storage::{FlatFileStorage, Storage};
use kokupocket_common::{LoginRequest, RefreshRequest, RegisterRequest};
use serde_json::json;
use tempfile::TempDir;

use crate::test_utils::{
    registration_body, send_json, setup_test_env, ACCESS_SECRET, GOOD_PASSWORD, REFRESH_SECRET,
};

fn auth_with_lock(dir: &TempDir, lock: Duration) -> DefaultAuth<FlatFileStorage> {
    DefaultAuth::new(
        FlatFileStorage::new(dir.path()).unwrap(),
        PasswordHasher::new(10).unwrap(),
        LockoutTracker::new(5, lock),
        TokenIssuer::new(ACCESS_SECRET.as_bytes(), REFRESH_SECRET.as_bytes()),
    )
}

fn register(matric: &str, ic: &str) -> RegisterRequest {
    RegisterRequest {
        name: Some("Nur Aisyah".to_string()),
        matric: Some(matric.to_string()),
        ic: Some(ic.to_string()),
        password: Some(GOOD_PASSWORD.to_string()),
        confirm_password: None,
    }
}

fn login(matric: &str, password: &str) -> LoginRequest {
    LoginRequest {
        matric: Some(matric.to_string()),
        password: Some(password.to_string()),
    }
}

#[tokio::test]
async fn test_register_login_and_verify() {
    let dir = TempDir::new().unwrap();
    let auth = auth_with_lock(&dir, Duration::from_secs(60));

    let registered = auth.register(register("A20EC0001", "123456789012")).await.unwrap();
    let logged_in = auth.login(login("A20EC0001", GOOD_PASSWORD)).await.unwrap();

    let claims = auth.verify_access_token(&logged_in.token).unwrap();
    assert_eq!(claims.id, registered.user_id);
    assert_eq!(claims.matric, "A20EC0001");
}

#[tokio::test]
async fn test_duplicate_registration_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let auth = auth_with_lock(&dir, Duration::from_secs(60));

    let first = auth.register(register("A20EC0001", "123456789012")).await.unwrap();

    let err = auth
        .register(register("A20EC0001", "999999999999"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateIdentifier));

    // Same IC under another matric is a duplicate too
    let err = auth
        .register(register("B20EC0002", "123456789012"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DuplicateIdentifier));

    let storage = FlatFileStorage::new(dir.path()).unwrap();
    let stored = storage.find_user_by_matric("A20EC0001").await.unwrap().unwrap();
    assert_eq!(stored.id, first.user_id);
    assert_eq!(stored.ic, "123456789012");
    assert!(storage.find_user_by_matric("B20EC0002").await.unwrap().is_none());
}

#[tokio::test]
async fn test_sixth_attempt_locked_even_with_correct_password() {
    let dir = TempDir::new().unwrap();
    let auth = auth_with_lock(&dir, Duration::from_millis(300));
    auth.register(register("A20EC0001", "123456789012")).await.unwrap();

    for _ in 0..5 {
        assert!(auth.login(login("A20EC0001", "Wr0ng!pass")).await.is_err());
    }

    let err = auth.login(login("A20EC0001", GOOD_PASSWORD)).await.unwrap_err();
    assert!(matches!(err, AppError::AccountLocked));

    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(auth.login(login("A20EC0001", GOOD_PASSWORD)).await.is_ok());
}

#[tokio::test]
async fn test_success_resets_failure_count() {
    let dir = TempDir::new().unwrap();
    let auth = auth_with_lock(&dir, Duration::from_secs(60));
    auth.register(register("A20EC0001", "123456789012")).await.unwrap();

    for _ in 0..4 {
        auth.login(login("A20EC0001", "Wr0ng!pass")).await.unwrap_err();
    }
    auth.login(login("A20EC0001", GOOD_PASSWORD)).await.unwrap();
    assert_eq!(auth.lockout().failed_attempts("A20EC0001"), 0);

    for _ in 0..4 {
        let err = auth.login(login("A20EC0001", "Wr0ng!pass")).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }
    let err = auth.login(login("A20EC0001", "Wr0ng!pass")).await.unwrap_err();
    assert!(matches!(err, AppError::AccountLocked));
}

#[tokio::test]
async fn test_refresh_yields_token_for_same_subject() {
    let dir = TempDir::new().unwrap();
    let auth = auth_with_lock(&dir, Duration::from_secs(60));
    let registered = auth.register(register("A20EC0001", "123456789012")).await.unwrap();
    let logged_in = auth.login(login("A20EC0001", GOOD_PASSWORD)).await.unwrap();

    let refreshed = auth
        .refresh(RefreshRequest {
            refresh_token: Some(logged_in.refresh_token.clone()),
        })
        .await
        .unwrap();
    let claims = auth.verify_access_token(&refreshed.token).unwrap();
    assert_eq!(claims.id, registered.user_id);

    // An access token is not a refresh token
    let err = auth
        .refresh(RefreshRequest {
            refresh_token: Some(logged_in.token),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Token(TokenError::InvalidSignature)));
}

#[tokio::test]
async fn test_http_register_and_login() {
    let (state, _temp_dir) = setup_test_env();

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/register",
        Some(registration_body("A20EC0001", "123456789012")),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["name"], "Nur Aisyah");
    let user_id = body["userId"].as_i64().unwrap();

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "matric": "A20EC0001", "password": GOOD_PASSWORD })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userId"], user_id);
    assert_eq!(body["matric"], "A20EC0001");
    assert!(body["refreshToken"].is_string());

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/refresh",
        Some(json!({ "refreshToken": body["refreshToken"] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let claims = state
        .auth
        .verify_access_token(body["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(claims.id, user_id);
}

#[tokio::test]
async fn test_http_error_shapes() {
    let (state, _temp_dir) = setup_test_env();

    let mut weak = registration_body("A20EC0001", "1234567890");
    weak["password"] = json!("password");
    weak["confirmPassword"] = json!("password");
    let (status, body) =
        send_json(&state, Method::POST, "/api/auth/register", Some(weak), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VAL_001");
    assert!(body["details"]["password"].is_string());
    assert_eq!(body["details"]["ic"], "IC must be 12 digits");

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "matric": "nobody", "password": "x" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "AUTH_002");
    assert_eq!(body["error"], "Invalid credentials");

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/refresh",
        Some(json!({})),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Refresh token required");

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/auth/refresh",
        Some(json!({ "refreshToken": "garbage" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");

    let (status, body) =
        send_json(&state, Method::POST, "/api/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn test_http_lockout_returns_429() {
    let (state, _temp_dir) = setup_test_env();
    send_json(
        &state,
        Method::POST,
        "/api/auth/register",
        Some(registration_body("A20EC0001", "123456789012")),
        None,
    )
    .await;

    let wrong = json!({ "matric": "A20EC0001", "password": "Wr0ng!pass" });
    for _ in 0..4 {
        let (status, _) =
            send_json(&state, Method::POST, "/api/auth/login", Some(wrong.clone()), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
    let (status, body) =
        send_json(&state, Method::POST, "/api/auth/login", Some(wrong), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "AUTH_003");

    let right = json!({ "matric": "A20EC0001", "password": GOOD_PASSWORD });
    let (status, _) = send_json(&state, Method::POST, "/api/auth/login", Some(right), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_http_unknown_matrics_stay_bounded() {
    let (state, _temp_dir) = setup_test_env();

    for i in 0..5 {
        let matric = format!("{i}{}", "x".repeat(4096));
        let (status, body) = send_json(
            &state,
            Method::POST,
            "/api/auth/login",
            Some(json!({ "matric": matric, "password": "Wr0ng!pass" })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid credentials");
    }

    assert_eq!(state.lockout.len(), 5);
    state.lockout.cleanup();
    assert_eq!(state.lockout.len(), 5);
    assert_eq!(
        state
            .lockout
            .failed_attempts(&format!("0{}", "x".repeat(19))),
        1
    );
}
