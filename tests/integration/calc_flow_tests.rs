use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use kokupocket_backend_lib::auth::AccessClaims;
use serde_json::{json, Value};

use crate::test_utils::{register_user, send_json, setup_test_env, ACCESS_SECRET};

fn components(kehadiran: u32, penilaian: u32, bonus: u32) -> Value {
    json!({
        "kehadiran": kehadiran,
        "penilaian": penilaian,
        "penglibatan": 10,
        "pencapaian": 20,
        "jawatan": 10,
        "bonus": bonus,
    })
}

#[tokio::test]
async fn test_calc_routes_require_bearer_token() {
    let (state, _temp_dir) = setup_test_env();

    for (method, uri) in [
        (Method::GET, "/api/calc/dashboard"),
        (Method::GET, "/api/calc/history"),
        (Method::POST, "/api/calc/calculate"),
        (Method::POST, "/api/calc/register-student"),
    ] {
        let (status, body) = send_json(&state, method, uri, Some(json!({})), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "AUTH_005", "{uri}");
    }

    let (status, body) = send_json(
        &state,
        Method::GET,
        "/api/calc/history",
        None,
        Some("not.a.token"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
}

#[tokio::test]
async fn test_expired_access_token_reported_as_expired() {
    let (state, _temp_dir) = setup_test_env();
    let now = Utc::now();
    let expired = encode(
        &Header::default(),
        &AccessClaims {
            id: 1,
            matric: "A20EC0001".to_string(),
            iat: (now - Duration::days(8)).timestamp(),
            exp: (now - Duration::days(1)).timestamp(),
        },
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = send_json(
        &state,
        Method::GET,
        "/api/calc/dashboard",
        None,
        Some(expired.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_EXPIRED");
}

#[tokio::test]
async fn test_empty_dashboard() {
    let (state, _temp_dir) = setup_test_env();
    let token = register_user(&state, "A20EC0001", "123456789012").await;

    let (status, body) =
        send_json(&state, Method::GET, "/api/calc/dashboard", None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["matric"], "A20EC0001");
    assert!(body["user"]["createdAt"].is_string());
    assert_eq!(body["registrations"], json!([]));
    assert_eq!(body["stats"]["totalCalculations"], 0);
    assert_eq!(body["stats"]["lowestScore"], 100.0);
    assert!(body["stats"]["lastCalculationDate"].is_null());
}

#[tokio::test]
async fn test_calculate_and_dashboard_stats() {
    let (state, _temp_dir) = setup_test_env();
    let token = register_user(&state, "A20EC0001", "123456789012").await;

    // 30 + 30 + 10 + 20 + 10 + 10 = 110
    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/calc/calculate",
        Some(components(30, 30, 10)),
        Some(token.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 110);
    assert_eq!(body["finalPercent"], 10.0);

    // 10 + 5 + 10 + 20 + 10 + 0 = 55
    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/calc/calculate",
        Some(components(10, 5, 0)),
        Some(token.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 55);
    assert_eq!(body["finalPercent"], 5.0);
    let newest_id = body["calculationId"].clone();

    let (status, body) =
        send_json(&state, Method::GET, "/api/calc/dashboard", None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stats"]["totalCalculations"], 2);
    assert_eq!(body["stats"]["highestScore"], 10.0);
    assert_eq!(body["stats"]["lowestScore"], 5.0);
    assert_eq!(body["stats"]["averageScore"], 7.5);
    assert_eq!(body["calculations"][0]["id"], newest_id);
    assert_eq!(body["calculations"][0]["kehadiran"], 10);

    let (status, body) =
        send_json(&state, Method::GET, "/api/calc/history", None, Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calculations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_calculate_requires_every_component() {
    let (state, _temp_dir) = setup_test_env();
    let token = register_user(&state, "A20EC0001", "123456789012").await;

    let mut partial = components(10, 10, 0);
    partial.as_object_mut().unwrap().remove("jawatan");

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/calc/calculate",
        Some(partial),
        Some(token.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields required");
}

#[tokio::test]
async fn test_student_registration_is_per_user() {
    let (state, _temp_dir) = setup_test_env();
    let alice = register_user(&state, "A20EC0001", "123456789012").await;
    let bob = register_user(&state, "B20EC0002", "210987654321").await;

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/calc/register-student",
        Some(json!({ "name": "Siti <b>", "matric": "S1234", "ic": "111122223333" })),
        Some(alice.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["name"].is_string());

    let (status, body) = send_json(
        &state,
        Method::POST,
        "/api/calc/register-student",
        Some(json!({ "name": "Siti Aminah", "matric": "S1234", "ic": "111122223333" })),
        Some(alice.as_str()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["registrationId"].is_i64());

    let (_, body) =
        send_json(&state, Method::GET, "/api/calc/dashboard", None, Some(alice.as_str())).await;
    assert_eq!(body["registrations"].as_array().unwrap().len(), 1);
    assert_eq!(body["registrations"][0]["name"], "Siti Aminah");

    let (_, body) = send_json(&state, Method::GET, "/api/calc/dashboard", None, Some(bob.as_str())).await;
    assert_eq!(body["registrations"], json!([]));
}
