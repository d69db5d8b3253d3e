use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use kokupocket_backend_lib::auth::{AccessClaims, TokenError, TokenIssuer, TokenKind};

use crate::test_utils::{ACCESS_SECRET, REFRESH_SECRET};

fn issuer() -> TokenIssuer {
    TokenIssuer::new(ACCESS_SECRET.as_bytes(), REFRESH_SECRET.as_bytes())
}

#[test]
fn test_refresh_subject_matches_new_access_subject() {
    let issuer = issuer();
    let refresh = issuer.issue_refresh(12).unwrap();

    let subject = issuer.verify_subject(&refresh, TokenKind::Refresh).unwrap();
    let access = issuer.issue_access(subject, "A1234").unwrap();

    assert_eq!(issuer.verify_access(&access).unwrap().id, 12);
}

#[test]
fn test_expired_differs_from_tampered() {
    let issuer = issuer();
    let now = Utc::now();

    let expired = encode(
        &Header::default(),
        &AccessClaims {
            id: 1,
            matric: "A1234".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        },
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap();
    assert_eq!(issuer.verify_access(&expired).unwrap_err(), TokenError::Expired);

    let forged = encode(
        &Header::default(),
        &AccessClaims {
            id: 1,
            matric: "A1234".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(1)).timestamp(),
        },
        &EncodingKey::from_secret(b"wrong-secret"),
    )
    .unwrap();
    assert_eq!(
        issuer.verify_access(&forged).unwrap_err(),
        TokenError::InvalidSignature
    );
}

#[test]
fn test_token_without_expiry_is_rejected() {
    #[derive(serde::Serialize)]
    struct NoExp {
        id: i64,
        matric: String,
        iat: i64,
    }

    let token = encode(
        &Header::default(),
        &NoExp {
            id: 1,
            matric: "A1234".to_string(),
            iat: Utc::now().timestamp(),
        },
        &EncodingKey::from_secret(ACCESS_SECRET.as_bytes()),
    )
    .unwrap();
    assert!(issuer().verify_access(&token).is_err());
}
