use super::*;
use jsonwebtoken::{EncodingKey, Header, encode};

fn mint(claims: &serde_json::Value) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(b"backend-secret")).unwrap()
}

#[test]
fn decodes_role_and_user_id() {
    let token = mint(&serde_json::json!({ "sub": "kari@example.com", "role": "USER", "userId": 42 }));
    let claims = decode_claims_at(&token, 0).unwrap();
    assert_eq!(claims.role, Role::User);
    assert_eq!(claims.user_id.as_deref(), Some("42"));
    assert_eq!(claims.expires_at, None);
}

#[test]
fn accepts_snake_case_user_id_string() {
    let token = mint(&serde_json::json!({ "role": "ROLE_ADMIN", "user_id": "u-7" }));
    let claims = decode_claims_at(&token, 0).unwrap();
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.user_id.as_deref(), Some("u-7"));
}

#[test]
fn signature_is_not_checked() {
    let token = encode(
        &Header::default(),
        &serde_json::json!({ "role": "SUPERADMIN" }),
        &EncodingKey::from_secret(b"some-other-key"),
    )
    .unwrap();
    assert_eq!(decode_claims_at(&token, 0).unwrap().role, Role::SuperAdmin);
}

#[test]
fn expired_token_is_rejected() {
    let token = mint(&serde_json::json!({ "role": "USER", "exp": 1_000 }));
    let err = decode_claims_at(&token, 2_000).unwrap_err();
    assert!(matches!(err, TokenError::Expired { expired_at: 1_000 }));
}

#[test]
fn token_valid_before_expiry() {
    let token = mint(&serde_json::json!({ "role": "USER", "exp": 5_000 }));
    let claims = decode_claims_at(&token, 4_999).unwrap();
    assert_eq!(claims.expires_at, Some(5_000));
}

#[test]
fn missing_role_is_rejected() {
    let token = mint(&serde_json::json!({ "sub": "nobody" }));
    assert!(matches!(decode_claims_at(&token, 0), Err(TokenError::MissingRole)));
}

#[test]
fn unknown_role_is_rejected() {
    let token = mint(&serde_json::json!({ "role": "GUEST" }));
    assert!(matches!(decode_claims_at(&token, 0), Err(TokenError::UnknownRole(_))));
}

#[test]
fn garbage_is_malformed() {
    assert!(matches!(decode_claims_at("not-a-token", 0), Err(TokenError::Malformed(_))));
    assert!(matches!(decode_claims_at("", 0), Err(TokenError::Malformed(_))));
}
