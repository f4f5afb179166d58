use super::*;
use crate::error::ErrorCode;

#[test]
fn normalize_email_accepts_basic_address() {
    assert_eq!(normalize_email("  Grower@Example.com "), Some("grower@example.com".to_owned()));
}

#[test]
fn normalize_email_rejects_invalid_values() {
    assert_eq!(normalize_email(""), None);
    assert_eq!(normalize_email("grower"), None);
    assert_eq!(normalize_email("@example.com"), None);
    assert_eq!(normalize_email("grower@"), None);
    assert_eq!(normalize_email("a@b@c"), None);
}

#[test]
fn normalize_code_accepts_upper_and_normalizes() {
    let code = generate_access_code();
    assert_eq!(normalize_code(&code), Some(code.clone()));
    assert_eq!(normalize_code(" abc234 "), Some("ABC234".to_owned()));
}

#[test]
fn normalize_code_rejects_bad_shapes() {
    assert_eq!(normalize_code("abc23"), None);
    assert_eq!(normalize_code("abc2345"), None);
    // 0, 1, I and O are excluded from the alphabet.
    assert_eq!(normalize_code("ABC1I0"), None);
    assert_eq!(normalize_code("ABC23!"), None);
}

#[test]
fn generate_access_code_shape() {
    for _ in 0..32 {
        let code = generate_access_code();
        assert_eq!(code.len(), CODE_LEN);
        assert!(code.bytes().all(|c| CODE_ALPHABET.contains(&c)));
    }
}

#[test]
fn hash_access_code_is_stable_hex() {
    let a = hash_access_code("ABC234");
    assert_eq!(a, hash_access_code("ABC234"));
    assert_ne!(a, hash_access_code("ABC235"));
    assert_eq!(a.len(), 64);
}

#[test]
fn errors_map_to_statuses() {
    assert_eq!(EmailAuthError::InvalidEmail.status(), StatusCode::BAD_REQUEST);
    assert_eq!(EmailAuthError::InvalidCode.status(), StatusCode::BAD_REQUEST);
    assert_eq!(EmailAuthError::VerificationFailed.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(EmailAuthError::VerificationFailed.message_key(), "error_login_failed");
    assert_eq!(
        EmailAuthError::Db(sqlx::Error::RowNotFound).status(),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
