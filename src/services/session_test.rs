use super::*;

// =============================================================================
// bytes_to_hex
// =============================================================================

#[test]
fn bytes_to_hex_empty() {
    assert_eq!(bytes_to_hex(&[]), "");
}

#[test]
fn bytes_to_hex_leading_zero() {
    assert_eq!(bytes_to_hex(&[0x0a]), "0a");
}

#[test]
fn bytes_to_hex_multi_byte() {
    assert_eq!(bytes_to_hex(&[0xde, 0xad, 0xbe, 0xef]), "deadbeef");
}

// =============================================================================
// generate_token
// =============================================================================

#[test]
fn generate_token_is_64_hex_chars() {
    let token = generate_token();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn generate_token_two_calls_differ() {
    assert_ne!(generate_token(), generate_token());
}

// =============================================================================
// SessionUser
// =============================================================================

fn user(profile_id: Option<Uuid>, role: Option<UserRole>) -> SessionUser {
    SessionUser {
        user_id: Uuid::new_v4(),
        email: "grower@example.com".into(),
        profile_id,
        full_name: profile_id.map(|_| "Asha Patil".into()),
        role,
    }
}

#[test]
fn profile_requires_both_id_and_role() {
    let id = Uuid::new_v4();
    assert_eq!(user(Some(id), Some(UserRole::Farmer)).profile(), Some((id, UserRole::Farmer)));
    assert_eq!(user(None, None).profile(), None);
    assert_eq!(user(Some(id), None).profile(), None);
}

#[test]
fn session_user_serializes_role_in_snake_case() {
    let json = serde_json::to_value(user(Some(Uuid::nil()), Some(UserRole::Distributor))).unwrap();
    assert_eq!(json["role"], "distributor");
    assert_eq!(json["email"], "grower@example.com");
}

#[test]
fn session_user_without_profile_serializes_nulls() {
    let json = serde_json::to_value(user(None, None)).unwrap();
    assert!(json["profile_id"].is_null());
    assert!(json["role"].is_null());
}
