use super::*;
use crate::error::ErrorCode;

fn new_profile(full_name: &str, role: &str) -> NewProfile {
    NewProfile { full_name: full_name.into(), role: role.into(), phone: None, address: None }
}

#[test]
fn onboarding_requires_name_and_role() {
    let err = new_profile("  ", "farmer").validate().unwrap_err();
    assert_eq!(err.field, "full_name");

    let err = new_profile("Asha", "admin").validate().unwrap_err();
    assert_eq!(err.field, "role");
}

#[test]
fn onboarding_normalizes_fields() {
    let mut input = new_profile("  Asha Patil ", "Farmer");
    input.phone = Some(" ".into());
    input.address = Some(" Nashik ".into());
    let valid = input.validate().unwrap();
    assert_eq!(valid.full_name, "Asha Patil");
    assert_eq!(valid.role, UserRole::Farmer);
    assert_eq!(valid.phone, None);
    assert_eq!(valid.address.as_deref(), Some("Nashik"));
}

#[test]
fn onboarding_validates_optional_phone() {
    let mut input = new_profile("Asha", "consumer");
    input.phone = Some("123".into());
    assert_eq!(input.validate().unwrap_err().field, "phone");
}

#[test]
fn kyc_requires_name_and_phone() {
    let kyc = KycSubmission { full_name: "Ravi".into(), phone: String::new(), email: None, address: None };
    assert_eq!(kyc.validate().unwrap_err().field, "phone");

    let kyc = KycSubmission { full_name: String::new(), phone: "9876543210".into(), email: None, address: None };
    assert_eq!(kyc.validate().unwrap_err().field, "full_name");
}

#[test]
fn kyc_normalizes_email() {
    let kyc = KycSubmission {
        full_name: "Ravi Kumar".into(),
        phone: "+91 98765 43210".into(),
        email: Some(" Ravi@Example.IN ".into()),
        address: None,
    };
    let valid = kyc.validate().unwrap();
    assert_eq!(valid.email.as_deref(), Some("ravi@example.in"));
    assert_eq!(valid.phone, "+91 98765 43210");
}

#[test]
fn kyc_rejects_bad_email() {
    let kyc = KycSubmission {
        full_name: "Ravi".into(),
        phone: "9876543210".into(),
        email: Some("not-an-email".into()),
        address: None,
    };
    assert_eq!(kyc.validate().unwrap_err().field, "email");
}

#[test]
fn errors_map_to_statuses() {
    assert_eq!(ProfileError::NotFound.status(), StatusCode::NOT_FOUND);
    assert_eq!(ProfileError::NotFound.message_key(), "error_profile_required");
    assert_eq!(ProfileError::AlreadyExists.status(), StatusCode::CONFLICT);
    assert_eq!(ProfileError::Invalid(FieldError::new("role", "unknown role")).status(), StatusCode::BAD_REQUEST);
}
