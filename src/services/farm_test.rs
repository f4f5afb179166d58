use super::*;
use crate::error::ErrorCode;

fn input() -> FarmInput {
    FarmInput {
        name: "Green Acres".into(),
        location: "Nashik, Maharashtra".into(),
        area_hectares: Some(2.5),
        certification_type: Some("NPOP Organic".into()),
    }
}

#[test]
fn valid_farm_passes_through() {
    let valid = input().validate().unwrap();
    assert_eq!(valid.name, "Green Acres");
    assert_eq!(valid.area_hectares, Some(2.5));
    assert_eq!(valid.certification_type.as_deref(), Some("NPOP Organic"));
}

#[test]
fn name_and_location_are_required() {
    let mut farm = input();
    farm.name = " ".into();
    assert_eq!(farm.validate().unwrap_err().field, "name");

    let mut farm = input();
    farm.location = String::new();
    assert_eq!(farm.validate().unwrap_err().field, "location");
}

#[test]
fn negative_or_nan_area_is_rejected() {
    let mut farm = input();
    farm.area_hectares = Some(-1.0);
    assert_eq!(farm.validate().unwrap_err().field, "area_hectares");

    farm.area_hectares = Some(f64::NAN);
    assert_eq!(farm.validate().unwrap_err().field, "area_hectares");
}

#[test]
fn area_is_optional_and_zero_is_allowed() {
    let mut farm = input();
    farm.area_hectares = None;
    assert!(farm.validate().is_ok());
    farm.area_hectares = Some(0.0);
    assert!(farm.validate().is_ok());
}

#[test]
fn blank_certification_becomes_none() {
    let mut farm = input();
    farm.certification_type = Some("   ".into());
    assert_eq!(farm.validate().unwrap().certification_type, None);
}

#[test]
fn not_found_maps_to_404() {
    let err = FarmError::NotFound(Uuid::nil());
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(err.error_code(), "E_FARM_NOT_FOUND");
}
