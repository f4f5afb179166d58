use std::collections::HashSet;

use super::*;
use crate::domain::{BatchStatus, UserRole};

// =============================================================================
// Locale
// =============================================================================

#[test]
fn locale_parse_accepts_codes_and_region_tags() {
    assert_eq!(Locale::parse("en"), Some(Locale::En));
    assert_eq!(Locale::parse("hi-IN"), Some(Locale::Hi));
    assert_eq!(Locale::parse("mr_IN"), Some(Locale::Mr));
    assert_eq!(Locale::parse(" HI "), Some(Locale::Hi));
    assert_eq!(Locale::parse("fr"), None);
    assert_eq!(Locale::parse(""), None);
}

#[test]
fn locale_codes_round_trip() {
    for locale in Locale::ALL {
        assert_eq!(Locale::parse(locale.code()), Some(locale));
    }
}

// =============================================================================
// Tables
// =============================================================================

#[test]
fn english_table_has_no_duplicate_keys() {
    let mut seen = HashSet::new();
    for (key, _) in EN {
        assert!(seen.insert(*key), "duplicate key {key}");
    }
}

#[test]
fn every_translated_key_exists_in_english() {
    let english: HashSet<&str> = EN.iter().map(|(k, _)| *k).collect();
    for (key, _) in HI.iter().chain(MR.iter()) {
        assert!(english.contains(key), "{key} has no English source");
    }
}

#[test]
fn hindi_and_marathi_cover_english() {
    for locale in [Locale::Hi, Locale::Mr] {
        let keys: HashSet<&str> = locale.entries().iter().map(|(k, _)| *k).collect();
        for (key, _) in EN {
            assert!(keys.contains(key), "{} is missing {key}", locale.code());
        }
    }
}

#[test]
fn status_and_role_labels_are_translated() {
    for status in BatchStatus::ALL {
        assert_ne!(translate(Locale::En, status.label_key()), status.label_key());
    }
    for role in [UserRole::Farmer, UserRole::Distributor, UserRole::Consumer] {
        assert_ne!(translate(Locale::Mr, role.label_key()), role.label_key());
    }
}

#[test]
fn translate_returns_locale_text() {
    assert_eq!(translate(Locale::En, "dashboard"), "Dashboard");
    assert_eq!(translate(Locale::Hi, "dashboard"), "डैशबोर्ड");
    assert_eq!(translate(Locale::Mr, "dashboard"), "डॅशबोर्ड");
}

#[test]
fn translate_falls_back_to_key_when_unknown() {
    assert_eq!(translate(Locale::Hi, "no_such_key"), "no_such_key");
}

#[test]
fn table_contains_every_english_key() {
    let hi = table(Locale::Hi);
    assert_eq!(hi.len(), EN.len());
    assert_eq!(hi.get("submit"), Some(&"जमा करें"));
}

// =============================================================================
// Negotiation
// =============================================================================

#[test]
fn accept_language_picks_highest_quality_supported() {
    assert_eq!(from_accept_language("fr-FR, mr;q=0.5, hi;q=0.9"), Some(Locale::Hi));
    assert_eq!(from_accept_language("de, en-GB;q=0.3"), Some(Locale::En));
}

#[test]
fn accept_language_keeps_header_order_for_ties() {
    assert_eq!(from_accept_language("mr, hi"), Some(Locale::Mr));
}

#[test]
fn accept_language_ignores_zero_quality_and_garbage() {
    assert_eq!(from_accept_language("hi;q=0"), None);
    assert_eq!(from_accept_language("hi;q=abc"), None);
    assert_eq!(from_accept_language(""), None);
}

#[test]
fn negotiate_prefers_query_then_cookie_then_header() {
    assert_eq!(negotiate(Some("mr"), Some("hi"), Some("en"), Locale::En), Locale::Mr);
    assert_eq!(negotiate(None, Some("hi"), Some("mr"), Locale::En), Locale::Hi);
    assert_eq!(negotiate(Some("xx"), None, Some("mr"), Locale::En), Locale::Mr);
    assert_eq!(negotiate(None, None, None, Locale::Hi), Locale::Hi);
}

#[test]
fn query_lang_extracts_parameter() {
    assert_eq!(query_lang("status=harvested&lang=hi"), Some("hi"));
    assert_eq!(query_lang("status=harvested"), None);
    assert_eq!(query_lang("language=hi"), None);
}

#[test]
fn request_locale_translates() {
    assert_eq!(RequestLocale(Locale::Hi).t("submit"), "जमा करें");
}
