//! Edge cases and properties for folio
//!
//! Boundary conditions of the pure helpers, checked with proptest where
//! the input space is wide.

use folio::config::Config;
use folio::sections::{SectionBounds, current_section, select_section};
use folio::util::{self, DeviceType, Throttle};
use folio::validation::{ChatLimits, ChatSubmission, FieldError, FieldRules, validate_chat};
use proptest::prelude::*;

// ============================================================================
// DEVICE CLASS
// ============================================================================

proptest! {
    #[test]
    fn prop_device_type_partitions_widths(width in 0u32..10_000) {
        let expected = if width < 768 {
            DeviceType::Mobile
        } else if width < 1024 {
            DeviceType::Tablet
        } else {
            DeviceType::Desktop
        };
        prop_assert_eq!(util::device_type(width), expected);
        prop_assert_eq!(Config::default().device_type(width), expected);
    }
}

#[test]
fn test_device_type_breakpoints() {
    assert_eq!(util::device_type(767), DeviceType::Mobile);
    assert_eq!(util::device_type(768), DeviceType::Tablet);
    assert_eq!(util::device_type(1023), DeviceType::Tablet);
    assert_eq!(util::device_type(1024), DeviceType::Desktop);
    assert_eq!(util::device_type(u32::MAX), DeviceType::Desktop);
}

// ============================================================================
// EMAIL FORMAT
// ============================================================================

proptest! {
    #[test]
    fn prop_well_formed_emails_pass(email in "[a-z0-9._+-]{1,12}@[a-z0-9-]{1,12}\\.[a-z]{2,6}") {
        prop_assert!(util::validate_email(&email));
    }

    #[test]
    fn prop_no_at_sign_fails(s in "[a-z0-9. ]{0,24}") {
        prop_assert!(!util::validate_email(&s));
    }

    #[test]
    fn prop_whitespace_in_local_part_fails(local in "[a-z]{1,6}", rest in "[a-z]{1,6}") {
        let email = format!("{local} {rest}@example.com");
        prop_assert!(!util::validate_email(&email));
    }
}

#[test]
fn test_email_edge_cases() {
    assert!(util::validate_email("a@b.c"));
    assert!(util::validate_email("first.last+tag@sub.example.co.uk"));
    assert!(!util::validate_email(""));
    assert!(!util::validate_email("a@b"));
    assert!(!util::validate_email("@b.c"));
    assert!(!util::validate_email("a@@b.c"));
    assert!(!util::validate_email(" a@b.c"));
}

// ============================================================================
// FIELD RULES
// ============================================================================

#[test]
fn test_optional_empty_email_is_invalid() {
    let rules = FieldRules {
        required: false,
        email: true,
        min_length: None,
    };
    assert_eq!(rules.check(""), Err(FieldError::InvalidEmail));
}

#[test]
fn test_required_wins_over_other_rules() {
    let rules = FieldRules {
        required: true,
        email: true,
        min_length: Some(5),
    };
    assert_eq!(rules.check("   "), Err(FieldError::Required));
    assert_eq!(rules.check("a@b"), Err(FieldError::InvalidEmail));
    assert_eq!(rules.check("a@b.c"), Ok(()));
}

#[test]
fn test_min_length_counts_characters() {
    let rules = FieldRules {
        min_length: Some(3),
        ..FieldRules::default()
    };
    assert_eq!(rules.check("日本語"), Ok(()));
    assert_eq!(rules.check(" ab "), Err(FieldError::TooShort { min: 3 }));
}

#[test]
fn test_chat_length_thresholds() {
    let submission = |name: &str, message: &str| ChatSubmission {
        name: name.to_string(),
        email: "ada@example.com".to_string(),
        message: message.to_string(),
    };
    let limits = ChatLimits::default();

    assert!(validate_chat(&submission("Al", "0123456789"), limits).is_empty());
    assert_eq!(validate_chat(&submission("A", "0123456789"), limits).len(), 1);
    assert_eq!(validate_chat(&submission("Al", "012345678"), limits).len(), 1);
    assert_eq!(validate_chat(&submission(" A ", "   0123456789   "), limits).len(), 1);
}

// ============================================================================
// SECTIONS
// ============================================================================

fn sections() -> Vec<SectionBounds> {
    vec![
        SectionBounds::new("home", 0.0, 500.0),
        SectionBounds::new("about", 500.0, 700.0),
        SectionBounds::new("contact", 1200.0, 800.0),
    ]
}

#[test]
fn test_section_boundaries_are_half_open() {
    let sections = sections();
    assert_eq!(current_section(&sections, 499.9), "home");
    assert_eq!(current_section(&sections, 500.0), "about");
    assert_eq!(current_section(&sections, 1199.0), "about");
    assert_eq!(current_section(&sections, 1200.0), "contact");
    assert_eq!(current_section(&sections, 2000.0), "home");
    assert_eq!(current_section(&[], 10.0), "home");
}

proptest! {
    #[test]
    fn prop_selected_section_contains_point(point in 0.0f64..2000.0) {
        let sections = sections();
        let selected = select_section(&sections, point);
        prop_assert!(selected.is_some());
        prop_assert!(selected.is_some_and(|s| s.contains(point)));
    }
}

// ============================================================================
// THROTTLE
// ============================================================================

#[test]
fn test_throttle_admits_once_per_window() {
    let mut throttle = Throttle::new(100);
    assert!(throttle.admit(0));
    assert!(!throttle.admit(50));
    assert!(!throttle.admit(99));
    assert!(throttle.admit(100));
    assert!(!throttle.admit(150));
    throttle.reset();
    assert!(throttle.admit(150));
}

// ============================================================================
// CONFIG
// ============================================================================

#[test]
fn test_partial_config_overrides() {
    let config = Config::from_json(r#"{"mobile_breakpoint": 600, "features": {"analytics": false}}"#).unwrap();
    assert_eq!(config.mobile_breakpoint, 600);
    assert_eq!(config.tablet_breakpoint, 1024);
    assert!(!config.features.analytics);
    assert!(config.features.animations);
    assert_eq!(config.device_type(700), DeviceType::Tablet);
}

#[test]
fn test_inconsistent_config_rejected() {
    assert!(Config::from_json(r#"{"tablet_breakpoint": 500}"#).is_err());
    assert!(Config::from_json(r#"{"service_worker_url": "sw.js"}"#).is_err());
    assert!(Config::from_json(r#"{"scroll_throttle_ms": 0}"#).is_err());
}
