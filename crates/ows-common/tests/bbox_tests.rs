//! Tests for BoundingBox parsing from extent metadata.

use ows_common::{BoundingBox, OwsError};

// ============================================================================
// from_extent_string tests
// ============================================================================

#[test]
fn test_parse_extent_integer() {
    let bbox = BoundingBox::from_extent_string("1 2 3 4").unwrap();
    assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
}

#[test]
fn test_parse_extent_floating() {
    let bbox = BoundingBox::from_extent_string("-125.5 24.75 -66.25 50.125").unwrap();
    assert!((bbox.min_x - (-125.5)).abs() < 0.001);
    assert!((bbox.min_y - 24.75).abs() < 0.001);
    assert!((bbox.max_x - (-66.25)).abs() < 0.001);
    assert!((bbox.max_y - 50.125).abs() < 0.001);
}

#[test]
fn test_parse_extent_scientific_notation() {
    let bbox = BoundingBox::from_extent_string("1e-6 2e-6 1e6 2e6").unwrap();
    assert!((bbox.min_x - 1e-6).abs() < 1e-10);
    assert!((bbox.max_y - 2e6).abs() < 0.001);
}

#[test]
fn test_parse_extent_extra_whitespace() {
    let bbox = BoundingBox::from_extent_string("  0\t0   100 \n 100 ").unwrap();
    assert_eq!(bbox, BoundingBox::new(0.0, 0.0, 100.0, 100.0));
}

#[test]
fn test_parse_extent_too_few() {
    let result = BoundingBox::from_extent_string("1 2 3");
    assert!(matches!(result, Err(OwsError::Protocol(_))));
}

#[test]
fn test_parse_extent_too_many() {
    let result = BoundingBox::from_extent_string("1 2 3 4 5");
    assert!(matches!(result, Err(OwsError::Protocol(_))));
}

#[test]
fn test_parse_extent_empty_string() {
    let result = BoundingBox::from_extent_string("");
    assert!(matches!(result, Err(OwsError::Protocol(_))));
}

#[test]
fn test_parse_extent_comma_separated_is_rejected() {
    // Extent metadata is whitespace separated, unlike the BBOX request parameter
    let result = BoundingBox::from_extent_string("0,0,100,100");
    assert!(result.is_err());
}

#[test]
fn test_parse_extent_invalid_number() {
    let result = BoundingBox::from_extent_string("abc 0 100 100");
    assert!(matches!(result, Err(OwsError::Protocol(_))));
}

// ============================================================================
// Point containment
// ============================================================================

#[test]
fn test_contains_point_edges() {
    let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    assert!(bbox.contains_point(0.0, 0.0));
    assert!(bbox.contains_point(10.0, 10.0));
    assert!(bbox.contains_point(5.0, 5.0));
    assert!(!bbox.contains_point(10.1, 5.0));
    assert!(!bbox.contains_point(5.0, -0.1));
}
