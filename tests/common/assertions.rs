//! Assertion helpers for tests.

use gis_map_client::models::ServiceStatus;
use gis_map_client::ClientError;
use image::{DynamicImage, RgbaImage};
use pretty_assertions::assert_eq;

/// Assert the error is a service rejection with the given status
pub fn assert_rejected(error: &ClientError, expected: ServiceStatus) {
    match error {
        ClientError::Rejected { status, .. } => assert_eq!(*status, expected),
        other => panic!("Expected Rejected({expected}), got {other:?}"),
    }
}

/// Assert a decoded image matches the source pixel for pixel
pub fn assert_same_pixels(image: &DynamicImage, expected: &RgbaImage) {
    assert_eq!(
        (image.width(), image.height()),
        expected.dimensions(),
        "Image dimensions differ"
    );
    assert!(
        image.to_rgba8() == *expected,
        "Decoded pixels differ from the served image"
    );
}
