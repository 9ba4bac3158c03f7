//! Test fixtures and constants.

use gis_map_client::models::ClientConfig;
use image::{DynamicImage, Rgba, RgbaImage};
use std::io::Cursor;

/// Credentials used by most scenarios
pub mod order {
    pub const ID: u64 = 4711;
    pub const PIN: &str = "Xk3Pq9";
}

/// Acknowledgment body exactly as the render server writes it
pub fn ack_body(order_id: u64, pin_code: &str) -> String {
    format!("orderId={order_id}, pincode={pin_code}")
}

/// Small image with distinct corner pixels
pub fn sample_image() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(8, 6, Rgba([240, 240, 230, 255]));
    img.put_pixel(0, 0, Rgba([200, 0, 0, 255]));
    img.put_pixel(7, 5, Rgba([0, 0, 200, 255]));
    img
}

pub fn encode(image: &RgbaImage, format: image::ImageFormat) -> Vec<u8> {
    let image = match format {
        image::ImageFormat::Png => DynamicImage::ImageRgba8(image.clone()),
        _ => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(image.clone()).to_rgb8()),
    };
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}

pub fn png_bytes() -> Vec<u8> {
    encode(&sample_image(), image::ImageFormat::Png)
}

/// Config pointing at `server_url` with test-friendly timings
pub fn config_for(server_url: &str) -> ClientConfig {
    ClientConfig {
        server_url: server_url.to_string(),
        request_timeout_ms: 2_000,
        overall_timeout_ms: 3_000,
        poll_interval_ms: 50,
        ..Default::default()
    }
}
