use image::DynamicImage;

use crate::error::ClientError;

/// Resolve the codec for a `Content-Type` value such as `image/png`.
///
/// Parameters after `;` are ignored. Subtypes that are not registered MIME
/// types (e.g. `image/jpg`) fall back to an extension lookup.
pub fn format_hint(content_type: &str) -> Option<image::ImageFormat> {
    let mime = content_type.split(';').next()?.trim().to_lowercase();
    let subtype = mime.strip_prefix("image/")?;
    image::ImageFormat::from_mime_type(&mime).or_else(|| image::ImageFormat::from_extension(subtype))
}

/// Decode a fetched body using the format declared by the server
pub fn decode_image(content_type: Option<&str>, body: &[u8]) -> Result<DynamicImage, ClientError> {
    let content_type = content_type
        .ok_or_else(|| ClientError::Protocol("image response without Content-Type".to_string()))?;
    if !content_type.trim().to_lowercase().starts_with("image/") {
        return Err(ClientError::Protocol(format!(
            "expected an image content type, got {content_type}"
        )));
    }
    if body.is_empty() {
        return Err(ClientError::Protocol("image response body is empty".to_string()));
    }

    let format = format_hint(content_type).ok_or_else(|| {
        ClientError::Decode(format!("unsupported image type {content_type}"))
    })?;

    image::load_from_memory_with_format(body, format)
        .map_err(|e| ClientError::Decode(format!("{content_type}: {e}")))
}

/// Decode on the blocking pool so large images don't stall the runtime
pub async fn decode_image_blocking(
    content_type: Option<String>,
    body: Vec<u8>,
) -> Result<DynamicImage, ClientError> {
    tokio::task::spawn_blocking(move || decode_image(content_type.as_deref(), &body))
        .await
        .map_err(|e| ClientError::Decode(format!("Decode task failed: {e}")))?
}
