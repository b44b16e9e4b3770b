use crate::error::{GenerationFailure, NicheError, Result};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

/// Decodes the proxy's base64 payload into an image.
pub fn decode_image(payload: &str) -> std::result::Result<DynamicImage, GenerationFailure> {
    let bytes = BASE64
        .decode(payload.trim())
        .map_err(|e| GenerationFailure::Decode(format!("invalid base64: {}", e)))?;
    image::load_from_memory(&bytes)
        .map_err(|e| GenerationFailure::Decode(format!("invalid image data: {}", e)))
}

/// PNG-encodes an image as base64, the form the proxy expects for `conditional_image`.
pub fn encode_png_base64(image: &DynamicImage) -> Result<String> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| NicheError::SerializationError(e.to_string()))?;
    Ok(BASE64.encode(buffer.into_inner()))
}
