//! Upload payload optimization
//!
//! Downscales and recompresses large photos before they are sent to the
//! generation API, to keep request sizes inside provider limits. Failures
//! are absorbed: the caller always gets a payload back, worst case the
//! original one untouched.

use std::io::Cursor;

use image::imageops::FilterType;
use tracing::{debug, warn};

use super::types::ProcessedImage;

/// Longest side above which an image is downscaled before upload
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG quality used when recompressing (1-100 scale)
pub const JPEG_QUALITY: u8 = 85;

/// Optimize an image payload for upload.
///
/// Images whose width and height are both within [`MAX_DIMENSION`] pass
/// through unchanged, byte for byte. Larger images are scaled
/// proportionally so the longer side equals [`MAX_DIMENSION`] and
/// re-encoded as JPEG at [`JPEG_QUALITY`]. Rasterization runs on the
/// blocking pool.
pub async fn optimize(payload: &ProcessedImage) -> ProcessedImage {
    let input = payload.clone();

    match tokio::task::spawn_blocking(move || optimize_blocking(input)).await {
        Ok(optimized) => optimized,
        Err(e) => {
            warn!(error = %e, "optimizer task failed, uploading original payload");
            payload.clone()
        }
    }
}

fn optimize_blocking(payload: ProcessedImage) -> ProcessedImage {
    let bytes = match payload.to_bytes() {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(error = %e, "payload is not valid base64, uploading as-is");
            return payload;
        }
    };

    let img = match image::load_from_memory(&bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(error = %e, "could not decode image, uploading as-is");
            return payload;
        }
    };

    let (width, height) = (img.width(), img.height());
    if width <= MAX_DIMENSION && height <= MAX_DIMENSION {
        debug!(width, height, "image within size limit, skipping recompression");
        return payload;
    }

    // Longer side lands exactly on MAX_DIMENSION, the other rounds to
    // the nearest pixel.
    let scale = MAX_DIMENSION as f32 / width.max(height) as f32;
    let new_width = ((width as f32 * scale).round() as u32).max(1);
    let new_height = ((height as f32 * scale).round() as u32).max(1);

    let resized = img.resize_exact(new_width, new_height, FilterType::Lanczos3);
    let rgb = resized.to_rgb8();

    let mut buf = Cursor::new(Vec::new());
    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    if let Err(e) = encoder.encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        image::ExtendedColorType::Rgb8,
    ) {
        warn!(error = %e, "jpeg encode failed, uploading original payload");
        return payload;
    }

    debug!(
        from = %format!("{}x{}", width, height),
        to = %format!("{}x{}", new_width, new_height),
        "downscaled image for upload"
    );

    ProcessedImage::from_bytes(&buf.into_inner(), "image/jpeg")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_payload(width: u32, height: u32) -> ProcessedImage {
        let img = image::DynamicImage::new_rgb8(width, height);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        ProcessedImage::from_bytes(&buf.into_inner(), "image/png")
    }

    fn decoded_dimensions(payload: &ProcessedImage) -> (u32, u32) {
        let img = image::load_from_memory(&payload.to_bytes().unwrap()).unwrap();
        (img.width(), img.height())
    }

    #[tokio::test]
    async fn test_small_image_passes_through_unchanged() {
        let payload = png_payload(800, 600);
        let optimized = optimize(&payload).await;
        assert_eq!(optimized, payload);
    }

    #[tokio::test]
    async fn test_boundary_image_passes_through_unchanged() {
        let payload = png_payload(1024, 1024);
        let optimized = optimize(&payload).await;
        assert_eq!(optimized, payload);
    }

    #[tokio::test]
    async fn test_wide_image_scaled_to_limit() {
        let payload = png_payload(2000, 1000);
        let optimized = optimize(&payload).await;

        assert_eq!(optimized.mime_type, "image/jpeg");
        assert_eq!(decoded_dimensions(&optimized), (1024, 512));
    }

    #[tokio::test]
    async fn test_tall_image_scaled_to_limit() {
        let payload = png_payload(600, 3000);
        let optimized = optimize(&payload).await;

        assert_eq!(optimized.mime_type, "image/jpeg");
        let (width, height) = decoded_dimensions(&optimized);
        assert_eq!(height, 1024);
        // 600 * 1024/3000 = 204.8, rounds to 205
        assert_eq!(width, 205);
    }

    #[tokio::test]
    async fn test_undecodable_payload_falls_back_to_input() {
        let payload = ProcessedImage::from_bytes(b"definitely not an image", "image/png");
        let optimized = optimize(&payload).await;
        assert_eq!(optimized, payload);
    }

    #[tokio::test]
    async fn test_invalid_base64_falls_back_to_input() {
        let payload = ProcessedImage::new("!!! not base64 !!!", "image/png");
        let optimized = optimize(&payload).await;
        assert_eq!(optimized, payload);
    }
}
