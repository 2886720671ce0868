//! Payload types shared across the stylization pipeline

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// An image payload ready for transmission: base64-encoded bytes plus MIME type.
///
/// Built from a selected file or from optimizer output. Immutable once
/// constructed; a session replaces it wholesale on reset or re-upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedImage {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type of the encoded bytes (e.g., "image/jpeg")
    pub mime_type: String,
}

impl ProcessedImage {
    /// Create a payload from an already base64-encoded string
    pub fn new(data: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Create a payload by base64-encoding raw image bytes
    pub fn from_bytes(bytes: &[u8], mime_type: impl Into<String>) -> Self {
        Self {
            data: BASE64.encode(bytes),
            mime_type: mime_type.into(),
        }
    }

    /// Decode the payload back to raw bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        BASE64
            .decode(self.data.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid base64 payload: {}", e)))
    }

    /// Render the payload as a data URL for transmission
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// A displayable reference to a generated image.
///
/// Always a PNG-typed data URL, whatever bytes the model returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    data_url: String,
}

impl GeneratedImage {
    /// Wrap raw image bytes as a PNG-typed data URL reference
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:image/png;base64,{}", BASE64.encode(bytes)),
        }
    }

    /// The data URL for display
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }

    /// Decode the reference back to raw bytes (for download/save)
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let encoded = self
            .data_url
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| Error::InvalidInput("Malformed image data URL".to_string()))?;

        BASE64
            .decode(encoded.trim())
            .map_err(|e| Error::InvalidInput(format!("Invalid base64 in data URL: {}", e)))
    }
}

/// Check whether a MIME type names an image
pub fn is_image_mime(mime_type: &str) -> bool {
    mime_type.starts_with("image/")
}

/// Guess the MIME type of a file from its extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// Detect MIME type from image bytes
pub fn detect_image_mime_type(data: &[u8]) -> &'static str {
    if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "image/png"
    } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "image/jpeg"
    } else if data.starts_with(b"RIFF") && data.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else {
        "application/octet-stream"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_processed_image_round_trip() {
        let bytes = [0x89u8, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        let payload = ProcessedImage::from_bytes(&bytes, "image/png");

        assert_eq!(payload.mime_type, "image/png");
        assert_eq!(payload.to_bytes().unwrap(), bytes);
        assert!(payload.to_data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_generated_image_is_png_typed() {
        let image = GeneratedImage::from_bytes(&[1, 2, 3]);
        assert!(image.as_data_url().starts_with("data:image/png;base64,"));
        assert_eq!(image.to_bytes().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_is_image_mime() {
        assert!(is_image_mime("image/jpeg"));
        assert!(is_image_mime("image/png"));
        assert!(!is_image_mime("text/plain"));
        assert!(!is_image_mime("application/pdf"));
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(
            mime_for_path(&PathBuf::from("photo.JPG")),
            Some("image/jpeg")
        );
        assert_eq!(mime_for_path(&PathBuf::from("a/b/pic.png")), Some("image/png"));
        assert_eq!(mime_for_path(&PathBuf::from("notes.txt")), None);
        assert_eq!(mime_for_path(&PathBuf::from("no_extension")), None);
    }

    #[test]
    fn test_detect_image_mime_type() {
        assert_eq!(
            detect_image_mime_type(&[0x89, 0x50, 0x4E, 0x47]),
            "image/png"
        );
        assert_eq!(detect_image_mime_type(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");

        let mut webp = vec![0u8; 12];
        webp[0..4].copy_from_slice(b"RIFF");
        webp[8..12].copy_from_slice(b"WEBP");
        assert_eq!(detect_image_mime_type(&webp), "image/webp");

        assert_eq!(
            detect_image_mime_type(&[0x00, 0x01]),
            "application/octet-stream"
        );
    }
}
