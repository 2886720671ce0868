//! Photo stylization pipeline for Toonshift
//!
//! Turns an uploaded photo into a cartoon-styled rendition using models
//! that support image output (Gemini image models via OpenRouter).
//!
//! Pieces:
//! - Payload optimization (downscale/recompress before upload)
//! - Style prompt construction (balanced/strong presets)
//! - Generation client (one request in, one image reference out)

mod client;
pub mod optimizer;
mod prompt;
mod types;

pub use client::{GenerationClient, GenerationClientBuilder};
pub use optimizer::{optimize, JPEG_QUALITY, MAX_DIMENSION};
pub use prompt::{StylePrompt, StyleStrength};
pub use types::{
    detect_image_mime_type, is_image_mime, mime_for_path, GeneratedImage, ProcessedImage,
};
