//! Toonshift Core Library
//!
//! This crate provides the core functionality for Toonshift, including:
//! - Image optimizer (downscale/recompress photos before upload)
//! - Style prompt builder (balanced/strong intensity presets)
//! - Generation client (OpenRouter-compatible image-output models)
//! - Upload session state machine (idle/processing/complete/error)
//! - Configuration with file persistence

pub mod config;
pub mod error;
pub mod session;
pub mod stylize;

pub use error::{Error, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::session::{Session, SessionState};
    pub use crate::stylize::{GeneratedImage, GenerationClient, ProcessedImage, StyleStrength};
}
