//! Upload session state machine
//!
//! The session is the single owner of application state. It validates
//! uploads, tracks the `Idle -> Processing -> {Complete | Error}`
//! lifecycle, applies generation outcomes behind a stale-response guard,
//! and is the sole place user-facing error messages are constructed.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::Error;
use crate::stylize::{is_image_mime, mime_for_path, GeneratedImage, ProcessedImage, StyleStrength};

/// Filename used when materializing the generated image
pub const DOWNLOAD_FILE_NAME: &str = "rick-and-morty-style.png";

const MSG_INVALID_FILE: &str = "Please choose an image file (JPEG, PNG or WebP).";
const MSG_READ_FAILED: &str = "There was an error reading your file. Please try again.";
const MSG_CONNECTION_FAILED: &str =
    "The connection failed - your photo may be too large or complex. Try a smaller image.";
const MSG_FORMAT_REJECTED: &str =
    "That image format was rejected by the generator. Try a standard JPEG or PNG photo.";
const MSG_GENERIC: &str = "Something went wrong. Please try again.";

/// Lifecycle state of an upload session
///
/// Exactly one state is active at a time. Uploads are accepted in `Idle`
/// and `Error`, downloads only in `Complete`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Waiting for a photo
    #[default]
    Idle,
    /// A generation request is in flight
    Processing,
    /// A stylized image is ready
    Complete,
    /// The last attempt failed
    Error,
}

impl SessionState {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }

    /// Check whether a new upload may start from this state
    pub fn accepts_upload(&self) -> bool {
        matches!(self, Self::Idle | Self::Error)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Token tying an in-flight generation to the upload that started it.
///
/// Outcomes reported with a ticket that is no longer current are discarded,
/// so a stale response can never overwrite a newer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(Uuid);

/// An upload session
#[derive(Debug, Default)]
pub struct Session {
    state: SessionState,
    strength: StyleStrength,
    original: Option<ProcessedImage>,
    generated: Option<GeneratedImage>,
    error_message: Option<String>,
    in_flight: Option<UploadTicket>,
}

impl Session {
    /// Create a new idle session
    pub fn new() -> Self {
        Self::default()
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Selected style strength
    pub fn strength(&self) -> StyleStrength {
        self.strength
    }

    /// Select the style strength for the next upload
    pub fn set_strength(&mut self, strength: StyleStrength) {
        self.strength = strength;
    }

    /// The uploaded photo, available from the moment processing starts
    pub fn original(&self) -> Option<&ProcessedImage> {
        self.original.as_ref()
    }

    /// The stylized result, set only in `Complete`
    pub fn generated(&self) -> Option<&GeneratedImage> {
        self.generated.as_ref()
    }

    /// The current user-facing error message, if any
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Select a photo by path.
    ///
    /// Derives the MIME type from the file extension and reads the bytes,
    /// then behaves like [`Session::select_bytes`]. A failed read lands the
    /// session in `Error` with a generic reading message.
    pub fn select_file(&mut self, path: &Path) -> Option<UploadTicket> {
        if !self.state.accepts_upload() {
            warn!(state = %self.state, "upload refused, session is busy");
            return None;
        }

        let Some(mime_type) = mime_for_path(path) else {
            debug!(path = %path.display(), "rejected non-image file");
            self.error_message = Some(MSG_INVALID_FILE.to_string());
            return None;
        };

        match std::fs::read(path) {
            Ok(bytes) => self.select_bytes(mime_type, &bytes),
            Err(e) => {
                let error = Error::ReadError(format!("{}: {}", path.display(), e));
                warn!(error = %error, "failed to read selected file");
                self.fail_read(&error);
                None
            }
        }
    }

    /// Select a photo from raw bytes with a known MIME type.
    ///
    /// A non-image MIME type is rejected without a state change beyond the
    /// validation message. On acceptance the session enters `Processing`
    /// with `original` stored immediately, and the returned ticket must
    /// accompany the eventual generation outcome.
    pub fn select_bytes(&mut self, mime_type: &str, bytes: &[u8]) -> Option<UploadTicket> {
        if !self.state.accepts_upload() {
            warn!(state = %self.state, "upload refused, session is busy");
            return None;
        }

        if !is_image_mime(mime_type) {
            debug!(mime_type, "rejected non-image upload");
            self.error_message = Some(MSG_INVALID_FILE.to_string());
            return None;
        }

        let ticket = UploadTicket(Uuid::new_v4());

        self.original = Some(ProcessedImage::from_bytes(bytes, mime_type));
        self.generated = None;
        self.error_message = None;
        self.state = SessionState::Processing;
        self.in_flight = Some(ticket);

        debug!(mime_type, "upload accepted, processing");
        Some(ticket)
    }

    /// Apply a successful generation outcome.
    ///
    /// Ignored unless the session is still `Processing` and the ticket
    /// matches the in-flight upload.
    pub fn complete_generation(&mut self, ticket: UploadTicket, image: GeneratedImage) {
        if !self.is_current(ticket) {
            debug!("discarding stale generation result");
            return;
        }

        self.generated = Some(image);
        self.error_message = None;
        self.state = SessionState::Complete;
        self.in_flight = None;
    }

    /// Apply a failed generation outcome.
    ///
    /// Ignored unless the session is still `Processing` and the ticket
    /// matches. On application the photo is discarded along with any
    /// result, and the failure is classified into a user-facing message.
    pub fn fail_generation(&mut self, ticket: UploadTicket, error: &Error) {
        if !self.is_current(ticket) {
            debug!(error = %error, "discarding stale generation failure");
            return;
        }

        warn!(error = %error, "generation failed");
        self.original = None;
        self.generated = None;
        self.error_message = Some(classify_failure(error));
        self.state = SessionState::Error;
        self.in_flight = None;
    }

    /// Return to a clean `Idle` state.
    ///
    /// Clears the photo, the result, the error message and the in-flight
    /// ticket; an outcome arriving after a reset is therefore discarded.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.original = None;
        self.generated = None;
        self.error_message = None;
        self.in_flight = None;
    }

    /// Materialize the generated image for download.
    ///
    /// Only valid in `Complete`; the caller writes the bytes under
    /// [`DOWNLOAD_FILE_NAME`]. Does not change state.
    pub fn download(&self) -> Option<Vec<u8>> {
        if self.state != SessionState::Complete {
            return None;
        }

        match self.generated.as_ref()?.to_bytes() {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!(error = %e, "generated image reference is not decodable");
                None
            }
        }
    }

    fn fail_read(&mut self, error: &Error) {
        self.original = None;
        self.generated = None;
        self.error_message = Some(classify_failure(error));
        self.state = SessionState::Error;
        self.in_flight = None;
    }

    fn is_current(&self, ticket: UploadTicket) -> bool {
        self.state == SessionState::Processing && self.in_flight == Some(ticket)
    }
}

/// Map a raw failure to a user-facing message.
///
/// Classification is by case-sensitive substring on the failure
/// description, in priority order; unmatched descriptions surface as-is.
pub fn classify_failure(error: &Error) -> String {
    if let Error::ReadError(_) = error {
        return MSG_READ_FAILED.to_string();
    }

    let description = error.to_string();

    if description.contains("Rpc failed")
        || description.contains("500")
        || description.contains("xhr error")
    {
        MSG_CONNECTION_FAILED.to_string()
    } else if description.contains("400") {
        MSG_FORMAT_REJECTED.to_string()
    } else if description.is_empty() {
        MSG_GENERIC.to_string()
    } else {
        description
    }
}
