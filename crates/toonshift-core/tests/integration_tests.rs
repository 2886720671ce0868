//! Toonshift Core Integration Tests

use std::io::Cursor;

use toonshift_core::session::{Session, SessionState};
use toonshift_core::stylize::{
    optimize, GeneratedImage, ProcessedImage, StylePrompt, StyleStrength, MAX_DIMENSION,
};
use toonshift_core::Error;

fn png_payload(width: u32, height: u32) -> ProcessedImage {
    let img = image::DynamicImage::new_rgb8(width, height);
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    ProcessedImage::from_bytes(&buf.into_inner(), "image/png")
}

#[tokio::test]
async fn test_upload_pipeline_for_large_photo() {
    // A 2000x1000 upload is downscaled to 1024x512 JPEG before it would
    // be sent, and the balanced prompt carries temperature 0.65.
    let payload = png_payload(2000, 1000);
    let optimized = optimize(&payload).await;

    assert_eq!(optimized.mime_type, "image/jpeg");
    let decoded = image::load_from_memory(&optimized.to_bytes().unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (1024, 512));

    let prompt = StylePrompt::build(StyleStrength::Balanced);
    assert_eq!(prompt.temperature, 0.65);
}

#[tokio::test]
async fn test_small_photo_is_not_touched() {
    let payload = png_payload(640, 480);
    let optimized = optimize(&payload).await;

    assert_eq!(optimized, payload);
    assert_eq!(optimized.mime_type, "image/png");
}

#[tokio::test]
async fn test_longer_side_always_lands_on_limit() {
    for (width, height) in [(4096, 1024), (1025, 1024), (1080, 1920)] {
        let optimized = optimize(&png_payload(width, height)).await;
        let decoded = image::load_from_memory(&optimized.to_bytes().unwrap()).unwrap();
        assert_eq!(
            decoded.width().max(decoded.height()),
            MAX_DIMENSION,
            "for {}x{}",
            width,
            height
        );
    }
}

#[test]
fn test_successful_session_visits_idle_processing_complete() {
    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::Idle);

    let ticket = session
        .select_bytes("image/png", &[0x89, 0x50, 0x4E, 0x47])
        .unwrap();
    assert_eq!(session.state(), SessionState::Processing);
    assert!(session.original().is_some());

    session.complete_generation(ticket, GeneratedImage::from_bytes(&[1, 2, 3]));
    assert_eq!(session.state(), SessionState::Complete);
    assert!(session
        .generated()
        .unwrap()
        .as_data_url()
        .starts_with("data:image/png;base64,"));
}

#[test]
fn test_failed_session_visits_idle_processing_error() {
    let mut session = Session::new();

    let ticket = session
        .select_bytes("image/jpeg", &[0xFF, 0xD8, 0xFF])
        .unwrap();
    session.fail_generation(
        ticket,
        &Error::GenerationError("HTTP 500: internal".to_string()),
    );

    assert_eq!(session.state(), SessionState::Error);
    assert!(session.error_message().unwrap().contains("connection failed"));
    assert!(session.original().is_none());
}

#[test]
fn test_reset_during_processing_discards_late_outcome() {
    let mut session = Session::new();
    let ticket = session
        .select_bytes("image/png", &[0x89, 0x50, 0x4E, 0x47])
        .unwrap();

    session.reset();
    assert_eq!(session.state(), SessionState::Idle);

    // The in-flight request cannot be aborted; its eventual outcome is
    // simply ignored.
    session.complete_generation(ticket, GeneratedImage::from_bytes(&[1]));
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.generated().is_none());
    assert!(session.error_message().is_none());
}
