//! Capture pipeline: frame acquisition, barcode decoding with fallback
//! representations, OCR fallback, and scan orchestration.
//!
//! One scan runs strictly in sequence: open the camera, grab a frame,
//! release the stream, then resolve the frame. In barcode mode the decoder
//! gets three representations of the same frame (raw pixels, a
//! contrast-enhanced copy, a base64 re-encoding) before the pipeline falls
//! back to OCR on its own; text mode goes straight to OCR. When neither
//! path yields anything usable the scan resolves to a guidance result with
//! zero confidence rather than an error.
//!
//! Camera, decoder, and OCR engine are injected collaborators. Real device
//! bindings live with the caller; tests drive the pipeline with fakes.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use crate::classify::classify_text;
use crate::config::Config;
use crate::errors::{DeviceError, Result};
use crate::models::{ScanResult, ScanSource};
use crate::products::lookup_barcode;

/// What the user is pointing the camera at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Try barcode decoding first, fall back to OCR automatically.
    Barcode,
    /// Skip barcode decoding, OCR only.
    Text,
}

// ============ Frames ============

/// A captured camera frame. RGBA, row-major, 4 bytes per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Frame {
    /// Base64 re-encoding of the pixel buffer, the third decode
    /// representation.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:application/octet-stream;base64,{}",
            STANDARD.encode(&self.pixels)
        )
    }
}

/// Threshold every pixel to pure black or white by average RGB channel
/// luminance (average above 128 becomes white). Alpha is preserved.
pub fn enhance_contrast(frame: &Frame) -> Frame {
    let mut pixels = frame.pixels.clone();
    for px in pixels.chunks_exact_mut(4) {
        let sum = px[0] as u32 + px[1] as u32 + px[2] as u32;
        // avg > 128, kept in integer form.
        let value = if sum > 384 { 255 } else { 0 };
        px[0] = value;
        px[1] = value;
        px[2] = value;
    }
    Frame {
        width: frame.width,
        height: frame.height,
        pixels,
    }
}

// ============ Collaborators ============

/// Camera collaborator. `open` acquires an exclusive stream; the stream
/// releases the device when dropped.
#[async_trait]
pub trait CameraSource: Send + Sync {
    async fn open(&self) -> Result<Box<dyn CameraStream>, DeviceError>;
}

/// An open camera stream. At most one is active per source; re-entry into
/// the pipeline always acquires a fresh one.
#[async_trait]
pub trait CameraStream: Send {
    async fn capture(&mut self) -> Result<Frame, DeviceError>;
}

/// One decode attempt input.
#[derive(Debug, Clone)]
pub enum DecodeInput<'a> {
    /// Raw RGBA pixels (also used for the contrast-enhanced copy).
    Pixels(&'a Frame),
    /// The same pixels re-encoded as a base64 data URL.
    DataUrl(&'a str),
}

/// Typed failure from a single decode attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("No barcode found in image")]
    NotFound,
    #[error("barcode decoder failed: {0}")]
    Engine(String),
}

#[async_trait]
pub trait BarcodeDecoder: Send + Sync {
    async fn decode(&self, input: DecodeInput<'_>) -> Result<String, DecodeError>;
}

/// Typed failure from text extraction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OcrError {
    #[error("Failed to extract text from image")]
    Failed,
    #[error("text extraction failed: {0}")]
    Engine(String),
}

#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, frame: &Frame) -> Result<String, OcrError>;
}

// ============ Pipeline ============

/// Run one complete scan: acquire a frame from the camera, release the
/// stream, then resolve the frame per [`scan_frame`].
///
/// # Errors
///
/// Camera failures surface as typed device errors. Decode and OCR failures
/// never error; they degrade to the guidance result.
pub async fn run_scan(
    client: &reqwest::Client,
    config: &Config,
    camera: &dyn CameraSource,
    decoder: &dyn BarcodeDecoder,
    ocr: &dyn TextExtractor,
    mode: ScanMode,
) -> Result<ScanResult> {
    let mut stream = camera.open().await?;
    let frame = stream.capture().await?;
    drop(stream);

    scan_frame(client, config, decoder, ocr, &frame, mode).await
}

/// Resolve one captured frame into a scan verdict.
pub async fn scan_frame(
    client: &reqwest::Client,
    config: &Config,
    decoder: &dyn BarcodeDecoder,
    ocr: &dyn TextExtractor,
    frame: &Frame,
    mode: ScanMode,
) -> Result<ScanResult> {
    match mode {
        ScanMode::Barcode => {
            if let Some(barcode) = decode_barcode(decoder, frame).await {
                return Ok(lookup_barcode(client, &config.products, &barcode).await);
            }
            ocr_fallback(ocr, frame, config.scan.min_text_len, true).await
        }
        ScanMode::Text => ocr_fallback(ocr, frame, config.scan.min_text_len, false).await,
    }
}

/// Try the three representations in order: raw pixels, contrast-enhanced
/// copy, base64 re-encoding. First success wins.
pub async fn decode_barcode(decoder: &dyn BarcodeDecoder, frame: &Frame) -> Option<String> {
    if let Ok(code) = decoder.decode(DecodeInput::Pixels(frame)).await {
        return Some(code);
    }
    let enhanced = enhance_contrast(frame);
    if let Ok(code) = decoder.decode(DecodeInput::Pixels(&enhanced)).await {
        return Some(code);
    }
    let encoded = frame.to_data_url();
    decoder.decode(DecodeInput::DataUrl(&encoded)).await.ok()
}

async fn ocr_fallback(
    ocr: &dyn TextExtractor,
    frame: &Frame,
    min_text_len: usize,
    after_barcode: bool,
) -> Result<ScanResult> {
    match ocr.extract_text(frame).await {
        Ok(text) if text.trim().chars().count() > min_text_len => {
            let mut result = classify_text(&text);
            if after_barcode {
                let snippet: String = text.chars().take(100).collect();
                result.analysis = format!(
                    "Barcode not detected, analyzed text instead: {}",
                    result.analysis
                );
                result.reasoning = format!(
                    "Could not detect barcode, but found text content: \"{}...\" - {}",
                    snippet, result.reasoning
                );
            }
            Ok(result)
        }
        Ok(_) | Err(_) => Ok(guidance_result()),
    }
}

/// Terminal low-confidence result shown when neither a barcode nor enough
/// text could be read from the frame.
fn guidance_result() -> ScanResult {
    ScanResult {
        text: "Could not detect barcode or readable text. Please try:".to_string(),
        is_vegetarian: false,
        non_veg_ingredients: Vec::new(),
        analysis: "• Position barcode more clearly in center of frame\n\
                   • Ensure good lighting\n\
                   • Try getting closer to the barcode\n\
                   • Switch to Text mode for ingredient lists"
            .to_string(),
        confidence: 0,
        reasoning: "No barcode or readable text detected. Please adjust positioning and lighting."
            .to_string(),
        barcode: None,
        product_name: None,
        source: ScanSource::Barcode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_frame() -> Frame {
        Frame {
            width: 2,
            height: 1,
            pixels: vec![200, 100, 90, 7, 100, 150, 130, 255],
        }
    }

    fn offline_config() -> Config {
        let mut config = Config::default();
        config.products.base_url = "http://127.0.0.1:9".to_string();
        config.products.timeout_secs = 1;
        config
    }

    struct FakeCamera {
        active: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
        deny: bool,
    }

    impl FakeCamera {
        fn new() -> Self {
            Self {
                active: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
                deny: false,
            }
        }
    }

    struct FakeStream {
        active: Arc<AtomicUsize>,
        frame: Frame,
    }

    impl Drop for FakeStream {
        fn drop(&mut self) {
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl CameraStream for FakeStream {
        async fn capture(&mut self) -> Result<Frame, DeviceError> {
            Ok(self.frame.clone())
        }
    }

    #[async_trait]
    impl CameraSource for FakeCamera {
        async fn open(&self) -> Result<Box<dyn CameraStream>, DeviceError> {
            if self.deny {
                return Err(DeviceError::CameraDenied);
            }
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            Ok(Box::new(FakeStream {
                active: self.active.clone(),
                frame: test_frame(),
            }))
        }
    }

    struct FakeDecoder {
        attempts: Arc<AtomicUsize>,
        result: Option<String>,
    }

    impl FakeDecoder {
        fn failing() -> Self {
            Self {
                attempts: Arc::new(AtomicUsize::new(0)),
                result: None,
            }
        }

        fn returning(code: &str) -> Self {
            Self {
                attempts: Arc::new(AtomicUsize::new(0)),
                result: Some(code.to_string()),
            }
        }
    }

    #[async_trait]
    impl BarcodeDecoder for FakeDecoder {
        async fn decode(&self, _input: DecodeInput<'_>) -> Result<String, DecodeError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.result.clone().ok_or(DecodeError::NotFound)
        }
    }

    struct FakeOcr {
        text: Result<String, OcrError>,
    }

    impl FakeOcr {
        fn returning(text: &str) -> Self {
            Self {
                text: Ok(text.to_string()),
            }
        }

        fn failing() -> Self {
            Self {
                text: Err(OcrError::Failed),
            }
        }
    }

    #[async_trait]
    impl TextExtractor for FakeOcr {
        async fn extract_text(&self, _frame: &Frame) -> Result<String, OcrError> {
            self.text.clone()
        }
    }

    #[test]
    fn test_enhance_contrast_thresholds_by_average() {
        let enhanced = enhance_contrast(&test_frame());
        // (200 + 100 + 90) / 3 > 128 -> white, alpha kept.
        assert_eq!(&enhanced.pixels[0..4], &[255, 255, 255, 7]);
        // (100 + 150 + 130) / 3 < 128 -> black.
        assert_eq!(&enhanced.pixels[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_enhance_contrast_boundary() {
        let exactly_128 = Frame {
            width: 2,
            height: 1,
            pixels: vec![128, 128, 128, 255, 129, 128, 128, 255],
        };
        let enhanced = enhance_contrast(&exactly_128);
        assert_eq!(&enhanced.pixels[0..3], &[0, 0, 0]);
        assert_eq!(&enhanced.pixels[4..7], &[255, 255, 255]);
    }

    #[test]
    fn test_data_url_encoding() {
        let frame = Frame {
            width: 1,
            height: 1,
            pixels: vec![1, 2, 3, 4],
        };
        assert_eq!(
            frame.to_data_url(),
            "data:application/octet-stream;base64,AQIDBA=="
        );
    }

    #[tokio::test]
    async fn test_decode_tries_three_representations() {
        let decoder = FakeDecoder::failing();
        assert_eq!(decode_barcode(&decoder, &test_frame()).await, None);
        assert_eq!(decoder.attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_decode_stops_at_first_success() {
        let decoder = FakeDecoder::returning("8902796431157");
        let code = decode_barcode(&decoder, &test_frame()).await;
        assert_eq!(code.as_deref(), Some("8902796431157"));
        assert_eq!(decoder.attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_barcode_mode_resolves_through_lookup() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::returning("8902796431157");
        let ocr = FakeOcr::failing();
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Barcode,
        )
        .await
        .unwrap();
        // Unroutable product database, so the brand table answers.
        assert_eq!(result.product_name.as_deref(), Some("Yummiez Chicken Nuggets"));
        assert_eq!(result.confidence, 98);
        assert_eq!(result.source, ScanSource::Barcode);
        assert_eq!(camera.active.load(Ordering::SeqCst), 0);
        assert_eq!(camera.peak.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_falls_back_to_ocr_with_annotations() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::failing();
        let ocr = FakeOcr::returning("Ingredients: water, sugar, chicken extract, salt");
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Barcode,
        )
        .await
        .unwrap();
        assert_eq!(result.source, ScanSource::Ocr);
        assert!(!result.is_vegetarian);
        assert!(result
            .analysis
            .starts_with("Barcode not detected, analyzed text instead:"));
        assert!(result
            .reasoning
            .starts_with("Could not detect barcode, but found text content: \""));
        assert!(result.non_veg_ingredients.contains(&"chicken".to_string()));
        assert_eq!(camera.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unreadable_frame_yields_guidance() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::failing();
        let ocr = FakeOcr::returning("abc");
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Barcode,
        )
        .await
        .unwrap();
        assert_eq!(
            result.text,
            "Could not detect barcode or readable text. Please try:"
        );
        assert_eq!(result.confidence, 0);
        assert_eq!(result.source, ScanSource::Barcode);
        assert!(result.non_veg_ingredients.is_empty());
        assert_eq!(camera.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_ocr_engine_failure_yields_guidance() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::failing();
        let ocr = FakeOcr::failing();
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Barcode,
        )
        .await
        .unwrap();
        assert_eq!(result.confidence, 0);
        assert_eq!(camera.active.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_text_mode_never_touches_decoder() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::returning("8902796431157");
        let ocr = FakeOcr::returning("rice, lentils, turmeric, salt and water");
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Text,
        )
        .await
        .unwrap();
        assert_eq!(decoder.attempts.load(Ordering::SeqCst), 0);
        assert!(result.is_vegetarian);
        assert_eq!(result.confidence, 70);
        assert_eq!(result.source, ScanSource::Ocr);
    }

    #[tokio::test]
    async fn test_text_at_minimum_length_is_not_enough() {
        let client = reqwest::Client::new();
        let camera = FakeCamera::new();
        let decoder = FakeDecoder::failing();
        // Exactly ten characters after trim, needs more than ten.
        let ocr = FakeOcr::returning(" 1234567890 ");
        let result = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Text,
        )
        .await
        .unwrap();
        assert_eq!(result.confidence, 0);
    }

    #[tokio::test]
    async fn test_camera_denied_is_typed_error() {
        let client = reqwest::Client::new();
        let mut camera = FakeCamera::new();
        camera.deny = true;
        let decoder = FakeDecoder::failing();
        let ocr = FakeOcr::failing();
        let err = run_scan(
            &client,
            &offline_config(),
            &camera,
            &decoder,
            &ocr,
            ScanMode::Barcode,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Camera access denied"));
    }
}
