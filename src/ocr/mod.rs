pub mod document_ai;

use std::path::Path;

use async_trait::async_trait;

use crate::error::ScanError;

pub const FACE_MARKER: &str = "=== الوجه (Face) ===";
pub const BACK_MARKER: &str = "=== الخلفية (Back) ===";

#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// Return the text found in one stored image.
    async fn extract(&self, image: &Path) -> Result<String, ScanError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairText {
    pub face_text: String,
    pub back_text: String,
    pub combined_text: String,
}

impl PairText {
    pub fn new(face_text: String, back_text: String) -> Self {
        let combined_text = combine(&face_text, &back_text);
        Self {
            face_text,
            back_text,
            combined_text,
        }
    }
}

/// Join both sides into one blob, face first, each under its own marker.
pub fn combine(face_text: &str, back_text: &str) -> String {
    format!("{FACE_MARKER}\n{face_text}\n\n{BACK_MARKER}\n{back_text}")
}

/// OCR both sides of a card. The two calls run concurrently; either failing fails the pair.
pub async fn extract_pair(
    ocr: &dyn OcrProvider,
    face: &Path,
    back: &Path,
) -> Result<PairText, ScanError> {
    let (face_text, back_text) = tokio::try_join!(ocr.extract(face), ocr.extract(back))?;
    Ok(PairText::new(face_text, back_text))
}

/// Mime type Document AI expects for a stored image, judged by extension.
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("tif") | Some("tiff") => "image/tiff",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        Some("pdf") => "application/pdf",
        _ => "image/jpeg",
    }
}
