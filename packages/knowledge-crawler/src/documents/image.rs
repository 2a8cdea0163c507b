//! OCR over informational images (placement infographics and the like).

use async_trait::async_trait;
use tokio::process::Command;

use super::{ExtractedText, TextExtractor};
use crate::error::{ExtractError, ExtractResult};

/// Recovers text from an image by preprocessing deterministically
/// (grayscale, fixed contrast boost) and handing the result to the
/// `tesseract` binary. Hosts without tesseract fail with
/// `ExtractError::OcrUnavailable`, which the pipeline treats like any other
/// per-document failure.
pub struct ImageTextExtractor {
    contrast_boost: f32,
    language: String,
}

impl Default for ImageTextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageTextExtractor {
    pub fn new() -> Self {
        Self {
            contrast_boost: 24.0,
            language: "eng".to_string(),
        }
    }

    /// Set the contrast adjustment applied before OCR.
    pub fn with_contrast_boost(mut self, boost: f32) -> Self {
        self.contrast_boost = boost;
        self
    }

    /// Set the tesseract language pack.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Grayscale + contrast normalization; identical input bytes always
    /// produce identical preprocessed pixels.
    fn preprocess(&self, bytes: &[u8]) -> ExtractResult<image::DynamicImage> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| ExtractError::Image(e.to_string()))?;
        Ok(decoded.grayscale().adjust_contrast(self.contrast_boost))
    }
}

#[async_trait]
impl TextExtractor for ImageTextExtractor {
    async fn extract_text(&self, bytes: &[u8]) -> ExtractResult<ExtractedText> {
        let preprocessed = self.preprocess(bytes)?;

        let input = tempfile::Builder::new()
            .prefix("kc-ocr-")
            .suffix(".png")
            .tempfile()
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;
        preprocessed
            .save_with_format(input.path(), image::ImageFormat::Png)
            .map_err(|e| ExtractError::Ocr(e.to_string()))?;

        let output = Command::new("tesseract")
            .arg(input.path())
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::OcrUnavailable
                } else {
                    ExtractError::Ocr(e.to_string())
                }
            })?;

        if !output.status.success() {
            return Err(ExtractError::Ocr(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }

        Ok(ExtractedText {
            text: String::from_utf8_lossy(&output.stdout).to_string(),
            page_count: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_undecodable_bytes_are_image_error() {
        let extractor = ImageTextExtractor::new();
        let result = extractor.extract_text(b"definitely not an image").await;
        assert!(matches!(result, Err(ExtractError::Image(_))));
    }

    #[test]
    fn test_preprocess_is_deterministic() {
        // 2x2 PNG built in-memory
        let mut buffer = std::io::Cursor::new(Vec::new());
        let img = image::DynamicImage::new_rgb8(2, 2);
        img.write_to(&mut buffer, image::ImageFormat::Png).unwrap();
        let bytes = buffer.into_inner();

        let extractor = ImageTextExtractor::new();
        let a = extractor.preprocess(&bytes).unwrap().into_bytes();
        let b = extractor.preprocess(&bytes).unwrap().into_bytes();
        assert_eq!(a, b);
    }
}
