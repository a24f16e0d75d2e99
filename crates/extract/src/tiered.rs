use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use procura_core::config::ExtractionConfig;
use procura_core::domain::document::{
    Confidence, DocumentExtractor, ExtractError, ExtractedDocument,
};
use procura_core::files::FileRef;

use crate::parser;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

/// Extractor with two tiers: the machine-readable text layer of a PDF, and
/// optical recognition for scans and images. A document that clears the
/// text-quality gate on the first tier never reaches the second.
///
/// The only hard error is a file reference that does not resolve under the
/// media root. Everything else folds into the document as a soft failure.
pub struct TieredExtractor {
    media_root: PathBuf,
    config: ExtractionConfig,
}

impl TieredExtractor {
    pub fn new(media_root: impl Into<PathBuf>, config: ExtractionConfig) -> Self {
        Self { media_root: media_root.into(), config }
    }
}

#[async_trait]
impl DocumentExtractor for TieredExtractor {
    async fn extract(&self, file: &FileRef) -> Result<ExtractedDocument, ExtractError> {
        let path = self.media_root.join(&file.location);
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Err(ExtractError::MissingFile { location: file.location.clone() });
        }

        let timeout = Duration::from_secs(self.config.timeout_secs.max(1));
        let config = self.config.clone();
        let location = file.location.clone();
        let task = tokio::task::spawn_blocking(move || extract_blocking(&path, &config));

        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(document)) => {
                if let Some(reason) = &document.failure {
                    warn!(location = %location, reason = %reason, "document extraction failed softly");
                } else {
                    debug!(
                        location = %location,
                        confidence = ?document.confidence,
                        items = document.items.len(),
                        "document extracted",
                    );
                }
                Ok(document)
            }
            Ok(Err(join_error)) => {
                warn!(location = %location, error = %join_error, "extraction task aborted");
                Ok(ExtractedDocument::failed(format!("extraction task aborted: {join_error}")))
            }
            Err(_) => {
                warn!(location = %location, timeout_secs = timeout.as_secs(), "extraction timed out");
                Ok(ExtractedDocument::failed(format!(
                    "extraction timed out after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }
}

fn extract_blocking(path: &Path, config: &ExtractionConfig) -> ExtractedDocument {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    if extension == "pdf" {
        match pdf_extract::extract_text(path) {
            Ok(text) if text_quality_ok(&text, config) => {
                return parser::parse_invoice_text(&text, Confidence::High);
            }
            Ok(_) => {
                debug!(path = %path.display(), "text layer below quality gate, trying optical tier");
            }
            Err(error) => {
                debug!(path = %path.display(), error = %error, "no readable text layer, trying optical tier");
            }
        }
        return ocr_tier(path, config);
    }

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return ocr_tier(path, config);
    }

    ExtractedDocument::failed(format!("unsupported document type: .{extension}"))
}

fn text_quality_ok(text: &str, config: &ExtractionConfig) -> bool {
    text.len() > config.min_text_len && text.split_whitespace().count() > config.min_text_words
}

#[cfg(feature = "ocr")]
fn ocr_tier(path: &Path, config: &ExtractionConfig) -> ExtractedDocument {
    match recognize(path, &config.ocr_language) {
        Ok(text) if text_quality_ok(&text, config) => {
            parser::parse_invoice_text(&text, Confidence::Low)
        }
        Ok(_) => ExtractedDocument::failed("optical recognition produced too little text"),
        Err(reason) => ExtractedDocument::failed(reason),
    }
}

#[cfg(feature = "ocr")]
fn recognize(path: &Path, language: &str) -> Result<String, String> {
    let path = path.to_str().ok_or_else(|| "non-utf8 document path".to_string())?;
    tesseract::Tesseract::new(None, Some(language))
        .map_err(|error| format!("optical engine init: {error}"))?
        .set_image(path)
        .map_err(|error| format!("optical engine image load: {error}"))?
        .recognize()
        .map_err(|error| format!("optical recognition: {error}"))?
        .get_text()
        .map_err(|error| format!("optical text read: {error}"))
}

#[cfg(not(feature = "ocr"))]
fn ocr_tier(_path: &Path, _config: &ExtractionConfig) -> ExtractedDocument {
    ExtractedDocument::failed(
        "document has no machine-readable text layer and optical recognition is not enabled",
    )
}
