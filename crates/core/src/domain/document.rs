use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::files::FileRef;

/// Coarse signal for where the structured data came from: exact text
/// parsing (High) or approximate optical recognition (Low).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Low,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// Structured view of an uploaded proforma or receipt. Malformed input
/// never raises: it yields an empty document carrying a failure note, and
/// the caller decides whether to block or proceed with a warning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub vendor: Option<String>,
    pub items: Vec<ExtractedItem>,
    pub total: Option<Decimal>,
    pub confidence: Confidence,
    pub failure: Option<String>,
}

impl ExtractedDocument {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            vendor: None,
            items: Vec::new(),
            total: None,
            confidence: Confidence::Low,
            failure: Some(reason.into()),
        }
    }

    pub fn extraction_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// The only hard failure extraction may raise: the file reference itself
/// does not resolve. Unreadable or malformed content folds into the
/// document as a soft failure instead.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("file reference does not exist: {location}")]
    MissingFile { location: String },
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, file: &FileRef) -> Result<ExtractedDocument, ExtractError>;
}

/// Deterministic extractor for tests and demos: replays a fixed document
/// regardless of input file.
#[derive(Clone, Debug)]
pub struct StaticExtractor {
    document: ExtractedDocument,
}

impl StaticExtractor {
    pub fn new(document: ExtractedDocument) -> Self {
        Self { document }
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self { document: ExtractedDocument::failed(reason) }
    }
}

#[async_trait]
impl DocumentExtractor for StaticExtractor {
    async fn extract(&self, _file: &FileRef) -> Result<ExtractedDocument, ExtractError> {
        Ok(self.document.clone())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use super::{Confidence, DocumentExtractor, ExtractedDocument, ExtractedItem, StaticExtractor};
    use crate::files::{FileKind, FileRef};

    fn receipt_ref() -> FileRef {
        FileRef {
            kind: FileKind::Receipt,
            filename: "receipt.pdf".to_string(),
            location: "receipts/req-1/receipt.pdf".to_string(),
            sha256: "0".repeat(64),
            stored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn static_extractor_replays_the_fixed_document() {
        let document = ExtractedDocument {
            vendor: Some("Acme Supplies".to_string()),
            items: vec![ExtractedItem {
                name: "Paper".to_string(),
                quantity: 10,
                unit_price: Decimal::new(2500, 2),
                line_total: Decimal::new(25000, 2),
            }],
            total: Some(Decimal::new(25000, 2)),
            confidence: Confidence::High,
            failure: None,
        };

        let extractor = StaticExtractor::new(document.clone());
        let extracted = extractor.extract(&receipt_ref()).await.expect("extract");
        assert_eq!(extracted, document);
        assert!(!extracted.extraction_failed());
    }

    #[tokio::test]
    async fn failed_documents_carry_the_reason_and_low_confidence() {
        let extractor = StaticExtractor::failing("no text layer");
        let extracted = extractor.extract(&receipt_ref()).await.expect("soft failure");

        assert!(extracted.extraction_failed());
        assert_eq!(extracted.confidence, Confidence::Low);
        assert!(extracted.items.is_empty());
        assert_eq!(extracted.failure.as_deref(), Some("no text layer"));
    }
}
