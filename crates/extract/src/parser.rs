use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::Decimal;

use procura_core::domain::document::{Confidence, ExtractedDocument, ExtractedItem};

fn vendor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:vendor|supplier|from|company)[\s:]+([A-Za-z&][A-Za-z &]*)")
            .expect("vendor pattern")
    })
}

fn total_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"(?i)grand\s+total[\s:]+[$€£]?([\d,]+\.?\d*)",
            r"(?i)total[\s:]+[$€£]?([\d,]+\.?\d*)",
            r"(?i)amount[\s:]+[$€£]?([\d,]+\.?\d*)",
        ]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("total pattern"))
        .collect()
    })
}

fn item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(.+?)\s+(\d+)\s+[$€£]?([\d,]+\.\d{2})\s+[$€£]?([\d,]+\.\d{2})\s*$")
            .expect("item pattern")
    })
}

fn parse_money(raw: &str) -> Option<Decimal> {
    raw.replace(',', "").parse().ok()
}

/// Pulls vendor, line items and a grand total out of free-form invoice
/// text. Recognizes nothing it cannot match; a text with no recognizable
/// fields at all yields a soft-failed document.
pub fn parse_invoice_text(text: &str, confidence: Confidence) -> ExtractedDocument {
    let vendor = vendor_pattern()
        .captures(text)
        .map(|captures| captures[1].trim().to_string())
        .filter(|name| !name.is_empty());

    let total = total_patterns()
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|captures| parse_money(&captures[1]));

    let items = text
        .lines()
        .filter_map(|line| {
            let captures = item_pattern().captures(line)?;
            let name = captures[1].trim();
            // Skip rows that are really the summary line.
            if name.eq_ignore_ascii_case("total") || name.eq_ignore_ascii_case("grand total") {
                return None;
            }
            Some(ExtractedItem {
                name: name.to_string(),
                quantity: captures[2].parse().ok()?,
                unit_price: parse_money(&captures[3])?,
                line_total: parse_money(&captures[4])?,
            })
        })
        .collect::<Vec<_>>();

    if vendor.is_none() && items.is_empty() && total.is_none() {
        return ExtractedDocument::failed("no recognizable invoice fields in document text");
    }

    ExtractedDocument { vendor, items, total, confidence, failure: None }
}
