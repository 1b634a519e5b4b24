//! Keyword-based vegetarian classification of free text.
//!
//! Pure and synchronous: product descriptions, OCR output, and manual
//! entries all pass through [`classify_text`]. Confidence tiers:
//!
//! | Verdict | Confidence |
//! |---------|-----------|
//! | clean vegetarian | 70 |
//! | lexicon match | 80 |
//! | product-name red flag | 95 |
//!
//! A clean verdict never reaches 100: absence of a lexicon hit is not
//! confirmation, only lack of counter-evidence.

use crate::lexicon;
use crate::models::{ScanResult, ScanSource};

/// Confidence for a clean vegetarian verdict.
pub const CONFIDENCE_VEGETARIAN: u8 = 70;
/// Confidence when a general lexicon term matched.
pub const CONFIDENCE_LEXICON: u8 = 80;
/// Confidence when a product-name red flag matched.
pub const CONFIDENCE_RED_FLAG: u8 = 95;

/// Classify free text into a scan verdict.
///
/// Matches the input against the red-flag set and the general lexicon
/// (substring, both directions), accumulates distinct terms in first-seen
/// order, and fills templated `analysis`/`reasoning` strings from the
/// matched tier. `source` defaults to [`ScanSource::Ocr`]; the barcode
/// lookup path overrides it.
pub fn classify_text(text: &str) -> ScanResult {
    let scan = lexicon::scan_text(text);
    let is_vegetarian = scan.terms.is_empty();

    let (analysis, reasoning, confidence) = if is_vegetarian {
        (
            "No obvious non-vegetarian ingredients detected in available text.".to_string(),
            "Basic keyword analysis found no common non-vegetarian terms in the provided \
             information."
                .to_string(),
            CONFIDENCE_VEGETARIAN,
        )
    } else if scan.red_flag {
        let found = scan.terms.join(", ");
        let indicators = scan.red_flag_terms().join(", ");
        (
            format!("ALERT: Product name suggests non-vegetarian content! Found: {found}"),
            format!(
                "CRITICAL: Product name contains non-vegetarian indicators ({indicators}). \
                 This suggests the product is NOT vegetarian despite any labeling claims."
            ),
            CONFIDENCE_RED_FLAG,
        )
    } else {
        let found = scan.terms.join(", ");
        (
            format!("Warning: Found non-vegetarian ingredients: {found}"),
            format!("Detected non-vegetarian keywords in the ingredients: {found}"),
            CONFIDENCE_LEXICON,
        )
    };

    ScanResult {
        text: text.to_string(),
        is_vegetarian,
        non_veg_ingredients: scan.terms.iter().map(|t| t.to_string()).collect(),
        analysis,
        confidence,
        reasoning,
        barcode: None,
        product_name: None,
        source: ScanSource::Ocr,
    }
}
