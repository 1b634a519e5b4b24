//! Static brand-pattern table: pre-authored verdicts keyed by exact barcode
//! or barcode prefix.
//!
//! Consulted when the live product database has no record or cannot be
//! reached. The table is ordered data, not logic: exact rules come before
//! prefix rules and the first match wins. Swap the table to change coverage.

use crate::models::{ScanResult, ScanSource};

/// How a barcode is tested against a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandRule {
    /// The barcode must equal this string exactly.
    Exact(&'static str),
    /// The barcode must start with these digits.
    Prefix(&'static str),
}

/// A pre-authored verdict for a known brand product line.
#[derive(Debug, Clone, Copy)]
pub struct BrandPattern {
    pub rule: BrandRule,
    pub brand: &'static str,
    pub product_name: &'static str,
    pub is_vegetarian: bool,
    pub non_veg_ingredients: &'static [&'static str],
    pub analysis: &'static str,
    pub confidence: u8,
    pub reasoning: &'static str,
}

/// Known brand patterns, exact rules first. First match wins.
pub const BRAND_PATTERNS: &[BrandPattern] = &[
    BrandPattern {
        rule: BrandRule::Exact("8902796431157"),
        brand: "Yummiez",
        product_name: "Yummiez Chicken Nuggets",
        is_vegetarian: false,
        non_veg_ingredients: &["chicken", "meat"],
        analysis: "CONFIRMED: This is Yummiez Chicken Nuggets - Contains chicken meat and is \
                   NOT vegetarian despite any misleading packaging.",
        confidence: 98,
        reasoning: "This specific barcode (8902796431157) is known to be associated with \
                    Yummiez chicken nuggets. The product name clearly indicates chicken \
                    content, making it non-vegetarian.",
    },
    BrandPattern {
        rule: BrandRule::Exact("0102370010284471"),
        brand: "Tyson",
        product_name: "Tyson Chicken Product",
        is_vegetarian: false,
        non_veg_ingredients: &["chicken", "meat"],
        analysis: "CONFIRMED: This is a Tyson chicken product - Contains chicken meat and is \
                   NOT vegetarian. Tyson is a major poultry company.",
        confidence: 95,
        reasoning: "This specific barcode (0102370010284471) belongs to Tyson Foods, a major \
                    American poultry company. All Tyson chicken products are non-vegetarian.",
    },
    BrandPattern {
        rule: BrandRule::Prefix("010237"),
        brand: "Tyson",
        product_name: "Tyson Product",
        is_vegetarian: false,
        non_veg_ingredients: &["likely chicken", "meat products"],
        analysis: "WARNING: This appears to be a Tyson product. Tyson is primarily a \
                   poultry/meat company - most products contain chicken or other meat.",
        confidence: 85,
        reasoning: "Barcode pattern suggests this is a Tyson Foods product. Tyson is \
                    primarily known for chicken and meat products.",
    },
    BrandPattern {
        rule: BrandRule::Prefix("890279643"),
        brand: "Yummiez",
        product_name: "Yummiez Product",
        is_vegetarian: false,
        non_veg_ingredients: &["potentially chicken", "meat products"],
        analysis: "WARNING: This appears to be a Yummiez product. Many Yummiez products \
                   contain chicken or other meat. Check the actual product packaging \
                   carefully.",
        confidence: 75,
        reasoning: "Barcode pattern suggests this is a Yummiez brand product. This brand is \
                    known for chicken-based frozen foods.",
    },
];

impl BrandPattern {
    fn matches(&self, barcode: &str) -> bool {
        match self.rule {
            BrandRule::Exact(code) => barcode == code,
            BrandRule::Prefix(prefix) => barcode.starts_with(prefix),
        }
    }

    fn verdict(&self, barcode: &str) -> ScanResult {
        let text = match self.rule {
            BrandRule::Exact(_) => {
                format!("Brand: {}, Product: {}", self.brand, self.product_name)
            }
            BrandRule::Prefix(_) => format!("Brand: {}, Barcode: {}", self.brand, barcode),
        };
        ScanResult {
            text,
            is_vegetarian: self.is_vegetarian,
            non_veg_ingredients: self
                .non_veg_ingredients
                .iter()
                .map(|s| s.to_string())
                .collect(),
            analysis: self.analysis.to_string(),
            confidence: self.confidence,
            reasoning: self.reasoning.to_string(),
            barcode: Some(barcode.to_string()),
            product_name: Some(self.product_name.to_string()),
            source: ScanSource::Barcode,
        }
    }
}

/// Look a barcode up in a pattern table. First match wins.
pub fn match_brand(barcode: &str, patterns: &[BrandPattern]) -> Option<ScanResult> {
    patterns
        .iter()
        .find(|p| p.matches(barcode))
        .map(|p| p.verdict(barcode))
}

/// Look a barcode up in the built-in table.
pub fn known_brand_verdict(barcode: &str) -> Option<ScanResult> {
    match_brand(barcode, BRAND_PATTERNS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_yummiez_barcode() {
        let result = known_brand_verdict("8902796431157").unwrap();
        assert!(!result.is_vegetarian);
        assert_eq!(result.confidence, 98);
        assert_eq!(result.product_name.as_deref(), Some("Yummiez Chicken Nuggets"));
        assert_eq!(result.non_veg_ingredients, vec!["chicken", "meat"]);
        assert_eq!(result.source, ScanSource::Barcode);
    }

    #[test]
    fn test_exact_rule_wins_over_prefix() {
        // 8902796431157 also starts with the Yummiez prefix 890279643; the
        // exact entry is listed first and must win.
        let result = known_brand_verdict("8902796431157").unwrap();
        assert_eq!(result.confidence, 98);
        assert_eq!(result.text, "Brand: Yummiez, Product: Yummiez Chicken Nuggets");
    }

    #[test]
    fn test_tyson_prefix_rule() {
        let result = known_brand_verdict("0102379999").unwrap();
        assert_eq!(result.confidence, 85);
        assert_eq!(result.product_name.as_deref(), Some("Tyson Product"));
        assert_eq!(result.text, "Brand: Tyson, Barcode: 0102379999");
    }

    #[test]
    fn test_yummiez_prefix_rule() {
        let result = known_brand_verdict("8902796430000").unwrap();
        assert_eq!(result.confidence, 75);
        assert_eq!(result.product_name.as_deref(), Some("Yummiez Product"));
    }

    #[test]
    fn test_unknown_barcode_matches_nothing() {
        assert!(known_brand_verdict("4006381333931").is_none());
        assert!(known_brand_verdict("").is_none());
    }
}
