//! Barcode resolution against the OpenFoodFacts product database, with the
//! brand-pattern table as the offline secondary source.
//!
//! Resolution order is strict and stops at the first success:
//!
//! 1. `GET {base_url}/api/v0/product/{barcode}.json`; if a product record
//!    exists, its name and ingredient text are classified.
//! 2. The static [`crate::brands`] table.
//! 3. An explicit unknown-product result (confidence 0) steering the user
//!    toward text-scan mode.
//!
//! Network failure on step 1 is treated identically to "no record found":
//! connectivity loss must never block the offline brand-pattern path, so
//! [`lookup_barcode`] is infallible by construction.

use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::brands;
use crate::classify::classify_text;
use crate::config::ProductsConfig;
use crate::errors::Result;
use crate::models::{ScanResult, ScanSource};

#[derive(Debug, Deserialize)]
struct ProductResponse {
    product: Option<ProductRecord>,
}

/// The subset of an OpenFoodFacts record this flow reads. Everything is
/// optional; third-party records are parsed defensively.
#[derive(Debug, Default, Deserialize)]
pub struct ProductRecord {
    #[serde(default)]
    product_name: Option<String>,
    #[serde(default)]
    product_name_en: Option<String>,
    #[serde(default)]
    ingredients_text: Option<String>,
    #[serde(default)]
    ingredients_text_en: Option<String>,
}

impl ProductRecord {
    fn display_name(&self) -> String {
        self.product_name
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.product_name_en.clone().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| "Unknown Product".to_string())
    }

    fn ingredients(&self) -> String {
        self.ingredients_text
            .clone()
            .filter(|s| !s.is_empty())
            .or_else(|| self.ingredients_text_en.clone().filter(|s| !s.is_empty()))
            .unwrap_or_default()
    }
}

/// Resolve a barcode to a scan verdict. Never fails; every error path
/// degrades to a lower-fidelity source.
pub async fn lookup_barcode(
    client: &reqwest::Client,
    config: &ProductsConfig,
    barcode: &str,
) -> ScanResult {
    match fetch_product(client, config, barcode).await {
        Ok(Some(record)) => {
            debug!(barcode, "product database hit");
            classify_record(barcode, &record)
        }
        Ok(None) => {
            debug!(barcode, "no product record, consulting brand patterns");
            brands::known_brand_verdict(barcode).unwrap_or_else(|| unknown_product(barcode))
        }
        Err(err) => {
            warn!(barcode, error = %err, "product lookup failed, consulting brand patterns");
            brands::known_brand_verdict(barcode).unwrap_or_else(|| unknown_product(barcode))
        }
    }
}

/// Fetch one product record. `Ok(None)` covers both "no record" and
/// non-2xx responses; only transport failures surface as errors, and the
/// caller folds those into the same fallback.
async fn fetch_product(
    client: &reqwest::Client,
    config: &ProductsConfig,
    barcode: &str,
) -> Result<Option<ProductRecord>> {
    let url = format!(
        "{}/api/v0/product/{}.json",
        config.base_url.trim_end_matches('/'),
        barcode
    );

    let response = client
        .get(&url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await?;

    if !response.status().is_success() {
        debug!(barcode, status = %response.status(), "product database returned non-success");
        return Ok(None);
    }

    let parsed: ProductResponse = response.json().await?;
    Ok(parsed.product)
}

fn classify_record(barcode: &str, record: &ProductRecord) -> ScanResult {
    let product_name = record.display_name();
    let text = format!(
        "Product: {}\nIngredients: {}",
        product_name,
        record.ingredients()
    );
    let mut result = classify_text(&text);
    result.barcode = Some(barcode.to_string());
    result.product_name = Some(product_name);
    result.source = ScanSource::Barcode;
    result
}

fn unknown_product(barcode: &str) -> ScanResult {
    ScanResult {
        text: format!("Barcode: {barcode}"),
        is_vegetarian: false,
        non_veg_ingredients: Vec::new(),
        analysis: "Product not found in international database. For Indian products, try \
                   scanning the ingredient list or product name directly for more accurate \
                   results."
            .to_string(),
        confidence: 0,
        reasoning: "This barcode is not in the OpenFoodFacts database. Many Indian products \
                    are not yet catalogued in international databases."
            .to_string(),
        barcode: Some(barcode.to_string()),
        product_name: Some("Unknown Product".to_string()),
        source: ScanSource::Barcode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_config() -> ProductsConfig {
        ProductsConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            timeout_secs: 1,
        }
    }

    #[tokio::test]
    async fn test_brand_pattern_wins_when_database_unreachable() {
        let client = reqwest::Client::new();
        let result = lookup_barcode(&client, &unreachable_config(), "8902796431157").await;
        assert!(!result.is_vegetarian);
        assert_eq!(result.confidence, 98);
        assert_eq!(result.product_name.as_deref(), Some("Yummiez Chicken Nuggets"));
    }

    #[tokio::test]
    async fn test_unknown_barcode_when_database_unreachable() {
        let client = reqwest::Client::new();
        let result = lookup_barcode(&client, &unreachable_config(), "1234567890000").await;
        assert_eq!(result.confidence, 0);
        assert_eq!(result.product_name.as_deref(), Some("Unknown Product"));
        assert!(!result.is_vegetarian);
        assert!(result.non_veg_ingredients.is_empty());
        assert_eq!(result.source, ScanSource::Barcode);
        assert_eq!(result.barcode.as_deref(), Some("1234567890000"));
    }

    #[test]
    fn test_classify_record_concatenates_name_and_ingredients() {
        let record = ProductRecord {
            product_name: Some("Veggie Nuggets".to_string()),
            ingredients_text: Some("soy protein, water, wheat flour".to_string()),
            ..Default::default()
        };
        let result = classify_record("123", &record);
        // "nuggets" in the name line trips the red-flag tier even for soy.
        assert!(!result.is_vegetarian);
        assert_eq!(result.source, ScanSource::Barcode);
        assert_eq!(result.product_name.as_deref(), Some("Veggie Nuggets"));
        assert!(result.text.starts_with("Product: Veggie Nuggets"));
    }

    #[test]
    fn test_record_name_fallback_order() {
        let record = ProductRecord {
            product_name: None,
            product_name_en: Some("Imported Tofu".to_string()),
            ..Default::default()
        };
        assert_eq!(record.display_name(), "Imported Tofu");
        assert_eq!(ProductRecord::default().display_name(), "Unknown Product");
    }
}
