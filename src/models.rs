//! Core data models used throughout veg-central.
//!
//! These types represent the verdicts, recipes, catalog entries, and
//! restaurant records that flow between the components and out to the
//! consuming views. JSON field names follow the camelCase shape those
//! views expect.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a scan verdict was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanSource {
    Barcode,
    Ocr,
}

/// Verdict for one scan attempt. Immutable after creation; discarded when
/// the user scans again.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// The text that was classified, or a placeholder describing the input.
    pub text: String,
    pub is_vegetarian: bool,
    /// Distinct matched lexicon terms in first-seen order.
    pub non_veg_ingredients: Vec<String>,
    pub analysis: String,
    /// 0-100. Zero means "no evidence either way", never certainty.
    pub confidence: u8,
    pub reasoning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
    pub source: ScanSource,
}

/// Recipe difficulty. Deserializes case-insensitively since generation
/// backends do not reliably capitalize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: '{}'", other)),
        }
    }
}

impl Serialize for Difficulty {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A generated recipe. Time and serving fields stay free-text as produced
/// by the model ("25 minutes", "4 people").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub name: String,
    pub description: String,
    pub prep_time: String,
    pub cook_time: String,
    pub servings: String,
    pub difficulty: Difficulty,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tips: Option<Vec<String>>,
}

/// Inputs to recipe generation. The selector fields accept "any" plus their
/// enumerated values; see [`crate::recipes`] for the option lists.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRequest {
    pub ingredients: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub meal_type: String,
    pub cooking_time: String,
    pub difficulty: String,
}

impl Default for RecipeRequest {
    fn default() -> Self {
        Self {
            ingredients: Vec::new(),
            dietary_preferences: vec!["vegetarian".to_string()],
            meal_type: "any".to_string(),
            cooking_time: "any".to_string(),
            difficulty: "any".to_string(),
        }
    }
}

/// One country entry in the cuisine directory.
#[derive(Debug, Clone, Serialize)]
pub struct Country {
    /// Short lowercase code ("in", "jp").
    pub code: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
    pub region: &'static str,
    /// Cuisine label shown next to the country ("South Asian", "Mediterranean").
    pub cuisine: &'static str,
    pub dishes: Vec<Dish>,
}

/// A notable vegetarian dish within a country guide.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub name: &'static str,
    pub description: &'static str,
    pub difficulty: Difficulty,
    pub cook_time: &'static str,
    pub main_ingredients: Vec<&'static str>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A restaurant hit from the geo query or the mock fallback list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restaurant {
    pub id: String,
    pub name: String,
    pub address: String,
    /// 0-5 stars.
    pub rating: f32,
    /// 1 (cheap) to 4 (expensive).
    pub price_level: u8,
    /// Kilometers from the query location, rounded to one decimal.
    pub distance: f64,
    pub is_open: bool,
    pub cuisine: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub coordinates: Coordinates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_case_insensitive() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!("MEDIUM".parse::<Difficulty>().unwrap(), Difficulty::Medium);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("expert".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_scan_result_serializes_camel_case() {
        let result = ScanResult {
            text: "tofu".to_string(),
            is_vegetarian: true,
            non_veg_ingredients: vec![],
            analysis: "ok".to_string(),
            confidence: 70,
            reasoning: "r".to_string(),
            barcode: None,
            product_name: None,
            source: ScanSource::Ocr,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isVegetarian"], true);
        assert_eq!(json["nonVegIngredients"], serde_json::json!([]));
        assert_eq!(json["source"], "ocr");
        assert!(json.get("barcode").is_none());
    }

    #[test]
    fn test_recipe_difficulty_roundtrip() {
        let recipe: Recipe = serde_json::from_str(
            r#"{
                "name": "Dal",
                "description": "Lentil stew",
                "prepTime": "10 minutes",
                "cookTime": "30 minutes",
                "servings": "4 people",
                "difficulty": "easy",
                "ingredients": ["lentils"],
                "instructions": ["simmer"]
            }"#,
        )
        .unwrap();
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert_eq!(recipe.tips, None);
        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["difficulty"], "Easy");
        assert_eq!(json["prepTime"], "10 minutes");
    }
}
