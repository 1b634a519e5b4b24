use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use crate::generation::{DEFAULT_GEMINI_MODEL, DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub products: ProductsConfig,
    #[serde(default)]
    pub places: PlacesConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base model; per-provider default applies when unset.
    #[serde(default)]
    pub model: Option<String>,
    /// Ollama base URL.
    #[serde(default)]
    pub url: Option<String>,
    /// Overrides the base model for recipe generation.
    #[serde(default)]
    pub recipe_model: Option<String>,
    /// Overrides the base model for cuisine search.
    #[serde(default)]
    pub search_model: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_top_p")]
    pub top_p: f32,
    #[serde(default = "default_generation_timeout")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: None,
            url: None,
            recipe_model: None,
            search_model: None,
            temperature: 0.7,
            top_p: 0.9,
            timeout_secs: 30,
        }
    }
}

fn default_provider() -> String {
    "ollama".to_string()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_top_p() -> f32 {
    0.9
}
fn default_generation_timeout() -> u64 {
    30
}

impl GenerationConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }

    pub fn ollama_url(&self) -> &str {
        self.url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL)
    }

    /// The configured base model, falling back to the provider default.
    pub fn base_model(&self) -> &str {
        if let Some(model) = self.model.as_deref() {
            return model;
        }
        match self.provider.as_str() {
            "gemini" => DEFAULT_GEMINI_MODEL,
            _ => DEFAULT_OLLAMA_MODEL,
        }
    }

    pub fn model_for_recipes(&self) -> &str {
        self.recipe_model.as_deref().unwrap_or_else(|| self.base_model())
    }

    pub fn model_for_search(&self) -> &str {
        self.search_model.as_deref().unwrap_or_else(|| self.base_model())
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProductsConfig {
    #[serde(default = "default_products_url")]
    pub base_url: String,
    #[serde(default = "default_products_timeout")]
    pub timeout_secs: u64,
}

impl Default for ProductsConfig {
    fn default() -> Self {
        Self {
            base_url: default_products_url(),
            timeout_secs: default_products_timeout(),
        }
    }
}

fn default_products_url() -> String {
    "https://world.openfoodfacts.org".to_string()
}
fn default_products_timeout() -> u64 {
    15
}

#[derive(Debug, Deserialize, Clone)]
pub struct PlacesConfig {
    #[serde(default = "default_overpass_url")]
    pub overpass_url: String,
    #[serde(default = "default_osm_base_url")]
    pub osm_base_url: String,
    /// Search radius in kilometers.
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_places_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_geolocation_timeout")]
    pub geolocation_timeout_secs: u64,
    /// Substitute the static demonstration list when the live query fails
    /// or returns nothing.
    #[serde(default = "default_mock_fallback")]
    pub mock_fallback: bool,
}

impl Default for PlacesConfig {
    fn default() -> Self {
        Self {
            overpass_url: default_overpass_url(),
            osm_base_url: default_osm_base_url(),
            radius_km: default_radius_km(),
            max_results: default_max_results(),
            timeout_secs: default_places_timeout(),
            geolocation_timeout_secs: default_geolocation_timeout(),
            mock_fallback: default_mock_fallback(),
        }
    }
}

fn default_overpass_url() -> String {
    "https://overpass-api.de/api/interpreter".to_string()
}
fn default_osm_base_url() -> String {
    "https://www.openstreetmap.org".to_string()
}
fn default_radius_km() -> f64 {
    5.0
}
fn default_max_results() -> usize {
    20
}
fn default_places_timeout() -> u64 {
    25
}
fn default_geolocation_timeout() -> u64 {
    10
}
fn default_mock_fallback() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Minimum trimmed OCR text length worth classifying.
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_text_len: default_min_text_len(),
        }
    }
}

fn default_min_text_len() -> usize {
    10
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load a config file, or fall back to built-in defaults when the file does
/// not exist. Secrets (the Gemini key) never live in the file; they come
/// from the environment at first use.
pub fn load_config_or_default(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    load_config(path)
}

fn validate(config: &Config) -> Result<()> {
    match config.generation.provider.as_str() {
        "disabled" | "ollama" | "gemini" => {}
        other => anyhow::bail!(
            "Unknown generation provider: '{}'. Must be disabled, ollama, or gemini.",
            other
        ),
    }

    if !(0.0..=2.0).contains(&config.generation.temperature) {
        anyhow::bail!("generation.temperature must be in [0.0, 2.0]");
    }

    if !(config.generation.top_p > 0.0 && config.generation.top_p <= 1.0) {
        anyhow::bail!("generation.top_p must be in (0.0, 1.0]");
    }

    if config.generation.timeout_secs == 0 || config.products.timeout_secs == 0 {
        anyhow::bail!("timeout_secs must be >= 1");
    }

    if config.places.radius_km <= 0.0 {
        anyhow::bail!("places.radius_km must be > 0");
    }

    if config.places.max_results < 1 {
        anyhow::bail!("places.max_results must be >= 1");
    }

    if config.places.timeout_secs == 0 || config.places.geolocation_timeout_secs == 0 {
        anyhow::bail!("places timeouts must be >= 1");
    }

    if config.scan.min_text_len == 0 {
        anyhow::bail!("scan.min_text_len must be >= 1");
    }

    Ok(())
}
