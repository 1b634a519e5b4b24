//! Generation backend abstraction and implementations.
//!
//! Defines the [`GenerationProvider`] trait and concrete backends:
//! - **[`DisabledProvider`]**: returns errors; used when generation is not
//!   configured.
//! - **[`OllamaProvider`]**: a locally hosted inference server reached via
//!   `POST /api/generate`.
//! - **[`GeminiProvider`]**: the hosted Google Generative Language API.
//!
//! # Provider Selection
//!
//! | Config value | Provider | Default model |
//! |--------------|----------|---------------|
//! | `"disabled"` | [`DisabledProvider`] | (none) |
//! | `"ollama"` | [`OllamaProvider`] | `gemma2:latest` |
//! | `"gemini"` | [`GeminiProvider`] | `gemini-1.5-flash` |
//!
//! Use [`create_provider`] to validate the configured name; the actual call
//! is [`generate_text`], which dispatches on the config (kept as a free
//! function, matching the async dispatch pattern used elsewhere).
//!
//! # Credentials
//!
//! The Gemini key is read from `GEMINI_API_KEY` at first call, not at
//! construction, so a misconfigured key surfaces as a typed configuration
//! error exactly when generation is attempted. No retries on either
//! backend: callers fall back or surface the error with their own retry
//! affordance.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::GenerationConfig;
use crate::errors::{AppError, Result};

/// Default model for the Ollama backend.
pub const DEFAULT_OLLAMA_MODEL: &str = "gemma2:latest";
/// Default local Ollama URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
/// Default model for the Gemini backend.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Base URL for the Gemini API.
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Sampling options for one generation call.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub temperature: f32,
    pub top_p: f32,
    /// Ask the backend for a JSON response where supported (Gemini's
    /// response MIME type). Ollama ignores this; prompts carry the schema.
    pub json_mode: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            json_mode: false,
        }
    }
}

/// Trait for generation backends.
///
/// Carries backend metadata for display and validation; the generation call
/// itself is [`generate_text`].
pub trait GenerationProvider: Send + Sync {
    /// Backend name as configured ("ollama", "gemini", "disabled").
    fn provider_name(&self) -> &str;
    /// Model identifier the backend will run.
    fn model_name(&self) -> &str;
}

/// A no-op provider used when `generation.provider = "disabled"`.
pub struct DisabledProvider;

impl GenerationProvider for DisabledProvider {
    fn provider_name(&self) -> &str {
        "disabled"
    }
    fn model_name(&self) -> &str {
        "disabled"
    }
}

/// Local inference server speaking the Ollama generate API.
pub struct OllamaProvider {
    model: String,
}

impl GenerationProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }
    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Hosted Gemini backend. The API key is checked at call time, not here.
pub struct GeminiProvider {
    model: String,
}

impl GenerationProvider for GeminiProvider {
    fn provider_name(&self) -> &str {
        "gemini"
    }
    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Create the configured [`GenerationProvider`].
///
/// # Errors
///
/// Returns a configuration error for unknown provider names. A disabled
/// provider is constructed successfully; calls through it fail instead.
pub fn create_provider(config: &GenerationConfig) -> Result<Box<dyn GenerationProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "ollama" => Ok(Box::new(OllamaProvider {
            model: config.base_model().to_string(),
        })),
        "gemini" => Ok(Box::new(GeminiProvider {
            model: config.base_model().to_string(),
        })),
        other => Err(AppError::Config(format!(
            "Unknown generation provider: '{other}'. Must be disabled, ollama, or gemini."
        ))),
    }
}

/// Generate text for a prompt using the configured backend.
///
/// Dispatches on `config.provider`. The `model` argument allows per-flow
/// overrides (recipe model vs. search model) over the base model.
///
/// # Errors
///
/// - `"disabled"`: always a configuration error, no I/O.
/// - `"ollama"`: availability error when the server is unreachable or
///   non-2xx; malformed-response error when the reply shape is wrong.
/// - `"gemini"`: configuration error when `GEMINI_API_KEY` is missing or
///   rejected; availability error on other failures; malformed-response
///   error when no candidate text comes back.
pub async fn generate_text(
    client: &reqwest::Client,
    config: &GenerationConfig,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String> {
    match config.provider.as_str() {
        "ollama" => generate_ollama(client, config, model, prompt, options).await,
        "gemini" => generate_gemini(client, config, model, prompt, options).await,
        "disabled" => Err(AppError::Config(
            "Generation backend is disabled. Set generation.provider to ollama or gemini."
                .to_string(),
        )),
        other => Err(AppError::Config(format!(
            "Unknown generation provider: '{other}'"
        ))),
    }
}

// ============ Ollama backend ============

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

async fn generate_ollama(
    client: &reqwest::Client,
    config: &GenerationConfig,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String> {
    let base = config.ollama_url();
    let url = format!("{}/api/generate", base.trim_end_matches('/'));
    let body = OllamaRequest {
        model,
        prompt,
        stream: false,
        options: OllamaOptions {
            temperature: options.temperature,
            top_p: options.top_p,
        },
    };

    debug!(model, url = %url, "sending Ollama generate request");

    let response = client
        .post(&url)
        .json(&body)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(|e| {
            AppError::unavailable(
                "Ollama",
                format!("make sure Ollama is running on {base} ({e})"),
            )
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::unavailable(
            "Ollama",
            format!("make sure Ollama is running on {base} (HTTP {status})"),
        ));
    }

    let parsed: OllamaResponse = response
        .json()
        .await
        .map_err(|e| AppError::MalformedResponse(format!("Ollama reply was not JSON: {e}")))?;

    Ok(parsed.response)
}

// ============ Gemini backend ============

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GeminiGenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'a str,
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Debug, Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    parts: Option<Vec<GeminiCandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: Option<GeminiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

fn build_gemini_request<'a>(prompt: &'a str, options: &GenerationOptions) -> GeminiRequest<'a> {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: "user",
            parts: vec![GeminiPart { text: prompt }],
        }],
        generation_config: Some(GeminiGenerationConfig {
            temperature: options.temperature,
            top_p: options.top_p,
            response_mime_type: options.json_mode.then_some("application/json"),
        }),
    }
}

async fn generate_gemini(
    client: &reqwest::Client,
    config: &GenerationConfig,
    model: &str,
    prompt: &str,
    options: &GenerationOptions,
) -> Result<String> {
    let api_key = std::env::var(GEMINI_API_KEY_ENV).map_err(|_| {
        AppError::Config(format!("{GEMINI_API_KEY_ENV} environment variable not set"))
    })?;

    let url = format!("{GEMINI_API_BASE}/models/{model}:generateContent?key={api_key}");
    let body = build_gemini_request(prompt, options);

    debug!(model, "sending Gemini generateContent request");

    let response = client
        .post(&url)
        .json(&body)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(|e| AppError::unavailable("Gemini", e))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::unavailable("Gemini", e))?;

    if !status.is_success() {
        let message = serde_json::from_str::<GeminiErrorResponse>(&text)
            .ok()
            .and_then(|e| e.error)
            .map(|e| e.message)
            .unwrap_or_else(|| text.chars().take(200).collect());
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::Config(format!(
                "Gemini rejected the API key: {message}"
            )));
        }
        return Err(AppError::unavailable(
            "Gemini",
            format!("HTTP {status}: {message}"),
        ));
    }

    let parsed: GeminiResponse = serde_json::from_str(&text)
        .map_err(|e| AppError::MalformedResponse(format!("Gemini reply was not JSON: {e}")))?;

    let combined = parsed
        .candidates
        .unwrap_or_default()
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .map(|parts| {
            parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if combined.is_empty() {
        return Err(AppError::MalformedResponse(
            "Gemini response contained no candidate text".to_string(),
        ));
    }

    Ok(combined)
}
