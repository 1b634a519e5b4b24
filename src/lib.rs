//! # Veg Central
//!
//! A vegetarian food companion: scan products, cook from what you have,
//! explore world cuisines, and find veg-friendly restaurants nearby.
//!
//! Product scanning decodes barcodes (with OCR fallback) and resolves them
//! against OpenFoodFacts plus a static brand table, then classifies the
//! ingredient text with a deterministic non-vegetarian lexicon. Recipe
//! generation gates ingredients through the same lexicon before prompting a
//! local Ollama or remote Gemini model and repairing the JSON reply.
//! Restaurant discovery queries Overpass for vegetarian-tagged places and
//! degrades to a built-in mock list when the network is out.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────┐  ┌────────┐  ┌─────────┐  ┌────────┐
//! │  scan  │  │  cook  │  │ cuisine │  │ nearby │
//! └───┬────┘  └───┬────┘  └────┬────┘  └───┬────┘
//!     │           │            │           │
//!     ▼           ▼            ▼           ▼
//! ┌──────────────────────────────────────────────┐
//! │   lexicon · products · generation · places   │
//! │  classifier, OFF + brands, LLM, Overpass     │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! veg scan --text "water, sugar, chicken extract"
//! veg scan --barcode 8902796431157
//! veg cook -i tomato -i rice -i paneer
//! veg cuisine tofu
//! veg cuisine "comfort food for a cold evening" --ai
//! veg nearby --lat 28.6139 --lng 77.2090
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`errors`] | Error taxonomy |
//! | [`lexicon`] | Non-vegetarian ingredient lexicon |
//! | [`classify`] | Deterministic ingredient-text classifier |
//! | [`capture`] | Camera scan pipeline (barcode + OCR fallback) |
//! | [`products`] | Barcode lookup chain |
//! | [`brands`] | Static brand-pattern table |
//! | [`ingredients`] | Cook-session ingredient list and veg gate |
//! | [`recipes`] | Recipe prompt building and generation |
//! | [`generation`] | Text generation provider abstraction |
//! | [`repair`] | JSON extraction and repair for model replies |
//! | [`cuisine`] | World cuisine directory and search |
//! | [`places`] | Nearby restaurant discovery |

pub mod brands;
pub mod capture;
pub mod classify;
pub mod config;
pub mod cuisine;
pub mod errors;
pub mod generation;
pub mod ingredients;
pub mod lexicon;
pub mod models;
pub mod places;
pub mod products;
pub mod recipes;
pub mod repair;
