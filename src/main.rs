//! # Veg Central CLI (`veg`)
//!
//! The `veg` binary is the primary interface for Veg Central. It provides
//! commands for product scanning, recipe generation, cuisine browsing,
//! restaurant discovery, and configuration validation.
//!
//! ## Usage
//!
//! ```bash
//! veg --config ./veg.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `veg scan --barcode <code>` | Resolve a barcode and classify the product |
//! | `veg scan --text "<label>"` | Classify pasted ingredient or label text |
//! | `veg cook -i <ingredient> ...` | Generate a vegetarian recipe |
//! | `veg cuisine [query]` | Browse or search the cuisine directory |
//! | `veg cuisine <query> --ai` | Ask the AI cuisine guide |
//! | `veg nearby [--lat --lng]` | Find vegetarian-friendly restaurants |
//! | `veg check` | Validate configuration and show active backends |
//!
//! ## Examples
//!
//! ```bash
//! # Classify a product by barcode (OpenFoodFacts, then brand table)
//! veg scan --barcode 8902796431157
//!
//! # Classify an ingredient list without any network access
//! veg scan --text "water, sugar, gelatin, citric acid"
//!
//! # Generate a quick dinner recipe from what is in the fridge
//! veg cook -i paneer -i spinach -i rice --meal-type dinner --cooking-time quick
//!
//! # Find countries and dishes featuring tofu
//! veg cuisine tofu
//!
//! # Search around an explicit position with a 2 km radius
//! veg nearby --lat 28.6139 --lng 77.2090 --radius 2
//! ```

mod brands;
#[allow(dead_code)]
mod capture;
mod classify;
mod config;
mod cuisine;
#[allow(dead_code)]
mod errors;
mod generation;
#[allow(dead_code)]
mod ingredients;
mod lexicon;
mod models;
mod places;
mod products;
mod recipes;
mod repair;

use anyhow::bail;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::models::Coordinates;

/// Veg Central CLI, a vegetarian food companion for scanning, cooking,
/// and dining out.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file. A missing file means built-in defaults; the Gemini API key is
/// never read from the file, only from the `GEMINI_API_KEY` environment
/// variable.
#[derive(Parser)]
#[command(
    name = "veg",
    about = "Veg Central: a vegetarian food companion for scanning, cooking, and dining out",
    version,
    long_about = "Veg Central checks products for non-vegetarian ingredients (barcode lookup \
    with brand-table fallback, plus deterministic text classification), generates vegetarian \
    recipes through a local Ollama or hosted Gemini model, ships a searchable world cuisine \
    directory, and finds vegetarian-friendly restaurants via OpenStreetMap."
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./veg.toml`. All product-database, generation, and
    /// places settings are read from this file; a missing file falls back
    /// to built-in defaults.
    #[arg(long, global = true, default_value = "./veg.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Check whether a product is vegetarian.
    ///
    /// Resolves a barcode against the product database, falling back to the
    /// built-in brand table when the database is unreachable or has no
    /// record, or classifies pasted label text directly. Text
    /// classification is deterministic and fully offline.
    Scan {
        /// Product barcode (EAN/UPC digits).
        #[arg(long, conflicts_with = "text")]
        barcode: Option<String>,

        /// Ingredient list or label text to classify.
        #[arg(long)]
        text: Option<String>,

        /// Print the raw scan result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate a vegetarian recipe from ingredients on hand.
    ///
    /// Every ingredient passes the non-vegetarian gate before any model is
    /// called; a rejected ingredient aborts the command with the reason.
    Cook {
        /// An available ingredient (repeat for each one).
        #[arg(short = 'i', long = "ingredient")]
        ingredients: Vec<String>,

        /// Meal type: any, breakfast, lunch, dinner, snack, dessert.
        #[arg(long, default_value = "any")]
        meal_type: String,

        /// Cooking time: any, quick, medium, long.
        #[arg(long, default_value = "any")]
        cooking_time: String,

        /// Difficulty: any, easy, medium, hard.
        #[arg(long, default_value = "any")]
        difficulty: String,

        /// Dietary preference (repeatable): vegetarian, vegan, gluten-free,
        /// dairy-free. Defaults to vegetarian.
        #[arg(long = "dietary")]
        dietary: Vec<String>,

        /// Print the recipe as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Browse and search the world cuisine directory.
    ///
    /// Without a query, lists every country guide. With a query, matches
    /// country names, regions, cuisine labels, dish names, and dish
    /// ingredients. `--ai` asks the generation backend instead and degrades
    /// to a static notice when no backend is reachable.
    Cuisine {
        /// Search term (country, region, cuisine, or dish).
        query: Option<String>,

        /// Ask the AI cuisine guide instead of the built-in directory.
        #[arg(long)]
        ai: bool,

        /// Print matching country guides as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Find vegetarian-friendly restaurants nearby.
    ///
    /// Queries OpenStreetMap (Overpass) for vegetarian-tagged restaurants
    /// around the given position, sorted by distance. Without coordinates
    /// the demonstration area is shown instead.
    Nearby {
        /// Latitude of the search origin.
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude of the search origin.
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,

        /// Search radius in kilometres (overrides the configured radius).
        #[arg(long)]
        radius: Option<f64>,

        /// Print results as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration and show the active backends.
    Check,
}

/// CLI geolocation stub: positions always come from `--lat`/`--lng`, so the
/// locate-then-search flow sees an unsupported device and serves the
/// demonstration area.
struct NoGeolocation;

#[async_trait]
impl places::GeolocationSource for NoGeolocation {
    async fn current_position(
        &self,
        _options: places::GeoOptions,
    ) -> Result<Coordinates, errors::DeviceError> {
        Err(errors::DeviceError::LocationUnsupported)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays parseable.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = config::load_config_or_default(&cli.config)?;
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Scan {
            barcode,
            text,
            json,
        } => {
            run_scan(&client, &cfg, barcode, text, json).await?;
        }
        Commands::Cook {
            ingredients,
            meal_type,
            cooking_time,
            difficulty,
            dietary,
            json,
        } => {
            let session = build_session(&ingredients, meal_type, cooking_time, difficulty, dietary)?;
            run_cook(&client, &cfg, &session, json).await?;
        }
        Commands::Cuisine { query, ai, json } => {
            run_cuisine(&client, &cfg, query.as_deref().unwrap_or(""), ai, json).await?;
        }
        Commands::Nearby {
            lat,
            lng,
            radius,
            json,
        } => {
            run_nearby(&client, &cfg, lat, lng, radius, json).await?;
        }
        Commands::Check => {
            run_check(&cli.config, &cfg)?;
        }
    }

    Ok(())
}

async fn run_scan(
    client: &reqwest::Client,
    cfg: &config::Config,
    barcode: Option<String>,
    text: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let result = match (barcode, text) {
        (Some(code), None) => products::lookup_barcode(client, &cfg.products, &code).await,
        (None, Some(text)) => classify::classify_text(&text),
        _ => bail!("Provide exactly one of --barcode or --text."),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if let Some(name) = &result.product_name {
        println!("Product: {}", name);
    }
    let verdict = if result.is_vegetarian {
        "likely vegetarian"
    } else {
        "NOT vegetarian"
    };
    println!("Verdict: {} ({}% confidence)", verdict, result.confidence);
    if !result.non_veg_ingredients.is_empty() {
        println!("    found: {}", result.non_veg_ingredients.join(", "));
    }
    println!("    analysis: {}", result.analysis);
    println!("    reasoning: {}", result.reasoning);
    Ok(())
}

/// Validate the selector flags and build the cook session, rejecting
/// non-vegetarian ingredients up front.
fn build_session(
    ingredient_args: &[String],
    meal_type: String,
    cooking_time: String,
    difficulty: String,
    dietary: Vec<String>,
) -> anyhow::Result<ingredients::CookSession> {
    if !recipes::MEAL_TYPES.contains(&meal_type.as_str()) {
        bail!(
            "Unknown meal type: {}. Use {}.",
            meal_type,
            recipes::MEAL_TYPES.join(", ")
        );
    }
    if !recipes::COOKING_TIMES.contains(&cooking_time.as_str()) {
        bail!(
            "Unknown cooking time: {}. Use {}.",
            cooking_time,
            recipes::COOKING_TIMES.join(", ")
        );
    }
    if !recipes::DIFFICULTY_LEVELS.contains(&difficulty.as_str()) {
        bail!(
            "Unknown difficulty: {}. Use {}.",
            difficulty,
            recipes::DIFFICULTY_LEVELS.join(", ")
        );
    }
    for pref in &dietary {
        if !recipes::DIETARY_OPTIONS.contains(&pref.as_str()) {
            bail!(
                "Unknown dietary preference: {}. Use {}.",
                pref,
                recipes::DIETARY_OPTIONS.join(", ")
            );
        }
    }

    let mut session = ingredients::CookSession::new();
    for raw in ingredient_args {
        session.add_ingredient(raw)?;
    }
    session.meal_type = meal_type;
    session.cooking_time = cooking_time;
    session.difficulty = difficulty;
    if !dietary.is_empty() {
        session.dietary_preferences = dietary;
    }
    Ok(session)
}

async fn run_cook(
    client: &reqwest::Client,
    cfg: &config::Config,
    session: &ingredients::CookSession,
    json: bool,
) -> anyhow::Result<()> {
    let recipe = recipes::generate_recipe(client, cfg, &session.to_request()).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&recipe)?);
        return Ok(());
    }

    println!("{}", recipe.name);
    println!("{}", recipe.description);
    println!();
    println!(
        "    prep: {}  cook: {}  serves: {}  difficulty: {}",
        recipe.prep_time,
        recipe.cook_time,
        recipe.servings,
        recipe.difficulty.as_str()
    );
    println!();
    println!("Ingredients:");
    for item in &recipe.ingredients {
        println!("    - {}", item);
    }
    println!();
    println!("Instructions:");
    for (i, step) in recipe.instructions.iter().enumerate() {
        println!("    {}. {}", i + 1, step);
    }
    if let Some(tips) = &recipe.tips {
        if !tips.is_empty() {
            println!();
            println!("Tips:");
            for tip in tips {
                println!("    - {}", tip);
            }
        }
    }
    Ok(())
}

async fn run_cuisine(
    client: &reqwest::Client,
    cfg: &config::Config,
    query: &str,
    ai: bool,
    json: bool,
) -> anyhow::Result<()> {
    if ai {
        if query.trim().is_empty() {
            bail!("Provide a search query with --ai.");
        }
        println!("{}", cuisine::ai_cuisine_search(client, cfg, query).await);
        return Ok(());
    }

    let matches = cuisine::search_countries(query);

    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for country in &matches {
        println!(
            "{} {} ({}) - {} cuisine",
            country.flag, country.name, country.region, country.cuisine
        );
        for dish in &country.dishes {
            println!(
                "    {} ({}, {})",
                dish.name,
                dish.difficulty.as_str(),
                dish.cook_time
            );
            println!("        {}", dish.description);
            println!("        ingredients: {}", dish.main_ingredients.join(", "));
        }
        println!();
    }
    Ok(())
}

async fn run_nearby(
    client: &reqwest::Client,
    cfg: &config::Config,
    lat: Option<f64>,
    lng: Option<f64>,
    radius: Option<f64>,
    json: bool,
) -> anyhow::Result<()> {
    let mut places_cfg = cfg.places.clone();
    if let Some(km) = radius {
        if km <= 0.0 {
            bail!("--radius must be positive.");
        }
        places_cfg.radius_km = km;
    }

    let search = match (lat, lng) {
        (Some(lat), Some(lng)) => {
            let origin = Coordinates { lat, lng };
            let restaurants = places::search_nearby(client, &places_cfg, origin).await?;
            places::NearbySearch {
                location: origin,
                restaurants,
                location_error: None,
            }
        }
        _ => places::find_nearby_with_location(client, &places_cfg, &NoGeolocation).await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&search.restaurants)?);
        return Ok(());
    }

    if let Some(note) = &search.location_error {
        println!("{} Showing the demonstration area instead.", note);
    }
    if search.restaurants.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, restaurant) in search.restaurants.iter().enumerate() {
        let status = if restaurant.is_open { "open" } else { "closed" };
        println!(
            "{}. {} [{:.1} km] {} {}",
            i + 1,
            restaurant.name,
            restaurant.distance,
            "$".repeat(restaurant.price_level as usize),
            status
        );
        println!(
            "    rating: {:.1}    cuisine: {}",
            restaurant.rating,
            restaurant.cuisine.join(", ")
        );
        println!("    address: {}", restaurant.address);
        if let Some(phone) = &restaurant.phone {
            println!("    phone: {}", phone);
        }
        if let Some(website) = &restaurant.website {
            println!("    website: {}", website);
        }
        println!(
            "    map: {}",
            places::map_url(&places_cfg.osm_base_url, restaurant.coordinates)
        );
        println!(
            "    directions: {}",
            places::directions_url(&places_cfg.osm_base_url, search.location, restaurant.coordinates)
        );
        println!();
    }
    Ok(())
}

fn run_check(config_path: &std::path::Path, cfg: &config::Config) -> anyhow::Result<()> {
    if config_path.exists() {
        println!("config: {}", config_path.display());
    } else {
        println!("config: {} (not found, using defaults)", config_path.display());
    }

    let provider = generation::create_provider(&cfg.generation)?;
    println!(
        "generation: {} (model: {})",
        provider.provider_name(),
        provider.model_name()
    );
    match provider.provider_name() {
        "ollama" => {
            println!("    url: {}", cfg.generation.ollama_url());
        }
        "gemini" => {
            let key = if std::env::var(generation::GEMINI_API_KEY_ENV).is_ok() {
                "set"
            } else {
                "NOT SET"
            };
            println!("    {}: {}", generation::GEMINI_API_KEY_ENV, key);
        }
        _ => {}
    }
    if cfg.generation.is_enabled() {
        println!("    recipe model: {}", cfg.generation.model_for_recipes());
        println!("    search model: {}", cfg.generation.model_for_search());
    }
    println!(
        "products: {} (timeout {}s)",
        cfg.products.base_url, cfg.products.timeout_secs
    );
    println!(
        "places: {} (radius {} km, max {}, mock fallback {})",
        cfg.places.overpass_url,
        cfg.places.radius_km,
        cfg.places.max_results,
        cfg.places.mock_fallback
    );
    println!("scan: min text length {}", cfg.scan.min_text_len);
    println!("Configuration OK.");
    Ok(())
}
