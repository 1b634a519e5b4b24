//! Recipe generation.
//!
//! Builds the vegetarian-chef prompt from a [`RecipeRequest`], re-validates
//! the ingredient set, submits the prompt to the configured generation
//! backend in JSON mode, and parses the reply into a [`Recipe`] through the
//! repair pass in [`crate::repair`].
//!
//! Overlapping generation calls are not serialized; a caller firing two
//! requests keeps whichever result arrives last.

use tracing::info;

use crate::config::Config;
use crate::errors::{AppError, Result};
use crate::generation::{generate_text, GenerationOptions};
use crate::ingredients::check_ingredients;
use crate::models::{Recipe, RecipeRequest};
use crate::repair::extract_json;

/// Meal type options offered by the Cook flow.
pub const MEAL_TYPES: &[&str] = &["any", "breakfast", "lunch", "dinner", "snack", "dessert"];
/// Cooking time options ("quick" is under 30 minutes, "long" over an hour).
pub const COOKING_TIMES: &[&str] = &["any", "quick", "medium", "long"];
/// Difficulty options.
pub const DIFFICULTY_LEVELS: &[&str] = &["any", "easy", "medium", "hard"];
/// Dietary preference options.
pub const DIETARY_OPTIONS: &[&str] = &["vegetarian", "vegan", "gluten-free", "dairy-free"];

/// Render the chef prompt for one request.
///
/// The prompt pins the output to a single JSON object with a fixed schema;
/// the reply is still routed through [`extract_json`] because smaller models
/// wrap or slightly malform the object anyway.
pub fn build_prompt(request: &RecipeRequest) -> String {
    format!(
        r#"
You are an expert vegetarian chef. Create a delicious vegetarian recipe using the following available ingredients and preferences:

AVAILABLE INGREDIENTS: {ingredients}
DIETARY PREFERENCES: {dietary}
MEAL TYPE: {meal_type}
COOKING TIME: {cooking_time}
DIFFICULTY LEVEL: {difficulty}

Please create a complete recipe that:
1. Uses primarily the available ingredients (it's okay to add common pantry items)
2. Is strictly vegetarian (no meat, fish, or seafood)
3. Is practical and achievable
4. Includes clear step-by-step instructions

Respond in this exact JSON format:
{{
  "name": "Recipe Name",
  "description": "Brief appetizing description",
  "prepTime": "X minutes",
  "cookTime": "X minutes",
  "servings": "X people",
  "difficulty": "Easy/Medium/Hard",
  "ingredients": [
    "ingredient 1 with quantity",
    "ingredient 2 with quantity"
  ],
  "instructions": [
    "Step 1 instruction",
    "Step 2 instruction"
  ],
  "tips": [
    "Helpful tip 1",
    "Helpful tip 2"
  ]
}}

Make sure the recipe is creative, flavorful, and makes good use of the available ingredients. Include approximate quantities for all ingredients.
"#,
        ingredients = request.ingredients.join(", "),
        dietary = request.dietary_preferences.join(", "),
        meal_type = request.meal_type,
        cooking_time = request.cooking_time,
        difficulty = request.difficulty,
    )
}

/// Generate one recipe.
///
/// # Errors
///
/// - Input-validation error when the ingredient list is empty or contains a
///   lexicon match (the set is re-checked here, not only at entry).
/// - Configuration error when the generation backend is disabled or
///   misconfigured; no backend call is made.
/// - Availability or malformed-response errors from the backend call; the
///   reply is parsed all-or-nothing, never into a partial [`Recipe`].
pub async fn generate_recipe(
    client: &reqwest::Client,
    config: &Config,
    request: &RecipeRequest,
) -> Result<Recipe> {
    check_ingredients(&request.ingredients)?;

    let prompt = build_prompt(request);
    let options = GenerationOptions {
        temperature: config.generation.temperature,
        top_p: config.generation.top_p,
        json_mode: true,
    };
    let model = config.generation.model_for_recipes();

    info!(
        model,
        ingredients = request.ingredients.len(),
        "generating recipe"
    );

    let raw = generate_text(client, &config.generation, model, &prompt, &options).await?;
    parse_recipe(&raw)
}

/// Parse a backend reply into a [`Recipe`] via the JSON repair pass.
pub fn parse_recipe(raw: &str) -> Result<Recipe> {
    let value = extract_json(raw)?;
    serde_json::from_value(value).map_err(|e| {
        AppError::MalformedResponse(format!("recipe JSON missing or invalid fields: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    fn request() -> RecipeRequest {
        RecipeRequest {
            ingredients: vec!["paneer".to_string(), "spinach".to_string()],
            dietary_preferences: vec!["vegetarian".to_string(), "vegan".to_string()],
            meal_type: "dinner".to_string(),
            cooking_time: "quick".to_string(),
            difficulty: "easy".to_string(),
        }
    }

    #[test]
    fn test_prompt_interpolates_request_fields() {
        let prompt = build_prompt(&request());
        assert!(prompt.contains("AVAILABLE INGREDIENTS: paneer, spinach"));
        assert!(prompt.contains("DIETARY PREFERENCES: vegetarian, vegan"));
        assert!(prompt.contains("MEAL TYPE: dinner"));
        assert!(prompt.contains("COOKING TIME: quick"));
        assert!(prompt.contains("DIFFICULTY LEVEL: easy"));
        assert!(prompt.contains("Respond in this exact JSON format:"));
        assert!(prompt.contains("\"difficulty\": \"Easy/Medium/Hard\""));
    }

    #[test]
    fn test_parse_recipe_complete_reply() {
        let raw = r#"{
            "name": "Palak Paneer",
            "description": "Creamy spinach with paneer",
            "prepTime": "15 minutes",
            "cookTime": "25 minutes",
            "servings": "4 people",
            "difficulty": "Medium",
            "ingredients": ["250g paneer", "500g spinach"],
            "instructions": ["Blanch the spinach", "Simmer with paneer"],
            "tips": ["Serve with roti"]
        }"#;
        let recipe = parse_recipe(raw).unwrap();
        assert_eq!(recipe.name, "Palak Paneer");
        assert_eq!(recipe.difficulty, Difficulty::Medium);
        assert_eq!(recipe.instructions.len(), 2);
        assert_eq!(recipe.tips.as_deref(), Some(&["Serve with roti".to_string()][..]));
    }

    #[test]
    fn test_parse_recipe_repairs_wrapped_reply() {
        // Markdown fence, lowercase difficulty, trailing comma, no tips.
        let raw = "Here you go:\n```json\n{\"name\": \"Dal\", \"description\": \"Lentil stew\", \
                   \"prepTime\": \"5 minutes\", \"cookTime\": \"30 minutes\", \
                   \"servings\": \"2 people\", \"difficulty\": \"easy\", \
                   \"ingredients\": [\"1 cup dal\"], \"instructions\": [\"Boil\"],}\n```";
        let recipe = parse_recipe(raw).unwrap();
        assert_eq!(recipe.name, "Dal");
        assert_eq!(recipe.difficulty, Difficulty::Easy);
        assert!(recipe.tips.is_none());
    }

    #[test]
    fn test_parse_recipe_missing_fields_is_malformed() {
        let err = parse_recipe(r#"{"description": "no name"}"#).unwrap_err();
        assert!(matches!(err, AppError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_generate_rejects_empty_ingredients() {
        let client = reqwest::Client::new();
        let config = Config::default();
        let err = generate_recipe(&client, &config, &RecipeRequest::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("No ingredients supplied"));
    }

    #[tokio::test]
    async fn test_generate_regates_non_veg_ingredients() {
        let client = reqwest::Client::new();
        let config = Config::default();
        let request = RecipeRequest {
            ingredients: vec!["rice".to_string(), "chicken broth".to_string()],
            ..RecipeRequest::default()
        };
        let err = generate_recipe(&client, &config, &request).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Cannot generate vegetarian recipe"));
        assert!(message.contains("chicken broth"));
    }

    #[tokio::test]
    async fn test_generate_disabled_backend_is_config_error() {
        let client = reqwest::Client::new();
        let mut config = Config::default();
        config.generation.provider = "disabled".to_string();
        let request = RecipeRequest {
            ingredients: vec!["rice".to_string()],
            ..RecipeRequest::default()
        };
        let err = generate_recipe(&client, &config, &request).await.unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
