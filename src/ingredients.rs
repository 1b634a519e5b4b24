//! Working ingredient set for the Cook flow.
//!
//! Entries are normalized (lower-cased, trimmed), deduplicated
//! case-insensitively, and kept in insertion order for display. Every
//! insertion passes the lexicon gate; generation re-validates the whole set
//! because removals must also re-clear a standing error.

use crate::errors::{AppError, Result};
use crate::lexicon;
use crate::models::RecipeRequest;

/// Outcome of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// Case-insensitive duplicate; silently ignored.
    Duplicate,
    /// Empty or whitespace-only input; ignored without error.
    Empty,
}

/// Reject a full ingredient list if any entry matches the lexicon or the
/// list is empty. Used both by [`CookSession`] and at generation time.
pub fn check_ingredients(ingredients: &[String]) -> Result<()> {
    if ingredients.is_empty() {
        return Err(AppError::InvalidInput(
            "No ingredients supplied. Add at least one ingredient before generating.".to_string(),
        ));
    }

    let offending: Vec<&str> = ingredients
        .iter()
        .filter(|entry| lexicon::lexicon_match(entry).is_some())
        .map(|entry| entry.as_str())
        .collect();

    if !offending.is_empty() {
        return Err(AppError::InvalidInput(format!(
            "Cannot generate vegetarian recipe. Non-vegetarian ingredients detected: {}. \
             Please remove these ingredients and try again.",
            offending.join(", ")
        )));
    }

    Ok(())
}

/// Transient state for one Cook session: the ingredient set, the request
/// preferences, and the last gate error. [`CookSession::reset`] clears all
/// of it atomically.
#[derive(Debug, Clone)]
pub struct CookSession {
    ingredients: Vec<String>,
    pub dietary_preferences: Vec<String>,
    pub meal_type: String,
    pub cooking_time: String,
    pub difficulty: String,
    last_error: Option<String>,
}

impl Default for CookSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CookSession {
    pub fn new() -> Self {
        let defaults = RecipeRequest::default();
        Self {
            ingredients: Vec::new(),
            dietary_preferences: defaults.dietary_preferences,
            meal_type: defaults.meal_type,
            cooking_time: defaults.cooking_time,
            difficulty: defaults.difficulty,
            last_error: None,
        }
    }

    pub fn ingredients(&self) -> &[String] {
        &self.ingredients
    }

    /// The last gate error, if one is standing.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Gate and insert one ingredient.
    ///
    /// A lexicon match rejects the entry, leaves the set untouched, and
    /// records the error for display. Success and silent ignores clear any
    /// standing error.
    pub fn add_ingredient(&mut self, raw: &str) -> Result<AddOutcome> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Ok(AddOutcome::Empty);
        }

        if lexicon::lexicon_match(&normalized).is_some() {
            let message = format!(
                "\"{}\" is not suitable for vegetarian recipes. Please add only vegetarian \
                 ingredients.",
                raw.trim()
            );
            self.last_error = Some(message.clone());
            return Err(AppError::InvalidInput(message));
        }

        self.last_error = None;
        if self.ingredients.contains(&normalized) {
            return Ok(AddOutcome::Duplicate);
        }
        self.ingredients.push(normalized);
        Ok(AddOutcome::Added)
    }

    /// Remove by display index. Clears any standing error.
    pub fn remove_ingredient(&mut self, index: usize) -> Option<String> {
        self.last_error = None;
        if index < self.ingredients.len() {
            Some(self.ingredients.remove(index))
        } else {
            None
        }
    }

    /// Entries currently matching the lexicon. Empty unless a caller built
    /// the set before the lexicon changed; re-checked at generation time.
    pub fn non_veg_entries(&self) -> Vec<String> {
        self.ingredients
            .iter()
            .filter(|entry| lexicon::lexicon_match(entry).is_some())
            .cloned()
            .collect()
    }

    /// Generation-time gate over the whole set.
    pub fn validate_for_generation(&self) -> Result<()> {
        check_ingredients(&self.ingredients)
    }

    /// Build the generation request from the current state.
    pub fn to_request(&self) -> RecipeRequest {
        RecipeRequest {
            ingredients: self.ingredients.clone(),
            dietary_preferences: self.dietary_preferences.clone(),
            meal_type: self.meal_type.clone(),
            cooking_time: self.cooking_time.clone(),
            difficulty: self.difficulty.clone(),
        }
    }

    /// Clear ingredients, error state, and preferences back to defaults in
    /// one step.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_chicken_broth_and_stays_empty() {
        let mut session = CookSession::new();
        let err = session.add_ingredient("Chicken Broth").unwrap_err();
        assert!(err.to_string().contains("not suitable for vegetarian recipes"));
        assert!(err.to_string().contains("Chicken Broth"));
        assert!(session.ingredients().is_empty());
        assert!(session.last_error().is_some());
    }

    #[test]
    fn test_case_insensitive_dedup() {
        let mut session = CookSession::new();
        assert_eq!(session.add_ingredient("tomato").unwrap(), AddOutcome::Added);
        assert_eq!(
            session.add_ingredient("Tomato").unwrap(),
            AddOutcome::Duplicate
        );
        assert_eq!(session.ingredients(), ["tomato"]);
    }

    #[test]
    fn test_empty_input_ignored() {
        let mut session = CookSession::new();
        assert_eq!(session.add_ingredient("   ").unwrap(), AddOutcome::Empty);
        assert!(session.ingredients().is_empty());
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut session = CookSession::new();
        for item in ["rice", "tomato", "paneer"] {
            session.add_ingredient(item).unwrap();
        }
        assert_eq!(session.ingredients(), ["rice", "tomato", "paneer"]);
        session.remove_ingredient(1);
        assert_eq!(session.ingredients(), ["rice", "paneer"]);
    }

    #[test]
    fn test_removal_clears_standing_error() {
        let mut session = CookSession::new();
        session.add_ingredient("rice").unwrap();
        let _ = session.add_ingredient("bacon");
        assert!(session.last_error().is_some());
        session.remove_ingredient(0);
        assert!(session.last_error().is_none());
    }

    #[test]
    fn test_empty_set_fails_generation_gate() {
        let session = CookSession::new();
        let err = session.validate_for_generation().unwrap_err();
        assert!(err.to_string().contains("No ingredients supplied"));
    }

    #[test]
    fn test_generation_gate_names_offending_entries() {
        let err = check_ingredients(&[
            "rice".to_string(),
            "chicken stock".to_string(),
            "fish sauce".to_string(),
        ])
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Cannot generate vegetarian recipe"));
        assert!(message.contains("chicken stock"));
        assert!(message.contains("fish sauce"));
    }

    #[test]
    fn test_reset_clears_everything_atomically() {
        let mut session = CookSession::new();
        session.add_ingredient("rice").unwrap();
        session.meal_type = "dinner".to_string();
        session.dietary_preferences.push("vegan".to_string());
        let _ = session.add_ingredient("ham");
        session.reset();
        assert!(session.ingredients().is_empty());
        assert!(session.last_error().is_none());
        assert_eq!(session.meal_type, "any");
        assert_eq!(session.dietary_preferences, ["vegetarian"]);
    }
}
