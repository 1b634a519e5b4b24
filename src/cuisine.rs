//! Cuisine directory: static country catalog, substring search, and the
//! optional AI-assisted free-text search.
//!
//! The catalog is read-only reference data; search filters it in memory and
//! is recomputed per query. The AI path sends the raw query to the
//! generation backend and returns the reply verbatim; any failure collapses
//! to [`AI_SEARCH_UNAVAILABLE`] so the caller can always fall back to the
//! built-in search.

use tracing::warn;

use crate::config::Config;
use crate::generation::{generate_text, GenerationOptions};
use crate::models::{Country, Difficulty, Dish};

/// Shown whenever the AI-assisted search fails, regardless of cause.
pub const AI_SEARCH_UNAVAILABLE: &str =
    "AI search is unavailable right now. Try the built-in country search instead.";

/// The full country catalog in display order.
pub fn catalog() -> Vec<Country> {
    vec![
        Country {
            code: "in",
            name: "India",
            flag: "🇮🇳",
            region: "South Asia",
            cuisine: "Indian",
            dishes: vec![
                Dish {
                    name: "Palak Paneer",
                    description: "Fresh paneer cubes simmered in a spiced spinach gravy.",
                    difficulty: Difficulty::Medium,
                    cook_time: "40 minutes",
                    main_ingredients: vec!["spinach", "paneer", "onion", "garam masala"],
                },
                Dish {
                    name: "Chana Masala",
                    description: "Chickpeas in a tangy tomato-onion sauce.",
                    difficulty: Difficulty::Easy,
                    cook_time: "35 minutes",
                    main_ingredients: vec!["chickpeas", "tomato", "onion", "cumin"],
                },
                Dish {
                    name: "Masala Dosa",
                    description: "Crisp fermented rice crepe with spiced potato filling.",
                    difficulty: Difficulty::Hard,
                    cook_time: "50 minutes",
                    main_ingredients: vec!["rice", "urad dal", "potato", "curry leaves"],
                },
                Dish {
                    name: "Dal Tadka",
                    description: "Yellow lentils finished with a cumin-garlic tempering.",
                    difficulty: Difficulty::Easy,
                    cook_time: "30 minutes",
                    main_ingredients: vec!["toor dal", "ghee", "cumin", "garlic"],
                },
            ],
        },
        Country {
            code: "jp",
            name: "Japan",
            flag: "🇯🇵",
            region: "East Asia",
            cuisine: "Japanese",
            dishes: vec![
                Dish {
                    name: "Agedashi Tofu",
                    description: "Fried tofu in a light kombu-based broth.",
                    difficulty: Difficulty::Medium,
                    cook_time: "25 minutes",
                    main_ingredients: vec!["tofu", "kombu dashi", "soy sauce", "daikon"],
                },
                Dish {
                    name: "Vegetable Tempura",
                    description: "Seasonal vegetables in a delicate crisp batter.",
                    difficulty: Difficulty::Medium,
                    cook_time: "30 minutes",
                    main_ingredients: vec!["sweet potato", "eggplant", "shiso", "flour"],
                },
                Dish {
                    name: "Inari Sushi",
                    description: "Seasoned sushi rice tucked into sweet fried tofu pockets.",
                    difficulty: Difficulty::Easy,
                    cook_time: "40 minutes",
                    main_ingredients: vec!["sushi rice", "tofu pockets", "rice vinegar"],
                },
            ],
        },
        Country {
            code: "th",
            name: "Thailand",
            flag: "🇹🇭",
            region: "Southeast Asia",
            cuisine: "Thai",
            dishes: vec![
                Dish {
                    name: "Pad Thai Jay",
                    description: "Rice noodles stir-fried the vegan \"jay\" way with tamarind.",
                    difficulty: Difficulty::Medium,
                    cook_time: "25 minutes",
                    main_ingredients: vec![
                        "rice noodles",
                        "tofu",
                        "tamarind",
                        "bean sprouts",
                        "peanuts",
                    ],
                },
                Dish {
                    name: "Green Curry with Vegetables",
                    description: "Coconut green curry loaded with Thai eggplant and basil.",
                    difficulty: Difficulty::Medium,
                    cook_time: "35 minutes",
                    main_ingredients: vec![
                        "green curry paste",
                        "coconut milk",
                        "thai eggplant",
                        "basil",
                    ],
                },
                Dish {
                    name: "Som Tam Jay",
                    description: "Green papaya salad pounded with lime and chili.",
                    difficulty: Difficulty::Easy,
                    cook_time: "15 minutes",
                    main_ingredients: vec!["green papaya", "lime", "chili", "peanuts"],
                },
            ],
        },
        Country {
            code: "it",
            name: "Italy",
            flag: "🇮🇹",
            region: "Southern Europe",
            cuisine: "Italian",
            dishes: vec![
                Dish {
                    name: "Margherita Pizza",
                    description: "Blistered crust with tomato, mozzarella, and basil.",
                    difficulty: Difficulty::Medium,
                    cook_time: "90 minutes",
                    main_ingredients: vec!["pizza dough", "tomato", "mozzarella", "basil"],
                },
                Dish {
                    name: "Mushroom Risotto",
                    description: "Arborio rice stirred slowly with porcini and parmesan.",
                    difficulty: Difficulty::Hard,
                    cook_time: "45 minutes",
                    main_ingredients: vec!["arborio rice", "porcini", "parmesan", "white wine"],
                },
                Dish {
                    name: "Pasta al Pomodoro",
                    description: "Spaghetti in a bright fresh tomato sauce.",
                    difficulty: Difficulty::Easy,
                    cook_time: "25 minutes",
                    main_ingredients: vec!["spaghetti", "tomato", "basil", "olive oil"],
                },
            ],
        },
        Country {
            code: "mx",
            name: "Mexico",
            flag: "🇲🇽",
            region: "North America",
            cuisine: "Mexican",
            dishes: vec![
                Dish {
                    name: "Chilaquiles Verdes",
                    description: "Tortilla chips simmered in salsa verde with queso fresco.",
                    difficulty: Difficulty::Easy,
                    cook_time: "30 minutes",
                    main_ingredients: vec!["tortilla chips", "salsa verde", "queso fresco"],
                },
                Dish {
                    name: "Bean Tacos",
                    description: "Warm corn tortillas with refried black beans and avocado.",
                    difficulty: Difficulty::Easy,
                    cook_time: "20 minutes",
                    main_ingredients: vec!["black beans", "corn tortillas", "avocado", "cilantro"],
                },
                Dish {
                    name: "Elote",
                    description: "Grilled street corn rolled in lime, chili, and cotija.",
                    difficulty: Difficulty::Easy,
                    cook_time: "15 minutes",
                    main_ingredients: vec!["corn", "lime", "chili powder", "cotija cheese"],
                },
            ],
        },
        Country {
            code: "lb",
            name: "Lebanon",
            flag: "🇱🇧",
            region: "Middle East",
            cuisine: "Levantine",
            dishes: vec![
                Dish {
                    name: "Falafel Wrap",
                    description: "Crisp chickpea fritters with tahini in flatbread.",
                    difficulty: Difficulty::Medium,
                    cook_time: "40 minutes",
                    main_ingredients: vec!["chickpeas", "parsley", "tahini", "flatbread"],
                },
                Dish {
                    name: "Tabbouleh",
                    description: "Herb-forward bulgur salad with lemon and tomato.",
                    difficulty: Difficulty::Easy,
                    cook_time: "20 minutes",
                    main_ingredients: vec!["bulgur", "parsley", "tomato", "lemon"],
                },
                Dish {
                    name: "Hummus with Pita",
                    description: "Silky chickpea dip with tahini and olive oil.",
                    difficulty: Difficulty::Easy,
                    cook_time: "15 minutes",
                    main_ingredients: vec!["chickpeas", "tahini", "lemon", "olive oil"],
                },
            ],
        },
        Country {
            code: "et",
            name: "Ethiopia",
            flag: "🇪🇹",
            region: "East Africa",
            cuisine: "Ethiopian",
            dishes: vec![
                Dish {
                    name: "Misir Wot",
                    description: "Red lentils stewed in fiery berbere spice.",
                    difficulty: Difficulty::Medium,
                    cook_time: "45 minutes",
                    main_ingredients: vec!["red lentils", "berbere", "onion", "tomato"],
                },
                Dish {
                    name: "Shiro",
                    description: "Smooth chickpea-flour stew, a fasting-day staple.",
                    difficulty: Difficulty::Easy,
                    cook_time: "25 minutes",
                    main_ingredients: vec!["chickpea flour", "garlic", "tomato"],
                },
                Dish {
                    name: "Atakilt Wat",
                    description: "Turmeric-braised cabbage, carrot, and potato.",
                    difficulty: Difficulty::Easy,
                    cook_time: "35 minutes",
                    main_ingredients: vec!["cabbage", "carrot", "potato", "turmeric"],
                },
            ],
        },
        Country {
            code: "cn",
            name: "China",
            flag: "🇨🇳",
            region: "East Asia",
            cuisine: "Chinese",
            dishes: vec![
                Dish {
                    name: "Mapo Tofu (Vegetarian)",
                    description: "Silken tofu in a numbing doubanjiang sauce, meat-free.",
                    difficulty: Difficulty::Medium,
                    cook_time: "20 minutes",
                    main_ingredients: vec![
                        "tofu",
                        "doubanjiang",
                        "sichuan peppercorn",
                        "scallions",
                    ],
                },
                Dish {
                    name: "Buddha's Delight",
                    description: "Temple-style braise of tofu, mushrooms, and vegetables.",
                    difficulty: Difficulty::Medium,
                    cook_time: "30 minutes",
                    main_ingredients: vec!["tofu", "shiitake", "wood ear", "napa cabbage"],
                },
                Dish {
                    name: "Stir-Fried Greens",
                    description: "Bok choy flash-fried with garlic.",
                    difficulty: Difficulty::Easy,
                    cook_time: "10 minutes",
                    main_ingredients: vec!["bok choy", "garlic", "soy sauce"],
                },
            ],
        },
        Country {
            code: "gr",
            name: "Greece",
            flag: "🇬🇷",
            region: "Southern Europe",
            cuisine: "Greek",
            dishes: vec![
                Dish {
                    name: "Spanakopita",
                    description: "Flaky phyllo pie of spinach, feta, and dill.",
                    difficulty: Difficulty::Medium,
                    cook_time: "60 minutes",
                    main_ingredients: vec!["spinach", "feta", "phyllo", "dill"],
                },
                Dish {
                    name: "Gemista",
                    description: "Tomatoes and peppers baked with herbed rice.",
                    difficulty: Difficulty::Medium,
                    cook_time: "75 minutes",
                    main_ingredients: vec!["tomatoes", "peppers", "rice", "herbs"],
                },
                Dish {
                    name: "Horiatiki",
                    description: "Village salad of tomato, cucumber, olives, and feta.",
                    difficulty: Difficulty::Easy,
                    cook_time: "10 minutes",
                    main_ingredients: vec!["tomato", "cucumber", "olives", "feta"],
                },
            ],
        },
        Country {
            code: "ma",
            name: "Morocco",
            flag: "🇲🇦",
            region: "North Africa",
            cuisine: "Moroccan",
            dishes: vec![
                Dish {
                    name: "Vegetable Tagine",
                    description: "Slow-cooked chickpeas and root vegetables with apricot.",
                    difficulty: Difficulty::Medium,
                    cook_time: "50 minutes",
                    main_ingredients: vec!["chickpeas", "carrot", "apricot", "ras el hanout"],
                },
                Dish {
                    name: "Couscous aux Légumes",
                    description: "Steamed couscous crowned with seven vegetables.",
                    difficulty: Difficulty::Medium,
                    cook_time: "40 minutes",
                    main_ingredients: vec!["couscous", "zucchini", "turnip", "harissa"],
                },
                Dish {
                    name: "Zaalouk",
                    description: "Smoky mashed eggplant and tomato salad.",
                    difficulty: Difficulty::Easy,
                    cook_time: "30 minutes",
                    main_ingredients: vec!["eggplant", "tomato", "cumin", "paprika"],
                },
            ],
        },
    ]
}

/// Filter the catalog by case-insensitive substring match against country
/// name, region, cuisine label, dish name, or any dish ingredient. An empty
/// or whitespace-only query returns the full catalog.
pub fn search_countries(query: &str) -> Vec<Country> {
    let needle = query.trim().to_lowercase();
    let all = catalog();
    if needle.is_empty() {
        return all;
    }
    all.into_iter()
        .filter(|country| country_matches(country, &needle))
        .collect()
}

fn country_matches(country: &Country, needle: &str) -> bool {
    country.name.to_lowercase().contains(needle)
        || country.region.to_lowercase().contains(needle)
        || country.cuisine.to_lowercase().contains(needle)
        || country.dishes.iter().any(|dish| {
            dish.name.to_lowercase().contains(needle)
                || dish
                    .main_ingredients
                    .iter()
                    .any(|ingredient| ingredient.to_lowercase().contains(needle))
        })
}

/// Render the cuisine-expert prompt for one free-text query.
pub fn build_search_prompt(query: &str) -> String {
    format!(
        r#"You are a vegetarian cuisine expert. The user is searching for: "{query}"

Provide:
1) Relevant vegetarian dishes from different countries
2) Brief descriptions and key ingredients
3) Cultural notes or interesting facts
4) Optional cooking tips

Keep it concise, friendly, and strictly vegetarian."#
    )
}

/// AI-assisted cuisine search. Returns the backend reply verbatim; any
/// failure (disabled backend, unreachable server, bad reply) yields
/// [`AI_SEARCH_UNAVAILABLE`] instead of an error. No retry.
pub async fn ai_cuisine_search(client: &reqwest::Client, config: &Config, query: &str) -> String {
    let options = GenerationOptions {
        temperature: config.generation.temperature,
        top_p: config.generation.top_p,
        json_mode: false,
    };
    let model = config.generation.model_for_search();
    let prompt = build_search_prompt(query);

    match generate_text(client, &config.generation, model, &prompt, &options).await {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, "AI cuisine search failed");
            AI_SEARCH_UNAVAILABLE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_returns_full_catalog() {
        let all = catalog();
        assert_eq!(search_countries("").len(), all.len());
        assert_eq!(search_countries("   ").len(), all.len());
    }

    #[test]
    fn test_catalog_codes_are_unique() {
        let all = catalog();
        let mut codes: Vec<&str> = all.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), all.len());
    }

    #[test]
    fn test_tofu_search_returns_only_tofu_countries() {
        let hits = search_countries("tofu");
        let mut codes: Vec<&str> = hits.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        assert_eq!(codes, ["cn", "jp", "th"]);
        for country in &hits {
            assert!(country.dishes.iter().any(|dish| dish
                .main_ingredients
                .iter()
                .any(|i| i.to_lowercase().contains("tofu"))));
        }
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let hits = search_countries("PANEER");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "in");
    }

    #[test]
    fn test_search_matches_region() {
        let hits = search_countries("east asia");
        let mut codes: Vec<&str> = hits.iter().map(|c| c.code).collect();
        codes.sort_unstable();
        // "Southeast Asia" contains "east asia" as a substring.
        assert_eq!(codes, ["cn", "jp", "th"]);
    }

    #[test]
    fn test_search_without_matches_is_empty() {
        assert!(search_countries("zzzz").is_empty());
    }

    #[test]
    fn test_search_prompt_embeds_query() {
        let prompt = build_search_prompt("street food");
        assert!(prompt.contains("searching for: \"street food\""));
        assert!(prompt.contains("strictly vegetarian"));
    }

    #[tokio::test]
    async fn test_ai_search_failure_collapses_to_static_message() {
        let client = reqwest::Client::new();
        let mut config = Config::default();
        config.generation.provider = "disabled".to_string();
        let reply = ai_cuisine_search(&client, &config, "tofu").await;
        assert_eq!(reply, AI_SEARCH_UNAVAILABLE);
    }
}
