//! Static non-vegetarian term sets and the substring matcher over them.
//!
//! Two tiers: [`RED_FLAGS`] is the small set of terms strong enough that
//! their presence in a product name alone is conclusive; [`NON_VEG_LEXICON`]
//! is the general ingredient lexicon (meats, seafood, animal derivatives,
//! regional dish names). Both are swappable data, English-only by design.
//!
//! Matching is substring containment in both directions: a term matches when
//! the input contains the term or the term contains the whole trimmed input.
//! The reverse direction handles partial and pluralized user entries
//! ("prawn" matches the lexicon entry "prawns").

/// Terms that mark a product name itself as conclusive evidence.
pub const RED_FLAGS: &[&str] = &[
    "chicken", "beef", "pork", "meat", "fish", "nuggets", "burger", "sausage",
];

/// The general non-vegetarian lexicon. Ordered by category; accumulation
/// order in a scan follows this declaration order.
pub const NON_VEG_LEXICON: &[&str] = &[
    // Meat and poultry
    "chicken", "beef", "pork", "meat", "mutton", "lamb", "goat", "veal", "turkey", "duck",
    "goose", "rabbit", "venison", "poultry", "fowl", "game bird", "quail", "pheasant",
    // Cuts and mince
    "ground beef", "ground chicken", "ground pork", "ground turkey", "ground lamb", "mince",
    "minced meat", "steak", "chops", "ribs", "wings", "drumstick", "thigh", "breast", "leg",
    "shoulder",
    // Processed meat products
    "bacon", "ham", "sausage", "pepperoni", "salami", "prosciutto", "chorizo", "hot dog",
    "frankfurter", "nuggets", "burger", "meatball", "meat loaf", "meat pie", "burger patty",
    "chicken nugget", "fish stick", "fish cake",
    // Seafood
    "fish", "seafood", "salmon", "tuna", "cod", "tilapia", "mackerel", "sardine", "sardines",
    "anchovy", "anchovies", "anchovy paste", "herring", "trout", "shrimp", "prawn", "prawns",
    "lobster", "crab", "oyster", "mussel", "clam", "scallop", "squid", "octopus", "crayfish",
    "crawfish", "sea bass", "halibut", "flounder", "sole", "snapper", "grouper",
    // Eggs and egg derivatives
    "egg", "eggs", "egg white", "egg yolk", "albumin",
    // Animal-derived additives
    "gelatin", "gelatine", "lard", "tallow", "suet", "rennet", "whey", "casein", "isinglass",
    "carmine", "cochineal", "shellac",
    // Sauces built on animal ingredients
    "worcestershire", "oyster sauce", "fish sauce", "meat sauce", "bolognese", "carbonara",
    // Stocks and broths
    "meat stock", "chicken stock", "beef stock", "fish stock", "bone broth", "chicken broth",
    "beef broth", "meat broth",
    // Animal fats
    "beef fat", "chicken fat", "pork fat", "animal fat",
    // Regional dish names that imply meat
    "keema", "tandoori chicken", "butter chicken", "chicken tikka", "mutton curry",
    "fish curry", "biryani chicken", "chicken biryani", "meat biryani", "korma chicken",
    "vindaloo",
];

/// Outcome of scanning a text against both term sets.
#[derive(Debug, Clone, Default)]
pub struct LexiconScan {
    /// Distinct matched terms, first-seen order, red flags first.
    pub terms: Vec<&'static str>,
    /// Whether any red-flag term matched.
    pub red_flag: bool,
}

impl LexiconScan {
    /// The matched terms that belong to the red-flag set.
    pub fn red_flag_terms(&self) -> Vec<&'static str> {
        self.terms
            .iter()
            .copied()
            .filter(|t| RED_FLAGS.contains(t))
            .collect()
    }
}

fn contains_either(text: &str, term: &str) -> bool {
    text.contains(term) || term.contains(text)
}

/// Scan free text against the red-flag set and the general lexicon.
///
/// The input is lower-cased and trimmed first. Empty input matches nothing;
/// the reverse-containment rule is skipped for it, since every term contains
/// the empty string.
pub fn scan_text(text: &str) -> LexiconScan {
    let lower = text.to_lowercase();
    let lower = lower.trim();
    let mut scan = LexiconScan::default();

    if lower.is_empty() {
        return scan;
    }

    for term in RED_FLAGS {
        if contains_either(lower, term) && !scan.terms.contains(term) {
            scan.terms.push(term);
            scan.red_flag = true;
        }
    }

    for term in NON_VEG_LEXICON {
        if contains_either(lower, term) && !scan.terms.contains(term) {
            scan.terms.push(term);
        }
    }

    scan
}

/// Lexicon-only check for a single candidate ingredient (no red-flag tier).
///
/// Returns the first matching lexicon term, if any. Used by the ingredient
/// gate before an entry is accepted into the working set.
pub fn lexicon_match(candidate: &str) -> Option<&'static str> {
    let lower = candidate.to_lowercase();
    let lower = lower.trim();
    if lower.is_empty() {
        return None;
    }
    NON_VEG_LEXICON
        .iter()
        .copied()
        .find(|term| contains_either(lower, term))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_matches_nothing() {
        let scan = scan_text("Rice, tomato, onion, olive oil, spices");
        assert!(scan.terms.is_empty());
        assert!(!scan.red_flag);
    }

    #[test]
    fn test_empty_input_matches_nothing() {
        assert!(scan_text("").terms.is_empty());
        assert!(scan_text("   \n").terms.is_empty());
        assert_eq!(lexicon_match("  "), None);
    }

    #[test]
    fn test_repeated_term_accumulates_once() {
        let scan = scan_text("chicken soup with chicken pieces and more chicken");
        let hits: Vec<_> = scan.terms.iter().filter(|t| **t == "chicken").collect();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_red_flags_come_first() {
        let scan = scan_text("contains gelatin and chicken extract");
        assert!(scan.red_flag);
        assert_eq!(scan.terms[0], "chicken");
        assert!(scan.terms.contains(&"gelatin"));
    }

    #[test]
    fn test_case_insensitive() {
        let scan = scan_text("CONTAINS GELATIN");
        assert_eq!(scan.terms, vec!["gelatin"]);
        assert!(!scan.red_flag);
    }

    #[test]
    fn test_reverse_containment_for_partial_input() {
        // "prawn" is shorter than the lexicon entry "prawns".
        assert_eq!(lexicon_match("sardine"), Some("sardine"));
        assert!(lexicon_match("prawn").is_some());
        let scan = scan_text("prawn");
        assert!(scan.terms.contains(&"prawn"));
    }

    #[test]
    fn test_regional_dish_names() {
        assert_eq!(lexicon_match("keema"), Some("keema"));
        assert!(lexicon_match("butter chicken").is_some());
        assert!(lexicon_match("paneer butter masala").is_none());
    }

    #[test]
    fn test_gate_rejects_broth() {
        assert_eq!(lexicon_match("Chicken Broth"), Some("chicken"));
    }

    #[test]
    fn test_red_flag_terms_filter() {
        let scan = scan_text("fish and gelatin");
        assert_eq!(scan.red_flag_terms(), vec!["fish"]);
    }
}
