//! Intent routing: land purchase, business viability or general dialogue.
//!
//! The rules are ordered tables so they can be inspected and tested on their
//! own. Matching is case-insensitive substring search; the first matching
//! rule wins.

use locas_core::analysis::AnalysisKind;

/// Words that signal a purchase. A land route needs one of these plus "land".
pub const BUY_WORDS: &[&str] = &["buy", "purchase"];

pub const LAND_WORD: &str = "land";

/// Business types and the phrases that name them, checked in order.
pub const BUSINESS_TYPES: &[(&str, &[&str])] = &[
    ("tea stall", &["tea stall", "tea shop", "tea business"]),
    ("coffee shop", &["coffee shop", "cafe", "coffee business"]),
    ("restaurant", &["restaurant", "dining", "eatery", "food business"]),
    ("retail store", &["retail", "store", "shop", "boutique"]),
    ("grocery store", &["grocery", "supermarket", "food market"]),
    ("bakery", &["bakery", "pastry shop", "bread shop"]),
];

/// Words that make a query a business query without naming a type.
pub const GENERIC_BUSINESS_WORDS: &[&str] = &["open", "start", "begin", "launch", "business", "shop", "store"];

pub const GENERIC_BUSINESS_TYPE: &str = "business";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Land,
    Business { business_type: String },
    General,
}

impl Route {
    /// The direct analysis this route runs, if any.
    pub fn analysis_kind(&self) -> Option<AnalysisKind> {
        match self {
            Self::Land => Some(AnalysisKind::LandSuitability),
            Self::Business { business_type } => Some(AnalysisKind::BusinessViability {
                business_type: business_type.clone(),
            }),
            Self::General => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Land => "land",
            Self::Business { .. } => "business",
            Self::General => "general",
        }
    }
}

pub fn classify(text: &str) -> Route {
    let lower = text.to_lowercase();

    if BUY_WORDS.iter().any(|w| lower.contains(w)) && lower.contains(LAND_WORD) {
        return Route::Land;
    }

    if let Some(business_type) = business_type(&lower) {
        return Route::Business { business_type };
    }

    Route::General
}

fn business_type(lower: &str) -> Option<String> {
    let named = BUSINESS_TYPES
        .iter()
        .find(|(_, phrases)| phrases.iter().any(|p| lower.contains(p)))
        .map(|(name, _)| name.to_string());

    named.or_else(|| {
        GENERIC_BUSINESS_WORDS
            .iter()
            .any(|w| lower.contains(w))
            .then(|| GENERIC_BUSINESS_TYPE.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn business(t: &str) -> Route {
        Route::Business { business_type: t.into() }
    }

    #[test]
    fn land_needs_buy_word_and_land() {
        assert_eq!(classify("Can I buy land near the river?"), Route::Land);
        assert_eq!(classify("Should I PURCHASE LAND here"), Route::Land);
        assert_ne!(classify("Is this good land?"), Route::Land);
    }

    #[test]
    fn land_wins_over_business() {
        assert_eq!(classify("buy land to open a shop"), Route::Land);
    }

    #[test]
    fn named_business_types() {
        assert_eq!(classify("Can I open a tea stall here?"), business("tea stall"));
        assert_eq!(classify("thinking about a Cafe"), business("coffee shop"));
        assert_eq!(classify("a small eatery"), business("restaurant"));
        assert_eq!(classify("a boutique downtown"), business("retail store"));
        assert_eq!(classify("supermarket viability"), business("grocery store"));
        assert_eq!(classify("would a bakery work"), business("bakery"));
    }

    #[test]
    fn earlier_group_wins() {
        // "tea shop" also contains "shop", which belongs to a later group
        assert_eq!(classify("open a tea shop"), business("tea stall"));
        // "pastry shop" hits "shop" in the retail group first
        assert_eq!(classify("a pastry shop"), business("retail store"));
    }

    #[test]
    fn generic_business_words() {
        assert_eq!(classify("I want to launch something here"), business("business"));
        assert_eq!(classify("can I start here"), business("business"));
    }

    #[test]
    fn everything_else_is_general() {
        assert_eq!(classify("What's the weather?"), Route::General);
        assert_eq!(classify("parks nearby"), Route::General);
        assert!(Route::General.analysis_kind().is_none());
    }

    #[test]
    fn routes_map_to_analysis_kinds() {
        assert_eq!(Route::Land.analysis_kind(), Some(AnalysisKind::LandSuitability));
        assert_eq!(
            business("bakery").analysis_kind(),
            Some(AnalysisKind::BusinessViability { business_type: "bakery".into() })
        );
    }
}
