//! Multi-category analysis results.

use serde::{Deserialize, Serialize};

use crate::geo::Coordinate;
use crate::places::PlaceOfInterest;

/// Which analysis a report was built for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnalysisKind {
    LandSuitability,
    BusinessViability { business_type: String },
}

/// Places found for one category (or one direct search).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: String,
    pub places: Vec<PlaceOfInterest>,
    pub total_found: usize,
}

impl CategoryResult {
    pub fn new(category: impl Into<String>, places: Vec<PlaceOfInterest>) -> Self {
        let total_found = places.len();
        Self {
            category: category.into(),
            places,
            total_found,
        }
    }

    /// The result used for a failed or empty search.
    pub fn empty(category: impl Into<String>) -> Self {
        Self::new(category, Vec::new())
    }
}

/// The aggregate of every category search plus environmental context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateReport {
    pub location: Coordinate,

    #[serde(flatten)]
    pub kind: AnalysisKind,

    /// One entry per requested category, in request order
    pub categories: Vec<CategoryResult>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environmental_summary: Option<String>,
}

impl AggregateReport {
    pub fn category(&self, name: &str) -> Option<&CategoryResult> {
        self.categories.iter().find(|c| c.category == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_category_has_zero_total() {
        let result = CategoryResult::empty("parks");
        assert_eq!(result.total_found, 0);
        assert!(result.places.is_empty());
    }

    #[test]
    fn category_lookup_by_name() {
        let report = AggregateReport {
            location: Coordinate::new(0.0, 0.0).unwrap(),
            kind: AnalysisKind::LandSuitability,
            categories: vec![
                CategoryResult::new("parks", vec![PlaceOfInterest::new("Green", "1 Main St")]),
                CategoryResult::empty("banks"),
            ],
            environmental_summary: None,
        };
        assert_eq!(report.category("parks").map(|c| c.total_found), Some(1));
        assert_eq!(report.category("banks").map(|c| c.total_found), Some(0));
        assert!(report.category("police").is_none());
    }
}
