//! Multi-category place aggregation.
//!
//! A report searches each category in turn around one point, then adds an
//! environmental summary. A failing category is logged and reported as
//! empty; it never fails the report.

use std::sync::Arc;

use locas_core::analysis::{AggregateReport, AnalysisKind, CategoryResult};
use locas_core::environment::{EnvironmentKind, EnvironmentProvider, EnvironmentalData};
use locas_core::error::ProviderError;
use locas_core::geo::Coordinate;
use locas_core::places::PlaceSearch;
use tracing::{debug, info, warn};

use crate::narrator::Narrator;

/// Category aliases and the provider place kind each one searches.
pub const PLACE_KINDS: &[(&str, &str)] = &[
    ("police", "police"),
    ("schools", "school"),
    ("hospitals", "hospital"),
    ("transportation", "transit_station"),
    ("shopping", "shopping_mall"),
    ("parks", "park"),
    ("restaurants", "restaurant"),
    ("banks", "bank"),
    ("hotels", "lodging"),
    ("gas_stations", "gas_station"),
    ("atms", "atm"),
    ("government", "local_government_office"),
    ("grocery", "grocery_or_supermarket"),
    ("cafes", "cafe"),
    ("pharmacies", "pharmacy"),
    ("water_bodies", "natural_feature"),
];

pub const LAND_CATEGORIES: &[&str] = &[
    "police",
    "schools",
    "hospitals",
    "transportation",
    "shopping",
    "parks",
    "restaurants",
    "banks",
    "government",
    "water_bodies",
];

pub const BUSINESS_CATEGORIES: &[&str] = &[
    "schools",
    "hospitals",
    "transportation",
    "shopping",
    "parks",
    "government",
    "cafes",
    "restaurants",
];

pub const COMPETITION_CATEGORY: &str = "competition";

/// Business types with a known competitor search: (place kind, keyword).
pub const COMPETITORS: &[(&str, &str, Option<&str>)] = &[
    ("tea stall", "cafe", Some("tea")),
    ("coffee shop", "cafe", Some("coffee")),
    ("restaurant", "restaurant", None),
];

/// The kind searched for competitors of a business type not in [`COMPETITORS`].
pub const DEFAULT_COMPETITOR_KIND: &str = "store";

/// The provider place kind for a category alias; unknown aliases pass through.
pub fn place_kind(alias: &str) -> &str {
    PLACE_KINDS
        .iter()
        .find(|(a, _)| *a == alias)
        .map(|(_, kind)| *kind)
        .unwrap_or(alias)
}

/// One search in a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategorySearch {
    pub category: String,
    pub place_kind: String,
    pub keyword: Option<String>,
}

impl CategorySearch {
    pub fn alias(category: &str) -> Self {
        Self {
            category: category.to_string(),
            place_kind: place_kind(category).to_string(),
            keyword: None,
        }
    }

    /// The competitor search for `business_type`.
    pub fn competition(business_type: &str) -> Self {
        let (kind, keyword) = COMPETITORS
            .iter()
            .find(|(b, _, _)| *b == business_type)
            .map(|(_, kind, keyword)| (kind.to_string(), keyword.map(String::from)))
            .unwrap_or_else(|| (DEFAULT_COMPETITOR_KIND.to_string(), Some(business_type.to_string())));
        Self {
            category: COMPETITION_CATEGORY.to_string(),
            place_kind: kind,
            keyword,
        }
    }

    /// Every search an analysis runs, in report order.
    pub fn for_analysis(kind: &AnalysisKind) -> Vec<Self> {
        match kind {
            AnalysisKind::LandSuitability => LAND_CATEGORIES.iter().map(|c| Self::alias(c)).collect(),
            AnalysisKind::BusinessViability { business_type } => BUSINESS_CATEGORIES
                .iter()
                .map(|c| Self::alias(c))
                .chain(std::iter::once(Self::competition(business_type)))
                .collect(),
        }
    }
}

pub struct CategoryAggregator {
    places: Arc<dyn PlaceSearch>,
    environment: Arc<dyn EnvironmentProvider>,
    narrator: Arc<Narrator>,
    default_radius: u32,
}

impl CategoryAggregator {
    pub fn new(
        places: Arc<dyn PlaceSearch>,
        environment: Arc<dyn EnvironmentProvider>,
        narrator: Arc<Narrator>,
        default_radius: u32,
    ) -> Self {
        Self {
            places,
            environment,
            narrator,
            default_radius,
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    fn radius(&self, radius: Option<u32>) -> u32 {
        radius.unwrap_or(self.default_radius)
    }

    /// A single search, labelled with `place_type` as given.
    pub async fn find_places(
        &self,
        location: Coordinate,
        place_type: &str,
        radius: Option<u32>,
        keyword: Option<&str>,
    ) -> Result<CategoryResult, ProviderError> {
        let radius = self.radius(radius);
        let kind = place_kind(place_type);
        debug!(provider = self.places.name(), kind, radius, "Place search");
        let places = self.places.search(location, kind, radius, keyword).await?;
        Ok(CategoryResult::new(place_type, places))
    }

    /// Run each search in order; a failed search becomes an empty result.
    pub async fn search_categories(
        &self,
        location: Coordinate,
        searches: &[CategorySearch],
        radius: Option<u32>,
    ) -> Vec<CategoryResult> {
        let radius = self.radius(radius);
        let mut results = Vec::with_capacity(searches.len());

        for search in searches {
            let found = self
                .places
                .search(location, &search.place_kind, radius, search.keyword.as_deref())
                .await;
            let result = match found {
                Ok(places) => CategoryResult::new(&search.category, places),
                Err(e) => {
                    warn!(category = %search.category, error = %e, "Category search failed");
                    CategoryResult::empty(&search.category)
                }
            };
            debug!(category = %result.category, found = result.total_found, "Category searched");
            results.push(result);
        }

        results
    }

    pub async fn environment(
        &self,
        location: Coordinate,
        kind: EnvironmentKind,
    ) -> Result<Option<EnvironmentalData>, ProviderError> {
        debug!(provider = self.environment.name(), ?kind, "Environment lookup");
        self.environment.lookup(location, kind).await
    }

    /// Build a fresh report for `kind` around `location`.
    pub async fn aggregate(&self, location: Coordinate, kind: &AnalysisKind, radius: Option<u32>) -> AggregateReport {
        let searches = CategorySearch::for_analysis(kind);
        let categories = self.search_categories(location, &searches, radius).await;

        let environmental_summary = match self.environment(location, EnvironmentKind::Both).await {
            Ok(Some(data)) => Some(self.narrator.summarize_environment(&data).await),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Environmental lookup failed");
                None
            }
        };

        info!(
            %location,
            categories = categories.len(),
            with_places = categories.iter().filter(|c| c.total_found > 0).count(),
            environment = environmental_summary.is_some(),
            "Report aggregated"
        );

        AggregateReport {
            location,
            kind: kind.clone(),
            categories,
            environmental_summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{EnvReply, ScriptedProvider, StubEnvironment, StubPlaces};
    use locas_config::CompletionConfig;
    use serde_json::json;

    fn here() -> Coordinate {
        Coordinate::new(12.97, 77.59).unwrap()
    }

    fn aggregator(
        places: Arc<StubPlaces>,
        env: Arc<StubEnvironment>,
        provider: Arc<ScriptedProvider>,
    ) -> CategoryAggregator {
        let narrator = Arc::new(Narrator::new(provider, &CompletionConfig::default()));
        CategoryAggregator::new(places, env, narrator, 1500)
    }

    #[test]
    fn alias_table_and_passthrough() {
        assert_eq!(place_kind("schools"), "school");
        assert_eq!(place_kind("water_bodies"), "natural_feature");
        assert_eq!(place_kind("gym"), "gym");
    }

    #[test]
    fn competitor_table() {
        assert_eq!(CategorySearch::competition("tea stall").keyword.as_deref(), Some("tea"));
        let restaurant = CategorySearch::competition("restaurant");
        assert_eq!((restaurant.place_kind.as_str(), restaurant.keyword), ("restaurant", None));
        let other = CategorySearch::competition("bakery");
        assert_eq!(other.place_kind, "store");
        assert_eq!(other.keyword.as_deref(), Some("bakery"));
        assert_eq!(other.category, "competition");
    }

    #[test]
    fn business_searches_end_with_competition() {
        let searches = CategorySearch::for_analysis(&AnalysisKind::BusinessViability {
            business_type: "coffee shop".into(),
        });
        assert_eq!(searches.len(), BUSINESS_CATEGORIES.len() + 1);
        assert_eq!(searches.last().unwrap().category, "competition");
        assert_eq!(searches.last().unwrap().keyword.as_deref(), Some("coffee"));
    }

    #[tokio::test]
    async fn one_failing_category_is_zero_others_intact() {
        let places = Arc::new(
            StubPlaces::default()
                .with("school", &["DPS", "KV"])
                .with("hospital", &["Apollo"])
                .with("park", &["Cubbon"])
                .with("bank", &["SBI", "HDFC", "ICICI"])
                .failing_on("police"),
        );
        let agg = aggregator(
            places.clone(),
            Arc::new(StubEnvironment::new(EnvReply::Nothing)),
            Arc::new(ScriptedProvider::texts(&[])),
        );

        let searches: Vec<CategorySearch> = ["schools", "police", "hospitals", "parks", "banks"]
            .iter()
            .map(|c| CategorySearch::alias(c))
            .collect();
        let results = agg.search_categories(here(), &searches, None).await;

        let totals: Vec<(&str, usize)> = results.iter().map(|r| (r.category.as_str(), r.total_found)).collect();
        assert_eq!(
            totals,
            vec![("schools", 2), ("police", 0), ("hospitals", 1), ("parks", 1), ("banks", 3)]
        );
        assert!(results[1].places.is_empty());
        assert!(places.searches.lock().unwrap().iter().all(|(_, r, _)| *r == 1500));
    }

    #[tokio::test]
    async fn land_report_in_table_order_with_summary() {
        let places = Arc::new(StubPlaces::default().with("park", &["Lalbagh"]));
        let env = Arc::new(StubEnvironment::new(EnvReply::Data(json!({"indexes": []}))));
        let provider = Arc::new(ScriptedProvider::texts(&["Air is fine."]));
        let agg = aggregator(places.clone(), env.clone(), provider);

        let report = agg.aggregate(here(), &AnalysisKind::LandSuitability, Some(800)).await;

        let names: Vec<&str> = report.categories.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, LAND_CATEGORIES);
        assert_eq!(report.category("parks").unwrap().total_found, 1);
        assert_eq!(report.environmental_summary.as_deref(), Some("Air is fine."));
        assert_eq!(*env.kinds.lock().unwrap(), vec![EnvironmentKind::Both]);
        assert!(places.searches.lock().unwrap().iter().all(|(_, r, _)| *r == 800));
    }

    #[tokio::test]
    async fn environment_failure_leaves_summary_empty() {
        let agg = aggregator(
            Arc::new(StubPlaces::default()),
            Arc::new(StubEnvironment::new(EnvReply::Fail)),
            Arc::new(ScriptedProvider::texts(&[])),
        );
        let report = agg
            .aggregate(
                here(),
                &AnalysisKind::BusinessViability {
                    business_type: "tea stall".into(),
                },
                None,
            )
            .await;
        assert!(report.environmental_summary.is_none());
        assert_eq!(report.categories.len(), 9);
        assert!(report.categories.iter().all(|c| c.total_found == 0));
    }

    #[tokio::test]
    async fn find_places_maps_alias_and_keeps_label() {
        let places = Arc::new(StubPlaces::default().with("cafe", &["Third Wave"]));
        let agg = aggregator(
            places.clone(),
            Arc::new(StubEnvironment::new(EnvReply::Nothing)),
            Arc::new(ScriptedProvider::texts(&[])),
        );
        let result = agg.find_places(here(), "cafes", None, Some("filter")).await.unwrap();
        assert_eq!(result.category, "cafes");
        assert_eq!(result.total_found, 1);
        assert_eq!(places.kinds_searched(), vec!["cafe"]);
    }
}
