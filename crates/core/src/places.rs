//! Place search abstraction.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::geo::Coordinate;

/// A single place returned by a place-search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOfInterest {
    pub name: String,

    pub address: String,

    /// Provider rating on a 0-5 scale
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,

    /// Meters from the search centre, when the provider reports a location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
}

impl PlaceOfInterest {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            rating: None,
            distance_m: None,
            types: Vec::new(),
        }
    }

    pub fn with_rating(mut self, rating: f32) -> Self {
        self.rating = Some(rating);
        self
    }
}

/// A nearby-search backend.
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    fn name(&self) -> &str;

    /// Places of `place_kind` within `radius_m` of `center`, optionally
    /// narrowed by `keyword`. No matches is `Ok` with an empty list.
    async fn search(
        &self,
        center: Coordinate,
        place_kind: &str,
        radius_m: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<PlaceOfInterest>, ProviderError>;
}
