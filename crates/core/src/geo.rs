//! Geographic value objects and the geocoding abstraction.
//!
//! A `Coordinate` can only be built through its validating constructor, so
//! every coordinate that flows through the system is in range. A
//! `ResolvedQuery` pairs the user's text with whatever coordinate was found
//! for this turn, tagged with where it came from.

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoordinateError, ProviderError};

/// A validated (latitude, longitude) pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting anything outside `[-90,90] x [-180,180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in meters (haversine).
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        const EARTH_RADIUS_M: f64 = 6_371_000.0;

        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().asin()
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}

// Deserialization goes through `new` so persisted sessions can't smuggle in
// an out-of-range value.
impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            latitude: f64,
            longitude: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.latitude, raw.longitude).map_err(serde::de::Error::custom)
    }
}

/// Where a turn's coordinate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    /// A map-style URL carrying a coordinate pair
    Url,
    /// A bare `lat, lng` pair in the text
    LiteralPair,
    /// An address phrase resolved by a geocoder
    GeocodedAddress,
    /// Reused from the session's last location
    CarriedOver,
    /// Nothing found; location-dependent paths must not run
    None,
}

/// User text plus whatever coordinate was derived from it this turn.
///
/// Immutable once built: `source` is `None` exactly when there is no
/// coordinate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedQuery {
    cleaned_text: String,
    coordinate: Option<Coordinate>,
    source: LocationSource,
}

impl ResolvedQuery {
    /// A query with a coordinate from `source`.
    ///
    /// Passing `LocationSource::None` here is a programming error; it is
    /// normalized to `unresolved` semantics by dropping the coordinate.
    pub fn located(cleaned_text: impl Into<String>, coordinate: Coordinate, source: LocationSource) -> Self {
        let coordinate = (source != LocationSource::None).then_some(coordinate);
        Self {
            cleaned_text: cleaned_text.into(),
            coordinate,
            source,
        }
    }

    /// A query for which no location could be found.
    pub fn unresolved(cleaned_text: impl Into<String>) -> Self {
        Self {
            cleaned_text: cleaned_text.into(),
            coordinate: None,
            source: LocationSource::None,
        }
    }

    pub fn cleaned_text(&self) -> &str {
        &self.cleaned_text
    }

    pub fn coordinate(&self) -> Option<Coordinate> {
        self.coordinate
    }

    pub fn source(&self) -> LocationSource {
        self.source
    }

    pub fn is_resolved(&self) -> bool {
        self.coordinate.is_some()
    }
}

/// A forward geocoding backend (Google Geocoding, Nominatim, ...).
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// A short name for logs (e.g. "google", "nominatim").
    fn name(&self) -> &str;

    /// Resolve free-form address text. `Ok(None)` means "no match".
    async fn forward_geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_boundaries() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_without_clamping() {
        assert_eq!(
            Coordinate::new(91.0, 0.0),
            Err(CoordinateError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coordinate::new(0.0, -180.5),
            Err(CoordinateError::LongitudeOutOfRange(-180.5))
        );
        assert_eq!(Coordinate::new(f64::NAN, 0.0), Err(CoordinateError::NotFinite));
    }

    #[test]
    fn deserialize_validates_range() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude":1.0,"longitude":2.0}"#).unwrap();
        assert_eq!(ok.latitude(), 1.0);
        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude":100.0,"longitude":2.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn haversine_distance_is_plausible() {
        // Roughly 1 degree of latitude
        let a = Coordinate::new(0.0, 0.0).unwrap();
        let b = Coordinate::new(1.0, 0.0).unwrap();
        let d = a.distance_to(&b);
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn resolved_query_source_tracks_coordinate() {
        let c = Coordinate::new(1.0, 2.0).unwrap();
        let q = ResolvedQuery::located("parks", c, LocationSource::LiteralPair);
        assert!(q.is_resolved());
        assert_eq!(q.source(), LocationSource::LiteralPair);

        let none = ResolvedQuery::located("parks", c, LocationSource::None);
        assert!(!none.is_resolved());

        let unresolved = ResolvedQuery::unresolved("parks");
        assert_eq!(unresolved.source(), LocationSource::None);
        assert_eq!(unresolved.coordinate(), None);
    }
}
