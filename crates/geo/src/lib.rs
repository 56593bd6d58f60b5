//! Location resolution for Locas.
//!
//! `CoordinateExtractor` turns free text into a `ResolvedQuery`;
//! `GeocodingGateway` resolves address phrases through an ordered chain of
//! geocoders.

pub mod extractor;
pub mod gateway;

pub use extractor::{address_candidates, coordinate_from_map_url, last_coordinate_pair, CoordinateExtractor};
pub use gateway::{GeocodingGateway, DEFAULT_GEOCODE_TIMEOUT};
