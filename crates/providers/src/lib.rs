//! Outbound clients for Locas.
//!
//! Each client implements one `locas_core` trait: `Provider` for chat
//! completions, `PlaceSearch`, `EnvironmentProvider` and `Geocoder` for the
//! map services. `ProviderSet::from_config` wires them all together.

pub mod builder;
pub mod geocoding;
pub mod google_environment;
pub mod google_places;
pub mod http;
pub mod openai_compat;

pub use builder::ProviderSet;
pub use geocoding::{GoogleGeocoder, NominatimGeocoder};
pub use google_environment::GoogleEnvironmentClient;
pub use google_places::GooglePlacesClient;
pub use openai_compat::OpenAiCompatProvider;
