//! Build every outbound client from configuration.
//!
//! All clients share one `reqwest::Client` carrying the configured timeout
//! and user agent.

use std::sync::Arc;

use locas_config::AppConfig;
use locas_core::environment::EnvironmentProvider;
use locas_core::error::ProviderError;
use locas_core::geo::Geocoder;
use locas_core::places::PlaceSearch;
use locas_core::provider::Provider;
use tracing::{info, warn};

use crate::geocoding::{GoogleGeocoder, NominatimGeocoder};
use crate::google_environment::GoogleEnvironmentClient;
use crate::google_places::GooglePlacesClient;
use crate::http::build_client;
use crate::openai_compat::OpenAiCompatProvider;

/// The collaborators a `LocationAssistant` needs, ready to share.
#[derive(Clone)]
pub struct ProviderSet {
    pub completion: Arc<dyn Provider>,
    pub places: Arc<dyn PlaceSearch>,
    pub environment: Arc<dyn EnvironmentProvider>,
    /// In priority order
    pub geocoders: Vec<Arc<dyn Geocoder>>,
}

impl ProviderSet {
    pub fn from_config(config: &AppConfig) -> Result<Self, ProviderError> {
        let client = build_client(config.http.timeout(), &config.geocoding.user_agent)?;

        if !config.has_completion_key() {
            warn!("No completion API key configured; completion requests will fail");
        }
        let completion: Arc<dyn Provider> = Arc::new(OpenAiCompatProvider::new(
            &config.completion.provider,
            &config.completion.base_url,
            config.completion.api_key.clone().unwrap_or_default(),
            client.clone(),
        ));

        let maps_key = config.maps.usable_api_key();
        if maps_key.is_none() {
            warn!("No usable maps API key; place and environmental lookups will degrade to empty results");
        }
        let maps_key = maps_key.unwrap_or_default().to_string();

        let places: Arc<dyn PlaceSearch> = Arc::new(GooglePlacesClient::new(
            client.clone(),
            &maps_key,
            &config.maps.places_url,
            &config.maps.language,
        ));

        let environment: Arc<dyn EnvironmentProvider> = Arc::new(GoogleEnvironmentClient::new(
            client.clone(),
            &maps_key,
            &config.maps.air_quality_url,
            &config.maps.pollen_url,
            config.maps.pollen_days,
        ));

        let mut geocoders: Vec<Arc<dyn Geocoder>> = Vec::new();
        if !maps_key.is_empty() {
            geocoders.push(Arc::new(GoogleGeocoder::new(
                client.clone(),
                &maps_key,
                &config.maps.geocode_url,
            )));
        }
        geocoders.push(Arc::new(NominatimGeocoder::new(client, &config.geocoding.nominatim_url)));

        info!(
            completion = %completion.name(),
            geocoders = ?geocoders.iter().map(|g| g.name()).collect::<Vec<_>>(),
            "Providers configured"
        );

        Ok(Self {
            completion,
            places,
            environment,
            geocoders,
        })
    }
}
