//! Forward geocoders: Google Geocoding and OpenStreetMap Nominatim.

use async_trait::async_trait;
use locas_core::error::ProviderError;
use locas_core::geo::{Coordinate, Geocoder};
use serde_json::Value;
use tracing::debug;

use crate::http::{check_status, read_json, transport_error};

/// Google Geocoding API (keyed).
pub struct GoogleGeocoder {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    pub fn new(client: reqwest::Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    fn name(&self) -> &str {
        "google"
    }

    async fn forward_geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        debug!(geocoder = "google", address, "Forward geocode");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("google_geocoding", response).await?;
        let body = read_json("google_geocoding", response).await?;

        parse_google_geocode(&body)
    }
}

pub(crate) fn parse_google_geocode(body: &Value) -> Result<Option<Coordinate>, ProviderError> {
    match body.get("status").and_then(Value::as_str).unwrap_or("OK") {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(None),
        "REQUEST_DENIED" => {
            return Err(ProviderError::AuthenticationFailed("google geocoding denied the request".into()));
        }
        other => {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: other.to_string(),
            });
        }
    }

    let location = body
        .get("results")
        .and_then(Value::as_array)
        .and_then(|r| r.first())
        .and_then(|r| r.get("geometry"))
        .and_then(|g| g.get("location"));

    let Some(location) = location else {
        return Ok(None);
    };

    let lat = location.get("lat").and_then(Value::as_f64);
    let lng = location.get("lng").and_then(Value::as_f64);
    match (lat, lng) {
        (Some(lat), Some(lng)) => Coordinate::new(lat, lng)
            .map(Some)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string())),
        _ => Err(ProviderError::InvalidResponse("geocode result without lat/lng".into())),
    }
}

/// Nominatim search API (keyless; requires an identifying user agent).
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    /// `client` must carry the configured user agent.
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    async fn forward_geocode(&self, address: &str) -> Result<Option<Coordinate>, ProviderError> {
        debug!(geocoder = "nominatim", address, "Forward geocode");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("nominatim", response).await?;
        let body = read_json("nominatim", response).await?;

        parse_nominatim(&body)
    }
}

/// Nominatim returns an array of hits with `lat`/`lon` as strings.
pub(crate) fn parse_nominatim(body: &Value) -> Result<Option<Coordinate>, ProviderError> {
    let Some(hit) = body.as_array().and_then(|hits| hits.first()) else {
        return Ok(None);
    };

    let component = |key: &str| -> Option<f64> {
        match hit.get(key)? {
            Value::String(s) => s.parse().ok(),
            other => other.as_f64(),
        }
    };

    match (component("lat"), component("lon")) {
        (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
            .map(Some)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string())),
        _ => Err(ProviderError::InvalidResponse("nominatim hit without lat/lon".into())),
    }
}
