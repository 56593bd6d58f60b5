//! Google Places nearby search.

use async_trait::async_trait;
use locas_core::error::ProviderError;
use locas_core::geo::Coordinate;
use locas_core::places::{PlaceOfInterest, PlaceSearch};
use serde_json::Value;
use tracing::debug;

use crate::http::{check_status, read_json, transport_error};

pub struct GooglePlacesClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: String,
}

impl GooglePlacesClient {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
            language: language.into(),
        }
    }
}

#[async_trait]
impl PlaceSearch for GooglePlacesClient {
    fn name(&self) -> &str {
        "google_places"
    }

    async fn search(
        &self,
        center: Coordinate,
        place_kind: &str,
        radius_m: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<PlaceOfInterest>, ProviderError> {
        let mut params = vec![
            ("location", format!("{},{}", center.latitude(), center.longitude())),
            ("radius", radius_m.to_string()),
            ("key", self.api_key.clone()),
            ("language", self.language.clone()),
        ];
        if !place_kind.is_empty() {
            params.push(("type", place_kind.to_string()));
        }
        if let Some(keyword) = keyword.filter(|k| !k.is_empty()) {
            params.push(("keyword", keyword.to_string()));
        }

        debug!(place_kind, radius_m, keyword, "Nearby search");

        let response = self
            .client
            .get(&self.base_url)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("google_places", response).await?;
        let body = read_json("google_places", response).await?;

        parse_nearby_response(&body, center)
    }
}

/// Interpret a nearby-search body. `ZERO_RESULTS` is an empty list, not an
/// error.
pub(crate) fn parse_nearby_response(body: &Value, center: Coordinate) -> Result<Vec<PlaceOfInterest>, ProviderError> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("OK");
    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        "REQUEST_DENIED" => {
            return Err(ProviderError::AuthenticationFailed(error_message(body, status)));
        }
        "OVER_QUERY_LIMIT" => return Err(ProviderError::RateLimited { retry_after_secs: 5 }),
        other => {
            return Err(ProviderError::ApiError {
                status_code: 200,
                message: error_message(body, other),
            });
        }
    }

    let results = body.get("results").and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[]);
    Ok(results.iter().map(|place| to_place(place, center)).collect())
}

fn error_message(body: &Value, status: &str) -> String {
    body.get("error_message")
        .and_then(Value::as_str)
        .map(|m| format!("{status}: {m}"))
        .unwrap_or_else(|| status.to_string())
}

fn to_place(place: &Value, center: Coordinate) -> PlaceOfInterest {
    let name = place.get("name").and_then(Value::as_str).unwrap_or("Unnamed");
    let address = place
        .get("vicinity")
        .and_then(Value::as_str)
        .unwrap_or("No address provided");

    let mut poi = PlaceOfInterest::new(name, address);
    poi.rating = place.get("rating").and_then(Value::as_f64).map(|r| r as f32);
    poi.types = place
        .get("types")
        .and_then(Value::as_array)
        .map(|types| types.iter().filter_map(Value::as_str).map(String::from).collect())
        .unwrap_or_default();

    let location = place.get("geometry").and_then(|g| g.get("location"));
    poi.distance_m = location
        .and_then(|loc| {
            let lat = loc.get("lat").and_then(Value::as_f64)?;
            let lng = loc.get("lng").and_then(Value::as_f64)?;
            Coordinate::new(lat, lng).ok()
        })
        .map(|here| center.distance_to(&here));

    poi
}
