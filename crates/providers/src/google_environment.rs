//! Google Air Quality and Pollen APIs behind one `EnvironmentProvider`.

use async_trait::async_trait;
use locas_core::environment::{EnvironmentKind, EnvironmentProvider, EnvironmentalData};
use locas_core::error::ProviderError;
use locas_core::geo::Coordinate;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http::{check_status, read_json, transport_error};

pub struct GoogleEnvironmentClient {
    client: reqwest::Client,
    api_key: String,
    air_quality_url: String,
    pollen_url: String,
    pollen_days: u8,
}

impl GoogleEnvironmentClient {
    pub fn new(
        client: reqwest::Client,
        api_key: impl Into<String>,
        air_quality_url: impl Into<String>,
        pollen_url: impl Into<String>,
        pollen_days: u8,
    ) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            air_quality_url: air_quality_url.into(),
            pollen_url: pollen_url.into(),
            pollen_days,
        }
    }

    async fn air_quality(&self, location: Coordinate) -> Result<Option<Value>, ProviderError> {
        let body = serde_json::json!({
            "location": {
                "latitude": location.latitude(),
                "longitude": location.longitude(),
            }
        });

        let response = self
            .client
            .post(&self.air_quality_url)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("air_quality", response).await?;
        Ok(non_empty(read_json("air_quality", response).await?))
    }

    async fn pollen(&self, location: Coordinate) -> Result<Option<Value>, ProviderError> {
        let params = [
            ("location.latitude", location.latitude().to_string()),
            ("location.longitude", location.longitude().to_string()),
            ("days", self.pollen_days.to_string()),
            ("key", self.api_key.clone()),
        ];

        let response = self
            .client
            .get(&self.pollen_url)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status("pollen", response).await?;
        Ok(non_empty(read_json("pollen", response).await?))
    }
}

fn non_empty(value: Value) -> Option<Value> {
    match &value {
        Value::Null => None,
        Value::Object(map) if map.is_empty() => None,
        _ => Some(value),
    }
}

/// Assemble the requested datasets.
///
/// A single-kind request propagates its error; for `Both`, one failing side
/// is logged and dropped, and `None` means neither side returned data.
pub(crate) fn combine(
    location: Coordinate,
    kind: EnvironmentKind,
    air: Option<Result<Option<Value>, ProviderError>>,
    pollen: Option<Result<Option<Value>, ProviderError>>,
) -> Result<Option<EnvironmentalData>, ProviderError> {
    let take = |label: &str, part: Option<Result<Option<Value>, ProviderError>>| match part {
        None => Ok(None),
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) if kind == EnvironmentKind::Both => {
            warn!(dataset = label, error = %e, "Environmental dataset unavailable");
            Ok(None)
        }
        Some(Err(e)) => Err(e),
    };

    let air_quality = take("air_quality", air)?;
    let pollen_forecast = take("pollen", pollen)?;

    let data = EnvironmentalData {
        location,
        air_quality,
        pollen_forecast,
    };
    Ok((!data.is_empty()).then_some(data))
}

#[async_trait]
impl EnvironmentProvider for GoogleEnvironmentClient {
    fn name(&self) -> &str {
        "google_environment"
    }

    async fn lookup(
        &self,
        location: Coordinate,
        kind: EnvironmentKind,
    ) -> Result<Option<EnvironmentalData>, ProviderError> {
        debug!(%location, ?kind, "Environmental lookup");

        let air = if kind.includes_air() {
            Some(self.air_quality(location).await)
        } else {
            None
        };
        let pollen = if kind.includes_pollen() {
            Some(self.pollen(location).await)
        } else {
            None
        };

        combine(location, kind, air, pollen)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn here() -> Coordinate {
        Coordinate::new(51.5, -0.12).unwrap()
    }

    fn fail() -> ProviderError {
        ProviderError::Network("connection refused".into())
    }

    #[test]
    fn both_swallows_one_failed_side() {
        let data = combine(
            here(),
            EnvironmentKind::Both,
            Some(Err(fail())),
            Some(Ok(Some(json!({"dailyInfo": []})))),
        )
        .unwrap()
        .unwrap();
        assert!(data.air_quality.is_none());
        assert!(data.pollen_forecast.is_some());
    }

    #[test]
    fn both_with_nothing_is_absent() {
        let data = combine(here(), EnvironmentKind::Both, Some(Err(fail())), Some(Ok(None))).unwrap();
        assert!(data.is_none());
    }

    #[test]
    fn single_kind_propagates_error() {
        let result = combine(here(), EnvironmentKind::Air, Some(Err(fail())), None);
        assert!(matches!(result, Err(ProviderError::Network(_))));
    }

    #[test]
    fn empty_payload_counts_as_missing() {
        assert!(non_empty(json!({})).is_none());
        assert!(non_empty(Value::Null).is_none());
        assert!(non_empty(json!({"indexes": []})).is_some());
    }
}
