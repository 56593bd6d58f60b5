//! Environmental data (air quality, pollen) and its provider trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::geo::Coordinate;

/// Which environmental datasets to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    Air,
    Pollen,
    #[default]
    Both,
}

impl EnvironmentKind {
    pub fn includes_air(self) -> bool {
        matches!(self, Self::Air | Self::Both)
    }

    pub fn includes_pollen(self) -> bool {
        matches!(self, Self::Pollen | Self::Both)
    }
}

/// Raw environmental payloads for a location.
///
/// The payloads are kept as provider JSON; only `fallback_summary` looks
/// inside them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalData {
    pub location: Coordinate,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pollen_forecast: Option<serde_json::Value>,
}

impl EnvironmentalData {
    pub fn is_empty(&self) -> bool {
        self.air_quality.is_none() && self.pollen_forecast.is_none()
    }

    /// A deterministic one-line summary: the first AQI index and the
    /// first day's pollen levels, joined with `" | "`.
    pub fn fallback_summary(&self) -> String {
        let mut parts = Vec::new();

        if let Some(index) = self
            .air_quality
            .as_ref()
            .and_then(|air| air.get("indexes"))
            .and_then(|v| v.as_array())
            .and_then(|indexes| indexes.first())
        {
            let category = index.get("category").and_then(|v| v.as_str()).unwrap_or("Unknown");
            let aqi = index
                .get("aqi")
                .map(|v| match v {
                    serde_json::Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_else(|| "N/A".to_string());
            parts.push(format!("Air Quality: {category} ({aqi})"));
        }

        let first_day_types = self
            .pollen_forecast
            .as_ref()
            .and_then(|p| p.get("dailyInfo"))
            .and_then(|v| v.as_array())
            .and_then(|days| days.first())
            .and_then(|day| day.get("pollenTypeInfo"))
            .and_then(|v| v.as_array());

        if let Some(types) = first_day_types {
            let levels: Vec<String> = types
                .iter()
                .map(|t| {
                    let name = t.get("displayName").and_then(|v| v.as_str()).unwrap_or("Unknown");
                    let level = t
                        .get("indexInfo")
                        .and_then(|i| i.get("category"))
                        .and_then(|v| v.as_str())
                        .unwrap_or("Unknown");
                    format!("{name}: {level}")
                })
                .collect();
            if !levels.is_empty() {
                parts.push(format!("Pollen Levels: {}", levels.join(", ")));
            }
        }

        if parts.is_empty() {
            return "Environmental data available but could not be formatted.".to_string();
        }
        parts.join(" | ")
    }
}

/// An air quality / pollen backend.
#[async_trait]
pub trait EnvironmentProvider: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` when no dataset of the requested kind came back.
    async fn lookup(
        &self,
        location: Coordinate,
        kind: EnvironmentKind,
    ) -> Result<Option<EnvironmentalData>, ProviderError>;
}
