//! Strict parsing of model tool calls.
//!
//! Each tool has one argument struct. A call is rejected before dispatch
//! when its JSON is malformed, a required field is missing, a field has the
//! wrong type, or the coordinate is out of range.

use std::fmt;
use std::str::FromStr;

use locas_core::environment::EnvironmentKind;
use locas_core::error::ToolError;
use locas_core::geo::Coordinate;
use locas_core::message::MessageToolCall;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// The generic business type when none is named.
pub const DEFAULT_BUSINESS_TYPE: &str = "business";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    FindPlaces,
    AnalyzeLocationSuitability,
    AnalyzeBusinessViability,
    GetEnvironmentalData,
}

impl ToolName {
    pub const ALL: [ToolName; 4] = [
        ToolName::FindPlaces,
        ToolName::AnalyzeLocationSuitability,
        ToolName::AnalyzeBusinessViability,
        ToolName::GetEnvironmentalData,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FindPlaces => "find_places",
            Self::AnalyzeLocationSuitability => "analyze_location_suitability",
            Self::AnalyzeBusinessViability => "analyze_business_viability",
            Self::GetEnvironmentalData => "get_environmental_data",
        }
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|name| name.as_str() == s)
            .ok_or_else(|| ToolError::NotFound(s.to_string()))
    }
}

#[derive(Deserialize)]
struct FindPlacesArgs {
    latitude: f64,
    longitude: f64,
    place_type: String,
    #[serde(default)]
    radius: Option<u32>,
    #[serde(default)]
    keyword: Option<String>,
}

#[derive(Deserialize)]
struct SuitabilityArgs {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    radius: Option<u32>,
}

#[derive(Deserialize)]
struct ViabilityArgs {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    radius: Option<u32>,
    #[serde(default)]
    business_type: Option<String>,
}

#[derive(Deserialize)]
struct EnvironmentArgs {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    data_type: EnvironmentKind,
}

/// Validated arguments, one variant per tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    FindPlaces {
        location: Coordinate,
        place_type: String,
        radius: Option<u32>,
        keyword: Option<String>,
    },
    AnalyzeLocationSuitability {
        location: Coordinate,
        radius: Option<u32>,
    },
    AnalyzeBusinessViability {
        location: Coordinate,
        radius: Option<u32>,
        business_type: String,
    },
    GetEnvironmentalData {
        location: Coordinate,
        data_type: EnvironmentKind,
    },
}

impl ToolArguments {
    pub fn tool_name(&self) -> ToolName {
        match self {
            Self::FindPlaces { .. } => ToolName::FindPlaces,
            Self::AnalyzeLocationSuitability { .. } => ToolName::AnalyzeLocationSuitability,
            Self::AnalyzeBusinessViability { .. } => ToolName::AnalyzeBusinessViability,
            Self::GetEnvironmentalData { .. } => ToolName::GetEnvironmentalData,
        }
    }

    pub fn location(&self) -> Coordinate {
        match self {
            Self::FindPlaces { location, .. }
            | Self::AnalyzeLocationSuitability { location, .. }
            | Self::AnalyzeBusinessViability { location, .. }
            | Self::GetEnvironmentalData { location, .. } => *location,
        }
    }
}

/// A tool call that passed validation, keyed by the model's call id.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub arguments: ToolArguments,
}

impl ToolInvocation {
    pub fn parse(call: &MessageToolCall) -> Result<Self, ToolError> {
        let name: ToolName = call.name.parse()?;
        let raw = if call.arguments.trim().is_empty() { "{}" } else { call.arguments.as_str() };

        let arguments = match name {
            ToolName::FindPlaces => {
                let args: FindPlacesArgs = decode(name, raw)?;
                let place_type = args.place_type.trim().to_string();
                if place_type.is_empty() {
                    return Err(invalid(name, "place_type must not be empty"));
                }
                ToolArguments::FindPlaces {
                    location: coordinate(name, args.latitude, args.longitude)?,
                    place_type,
                    radius: positive_radius(name, args.radius)?,
                    keyword: args.keyword.filter(|k| !k.trim().is_empty()),
                }
            }
            ToolName::AnalyzeLocationSuitability => {
                let args: SuitabilityArgs = decode(name, raw)?;
                ToolArguments::AnalyzeLocationSuitability {
                    location: coordinate(name, args.latitude, args.longitude)?,
                    radius: positive_radius(name, args.radius)?,
                }
            }
            ToolName::AnalyzeBusinessViability => {
                let args: ViabilityArgs = decode(name, raw)?;
                let business_type = args
                    .business_type
                    .map(|b| b.trim().to_string())
                    .filter(|b| !b.is_empty())
                    .unwrap_or_else(|| DEFAULT_BUSINESS_TYPE.to_string());
                ToolArguments::AnalyzeBusinessViability {
                    location: coordinate(name, args.latitude, args.longitude)?,
                    radius: positive_radius(name, args.radius)?,
                    business_type,
                }
            }
            ToolName::GetEnvironmentalData => {
                let args: EnvironmentArgs = decode(name, raw)?;
                ToolArguments::GetEnvironmentalData {
                    location: coordinate(name, args.latitude, args.longitude)?,
                    data_type: args.data_type,
                }
            }
        };

        Ok(Self {
            id: call.id.clone(),
            arguments,
        })
    }
}

fn invalid(name: ToolName, reason: impl Into<String>) -> ToolError {
    ToolError::InvalidArguments {
        tool_name: name.to_string(),
        reason: reason.into(),
    }
}

fn decode<T: DeserializeOwned>(name: ToolName, raw: &str) -> Result<T, ToolError> {
    serde_json::from_str(raw).map_err(|e| {
        debug!(tool = %name, error = %e, "Rejected tool arguments");
        invalid(name, e.to_string())
    })
}

fn coordinate(name: ToolName, latitude: f64, longitude: f64) -> Result<Coordinate, ToolError> {
    Coordinate::new(latitude, longitude).map_err(|e| invalid(name, e.to_string()))
}

fn positive_radius(name: ToolName, radius: Option<u32>) -> Result<Option<u32>, ToolError> {
    match radius {
        Some(0) => Err(invalid(name, "radius must be positive")),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: &str) -> MessageToolCall {
        MessageToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    #[test]
    fn parses_find_places() {
        let inv = ToolInvocation::parse(&call(
            "find_places",
            r#"{"latitude": 40.7, "longitude": -74.0, "place_type": "park", "radius": 800}"#,
        ))
        .unwrap();
        assert_eq!(inv.id, "call_1");
        match inv.arguments {
            ToolArguments::FindPlaces {
                location,
                place_type,
                radius,
                keyword,
            } => {
                assert_eq!((location.latitude(), location.longitude()), (40.7, -74.0));
                assert_eq!(place_type, "park");
                assert_eq!(radius, Some(800));
                assert!(keyword.is_none());
            }
            other => panic!("unexpected arguments: {other:?}"),
        }
    }

    #[test]
    fn business_type_defaults_to_generic() {
        let inv = ToolInvocation::parse(&call(
            "analyze_business_viability",
            r#"{"latitude": 1.0, "longitude": 2.0, "business_type": "  "}"#,
        ))
        .unwrap();
        assert!(matches!(
            inv.arguments,
            ToolArguments::AnalyzeBusinessViability { ref business_type, .. } if business_type == "business"
        ));
    }

    #[test]
    fn environment_kind_defaults_to_both() {
        let inv = ToolInvocation::parse(&call("get_environmental_data", r#"{"latitude": 1.0, "longitude": 2.0}"#))
            .unwrap();
        assert_eq!(
            inv.arguments,
            ToolArguments::GetEnvironmentalData {
                location: Coordinate::new(1.0, 2.0).unwrap(),
                data_type: EnvironmentKind::Both,
            }
        );
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let err = ToolInvocation::parse(&call("book_flight", "{}")).unwrap_err();
        assert!(matches!(err, ToolError::NotFound(ref n) if n == "book_flight"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let err = ToolInvocation::parse(&call("find_places", "{latitude: 1")).unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { .. }));
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let err = ToolInvocation::parse(&call("find_places", r#"{"latitude": 1.0, "longitude": 2.0}"#)).unwrap_err();
        assert!(err.to_string().contains("place_type"), "{err}");

        let err = ToolInvocation::parse(&call("analyze_location_suitability", "")).unwrap_err();
        assert!(err.to_string().contains("latitude"), "{err}");
    }

    #[test]
    fn wrong_types_are_rejected() {
        for args in [
            r#"{"latitude": "north", "longitude": 2.0}"#,
            r#"{"latitude": 1.0, "longitude": 2.0, "radius": -5}"#,
            r#"{"latitude": 1.0, "longitude": 2.0, "radius": "wide"}"#,
        ] {
            let result = ToolInvocation::parse(&call("analyze_location_suitability", args));
            assert!(matches!(result, Err(ToolError::InvalidArguments { .. })), "{args}");
        }

        let result = ToolInvocation::parse(&call(
            "get_environmental_data",
            r#"{"latitude": 1.0, "longitude": 2.0, "data_type": "noise"}"#,
        ));
        assert!(matches!(result, Err(ToolError::InvalidArguments { .. })));
    }

    #[test]
    fn out_of_range_coordinate_is_rejected() {
        let err = ToolInvocation::parse(&call("get_environmental_data", r#"{"latitude": 120.0, "longitude": 2.0}"#))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidArguments { ref tool_name, .. } if tool_name == "get_environmental_data"));
    }

    #[test]
    fn zero_radius_and_blank_place_type_are_rejected() {
        assert!(ToolInvocation::parse(&call(
            "find_places",
            r#"{"latitude": 1.0, "longitude": 2.0, "place_type": "park", "radius": 0}"#
        ))
        .is_err());
        assert!(ToolInvocation::parse(&call(
            "find_places",
            r#"{"latitude": 1.0, "longitude": 2.0, "place_type": " "}"#
        ))
        .is_err());
    }

    #[test]
    fn tool_name_round_trip() {
        for name in ToolName::ALL {
            assert_eq!(name.as_str().parse::<ToolName>().unwrap(), name);
        }
    }
}
