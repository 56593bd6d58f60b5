//! Tool definitions sent with every orchestrator round-trip.

use locas_core::provider::ToolDefinition;
use serde_json::json;

use crate::invocation::ToolName;

/// All tool definitions, in the order they are advertised.
pub fn definitions() -> Vec<ToolDefinition> {
    ToolName::ALL.iter().map(|name| definition(*name)).collect()
}

/// The definition for a single tool.
pub fn definition(name: ToolName) -> ToolDefinition {
    let (description, parameters) = match name {
        ToolName::FindPlaces => (
            "Find places of a specific type near the specified location.",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "The latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "The longitude coordinate"
                    },
                    "place_type": {
                        "type": "string",
                        "description": "Type of place to search for (e.g., \"park\", \"hospital\", \"gym\")"
                    },
                    "radius": {
                        "type": "integer",
                        "description": "Search radius in meters (default: 1500)"
                    },
                    "keyword": {
                        "type": "string",
                        "description": "Additional keywords to refine the search (optional)"
                    }
                },
                "required": ["latitude", "longitude", "place_type"]
            }),
        ),
        ToolName::AnalyzeLocationSuitability => (
            "Analyze the suitability of a location for land purchase by checking multiple categories of nearby amenities.",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "The latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "The longitude coordinate"
                    },
                    "radius": {
                        "type": "integer",
                        "description": "Search radius in meters (default: 1500)"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        ),
        ToolName::AnalyzeBusinessViability => (
            "Analyze the viability of opening a business at the specified location by checking foot traffic generators and competition.",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "The latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "The longitude coordinate"
                    },
                    "radius": {
                        "type": "integer",
                        "description": "Search radius in meters (default: 1500)"
                    },
                    "business_type": {
                        "type": "string",
                        "description": "Type of business to analyze (e.g., \"tea stall\", \"coffee shop\", \"restaurant\")"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        ),
        ToolName::GetEnvironmentalData => (
            "Get environmental data for the specified location.",
            json!({
                "type": "object",
                "properties": {
                    "latitude": {
                        "type": "number",
                        "description": "The latitude coordinate"
                    },
                    "longitude": {
                        "type": "number",
                        "description": "The longitude coordinate"
                    },
                    "data_type": {
                        "type": "string",
                        "enum": ["air", "pollen", "both"],
                        "description": "Type of data to return - \"air\" for air quality, \"pollen\" for pollen data, or \"both\" (default)"
                    }
                },
                "required": ["latitude", "longitude"]
            }),
        ),
    };

    ToolDefinition {
        name: name.as_str().to_string(),
        description: description.to_string(),
        parameters,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_tools_in_order() {
        let names: Vec<String> = definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec![
                "find_places",
                "analyze_location_suitability",
                "analyze_business_viability",
                "get_environmental_data",
            ]
        );
    }

    #[test]
    fn every_schema_requires_coordinates() {
        for def in definitions() {
            let required = def.parameters["required"].as_array().unwrap();
            assert!(required.iter().any(|r| r == "latitude"), "{}", def.name);
            assert!(required.iter().any(|r| r == "longitude"), "{}", def.name);
            assert_eq!(def.parameters["type"], "object");
        }
    }

    #[test]
    fn find_places_requires_place_type() {
        let def = definition(ToolName::FindPlaces);
        let required = def.parameters["required"].as_array().unwrap();
        assert!(required.iter().any(|r| r == "place_type"));
        assert!(!required.iter().any(|r| r == "radius"));
    }

    #[test]
    fn environment_kind_is_enumerated() {
        let def = definition(ToolName::GetEnvironmentalData);
        assert_eq!(def.parameters["properties"]["data_type"]["enum"], json!(["air", "pollen", "both"]));
    }
}
