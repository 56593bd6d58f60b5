//! Text rendering of tool outcomes.

use std::fmt::Write;

use locas_core::analysis::{AggregateReport, CategoryResult};
use locas_core::environment::EnvironmentalData;
use locas_core::places::PlaceOfInterest;

use crate::outcome::ToolOutcome;

/// Places listed per category in a report.
const REPORT_TOP_PLACES: usize = 3;

pub const NO_ENVIRONMENT_DATA: &str = "No environmental data available for this location.";

pub fn format_outcome(outcome: &ToolOutcome) -> String {
    match outcome {
        ToolOutcome::Places(result) => format_places(result),
        ToolOutcome::Report(report) => format_report(report),
        ToolOutcome::Environment(Some(data)) => format_environment(data),
        ToolOutcome::Environment(None) => NO_ENVIRONMENT_DATA.to_string(),
        ToolOutcome::Failed(message) => format!("Error: {message}"),
    }
}

/// `Found N <term>:` followed by one line per place.
pub fn format_places(result: &CategoryResult) -> String {
    let lines: Vec<String> = result.places.iter().map(place_line).collect();
    format!("Found {} {}:\n{}", result.total_found, result.category, lines.join("\n"))
}

pub fn format_report(report: &AggregateReport) -> String {
    let mut parts = vec![format!(
        "Analysis results for location (Lat: {}, Lng: {}):\n",
        report.location.latitude(),
        report.location.longitude()
    )];

    for category in report.categories.iter().filter(|c| c.total_found > 0) {
        parts.push(format!("\n{} ({}):", title_case(&category.category), category.total_found));
        parts.extend(category.places.iter().take(REPORT_TOP_PLACES).map(place_line));
        if category.total_found > REPORT_TOP_PLACES {
            parts.push(format!("  ...and {} more", category.total_found - REPORT_TOP_PLACES));
        }
    }

    if let Some(summary) = &report.environmental_summary {
        parts.push(format!("\nEnvironmental Data:\n{summary}"));
    }

    parts.join("\n")
}

pub fn format_environment(data: &EnvironmentalData) -> String {
    let mut out = format!(
        "Environmental data for location (Lat: {}, Lng: {}):\n{}",
        data.location.latitude(),
        data.location.longitude(),
        data.fallback_summary()
    );
    for (label, payload) in [("Air quality", &data.air_quality), ("Pollen forecast", &data.pollen_forecast)] {
        if let Some(value) = payload {
            let _ = write!(out, "\n\n{label} details:\n{value}");
        }
    }
    out
}

fn place_line(place: &PlaceOfInterest) -> String {
    let mut line = format!("- {}: {}", place.name, place.address);
    if let Some(rating) = place.rating.filter(|r| *r > 0.0) {
        let _ = write!(line, " (Rating: {rating}/5)");
    }
    if let Some(distance) = place.distance_m {
        let _ = write!(line, " [{distance:.0} m away]");
    }
    line
}

/// `water_bodies` → `Water Bodies`.
fn title_case(category: &str) -> String {
    category
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
