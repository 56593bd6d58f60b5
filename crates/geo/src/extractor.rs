//! Coordinate extraction from free text.
//!
//! Strategies run in strict priority order and the first success wins:
//!
//! 1. a map URL carrying `@lat,lng`, `q=lat,lng` or `ll=lat,lng`
//! 2. a bare `lat, lng` decimal pair anywhere in the text (last one wins)
//! 3. address phrases resolved through the [`GeocodingGateway`]
//!
//! Whatever produced the coordinate is removed from the text, so the rest of
//! the pipeline sees only the question.

use std::sync::LazyLock;

use locas_core::geo::{Coordinate, LocationSource, ResolvedQuery};
use regex_lite::Regex;
use tracing::{debug, info, warn};

use crate::gateway::GeocodingGateway;

static MAP_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://(?:www\.)?(?:google\.[a-z.]+/maps|maps\.google\.[a-z.]+)\S*")
        .expect("valid map url pattern")
});

/// Pair forms inside a map URL, checked in this order.
static URL_PAIRS: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"@([+-]?\d+\.\d+),([+-]?\d+\.\d+)",
        r"[?&]q=([+-]?\d+\.\d+)(?:,|%2C)([+-]?\d+\.\d+)",
        r"[?&]ll=([+-]?\d+\.\d+)(?:,|%2C)([+-]?\d+\.\d+)",
    ]
    .map(|p| Regex::new(p).expect("valid url pair pattern"))
});

static BARE_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([+-]?\d+\.\d+),\s*([+-]?\d+\.\d+)").expect("valid pair pattern"));

static ADDRESS_SPLIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[,;]|\bat\b|\bin\b|\bnear\b").expect("valid split pattern"));

/// Candidates shorter than this are too vague to geocode.
const MIN_CANDIDATE_LEN: usize = 10;

/// The first map URL in `text` that carries an in-range pair, with the byte
/// range of the URL.
pub fn coordinate_from_map_url(text: &str) -> Option<(Coordinate, std::ops::Range<usize>)> {
    for url in MAP_URL.find_iter(text) {
        let found = URL_PAIRS.iter().find_map(|re| re.captures(url.as_str()));
        let Some(caps) = found else {
            debug!(url = url.as_str(), "Map URL without a coordinate pair");
            continue;
        };
        match parse_pair(&caps[1], &caps[2]) {
            Some(Ok(c)) => return Some((c, url.range())),
            Some(Err(e)) => warn!(url = url.as_str(), error = %e, "Map URL pair out of range"),
            None => {}
        }
    }
    None
}

/// The last bare decimal pair in `text`, range-checked.
///
/// `Some(Err(_))` means a pair was present but out of range.
pub fn last_coordinate_pair(
    text: &str,
) -> Option<Result<(Coordinate, std::ops::Range<usize>), locas_core::CoordinateError>> {
    let caps = BARE_PAIR.captures_iter(text).last()?;
    let range = caps.get(0)?.range();
    parse_pair(&caps[1], &caps[2]).map(|r| r.map(|c| (c, range)))
}

/// Address phrases to try against the geocoder, most specific first.
///
/// Parts split on `,` `;` and the words at/in/near longer than ten
/// characters, followed by the whole text.
pub fn address_candidates(text: &str) -> Vec<String> {
    let mut candidates: Vec<String> = ADDRESS_SPLIT
        .split(text)
        .map(str::trim)
        .filter(|part| part.chars().count() > MIN_CANDIDATE_LEN)
        .map(String::from)
        .collect();

    let full = text.trim();
    if !full.is_empty() && !candidates.iter().any(|c| c == full) {
        candidates.push(full.to_string());
    }
    candidates
}

fn parse_pair(lat: &str, lng: &str) -> Option<Result<Coordinate, locas_core::CoordinateError>> {
    let lat = lat.parse::<f64>().ok()?;
    let lng = lng.parse::<f64>().ok()?;
    Some(Coordinate::new(lat, lng))
}

fn remove_range(text: &str, range: std::ops::Range<usize>) -> String {
    let mut out = String::with_capacity(text.len());
    out.push_str(&text[..range.start]);
    out.push(' ');
    out.push_str(&text[range.end..]);
    normalize_whitespace(&out)
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub struct CoordinateExtractor {
    gateway: GeocodingGateway,
}

impl CoordinateExtractor {
    pub fn new(gateway: GeocodingGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &GeocodingGateway {
        &self.gateway
    }

    /// Derive this turn's location from `text`.
    pub async fn extract(&self, text: &str) -> ResolvedQuery {
        if let Some((coordinate, range)) = coordinate_from_map_url(text) {
            info!(%coordinate, "Location from map URL");
            return ResolvedQuery::located(remove_range(text, range), coordinate, LocationSource::Url);
        }

        match last_coordinate_pair(text) {
            Some(Ok((coordinate, range))) => {
                info!(%coordinate, "Location from coordinate pair");
                return ResolvedQuery::located(remove_range(text, range), coordinate, LocationSource::LiteralPair);
            }
            Some(Err(e)) => {
                warn!(error = %e, "Discarding out-of-range coordinate pair");
            }
            None => {}
        }

        for candidate in address_candidates(text) {
            if let Some(coordinate) = self.gateway.resolve_address(&candidate).await {
                info!(%coordinate, candidate = %candidate, "Location from address");
                let cleaned = normalize_whitespace(&text.replacen(candidate.as_str(), " ", 1));
                return ResolvedQuery::located(cleaned, coordinate, LocationSource::GeocodedAddress);
            }
        }

        debug!("No location found in query");
        ResolvedQuery::unresolved(normalize_whitespace(text))
    }
}
