//! Geocoding gateway — ordered geocoder chain with per-attempt timeouts.
//!
//! A literal `lat, lng` string short-circuits the chain. Otherwise each
//! geocoder is tried once in order; errors, timeouts and misses move on to
//! the next one.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use locas_core::geo::{Coordinate, Geocoder};
use regex_lite::Regex;
use tracing::{debug, info, warn};

static LITERAL_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([+-]?\d+\.?\d*),\s*([+-]?\d+\.?\d*)$").expect("valid literal pair pattern"));

/// Default per-attempt timeout.
pub const DEFAULT_GEOCODE_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GeocodingGateway {
    chain: Vec<GeocoderEntry>,
}

struct GeocoderEntry {
    geocoder: Arc<dyn Geocoder>,
    timeout: Duration,
}

impl GeocodingGateway {
    /// Create a gateway with no geocoders (only literal pairs resolve).
    pub fn new() -> Self {
        Self { chain: Vec::new() }
    }

    /// Add a geocoder to the end of the chain.
    pub fn add(mut self, geocoder: Arc<dyn Geocoder>, timeout: Duration) -> Self {
        self.chain.push(GeocoderEntry { geocoder, timeout });
        self
    }

    /// Build from an already-ordered list sharing one timeout.
    pub fn from_geocoders(geocoders: Vec<Arc<dyn Geocoder>>, timeout: Duration) -> Self {
        geocoders
            .into_iter()
            .fold(Self::new(), |gateway, g| gateway.add(g, timeout))
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Resolve free text to a coordinate, or `None` when nothing matched.
    pub async fn resolve_address(&self, text: &str) -> Option<Coordinate> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Some(caps) = LITERAL_PAIR.captures(text) {
            let lat = caps[1].parse::<f64>().ok()?;
            let lng = caps[2].parse::<f64>().ok()?;
            return match Coordinate::new(lat, lng) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!(text, error = %e, "Literal coordinate out of range");
                    None
                }
            };
        }

        for (i, entry) in self.chain.iter().enumerate() {
            let name = entry.geocoder.name();
            debug!(geocoder = name, attempt = i + 1, total = self.chain.len(), "Geocoding");

            match tokio::time::timeout(entry.timeout, entry.geocoder.forward_geocode(text)).await {
                Ok(Ok(Some(coordinate))) => {
                    info!(geocoder = name, %coordinate, "Address resolved");
                    return Some(coordinate);
                }
                Ok(Ok(None)) => {
                    debug!(geocoder = name, "No match, trying next");
                }
                Ok(Err(e)) => {
                    warn!(geocoder = name, error = %e, "Geocoder failed, trying next");
                }
                Err(_) => {
                    warn!(
                        geocoder = name,
                        timeout_secs = entry.timeout.as_secs(),
                        "Geocoder timed out, trying next"
                    );
                }
            }
        }

        None
    }
}

impl Default for GeocodingGateway {
    fn default() -> Self {
        Self::new()
    }
}
