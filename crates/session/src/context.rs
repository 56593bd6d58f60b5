//! Per-turn session rules: which location a turn uses, and what a
//! successful turn writes back.

use std::sync::LazyLock;

use chrono::Utc;
use locas_core::geo::{Coordinate, ResolvedQuery};
use locas_core::message::ChatEntry;
use locas_core::session::SessionState;
use regex_lite::Regex;

/// Phrases that point back at the previous turn's location.
pub const BACK_REFERENCE_PHRASES: &[&str] = &["there", "that location", "that place", "the same place", "same location"];

static BACK_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = BACK_REFERENCE_PHRASES
        .iter()
        .map(|p| p.replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternatives})\b")).expect("valid back-reference pattern")
});

/// Does `text` refer back to an earlier location?
pub fn has_back_reference(text: &str) -> bool {
    BACK_REFERENCE.is_match(text)
}

/// The coordinate this turn should use.
///
/// A fresh coordinate always wins. Without one, a back-reference phrase
/// reuses the session's last location. Otherwise there is none.
pub fn resolve_location_for_turn(query: &ResolvedQuery, session: &SessionState) -> Option<Coordinate> {
    if let Some(fresh) = query.coordinate() {
        return Some(fresh);
    }
    if has_back_reference(query.cleaned_text()) {
        return session.last_location;
    }
    None
}

/// Apply a successful turn to a working copy of the session.
pub fn record_turn(
    session: &mut SessionState,
    coordinate: Coordinate,
    user_message: impl Into<String>,
    assistant_message: impl Into<String>,
) {
    session.last_location = Some(coordinate);
    session.history.push(ChatEntry::user(user_message));
    session.history.push(ChatEntry::assistant(assistant_message));
    session.updated_at = Utc::now();
}
