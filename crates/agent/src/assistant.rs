//! The per-turn pipeline behind every entry point.
//!
//! session → extract location → resolve against the session → route →
//! analyse or orchestrate → record the turn.

use std::sync::Arc;
use std::time::Duration;

use locas_config::AppConfig;
use locas_core::environment::EnvironmentProvider;
use locas_core::error::{ProviderError, SessionError};
use locas_core::geo::{Coordinate, LocationSource};
use locas_core::message::ChatEntry;
use locas_core::places::PlaceSearch;
use locas_core::provider::Provider;
use locas_core::session::{SessionState, SessionStore};
use locas_geo::{CoordinateExtractor, GeocodingGateway};
use locas_providers::ProviderSet;
use locas_session::{record_turn, resolve_location_for_turn};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::aggregator::CategoryAggregator;
use crate::intent::{Route, classify};
use crate::narrator::Narrator;
use crate::orchestrator::ToolOrchestrator;

/// Shown to the user when no location could be found for a turn.
pub const NO_LOCATION_RESULT: &str =
    "The address was not found. Kindly include the address in your query to proceed.";

pub const NO_LOCATION_MESSAGE: &str = "No location information found in query";

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Answered {
        answer: String,
        route: Route,
        location: Coordinate,
    },
    /// Nothing in the text or the session located this turn.
    NoLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    pub session_id: String,
    pub outcome: TurnOutcome,
}

/// A turn that could not produce an answer. The session is left untouched.
#[derive(Debug, thiserror::Error)]
#[error("{source}")]
pub struct TurnError {
    pub session_id: String,
    pub source: ProviderError,
}

pub struct LocationAssistant {
    extractor: CoordinateExtractor,
    store: Arc<dyn SessionStore>,
    aggregator: Arc<CategoryAggregator>,
    orchestrator: ToolOrchestrator,
    session_ttl: Duration,
}

impl LocationAssistant {
    pub fn new(
        completion: Arc<dyn Provider>,
        places: Arc<dyn PlaceSearch>,
        environment: Arc<dyn EnvironmentProvider>,
        extractor: CoordinateExtractor,
        store: Arc<dyn SessionStore>,
        config: &AppConfig,
    ) -> Self {
        let narrator = Arc::new(Narrator::new(completion.clone(), &config.completion));
        let aggregator = Arc::new(CategoryAggregator::new(
            places,
            environment,
            narrator,
            config.maps.default_radius,
        ));
        let orchestrator = ToolOrchestrator::new(completion, aggregator.clone(), &config.completion);

        Self {
            extractor,
            store,
            aggregator,
            orchestrator,
            session_ttl: config.session.ttl(),
        }
    }

    /// Wire an assistant from configured providers.
    pub fn from_providers(providers: ProviderSet, store: Arc<dyn SessionStore>, config: &AppConfig) -> Self {
        let gateway = GeocodingGateway::from_geocoders(providers.geocoders, config.http.timeout());
        Self::new(
            providers.completion,
            providers.places,
            providers.environment,
            CoordinateExtractor::new(gateway),
            store,
            config,
        )
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Answer one query.
    ///
    /// `session_id` continues an existing conversation; `None` starts a new
    /// one. The returned reply always carries the id in use.
    pub async fn handle(&self, query: &str, session_id: Option<String>) -> Result<TurnReply, TurnError> {
        let session_id = session_id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let session = self.load_session(&session_id).await;

        let resolved = self.extractor.extract(query).await;
        let Some(location) = resolve_location_for_turn(&resolved, &session) else {
            info!(session_id = %session_id, "No location for turn");
            return Ok(TurnReply {
                session_id,
                outcome: TurnOutcome::NoLocation,
            });
        };
        let source = match resolved.source() {
            LocationSource::None => LocationSource::CarriedOver,
            fresh => fresh,
        };

        let text = resolved.cleaned_text();
        let route = classify(text);
        info!(session_id = %session_id, %location, ?source, route = route.label(), "Routing turn");

        let answer = match route.analysis_kind() {
            Some(kind) => {
                let report = self.aggregator.aggregate(location, &kind, None).await;
                self.aggregator.narrator().analyze(&report, text).await
            }
            None => self.orchestrator.run(text, location).await.map(|o| o.into_answer()),
        };
        let answer = match answer {
            Ok(answer) => answer,
            Err(source) => {
                warn!(session_id = %session_id, error = %source, "Turn failed");
                return Err(TurnError { session_id, source });
            }
        };

        let mut updated = session;
        record_turn(&mut updated, location, query, answer.clone());
        if let Err(e) = self.store.put(&session_id, &updated, self.session_ttl).await {
            warn!(session_id = %session_id, error = %e, "Failed to save session");
        }

        Ok(TurnReply {
            session_id,
            outcome: TurnOutcome::Answered {
                answer,
                route,
                location,
            },
        })
    }

    /// Chat history for a session; empty when the session is unknown.
    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatEntry>, SessionError> {
        Ok(self
            .store
            .get(session_id)
            .await?
            .map(|s| s.history)
            .unwrap_or_default())
    }

    async fn load_session(&self, session_id: &str) -> SessionState {
        match self.store.get(session_id).await {
            Ok(Some(session)) => {
                debug!(session_id, turns = session.history.len() / 2, "Session loaded");
                session
            }
            Ok(None) => {
                debug!(session_id, "New session");
                SessionState::new(session_id)
            }
            Err(e) => {
                warn!(session_id, error = %e, "Session read failed, starting fresh");
                SessionState::new(session_id)
            }
        }
    }
}
