//! The bounded tool-calling loop for general queries.
//!
//! 1. Seed the conversation with the system prompt and the user's text plus
//!    the turn's coordinate
//! 2. Send it to the completion provider with the tool definitions
//! 3. If the reply calls tools: parse, execute and append each result, then
//!    go back to step 2
//! 4. If the reply is text: that is the answer
//!
//! The loop gives up after a fixed number of round-trips.

use std::sync::Arc;

use locas_config::CompletionConfig;
use locas_core::analysis::AnalysisKind;
use locas_core::error::ProviderError;
use locas_core::geo::Coordinate;
use locas_core::message::{Message, MessageToolCall};
use locas_core::provider::{Provider, ProviderRequest};
use locas_tools::{ToolArguments, ToolInvocation, ToolOutcome, definitions, format_outcome};
use tracing::{debug, info, warn};

use crate::aggregator::CategoryAggregator;

pub const SYSTEM_PROMPT: &str = "You are a helpful location assistant that helps users find places near them \
and provides environmental information.\n\n\
When users ask about places, use the appropriate search function based on their request:\n\
- For finding places by category, use find_places\n\
- For comprehensive location analysis, use analyze_location_suitability\n\
- For business viability analysis, use analyze_business_viability\n\n\
When users ask about air quality or pollen, use the get_environmental_data function.\n\n\
Always format search results in a user-friendly way. If distances are available, mention them.\n\
If the requested data is not available for a location, explain the issue in a helpful way.";

pub const EMPTY_ANSWER: &str = "I couldn't generate a response.";

pub const MAX_TURNS_APOLOGY: &str =
    "I'm sorry, I wasn't able to complete your request within the allowed number of turns.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrchestratorOutcome {
    Done(String),
    MaxTurnsExceeded,
}

impl OrchestratorOutcome {
    /// The text shown to the user.
    pub fn into_answer(self) -> String {
        match self {
            Self::Done(answer) => answer,
            Self::MaxTurnsExceeded => MAX_TURNS_APOLOGY.to_string(),
        }
    }
}

pub struct ToolOrchestrator {
    provider: Arc<dyn Provider>,
    aggregator: Arc<CategoryAggregator>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_turns: usize,
}

impl ToolOrchestrator {
    pub fn new(provider: Arc<dyn Provider>, aggregator: Arc<CategoryAggregator>, config: &CompletionConfig) -> Self {
        Self {
            provider,
            aggregator,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_turns: config.max_turns,
        }
    }

    pub fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    /// Answer `text` about `location`.
    ///
    /// A completion failure ends the turn with `Err`; tool failures are
    /// reported to the model and the loop carries on.
    pub async fn run(&self, text: &str, location: Coordinate) -> Result<OrchestratorOutcome, ProviderError> {
        let mut messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(format!(
                "{text} My location is {}, {}",
                location.latitude(),
                location.longitude()
            )),
        ];
        let tools = definitions();

        for turn in 1..=self.max_turns {
            debug!(turn, max_turns = self.max_turns, messages = messages.len(), "Orchestrator round-trip");

            let mut request = ProviderRequest::new(&self.model, messages.clone());
            request.temperature = self.temperature;
            request.max_tokens = Some(self.max_tokens);
            request.tools = tools.clone();

            let response = self.provider.complete(request).await?;

            if response.message.tool_calls.is_empty() {
                info!(turn, "Orchestrator answered");
                let answer = response.message.content;
                if answer.trim().is_empty() {
                    return Ok(OrchestratorOutcome::Done(EMPTY_ANSWER.to_string()));
                }
                return Ok(OrchestratorOutcome::Done(answer));
            }

            let tool_calls = response.message.tool_calls.clone();
            debug!(tool_count = tool_calls.len(), "Executing tool calls");
            messages.push(response.message);

            for call in &tool_calls {
                let outcome = self.dispatch(call).await;
                messages.push(Message::tool_result(&call.id, format_outcome(&outcome)));
            }
        }

        warn!(max_turns = self.max_turns, "Tool loop hit its round-trip limit");
        Ok(OrchestratorOutcome::MaxTurnsExceeded)
    }

    async fn dispatch(&self, call: &MessageToolCall) -> ToolOutcome {
        match ToolInvocation::parse(call) {
            Ok(invocation) => self.execute(invocation).await,
            Err(e) => {
                warn!(tool = %call.name, error = %e, "Rejected tool call");
                e.into()
            }
        }
    }

    /// Run one validated invocation.
    pub async fn execute(&self, invocation: ToolInvocation) -> ToolOutcome {
        let tool = invocation.arguments.tool_name();
        debug!(%tool, call_id = %invocation.id, "Executing tool");

        let outcome = match invocation.arguments {
            ToolArguments::FindPlaces {
                location,
                place_type,
                radius,
                keyword,
            } => match self
                .aggregator
                .find_places(location, &place_type, radius, keyword.as_deref())
                .await
            {
                Ok(result) => ToolOutcome::Places(result),
                Err(e) => ToolOutcome::Failed(e.to_string()),
            },
            ToolArguments::AnalyzeLocationSuitability { location, radius } => ToolOutcome::Report(
                self.aggregator
                    .aggregate(location, &AnalysisKind::LandSuitability, radius)
                    .await,
            ),
            ToolArguments::AnalyzeBusinessViability {
                location,
                radius,
                business_type,
            } => ToolOutcome::Report(
                self.aggregator
                    .aggregate(
                        location,
                        &AnalysisKind::BusinessViability { business_type },
                        radius,
                    )
                    .await,
            ),
            ToolArguments::GetEnvironmentalData { location, data_type } => {
                match self.aggregator.environment(location, data_type).await {
                    Ok(data) => ToolOutcome::Environment(data),
                    Err(e) => ToolOutcome::Failed(e.to_string()),
                }
            }
        };

        if let ToolOutcome::Failed(reason) = &outcome {
            warn!(%tool, reason = %reason, "Tool failed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::narrator::Narrator;
    use crate::testing::{EnvReply, Reply, ScriptedProvider, StubEnvironment, StubPlaces, tool_call};
    use locas_core::message::Role;

    fn here() -> Coordinate {
        Coordinate::new(40.7128, -74.006).unwrap()
    }

    fn orchestrator(provider: Arc<ScriptedProvider>, places: Arc<StubPlaces>) -> ToolOrchestrator {
        let config = CompletionConfig::default();
        let narrator = Arc::new(Narrator::new(provider.clone(), &config));
        let aggregator = Arc::new(CategoryAggregator::new(
            places,
            Arc::new(StubEnvironment::new(EnvReply::Nothing)),
            narrator,
            1500,
        ));
        ToolOrchestrator::new(provider, aggregator, &config)
    }

    #[tokio::test]
    async fn plain_text_answer() {
        let provider = Arc::new(ScriptedProvider::texts(&["Hello there."]));
        let outcome = orchestrator(provider.clone(), Arc::new(StubPlaces::default()))
            .run("hi", here())
            .await
            .unwrap();
        assert_eq!(outcome, OrchestratorOutcome::Done("Hello there.".into()));

        let req = provider.requests().remove(0);
        assert_eq!(req.messages[0].content, SYSTEM_PROMPT);
        assert_eq!(req.messages[1].content, "hi My location is 40.7128, -74.006");
        assert_eq!(req.tools.len(), 4);
        assert_eq!(req.max_tokens, Some(1000));
    }

    #[tokio::test]
    async fn empty_answer_is_replaced() {
        let provider = Arc::new(ScriptedProvider::texts(&["  "]));
        let outcome = orchestrator(provider, Arc::new(StubPlaces::default()))
            .run("hi", here())
            .await
            .unwrap();
        assert_eq!(outcome.into_answer(), EMPTY_ANSWER);
    }

    #[tokio::test]
    async fn tool_result_fed_back_by_call_id() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Reply::ToolCalls(vec![tool_call(
                "call_a",
                "find_places",
                r#"{"latitude": 40.7128, "longitude": -74.006, "place_type": "park"}"#,
            )]),
            Reply::Text("There is one park: Bryant Park.".into()),
        ]));
        let places = Arc::new(StubPlaces::default().with("park", &["Bryant Park"]));

        let outcome = orchestrator(provider.clone(), places.clone())
            .run("parks?", here())
            .await
            .unwrap();
        assert_eq!(outcome, OrchestratorOutcome::Done("There is one park: Bryant Park.".into()));

        let second = &provider.requests()[1];
        let tool_msg = second.messages.last().unwrap();
        assert_eq!(tool_msg.role, Role::Tool);
        assert_eq!(tool_msg.tool_call_id.as_deref(), Some("call_a"));
        assert_eq!(tool_msg.content, "Found 1 park:\n- Bryant Park: Bryant Park Road");
        assert_eq!(second.messages[2].tool_calls.len(), 1);
        assert_eq!(places.kinds_searched(), vec!["park"]);
    }

    #[tokio::test]
    async fn invalid_calls_are_reported_to_the_model() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Reply::ToolCalls(vec![
                tool_call("c1", "teleport", "{}"),
                tool_call("c2", "find_places", r#"{"latitude": 100.0, "longitude": 0.0, "place_type": "park"}"#),
                tool_call("c3", "get_environmental_data", "not json"),
            ]),
            Reply::Text("Sorry, I could not look that up.".into()),
        ]));
        let places = Arc::new(StubPlaces::default());

        orchestrator(provider.clone(), places.clone())
            .run("anything", here())
            .await
            .unwrap();

        let second = &provider.requests()[1];
        let results: Vec<&Message> = second.messages.iter().filter(|m| m.role == Role::Tool).collect();
        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|m| m.content.starts_with("Error: ")));
        assert_eq!(results[0].content, "Error: Tool not found: teleport");
        assert_eq!(results[1].tool_call_id.as_deref(), Some("c2"));
        assert!(places.kinds_searched().is_empty());
    }

    #[tokio::test]
    async fn failing_search_is_reported_not_fatal() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Reply::ToolCalls(vec![tool_call(
                "c1",
                "find_places",
                r#"{"latitude": 1.0, "longitude": 2.0, "place_type": "hospital"}"#,
            )]),
            Reply::Text("The search failed.".into()),
        ]));
        let places = Arc::new(StubPlaces::default().failing_on("hospital"));

        let outcome = orchestrator(provider.clone(), places).run("hospitals", here()).await.unwrap();
        assert_eq!(outcome.into_answer(), "The search failed.");
        let tool_msg = provider.requests()[1].messages.last().unwrap().clone();
        assert!(tool_msg.content.starts_with("Error: API request failed"));
    }

    #[tokio::test]
    async fn always_calling_tools_exceeds_max_turns() {
        let provider = Arc::new(ScriptedProvider::repeating(Reply::ToolCalls(vec![tool_call(
            "loop",
            "get_environmental_data",
            r#"{"latitude": 1.0, "longitude": 2.0}"#,
        )])));

        let outcome = orchestrator(provider.clone(), Arc::new(StubPlaces::default()))
            .run("air?", here())
            .await
            .unwrap();
        assert_eq!(outcome, OrchestratorOutcome::MaxTurnsExceeded);
        assert_eq!(provider.calls(), 5);
        assert_eq!(outcome.into_answer(), MAX_TURNS_APOLOGY);
    }

    #[tokio::test]
    async fn completion_error_ends_the_turn() {
        let provider = Arc::new(ScriptedProvider::failing());
        let result = orchestrator(provider, Arc::new(StubPlaces::default()))
            .with_max_turns(3)
            .run("hi", here())
            .await;
        assert!(matches!(result, Err(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn analysis_tool_returns_report() {
        let provider = Arc::new(ScriptedProvider::texts(&[]));
        let places = Arc::new(StubPlaces::default().with("cafe", &["Chai Point"]));
        let orch = orchestrator(provider, places.clone());

        let invocation = ToolInvocation::parse(&tool_call(
            "c1",
            "analyze_business_viability",
            r#"{"latitude": 1.0, "longitude": 2.0, "business_type": "tea stall"}"#,
        ))
        .unwrap();
        let ToolOutcome::Report(report) = orch.execute(invocation).await else {
            panic!("expected a report");
        };
        assert_eq!(report.category("cafes").unwrap().total_found, 1);
        assert_eq!(report.category("competition").unwrap().total_found, 1);
        let searches = places.searches.lock().unwrap().clone();
        assert_eq!(searches.last().unwrap().2.as_deref(), Some("tea"));
    }
}
