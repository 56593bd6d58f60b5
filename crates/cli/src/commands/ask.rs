//! `locas ask` — Answer a single query.

use locas_agent::{LocationAssistant, NO_LOCATION_RESULT, TurnOutcome};
use locas_config::AppConfig;
use locas_providers::ProviderSet;

pub async fn run(query: String, session: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if !config.has_completion_key() {
        return Err("No completion API key configured — set OPENAI_API_KEY or completion.api_key".into());
    }

    let providers = ProviderSet::from_config(&config)?;
    let store = locas_session::build_store(&config.session);
    let assistant = LocationAssistant::from_providers(providers, store, &config);

    let reply = assistant
        .handle(&query, session)
        .await
        .map_err(|e| format!("Error processing query: {e}"))?;

    match reply.outcome {
        TurnOutcome::Answered { answer, .. } => println!("{answer}"),
        TurnOutcome::NoLocation => println!("{NO_LOCATION_RESULT}"),
    }
    eprintln!("session: {}", reply.session_id);

    Ok(())
}
