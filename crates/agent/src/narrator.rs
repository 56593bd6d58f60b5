//! Narrative answers from the completion provider.
//!
//! Two jobs: turn raw environmental data into a readable summary, and turn
//! an [`AggregateReport`] into a land or business analysis.

use std::sync::Arc;

use locas_config::CompletionConfig;
use locas_core::analysis::{AggregateReport, AnalysisKind};
use locas_core::environment::EnvironmentalData;
use locas_core::error::ProviderError;
use locas_core::message::Message;
use locas_core::provider::{Provider, ProviderRequest};
use locas_tools::format::{NO_ENVIRONMENT_DATA, format_report};
use tracing::{debug, warn};

pub const ENVIRONMENT_SYSTEM_PROMPT: &str = "You are a helpful assistant that formats environmental data into clear, readable messages. \
Your job is to take structured data about air quality and pollen forecasts and present it \
in a way that's informative, well-organized, and easy for people to understand.\n\
- Make the information scannable with bullet points or sections\n\
- Highlight key information that would be important to people with allergies or sensitivity to air pollution\n\
- Use plain language that anyone can understand\n\
- If there are health recommendations, make them clear and actionable";

pub const LAND_SYSTEM_PROMPT: &str = "You are a real estate location analyst providing insights about locations. \
Your analysis should be detailed, balanced, and objective, focusing on both \
advantages and potential concerns for land purchase decisions.";

pub const BUSINESS_SYSTEM_PROMPT: &str = "You are a small business location analyst specializing in retail and food service businesses. \
You provide insights about locations for business opportunities, with \
consideration for foot traffic, competition, and business viability.";

pub struct Narrator {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    summary_max_tokens: u32,
    analysis_max_tokens: u32,
}

impl Narrator {
    pub fn new(provider: Arc<dyn Provider>, config: &CompletionConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            summary_max_tokens: config.max_tokens,
            analysis_max_tokens: config.analysis_max_tokens,
        }
    }

    /// A readable summary of `data`.
    ///
    /// Never fails: a provider error or an empty reply falls back to
    /// [`EnvironmentalData::fallback_summary`].
    pub async fn summarize_environment(&self, data: &EnvironmentalData) -> String {
        if data.is_empty() {
            return NO_ENVIRONMENT_DATA.to_string();
        }

        let raw = serde_json::to_string_pretty(data).unwrap_or_default();
        let prompt = format!(
            "Please format the following environmental data into a human-readable message:\n\n\
             {raw}\n\n\
             The message should be clear, informative, and easy to understand.\n\
             Highlight key information and use formatting like bullet points to make it scannable.\n\
             If there are health recommendations, make them prominent."
        );

        match self
            .complete(ENVIRONMENT_SYSTEM_PROMPT, prompt, self.summary_max_tokens)
            .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                warn!("Empty environmental summary, using fallback");
                data.fallback_summary()
            }
            Err(e) => {
                warn!(error = %e, "Environmental summary failed, using fallback");
                data.fallback_summary()
            }
        }
    }

    /// Analyse a report for the user's question.
    pub async fn analyze(&self, report: &AggregateReport, user_query: &str) -> Result<String, ProviderError> {
        let prompt = analysis_prompt(report, user_query);
        let system = match report.kind {
            AnalysisKind::LandSuitability => LAND_SYSTEM_PROMPT,
            AnalysisKind::BusinessViability { .. } => BUSINESS_SYSTEM_PROMPT,
        };
        self.complete(system, prompt, self.analysis_max_tokens).await
    }

    async fn complete(&self, system: &str, prompt: String, max_tokens: u32) -> Result<String, ProviderError> {
        let mut request = ProviderRequest::new(&self.model, vec![Message::system(system), Message::user(prompt)]);
        request.temperature = self.temperature;
        request.max_tokens = Some(max_tokens);

        debug!(provider = self.provider.name(), model = %self.model, max_tokens, "Narrator request");
        let response = self.provider.complete(request).await?;
        Ok(response.message.content)
    }
}

/// The user prompt for an analysis, embedding the formatted report.
pub fn analysis_prompt(report: &AggregateReport, user_query: &str) -> String {
    let lat = report.location.latitude();
    let lng = report.location.longitude();
    let data = format_report(report);

    match &report.kind {
        AnalysisKind::LandSuitability => format!(
            "A user at coordinates ({lat}, {lng}) is asking: \"{user_query}\"\n\n\
             They want to know if this is a good place to buy land.\n\n\
             Here is data about the surrounding area:\n\n\
             {data}\n\n\
             Please provide a detailed analysis of the suitability of this location for land purchase. Consider:\n\
             1. Proximity to essential services (schools, hospitals, police)\n\
             2. Access to amenities (shopping, restaurants, parks)\n\
             3. Transportation options\n\
             4. Environmental factors\n\
             5. Overall neighborhood profile\n\n\
             Highlight both advantages and potential concerns. Be balanced and objective.\n\
             Conclude with a summary assessment of whether this location would be good for land purchase."
        ),
        AnalysisKind::BusinessViability { business_type } => format!(
            "A user at coordinates ({lat}, {lng}) is asking: \"{user_query}\"\n\n\
             They want to know if this is a good place to open a {business_type}.\n\n\
             Here is data about the surrounding area:\n\n\
             {data}\n\n\
             Please provide a detailed analysis of the viability of opening a {business_type} at this location. Consider:\n\
             1. Foot traffic generators (schools, offices, transit stations, etc.)\n\
             2. Existing competition (other similar businesses)\n\
             3. Demographics of the area\n\
             4. Environmental factors\n\
             5. Business potential\n\n\
             Highlight both advantages and potential challenges. Be balanced and objective.\n\
             Conclude with a summary assessment of whether this location would be good for a {business_type} business."
        ),
    }
}
