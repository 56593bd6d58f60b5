//! The Locas turn pipeline.
//!
//! A turn flows through:
//!
//! 1. **Locate**: extract a coordinate from the text, or reuse the session's
//!    last one when the text points back at it
//! 2. **Route**: land purchase, business viability or general dialogue
//! 3. **Answer**: land and business routes aggregate nearby categories and
//!    ask the narrator for an analysis; general queries go through the
//!    bounded tool-calling loop
//! 4. **Record**: append the exchange to the session and save it

pub mod aggregator;
pub mod assistant;
pub mod intent;
pub mod narrator;
pub mod orchestrator;

#[cfg(test)]
mod testing;

pub use aggregator::{CategoryAggregator, CategorySearch};
pub use assistant::{LocationAssistant, NO_LOCATION_MESSAGE, NO_LOCATION_RESULT, TurnError, TurnOutcome, TurnReply};
pub use intent::{Route, classify};
pub use narrator::Narrator;
pub use orchestrator::{OrchestratorOutcome, ToolOrchestrator};
