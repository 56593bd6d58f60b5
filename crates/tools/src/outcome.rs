//! What a tool produced.

use locas_core::analysis::{AggregateReport, CategoryResult};
use locas_core::environment::EnvironmentalData;
use locas_core::error::ToolError;

/// The result of one tool execution.
///
/// Failures are values here, not errors: the orchestrator hands them back to
/// the model like any other result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// A single-category place search.
    Places(CategoryResult),
    /// A multi-category analysis.
    Report(AggregateReport),
    /// Environmental data, or `None` when the provider had nothing.
    Environment(Option<EnvironmentalData>),
    /// The tool could not run.
    Failed(String),
}

impl ToolOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl From<ToolError> for ToolOutcome {
    fn from(e: ToolError) -> Self {
        Self::Failed(e.to_string())
    }
}
