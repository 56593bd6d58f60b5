//! The tools the completion provider may call during a general turn.
//!
//! - [`schema`]: the JSON-schema definitions advertised to the model
//! - [`invocation`]: strict, per-tool parsing of a model's tool call
//! - [`outcome`]: what running a tool produced
//! - [`format`]: the one text rendering of an outcome the model (and the
//!   narrator) reads

pub mod format;
pub mod invocation;
pub mod outcome;
pub mod schema;

pub use format::format_outcome;
pub use invocation::{ToolArguments, ToolInvocation, ToolName};
pub use outcome::ToolOutcome;
pub use schema::definitions;
