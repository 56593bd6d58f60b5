//! # Locas Core
//!
//! Domain types, traits, and error definitions for the Locas location
//! assistant. This crate has no HTTP or framework dependencies; it defines
//! the model that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator (completion provider, place search,
//! environmental data, geocoding, session storage) is a trait here.
//! Implementations live in their own crates, which keeps the orchestration
//! logic testable against stubs.

pub mod analysis;
pub mod environment;
pub mod error;
pub mod geo;
pub mod message;
pub mod places;
pub mod provider;
pub mod session;

// Re-export key types at crate root for ergonomics
pub use analysis::{AggregateReport, AnalysisKind, CategoryResult};
pub use environment::{EnvironmentKind, EnvironmentProvider, EnvironmentalData};
pub use error::{CoordinateError, Error, ProviderError, Result, SessionError, ToolError};
pub use geo::{Coordinate, Geocoder, LocationSource, ResolvedQuery};
pub use message::{ChatEntry, ChatRole, Message, MessageToolCall, Role};
pub use places::{PlaceOfInterest, PlaceSearch};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use session::{SessionState, SessionStore};
