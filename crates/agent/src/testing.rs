//! Scripted collaborators for unit tests.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use locas_core::environment::{EnvironmentKind, EnvironmentProvider, EnvironmentalData};
use locas_core::error::ProviderError;
use locas_core::geo::Coordinate;
use locas_core::message::{Message, MessageToolCall};
use locas_core::places::{PlaceOfInterest, PlaceSearch};
use locas_core::provider::{Provider, ProviderRequest, ProviderResponse};

#[derive(Clone)]
pub(crate) enum Reply {
    Text(String),
    ToolCalls(Vec<MessageToolCall>),
    Fail,
}

pub(crate) fn tool_call(id: &str, name: &str, arguments: &str) -> MessageToolCall {
    MessageToolCall {
        id: id.into(),
        name: name.into(),
        arguments: arguments.into(),
    }
}

/// Replies in order, then either repeats the last reply or errors.
pub(crate) struct ScriptedProvider {
    script: Mutex<VecDeque<Reply>>,
    repeat: Option<Reply>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            script: Mutex::new(replies.into()),
            repeat: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn texts(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Reply::Text(t.to_string())).collect())
    }

    pub(crate) fn repeating(reply: Reply) -> Self {
        Self {
            repeat: Some(reply),
            ..Self::new(Vec::new())
        }
    }

    pub(crate) fn failing() -> Self {
        Self::repeating(Reply::Fail)
    }

    pub(crate) fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front().or_else(|| self.repeat.clone());

        let message = match next {
            Some(Reply::Text(text)) => Message::assistant(text),
            Some(Reply::ToolCalls(calls)) => Message {
                tool_calls: calls,
                ..Message::assistant("")
            },
            Some(Reply::Fail) => return Err(ProviderError::Network("connection refused".into())),
            None => return Err(ProviderError::InvalidResponse("script exhausted".into())),
        };

        Ok(ProviderResponse {
            message,
            usage: None,
            model: "scripted-model".into(),
        })
    }
}

/// Place search answering from a table keyed by place kind.
#[derive(Default)]
pub(crate) struct StubPlaces {
    table: HashMap<String, Vec<PlaceOfInterest>>,
    failing: HashSet<String>,
    pub(crate) searches: Mutex<Vec<(String, u32, Option<String>)>>,
}

impl StubPlaces {
    pub(crate) fn with(mut self, kind: &str, names: &[&str]) -> Self {
        let places = names
            .iter()
            .map(|n| PlaceOfInterest::new(*n, format!("{n} Road")))
            .collect();
        self.table.insert(kind.to_string(), places);
        self
    }

    pub(crate) fn failing_on(mut self, kind: &str) -> Self {
        self.failing.insert(kind.to_string());
        self
    }

    pub(crate) fn kinds_searched(&self) -> Vec<String> {
        self.searches.lock().unwrap().iter().map(|(k, _, _)| k.clone()).collect()
    }
}

#[async_trait]
impl PlaceSearch for StubPlaces {
    fn name(&self) -> &str {
        "stub_places"
    }

    async fn search(
        &self,
        _center: Coordinate,
        place_kind: &str,
        radius_m: u32,
        keyword: Option<&str>,
    ) -> Result<Vec<PlaceOfInterest>, ProviderError> {
        self.searches
            .lock()
            .unwrap()
            .push((place_kind.to_string(), radius_m, keyword.map(String::from)));
        if self.failing.contains(place_kind) {
            return Err(ProviderError::ApiError {
                status_code: 500,
                message: "backend error".into(),
            });
        }
        Ok(self.table.get(place_kind).cloned().unwrap_or_default())
    }
}

pub(crate) enum EnvReply {
    Data(serde_json::Value),
    Nothing,
    Fail,
}

pub(crate) struct StubEnvironment {
    reply: EnvReply,
    pub(crate) kinds: Mutex<Vec<EnvironmentKind>>,
}

impl StubEnvironment {
    pub(crate) fn new(reply: EnvReply) -> Self {
        Self {
            reply,
            kinds: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl EnvironmentProvider for StubEnvironment {
    fn name(&self) -> &str {
        "stub_environment"
    }

    async fn lookup(
        &self,
        location: Coordinate,
        kind: EnvironmentKind,
    ) -> Result<Option<EnvironmentalData>, ProviderError> {
        self.kinds.lock().unwrap().push(kind);
        match &self.reply {
            EnvReply::Data(air) => Ok(Some(EnvironmentalData {
                location,
                air_quality: Some(air.clone()),
                pollen_forecast: None,
            })),
            EnvReply::Nothing => Ok(None),
            EnvReply::Fail => Err(ProviderError::Timeout("environment".into())),
        }
    }
}
