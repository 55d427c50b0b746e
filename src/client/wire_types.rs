//! Retell API request bodies
//!
//! Structs that mirror the JSON the remote service expects.

use crate::state::models::{
    CreateAgentRequest, CreatePhoneCallRequest, CreateWebCallRequest, ResponseEngine,
};
use serde::Serialize;
use std::collections::HashMap;

/// Body of `POST /create-agent`
#[derive(Serialize, Debug)]
pub struct CreateAgentBody<'a> {
    /// Display name
    pub agent_name: &'a str,
    /// Voice to use
    pub voice_id: &'a str,
    /// Response engine bound to the agent
    pub response_engine: ResponseEngine,
    /// Opening message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub begin_message: Option<&'a str>,
    /// Custom LLM webhook
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_webhook_url: Option<&'a str>,
    /// Free-form metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a HashMap<String, String>>,
    /// Arbitrary JSON attached to the agent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<&'a serde_json::Map<String, serde_json::Value>>,
}

impl<'a> From<&'a CreateAgentRequest> for CreateAgentBody<'a> {
    fn from(request: &'a CreateAgentRequest) -> Self {
        let response_engine = request
            .response_engine
            .clone()
            .unwrap_or_else(|| ResponseEngine::retell_llm(request.llm_id.clone()));
        Self {
            agent_name: &request.name,
            voice_id: &request.voice_id,
            response_engine,
            begin_message: request.initial_message.as_deref(),
            llm_webhook_url: request.llm_webhook_url.as_deref(),
            metadata: request.metadata.as_ref(),
            custom_data: request.custom_data.as_ref(),
        }
    }
}

/// Body of `POST /v2/create-web-call`
#[derive(Serialize, Debug)]
pub struct CreateWebCallBody<'a> {
    /// Agent handling the call
    pub agent_id: &'a str,
    /// Free-form metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a HashMap<String, String>>,
}

impl<'a> From<&'a CreateWebCallRequest> for CreateWebCallBody<'a> {
    fn from(request: &'a CreateWebCallRequest) -> Self {
        Self {
            agent_id: &request.agent_id,
            metadata: request.metadata.as_ref(),
        }
    }
}

/// Body of `POST /v2/create-phone-call`
#[derive(Serialize, Debug)]
pub struct CreatePhoneCallBody<'a> {
    /// Agent handling the call
    pub override_agent_id: &'a str,
    /// Number to dial
    pub to_number: &'a str,
    /// Caller number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_number: Option<&'a str>,
    /// Free-form metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<&'a HashMap<String, String>>,
}

impl<'a> From<&'a CreatePhoneCallRequest> for CreatePhoneCallBody<'a> {
    fn from(request: &'a CreatePhoneCallRequest) -> Self {
        Self {
            override_agent_id: &request.agent_id,
            to_number: &request.to_number,
            from_number: request.from_number.as_deref(),
            metadata: request.metadata.as_ref(),
        }
    }
}

/// Body of `POST /v2/list-calls`; an empty filter lists everything
#[derive(Serialize, Debug, Default)]
pub struct ListCallsBody {
    /// Maximum number of calls returned
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}
