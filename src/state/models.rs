//! Dashboard entities
//!
//! Plain records mirroring the remote service's resources. All
//! relationships are by identifier string; nothing here enforces that a
//! referenced voice or language model exists.

use crate::client::normalize as n;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Unique identifier for an agent
pub type AgentId = String;

/// Voice agent: a voice paired with a language model
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Agent {
    /// Unique identifier for the agent
    pub id: AgentId,
    /// Display name of the agent
    pub name: String,
    /// Voice used by the agent
    pub voice_id: String,
    /// Language model driving the agent
    pub llm_id: String,
    /// Creation (or last modification) time, RFC 3339
    pub created_at: String,
}

impl Agent {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        let llm_id = n::opt_string(value, &["llm_id"])
            .or_else(|| {
                value
                    .get("response_engine")
                    .and_then(|engine| n::opt_string(engine, &["llm_id"]))
            })
            .unwrap_or_default();
        Self {
            id: n::string(value, &["agent_id", "id"]),
            name: n::string(value, &["agent_name", "name"]),
            voice_id: n::string(value, &["voice_id"]),
            llm_id,
            created_at: n::timestamp(
                value,
                &["created_at", "created_timestamp", "last_modification_timestamp"],
            ),
        }
    }
}

/// A synthesized voice offered by the provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Voice {
    /// Provider-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Creation time, RFC 3339
    pub created_at: String,
}

impl Voice {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: n::string(value, &["voice_id", "id"]),
            name: n::string(value, &["voice_name", "name"]),
            created_at: n::timestamp(value, &["created_at", "created_timestamp"]),
        }
    }
}

/// A language-model response engine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Llm {
    /// Provider-assigned identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Provider-defined type tag
    #[serde(rename = "type")]
    pub kind: String,
    /// Creation time, RFC 3339
    pub created_at: String,
}

impl Llm {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: n::string(value, &["llm_id", "id"]),
            name: n::string(value, &["llm_name", "name", "model"]),
            kind: n::string(value, &["type", "llm_type", "model"]),
            created_at: n::timestamp(
                value,
                &["created_at", "created_timestamp", "last_modification_timestamp"],
            ),
        }
    }
}

/// A voice call, web or phone
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Call {
    /// Unique identifier for the call
    pub id: String,
    /// Agent handling the call
    pub agent_id: AgentId,
    /// Provider status string (open-ended: registered, ongoing, ended, error, ...)
    pub status: String,
    /// Start (or registration) time, RFC 3339
    pub created_at: String,
    /// End time, if the call has ended
    pub ended_at: Option<String>,
    /// Duration in seconds, if known
    pub duration: Option<u64>,
}

impl Call {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: n::string(value, &["call_id", "id"]),
            agent_id: n::string(value, &["agent_id"]),
            status: n::string(value, &["call_status", "status"]),
            created_at: n::timestamp(value, &["created_at", "start_timestamp"]),
            ended_at: n::opt_timestamp(value, &["ended_at", "end_timestamp"]),
            duration: call_duration(value),
        }
    }
}

fn call_duration(value: &Value) -> Option<u64> {
    if let Some(secs) = n::opt_number(value, &["duration"]) {
        return Some(secs.max(0.0) as u64);
    }
    if let Some(ms) = n::opt_number(value, &["duration_ms"]) {
        return Some((ms.max(0.0) / 1000.0) as u64);
    }
    let start = n::opt_number(value, &["start_timestamp"])?;
    let end = n::opt_number(value, &["end_timestamp"])?;
    (end >= start).then(|| ((end - start) / 1000.0) as u64)
}

/// A phone number bound to the account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PhoneNumber {
    /// Identifier (the provider keys numbers by the E.164 number itself)
    pub id: String,
    /// E.164 phone number
    pub phone_number: String,
    /// Creation time, RFC 3339
    pub created_at: String,
}

impl PhoneNumber {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        Self {
            id: n::string(value, &["id", "phone_number_id", "phone_number"]),
            phone_number: n::string(value, &["phone_number", "number"]),
            created_at: n::timestamp(
                value,
                &["created_at", "created_timestamp", "last_modification_timestamp"],
            ),
        }
    }
}

/// Result of registering a web call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct WebCallRegistration {
    /// Identifier of the new call
    pub call_id: String,
    /// Agent the call was created for
    pub agent_id: AgentId,
    /// URL the browser client joins through
    pub register_url: String,
    /// Join credential issued by newer API revisions
    pub access_token: Option<String>,
}

impl WebCallRegistration {
    /// Build from a raw API record
    pub fn from_value(value: &Value) -> Self {
        Self {
            call_id: n::string(value, &["call_id", "id"]),
            agent_id: n::string(value, &["agent_id"]),
            register_url: n::string(value, &["register_url", "url"]),
            access_token: n::opt_string(value, &["access_token"]),
        }
    }
}

/// Response engine attached to an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResponseEngine {
    /// Engine kind, e.g. `retell-llm`
    #[serde(rename = "type")]
    pub kind: String,
    /// Language model backing the engine
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_id: Option<String>,
}

impl ResponseEngine {
    /// Engine kind for provider-hosted language models
    pub const RETELL_LLM: &'static str = "retell-llm";

    /// Provider-hosted language model engine
    pub fn retell_llm(llm_id: impl Into<String>) -> Self {
        Self {
            kind: Self::RETELL_LLM.to_string(),
            llm_id: Some(llm_id.into()),
        }
    }
}

/// Request to create an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreateAgentRequest {
    /// Display name
    pub name: String,
    /// Voice to use
    pub voice_id: String,
    /// Language model to use
    pub llm_id: String,
    /// First utterance of the agent
    pub initial_message: Option<String>,
    /// Custom LLM webhook
    pub llm_webhook_url: Option<String>,
    /// Free-form metadata
    pub metadata: Option<HashMap<String, String>>,
    /// Arbitrary JSON attached to the agent, passed through untouched
    pub custom_data: Option<serde_json::Map<String, Value>>,
    /// Response engine; filled in by the store when absent
    pub response_engine: Option<ResponseEngine>,
}

impl CreateAgentRequest {
    /// Create a request with the required fields
    pub fn new(
        name: impl Into<String>,
        voice_id: impl Into<String>,
        llm_id: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            voice_id: voice_id.into(),
            llm_id: llm_id.into(),
            ..Self::default()
        }
    }

    /// Set the opening message
    pub fn with_initial_message(mut self, message: impl Into<String>) -> Self {
        self.initial_message = Some(message.into());
        self
    }

    /// Validate the request
    /// Returns Ok(()) if valid, Err with message if invalid
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Agent name cannot be empty".to_string());
        }
        if self.voice_id.trim().is_empty() {
            return Err("A voice must be selected".to_string());
        }
        if self.llm_id.trim().is_empty() {
            return Err("A language model must be selected".to_string());
        }
        Ok(())
    }
}

/// Request to register a browser (web) call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreateWebCallRequest {
    /// Agent handling the call
    pub agent_id: AgentId,
    /// Free-form metadata
    pub metadata: Option<HashMap<String, String>>,
}

impl CreateWebCallRequest {
    /// Web call for the given agent, no metadata
    pub fn new(agent_id: impl Into<AgentId>) -> Self {
        Self {
            agent_id: agent_id.into(),
            metadata: None,
        }
    }
}

/// Request to place an outbound phone call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CreatePhoneCallRequest {
    /// Agent handling the call
    pub agent_id: AgentId,
    /// Number to dial
    pub to_number: String,
    /// Caller number; the provider picks one when absent
    pub from_number: Option<String>,
    /// Free-form metadata
    pub metadata: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agent_current_shape() {
        let agent = Agent::from_value(&json!({
            "agent_id": "ag_1",
            "agent_name": "Receptionist",
            "voice_id": "11labs-Adrian",
            "response_engine": {"type": "retell-llm", "llm_id": "llm_9"},
            "last_modification_timestamp": 1_700_000_000_000i64
        }));
        assert_eq!(agent.id, "ag_1");
        assert_eq!(agent.name, "Receptionist");
        assert_eq!(agent.voice_id, "11labs-Adrian");
        assert_eq!(agent.llm_id, "llm_9");
        assert_eq!(agent.created_at, "2023-11-14T22:13:20.000Z");
    }

    #[test]
    fn test_agent_legacy_shape() {
        let agent = Agent::from_value(&json!({
            "id": "ag_2",
            "name": "Legacy",
            "voice_id": "v",
            "llm_id": "l",
            "created_at": "2024-02-01T10:00:00Z"
        }));
        assert_eq!(agent.id, "ag_2");
        assert_eq!(agent.name, "Legacy");
        assert_eq!(agent.llm_id, "l");
        assert_eq!(agent.created_at, "2024-02-01T10:00:00Z");
    }

    #[test]
    fn test_missing_fields_default() {
        let agent = Agent::from_value(&json!({}));
        assert_eq!(agent, Agent::default());

        let call = Call::from_value(&json!({"call_status": "ongoing"}));
        assert_eq!(call.id, "");
        assert_eq!(call.status, "ongoing");
        assert_eq!(call.ended_at, None);
        assert_eq!(call.duration, None);
    }

    #[test]
    fn test_call_duration_sources() {
        let explicit = Call::from_value(&json!({"duration": 95}));
        assert_eq!(explicit.duration, Some(95));

        let millis = Call::from_value(&json!({"duration_ms": 61_500}));
        assert_eq!(millis.duration, Some(61));

        let derived = Call::from_value(&json!({
            "call_id": "c1",
            "start_timestamp": 1_700_000_000_000i64,
            "end_timestamp": 1_700_000_042_000i64
        }));
        assert_eq!(derived.duration, Some(42));
        assert!(derived.ended_at.is_some());
    }

    #[test]
    fn test_llm_type_serializes_as_type() {
        let llm = Llm::from_value(&json!({"llm_id": "llm_1", "model": "gpt-4o"}));
        assert_eq!(llm.id, "llm_1");
        assert_eq!(llm.kind, "gpt-4o");
        let json = serde_json::to_value(&llm).unwrap();
        assert_eq!(json["type"], "gpt-4o");
    }

    #[test]
    fn test_phone_number_keyed_by_number() {
        let number = PhoneNumber::from_value(&json!({"phone_number": "+14155550100"}));
        assert_eq!(number.id, "+14155550100");
        assert_eq!(number.phone_number, "+14155550100");
    }

    #[test]
    fn test_create_agent_request_validate() {
        let request = CreateAgentRequest::new("Support", "voice_1", "llm_1");
        assert!(request.validate().is_ok());

        let mut missing_voice = request.clone();
        missing_voice.voice_id = " ".to_string();
        assert!(missing_voice.validate().is_err());

        let mut missing_llm = request.clone();
        missing_llm.llm_id = String::new();
        assert!(missing_llm.validate().is_err());

        let mut missing_name = request;
        missing_name.name = String::new();
        assert!(missing_name.validate().is_err());
    }
}
