//! Retell API client
//!
//! Wraps every remote call with a uniform retry policy and uniform error
//! normalization. `VoiceApi` is the seam the state store depends on.

pub mod api_client;
pub mod normalize;
pub mod retry;
pub mod wire_types;

pub use api_client::RetellClient;
pub use retry::RetryPolicy;

use crate::error::ApiError;
use crate::state::models::{
    Agent, Call, CreateAgentRequest, CreatePhoneCallRequest, CreateWebCallRequest, Llm,
    PhoneNumber, Voice, WebCallRegistration,
};
use async_trait::async_trait;

/// Operations offered by the conversational-voice service
#[async_trait]
pub trait VoiceApi: Send + Sync {
    /// List every agent
    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError>;
    /// Fetch one agent
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError>;
    /// Create an agent
    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, ApiError>;

    /// List every voice
    async fn list_voices(&self) -> Result<Vec<Voice>, ApiError>;
    /// Fetch one voice
    async fn get_voice(&self, voice_id: &str) -> Result<Voice, ApiError>;

    /// List every language model
    async fn list_llms(&self) -> Result<Vec<Llm>, ApiError>;
    /// Fetch one language model
    async fn get_llm(&self, llm_id: &str) -> Result<Llm, ApiError>;

    /// List every call
    async fn list_calls(&self) -> Result<Vec<Call>, ApiError>;
    /// Fetch one call
    async fn get_call(&self, call_id: &str) -> Result<Call, ApiError>;
    /// Register a browser call
    async fn create_web_call(
        &self,
        request: &CreateWebCallRequest,
    ) -> Result<WebCallRegistration, ApiError>;
    /// Place an outbound phone call
    async fn create_phone_call(&self, request: &CreatePhoneCallRequest) -> Result<Call, ApiError>;

    /// List every phone number
    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>, ApiError>;
    /// Fetch one phone number
    async fn get_phone_number(&self, phone_number_id: &str) -> Result<PhoneNumber, ApiError>;
}
