//! Retell REST client
//!
//! HTTP client for the Retell conversational-voice API. Every operation goes
//! through the same retry loop and the same lenient response normalization.

use crate::client::normalize;
use crate::client::retry::RetryPolicy;
use crate::client::wire_types::{
    CreateAgentBody, CreatePhoneCallBody, CreateWebCallBody, ListCallsBody,
};
use crate::client::VoiceApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::state::models::{
    Agent, Call, CreateAgentRequest, CreatePhoneCallRequest, CreateWebCallRequest, Llm,
    PhoneNumber, Voice, WebCallRegistration,
};
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// Client for the Retell REST API
#[derive(Debug, Clone)]
pub struct RetellClient {
    http: reqwest::Client,
    config: ClientConfig,
    retry: RetryPolicy,
}

impl RetellClient {
    /// Create a client from a configuration
    ///
    /// # Errors
    /// * Returns `ApiError::Client` if the configuration is invalid or the
    ///   underlying HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        config.validate().map_err(ApiError::Client)?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ApiError::Client(e.to_string()))?;
        let retry = RetryPolicy::from(&config);
        Ok(Self {
            http,
            config,
            retry,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send a request with retries and return the parsed JSON body
    async fn request(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.config.url_for(path);
        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "retell_request",
            request_id = %request_id,
            operation = operation,
            method = %method,
            path = path,
        );

        self.retry
            .run(operation, |attempt| {
                self.attempt(&method, &url, body.as_ref(), attempt)
            })
            .instrument(span)
            .await
    }

    /// A single HTTP round trip
    async fn attempt(
        &self,
        method: &Method,
        url: &str,
        body: Option<&Value>,
        attempt: u32,
    ) -> Result<Value, ApiError> {
        tracing::debug!(url = %url, attempt = attempt, "Calling Retell API");

        let mut request = self
            .http
            .request(method.clone(), url)
            .bearer_auth(&self.config.api_key);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::debug!(
                status_code = status.as_u16(),
                error_body = %text,
                "Retell API returned error status"
            );
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("{} - Response body: {}", e, text))
        })
    }

    async fn get(&self, operation: &str, path: &str) -> Result<Value, ApiError> {
        self.request(operation, Method::GET, path, None).await
    }

    async fn post<B: Serialize>(
        &self,
        operation: &str,
        path: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| ApiError::Client(format!("Failed to serialize request: {}", e)))?;
        self.request(operation, Method::POST, path, Some(body)).await
    }
}

fn id_path(prefix: &str, id: &str) -> String {
    format!("{}/{}", prefix, urlencoding::encode(id))
}

fn list_of<T>(body: &Value, wrappers: &[&str], build: fn(&Value) -> T) -> Vec<T> {
    normalize::collection(body, wrappers)
        .into_iter()
        .map(build)
        .collect()
}

#[async_trait]
impl VoiceApi for RetellClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, ApiError> {
        let body = self.get("list_agents", "/list-agents").await?;
        Ok(list_of(&body, &["agents"], Agent::from_value))
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, ApiError> {
        let body = self
            .get("get_agent", &id_path("/get-agent", agent_id))
            .await?;
        Ok(Agent::from_value(normalize::record(&body)))
    }

    async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent, ApiError> {
        let body = self
            .post("create_agent", "/create-agent", &CreateAgentBody::from(request))
            .await?;
        Ok(Agent::from_value(normalize::record(&body)))
    }

    async fn list_voices(&self) -> Result<Vec<Voice>, ApiError> {
        let body = self.get("list_voices", "/list-voices").await?;
        Ok(list_of(&body, &["voices"], Voice::from_value))
    }

    async fn get_voice(&self, voice_id: &str) -> Result<Voice, ApiError> {
        let body = self
            .get("get_voice", &id_path("/get-voice", voice_id))
            .await?;
        Ok(Voice::from_value(normalize::record(&body)))
    }

    async fn list_llms(&self) -> Result<Vec<Llm>, ApiError> {
        let body = self.get("list_llms", "/list-retell-llms").await?;
        Ok(list_of(&body, &["llms", "retell_llms"], Llm::from_value))
    }

    async fn get_llm(&self, llm_id: &str) -> Result<Llm, ApiError> {
        let body = self
            .get("get_llm", &id_path("/get-retell-llm", llm_id))
            .await?;
        Ok(Llm::from_value(normalize::record(&body)))
    }

    async fn list_calls(&self) -> Result<Vec<Call>, ApiError> {
        let body = self
            .post("list_calls", "/v2/list-calls", &ListCallsBody::default())
            .await?;
        Ok(list_of(&body, &["calls"], Call::from_value))
    }

    async fn get_call(&self, call_id: &str) -> Result<Call, ApiError> {
        let body = self
            .get("get_call", &id_path("/v2/get-call", call_id))
            .await?;
        Ok(Call::from_value(normalize::record(&body)))
    }

    async fn create_web_call(
        &self,
        request: &CreateWebCallRequest,
    ) -> Result<WebCallRegistration, ApiError> {
        let body = self
            .post(
                "create_web_call",
                "/v2/create-web-call",
                &CreateWebCallBody::from(request),
            )
            .await?;
        Ok(WebCallRegistration::from_value(normalize::record(&body)))
    }

    async fn create_phone_call(&self, request: &CreatePhoneCallRequest) -> Result<Call, ApiError> {
        let body = self
            .post(
                "create_phone_call",
                "/v2/create-phone-call",
                &CreatePhoneCallBody::from(request),
            )
            .await?;
        Ok(Call::from_value(normalize::record(&body)))
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>, ApiError> {
        let body = self.get("list_phone_numbers", "/list-phone-numbers").await?;
        Ok(list_of(
            &body,
            &["phone_numbers", "phoneNumbers"],
            PhoneNumber::from_value,
        ))
    }

    async fn get_phone_number(&self, phone_number_id: &str) -> Result<PhoneNumber, ApiError> {
        let body = self
            .get(
                "get_phone_number",
                &id_path("/get-phone-number", phone_number_id),
            )
            .await?;
        Ok(PhoneNumber::from_value(normalize::record(&body)))
    }
}
