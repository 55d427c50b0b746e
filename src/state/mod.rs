// State management module
// Handles the dashboard's entities and the application state store

pub mod app_state;
pub mod models;

pub use app_state::{AppState, InitialLoadReport, Operation, Snapshot};
pub use models::{
    Agent, AgentId, Call, CreateAgentRequest, CreatePhoneCallRequest, CreateWebCallRequest, Llm,
    PhoneNumber, ResponseEngine, Voice, WebCallRegistration,
};
