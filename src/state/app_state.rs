// Application state management
// Owns the last-fetched agents, voices, language models and calls

use crate::client::VoiceApi;
use crate::error::{ApiError, AppError};
use crate::state::models::{
    Agent, Call, CreateAgentRequest, CreateWebCallRequest, Llm, ResponseEngine, Voice,
    WebCallRegistration,
};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Store operations, used to attribute the current error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Full refresh of the agent collection
    RefreshAgents,
    /// Full refresh of the voice collection
    RefreshVoices,
    /// Full refresh of the language model collection
    RefreshLlms,
    /// Full refresh of the call collection
    RefreshCalls,
    /// Agent creation
    CreateAgent,
    /// Web call registration
    CreateWebCall,
    /// Single call lookup
    GetCall,
}

impl Operation {
    /// Human-readable description used in error messages
    pub fn describe(&self) -> &'static str {
        match self {
            Operation::RefreshAgents => "fetch agents",
            Operation::RefreshVoices => "fetch voices",
            Operation::RefreshLlms => "fetch LLMs",
            Operation::RefreshCalls => "fetch calls",
            Operation::CreateAgent => "create agent",
            Operation::CreateWebCall => "create web call",
            Operation::GetCall => "get call",
        }
    }

    /// Whether the operation replaces a whole collection
    pub fn is_refresh(&self) -> bool {
        matches!(
            self,
            Operation::RefreshAgents
                | Operation::RefreshVoices
                | Operation::RefreshLlms
                | Operation::RefreshCalls
        )
    }
}

/// Point-in-time copy of everything the store exposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Agents from the last refresh
    pub agents: Vec<Agent>,
    /// Voices from the last refresh
    pub voices: Vec<Voice>,
    /// Language models from the last refresh
    pub llms: Vec<Llm>,
    /// Calls from the last refresh
    pub calls: Vec<Call>,
    /// Whether any operation is outstanding
    pub is_loading: bool,
    /// Last recorded error message
    pub error: Option<String>,
}

/// Outcome of each refresh issued by the initial load
#[derive(Debug)]
pub struct InitialLoadReport {
    /// Result of refreshing agents
    pub agents: Result<(), AppError>,
    /// Result of refreshing voices
    pub voices: Result<(), AppError>,
    /// Result of refreshing language models
    pub llms: Result<(), AppError>,
    /// Result of refreshing calls
    pub calls: Result<(), AppError>,
}

impl InitialLoadReport {
    /// True when every collection loaded
    pub fn is_complete(&self) -> bool {
        self.failures().is_empty()
    }

    /// Collections that failed to load, with their errors
    pub fn failures(&self) -> Vec<(&'static str, &AppError)> {
        [
            ("agents", &self.agents),
            ("voices", &self.voices),
            ("llms", &self.llms),
            ("calls", &self.calls),
        ]
        .into_iter()
        .filter_map(|(name, result)| result.as_ref().err().map(|e| (name, e)))
        .collect()
    }
}

#[derive(Debug, Default)]
struct Collections {
    agents: Vec<Agent>,
    voices: Vec<Voice>,
    llms: Vec<Llm>,
    calls: Vec<Call>,
    error: Option<RecordedError>,
    /// Ticket of the newest listing stored per refresh operation
    applied: HashMap<Operation, u64>,
}

#[derive(Debug, Clone)]
struct RecordedError {
    operation: Operation,
    message: String,
}

impl Collections {
    fn record_error(&mut self, operation: Operation, err: &AppError) {
        self.error = Some(RecordedError {
            operation,
            message: format!("Failed to {}: {}", operation.describe(), err),
        });
    }

    /// A success only clears an error the same operation recorded
    fn clear_error_from(&mut self, operation: Operation) {
        if self
            .error
            .as_ref()
            .is_some_and(|recorded| recorded.operation == operation)
        {
            self.error = None;
        }
    }

    /// Clear after a successful refresh
    ///
    /// Errors from create/get operations and from this same refresh go;
    /// a failed refresh of another collection stays visible.
    fn clear_error_after_refresh(&mut self, operation: Operation) {
        if self.error.as_ref().is_some_and(|recorded| {
            recorded.operation == operation || !recorded.operation.is_refresh()
        }) {
            self.error = None;
        }
    }

    /// Accept a result for `operation` unless a newer one is already stored
    fn claim(&mut self, operation: Operation, ticket: u64) -> bool {
        let last = self.applied.entry(operation).or_insert(0);
        if ticket < *last {
            return false;
        }
        *last = ticket;
        true
    }
}

/// Decrements the in-flight counter when dropped
struct LoadingGuard<'a>(&'a AtomicUsize);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Main application state
///
/// Holds the authoritative in-memory snapshot of the dashboard's
/// collections. Every mutation goes through the operations below; each
/// refresh replaces its collection wholesale, and a listing that finishes
/// after a newer refresh of the same collection is dropped. Share it as
/// `Arc<AppState<_>>`.
pub struct AppState<A: VoiceApi> {
    api: A,
    collections: RwLock<Collections>,
    in_flight: AtomicUsize,
    tickets: AtomicU64,
}

impl<A: VoiceApi> AppState<A> {
    /// Create an empty store without fetching anything
    pub fn new(api: A) -> Self {
        Self {
            api,
            collections: RwLock::new(Collections::default()),
            in_flight: AtomicUsize::new(0),
            tickets: AtomicU64::new(0),
        }
    }

    /// Create a store and run the initial load
    ///
    /// Failures are recorded in the store and logged; they never prevent
    /// the store from being returned.
    pub async fn connect(api: A) -> Self {
        let state = Self::new(api);
        let report = state.initial_load().await;
        for (collection, err) in report.failures() {
            warn!(collection = collection, error = %err, "Initial load incomplete");
        }
        state
    }

    /// Client the store talks through
    pub fn api(&self) -> &A {
        &self.api
    }

    fn begin(&self) -> LoadingGuard<'_> {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(&self.in_flight)
    }

    /// Refresh all four collections concurrently
    ///
    /// Each refresh succeeds or fails on its own; one failure neither
    /// cancels nor delays the others.
    pub async fn initial_load(&self) -> InitialLoadReport {
        let _loading = self.begin();
        let (agents, voices, llms, calls) = tokio::join!(
            self.refresh_agents(),
            self.refresh_voices(),
            self.refresh_llms(),
            self.refresh_calls(),
        );
        let report = InitialLoadReport {
            agents,
            voices,
            llms,
            calls,
        };
        info!(
            complete = report.is_complete(),
            failed = report.failures().len(),
            "Initial load finished"
        );
        report
    }

    async fn refresh<T, F, S>(
        &self,
        operation: Operation,
        fetch: F,
        store: S,
    ) -> Result<(), AppError>
    where
        F: Future<Output = Result<Vec<T>, ApiError>>,
        S: FnOnce(&mut Collections, Vec<T>),
    {
        let _loading = self.begin();
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        let result = fetch.await;

        let mut collections = self.collections.write().await;
        if !collections.claim(operation, ticket) {
            debug!(operation = ?operation, ticket = ticket, "Discarding stale listing");
            return result.map(|_| ()).map_err(AppError::from);
        }
        match result {
            Ok(items) => {
                let count = items.len();
                store(&mut *collections, items);
                collections.clear_error_after_refresh(operation);
                info!(operation = ?operation, count = count, "Collection refreshed");
                Ok(())
            }
            Err(err) => {
                let err = AppError::from(err);
                store(&mut *collections, Vec::new());
                collections.record_error(operation, &err);
                warn!(operation = ?operation, error = %err, "Refresh failed, collection cleared");
                Err(err)
            }
        }
    }

    /// Replace the agent collection with a fresh listing
    pub async fn refresh_agents(&self) -> Result<(), AppError> {
        self.refresh(Operation::RefreshAgents, self.api.list_agents(), |c, items| {
            c.agents = items
        })
        .await
    }

    /// Replace the voice collection with a fresh listing
    pub async fn refresh_voices(&self) -> Result<(), AppError> {
        self.refresh(Operation::RefreshVoices, self.api.list_voices(), |c, items| {
            c.voices = items
        })
        .await
    }

    /// Replace the language model collection with a fresh listing
    pub async fn refresh_llms(&self) -> Result<(), AppError> {
        self.refresh(Operation::RefreshLlms, self.api.list_llms(), |c, items| {
            c.llms = items
        })
        .await
    }

    /// Replace the call collection with a fresh listing
    pub async fn refresh_calls(&self) -> Result<(), AppError> {
        self.refresh(Operation::RefreshCalls, self.api.list_calls(), |c, items| {
            c.calls = items
        })
        .await
    }

    async fn fail(&self, operation: Operation, err: AppError) -> AppError {
        self.collections.write().await.record_error(operation, &err);
        warn!(operation = ?operation, error = %err, "Operation failed");
        err
    }

    /// Create an agent, then re-list agents from the service
    ///
    /// The request is validated first and gets the provider-hosted LLM
    /// response engine when it carries none. The new agent only shows up in
    /// `agents()` through the follow-up refresh; a failed refresh is
    /// recorded but does not fail the creation.
    pub async fn create_agent(&self, mut request: CreateAgentRequest) -> Result<Agent, AppError> {
        let _loading = self.begin();
        if let Err(msg) = request.validate() {
            return Err(self
                .fail(Operation::CreateAgent, AppError::InvalidRequest(msg))
                .await);
        }
        if request.response_engine.is_none() {
            request.response_engine = Some(ResponseEngine::retell_llm(request.llm_id.clone()));
        }

        let agent = match self.api.create_agent(&request).await {
            Ok(agent) => agent,
            Err(err) => return Err(self.fail(Operation::CreateAgent, err.into()).await),
        };
        info!(agent_id = %agent.id, name = %agent.name, "Agent created");
        self.collections
            .write()
            .await
            .clear_error_from(Operation::CreateAgent);

        if let Err(err) = self.refresh_agents().await {
            warn!(error = %err, "Agent created but refresh failed");
        }
        Ok(agent)
    }

    /// Register a web call for an agent, then re-list calls
    pub async fn create_web_call(&self, agent_id: &str) -> Result<WebCallRegistration, AppError> {
        let _loading = self.begin();
        let request = CreateWebCallRequest::new(agent_id);
        let registration = match self.api.create_web_call(&request).await {
            Ok(registration) => registration,
            Err(err) => return Err(self.fail(Operation::CreateWebCall, err.into()).await),
        };
        info!(call_id = %registration.call_id, agent_id = %agent_id, "Web call created");
        self.collections
            .write()
            .await
            .clear_error_from(Operation::CreateWebCall);

        if let Err(err) = self.refresh_calls().await {
            warn!(error = %err, "Web call created but refresh failed");
        }
        Ok(registration)
    }

    /// Fetch a single call; the stored collection is left untouched
    pub async fn get_call(&self, call_id: &str) -> Result<Call, AppError> {
        let _loading = self.begin();
        match self.api.get_call(call_id).await {
            Ok(call) => {
                self.collections
                    .write()
                    .await
                    .clear_error_from(Operation::GetCall);
                Ok(call)
            }
            Err(err) => Err(self.fail(Operation::GetCall, err.into()).await),
        }
    }

    /// Agents from the last refresh
    pub async fn agents(&self) -> Vec<Agent> {
        self.collections.read().await.agents.clone()
    }

    /// Voices from the last refresh
    pub async fn voices(&self) -> Vec<Voice> {
        self.collections.read().await.voices.clone()
    }

    /// Language models from the last refresh
    pub async fn llms(&self) -> Vec<Llm> {
        self.collections.read().await.llms.clone()
    }

    /// Calls from the last refresh
    pub async fn calls(&self) -> Vec<Call> {
        self.collections.read().await.calls.clone()
    }

    /// Whether any operation is outstanding
    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Last recorded error message
    pub async fn error(&self) -> Option<String> {
        self.collections
            .read()
            .await
            .error
            .as_ref()
            .map(|e| e.message.clone())
    }

    /// Operation that recorded the current error
    pub async fn error_source(&self) -> Option<Operation> {
        self.collections
            .read()
            .await
            .error
            .as_ref()
            .map(|e| e.operation)
    }

    /// Dismiss the current error
    pub async fn clear_error(&self) {
        self.collections.write().await.error = None;
    }

    /// Copy of every collection plus loading and error state
    pub async fn snapshot(&self) -> Snapshot {
        let collections = self.collections.read().await;
        Snapshot {
            agents: collections.agents.clone(),
            voices: collections.voices.clone(),
            llms: collections.llms.clone(),
            calls: collections.calls.clone(),
            is_loading: self.is_loading(),
            error: collections.error.as_ref().map(|e| e.message.clone()),
        }
    }
}
