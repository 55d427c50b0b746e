//! Voice Agent Manager
//!
//! Client and in-memory state store for a dashboard that manages
//! conversational-voice agents through the Retell REST API.
//! The headless binary is in `src/main.rs`.

pub mod client;
pub mod config;
pub mod error;
/// Application state management
///
/// Holds the fetched collections and mediates every read and write
/// through the API client.
pub mod state;

pub use client::{RetellClient, RetryPolicy, VoiceApi};
pub use config::ClientConfig;
pub use error::{ApiError, AppError};
pub use state::AppState;
