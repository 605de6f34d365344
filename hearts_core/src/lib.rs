#![forbid(unsafe_code)]

//! Client-side hearts (lives) cache for a gamified learning backend.
//!
//! This crate provides:
//! - The mirrored hearts state with its time-based cache guard
//! - Authenticated mutators (fetch, lose, reward, consecutive-correct)
//! - Error classification and a shared error display sink
//! - Config (backend environment, stored token) and logging setup
//!
//! The server owns all hearts accounting (decay, recovery scheduling,
//! newbie protection); this client only mirrors what the server returns.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod state;
pub mod types;

// Re-export commonly used types
pub use auth::{StaticTokenProvider, TokenProvider};
pub use client::HeartsClient;
pub use config::{Config, Environment};
pub use error::{classify_hearts_error, Error, ErrorSink, Result};
pub use state::{HeartsState, CACHE_TIMEOUT_MS};
pub use types::*;
