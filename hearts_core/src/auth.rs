//! Bearer credential dependency.
//!
//! The hearts client does not own authentication; it only needs to know
//! the current bearer token, or that there is none. Whatever owns the
//! session implements [`TokenProvider`] and injects it at construction.

/// Supplies the current bearer credential, or indicates its absence
pub trait TokenProvider: Send + Sync {
    /// Current bearer token, `None` for an unauthenticated session
    fn bearer_token(&self) -> Option<String>;
}

/// Token fixed at construction time (CLI invocations, tests)
#[derive(Clone, Debug, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// A provider for a session with no credential
    pub fn unauthenticated() -> Self {
        Self { token: None }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn bearer_token(&self) -> Option<String> {
        self.token.clone()
    }
}
