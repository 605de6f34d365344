//! The hearts client: cached reads and server-authoritative mutations.
//!
//! Every operation is an ordinary asynchronous request/response call. Reads
//! go through the cache guard; writes always hit the network. On success
//! the server's values overwrite local state (never locally computed
//! guesses). On transport/HTTP failure the error is classified, reported to
//! the shared sink, and re-signaled to the caller. A `success: false` body
//! is a domain rejection: it is returned to the caller untouched and local
//! state stays as it was.
//!
//! Operations are not cancellable or retried once issued, and concurrent
//! mutations are not coordinated; the server is the source of truth and a
//! forced fetch reconciles state.

use crate::{
    ConsecutiveOutcome, ConsecutiveRequest, Error, ErrorSink, HeartsSnapshot, HeartsState,
    LoseAction, LoseOutcome, Result, RewardOutcome, RewardRequest, RewardType, TokenProvider,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Client-side cache and mutation protocol for the hearts resource.
///
/// Owns the session's [`HeartsState`] and [`ErrorSink`]; construction and
/// teardown are tied to login/logout by whoever owns the session.
pub struct HeartsClient<P: TokenProvider> {
    http: reqwest::Client,
    base_url: String,
    tokens: P,
    state: HeartsState,
    errors: ErrorSink,
}

/// Best-effort shape of a failed response body
#[derive(Deserialize)]
struct FailureBody {
    #[serde(default)]
    message: Option<String>,
}

impl<P: TokenProvider> HeartsClient<P> {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>, tokens: P) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            tokens,
            state: HeartsState::default(),
            errors: ErrorSink::new(),
        }
    }

    /// Current mirrored hearts state
    pub fn state(&self) -> &HeartsState {
        &self.state
    }

    /// Shared error display state
    pub fn errors(&self) -> &ErrorSink {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorSink {
        &mut self.errors
    }

    /// Drop all mirrored state back to defaults (logout/session end)
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Refresh the hearts state from the server.
    ///
    /// Returns `Ok(None)` without touching the network when there is no
    /// bearer token, or when the cache is still fresh and `force_refresh`
    /// is not set.
    pub async fn fetch_hearts(&mut self, force_refresh: bool) -> Result<Option<HeartsSnapshot>> {
        let token = match self.tokens.bearer_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        if !self.state.should_fetch(force_refresh, Utc::now()) {
            tracing::debug!("hearts cache still fresh, skipping fetch");
            return Ok(None);
        }

        match self.request_snapshot(&token).await {
            Ok(snapshot) => {
                self.state.apply_snapshot(&snapshot, Utc::now());
                tracing::debug!(
                    current_hearts = snapshot.current_hearts,
                    bonus_hearts = snapshot.bonus_hearts,
                    "refreshed hearts from server"
                );
                Ok(Some(snapshot))
            }
            Err(error) => {
                self.errors.handle_hearts(&error);
                Err(error)
            }
        }
    }

    /// Record a heart loss.
    ///
    /// Returns `Ok(None)` for an unauthenticated session. On success the
    /// returned fields are merged into state; inspect the outcome for
    /// domain-level rejections such as "No hearts left".
    pub async fn lose_heart(&mut self, action: LoseAction) -> Result<Option<LoseOutcome>> {
        let token = match self.tokens.bearer_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        let request = action.to_request();
        let result = self
            .post_json("/user/hearts/lose", &token, &request, |status, message| {
                Error::LoseHeart { status, message }
            })
            .await;

        match result {
            Ok(outcome) => {
                self.state.apply_lose(&outcome);
                Ok(Some(outcome))
            }
            Err(error) => {
                self.errors.handle_hearts(&error);
                Err(error)
            }
        }
    }

    /// Claim a heart reward. Defaults callers should pass
    /// `RewardType::default()` (`correct_answer`).
    pub async fn reward_heart(&mut self, reward_type: RewardType) -> Result<Option<RewardOutcome>> {
        let token = match self.tokens.bearer_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        let request = RewardRequest { reward_type };
        let result = self
            .post_json(
                "/user/hearts/reward",
                &token,
                &request,
                |status, message| Error::RewardHeart { status, message },
            )
            .await;

        match result {
            Ok(outcome) => {
                self.state.apply_reward(&outcome);
                Ok(Some(outcome))
            }
            Err(error) => {
                self.errors.handle_hearts(&error);
                Err(error)
            }
        }
    }

    /// Send an increment (or reset) intent for the consecutive-correct
    /// counter
    pub async fn update_consecutive_correct(
        &mut self,
        increment: bool,
    ) -> Result<Option<ConsecutiveOutcome>> {
        let token = match self.tokens.bearer_token() {
            Some(token) => token,
            None => return Ok(None),
        };

        let request = ConsecutiveRequest { increment };
        let result = self
            .post_json("/hearts/consecutive", &token, &request, |status, message| {
                Error::ConsecutiveCorrect { status, message }
            })
            .await;

        match result {
            Ok(outcome) => {
                self.state.apply_consecutive(&outcome);
                Ok(Some(outcome))
            }
            Err(error) => {
                self.errors.handle_hearts(&error);
                Err(error)
            }
        }
    }

    /// Sugar for `update_consecutive_correct(false)`
    pub async fn reset_consecutive_correct(&mut self) -> Result<Option<ConsecutiveOutcome>> {
        self.update_consecutive_correct(false).await
    }

    // ------------------------------------------------------------------
    // Request plumbing
    // ------------------------------------------------------------------

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request_snapshot(&self, token: &str) -> Result<HeartsSnapshot> {
        let response = self
            .http
            .get(self.endpoint("/user/hearts"))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::FetchHearts {
                status: status.as_u16(),
                message: failure_message(response).await,
            });
        }

        Ok(response.json().await?)
    }

    async fn post_json<B, T>(
        &self,
        path: &str,
        token: &str,
        body: &B,
        to_error: fn(u16, Option<String>) -> Error,
    ) -> Result<T>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(self.endpoint(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(to_error(status.as_u16(), failure_message(response).await));
        }

        Ok(response.json().await?)
    }
}

/// Pull the server's rejection message out of a failed response, if it
/// sent one. Never masks the underlying HTTP failure.
async fn failure_message(response: reqwest::Response) -> Option<String> {
    response
        .json::<FailureBody>()
        .await
        .ok()
        .and_then(|body| body.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StaticTokenProvider;

    #[test]
    fn test_base_url_trailing_slash_normalized() {
        let client = HeartsClient::new("http://127.0.0.1:5000/", StaticTokenProvider::new("t"));
        assert_eq!(
            client.endpoint("/user/hearts"),
            "http://127.0.0.1:5000/user/hearts"
        );
    }

    #[test]
    fn test_new_client_starts_from_defaults() {
        let client = HeartsClient::new("http://127.0.0.1:5000", StaticTokenProvider::new("t"));
        assert_eq!(client.state(), &HeartsState::default());
        assert!(!client.errors().is_visible());
    }
}
