//! Bearer token management
//!
//! [`TokenManager`] owns the current token and refreshes it on demand. Only
//! one login request is ever outstanding: callers that need a token while a
//! login is running wait on that same attempt and all receive its result.
//!
//! The login runs in its own task, so it completes and stores its token even
//! if every caller waiting on it is dropped.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Deserialize;
use serde_json::json;
use tokio::time::Instant;

use super::error::{AuthenticationError, TransportError};
use super::response::decode;
use super::transport::{HttpRequest, Transport};

/// Login credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Body of the login response
#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// A token and the instant after which it must not be used
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub expires_at: Instant,
}

impl Token {
    /// True while `now` is more than `margin` before expiry
    pub fn is_usable(&self, now: Instant, margin: Duration) -> bool {
        now.checked_add(margin)
            .is_some_and(|limit| limit < self.expires_at)
    }
}

/// Lifetime policy for issued tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Validity window assumed for every new token
    pub lifetime: Duration,
    /// Refresh this long before the window closes
    pub safety_margin: Duration,
    /// Timeout for the login request
    pub timeout: Duration,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(9 * 60),
            safety_margin: Duration::from_secs(60),
            timeout: Duration::from_secs(15),
        }
    }
}

type LoginAttempt = Shared<BoxFuture<'static, Result<String, AuthenticationError>>>;

#[derive(Default)]
struct TokenState {
    current: Option<Token>,
    in_flight: Option<LoginAttempt>,
}

struct Inner<T> {
    transport: Arc<T>,
    credentials: Credentials,
    login_path: String,
    policy: TokenPolicy,
    state: Mutex<TokenState>,
}

/// Issues valid bearer tokens, logging in at most once at a time
pub struct TokenManager<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for TokenManager<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport> TokenManager<T> {
    pub fn new(
        transport: Arc<T>,
        credentials: Credentials,
        login_path: impl Into<String>,
        policy: TokenPolicy,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                credentials,
                login_path: login_path.into(),
                policy,
                state: Mutex::new(TokenState::default()),
            }),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.inner.login_path
    }

    /// Returns a token that is not within the safety margin of expiry
    ///
    /// Logs in when there is no usable token. If a login is already running,
    /// waits for it instead of starting another. A failed login is returned
    /// to every waiter and is not retried here.
    pub async fn ensure_valid_token(&self) -> Result<String, AuthenticationError> {
        let attempt = {
            let mut state = self.inner.lock_state();
            let now = Instant::now();
            if let Some(token) = state
                .current
                .as_ref()
                .filter(|t| t.is_usable(now, self.inner.policy.safety_margin))
            {
                return Ok(token.value.clone());
            }

            match &state.in_flight {
                Some(attempt) => attempt.clone(),
                None => {
                    let attempt = self.start_login();
                    state.in_flight = Some(attempt.clone());
                    attempt
                }
            }
        };

        attempt.await
    }

    /// Clears the current token so the next call logs in again
    pub fn invalidate(&self) {
        let mut state = self.inner.lock_state();
        state.current = None;
    }

    /// Clears the current token only if it is `rejected`
    ///
    /// When another caller has already replaced the token, the newer one is
    /// kept.
    pub fn invalidate_if_current(&self, rejected: &str) -> bool {
        let mut state = self.inner.lock_state();
        let is_current = state
            .current
            .as_ref()
            .is_some_and(|token| token.value == rejected);
        if is_current {
            state.current = None;
        }
        is_current
    }

    /// The stored token, whatever its age
    pub fn current(&self) -> Option<Token> {
        self.inner.lock_state().current.clone()
    }

    /// Spawns a login task and wraps its result for sharing between waiters
    ///
    /// Must be called with the state lock held, so the task's own update of
    /// the state cannot run before `in_flight` is recorded.
    fn start_login(&self) -> LoginAttempt {
        let inner = Arc::clone(&self.inner);
        let task = tokio::spawn(async move {
            let _clear = ClearInFlight(Arc::clone(&inner));
            let token = inner.login().await?;
            let value = token.value.clone();
            inner.lock_state().current = Some(token);
            Ok::<_, AuthenticationError>(value)
        });

        async move {
            task.await.unwrap_or_else(|join_err| {
                Err(AuthenticationError::new(format!(
                    "login task failed: {}",
                    join_err
                )))
            })
        }
        .boxed()
        .shared()
    }
}

/// Clears `in_flight` when the login task ends, even by panicking
struct ClearInFlight<T>(Arc<Inner<T>>);

impl<T> Drop for ClearInFlight<T> {
    fn drop(&mut self) {
        self.0.lock_state().in_flight = None;
    }
}

impl<T> Inner<T> {
    fn lock_state(&self) -> MutexGuard<'_, TokenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Transport> Inner<T> {
    async fn login(&self) -> Result<Token, AuthenticationError> {
        tracing::info!(path = %self.login_path, "logging in to booking API");

        let request = HttpRequest::post(
            self.login_path.clone(),
            json!({
                "username": self.credentials.username,
                "password": self.credentials.password,
            }),
        );

        let response = match tokio::time::timeout(
            self.policy.timeout,
            self.transport.send(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(self.fail(transport_message(&err))),
            Err(_) => {
                return Err(self.fail(format!(
                    "login timed out after {:?}",
                    self.policy.timeout
                )))
            }
        };

        if !response.is_success() {
            return Err(self.fail(format!(
                "login rejected with status {}: {}",
                response.status,
                response.body.trim()
            )));
        }

        let login: LoginResponse =
            decode(&response.body).map_err(|e| self.fail(e.to_string()))?;
        if login.token.is_empty() {
            return Err(self.fail("login response contained an empty token"));
        }

        tracing::info!(
            lifetime_secs = self.policy.lifetime.as_secs(),
            "logged in to booking API"
        );

        let expires_at = Instant::now()
            .checked_add(self.policy.lifetime)
            .ok_or_else(|| self.fail("token lifetime is out of range"))?;

        Ok(Token {
            value: login.token,
            expires_at,
        })
    }

    fn fail(&self, message: impl Into<String>) -> AuthenticationError {
        let err = AuthenticationError::new(message);
        tracing::warn!(error = %err.message, "login failed");
        err
    }
}

fn transport_message(err: &TransportError) -> String {
    match err {
        TransportError::Timeout(after) => format!("login timed out after {:?}", after),
        TransportError::Network(message) => format!("network error during login: {}", message),
    }
}
