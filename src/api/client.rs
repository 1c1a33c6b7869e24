//! Resilient booking API client
//!
//! `ApiClient` attaches a bearer token to every call, recovers once from a
//! 401 by logging in again, and serves cacheable lookups through a TTL
//! cache.

use std::sync::Arc;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::error::ClientError;
use super::observer::{CacheStatus, RequestEvent, RequestObserver, TracingObserver};
use super::response::{extract_json, from_value};
use super::token::{Credentials, TokenManager, TokenPolicy};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::cache::{make_key, TtlCache};
use crate::config::ClientConfig;

/// Outcome of sending a request, before it is reported to the observer
struct Sent {
    result: Result<Value, ClientError>,
    status: Option<u16>,
    retried: bool,
}

/// Client for the upstream booking API
///
/// Construct one per process and share it; the token and the cache live
/// inside it.
pub struct ApiClient<T> {
    transport: Arc<T>,
    tokens: TokenManager<T>,
    cache: TtlCache<Value>,
    config: ClientConfig,
    observer: Arc<dyn RequestObserver>,
}

impl ApiClient<ReqwestTransport> {
    /// Creates a client that talks HTTP to `config.base_url`
    pub fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::new(&config.base_url, config.timeout)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> ApiClient<T> {
    /// Creates a client over any transport
    pub fn new(config: ClientConfig, transport: T) -> Self {
        let transport = Arc::new(transport);
        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        let policy = TokenPolicy {
            lifetime: config.token_lifetime,
            safety_margin: config.token_safety_margin,
            timeout: config.timeout,
        };
        let tokens = TokenManager::new(
            Arc::clone(&transport),
            credentials,
            config.login_path.clone(),
            policy,
        );

        Self {
            transport,
            tokens,
            cache: TtlCache::new(config.cache.ttl),
            config,
            observer: Arc::new(TracingObserver),
        }
    }

    /// Replaces the observer notified after every call
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager<T> {
        &self.tokens
    }

    /// Typed GET
    ///
    /// # Arguments
    /// * `path` - Endpoint path, e.g. `/api/partner/hotel/rooms`
    /// * `params` - Query parameters; order does not affect caching
    /// * `cacheable` - Serve from and fill the response cache
    pub async fn get<R: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
        cacheable: bool,
    ) -> Result<R, ClientError> {
        let query = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        let request = HttpRequest::get(path).with_query(query);
        let value = self.request(request, cacheable).await?;
        from_value(value)
    }

    /// Typed POST with a JSON body. Never cached.
    pub async fn post<R, B>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::InvalidRequest(format!("unserializable body: {}", e)))?;
        let value = self.request(HttpRequest::post(path, body), false).await?;
        from_value(value)
    }

    /// Sends a request and returns the decoded JSON body
    ///
    /// Cacheable requests are answered from the cache when possible, and a
    /// successful response fills it. Every call is reported to the observer.
    pub async fn request(&self, request: HttpRequest, cacheable: bool) -> Result<Value, ClientError> {
        let started = Instant::now();
        let cache_key =
            (cacheable && self.config.cache.enabled).then(|| make_key(&request.path, &request.query));

        if let Some(key) = &cache_key {
            if let Some(value) = self.cache.get(key) {
                self.report(&request, started, CacheStatus::Hit, None, false);
                return Ok(value);
            }
        }

        let sent = self.send_with_recovery(request.clone()).await;
        let cache_status = if cache_key.is_some() {
            CacheStatus::Miss
        } else {
            CacheStatus::Bypass
        };
        self.report(&request, started, cache_status, sent.status, sent.retried);

        let value = sent.result?;
        if let Some(key) = cache_key {
            self.cache.set(key, value.clone());
        }
        Ok(value)
    }

    /// Sends with a token, retrying exactly once after a 401
    async fn send_with_recovery(&self, request: HttpRequest) -> Sent {
        if self.is_login(&request) {
            return match self.dispatch(request).await {
                Ok(response) => Sent {
                    status: Some(response.status),
                    result: into_json(response),
                    retried: false,
                },
                Err(err) => Sent {
                    result: Err(err),
                    status: None,
                    retried: false,
                },
            };
        }

        let first = self.attempt(request.clone()).await;
        let (token, response) = match first {
            Ok(pair) => pair,
            Err(err) => {
                return Sent {
                    result: Err(err),
                    status: None,
                    retried: false,
                }
            }
        };
        if !response.is_unauthorized() {
            return Sent {
                status: Some(response.status),
                result: into_json(response),
                retried: false,
            };
        }

        tracing::warn!(path = %request.path, "token rejected, logging in again");
        self.tokens.invalidate_if_current(&token);

        match self.attempt(request).await {
            Ok((_, response)) if response.is_unauthorized() => Sent {
                status: Some(response.status),
                result: Err(ClientError::Authorization {
                    body: response.body,
                }),
                retried: true,
            },
            Ok((_, response)) => Sent {
                status: Some(response.status),
                result: into_json(response),
                retried: true,
            },
            Err(err) => Sent {
                result: Err(err),
                status: None,
                retried: true,
            },
        }
    }

    /// Attaches a valid token and sends once
    async fn attempt(&self, request: HttpRequest) -> Result<(String, HttpResponse), ClientError> {
        let token = self.tokens.ensure_valid_token().await?;
        let response = self.dispatch(request.with_bearer(token.clone())).await?;
        Ok((token, response))
    }

    /// Sends through the transport under the configured timeout
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    fn is_login(&self, request: &HttpRequest) -> bool {
        request.path == self.tokens.login_path()
    }

    fn report(
        &self,
        request: &HttpRequest,
        started: Instant,
        cache: CacheStatus,
        status: Option<u16>,
        retried: bool,
    ) {
        self.observer.on_request(&RequestEvent {
            method: request.method.clone(),
            path: request.path.clone(),
            elapsed: started.elapsed(),
            cache,
            status,
            retried,
        });
    }

    /// Returns whether a token can be obtained. Never fails.
    pub async fn ensure_connected(&self) -> bool {
        match self.tokens.ensure_valid_token().await {
            Ok(_) => true,
            Err(err) => {
                tracing::warn!(error = %err, "booking API unreachable");
                false
            }
        }
    }

    /// Drops every cached response. The token is kept.
    pub fn invalidate_cache(&self) {
        self.cache.clear();
        tracing::info!("response cache cleared");
    }

    /// Drops cached responses and the token
    pub fn dispose(&self) {
        self.cache.clear();
        self.tokens.invalidate();
    }

    /// Number of entries currently held by the response cache
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }
}

fn into_json(response: HttpResponse) -> Result<Value, ClientError> {
    if !response.is_success() {
        return Err(ClientError::Api {
            status: response.status,
            body: response.body,
        });
    }
    extract_json(&response.body)
}
