//! Integration tests for the booking API client
//!
//! Every test runs against a scripted in-memory transport; nothing touches
//! the network.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use hotel_desk::api::{
    ApiClient, CacheStatus, ClientError, HttpRequest, HttpResponse, RecordingObserver, Transport,
    TransportError, AVAILABILITY_PATH, E_RESERVATIONS_PATH, ROOM_TYPES_PATH,
};
use hotel_desk::config::{CacheConfig, ClientConfig, DEFAULT_LOGIN_PATH};
use hotel_desk::data::CreateEReservationRequest;
use hotel_desk::dates::StayPeriod;

#[derive(Debug, Deserialize, PartialEq)]
struct Item {
    id: u64,
}

/// Shared script behind a cloneable transport handle
struct Script {
    logins: AtomicUsize,
    login_status: u16,
    responses: Mutex<VecDeque<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Duration,
}

#[derive(Clone)]
struct ScriptedTransport {
    script: Arc<Script>,
}

impl ScriptedTransport {
    fn new() -> Self {
        Self::build(200, Duration::ZERO)
    }

    fn build(login_status: u16, delay: Duration) -> Self {
        Self {
            script: Arc::new(Script {
                logins: AtomicUsize::new(0),
                login_status,
                responses: Mutex::new(VecDeque::new()),
                requests: Mutex::new(Vec::new()),
                delay,
            }),
        }
    }

    /// Queues the next non-login response
    fn respond(&self, status: u16, body: &str) -> &Self {
        self.script
            .responses
            .lock()
            .unwrap()
            .push_back(HttpResponse::new(status, body));
        self
    }

    fn logins(&self) -> usize {
        self.script.logins.load(Ordering::SeqCst)
    }

    /// Non-login requests seen so far
    fn api_requests(&self) -> Vec<HttpRequest> {
        self.script.requests.lock().unwrap().clone()
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tokio::time::sleep(self.script.delay).await;

        if request.path == DEFAULT_LOGIN_PATH {
            assert!(request.bearer.is_none(), "login must not carry a token");
            let n = self.script.logins.fetch_add(1, Ordering::SeqCst) + 1;
            return Ok(if self.script.login_status == 200 {
                HttpResponse::new(200, format!(r#"{{"token":"tok-{}"}}"#, n))
            } else {
                HttpResponse::new(self.script.login_status, "invalid credentials")
            });
        }

        self.script.requests.lock().unwrap().push(request);
        let next = self.script.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| HttpResponse::new(200, r#"{"id": 0}"#)))
    }
}

fn config() -> ClientConfig {
    ClientConfig::new("user", "secret").with_base_url("http://scripted.test")
}

fn client_with(transport: &ScriptedTransport) -> (ApiClient<ScriptedTransport>, Arc<RecordingObserver>) {
    client_with_config(transport, config())
}

fn client_with_config(
    transport: &ScriptedTransport,
    config: ClientConfig,
) -> (ApiClient<ScriptedTransport>, Arc<RecordingObserver>) {
    let observer = Arc::new(RecordingObserver::new());
    let client = ApiClient::new(config, transport.clone()).with_observer(observer.clone());
    (client, observer)
}

#[tokio::test]
async fn test_requests_carry_bearer_token() {
    let transport = ScriptedTransport::new();
    transport.respond(200, r#"{"id": 1}"#).respond(200, r#"{"id": 2}"#);
    let (client, _) = client_with(&transport);

    let first: Item = client.get("/api/things/1", &[], false).await.unwrap();
    let second: Item = client.get("/api/things/2", &[], false).await.unwrap();

    assert_eq!(first, Item { id: 1 });
    assert_eq!(second, Item { id: 2 });
    assert_eq!(transport.logins(), 1);
    for request in transport.api_requests() {
        assert_eq!(request.bearer.as_deref(), Some("tok-1"));
    }
}

#[tokio::test]
async fn test_single_401_triggers_one_login_and_one_retry() {
    let transport = ScriptedTransport::new();
    transport
        .respond(401, "token expired")
        .respond(200, r#"{"id": 7}"#);
    let (client, observer) = client_with(&transport);

    let item: Item = client.get("/api/things/7", &[], false).await.unwrap();

    assert_eq!(item, Item { id: 7 });
    assert_eq!(transport.logins(), 2);
    let requests = transport.api_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].bearer.as_deref(), Some("tok-1"));
    assert_eq!(requests[1].bearer.as_deref(), Some("tok-2"));

    let events = observer.events();
    assert_eq!(events.len(), 1);
    assert!(events[0].retried);
    assert_eq!(events[0].status, Some(200));
}

#[tokio::test]
async fn test_second_401_is_terminal() {
    let transport = ScriptedTransport::new();
    transport
        .respond(401, "expired")
        .respond(401, "still expired")
        .respond(200, r#"{"id": 1}"#);
    let (client, _) = client_with(&transport);

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Authorization { ref body } if body == "still expired"));
    assert_eq!(transport.logins(), 2);
    assert_eq!(transport.api_requests().len(), 2, "no third attempt");
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let transport = ScriptedTransport::new();
    transport.respond(500, "boom").respond(200, r#"{"id": 1}"#);
    let (client, _) = client_with(&transport);

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Api { status: 500, ref body } if body == "boom"));
    assert_eq!(transport.api_requests().len(), 1);
    assert_eq!(transport.logins(), 1);
}

#[tokio::test]
async fn test_cacheable_get_is_served_from_cache() {
    let transport = ScriptedTransport::new();
    transport.respond(200, r#"{"id": 5}"#);
    let (client, observer) = client_with(&transport);

    let first: Item = client.get("/api/things/5", &[], true).await.unwrap();
    let second: Item = client.get("/api/things/5", &[], true).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(transport.api_requests().len(), 1);
    assert_eq!(observer.count(CacheStatus::Miss), 1);
    assert_eq!(observer.count(CacheStatus::Hit), 1);
}

#[tokio::test]
async fn test_cache_key_ignores_parameter_order() {
    let transport = ScriptedTransport::new();
    transport.respond(200, r#"{"id": 9}"#);
    let (client, _) = client_with(&transport);

    let _: Item = client
        .get("/api/search", &[("a", "1".into()), ("b", "2".into())], true)
        .await
        .unwrap();
    let cached: Item = client
        .get("/api/search", &[("b", "2".into()), ("a", "1".into())], true)
        .await
        .unwrap();

    assert_eq!(cached, Item { id: 9 });
    assert_eq!(transport.api_requests().len(), 1);
}

#[tokio::test]
async fn test_cache_disabled_and_non_cacheable_calls_hit_network() {
    let transport = ScriptedTransport::new();
    let disabled = config().with_cache(CacheConfig {
        enabled: false,
        ttl: Duration::from_secs(60),
    });
    let (client, observer) = client_with_config(&transport, disabled);

    for _ in 0..2 {
        let _: Item = client.get("/api/things/1", &[], true).await.unwrap();
    }
    assert_eq!(transport.api_requests().len(), 2);
    assert_eq!(observer.count(CacheStatus::Bypass), 2);

    let transport = ScriptedTransport::new();
    let (client, _) = client_with(&transport);
    for _ in 0..2 {
        let _: Item = client.get("/api/things/1", &[], false).await.unwrap();
    }
    assert_eq!(transport.api_requests().len(), 2);
}

#[tokio::test]
async fn test_cache_entries_expire() {
    let transport = ScriptedTransport::new();
    let short = config().with_cache(CacheConfig {
        enabled: true,
        ttl: Duration::from_millis(30),
    });
    let (client, _) = client_with_config(&transport, short);

    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();

    assert_eq!(transport.api_requests().len(), 2);
}

#[tokio::test]
async fn test_failed_responses_are_not_cached() {
    let transport = ScriptedTransport::new();
    transport.respond(503, "maintenance").respond(200, r#"{"id": 3}"#);
    let (client, _) = client_with(&transport);

    assert!(client.get::<Item>("/api/things/3", &[], true).await.is_err());
    assert_eq!(client.cached_entries(), 0);

    let item: Item = client.get("/api/things/3", &[], true).await.unwrap();
    assert_eq!(item, Item { id: 3 });
    assert_eq!(client.cached_entries(), 1);
}

#[tokio::test]
async fn test_invalidate_cache_keeps_token() {
    let transport = ScriptedTransport::new();
    let (client, _) = client_with(&transport);

    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();
    client.invalidate_cache();
    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();

    assert_eq!(transport.api_requests().len(), 2);
    assert_eq!(transport.logins(), 1);
}

#[tokio::test]
async fn test_dispose_clears_token_and_cache() {
    let transport = ScriptedTransport::new();
    let (client, _) = client_with(&transport);

    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();
    client.dispose();
    assert_eq!(client.cached_entries(), 0);
    assert!(client.tokens().current().is_none());

    let _: Item = client.get("/api/things/1", &[], true).await.unwrap();
    assert_eq!(transport.logins(), 2);
}

#[tokio::test]
async fn test_noisy_body_is_parsed() {
    let transport = ScriptedTransport::new();
    transport.respond(200, "Warning: deprecated call in handler.php\n{\"id\": 42}");
    let (client, _) = client_with(&transport);

    let item: Item = client.get("/api/things/42", &[], false).await.unwrap();
    assert_eq!(item, Item { id: 42 });
}

#[tokio::test]
async fn test_body_without_json_is_malformed() {
    let transport = ScriptedTransport::new();
    transport.respond(200, "Fatal error: out of memory");
    let (client, _) = client_with(&transport);

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::MalformedResponse(_)));
}

#[tokio::test]
async fn test_slow_login_surfaces_as_authentication_error() {
    let transport = ScriptedTransport::build(200, Duration::from_millis(300));
    let config = config().with_timeout(Duration::from_millis(50));
    let (client, _) = client_with_config(&transport, config);

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();

    assert!(
        matches!(err, ClientError::Authentication(ref e) if e.message.contains("timed out")),
        "unexpected error: {:?}",
        err
    );
    assert!(transport.api_requests().is_empty());
}

/// Answers login instantly and every other call slowly
#[derive(Clone, Default)]
struct SlowApi {
    calls: Arc<AtomicUsize>,
}

impl Transport for SlowApi {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.path == DEFAULT_LOGIN_PATH {
            return Ok(HttpResponse::new(200, r#"{"token":"t"}"#));
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(300)).await;
        Ok(HttpResponse::new(200, r#"{"id": 1}"#))
    }
}

#[tokio::test]
async fn test_api_call_timeout_is_distinct_error() {
    let config = ClientConfig::new("user", "secret").with_timeout(Duration::from_millis(50));
    let transport = SlowApi::default();
    let client = ApiClient::new(config, transport.clone());

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "expected timeout, got {:?}", err);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1, "timeouts are not retried");
}

#[tokio::test]
async fn test_ensure_connected_reports_login_failure() {
    let transport = ScriptedTransport::build(401, Duration::ZERO);
    let (client, _) = client_with(&transport);

    assert!(!client.ensure_connected().await);

    let err = client
        .get::<Item>("/api/things/1", &[], false)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Authentication(ref e) if e.message.contains("invalid credentials")));
    assert!(transport.api_requests().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_share_one_login() {
    let transport = ScriptedTransport::build(200, Duration::from_millis(30));
    let (client, _) = client_with(&transport);
    let client = Arc::new(client);

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .get::<Item>(&format!("/api/things/{}", i), &[], false)
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(transport.logins(), 1);
    assert!(transport
        .api_requests()
        .iter()
        .all(|r| r.bearer.as_deref() == Some("tok-1")));
}

#[tokio::test]
async fn test_typed_endpoints_use_expected_paths() {
    let transport = ScriptedTransport::new();
    transport
        .respond(
            200,
            &json!([{ "id": 1, "label": "Double", "public": true, "rank": 2 }]).to_string(),
        )
        .respond(200, "[]");
    let (client, _) = client_with(&transport);

    let room_types = client.room_types().await.unwrap();
    assert_eq!(room_types[0].label, "Double");

    let today = NaiveDate::from_ymd_opt(2026, 2, 3).unwrap();
    let stay = StayPeriod::new(
        NaiveDate::from_ymd_opt(2026, 2, 6).unwrap(),
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap(),
        2,
        1,
        today,
    )
    .unwrap();
    let availabilities = client.availability(&stay).await.unwrap();
    assert!(availabilities.is_empty());

    let requests = transport.api_requests();
    assert_eq!(requests[0].path, ROOM_TYPES_PATH);
    assert_eq!(requests[1].path, AVAILABILITY_PATH);
    assert!(requests[1]
        .query
        .contains(&("checkIn".to_string(), "2026-02-06".to_string())));
    assert!(requests[1]
        .query
        .contains(&("children".to_string(), "1".to_string())));
}

#[tokio::test]
async fn test_e_reservation_is_posted_and_never_cached() {
    let transport = ScriptedTransport::new();
    let created = json!({ "id": 310, "checkin": "2026-02-06", "checkout": "2026-02-09" }).to_string();
    transport.respond(200, &created).respond(200, &created);
    let (client, observer) = client_with(&transport);

    let request = CreateEReservationRequest {
        checkin: "2026-02-06".into(),
        checkout: "2026-02-09".into(),
        customer_firstname: "Camille".into(),
        customer_lastname: "Martin".into(),
        customer_email: "camille@example.test".into(),
        ..Default::default()
    };

    for _ in 0..2 {
        let reservation = client.create_e_reservation(&request).await.unwrap();
        assert_eq!(reservation.id, 310);
    }

    let requests = transport.api_requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].path, E_RESERVATIONS_PATH);
    assert_eq!(requests[0].method, reqwest::Method::POST);
    let body = requests[0].body.as_ref().unwrap();
    assert_eq!(body["customer_lastname"], "Martin");
    assert!(body.get("customer_phone").is_none());
    assert_eq!(observer.count(CacheStatus::Bypass), 2);
}

/// Rejects the first issued token on every API call
#[derive(Clone, Default)]
struct RevokedFirstToken {
    logins: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl Transport for RevokedFirstToken {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        if request.path == DEFAULT_LOGIN_PATH {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let n = self.logins.fetch_add(1, Ordering::SeqCst) + 1;
            return Ok(HttpResponse::new(200, format!(r#"{{"token":"tok-{}"}}"#, n)));
        }

        let bearer = request.bearer.clone().unwrap_or_default();
        self.seen.lock().unwrap().push(bearer.clone());
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(if bearer == "tok-1" {
            HttpResponse::new(401, "token revoked")
        } else {
            HttpResponse::new(200, r#"{"id": 1}"#)
        })
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_401s_share_one_relogin() {
    let transport = RevokedFirstToken::default();
    let client = Arc::new(ApiClient::new(config(), transport.clone()));

    let handles: Vec<_> = (0..12)
        .map(|i| {
            let client = Arc::clone(&client);
            tokio::spawn(async move {
                client
                    .get::<Item>(&format!("/api/things/{}", i), &[], false)
                    .await
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), Item { id: 1 });
    }

    assert_eq!(transport.logins.load(Ordering::SeqCst), 2);
    let seen = transport.seen.lock().unwrap().clone();
    assert_eq!(seen.iter().filter(|t| *t == "tok-1").count(), 12);
    assert_eq!(seen.iter().filter(|t| *t == "tok-2").count(), 12);
}

#[tokio::test]
async fn test_unserializable_body_is_rejected_before_sending() {
    let transport = ScriptedTransport::new();
    let (client, _) = client_with(&transport);

    let mut body = std::collections::BTreeMap::new();
    body.insert((1, 2), "tuple keys have no JSON form");

    let err = client.post::<Item, _>("/api/things", &body).await.unwrap_err();

    assert!(matches!(err, ClientError::InvalidRequest(ref m) if m.contains("unserializable")));
    assert!(transport.api_requests().is_empty());
    assert_eq!(transport.logins(), 0);
}
