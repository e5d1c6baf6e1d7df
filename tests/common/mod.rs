//! Shared helpers: serve the app on a random port with an in-memory ledger.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use papertrade::api::routes::{AppState, app_router};
use papertrade::config::DEFAULT_STARTING_CASH;
use papertrade::ledger::MemoryLedger;
use papertrade::quotes::{Quote, QuoteError, QuoteSource, StaticQuotes};
use reqwest::StatusCode;

pub struct TestApp {
    pub base_url: String,
    pub ledger: MemoryLedger,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

pub fn test_quotes() -> StaticQuotes {
    StaticQuotes::new()
        .with("AAPL", "Apple Inc.", 15_000)
        .with("MSFT", "Microsoft Corporation", 30_000)
        .with("NFLX", "Netflix, Inc.", 12_345)
}

/// Serves [`test_quotes`] until switched off, then fails every lookup the way an
/// unreachable provider does.
#[derive(Clone, Default)]
pub struct SwitchableQuotes {
    down: Arc<AtomicBool>,
}

impl SwitchableQuotes {
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuoteSource for SwitchableQuotes {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        if self.down.load(Ordering::SeqCst) {
            return Err(QuoteError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        test_quotes().lookup(symbol).await
    }
}

pub fn test_app_state(ledger: MemoryLedger) -> AppState {
    test_app_state_with_quotes(ledger, Arc::new(test_quotes()))
}

pub fn test_app_state_with_quotes(
    ledger: MemoryLedger,
    quotes: Arc<dyn QuoteSource>,
) -> AppState {
    AppState {
        ledger: Arc::new(ledger),
        quotes,
        jwt_secret: b"test-jwt-secret".to_vec(),
        starting_cash: DEFAULT_STARTING_CASH,
    }
}

/// Spawn app on a random port and return its base URL plus the ledger behind it.
pub async fn spawn_app() -> TestApp {
    spawn_app_with_quotes(Arc::new(test_quotes())).await
}

pub async fn spawn_app_with_quotes(quotes: Arc<dyn QuoteSource>) -> TestApp {
    let ledger = MemoryLedger::new();
    let state = test_app_state_with_quotes(ledger.clone(), quotes);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app_router(state);
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    TestApp {
        base_url: format!("http://{}", addr),
        ledger,
        _handle: handle,
    }
}

/// Browser-like client: keeps cookies and follows redirects.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder().cookie_store(true).build().unwrap()
}

/// Keeps cookies but exposes redirects to the test.
pub fn browser_no_redirect() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

pub async fn register(
    app: &TestApp,
    client: &reqwest::Client,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(app.url("/register"))
        .form(&[
            ("username", username),
            ("password", password),
            ("confirmation", password),
        ])
        .send()
        .await
        .unwrap()
}

pub async fn login(
    app: &TestApp,
    client: &reqwest::Client,
    username: &str,
    password: &str,
) -> reqwest::Response {
    client
        .post(app.url("/login"))
        .form(&[("username", username), ("password", password)])
        .send()
        .await
        .unwrap()
}

pub async fn trade(
    app: &TestApp,
    client: &reqwest::Client,
    path: &str,
    symbol: &str,
    shares: &str,
) -> reqwest::Response {
    client
        .post(app.url(path))
        .form(&[("symbol", symbol), ("shares", shares)])
        .send()
        .await
        .unwrap()
}

/// Registered, logged-in browser.
pub async fn signed_in(app: &TestApp, username: &str) -> reqwest::Client {
    let client = browser();
    let res = register(app, &client, username, "hunter2").await;
    assert_eq!(res.status().as_u16(), 200);
    client
}
