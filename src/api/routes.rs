use std::sync::Arc;

use axum::http::header::{CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderValue, StatusCode};
use axum::routing::get;
use axum::Router;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::api::{account, trading};
use crate::error::AppError;
use crate::ledger::Ledger;
use crate::quotes::QuoteSource;
use crate::types::money::Cents;

/// Shared resources handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<dyn Ledger>,
    pub quotes: Arc<dyn QuoteSource>,
    pub jwt_secret: Vec<u8>,
    pub starting_cash: Cents,
}

async fn health() -> &'static str {
    "healthy"
}

async fn not_found() -> AppError {
    AppError::apology(StatusCode::NOT_FOUND, "Not Found")
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(trading::index))
        .route("/quote", get(trading::quote_form).post(trading::quote))
        .route("/buy", get(trading::buy_form).post(trading::buy))
        .route("/sell", get(trading::sell_form).post(trading::sell))
        .route("/history", get(trading::history))
        .route("/login", get(account::login_form).post(account::login))
        .route("/logout", get(account::logout))
        .route("/register", get(account::register_form).post(account::register))
        .route("/change", get(account::change_password_form).post(account::change_password))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            EXPIRES,
            HeaderValue::from_static("0"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            PRAGMA,
            HeaderValue::from_static("no-cache"),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
