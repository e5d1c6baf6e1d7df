//! Trading routes: portfolio, quote, buy, sell, history. All require a session.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::Form;
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::api::auth::AuthUser;
use crate::api::cookies::{page, redirect_with_flash, take_flash};
use crate::api::forms::{SymbolForm, TradeForm, first_error};
use crate::api::routes::AppState;
use crate::api::views;
use crate::error::AppError;
use crate::ledger::{BuyOrder, LedgerError, SellOrder, normalize_symbol};
use crate::portfolio::value_portfolio;
use crate::types::money::usd;

const NOT_ENOUGH_SHARES: &str = "You don't have the selected amount of shares to sell.";

pub async fn index(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let cash = state.ledger.cash(user.user_id).await?;
    let holdings = state.ledger.holdings(user.user_id).await?;

    let mut prices = HashMap::new();
    for holding in &holdings {
        match state.quotes.lookup(&holding.symbol).await {
            Ok(Some(quote)) => {
                prices.insert(holding.symbol.clone(), quote.price);
            }
            Ok(None) => tracing::warn!(symbol = %holding.symbol, "no quote for held symbol"),
            Err(e) => {
                tracing::warn!(symbol = %holding.symbol, error = %e, "quote lookup failed")
            }
        }
    }

    let portfolio = value_portfolio(cash, &holdings, &prices);
    let (jar, flash) = take_flash(jar);
    Ok(page(jar, StatusCode::OK, views::portfolio(flash.as_deref(), &portfolio)))
}

pub async fn quote_form(_user: AuthUser, jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    page(jar, StatusCode::OK, views::quote_form(flash.as_deref()))
}

pub async fn quote(
    State(state): State<AppState>,
    _user: AuthUser,
    jar: CookieJar,
    Form(form): Form<SymbolForm>,
) -> Result<Response, AppError> {
    if let Err(errors) = form.validate() {
        let message = first_error(&errors, &["symbol"]);
        return Ok(page(jar, StatusCode::BAD_REQUEST, views::quote_form(message.as_deref())));
    }
    let Some(quote) = state.quotes.lookup(&form.symbol).await? else {
        let html = views::quote_form(Some(
            "This symbol doesn't exist. Please type a valid stock symbol.",
        ));
        return Ok(page(jar, StatusCode::BAD_REQUEST, html));
    };

    let (jar, flash) = take_flash(jar);
    let html = views::quoted(flash.as_deref(), &quote.name, &quote.symbol, &usd(quote.price));
    Ok(page(jar, StatusCode::OK, html))
}

pub async fn buy_form(_user: AuthUser, jar: CookieJar) -> Response {
    let (jar, flash) = take_flash(jar);
    page(jar, StatusCode::OK, views::buy_form(flash.as_deref()))
}

pub async fn buy(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
    Form(form): Form<TradeForm>,
) -> Result<Response, AppError> {
    let reject = |jar, message: &str| {
        page(jar, StatusCode::BAD_REQUEST, views::buy_form(Some(message)))
    };

    if let Err(errors) = form.validate() {
        let message = first_error(&errors, &["symbol", "shares"]);
        return Ok(page(jar, StatusCode::BAD_REQUEST, views::buy_form(message.as_deref())));
    }
    let Some(shares) = form.share_count() else {
        return Ok(reject(jar, "Shares must be a positive whole number."));
    };
    let Some(quote) = state.quotes.lookup(&form.symbol).await? else {
        return Ok(reject(jar, "Stock Symbol doesn't exist."));
    };

    let order = BuyOrder {
        symbol: quote.symbol,
        name: quote.name,
        shares,
        price_per_share: quote.price,
    };
    match state.ledger.buy(user.user_id, order).await {
        Ok(txn) => {
            tracing::info!(
                user_id = %user.user_id,
                symbol = %txn.symbol,
                shares = txn.shares,
                total = txn.price,
                "bought"
            );
            Ok(redirect_with_flash(jar, "/", "Bought!"))
        }
        Err(LedgerError::InsufficientCash { required, available }) => {
            tracing::info!(user_id = %user.user_id, required, available, "buy exceeds cash");
            Ok(reject(jar, "You don't have enough cash to buy it."))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn sell_form(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let holdings = state.ledger.holdings(user.user_id).await?;
    let (jar, flash) = take_flash(jar);
    Ok(page(jar, StatusCode::OK, views::sell_form(flash.as_deref(), &holdings)))
}

pub async fn sell(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
    Form(form): Form<TradeForm>,
) -> Result<Response, AppError> {
    let holdings = state.ledger.holdings(user.user_id).await?;
    let reject = |jar, message: &str| {
        page(jar, StatusCode::BAD_REQUEST, views::sell_form(Some(message), &holdings))
    };

    if let Err(errors) = form.validate() {
        let message = first_error(&errors, &["symbol", "shares"]);
        let html = views::sell_form(message.as_deref(), &holdings);
        return Ok(page(jar, StatusCode::BAD_REQUEST, html));
    }
    let Some(shares) = form.share_count() else {
        return Ok(reject(jar, "Shares must be a positive whole number."));
    };
    let symbol = normalize_symbol(&form.symbol);
    let owned = holdings
        .iter()
        .find(|h| h.symbol == symbol)
        .map_or(0, |h| h.shares);
    if owned < shares {
        return Ok(reject(jar, NOT_ENOUGH_SHARES));
    }
    let Some(quote) = state.quotes.lookup(&symbol).await? else {
        return Ok(reject(jar, "Stock Symbol doesn't exist."));
    };

    let order = SellOrder {
        symbol,
        shares,
        price_per_share: quote.price,
    };
    match state.ledger.sell(user.user_id, order).await {
        Ok(txn) => {
            tracing::info!(
                user_id = %user.user_id,
                symbol = %txn.symbol,
                shares = txn.shares,
                total = txn.price,
                "sold"
            );
            Ok(redirect_with_flash(jar, "/", "Sold!"))
        }
        // Lost a race with another sale between the pre-check and the ledger's own check.
        Err(LedgerError::InsufficientShares { .. }) => Ok(reject(jar, NOT_ENOUGH_SHARES)),
        Err(e) => Err(e.into()),
    }
}

pub async fn history(
    State(state): State<AppState>,
    user: AuthUser,
    jar: CookieJar,
) -> Result<Response, AppError> {
    let transactions = state.ledger.history(user.user_id).await?;
    let (jar, flash) = take_flash(jar);
    Ok(page(jar, StatusCode::OK, views::history(flash.as_deref(), &transactions)))
}
