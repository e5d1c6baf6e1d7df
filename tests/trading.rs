//! Integration tests for quoting, buying, selling and history.

mod common;

use std::sync::Arc;

use common::{
    SwitchableQuotes, browser_no_redirect, register, signed_in, spawn_app, spawn_app_with_quotes,
    trade,
};
use papertrade::ledger::Ledger;

async fn user_id(app: &common::TestApp, username: &str) -> uuid::Uuid {
    app.ledger
        .find_user_by_username(username)
        .await
        .unwrap()
        .unwrap()
        .id
}

#[tokio::test]
async fn quote_shows_name_symbol_and_price() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let res = client
        .post(app.url("/quote"))
        .form(&[("symbol", "nflx")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("A share of Netflix, Inc. (NFLX) costs $123.45."));
}

#[tokio::test]
async fn quote_unknown_or_missing_symbol_returns_400() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let unknown = client
        .post(app.url("/quote"))
        .form(&[("symbol", "ZZZZ")])
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 400);
    assert!(unknown.text().await.unwrap().contains("This symbol doesn"));

    let missing = client
        .post(app.url("/quote"))
        .form(&[("symbol", "")])
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 400);
    assert!(missing.text().await.unwrap().contains("Must provide a stock symbol."));
}

#[tokio::test]
async fn buy_deducts_cash_and_adds_holding() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let res = trade(&app, &client, "/buy", "aapl", "2").await;

    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(res.url().path(), "/");
    let body = res.text().await.unwrap();
    assert!(body.contains("Bought!"));
    assert!(body.contains(
        "<td>AAPL</td><td>Apple Inc.</td><td>2</td><td>$150.00</td><td>$300.00</td>"
    ));
    assert!(body.contains(r#"id="cash">$9,700.00<"#));
    assert!(body.contains(r#"id="total">$10,000.00<"#));
}

#[tokio::test]
async fn buy_more_than_cash_allows_is_rejected() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    // 34 * $300.00 = $10,200.00
    let res = trade(&app, &client, "/buy", "MSFT", "34").await;

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.text().await.unwrap().contains("enough cash to buy it."));
    let id = user_id(&app, "alice").await;
    assert_eq!(app.ledger.cash(id).await.unwrap(), 1_000_000);
    assert!(app.ledger.holdings(id).await.unwrap().is_empty());
    assert!(app.ledger.history(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn buy_too_large_to_price_is_rejected_as_unaffordable() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    // 10^15 shares at $150.00 overflows a cent total.
    let res = trade(&app, &client, "/buy", "AAPL", "1000000000000000").await;

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.text().await.unwrap().contains("enough cash to buy it."));
    let id = user_id(&app, "alice").await;
    assert_eq!(app.ledger.cash(id).await.unwrap(), 1_000_000);
    assert!(app.ledger.history(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn buy_up_to_available_cash_succeeds() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let res = trade(&app, &client, "/buy", "MSFT", "33").await;
    assert_eq!(res.status().as_u16(), 200);

    let res = trade(&app, &client, "/buy", "AAPL", "0").await;
    assert_eq!(res.status().as_u16(), 400);

    let id = user_id(&app, "alice").await;
    assert_eq!(app.ledger.cash(id).await.unwrap(), 1_000_000 - 33 * 30_000);
}

#[tokio::test]
async fn buy_rejects_bad_share_counts() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    for shares in ["", "abc", "0", "-3", "1.5"] {
        let res = trade(&app, &client, "/buy", "AAPL", shares).await;
        assert_eq!(res.status().as_u16(), 400, "shares={:?}", shares);
        assert!(res.text().await.unwrap().contains("positive whole number"));
    }
}

#[tokio::test]
async fn buy_unknown_symbol_is_rejected() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let res = trade(&app, &client, "/buy", "ZZZZ", "1").await;
    assert_eq!(res.status().as_u16(), 400);
    assert!(res.text().await.unwrap().contains("Stock Symbol doesn"));
}

#[tokio::test]
async fn sell_more_than_owned_is_rejected() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;
    trade(&app, &client, "/buy", "AAPL", "2").await;

    let res = trade(&app, &client, "/sell", "AAPL", "3").await;

    assert_eq!(res.status().as_u16(), 400);
    assert!(res.text().await.unwrap().contains("selected amount of shares to sell."));
    let id = user_id(&app, "alice").await;
    assert_eq!(app.ledger.cash(id).await.unwrap(), 1_000_000 - 30_000);
    assert_eq!(app.ledger.holdings(id).await.unwrap()[0].shares, 2);
    assert_eq!(app.ledger.history(id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn sell_symbol_not_owned_is_rejected() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    let res = trade(&app, &client, "/sell", "MSFT", "1").await;
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn buy_then_partial_sell_updates_cash_holdings_and_history() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    trade(&app, &client, "/buy", "AAPL", "3").await;
    let res = trade(&app, &client, "/sell", "aapl", "1").await;

    assert_eq!(res.url().path(), "/");
    let body = res.text().await.unwrap();
    assert!(body.contains("Sold!"));
    assert!(body.contains(r#"id="cash">$9,700.00<"#));
    assert!(body.contains("<td>AAPL</td><td>Apple Inc.</td><td>2</td>"));

    let history = client.get(app.url("/history")).send().await.unwrap();
    assert_eq!(history.status().as_u16(), 200);
    let body = history.text().await.unwrap();
    assert!(body.contains(
        "<td>AAPL</td><td>3</td><td>$150.00</td><td>$450.00</td><td>BOUGHT</td>"
    ));
    assert!(body.contains("<td>AAPL</td><td>-1</td><td>$150.00</td><td>$150.00</td><td>SOLD</td>"));
    let bought_at = body.find("BOUGHT").unwrap();
    let sold_at = body.find("SOLD").unwrap();
    assert!(bought_at < sold_at);
}

#[tokio::test]
async fn selling_everything_removes_the_holding() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;

    trade(&app, &client, "/buy", "NFLX", "1").await;
    trade(&app, &client, "/buy", "NFLX", "2").await;
    let res = trade(&app, &client, "/sell", "NFLX", "3").await;

    let body = res.text().await.unwrap();
    assert!(!body.contains("<td>NFLX</td>"));
    assert!(body.contains(r#"id="cash">$10,000.00<"#));
    let id = user_id(&app, "alice").await;
    assert!(app.ledger.holdings(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn sell_form_lists_owned_symbols() {
    let app = spawn_app().await;
    let client = signed_in(&app, "alice").await;
    trade(&app, &client, "/buy", "MSFT", "1").await;
    trade(&app, &client, "/buy", "AAPL", "4").await;

    let res = client.get(app.url("/sell")).send().await.unwrap();
    let body = res.text().await.unwrap();
    assert!(body.contains(r#"<option value="AAPL">AAPL (4 shares)</option>"#));
    assert!(body.contains(r#"<option value="MSFT">MSFT (1 shares)</option>"#));
    assert!(body.find("AAPL (4").unwrap() < body.find("MSFT (1").unwrap());
}

#[tokio::test]
async fn users_do_not_see_each_others_holdings() {
    let app = spawn_app().await;
    let alice = signed_in(&app, "alice").await;
    let bob = signed_in(&app, "bob").await;

    trade(&app, &alice, "/buy", "AAPL", "1").await;

    let body = bob.get(app.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(!body.contains("<td>AAPL</td>"));
    let res = trade(&app, &bob, "/sell", "AAPL", "1").await;
    assert_eq!(res.status().as_u16(), 400);
}

#[tokio::test]
async fn quote_provider_outage_renders_502_apology() {
    let quotes = SwitchableQuotes::default();
    let app = spawn_app_with_quotes(Arc::new(quotes.clone())).await;
    let client = signed_in(&app, "alice").await;
    quotes.set_down(true);

    let res = client
        .post(app.url("/quote"))
        .form(&[("symbol", "AAPL")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 502);
    assert!(res.text().await.unwrap().contains("Quote service unavailable"));

    let buy = trade(&app, &client, "/buy", "AAPL", "1").await;
    assert_eq!(buy.status().as_u16(), 502);
    let id = user_id(&app, "alice").await;
    assert!(app.ledger.history(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn portfolio_survives_quote_outage() {
    let quotes = SwitchableQuotes::default();
    let app = spawn_app_with_quotes(Arc::new(quotes.clone())).await;
    let client = signed_in(&app, "alice").await;
    assert_eq!(trade(&app, &client, "/buy", "AAPL", "2").await.status().as_u16(), 200);
    quotes.set_down(true);

    let res = client.get(app.url("/")).send().await.unwrap();

    assert_eq!(res.status().as_u16(), 200);
    let body = res.text().await.unwrap();
    assert!(body.contains("<td>AAPL</td><td>Apple Inc.</td><td>2</td><td>n/a</td><td>$0.00</td>"));
    assert!(body.contains(r#"id="cash">$9,700.00<"#));
    assert!(body.contains(r#"id="total">$9,700.00<"#));
}

#[tokio::test]
async fn history_and_quote_pages_consume_the_flash() {
    let app = spawn_app().await;
    let client = browser_no_redirect();
    register(&app, &client, "alice", "hunter2").await;

    let bought = trade(&app, &client, "/buy", "AAPL", "1").await;
    assert_eq!(bought.status().as_u16(), 303);
    let history = client.get(app.url("/history")).send().await.unwrap();
    assert!(history.text().await.unwrap().contains("Bought!"));
    let home = client.get(app.url("/")).send().await.unwrap();
    assert!(!home.text().await.unwrap().contains("Bought!"));

    let sold = trade(&app, &client, "/sell", "AAPL", "1").await;
    assert_eq!(sold.status().as_u16(), 303);
    let quoted = client
        .post(app.url("/quote"))
        .form(&[("symbol", "MSFT")])
        .send()
        .await
        .unwrap();
    let body = quoted.text().await.unwrap();
    assert!(body.contains("Sold!"));
    assert!(body.contains("Microsoft Corporation (MSFT) costs $300.00."));
    let home = client.get(app.url("/")).send().await.unwrap();
    assert!(!home.text().await.unwrap().contains("Sold!"));
}
