//! HTML rendering. Every page goes through [`layout`]; all interpolated text is escaped.

use std::fmt::Write;

use chrono::Local;

use crate::portfolio::Portfolio;
use crate::types::holding::Holding;
use crate::types::money::usd;
use crate::types::transaction::Transaction;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

fn nav(logged_in: bool) -> &'static str {
    if logged_in {
        r#"<nav>
<a href="/">Portfolio</a> <a href="/quote">Quote</a> <a href="/buy">Buy</a>
<a href="/sell">Sell</a> <a href="/history">History</a> <a href="/logout">Log Out</a>
</nav>"#
    } else {
        r#"<nav>
<a href="/register">Register</a> <a href="/login">Log In</a> <a href="/change">Change Password</a>
</nav>"#
    }
}

pub fn layout(title: &str, logged_in: bool, flash: Option<&str>, body: &str) -> String {
    let flash_html = flash
        .map(|msg| format!(r#"<div class="flash" role="alert">{}</div>"#, escape(msg)))
        .unwrap_or_default();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>C$50 Finance: {}</title></head>
<body>
{}
{}
<main>
{}
</main>
</body>
</html>
"#,
        escape(title),
        nav(logged_in),
        flash_html,
        body
    )
}

pub fn apology(code: u16, message: &str) -> String {
    let body = format!(
        r#"<h1 class="apology">Sorry!</h1><p class="code">{}</p><p class="message">{}</p>"#,
        code,
        escape(message)
    );
    layout("Apology", false, None, &body)
}

pub fn login(flash: Option<&str>) -> String {
    let body = r#"<form action="/login" method="post">
<input autocomplete="off" autofocus name="username" placeholder="Username" type="text">
<input name="password" placeholder="Password" type="password">
<button type="submit">Log In</button>
</form>"#;
    layout("Log In", false, flash, body)
}

pub fn register(flash: Option<&str>) -> String {
    let body = r#"<form action="/register" method="post">
<input autocomplete="off" autofocus name="username" placeholder="Username" type="text">
<input name="password" placeholder="Password" type="password">
<input name="confirmation" placeholder="Confirm Password" type="password">
<button type="submit">Register</button>
</form>"#;
    layout("Register", false, flash, body)
}

pub fn change_password(flash: Option<&str>) -> String {
    let body = r#"<form action="/change" method="post">
<input autocomplete="off" autofocus name="username" placeholder="Username" type="text">
<input name="old_password" placeholder="Current Password" type="password">
<input name="new_password" placeholder="New Password" type="password">
<input name="new_confirmation" placeholder="Confirm New Password" type="password">
<button type="submit">Change Password</button>
</form>"#;
    layout("Change Password", false, flash, body)
}

pub fn quote_form(flash: Option<&str>) -> String {
    let body = r#"<form action="/quote" method="post">
<input autocomplete="off" autofocus name="symbol" placeholder="Symbol" type="text">
<button type="submit">Quote</button>
</form>"#;
    layout("Quote", true, flash, body)
}

pub fn quoted(flash: Option<&str>, name: &str, symbol: &str, price: &str) -> String {
    let body = format!(
        "<p>A share of {} ({}) costs {}.</p>",
        escape(name),
        escape(symbol),
        escape(price)
    );
    layout("Quoted", true, flash, &body)
}

pub fn buy_form(flash: Option<&str>) -> String {
    let body = r#"<form action="/buy" method="post">
<input autocomplete="off" autofocus name="symbol" placeholder="Symbol" type="text">
<input min="1" name="shares" placeholder="Shares" type="number">
<button type="submit">Buy</button>
</form>"#;
    layout("Buy", true, flash, body)
}

pub fn sell_form(flash: Option<&str>, holdings: &[Holding]) -> String {
    let mut options = String::new();
    for h in holdings {
        let symbol = escape(&h.symbol);
        let _ = write!(
            options,
            r#"<option value="{}">{} ({} shares)</option>"#,
            symbol, symbol, h.shares
        );
    }
    let body = format!(
        r#"<form action="/sell" method="post">
<select name="symbol"><option disabled selected value="">Symbol</option>{}</select>
<input min="1" name="shares" placeholder="Shares" type="number">
<button type="submit">Sell</button>
</form>"#,
        options
    );
    layout("Sell", true, flash, &body)
}

pub fn portfolio(flash: Option<&str>, portfolio: &Portfolio) -> String {
    let mut rows = String::new();
    for h in &portfolio.holdings {
        let price = h.price.map(usd).unwrap_or_else(|| "n/a".to_string());
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&h.symbol),
            escape(&h.name),
            h.shares,
            price,
            usd(h.value)
        );
    }
    let body = format!(
        r#"<table class="portfolio">
<thead><tr><th>Symbol</th><th>Name</th><th>Shares</th><th>Price</th><th>TOTAL</th></tr></thead>
<tbody>{}</tbody>
<tfoot>
<tr><td colspan="4">CASH</td><td id="cash">{}</td></tr>
<tr><td colspan="4">TOTAL</td><td id="total">{}</td></tr>
</tfoot>
</table>"#,
        rows,
        usd(portfolio.cash),
        usd(portfolio.total)
    );
    layout("Portfolio", true, flash, &body)
}

pub fn history(flash: Option<&str>, transactions: &[Transaction]) -> String {
    let mut rows = String::new();
    for t in transactions {
        let when = t.timestamp.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S");
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&t.symbol),
            t.shares,
            usd(t.price_per_share),
            usd(t.price),
            t.status.as_str(),
            when
        );
    }
    let body = format!(
        r#"<table class="history">
<thead><tr><th>Symbol</th><th>Shares</th><th>Price</th><th>Total</th><th>Status</th>
<th>Transacted</th></tr></thead>
<tbody>{}</tbody>
</table>"#,
        rows
    );
    layout("History", true, flash, &body)
}
