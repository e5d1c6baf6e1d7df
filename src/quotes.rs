//! Stock quote lookup against an IEX Cloud style HTTP API.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::money::{Cents, dollars_to_cents};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub name: String,
    pub symbol: String,
    pub price: Cents,
}

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error("quote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("quote provider returned HTTP {0}")]
    Status(StatusCode),
}

/// `Ok(None)` means the provider does not know the symbol.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError>;
}

#[derive(Deserialize)]
struct IexQuote {
    #[serde(rename = "companyName")]
    company_name: String,
    #[serde(rename = "latestPrice")]
    latest_price: Option<f64>,
    symbol: String,
}

pub struct IexClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl IexClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, QuoteError> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl QuoteSource for IexClient {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        let symbol = symbol.trim();
        let valid = |c: char| c.is_ascii_alphanumeric() || c == '.' || c == '-';
        if symbol.is_empty() || !symbol.chars().all(valid) {
            return Ok(None);
        }
        let encoded: String = url::form_urlencoded::byte_serialize(symbol.as_bytes()).collect();
        let url = format!("{}/stock/{}/quote", self.base_url, encoded);

        let response = self
            .client
            .get(&url)
            .query(&[("token", self.api_key.as_str())])
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::BAD_REQUEST => {
                tracing::debug!(symbol, "quote provider does not know symbol");
                return Ok(None);
            }
            status if !status.is_success() => {
                tracing::warn!(symbol, %status, "quote provider error");
                return Err(QuoteError::Status(status));
            }
            _ => {}
        }

        let body: IexQuote = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "unparseable quote response");
                return Ok(None);
            }
        };
        let Some(price) = body.latest_price else {
            return Ok(None);
        };
        Ok(Some(Quote {
            name: body.company_name,
            symbol: body.symbol.to_uppercase(),
            price: dollars_to_cents(price),
        }))
    }
}

/// Fixed quote table keyed by uppercase symbol.
#[derive(Debug, Clone, Default)]
pub struct StaticQuotes {
    quotes: HashMap<String, Quote>,
}

impl StaticQuotes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, symbol: &str, name: &str, price: Cents) -> Self {
        let symbol = symbol.to_uppercase();
        self.quotes.insert(
            symbol.clone(),
            Quote {
                name: name.to_string(),
                symbol,
                price,
            },
        );
        self
    }
}

#[async_trait]
impl QuoteSource for StaticQuotes {
    async fn lookup(&self, symbol: &str) -> Result<Option<Quote>, QuoteError> {
        Ok(self.quotes.get(&symbol.trim().to_uppercase()).cloned())
    }
}
