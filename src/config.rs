//! Runtime configuration read from the environment (and `.env` via dotenvy).

use std::env;
use std::net::SocketAddr;

use thiserror::Error;

use crate::types::money::{Cents, parse_dollars};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_QUOTE_API_URL: &str = "https://cloud.iexapis.com/stable";
/// $10,000.00
pub const DEFAULT_STARTING_CASH: Cents = 1_000_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub api_key: String,
    pub jwt_secret: Vec<u8>,
    pub bind_addr: SocketAddr,
    pub quote_api_url: String,
    pub starting_cash: Cents,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from any variable source; used directly by tests.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let api_key = required("API_KEY")?;
        let jwt_secret = required("JWT_SECRET")?.into_bytes();

        let bind_raw = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw.parse().map_err(|_| ConfigError::Invalid {
            name: "BIND_ADDR",
            value: bind_raw.clone(),
        })?;

        let quote_api_url =
            lookup("QUOTE_API_URL").unwrap_or_else(|| DEFAULT_QUOTE_API_URL.to_string());

        let starting_cash = match lookup("STARTING_CASH") {
            Some(raw) => parse_dollars(&raw).ok_or(ConfigError::Invalid {
                name: "STARTING_CASH",
                value: raw,
            })?,
            None => DEFAULT_STARTING_CASH,
        };

        Ok(Self {
            database_url,
            api_key,
            jwt_secret,
            bind_addr,
            quote_api_url,
            starting_cash,
        })
    }
}
