pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
pub mod persistence;
pub mod portfolio;
pub mod quotes;
pub mod types;
