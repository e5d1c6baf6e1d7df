//! HTTP surface: routes, session handling, HTML views.

pub mod account;
pub mod auth;
pub mod cookies;
pub mod forms;
pub mod routes;
pub mod trading;
pub mod views;
