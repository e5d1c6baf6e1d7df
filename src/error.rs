//! Request-level error type. Anything that escapes a handler is shown as an apology page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use crate::api::views;
use crate::ledger::LedgerError;
use crate::quotes::QuoteError;

#[derive(Debug, Error)]
pub enum AppError {
    /// Shown to the user verbatim.
    #[error("{message}")]
    Apology { status: StatusCode, message: String },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error("password hashing failed: {0}")]
    PasswordHash(argon2::password_hash::Error),
    #[error("session token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<argon2::password_hash::Error> for AppError {
    fn from(e: argon2::password_hash::Error) -> Self {
        AppError::PasswordHash(e)
    }
}

impl AppError {
    pub fn apology(status: StatusCode, message: impl Into<String>) -> Self {
        AppError::Apology {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Apology { status, .. } => *status,
            AppError::Quote(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Apology { message, .. } => message.clone(),
            AppError::Quote(e) => {
                tracing::warn!(error = %e, "quote lookup failed");
                "Quote service unavailable".to_string()
            }
            other => {
                tracing::error!(error = %other, "request failed");
                status
                    .canonical_reason()
                    .unwrap_or("Internal Server Error")
                    .to_string()
            }
        };
        (status, Html(views::apology(status.as_u16(), &message))).into_response()
    }
}
