//! Form bodies with their field rules. Handlers only decide which failing
//! field's message to show and with what status.

use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CredentialsForm {
    #[validate(custom(function = "not_blank", message = "Must provide username."))]
    pub username: String,
    #[validate(length(min = 1, message = "Must provide password."))]
    pub password: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct RegisterForm {
    #[validate(custom(function = "not_blank", message = "Must provide username."))]
    pub username: String,
    #[validate(length(min = 1, message = "Must provide password."))]
    pub password: String,
    #[validate(must_match(
        other = "password",
        message = "Password and Confirmation don't match. Try again."
    ))]
    pub confirmation: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct ChangePasswordForm {
    #[validate(custom(function = "not_blank"))]
    pub username: String,
    #[validate(length(min = 1))]
    pub old_password: String,
    #[validate(length(min = 1, message = "Must provide a new password."))]
    pub new_password: String,
    #[validate(must_match(
        other = "new_password",
        message = "The New Password and the Confirmation don't match. Try again."
    ))]
    pub new_confirmation: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SymbolForm {
    #[validate(custom(function = "not_blank", message = "Must provide a stock symbol."))]
    pub symbol: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct TradeForm {
    #[validate(custom(function = "not_blank", message = "Must provide a stock symbol."))]
    pub symbol: String,
    #[validate(custom(
        function = "positive_whole_number",
        message = "Shares must be a positive whole number."
    ))]
    pub shares: String,
}

impl TradeForm {
    /// Share count of a form that passed validation.
    pub fn share_count(&self) -> Option<i64> {
        parse_shares(&self.shares)
    }
}

fn parse_shares(value: &str) -> Option<i64> {
    value.trim().parse::<i64>().ok().filter(|n| *n > 0)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn positive_whole_number(value: &str) -> Result<(), ValidationError> {
    parse_shares(value)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("shares"))
}

/// Message of the first failing field, checked in the order given.
pub fn first_error(errors: &ValidationErrors, fields: &[&str]) -> Option<String> {
    let by_field = errors.field_errors();
    fields
        .iter()
        .find_map(|field| by_field.get(*field))
        .and_then(|errs| errs.first())
        .and_then(|err| err.message.as_ref())
        .map(|message| message.to_string())
}
